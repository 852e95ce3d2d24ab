//! Ownership rules shared by rentals, payments and fleet administration.

use crate::domain::UserId;
use crate::domain::user::{User, has_manager_capability};
use crate::error::{Result, ServiceError};

/// Whose records a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    User(UserId),
}

impl Scope {
    pub fn includes(self, user_id: UserId) -> bool {
        match self {
            Scope::All => true,
            Scope::User(id) => id == user_id,
        }
    }
}

/// Resolves a listing request. Managers may ask for anyone (or everyone);
/// customers only for themselves.
pub fn listing_scope(actor: &User, target: Option<UserId>, resource: &str) -> Result<Scope> {
    if has_manager_capability(&actor.roles) {
        return Ok(target.map_or(Scope::All, Scope::User));
    }
    match target {
        None => Ok(Scope::User(actor.id)),
        Some(id) if id == actor.id => Ok(Scope::User(id)),
        Some(_) => Err(ServiceError::Forbidden(format!(
            "This user is not allowed to access these {resource}"
        ))),
    }
}

pub fn ensure_owner_or_manager(actor: &User, owner: UserId, resource: &str) -> Result<()> {
    if actor.id == owner || has_manager_capability(&actor.roles) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "This user is not allowed to access this {resource}"
        )))
    }
}

pub fn ensure_manager(actor: &User, action: &str) -> Result<()> {
    if has_manager_capability(&actor.roles) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "Only managers are allowed to {action}"
        )))
    }
}
