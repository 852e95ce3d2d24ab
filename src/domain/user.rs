use super::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Customer,
    Manager,
}

pub type RoleSet = BTreeSet<Role>;

/// The single capability check behind every "managers see everything" rule.
pub fn has_manager_capability(roles: &RoleSet) -> bool {
    roles.contains(&Role::Manager)
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub roles: RoleSet,
    #[serde(default)]
    pub deleted: bool,
}

impl User {
    pub fn new(id: UserId, email: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            id,
            email: email.into(),
            roles,
            deleted: false,
        }
    }

    pub fn customer(id: UserId, email: impl Into<String>) -> Self {
        Self::new(id, email, RoleSet::from([Role::Customer]))
    }

    pub fn manager(id: UserId, email: impl Into<String>) -> Self {
        Self::new(id, email, RoleSet::from([Role::Manager]))
    }

    pub fn is_manager(&self) -> bool {
        has_manager_capability(&self.roles)
    }
}
