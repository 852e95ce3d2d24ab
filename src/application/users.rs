use crate::domain::UserId;
use crate::domain::ports::UserStoreRef;
use crate::domain::user::{Role, RoleSet, User};
use crate::error::{Result, ServiceError};
use tokio::sync::Mutex;
use tracing::info;

fn validate_email(email: &str) -> Result<()> {
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if well_formed && !email.chars().any(char::is_whitespace) {
        Ok(())
    } else {
        Err(ServiceError::Validation(vec![
            "email must be a well-formed email address".to_owned(),
        ]))
    }
}

/// Directory of the users that act on rentals and payments.
pub struct UserService {
    users: UserStoreRef,
    // Email uniqueness is a check-then-insert across all rows.
    registration: Mutex<()>,
}

impl UserService {
    pub fn new(users: UserStoreRef) -> Self {
        Self {
            users,
            registration: Mutex::new(()),
        }
    }

    /// Registers a user. An empty role set means a plain customer.
    pub async fn add_user(&self, email: &str, roles: RoleSet) -> Result<User> {
        let email = email.trim();
        validate_email(email)?;
        let roles = if roles.is_empty() {
            RoleSet::from([Role::Customer])
        } else {
            roles
        };

        let _guard = self.registration.lock().await;
        if self.users.get_by_email(email).await?.is_some() {
            return Err(ServiceError::EmailTaken(email.to_owned()));
        }
        let user = User::new(self.users.next_id().await?, email, roles);
        self.users.store(user.clone()).await?;
        info!(user_id = user.id, manager = user.is_manager(), "User registered");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<User> {
        self.users
            .get(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::InMemoryUserStore;
    use std::sync::Arc;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryUserStore::new()))
    }

    #[tokio::test]
    async fn test_add_and_find() {
        let users = service();
        let alice = users
            .add_user("alice@carrent.test", RoleSet::new())
            .await
            .unwrap();
        assert_eq!(alice.id, 1);
        assert_eq!(alice.roles, RoleSet::from([Role::Customer]));

        let boss = users
            .add_user("boss@carrent.test", RoleSet::from([Role::Manager]))
            .await
            .unwrap();
        assert!(boss.is_manager());
        assert_eq!(users.get_user(boss.id).await.unwrap(), boss);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let users = service();
        users
            .add_user("alice@carrent.test", RoleSet::new())
            .await
            .unwrap();
        let err = users
            .add_user("ALICE@carrent.test", RoleSet::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmailTaken(_)));
        assert_eq!(err.class().status(), 409);
    }

    #[tokio::test]
    async fn test_rejects_malformed_email() {
        let users = service();
        for email in ["", "alice", "@carrent.test", "alice@localhost", "al ice@carrent.test"] {
            assert!(matches!(
                users.add_user(email, RoleSet::new()).await,
                Err(ServiceError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_unknown_user() {
        assert!(matches!(
            service().get_user(3).await,
            Err(ServiceError::NotFound { entity: "user", .. })
        ));
    }
}
