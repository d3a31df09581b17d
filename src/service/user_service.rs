//! Administrative user management.

use std::sync::Arc;

use super::auth_service::{NewAccount, create_account};
use crate::auth::Principal;
use crate::domain::{Permission, Role, User, UserId};
use crate::error::TradeHubError;
use crate::persistence::UserRepository;

/// User management for callers holding [`Permission::ManageUsers`].
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    /// Creates a new `UserService`.
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Lists every account.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Forbidden`] without the permission.
    pub async fn list(&self, actor: &Principal) -> Result<Vec<User>, TradeHubError> {
        actor.require(Permission::ManageUsers)?;
        Ok(self.users.list().await?)
    }

    /// Creates an account with an explicit role.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Forbidden`], [`TradeHubError::Validation`]
    /// or [`TradeHubError::Conflict`].
    pub async fn create(
        &self,
        actor: &Principal,
        account: NewAccount,
    ) -> Result<User, TradeHubError> {
        actor.require(Permission::ManageUsers)?;
        create_account(self.users.as_ref(), account).await
    }

    /// Gets one account.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Forbidden`] or [`TradeHubError::NotFound`].
    pub async fn get(&self, actor: &Principal, id: UserId) -> Result<User, TradeHubError> {
        actor.require(Permission::ManageUsers)?;
        self.users
            .get(id)
            .await?
            .ok_or_else(|| TradeHubError::not_found("user", id))
    }

    /// Changes an account's role. Admins cannot demote themselves.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Forbidden`], [`TradeHubError::NotFound`]
    /// or [`TradeHubError::Conflict`] for self-demotion.
    pub async fn set_role(
        &self,
        actor: &Principal,
        id: UserId,
        role: Role,
    ) -> Result<User, TradeHubError> {
        actor.require(Permission::ManageUsers)?;
        if id == actor.user_id && !role.grants(Permission::ManageUsers) {
            return Err(TradeHubError::Conflict(
                "cannot remove your own administrative role".to_string(),
            ));
        }
        let user = self.users.update_role(id, role).await?;
        tracing::info!(user_id = %id, %role, actor = %actor.user_id, "role changed");
        Ok(user)
    }

    /// Deletes an account that nothing references.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Forbidden`], [`TradeHubError::NotFound`]
    /// or [`TradeHubError::Conflict`] while trades or offers reference it,
    /// or when an admin targets their own account.
    pub async fn delete(&self, actor: &Principal, id: UserId) -> Result<(), TradeHubError> {
        actor.require(Permission::ManageUsers)?;
        if id == actor.user_id {
            return Err(TradeHubError::Conflict(
                "cannot delete your own account".to_string(),
            ));
        }
        self.users.delete(id).await?;
        tracing::info!(user_id = %id, actor = %actor.user_id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::NewTrade;
    use crate::persistence::{InMemoryStore, TradeRepository};
    use crate::service::testing::principal;

    #[tokio::test]
    async fn requires_manage_users() {
        let store = InMemoryStore::new();
        let user = principal(&store, "alice", Role::User).await;
        let users = UserService::new(Arc::new(store));

        assert!(matches!(
            users.list(&user).await,
            Err(TradeHubError::Forbidden(_))
        ));
        assert!(matches!(
            users.get(&user, user.user_id).await,
            Err(TradeHubError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn admin_creates_promotes_and_deletes() {
        let store = InMemoryStore::new();
        let admin = principal(&store, "root", Role::Admin).await;
        let users = UserService::new(Arc::new(store));

        let Ok(created) = users
            .create(
                &admin,
                NewAccount {
                    username: "mod".to_string(),
                    email: "mod@example.com".to_string(),
                    password: "password123".to_string(),
                    role: Role::User,
                },
            )
            .await
        else {
            panic!("create failed");
        };

        let Ok(promoted) = users.set_role(&admin, created.id, Role::Admin).await else {
            panic!("set_role failed");
        };
        assert_eq!(promoted.role, Role::Admin);

        let Ok(all) = users.list(&admin).await else {
            panic!("list failed");
        };
        assert_eq!(all.len(), 2);

        assert!(users.delete(&admin, created.id).await.is_ok());
        assert!(matches!(
            users.get(&admin, created.id).await,
            Err(TradeHubError::NotFound { entity: "user", .. })
        ));
    }

    #[tokio::test]
    async fn admin_cannot_remove_self() {
        let store = InMemoryStore::new();
        let admin = principal(&store, "root", Role::Admin).await;
        let users = UserService::new(Arc::new(store));

        assert!(matches!(
            users.set_role(&admin, admin.user_id, Role::User).await,
            Err(TradeHubError::Conflict(_))
        ));
        assert!(matches!(
            users.delete(&admin, admin.user_id).await,
            Err(TradeHubError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn referenced_user_not_deleted() {
        let store = InMemoryStore::new();
        let admin = principal(&store, "root", Role::Admin).await;
        let a = principal(&store, "alice", Role::User).await;
        let b = principal(&store, "bob", Role::User).await;
        let Ok(new_trade) = NewTrade::new(a.user_id, b.user_id) else {
            panic!("trade payload invalid");
        };
        let Ok(_) = TradeRepository::insert(&store, new_trade).await else {
            panic!("trade insert failed");
        };
        let users = UserService::new(Arc::new(store));

        assert!(matches!(
            users.delete(&admin, b.user_id).await,
            Err(TradeHubError::Conflict(_))
        ));
    }
}
