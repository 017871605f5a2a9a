//! In-Memory Repository Implementation
//!
//! Backs tests and local runs without a database. All collections sit
//! behind one lock, so an update and its edit record land together.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entity::role::default_roles;
use crate::domain::entity::{ActingIdentity, EditRecord, Role, User, UserPatch};
use crate::domain::repository::{EditRecordRepository, RoleRepository, UserRepository};
use crate::domain::value_object::{Email, RoleName, UserId};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct Collections {
    users: HashMap<UserId, User>,
    roles: HashMap<RoleName, Role>,
    edits: Vec<EditRecord>,
}

impl Collections {
    fn email_taken(&self, email: &Email, except: Option<&UserId>) -> bool {
        self.users
            .values()
            .any(|u| &u.email == email && Some(&u.user_id) != except)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAuthRepository {
    inner: Arc<RwLock<Collections>>,
}

impl InMemoryAuthRepository {
    /// Empty store with no roles
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `customer`, `employee` and `admin`
    pub fn with_default_roles() -> Self {
        let roles = default_roles()
            .into_iter()
            .map(|role| (role.name.clone(), role))
            .collect();

        Self {
            inner: Arc::new(RwLock::new(Collections {
                roles,
                ..Default::default()
            })),
        }
    }
}

impl UserRepository for InMemoryAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<UserId> {
        let mut inner = self.inner.write().await;

        if inner.email_taken(&user.email, None) {
            return Err(AuthError::DuplicateEmail);
        }
        if inner.users.contains_key(&user.user_id) {
            return Err(AuthError::Internal("user id collision".to_string()));
        }

        inner.users.insert(user.user_id, user.clone());
        Ok(user.user_id)
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.inner.read().await.users.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| &u.email == email).cloned())
    }

    async fn list(&self) -> AuthResult<Vec<User>> {
        let inner = self.inner.read().await;
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.user_id.as_uuid().cmp(b.user_id.as_uuid()))
        });
        Ok(users)
    }

    async fn update(
        &self,
        user_id: &UserId,
        patch: &UserPatch,
        actor: &ActingIdentity,
    ) -> AuthResult<Option<User>> {
        let mut inner = self.inner.write().await;

        let collides = patch
            .email
            .as_ref()
            .is_some_and(|email| inner.email_taken(email, Some(user_id)));
        if collides {
            return Err(AuthError::DuplicateEmail);
        }

        let Some(user) = inner.users.get_mut(user_id) else {
            return Ok(None);
        };

        let now = Utc::now();
        let diff = user.apply(patch, &actor.user_id, now);
        let updated = user.clone();

        if !diff.is_empty() {
            inner
                .edits
                .push(EditRecord::user_update(user_id, diff, actor.clone(), now));
        }

        Ok(Some(updated))
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<bool> {
        Ok(self.inner.write().await.users.remove(user_id).is_some())
    }
}

impl RoleRepository for InMemoryAuthRepository {
    async fn find_role(&self, name: &RoleName) -> AuthResult<Option<Role>> {
        Ok(self.inner.read().await.roles.get(name).cloned())
    }

    async fn save_role(&self, role: &Role) -> AuthResult<()> {
        self.inner
            .write()
            .await
            .roles
            .insert(role.name.clone(), role.clone());
        Ok(())
    }
}

impl EditRecordRepository for InMemoryAuthRepository {
    async fn list_edits(&self, target_id: &Uuid) -> AuthResult<Vec<EditRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .edits
            .iter()
            .filter(|e| &e.target_id == target_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::fixtures::user;
    use crate::domain::value_object::ProfileName;

    fn actor(user: &User) -> ActingIdentity {
        ActingIdentity {
            user_id: user.user_id,
            email: user.email.to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryAuthRepository::new();
        repo.create(&user("alice@example.com", "customer")).await.unwrap();

        let result = repo.create(&user("ALICE@example.com", "customer")).await;
        assert!(matches!(result, Err(AuthError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_update_collision_rejected() {
        let repo = InMemoryAuthRepository::new();
        let alice = user("alice@example.com", "customer");
        let bob = user("bob@example.com", "customer");
        repo.create(&alice).await.unwrap();
        repo.create(&bob).await.unwrap();

        let patch = UserPatch {
            email: Some(Email::new("alice@example.com").unwrap()),
            ..Default::default()
        };
        let result = repo.update(&bob.user_id, &patch, &actor(&bob)).await;
        assert!(matches!(result, Err(AuthError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_update_writes_edit_record_only_on_change() {
        let repo = InMemoryAuthRepository::new();
        let alice = user("alice@example.com", "customer");
        repo.create(&alice).await.unwrap();

        let same = UserPatch {
            full_name: Some(alice.full_name.clone()),
            ..Default::default()
        };
        repo.update(&alice.user_id, &same, &actor(&alice)).await.unwrap();
        assert!(repo.list_edits(alice.user_id.as_uuid()).await.unwrap().is_empty());

        let rename = UserPatch {
            full_name: Some(ProfileName::from_db("Alice L.")),
            ..Default::default()
        };
        let updated = repo
            .update(&alice.user_id, &rename, &actor(&alice))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.full_name.as_str(), "Alice L.");

        let edits = repo.list_edits(alice.user_id.as_uuid()).await.unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].collection, "User");
        assert_eq!(edits[0].changes["fullName"], "Alice L.");
        assert_eq!(edits[0].acting_user.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = InMemoryAuthRepository::new();
        let ghost = user("ghost@example.com", "customer");
        let patch = UserPatch {
            full_name: Some(ProfileName::from_db("Ghost")),
            ..Default::default()
        };
        assert!(repo.update(&ghost.user_id, &patch, &actor(&ghost)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryAuthRepository::new();
        let alice = user("alice@example.com", "customer");
        repo.create(&alice).await.unwrap();

        assert!(repo.delete(&alice.user_id).await.unwrap());
        assert!(!repo.delete(&alice.user_id).await.unwrap());
        assert!(repo.find_by_id(&alice.user_id).await.unwrap().is_none());
    }
}
