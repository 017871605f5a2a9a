//! User Management Use Case
//!
//! Administrative reads and writes on other users' accounts.

use std::collections::BTreeMap;
use std::sync::Arc;

use platform::password::PasswordHasher;

use crate::domain::entity::{SessionClaims, User, UserPatch};
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::{Email, Permission, ProfileName, RoleName, UserId};
use crate::error::{AuthError, AuthResult};

/// Administrative update input
#[derive(Debug, Default)]
pub struct AdminUpdateInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub role: Option<String>,
    /// Permission code to grant (`true`) or revoke (`false`)
    pub permission_overrides: Option<BTreeMap<String, bool>>,
}

pub struct ManageUsersUseCase<U, R>
where
    U: UserRepository,
    R: RoleRepository,
{
    user_repo: Arc<U>,
    role_repo: Arc<R>,
    hasher: PasswordHasher,
}

impl<U, R> ManageUsersUseCase<U, R>
where
    U: UserRepository,
    R: RoleRepository,
{
    pub fn new(user_repo: Arc<U>, role_repo: Arc<R>, hasher: PasswordHasher) -> Self {
        Self {
            user_repo,
            role_repo,
            hasher,
        }
    }

    pub async fn list(&self) -> AuthResult<Vec<User>> {
        self.user_repo.list().await
    }

    pub async fn get(&self, user_id: &UserId) -> AuthResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)
    }

    /// Update another user on behalf of `actor`
    ///
    /// Changing the role or permission overrides additionally requires
    /// `role:manage`.
    pub async fn update(
        &self,
        actor: &SessionClaims,
        user_id: &UserId,
        input: AdminUpdateInput,
    ) -> AuthResult<User> {
        let patch = self.build_patch(input).await?;

        if patch.is_empty() {
            return Err(AuthError::InvalidInput("No fields to update".to_string()));
        }

        if patch.touches_authorization() && !actor.has_permission(Permission::ManageRoles) {
            tracing::warn!(
                actor = %actor.sub,
                target = %user_id,
                "Role change attempted without role:manage"
            );
            return Err(AuthError::Forbidden);
        }

        let user = self
            .user_repo
            .update(user_id, &patch, &actor.acting_identity())
            .await?
            .ok_or(AuthError::NotFound)?;

        tracing::info!(actor = %actor.sub, target = %user_id, "User updated");

        Ok(user)
    }

    pub async fn delete(&self, actor: &SessionClaims, user_id: &UserId) -> AuthResult<()> {
        if !self.user_repo.delete(user_id).await? {
            return Err(AuthError::NotFound);
        }

        tracing::info!(actor = %actor.sub, target = %user_id, "User deleted");
        Ok(())
    }

    async fn build_patch(&self, input: AdminUpdateInput) -> AuthResult<UserPatch> {
        let mut patch = UserPatch::default();

        if let Some(email) = input.email {
            patch.email = Some(Email::new(email)?);
        }
        if let Some(password) = input.password {
            let password = self.hasher.check_policy(password)?;
            patch.password_hash = Some(self.hasher.hash(password.expose())?);
        }
        if let Some(value) = input.full_name {
            patch.full_name = Some(ProfileName::new(value, "fullName")?);
        }
        if let Some(value) = input.given_name {
            patch.given_name = Some(ProfileName::new(value, "givenName")?);
        }
        if let Some(value) = input.family_name {
            patch.family_name = Some(ProfileName::new(value, "familyName")?);
        }
        if let Some(role) = input.role {
            let role = RoleName::new(role)?;
            if self.role_repo.find_role(&role).await?.is_none() {
                return Err(AuthError::InvalidInput(format!("Unknown role: {}", role)));
            }
            patch.role = Some(role);
        }
        if let Some(overrides) = input.permission_overrides {
            let parsed = overrides
                .into_iter()
                .map(|(code, granted)| {
                    code.parse::<Permission>()
                        .map(|permission| (permission, granted))
                        .map_err(|e| AuthError::InvalidInput(e.to_string()))
                })
                .collect::<AuthResult<BTreeMap<_, _>>>()?;
            patch.permission_overrides = Some(parsed);
        }

        Ok(patch)
    }
}
