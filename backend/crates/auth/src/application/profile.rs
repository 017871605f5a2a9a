//! Profile Use Case
//!
//! The signed-in user's own account.

use std::sync::Arc;

use platform::password::PasswordHasher;

use crate::application::session::SessionIssuer;
use crate::application::token::{SignedToken, TokenIssuer};
use crate::domain::entity::{SessionClaims, User, UserPatch};
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::{Email, ProfileName};
use crate::error::{AuthError, AuthResult};

/// Self-service update; only these fields may be changed by the owner
#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
}

pub struct UpdateProfileOutput {
    pub user: User,
    /// Fresh token so the embedded email matches the record
    pub session: SignedToken,
}

pub struct ProfileUseCase<U, R>
where
    U: UserRepository,
    R: RoleRepository,
{
    user_repo: Arc<U>,
    sessions: SessionIssuer<R>,
    hasher: PasswordHasher,
}

impl<U, R> ProfileUseCase<U, R>
where
    U: UserRepository,
    R: RoleRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        role_repo: Arc<R>,
        tokens: Arc<TokenIssuer>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            user_repo,
            sessions: SessionIssuer::new(role_repo, tokens),
            hasher,
        }
    }

    /// The user behind `claims`; `NotFound` once the account is deleted
    pub async fn get(&self, claims: &SessionClaims) -> AuthResult<User> {
        self.user_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AuthError::NotFound)
    }

    pub async fn update(
        &self,
        claims: &SessionClaims,
        input: UpdateProfileInput,
    ) -> AuthResult<UpdateProfileOutput> {
        let mut patch = UserPatch::default();

        if let Some(email) = input.email {
            patch.email = Some(Email::new(email)?);
        }
        if let Some(password) = input.password {
            let password = self.hasher.check_policy(password)?;
            patch.password_hash = Some(self.hasher.hash(password.expose())?);
        }
        if let Some(full_name) = input.full_name {
            patch.full_name = Some(ProfileName::new(full_name, "fullName")?);
        }

        if patch.is_empty() {
            return Err(AuthError::InvalidInput("No fields to update".to_string()));
        }

        let user = self
            .user_repo
            .update(&claims.sub, &patch, &claims.acting_identity())
            .await?
            .ok_or(AuthError::NotFound)?;

        let session = self.sessions.issue_for(&user).await?;

        tracing::info!(user_id = %user.user_id, "User updated own profile");

        Ok(UpdateProfileOutput { user, session })
    }
}
