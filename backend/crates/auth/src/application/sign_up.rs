//! Sign Up Use Case
//!
//! Creates a new user account and signs it in.

use std::sync::Arc;

use platform::password::PasswordHasher;

use crate::application::config::AuthConfig;
use crate::application::session::SessionIssuer;
use crate::application::token::{SignedToken, TokenIssuer};
use crate::domain::entity::{NewUser, User};
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::{Email, ProfileName, RoleName, UserId};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub given_name: String,
    pub family_name: String,
    /// Requested role; the configured default when absent
    pub role: Option<String>,
}

/// Sign up output
pub struct SignUpOutput {
    pub user_id: UserId,
    pub session: SignedToken,
}

/// Sign up use case
pub struct SignUpUseCase<U, R>
where
    U: UserRepository,
    R: RoleRepository,
{
    user_repo: Arc<U>,
    role_repo: Arc<R>,
    sessions: SessionIssuer<R>,
    hasher: PasswordHasher,
    config: Arc<AuthConfig>,
}

impl<U, R> SignUpUseCase<U, R>
where
    U: UserRepository,
    R: RoleRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        role_repo: Arc<R>,
        tokens: Arc<TokenIssuer>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            sessions: SessionIssuer::new(role_repo.clone(), tokens),
            role_repo,
            hasher: config.password_hasher(),
            config,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let email = Email::new(input.email)?;
        let full_name = ProfileName::new(input.full_name, "fullName")?;
        let given_name = ProfileName::new(input.given_name, "givenName")?;
        let family_name = ProfileName::new(input.family_name, "familyName")?;

        let role = match input.role {
            Some(requested) => {
                let role = RoleName::new(requested)?;
                if !self.config.is_self_assignable(role.as_str()) {
                    tracing::warn!(role = %role, "Registration requested a restricted role");
                    return Err(AuthError::Forbidden);
                }
                role
            }
            None => RoleName::new(&self.config.default_role)?,
        };

        if self.role_repo.find_role(&role).await?.is_none() {
            return Err(AuthError::InvalidInput(format!("Unknown role: {}", role)));
        }

        // Checked again by the store's unique constraint
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password = self.hasher.check_policy(input.password)?;
        let password_hash = self.hasher.hash(password.expose())?;

        let user = User::new(NewUser {
            email,
            password_hash,
            role,
            full_name,
            given_name,
            family_name,
        });

        let user_id = self.user_repo.create(&user).await?;
        let session = self.sessions.issue_for(&user).await?;

        tracing::info!(user_id = %user_id, role = %user.role, "User signed up");

        Ok(SignUpOutput { user_id, session })
    }
}
