//! Sign In Use Case
//!
//! Verifies email + password and issues a session token.

use std::sync::Arc;

use platform::password::{HashedPassword, PasswordHasher};

use crate::application::session::SessionIssuer;
use crate::application::token::{SignedToken, TokenIssuer};
use crate::domain::entity::{ActingIdentity, User, UserPatch};
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::{Email, UserId};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in output
pub struct SignInOutput {
    pub user_id: UserId,
    pub session: SignedToken,
}

/// Sign in use case
pub struct SignInUseCase<U, R>
where
    U: UserRepository,
    R: RoleRepository,
{
    user_repo: Arc<U>,
    sessions: SessionIssuer<R>,
    hasher: PasswordHasher,
}

impl<U, R> SignInUseCase<U, R>
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

    /// Unknown email and wrong password both yield `InvalidCredentials`
    /// after the same amount of hashing work
    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let account = match Email::new(input.email) {
            Ok(email) => self.user_repo.find_by_email(&email).await?,
            Err(_) => None,
        };

        let verified = self
            .hasher
            .verify_account(&input.password, account.as_ref().map(|u| &u.password_hash));

        let user = match account {
            Some(user) if verified => user,
            _ => return Err(AuthError::InvalidCredentials),
        };

        if let Some(password_hash) = self.hasher.upgrade(&input.password, &user.password_hash) {
            self.store_upgraded_hash(&user, password_hash).await;
        }

        let session = self.sessions.issue_for(&user).await?;

        tracing::info!(user_id = %user.user_id, role = %user.role, "User signed in");

        Ok(SignInOutput {
            user_id: user.user_id,
            session,
        })
    }

    /// Replace an outdated digest; a failure here does not fail the login
    async fn store_upgraded_hash(&self, user: &User, password_hash: HashedPassword) {
        let patch = UserPatch {
            password_hash: Some(password_hash),
            ..Default::default()
        };
        let actor = ActingIdentity {
            user_id: user.user_id,
            email: user.email.as_str().to_string(),
        };

        match self.user_repo.update(&user.user_id, &patch, &actor).await {
            Ok(_) => tracing::info!(user_id = %user.user_id, "Password hash upgraded"),
            Err(e) => {
                tracing::warn!(user_id = %user.user_id, error = %e, "Password hash upgrade failed")
            }
        }
    }
}
