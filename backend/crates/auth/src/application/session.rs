//! Session Issuance
//!
//! Resolves a user's permissions and signs a token for them.

use std::sync::Arc;

use crate::application::role_resolver::RoleResolver;
use crate::application::token::{SignedToken, TokenIssuer};
use crate::domain::entity::User;
use crate::domain::repository::RoleRepository;
use crate::error::AuthResult;

pub struct SessionIssuer<R>
where
    R: RoleRepository,
{
    resolver: RoleResolver<R>,
    tokens: Arc<TokenIssuer>,
}

impl<R> SessionIssuer<R>
where
    R: RoleRepository,
{
    pub fn new(role_repo: Arc<R>, tokens: Arc<TokenIssuer>) -> Self {
        Self {
            resolver: RoleResolver::new(role_repo),
            tokens,
        }
    }

    pub async fn issue_for(&self, user: &User) -> AuthResult<SignedToken> {
        let permissions = self.resolver.resolve_permissions(user).await?;
        let signed = self.tokens.issue(user, &permissions)?;

        tracing::debug!(
            user_id = %user.user_id,
            role = %user.role,
            permissions = permissions.len(),
            expires_at = signed.claims.exp,
            "Session token issued"
        );

        Ok(signed)
    }
}
