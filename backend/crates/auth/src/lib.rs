//! Auth (Authentication & Authorization) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits, permission merging
//! - `application/` - Use cases, token issuer, role resolver
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers, DTOs, guard middleware, router
//!
//! ## Features
//! - Registration and login with email + password
//! - Stateless HS256 session tokens carrying a permission snapshot
//! - Roles with parent aggregation and per-user permission overrides
//! - Per-route guards: authenticated, role, or permission
//! - Audit records for every effective user update
//!
//! ## Security Model
//! - Passwords hashed with Argon2id; plaintext and hashes never logged
//! - Tokens delivered as an HttpOnly `authToken` cookie or a Bearer header
//! - Token failures are indistinguishable to the client (401)
//! - Permissions are fixed at issuance and expire with the token (1h default)

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::{AuthConfig, ConfigError};
pub use application::token::TokenIssuer;
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryAuthRepository, PgAuthRepository};
pub use presentation::middleware::{AuthContext, Gate, Guard, guarded};
pub use presentation::router::{auth_router, auth_router_generic};

// Convenience re-exports
pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
