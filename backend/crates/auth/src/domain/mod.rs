//! Domain Layer
//!
//! Contains entities, value objects, repository traits and pure domain
//! services.

pub mod entity;
pub mod repository;
pub mod services;
pub mod value_object;

// Re-exports
pub use entity::{Role, SessionClaims, User};
pub use repository::{EditRecordRepository, RoleRepository, UserRepository};
