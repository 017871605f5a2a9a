//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod manage_users;
pub mod profile;
pub mod role_resolver;
pub mod session;
pub mod sign_in;
pub mod sign_up;
pub mod token;

// Re-exports
pub use config::AuthConfig;
pub use manage_users::{AdminUpdateInput, ManageUsersUseCase};
pub use profile::{ProfileUseCase, UpdateProfileInput, UpdateProfileOutput};
pub use role_resolver::RoleResolver;
pub use session::SessionIssuer;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use token::{SignedToken, TokenIssuer};
