//! Value Object Module

pub mod email;
pub mod permission;
pub mod profile_name;
pub mod role_name;
pub mod user_id;

pub use email::Email;
pub use permission::{Permission, PermissionSet};
pub use profile_name::ProfileName;
pub use role_name::RoleName;
pub use user_id::UserId;
