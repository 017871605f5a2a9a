//! Entity Module

pub mod edit_record;
pub mod role;
pub mod session_claims;
pub mod user;

pub use edit_record::{ActingIdentity, EditOperation, EditRecord, FieldDiff};
pub use role::Role;
pub use session_claims::SessionClaims;
pub use user::{NewUser, User, UserPatch};
