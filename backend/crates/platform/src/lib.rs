//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no domain knowledge:
//! - Password hashing (Argon2id) and registration-time password policy
//! - Cookie and bearer-token extraction, `Set-Cookie` construction
//! - Secure randomness

pub mod cookie;
pub mod crypto;
pub mod password;
