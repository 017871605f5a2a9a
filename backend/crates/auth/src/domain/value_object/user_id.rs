pub use kernel::id::UserId;

use crate::error::AuthError;

/// Parse a path segment into a [`UserId`]
pub fn parse_user_id(raw: &str) -> Result<UserId, AuthError> {
    raw.trim().parse().map_err(|_| AuthError::InvalidId)
}
