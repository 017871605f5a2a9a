//! Role Name Value Object

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

const ROLE_NAME_MAX_LENGTH: usize = 50;

/// Name of a role document (lower-case, `[a-z0-9_-]`)
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleName(String);

impl RoleName {
    pub const CUSTOMER: &'static str = "customer";
    pub const EMPLOYEE: &'static str = "employee";
    pub const ADMIN: &'static str = "admin";

    pub fn new(name: impl AsRef<str>) -> AuthResult<Self> {
        let name = name.as_ref().trim().to_lowercase();

        if name.is_empty() {
            return Err(AuthError::InvalidInput("Role cannot be empty".to_string()));
        }

        if name.len() > ROLE_NAME_MAX_LENGTH {
            return Err(AuthError::InvalidInput(format!(
                "Role must be at most {} characters",
                ROLE_NAME_MAX_LENGTH
            )));
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        {
            return Err(AuthError::InvalidInput(
                "Role may only contain letters, digits, '_' and '-'".to_string(),
            ));
        }

        Ok(Self(name))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn customer() -> Self {
        Self(Self::CUSTOMER.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RoleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
