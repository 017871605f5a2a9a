//! Profile Name Value Object
//!
//! Full, given and family names share the same rules.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AuthError, AuthResult};

const PROFILE_NAME_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileName(String);

impl ProfileName {
    /// `field` names the input in the error message
    pub fn new(value: impl AsRef<str>, field: &str) -> AuthResult<Self> {
        let value = value.as_ref().trim();

        if value.is_empty() {
            return Err(AuthError::InvalidInput(format!("{} cannot be empty", field)));
        }

        if value.chars().count() > PROFILE_NAME_MAX_LENGTH {
            return Err(AuthError::InvalidInput(format!(
                "{} must be at most {} characters",
                field, PROFILE_NAME_MAX_LENGTH
            )));
        }

        if value.chars().any(char::is_control) {
            return Err(AuthError::InvalidInput(format!(
                "{} contains invalid characters",
                field
            )));
        }

        Ok(Self(value.to_string()))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
