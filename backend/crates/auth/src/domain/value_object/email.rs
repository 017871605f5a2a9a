//! Email Value Object
//!
//! Login identifier. Stored trimmed and lower-cased so that uniqueness
//! is case-insensitive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AuthError, AuthResult};

const MAX_LENGTH: usize = 254;
const MAX_LOCAL_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Normalize and validate
    pub fn new(raw: impl Into<String>) -> AuthResult<Self> {
        let normalized = raw.into().trim().to_lowercase();

        match check_shape(&normalized) {
            Ok(()) => Ok(Self(normalized)),
            Err(reason) => Err(AuthError::InvalidInput(reason.to_string())),
        }
    }

    /// Wrap a stored value without re-validating
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part after `@`
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

/// Structural check only; deliverability is not verified
fn check_shape(email: &str) -> Result<(), &'static str> {
    if email.is_empty() {
        return Err("Email cannot be empty");
    }
    if email.len() > MAX_LENGTH {
        return Err("Email is too long");
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format");
    };

    let local_ok = !local.is_empty()
        && local.len() <= MAX_LOCAL_LENGTH
        && !local.chars().any(char::is_whitespace);

    // Every dot-separated label must be non-empty and must not start or end with '-'
    let labels: Vec<&str> = domain.split('.').collect();
    let domain_ok = labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });

    if local_ok && domain_ok {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

impl FromStr for Email {
    type Err = AuthError;

    fn from_str(s: &str) -> AuthResult<Self> {
        Email::new(s)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_addresses() {
        for raw in [
            "alice@example.com",
            "alice.liddell@mail.example.co.uk",
            "alice+shop@example.com",
        ] {
            assert!(Email::new(raw).is_ok(), "{raw}");
        }
    }

    #[test]
    fn test_rejects_malformed() {
        for raw in [
            "",
            "alice.example.com",
            "alice@",
            "@example.com",
            "alice@@example.com",
            "alice@example",
            "alice@example..com",
            "alice@-example.com",
            "al ice@example.com",
        ] {
            assert!(
                matches!(Email::new(raw), Err(AuthError::InvalidInput(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_normalizes_case_and_whitespace() {
        let email = Email::new("  Alice@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
        assert_eq!(email.domain(), "example.com");
    }
}
