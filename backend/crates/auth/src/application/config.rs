//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;
use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::password::{MAX_PASSWORD_LENGTH, PasswordHasher};
use thiserror::Error;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

pub const ENV_JWT_SECRET: &str = "JWT_SECRET";
pub const ENV_TOKEN_TTL_SECS: &str = "AUTH_TOKEN_TTL_SECS";
pub const ENV_COOKIE_SECURE: &str = "AUTH_COOKIE_SECURE";
pub const ENV_PASSWORD_PEPPER: &str = "PASSWORD_PEPPER";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set to a non-empty value")]
    MissingSecret(&'static str),

    #[error("{key} has an invalid value: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC key for session tokens
    pub token_secret: Vec<u8>,
    /// Token lifetime; also the cookie Max-Age
    pub token_ttl: Duration,
    /// Session cookie name
    pub cookie_name: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    pub max_password_length: usize,
    /// Role given when registration does not ask for one
    pub default_role: String,
    /// Roles a client may pick at registration
    pub self_assignable_roles: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: Vec::new(),
            token_ttl: Duration::from_secs(3600), // 1 hour
            cookie_name: "authToken".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
            max_password_length: MAX_PASSWORD_LENGTH,
            default_role: "customer".to_string(),
            self_assignable_roles: vec!["customer".to_string()],
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .field("max_password_length", &self.max_password_length)
            .field("default_role", &self.default_role)
            .field("self_assignable_roles", &self.self_assignable_roles)
            .finish()
    }
}

impl AuthConfig {
    /// Create config with the given token secret
    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            token_secret: secret.into(),
            ..Default::default()
        }
    }

    /// Create config for development (random secret, insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_secret(platform::crypto::random_secret())
        }
    }

    /// Load from environment variables
    ///
    /// `JWT_SECRET` is required; everything else falls back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = lookup(ENV_JWT_SECRET)
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingSecret(ENV_JWT_SECRET))?;

        let mut config = Self::with_secret(secret.into_bytes());

        if let Some(raw) = lookup(ENV_TOKEN_TTL_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0 && i64::try_from(*secs).is_ok())
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: ENV_TOKEN_TTL_SECS,
                    value: raw.clone(),
                })?;
            config.token_ttl = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup(ENV_COOKIE_SECURE) {
            config.cookie_secure = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_COOKIE_SECURE,
                        value: raw,
                    });
                }
            };
        }

        config.password_pepper = lookup(ENV_PASSWORD_PEPPER)
            .filter(|p| !p.is_empty())
            .map(String::into_bytes);

        Ok(config)
    }

    /// Token TTL in whole seconds
    pub fn token_ttl_secs(&self) -> i64 {
        i64::try_from(self.token_ttl.as_secs()).unwrap_or(i64::MAX)
    }

    /// Cookie settings; Max-Age follows the token TTL
    pub fn cookie_config(&self) -> CookieConfig {
        CookieConfig {
            name: self.cookie_name.clone(),
            secure: self.cookie_secure,
            same_site: self.cookie_same_site,
            max_age_secs: Some(self.token_ttl_secs()),
            ..CookieConfig::default()
        }
    }

    pub fn password_hasher(&self) -> PasswordHasher {
        PasswordHasher::new(self.max_password_length).with_pepper(self.password_pepper.clone())
    }

    pub fn is_self_assignable(&self, role: &str) -> bool {
        self.self_assignable_roles.iter().any(|r| r == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_secret_required() {
        assert!(matches!(
            AuthConfig::from_lookup(lookup(&[])),
            Err(ConfigError::MissingSecret(_))
        ));
        assert!(matches!(
            AuthConfig::from_lookup(lookup(&[(ENV_JWT_SECRET, "  ")])),
            Err(ConfigError::MissingSecret(_))
        ));
    }

    #[test]
    fn test_defaults_from_env() {
        let config = AuthConfig::from_lookup(lookup(&[(ENV_JWT_SECRET, "s3cret")])).unwrap();
        assert_eq!(config.token_secret, b"s3cret");
        assert_eq!(config.token_ttl, Duration::from_secs(3600));
        assert_eq!(config.cookie_name, "authToken");
        assert!(config.cookie_secure);
        assert!(config.password_pepper.is_none());
    }

    #[test]
    fn test_overrides_from_env() {
        let config = AuthConfig::from_lookup(lookup(&[
            (ENV_JWT_SECRET, "s3cret"),
            (ENV_TOKEN_TTL_SECS, "600"),
            (ENV_COOKIE_SECURE, "false"),
            (ENV_PASSWORD_PEPPER, "pepper"),
        ]))
        .unwrap();
        assert_eq!(config.token_ttl_secs(), 600);
        assert!(!config.cookie_secure);
        assert_eq!(config.password_pepper.as_deref(), Some(b"pepper".as_slice()));
    }

    #[test]
    fn test_invalid_ttl_rejected() {
        let result =
            AuthConfig::from_lookup(lookup(&[(ENV_JWT_SECRET, "s"), (ENV_TOKEN_TTL_SECS, "0")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_ttl_beyond_timestamp_range_rejected() {
        let too_long = (i64::MAX as u64 + 1).to_string();
        let result = AuthConfig::from_lookup(lookup(&[
            (ENV_JWT_SECRET, "s"),
            (ENV_TOKEN_TTL_SECS, too_long.as_str()),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let max = i64::MAX.to_string();
        let config = AuthConfig::from_lookup(lookup(&[
            (ENV_JWT_SECRET, "s"),
            (ENV_TOKEN_TTL_SECS, max.as_str()),
        ]))
        .unwrap();
        assert_eq!(config.token_ttl_secs(), i64::MAX);
    }

    #[test]
    fn test_cookie_max_age_matches_ttl() {
        let config = AuthConfig::with_secret("s");
        let cookie = config.cookie_config().build_set_cookie("t");
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.starts_with("authToken=t"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AuthConfig::with_secret("hunter2-secret");
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
