//! Password Hashing and Verification
//!
//! - Argon2id hashing (memory-hard, OWASP recommended parameters)
//! - PHC string output: algorithm, parameters and salt travel with the hash
//! - Zeroization of clear-text buffers
//! - Registration-time password policy (NIST SP 800-63B)
//!
//! Clear-text input is never logged and never appears in `Debug` output.

use std::fmt;
use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _, password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

// ============================================================================
// Constants (NIST SP 800-63B compliant)
// ============================================================================

/// Minimum password length for new passwords (NIST: SHALL be at least 8)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum accepted input length (NIST: SHOULD permit at least 64)
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password is too common or follows a predictable pattern")]
    CommonPattern,
}

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Input rejected before hashing (empty or over the configured maximum)
    #[error("Invalid password input: {0}")]
    InvalidInput(String),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Clear Text Password (validated, zeroized on drop)
// ============================================================================

/// A new password that passed the registration policy
///
/// Use this when a password is being *set*. Verification of an existing
/// password goes through [`PasswordHasher::verify`] with the raw input so
/// that policy changes never lock existing users out.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Validate against the policy:
    /// - NFKC normalization first, length counted in code points
    /// - 8..=128 characters
    /// - no control characters
    /// - not a trivially common password or pattern
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        Self::with_max_length(raw, MAX_PASSWORD_LENGTH)
    }

    /// Same policy with a different upper bound
    pub fn with_max_length(raw: String, max_length: usize) -> Result<Self, PasswordPolicyError> {
        let raw = Zeroizing::new(raw);
        let normalized: String = raw.nfkc().collect();
        let candidate = Self(normalized);

        if candidate.0.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        let char_count = candidate.0.chars().count();

        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if char_count > max_length {
            return Err(PasswordPolicyError::TooLong {
                max: max_length,
                actual: char_count,
            });
        }

        if candidate
            .0
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if is_common_pattern(&candidate.0) {
            return Err(PasswordPolicyError::CommonPattern);
        }

        Ok(candidate)
    }

    /// Normalized clear text, for handing to [`PasswordHasher::hash`]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Argon2id hash in PHC string format
///
/// `$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Parse a PHC string (e.g. from the database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    /// Wrap a stored value without parsing it. Verification of a corrupt
    /// value simply fails.
    pub fn from_db(s: impl Into<String>) -> Self {
        Self { hash: s.into() }
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// True when the stored hash is not Argon2id and should be replaced on
    /// the next successful login.
    pub fn needs_rehash(&self) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => parsed.algorithm != argon2::Algorithm::Argon2id.ident(),
            Err(_) => true,
        }
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Hasher
// ============================================================================

/// Salted one-way password hasher
///
/// `hash` is non-deterministic (fresh salt per call); `verify` is
/// deterministic and never fails loudly.
#[derive(Clone)]
pub struct PasswordHasher {
    max_length: usize,
    pepper: Option<Zeroizing<Vec<u8>>>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(MAX_PASSWORD_LENGTH)
    }
}

impl PasswordHasher {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            pepper: None,
        }
    }

    /// Application-wide secret appended to every password before hashing
    pub fn with_pepper(mut self, pepper: Option<Vec<u8>>) -> Self {
        self.pepper = pepper.map(Zeroizing::new);
        self
    }

    /// Apply the new-password policy with this hasher's length limit
    pub fn check_policy(&self, raw: String) -> Result<ClearTextPassword, PasswordPolicyError> {
        ClearTextPassword::with_max_length(raw, self.max_length)
    }

    /// Hash a password with a fresh 128-bit salt
    ///
    /// ## Errors
    /// * `InvalidInput` - empty, or longer than the configured maximum
    /// * `HashingFailed` - argon2 rejected the input
    pub fn hash(&self, plaintext: &str) -> Result<HashedPassword, PasswordHashError> {
        let input = self.prepare(plaintext).ok_or_else(|| {
            PasswordHashError::InvalidInput(format!(
                "password must be between 1 and {} characters",
                self.max_length
            ))
        })?;

        let salt = SaltString::generate(&mut OsRng);

        // Argon2::default(): Argon2id, m=19456 (19 MiB), t=2, p=1
        let hash = Argon2::default()
            .hash_password(&input, &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }

    /// Verify a password against a stored hash
    ///
    /// Returns `false` for a wrong password, an over-long input, or a digest
    /// that is not a valid PHC string.
    pub fn verify(&self, plaintext: &str, digest: &HashedPassword) -> bool {
        let Some(input) = self.prepare(plaintext) else {
            return false;
        };

        let parsed_hash = match PasswordHash::new(&digest.hash) {
            Ok(h) => h,
            Err(_) => {
                tracing::warn!("Stored password hash is not a valid PHC string");
                return false;
            }
        };

        // Argon2 uses constant-time comparison internally
        Argon2::default()
            .verify_password(&input, &parsed_hash)
            .is_ok()
    }

    /// Verify a login attempt that may have no matching account
    ///
    /// With `None` the input is checked against a throwaway digest and the
    /// result is always `false`; both cases cost one Argon2 run.
    pub fn verify_account(&self, plaintext: &str, digest: Option<&HashedPassword>) -> bool {
        match digest {
            Some(digest) => self.verify(plaintext, digest),
            None => {
                if let Some(decoy) = DECOY_DIGEST.as_ref() {
                    let _ = self.verify(plaintext, decoy);
                }
                false
            }
        }
    }

    /// Fresh digest for a verified password whose stored hash is outdated
    pub fn upgrade(&self, plaintext: &str, digest: &HashedPassword) -> Option<HashedPassword> {
        if !digest.needs_rehash() {
            return None;
        }
        match self.hash(plaintext) {
            Ok(upgraded) => Some(upgraded),
            Err(e) => {
                tracing::warn!(error = %e, "Password rehash failed");
                None
            }
        }
    }

    /// NFKC-normalize, enforce length bounds, append pepper
    fn prepare(&self, plaintext: &str) -> Option<Zeroizing<Vec<u8>>> {
        let normalized: Zeroizing<String> = Zeroizing::new(plaintext.nfkc().collect());
        let char_count = normalized.chars().count();
        if char_count == 0 || char_count > self.max_length {
            return None;
        }

        let mut bytes = Zeroizing::new(normalized.as_bytes().to_vec());
        if let Some(pepper) = &self.pepper {
            bytes.extend_from_slice(pepper);
        }
        Some(bytes)
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("max_length", &self.max_length)
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Digest of a random secret, hashed once with the default parameters
static DECOY_DIGEST: LazyLock<Option<HashedPassword>> = LazyLock::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    let secret = crate::crypto::random_secret();
    match Argon2::default().hash_password(&secret, &salt) {
        Ok(hash) => Some(HashedPassword {
            hash: hash.to_string(),
        }),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build decoy password digest");
            None
        }
    }
});

fn is_common_pattern(password: &str) -> bool {
    let lower = password.to_lowercase();

    // All the same character (e.g. "aaaaaaaa")
    let mut chars = lower.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return true;
        }
    }

    if is_sequential_numbers(&lower) {
        return true;
    }

    const KEYBOARD_PATTERNS: &[&str] = &[
        "qwerty",
        "asdfgh",
        "zxcvbn",
        "qazwsx",
        "1qaz2wsx",
    ];

    if KEYBOARD_PATTERNS.iter().any(|p| lower.contains(p)) {
        return true;
    }

    const COMMON_PASSWORDS: &[&str] = &[
        "password",
        "password1",
        "password123",
        "abcdefgh",
        "letmein1",
        "welcome1",
        "admin123",
        "iloveyou",
        "sunshine",
        "princess",
        "football",
        "baseball",
        "trustno1",
    ];

    COMMON_PASSWORDS.contains(&lower.as_str())
}

/// Digits-only strings that count straight up or down (wrapping 9 -> 0)
fn is_sequential_numbers(s: &str) -> bool {
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 4 {
        return false;
    }

    let ascending = digits.windows(2).all(|w| w[1] == (w[0] + 1) % 10);
    let descending = digits.windows(2).all(|w| w[0] == (w[1] + 1) % 10);

    ascending || descending
}

// ============================================================================
// Tests
// ============================================================================
