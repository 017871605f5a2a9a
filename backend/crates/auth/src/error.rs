//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::{PasswordHashError, PasswordPolicyError};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. The two cases are indistinguishable
    /// to the caller.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email is already registered")]
    DuplicateEmail,

    #[error("User not found")]
    NotFound,

    /// No token in the cookie or the `Authorization` header
    #[error("Authentication token missing")]
    MissingToken,

    /// Token signature does not match its content
    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    /// Token could not be decoded
    #[error("Token is malformed")]
    Malformed,

    /// Authenticated, but the role/permission check failed
    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Path id is not a UUID
    #[error("Invalid id")]
    InvalidId,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidSignature
            | AuthError::Expired
            | AuthError::Malformed => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::DuplicateEmail => StatusCode::CONFLICT,
            AuthError::InvalidInput(_) | AuthError::InvalidId => StatusCode::BAD_REQUEST,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidSignature
            | AuthError::Expired
            | AuthError::Malformed => ErrorKind::Unauthorized,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::NotFound => ErrorKind::NotFound,
            AuthError::DuplicateEmail => ErrorKind::Conflict,
            AuthError::InvalidInput(_) | AuthError::InvalidId => ErrorKind::BadRequest,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// True for token failures (as opposed to a bad login)
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::InvalidSignature
                | AuthError::Expired
                | AuthError::Malformed
        )
    }

    /// Convert to AppError
    ///
    /// Token failures collapse into one message so the client cannot tell
    /// a forged token from an expired one. Store failures never expose
    /// their detail.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::MissingToken => AppError::unauthorized("Authentication required")
                .with_action("Please log in"),
            AuthError::InvalidSignature | AuthError::Expired | AuthError::Malformed => {
                AppError::unauthorized("Invalid or expired session")
                    .with_action("Please log in again")
            }
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::InvalidSignature => {
                tracing::warn!("Token with invalid signature rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let mut response = self.to_app_error().into_response();
        if self.status_code() == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert("X-Auth-Required", HeaderValue::from_static("true"));
        }
        response
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        AuthError::InvalidInput(err.to_string())
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        match err {
            PasswordHashError::InvalidInput(msg) => AuthError::InvalidInput(msg),
            other => AuthError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Expired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::DuplicateEmail.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::InvalidId.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_token_errors_share_message() {
        let expired = AuthError::Expired.to_app_error();
        let forged = AuthError::InvalidSignature.to_app_error();
        assert_eq!(expired.message(), forged.message());
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = AuthError::Internal("pool exhausted at 10.0.0.5".into());
        assert!(!err.to_app_error().message().contains("10.0.0.5"));
    }

    #[test]
    fn test_unauthorized_response_sets_header() {
        let response = AuthError::MissingToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["X-Auth-Required"], "true");

        let response = AuthError::Forbidden.into_response();
        assert!(response.headers().get("X-Auth-Required").is_none());
    }
}
