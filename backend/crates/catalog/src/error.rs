//! Catalog Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found")]
    NotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Path id is not a UUID
    #[error("productId is not a valid id")]
    InvalidId,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CatalogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::NotFound => StatusCode::NOT_FOUND,
            CatalogError::InvalidInput(_) | CatalogError::InvalidId => StatusCode::BAD_REQUEST,
            CatalogError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::NotFound => ErrorKind::NotFound,
            CatalogError::InvalidInput(_) | CatalogError::InvalidId => ErrorKind::BadRequest,
            CatalogError::Database(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            CatalogError::Database(_) => AppError::internal("Internal server error"),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        if let CatalogError::Database(e) = &self {
            tracing::error!(error = %e, "Catalog database error");
        }
        self.to_app_error().into_response()
    }
}
