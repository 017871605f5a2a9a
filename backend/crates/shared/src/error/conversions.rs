//! HTTP rendering of [`AppError`] (feature `axum`)

use super::app_error::AppError;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // RFC 7807 problem details
        let body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "detail": self.message(),
            "action": self.action(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    use crate::error::kind::ErrorKind;

    #[test]
    fn test_problem_status() {
        let response =
            AppError::new(ErrorKind::Forbidden, "Insufficient permissions").into_response();
        assert_eq!(response.status().as_u16(), 403);
    }
}
