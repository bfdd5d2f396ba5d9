//! API error responses
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use medguard_core::MedguardError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("record store unavailable: {0}")]
    Unavailable(MedguardError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<MedguardError> for ApiError {
    fn from(err: MedguardError) -> Self {
        match err {
            MedguardError::Store(_) | MedguardError::Timeout(_) => ApiError::Unavailable(err),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Unavailable(_) => "SERVICE_UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_503() {
        let err = ApiError::from(MedguardError::Store("down".to_string()));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.code(), "SERVICE_UNAVAILABLE");

        let err = ApiError::from(MedguardError::Internal("bug".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
