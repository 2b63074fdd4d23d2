//! Unified error handling with consistent API response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error detail in the API response envelope.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Consistent JSON envelope for all API responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a successful result in the envelope.
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            data: Some(data),
            error: None,
        })
    }

    /// Wrap an error in the envelope.
    pub fn error(code: &str, message: &str) -> Json<Self> {
        Json(Self {
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
            }),
        })
    }
}

/// Application error type mapping to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Failed to {operation}: {source}")]
    Persistence {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

/// Attach the name of the store operation to a database error.
pub trait OperationContext<T> {
    fn during(self, operation: &'static str) -> Result<T, AppError>;
}

impl<T> OperationContext<T> for Result<T, sqlx::Error> {
    fn during(self, operation: &'static str) -> Result<T, AppError> {
        self.map_err(|source| AppError::Persistence { operation, source })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Persistence { operation, source } => {
                tracing::error!(operation = %operation, error = %source, "Persistence failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    format!("Failed to {operation}"),
                )
            }
        };

        (status, ApiResponse::<()>::error(code, &message)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_response_success() {
        let response = ApiResponse::success("Arnica");
        let json = serde_json::to_value(&response.0).unwrap();
        assert_eq!(json["data"], "Arnica");
        assert!(json["error"].is_null());
    }

    #[test]
    fn api_response_error() {
        let response = ApiResponse::<()>::error("NOT_FOUND", "Rule not found");
        let json = serde_json::to_value(&response.0).unwrap();
        assert!(json["data"].is_null());
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "Rule not found");
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = AppError::NotFound("parsing rule".to_string());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn app_error_display() {
        let err = AppError::Validation("pattern is required".to_string());
        assert_eq!(err.to_string(), "Validation error: pattern is required");
    }

    #[test]
    fn persistence_error_names_operation() {
        let result: Result<(), sqlx::Error> = Err(sqlx::Error::PoolTimedOut);
        let err = result.during("upsert combination").unwrap_err();
        assert!(matches!(err, AppError::Persistence { operation: "upsert combination", .. }));
        assert!(err.to_string().starts_with("Failed to upsert combination"));
    }

    #[test]
    fn persistence_response_hides_driver_detail() {
        let err = AppError::Persistence {
            operation: "list parsing rules",
            source: sqlx::Error::PoolTimedOut,
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
