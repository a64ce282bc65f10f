use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum AspenError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl From<figment::Error> for AspenError {
    fn from(e: figment::Error) -> Self {
        AspenError::Config(Box::new(e))
    }
}

impl AspenError {
    pub fn school_not_found() -> Self {
        AspenError::NotFound("School not found".to_string())
    }

    pub fn student_not_found() -> Self {
        AspenError::NotFound("Student not found".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AspenError::NotFound(_) => StatusCode::NOT_FOUND,
            AspenError::Validation(_) => StatusCode::BAD_REQUEST,
            AspenError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AspenError::DatabaseError(_)
            | AspenError::Io(_)
            | AspenError::JsonError(_)
            | AspenError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AspenError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match &self {
            AspenError::NotFound(message) => ApiErrorBody {
                code: "NOT_FOUND".to_string(),
                message: message.clone(),
            },
            AspenError::Validation(message) => ApiErrorBody {
                code: "VALIDATION_ERROR".to_string(),
                message: message.clone(),
            },
            AspenError::StorageUnavailable(reason) => {
                error!(reason = %reason, "storage unavailable");
                ApiErrorBody {
                    code: "STORAGE_UNAVAILABLE".to_string(),
                    message: "Storage is unavailable.".to_string(),
                }
            }
            AspenError::DatabaseError(_)
            | AspenError::Io(_)
            | AspenError::JsonError(_)
            | AspenError::Config(_) => {
                error!(error = %self, "internal error while serving request");
                ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                }
            }
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn not_found_carries_message() {
        let resp = AspenError::school_not_found().into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body_str = std::str::from_utf8(&body).unwrap();
        assert!(body_str.contains(r#""code":"NOT_FOUND""#));
        assert!(body_str.contains(r#""message":"School not found""#));
    }

    #[test]
    fn validation_is_400() {
        let err = AspenError::Validation("Search query required".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_failures_map_to_5xx() {
        assert_eq!(
            AspenError::StorageUnavailable("gone".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AspenError::DatabaseError(SqlxError::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let resp = AspenError::DatabaseError(SqlxError::PoolTimedOut).into_response();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body_str = std::str::from_utf8(&body).unwrap();
        assert!(body_str.contains("INTERNAL_ERROR"));
        assert!(!body_str.contains("PoolTimedOut"));
    }
}
