use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use orchestrator::OrchestratorError;
use serde::Serialize;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    BadGateway(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "invalid_transition", msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "stage_failed", msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<OrchestratorError> for AppError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::RunNotFound(id) => {
                AppError::NotFound(format!("Run not found: {}", id))
            }
            OrchestratorError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
            OrchestratorError::StageFailed { .. } => AppError::BadGateway(err.to_string()),
            OrchestratorError::Database(db_err) => {
                tracing::error!("Database error: {:?}", db_err);
                AppError::Internal("Database error occurred".to_string())
            }
        }
    }
}
