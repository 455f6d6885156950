use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use ideaforge_core::CoreError;

use crate::agent::AgentError;
use crate::propagation::TurnError;

/// API error codes for client handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    ValidationError,
    NotFound,
    Conflict,
    BusinessRule,
    DatabaseError,
    AgentError,
    AgentUnavailable,
}

/// Error body: `{"error": message, "code": CODE}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: ErrorCode,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code,
        }
    }
}

pub type ApiResult<T> = Result<T, AppError>;

/// Application error that converts to HTTP responses
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub body: ApiError,
}

impl AppError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiError::new(code, message),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::ValidationError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ErrorCode::NotFound, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Validation(_) => Self::validation(message),
            CoreError::NotFound(_) => Self::not_found(message),
            CoreError::Conflict(_) => Self::new(StatusCode::CONFLICT, ErrorCode::Conflict, message),
            CoreError::BusinessRule(_) => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::BusinessRule,
                message,
            ),
            CoreError::Persistence(e) => {
                tracing::error!(error = %e, "Storage failure");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DatabaseError,
                    "Storage failure",
                )
            }
        }
    }
}

impl From<AgentError> for AppError {
    fn from(err: AgentError) -> Self {
        if err.is_unavailable() {
            return Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::AgentUnavailable,
                "AI service temporarily unavailable. Please try again in a few minutes.",
            );
        }
        Self::new(
            StatusCode::BAD_GATEWAY,
            ErrorCode::AgentError,
            format!("Error calling AI agent: {}", err),
        )
    }
}

impl From<TurnError> for AppError {
    fn from(err: TurnError) -> Self {
        match err {
            TurnError::Core(e) => e.into(),
            TurnError::Agent(e) => e.into(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, ErrorCode::BadRequest, rejection.body_text())
    }
}
