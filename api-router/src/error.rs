use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::error::AppError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize, Clone)]
pub enum ApiError {
    #[error("Internal server error")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        message: String,
        details: Option<String>,
    },

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(msg) => Self::ValidationError(msg),
            AppError::Conflict(msg) => Self::Conflict(msg),
            AppError::Database(_) | AppError::InternalError(_) => {
                tracing::error!("Internal error: {:?}", err);
                Self::InternalError("Internal server error".to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidParameter {
            message: "Invalid query parameters".to_string(),
            details: Some(rejection.body_text()),
        }
    }
}

impl ApiError {
    const fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError(_) | Self::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    const fn code(&self) -> &'static str {
        match self {
            Self::InternalError(_) => "INTERNAL_SERVER_ERROR",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidParameter { .. } => "INVALID_PARAMETER",
            Self::Conflict(_) => "DUPLICATE_MESSAGE",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let (message, details) = match self {
            // Never echo internal detail back to the client.
            Self::InternalError(_) => ("Internal server error".to_string(), None),
            Self::ValidationError(message) => {
                let details = Some(message.clone());
                (message, details)
            }
            Self::InvalidParameter { message, details } => (message, details),
            Self::Conflict(message) => (message, None),
        };

        let body = ErrorResponse {
            status: "error",
            error: ErrorDetail {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[derive(Serialize, Debug)]
struct ErrorResponse {
    status: &'static str,
    error: ErrorDetail,
}

#[derive(Serialize, Debug)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}
