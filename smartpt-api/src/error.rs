//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("All fields are required")]
    MissingFields,

    #[error("{0}")]
    Validation(String),

    #[error("Missing prompt")]
    MissingPrompt,

    #[error("You have already reported a disruption for this route and location recently. Please wait before submitting another report.")]
    DuplicateReport,

    #[error("You have already confirmed this disruption")]
    AlreadyConfirmed,

    #[error("Disruption not found")]
    DisruptionNotFound,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Missing {0}")]
    MissingCredential(&'static str),

    /// Auth-provider failure, message surfaced verbatim
    #[error("{message}")]
    Auth { status: u16, message: String },

    /// Upstream dependency failure with a forwardable status
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFields
            | ApiError::Validation(_)
            | ApiError::MissingPrompt => StatusCode::BAD_REQUEST,
            ApiError::DuplicateReport | ApiError::AlreadyConfirmed => StatusCode::CONFLICT,
            ApiError::DisruptionNotFound => StatusCode::NOT_FOUND,
            ApiError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ApiError::MissingCredential(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth { status, .. } | ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            ApiError::Upstream { status, message } => {
                tracing::warn!(status, "Upstream error: {}", message);
                message.clone()
            }
            other => other.to_string(),
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
