use aivis_core::{AnalysisError, InputError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::checkout::CheckoutError;

/// Error body returned by every API route
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),

    #[error("invalid request body: {0}")]
    MalformedBody(String),

    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    #[error("analysis failed: {0}")]
    Analysis(String),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

impl From<AnalysisError> for ApiError {
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::InvalidInput(input) => ApiError::InvalidInput(input),
            other => ApiError::Analysis(other.to_string()),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::MalformedBody(_) | ApiError::InvalidEmail(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Checkout(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short, stable label for the `error` field
    fn label(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(InputError::MissingUrl) => "missing url",
            ApiError::InvalidInput(InputError::MalformedUrl { .. })
            | ApiError::InvalidInput(InputError::UnsupportedScheme(_)) => "invalid url",
            ApiError::InvalidInput(InputError::UnknownMode(_)) => "invalid mode",
            ApiError::MalformedBody(_) => "invalid request body",
            ApiError::InvalidEmail(_) => "invalid email",
            ApiError::Analysis(_) => "analysis failed",
            ApiError::Checkout(_) => "checkout failed",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            None
        } else {
            tracing::debug!(error = %self, "rejected request");
            Some(self.to_string())
        };

        let body = ErrorResponse {
            error: self.label().to_string(),
            detail,
        };
        (status, Json(body)).into_response()
    }
}
