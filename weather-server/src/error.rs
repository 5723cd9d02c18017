//! HTTP error responses for dispatcher failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use weather_core::WeatherError;

/// Caller-facing error, already mapped to an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<String>,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into(), details: None }
    }
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        match err {
            // Relay the provider's own verdict.
            WeatherError::Provider { status, message, body, .. } => Self {
                status,
                code: "provider_error",
                message,
                details: (!body.is_empty()).then_some(body),
            },
            WeatherError::Transport { provider, source } => {
                warn!(%provider, error = %source, "provider unreachable");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "upstream_unavailable",
                    "Weather provider is currently unavailable",
                )
            }
            err @ WeatherError::Decode { .. } => {
                warn!(error = %err, "provider payload rejected");
                Self::new(StatusCode::BAD_GATEWAY, "bad_gateway", err.to_string())
            }
            err @ WeatherError::UnknownProvider(_) => {
                Self::new(StatusCode::NOT_FOUND, "unknown_provider", err.to_string())
            }
            err @ WeatherError::EmptyLocation => {
                Self::new(StatusCode::BAD_REQUEST, "bad_request", err.to_string())
            }
            err @ WeatherError::Configuration(_) => {
                error!(error = %err, "configuration error at request time");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            code: self.code.to_string(),
            details: self.details,
        };

        (self.status, Json(body)).into_response()
    }
}
