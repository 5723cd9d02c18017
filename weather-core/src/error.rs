use reqwest::StatusCode;
use thiserror::Error;

use crate::provider::ProviderId;

/// Everything that can go wrong between an inbound request and a provider.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The exchange with the provider could not be completed at all
    /// (DNS failure, connection refused, timeout, broken body stream).
    #[error("{provider} is unreachable: {source}")]
    Transport {
        provider: ProviderId,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered, but with a non-success status.
    #[error("{provider} request failed with status {status}: {message}")]
    Provider {
        provider: ProviderId,
        status: StatusCode,
        message: String,
        body: String,
    },

    /// The provider answered with success, but the body is not a JSON object.
    #[error("{provider} returned an undecodable payload: {reason}")]
    Decode { provider: ProviderId, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown provider '{0}'. Supported providers: openweathermap, tomorrow.")]
    UnknownProvider(String),

    #[error("Location must not be empty")]
    EmptyLocation,
}

impl WeatherError {
    pub fn is_transport(&self) -> bool {
        matches!(self, WeatherError::Transport { .. })
    }

    /// Upstream status for `Provider` errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            WeatherError::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }
}
