use crate::{
    Config, Location, WeatherError, WeatherPayload,
    provider::{openweathermap::OpenWeatherMapProvider, tomorrow::TomorrowProvider},
};
use async_trait::async_trait;
use reqwest::RequestBuilder;
use std::{fmt::Debug, str::FromStr, sync::Arc};
use tracing::{debug, warn};

pub mod openweathermap;
pub mod tomorrow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeatherMap,
    Tomorrow,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeatherMap => "openweathermap",
            ProviderId::Tomorrow => "tomorrow",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeatherMap, ProviderId::Tomorrow]
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderId::OpenWeatherMap => "OPENWEATHERMAP_API_KEY",
            ProviderId::Tomorrow => "TOMORROW_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::OpenWeatherMap => "https://api.openweathermap.org/data/2.5/weather",
            ProviderId::Tomorrow => "https://api.tomorrow.io/v4/weather/realtime",
        }
    }

    pub fn default_units(&self) -> Option<&'static str> {
        match self {
            ProviderId::OpenWeatherMap => Some("metric"),
            ProviderId::Tomorrow => None,
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = WeatherError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweathermap" => Ok(ProviderId::OpenWeatherMap),
            "tomorrow" => Ok(ProviderId::Tomorrow),
            _ => Err(WeatherError::UnknownProvider(value.to_string())),
        }
    }
}

/// Something that can fetch current weather for a named location.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn fetch(&self, location: &Location) -> Result<WeatherPayload, WeatherError>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> Result<Arc<dyn WeatherProvider>, WeatherError> {
    let settings = config.provider_settings(id)?;

    let provider: Arc<dyn WeatherProvider> = match id {
        ProviderId::OpenWeatherMap => Arc::new(OpenWeatherMapProvider::new(settings)),
        ProviderId::Tomorrow => Arc::new(TomorrowProvider::new(settings)),
    };

    Ok(provider)
}

/// Sends a prepared request and turns the response into a payload.
///
/// Failures to complete the exchange are `Transport`; a completed exchange
/// with a non-success status is `Provider`, carrying status and body.
pub(crate) async fn execute(
    provider: ProviderId,
    request: RequestBuilder,
) -> Result<WeatherPayload, WeatherError> {
    let res = request
        .send()
        .await
        .map_err(|e| transport(provider, e))?;

    let status = res.status();

    if !status.is_success() {
        // The provider has answered; a truncated body does not change that.
        let body = match res.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(%provider, %status, error = %e.without_url(), "error body unreadable");
                String::new()
            }
        };
        let message = upstream_message(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| status.to_string());
        warn!(%provider, %status, %message, "provider rejected request");

        return Err(WeatherError::Provider {
            provider,
            status,
            message,
            body: truncate_body(&body),
        });
    }

    let body = res.text().await.map_err(|e| transport(provider, e))?;
    debug!(%provider, %status, bytes = body.len(), "provider responded");

    serde_json::from_str::<WeatherPayload>(&body).map_err(|e| WeatherError::Decode {
        provider,
        reason: e.to_string(),
    })
}

/// Request URLs carry the API key as a query parameter, so they never
/// travel with the error.
fn transport(provider: ProviderId, source: reqwest::Error) -> WeatherError {
    WeatherError::Transport { provider, source: source.without_url() }
}

/// Both providers put a human-readable `message` in their JSON error bodies.
fn upstream_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }

    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .filter(|m| !m.trim().is_empty());

    Some(from_json.unwrap_or_else(|| truncate_body(body)))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
