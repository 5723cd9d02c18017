use std::fmt;

use serde_json::{Map, Value};

use crate::error::WeatherError;

/// Provider payload, relayed to the caller exactly as received.
pub type WeatherPayload = Map<String, Value>;

/// A city name or coordinate string, passed upstream as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location(String);

impl Location {
    /// Rejects blank input; anything else is left for the provider to judge.
    pub fn parse(raw: &str) -> Result<Self, WeatherError> {
        if raw.trim().is_empty() {
            return Err(WeatherError::EmptyLocation);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
