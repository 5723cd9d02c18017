//! Core library for the weather facade.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over weather providers (OpenWeatherMap, Tomorrow.io)
//! - The dispatch layer routing a request to one of them
//!
//! It is used by `weather-server`, but can also be reused by other binaries or services.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod provider;

pub use config::{Config, ProviderConfig, ProviderSettings, ServerConfig};
pub use dispatch::Dispatcher;
pub use error::WeatherError;
pub use model::{Location, WeatherPayload};
pub use provider::{ProviderId, WeatherProvider};
