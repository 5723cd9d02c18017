use clap::ValueEnum;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "weather_server=info,weather_core=info,tower_http=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match format {
        LogFormat::Json => fmt().json().with_env_filter(env_filter).with_target(true).init(),
        LogFormat::Text => fmt().with_env_filter(env_filter).with_target(true).init(),
    }
}
