use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use tracing::info;
use weather_core::{Config, Dispatcher, ProviderId, WeatherError};

use crate::{
    http,
    telemetry::{self, LogFormat},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather provider HTTP facade")]
pub struct Cli {
    /// Path to the TOML config file (defaults to the platform config dir).
    #[arg(long, global = true, env = "WEATHER_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve `/weather/{provider}/{location}` over HTTP.
    Serve {
        /// Address to listen on; overrides `server.bind` from the config file.
        #[arg(long, env = "WEATHER_BIND")]
        bind: Option<SocketAddr>,
    },

    /// Fetch current weather once and print the provider's JSON.
    Show {
        /// Provider short name: "openweathermap" or "tomorrow".
        provider: String,

        /// City name or "lat,lon".
        location: String,
    },

    /// Store an API key for a provider in the config file.
    Configure {
        /// Provider short name: "openweathermap" or "tomorrow".
        provider: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        telemetry::init(self.log_format);

        match self.command {
            Command::Serve { bind } => {
                let config = load_config(self.config.as_ref())?;
                let (addr, dispatcher) = prepare_server(&config, bind)?;

                info!(%addr, "configuration loaded, providers ready");
                http::serve(addr, dispatcher).await?;
            }
            Command::Show { provider, location } => {
                let config = load_config(self.config.as_ref())?;
                let dispatcher = Dispatcher::from_config(&config)?;

                let payload = dispatcher.handle(&provider, &location).await?;
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
            Command::Configure { provider } => {
                let id: ProviderId = provider.parse()?;
                configure(self.config.as_ref(), id)?;
            }
        }

        Ok(())
    }
}

/// Everything `serve` needs before it may open a socket. Any provider that
/// can't be built fails here, so a misconfigured process never listens.
fn prepare_server(
    config: &Config,
    bind: Option<SocketAddr>,
) -> Result<(SocketAddr, Dispatcher), WeatherError> {
    let dispatcher = Dispatcher::from_config(config)?;
    Ok((bind.unwrap_or(config.server.bind), dispatcher))
}

/// File config with `<PROVIDER>_API_KEY` environment variables layered on top.
fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env();
    Ok(config)
}

fn configure(path: Option<&PathBuf>, id: ProviderId) -> anyhow::Result<()> {
    let path = match path {
        Some(path) => path.clone(),
        None => Config::config_file_path()?,
    };
    let mut config = Config::load_from(&path)?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.upsert_provider_api_key(id, api_key.trim().to_string());
    config.save_to(&path)?;

    println!("Saved API key for {id} to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Config {
        let mut config = Config::default();
        config.upsert_provider_api_key(ProviderId::OpenWeatherMap, "OPEN_KEY".into());
        config.upsert_provider_api_key(ProviderId::Tomorrow, "TOMORROW_KEY".into());
        config
    }

    #[test]
    fn serve_startup_rejects_missing_key() {
        for missing in ProviderId::all() {
            let mut config = configured();
            config.providers.remove(missing.as_str());

            let err = prepare_server(&config, None).unwrap_err();
            assert!(matches!(err, WeatherError::Configuration(_)));
            assert!(err.to_string().contains(missing.api_key_env()));
        }
    }

    #[test]
    fn bind_flag_overrides_config() {
        let addr: SocketAddr = "0.0.0.0:9999".parse().unwrap();
        let (bound, _) = prepare_server(&configured(), Some(addr)).unwrap();
        assert_eq!(bound, addr);

        let (bound, _) = prepare_server(&configured(), None).unwrap();
        assert_eq!(bound, configured().server.bind);
    }
}
