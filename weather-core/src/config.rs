use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use crate::{error::WeatherError, provider::ProviderId};

/// Per-provider overrides stored on disk. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Full endpoint URL, e.g. "https://api.tomorrow.io/v4/weather/realtime".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

/// Fully resolved provider configuration, fixed for the provider's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub api_key: String,
    pub base_url: String,
    pub units: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Example TOML:
    /// [providers.openweathermap]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    /// Load config from the default location, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Replace file-based API keys with the process environment's, where set.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for id in ProviderId::all() {
            if let Some(key) = lookup(id.api_key_env()).filter(|k| !k.trim().is_empty()) {
                self.providers.entry(id.as_str().to_string()).or_default().api_key = Some(key);
            }
        }
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Set/replace a provider API key.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.entry(provider_id.as_str().to_string()).or_default().api_key = Some(api_key);
    }

    /// Returns API key for a provider, if present and not blank.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id)
            .and_then(|cfg| cfg.api_key.as_deref())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }

    /// Resolve everything a provider needs, falling back to its defaults.
    pub fn provider_settings(&self, id: ProviderId) -> Result<ProviderSettings, WeatherError> {
        let api_key = self.provider_api_key(id).ok_or_else(|| {
            WeatherError::Configuration(format!(
                "No API key configured for provider '{id}'. \
                 Hint: set {} or run `weather-server configure {id}`.",
                id.api_key_env()
            ))
        })?;

        let overrides = self.provider_config(id);

        let base_url = overrides
            .and_then(|cfg| cfg.base_url.clone())
            .unwrap_or_else(|| id.default_base_url().to_string());

        let units = overrides
            .and_then(|cfg| cfg.units.clone())
            .or_else(|| id.default_units().map(str::to_string));

        Ok(ProviderSettings { api_key: api_key.to_string(), base_url, units })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_settings_errors_when_key_missing() {
        let cfg = Config::default();
        let err = cfg.provider_settings(ProviderId::Tomorrow).unwrap_err();

        assert!(matches!(err, WeatherError::Configuration(_)));
        assert!(err.to_string().contains("TOMORROW_API_KEY"));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeatherMap, "   ".into());

        assert!(!cfg.is_provider_configured(ProviderId::OpenWeatherMap));
        assert!(cfg.provider_settings(ProviderId::OpenWeatherMap).is_err());
    }

    #[test]
    fn provider_settings_uses_defaults() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeatherMap, "OPEN_KEY".into());
        cfg.upsert_provider_api_key(ProviderId::Tomorrow, "TOMORROW_KEY".into());

        let owm = cfg.provider_settings(ProviderId::OpenWeatherMap).unwrap();
        assert_eq!(owm.api_key, "OPEN_KEY");
        assert_eq!(owm.base_url, "https://api.openweathermap.org/data/2.5/weather");
        assert_eq!(owm.units.as_deref(), Some("metric"));

        let tomorrow = cfg.provider_settings(ProviderId::Tomorrow).unwrap();
        assert_eq!(tomorrow.base_url, "https://api.tomorrow.io/v4/weather/realtime");
        assert_eq!(tomorrow.units, None);
    }

    #[test]
    fn env_overrides_file_keys() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeatherMap, "FROM_FILE".into());

        cfg.apply_env_with(|name| match name {
            "OPENWEATHERMAP_API_KEY" => Some("FROM_ENV".to_string()),
            "TOMORROW_API_KEY" => Some(String::new()),
            _ => None,
        });

        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeatherMap), Some("FROM_ENV"));
        assert!(!cfg.is_provider_configured(ProviderId::Tomorrow));
    }

    #[test]
    fn parses_toml_with_overrides() {
        let cfg: Config = toml::from_str(
            r#"
            [server]
            bind = "0.0.0.0:9000"

            [providers.tomorrow]
            api_key = "T"
            base_url = "http://localhost:1234/realtime"
            units = "imperial"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.bind, SocketAddr::from(([0, 0, 0, 0], 9000)));

        let settings = cfg.provider_settings(ProviderId::Tomorrow).unwrap();
        assert_eq!(settings.base_url, "http://localhost:1234/realtime");
        assert_eq!(settings.units.as_deref(), Some("imperial"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("weather-server-does-not-exist/config.toml");
        let cfg = Config::load_from(&path).unwrap();

        assert!(cfg.providers.is_empty());
        assert_eq!(cfg.server.bind, default_bind());
    }

    #[test]
    fn save_then_load_keeps_keys() {
        let dir = std::env::temp_dir().join(format!("weather-server-cfg-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::Tomorrow, "SAVED".into());
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.provider_api_key(ProviderId::Tomorrow), Some("SAVED"));

        fs::remove_dir_all(&dir).ok();
    }
}
