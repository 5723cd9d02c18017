use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;

use crate::{Location, WeatherError, WeatherPayload, config::ProviderSettings};

use super::{ProviderId, WeatherProvider, execute};

#[derive(Debug, Clone)]
pub struct OpenWeatherMapProvider {
    settings: ProviderSettings,
    http: Client,
}

impl OpenWeatherMapProvider {
    pub fn new(settings: ProviderSettings) -> Self {
        Self::with_client(settings, Client::new())
    }

    pub fn with_client(settings: ProviderSettings, http: Client) -> Self {
        Self { settings, http }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeatherMap
    }

    #[instrument(skip(self), fields(provider = "openweathermap"))]
    async fn fetch(&self, location: &Location) -> Result<WeatherPayload, WeatherError> {
        let mut query = vec![
            ("q", location.as_str()),
            ("appid", self.settings.api_key.as_str()),
        ];
        if let Some(units) = self.settings.units.as_deref() {
            query.push(("units", units));
        }

        let request = self.http.get(&self.settings.base_url).query(&query);
        execute(self.id(), request).await
    }
}
