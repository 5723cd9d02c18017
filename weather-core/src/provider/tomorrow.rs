use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;

use crate::{Location, WeatherError, WeatherPayload, config::ProviderSettings};

use super::{ProviderId, WeatherProvider, execute};

/// Tomorrow.io realtime weather.
#[derive(Debug, Clone)]
pub struct TomorrowProvider {
    settings: ProviderSettings,
    http: Client,
}

impl TomorrowProvider {
    pub fn new(settings: ProviderSettings) -> Self {
        Self::with_client(settings, Client::new())
    }

    pub fn with_client(settings: ProviderSettings, http: Client) -> Self {
        Self { settings, http }
    }
}

#[async_trait]
impl WeatherProvider for TomorrowProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Tomorrow
    }

    #[instrument(skip(self), fields(provider = "tomorrow"))]
    async fn fetch(&self, location: &Location) -> Result<WeatherPayload, WeatherError> {
        // Tomorrow.io takes the key as a query parameter, not a header.
        let mut query = vec![
            ("location", location.as_str()),
            ("apikey", self.settings.api_key.as_str()),
        ];
        if let Some(units) = self.settings.units.as_deref() {
            query.push(("units", units));
        }

        let request = self.http.get(&self.settings.base_url).query(&query);
        execute(self.id(), request).await
    }
}
