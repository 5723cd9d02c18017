//! Routes a (provider name, location) pair to the matching provider.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    Config, Location, WeatherError, WeatherPayload,
    provider::{ProviderId, WeatherProvider, provider_from_config},
};

/// Holds exactly one provider per [`ProviderId`].
///
/// Stateless between calls; cloning only bumps reference counts.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    openweathermap: Arc<dyn WeatherProvider>,
    tomorrow: Arc<dyn WeatherProvider>,
}

impl Dispatcher {
    pub fn new(
        openweathermap: Arc<dyn WeatherProvider>,
        tomorrow: Arc<dyn WeatherProvider>,
    ) -> Self {
        Self { openweathermap, tomorrow }
    }

    /// Build every provider up front. A missing API key for any of them
    /// is a `Configuration` error.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        Ok(Self::new(
            provider_from_config(ProviderId::OpenWeatherMap, config)?,
            provider_from_config(ProviderId::Tomorrow, config)?,
        ))
    }

    pub fn provider(&self, id: ProviderId) -> &dyn WeatherProvider {
        match id {
            ProviderId::OpenWeatherMap => self.openweathermap.as_ref(),
            ProviderId::Tomorrow => self.tomorrow.as_ref(),
        }
    }

    /// Untyped entry point used by the HTTP and CLI surfaces.
    #[instrument(skip(self))]
    pub async fn handle(
        &self,
        provider: &str,
        location: &str,
    ) -> Result<WeatherPayload, WeatherError> {
        let id: ProviderId = provider.parse()?;
        let location = Location::parse(location)?;
        self.dispatch(id, &location).await
    }

    pub async fn dispatch(
        &self,
        id: ProviderId,
        location: &Location,
    ) -> Result<WeatherPayload, WeatherError> {
        debug!(provider = %id, %location, "dispatching weather request");
        self.provider(id).fetch(location).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockWeatherProvider;
    use reqwest::StatusCode;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> WeatherPayload {
        value.as_object().cloned().unwrap()
    }

    fn idle_mock(id: ProviderId) -> Arc<dyn WeatherProvider> {
        let mut mock = MockWeatherProvider::new();
        mock.expect_id().return_const(id);
        mock.expect_fetch().never();
        Arc::new(mock)
    }

    #[tokio::test]
    async fn routes_to_openweathermap_and_relays_payload() {
        let mut owm = MockWeatherProvider::new();
        owm.expect_fetch()
            .withf(|loc| loc.as_str() == "London")
            .times(1)
            .returning(|_| Ok(payload(json!({"temp": 15}))));

        let dispatcher = Dispatcher::new(Arc::new(owm), idle_mock(ProviderId::Tomorrow));
        let result = dispatcher.handle("openweathermap", "London").await.unwrap();

        assert_eq!(result, payload(json!({"temp": 15})));
    }

    #[tokio::test]
    async fn routes_to_tomorrow_and_passes_provider_error_through() {
        let mut tomorrow = MockWeatherProvider::new();
        tomorrow.expect_fetch().times(1).returning(|_| {
            Err(WeatherError::Provider {
                provider: ProviderId::Tomorrow,
                status: StatusCode::UNAUTHORIZED,
                message: "Invalid Auth".into(),
                body: String::new(),
            })
        });

        let dispatcher = Dispatcher::new(idle_mock(ProviderId::OpenWeatherMap), Arc::new(tomorrow));
        let err = dispatcher.handle("tomorrow", "Paris").await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn unknown_provider_is_an_error_not_a_panic() {
        let dispatcher = Dispatcher::new(
            idle_mock(ProviderId::OpenWeatherMap),
            idle_mock(ProviderId::Tomorrow),
        );

        let err = dispatcher.handle("accuweather", "Berlin").await.unwrap_err();
        assert!(matches!(err, WeatherError::UnknownProvider(ref name) if name == "accuweather"));
    }

    #[tokio::test]
    async fn blank_location_never_reaches_provider() {
        let dispatcher = Dispatcher::new(
            idle_mock(ProviderId::OpenWeatherMap),
            idle_mock(ProviderId::Tomorrow),
        );

        let err = dispatcher.handle("openweathermap", " ").await.unwrap_err();
        assert!(matches!(err, WeatherError::EmptyLocation));
    }

    #[test]
    fn provider_lookup_is_exhaustive() {
        let dispatcher = Dispatcher::new(
            idle_mock(ProviderId::OpenWeatherMap),
            idle_mock(ProviderId::Tomorrow),
        );

        for id in ProviderId::all() {
            assert_eq!(dispatcher.provider(*id).id(), *id);
        }
    }

    #[test]
    fn from_config_requires_every_key() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeatherMap, "OPEN_KEY".into());

        let err = Dispatcher::from_config(&cfg).unwrap_err();
        assert!(matches!(err, WeatherError::Configuration(_)));
        assert!(err.to_string().contains("tomorrow"));

        cfg.upsert_provider_api_key(ProviderId::Tomorrow, "TOMORROW_KEY".into());
        assert!(Dispatcher::from_config(&cfg).is_ok());
    }
}
