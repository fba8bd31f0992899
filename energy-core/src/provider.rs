use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::{ForecastError, Result},
    model::{CurrentConditions, ForecastFeed, Location},
    provider::openweather::OpenWeatherClient,
    units::UnitSystem,
};

pub mod iplocation;
pub mod openweather;

/// Current conditions and the multi-step forecast for a coordinate.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, lat: f64, lon: f64, units: UnitSystem) -> Result<CurrentConditions>;

    async fn forecast(&self, lat: f64, lon: f64, units: UnitSystem) -> Result<ForecastFeed>;
}

/// Forward search and reverse lookup of named places.
#[async_trait]
pub trait GeocodingProvider: Send + Sync + Debug {
    /// Ranked matches for a free-text query; empty when nothing matches.
    async fn search(&self, query: &str) -> Result<Vec<Location>>;

    /// Nearest named place, if the provider knows one.
    async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<Location>>;
}

/// Best-effort position of the machine running the dashboard.
#[async_trait]
pub trait DeviceLocationProvider: Send + Sync + Debug {
    async fn locate(&self) -> Result<Location>;
}

/// Device location, or the default location when the lookup fails.
pub async fn locate_or_default(provider: &dyn DeviceLocationProvider) -> Location {
    match provider.locate().await {
        Ok(location) => location,
        Err(err) => {
            log::warn!("Unable to determine device location ({err}); using default location");
            Location::default_location()
        }
    }
}

/// Construct the OpenWeather client from config.
pub fn openweather_from_config(config: &Config) -> Result<OpenWeatherClient> {
    let api_key = config.api_key().ok_or_else(|| {
        ForecastError::config(
            "No OpenWeather API key configured.\n\
             Hint: run `energy configure` or set OPENWEATHER_API_KEY.",
        )
    })?;

    let client = OpenWeatherClient::new(api_key.to_owned(), config.timeout())?;
    Ok(match &config.base_url {
        Some(url) => client.with_base_url(url.clone()),
        None => client,
    })
}

/// Keeps error bodies short enough for a single log line.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FailingLocator;

    #[async_trait]
    impl DeviceLocationProvider for FailingLocator {
        async fn locate(&self) -> Result<Location> {
            Err(ForecastError::validation("no fix"))
        }
    }

    #[derive(Debug)]
    struct FixedLocator(Location);

    #[async_trait]
    impl DeviceLocationProvider for FixedLocator {
        async fn locate(&self) -> Result<Location> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn failed_lookup_falls_back_to_default() {
        let location = locate_or_default(&FailingLocator).await;
        assert_eq!(location, Location::default_location());
    }

    #[tokio::test]
    async fn successful_lookup_is_used() {
        let here = Location::from_coordinates(48.85, 2.35);
        let location = locate_or_default(&FixedLocator(here.clone())).await;
        assert_eq!(location, here);
    }

    #[test]
    fn openweather_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = openweather_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn openweather_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());
        cfg.base_url = Some("http://localhost:9999".to_string());

        let client = openweather_from_config(&cfg).expect("client should build");
        assert_eq!(client.base_url(), "http://localhost:9999");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let short = "not found";
        assert_eq!(truncate_body(short), short);

        let long = "é".repeat(300);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
    }
}
