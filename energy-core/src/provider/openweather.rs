use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    error::{ForecastError, Result},
    model::{CurrentConditions, ForecastFeed, ForecastSample, Location, WeatherCondition},
    units::UnitSystem,
};

use super::{GeocodingProvider, WeatherProvider, truncate_body};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Maximum number of forward geocoding matches requested.
pub const SEARCH_LIMIT: u8 = 5;

/// Queries shorter than this are not sent to the geocoder.
pub const MIN_QUERY_LEN: usize = 2;

/// Client for the free OpenWeather current, 5-day/3-hour forecast and
/// geocoding endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ForecastError::Transport {
                endpoint: "HTTP client setup",
                source,
            })?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http,
        })
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        log::debug!("GET {url} ({endpoint})");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| ForecastError::Transport { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| ForecastError::Transport { endpoint, source })?;

        if !status.is_success() {
            return Err(ForecastError::Status {
                endpoint,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        parse_body(endpoint, &body)
    }
}

fn parse_body<T: DeserializeOwned>(endpoint: &'static str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|source| ForecastError::Decode { endpoint, source })
}

fn coordinate_query(lat: f64, lon: f64) -> Vec<(&'static str, String)> {
    vec![("lat", lat.to_string()), ("lon", lon.to_string())]
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, lat: f64, lon: f64, units: UnitSystem) -> Result<CurrentConditions> {
        let mut query = coordinate_query(lat, lon);
        query.push(("units", units.api_param().to_string()));

        let raw: OwCurrentResponse = self.get_json("current weather", "/data/2.5/weather", &query).await?;
        raw.normalize()
    }

    async fn forecast(&self, lat: f64, lon: f64, units: UnitSystem) -> Result<ForecastFeed> {
        let mut query = coordinate_query(lat, lon);
        query.push(("units", units.api_param().to_string()));

        let raw: OwForecastResponse = self.get_json("forecast", "/data/2.5/forecast", &query).await?;
        raw.normalize()
    }
}

#[async_trait]
impl GeocodingProvider for OpenWeatherClient {
    async fn search(&self, query: &str) -> Result<Vec<Location>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let params = [("q", query.to_string()), ("limit", SEARCH_LIMIT.to_string())];
        let raw: Vec<OwPlace> = self.get_json("location search", "/geo/1.0/direct", &params).await?;

        let locations: Vec<Location> = raw.into_iter().map(Location::from).collect();
        log::debug!("location search '{query}' matched {}", locations.len());
        Ok(locations)
    }

    async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<Location>> {
        let mut params = coordinate_query(lat, lon);
        params.push(("limit", "1".to_string()));

        let raw: Vec<OwPlace> = self.get_json("reverse geocoding", "/geo/1.0/reverse", &params).await?;
        Ok(raw.into_iter().next().map(Location::from))
    }
}

fn require<T>(value: Option<T>, field: &str, context: &str) -> Result<T> {
    value.ok_or_else(|| ForecastError::missing(field, context))
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: Option<u32>,
    main: Option<String>,
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: Option<i64>,
    main: Option<OwMain>,
    weather: Option<Vec<OwWeather>>,
    wind: Option<OwWind>,
    clouds: Option<OwClouds>,
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    /// Shift in seconds from UTC.
    timezone: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: Option<i64>,
    main: Option<OwMain>,
    weather: Option<Vec<OwWeather>>,
    wind: Option<OwWind>,
    clouds: Option<OwClouds>,
    pop: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: Option<OwCity>,
    list: Option<Vec<OwForecastEntry>>,
}

#[derive(Debug, Deserialize)]
struct OwPlace {
    name: String,
    #[serde(default)]
    country: String,
    state: Option<String>,
    lat: f64,
    lon: f64,
}

impl From<OwPlace> for Location {
    fn from(place: OwPlace) -> Self {
        Location {
            name: place.name,
            country: place.country,
            state: place.state,
            lat: place.lat,
            lon: place.lon,
        }
    }
}

impl OwWeather {
    fn normalize(self, context: &str) -> Result<WeatherCondition> {
        Ok(WeatherCondition {
            id: require(self.id, "weather.id", context)?,
            main: require(self.main, "weather.main", context)?,
            description: require(self.description, "weather.description", context)?,
            icon: require(self.icon, "weather.icon", context)?,
        })
    }
}

/// First entry of the `weather` array; OpenWeather lists the primary condition first.
fn primary_condition(weather: Option<Vec<OwWeather>>, context: &str) -> Result<WeatherCondition> {
    require(weather, "weather", context)?
        .into_iter()
        .next()
        .ok_or_else(|| ForecastError::missing("weather[0]", context))?
        .normalize(context)
}

impl OwCurrentResponse {
    fn normalize(self) -> Result<CurrentConditions> {
        const CTX: &str = "current weather response";

        let main = require(self.main, "main", CTX)?;
        let wind = require(self.wind, "wind", CTX)?;
        let clouds = require(self.clouds, "clouds", CTX)?;

        Ok(CurrentConditions {
            dt: require(self.dt, "dt", CTX)?,
            temp: require(main.temp, "main.temp", CTX)?,
            feels_like: require(main.feels_like, "main.feels_like", CTX)?,
            humidity: require(main.humidity, "main.humidity", CTX)?,
            wind_speed: require(wind.speed, "wind.speed", CTX)?,
            wind_deg: require(wind.deg, "wind.deg", CTX)?,
            clouds: require(clouds.all, "clouds.all", CTX)?,
            visibility: require(self.visibility, "visibility", CTX)?,
            weather: primary_condition(self.weather, CTX)?,
        })
    }
}

impl OwForecastEntry {
    fn normalize(self, context: &str) -> Result<ForecastSample> {
        let main = require(self.main, "main", context)?;
        let wind = require(self.wind, "wind", context)?;
        let clouds = require(self.clouds, "clouds", context)?;

        Ok(ForecastSample {
            dt: require(self.dt, "dt", context)?,
            temp: require(main.temp, "main.temp", context)?,
            feels_like: require(main.feels_like, "main.feels_like", context)?,
            temp_min: require(main.temp_min, "main.temp_min", context)?,
            temp_max: require(main.temp_max, "main.temp_max", context)?,
            humidity: require(main.humidity, "main.humidity", context)?,
            pop: require(self.pop, "pop", context)?,
            wind_speed: require(wind.speed, "wind.speed", context)?,
            wind_deg: require(wind.deg, "wind.deg", context)?,
            clouds: require(clouds.all, "clouds.all", context)?,
            weather: primary_condition(self.weather, context)?,
        })
    }
}

impl OwForecastResponse {
    fn normalize(self) -> Result<ForecastFeed> {
        const CTX: &str = "forecast response";

        let city = require(self.city, "city", CTX)?;
        let list = require(self.list, "list", CTX)?;

        let samples = list
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| entry.normalize(&format!("forecast entry {idx}")))
            .collect::<Result<Vec<_>>>()?;

        Ok(ForecastFeed {
            utc_offset_secs: require(city.timezone, "city.timezone", CTX)?,
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRENT_JSON: &str = r#"{
        "coord": {"lon": -0.1257, "lat": 51.5085},
        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
        "main": {"temp": 14.2, "feels_like": 13.6, "temp_min": 12.9, "temp_max": 15.1, "pressure": 1012, "humidity": 76},
        "visibility": 10000,
        "wind": {"speed": 5.7, "deg": 240},
        "clouds": {"all": 75},
        "dt": 1717243200,
        "timezone": 3600,
        "name": "London"
    }"#;

    const FORECAST_JSON: &str = r#"{
        "cod": "200",
        "cnt": 2,
        "list": [
            {
                "dt": 1717243200,
                "main": {"temp": 14.2, "feels_like": 13.6, "temp_min": 12.9, "temp_max": 15.1, "humidity": 76},
                "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
                "clouds": {"all": 75},
                "wind": {"speed": 5.7, "deg": 240, "gust": 9.1},
                "visibility": 10000,
                "pop": 0.35
            },
            {
                "dt": 1717254000,
                "main": {"temp": 16.0, "feels_like": 15.5, "temp_min": 15.8, "temp_max": 16.4, "humidity": 70},
                "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
                "clouds": {"all": 90},
                "wind": {"speed": 6.2, "deg": 250},
                "pop": 0.8
            }
        ],
        "city": {"id": 2643743, "name": "London", "country": "GB", "timezone": 3600}
    }"#;

    #[test]
    fn current_response_is_normalized() {
        let raw: OwCurrentResponse = parse_body("current weather", CURRENT_JSON).unwrap();
        let current = raw.normalize().unwrap();

        assert_eq!(current.dt, 1_717_243_200);
        assert_eq!(current.temp, 14.2);
        assert_eq!(current.humidity, 76);
        assert_eq!(current.wind_deg, 240.0);
        assert_eq!(current.clouds, 75.0);
        assert_eq!(current.visibility, 10_000.0);
        assert_eq!(current.weather.description, "broken clouds");
    }

    #[test]
    fn forecast_response_is_normalized() {
        let raw: OwForecastResponse = parse_body("forecast", FORECAST_JSON).unwrap();
        let feed = raw.normalize().unwrap();

        assert_eq!(feed.utc_offset_secs, 3600);
        assert_eq!(feed.samples.len(), 2);
        assert_eq!(feed.samples[1].pop, 0.8);
        assert_eq!(feed.samples[1].weather.main, "Rain");
        assert_eq!(feed.samples[0].temp_min, 12.9);
    }

    #[test]
    fn missing_field_is_a_validation_error() {
        let json = FORECAST_JSON.replace(r#""clouds": {"all": 90},"#, "");
        let raw: OwForecastResponse = parse_body("forecast", &json).unwrap();
        let err = raw.normalize().unwrap_err();

        assert!(matches!(err, ForecastError::Validation { .. }));
        assert!(err.to_string().contains("forecast entry 1"));
        assert!(err.to_string().contains("clouds"));
    }

    #[test]
    fn empty_weather_array_is_a_validation_error() {
        let json = CURRENT_JSON.replace(
            r#"[{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}]"#,
            "[]",
        );
        let raw: OwCurrentResponse = parse_body("current weather", &json).unwrap();
        let err = raw.normalize().unwrap_err();
        assert!(err.to_string().contains("weather[0]"));
    }

    #[test]
    fn empty_forecast_list_is_not_an_error() {
        let json = r#"{"list": [], "city": {"name": "Nowhere", "timezone": 0}}"#;
        let raw: OwForecastResponse = parse_body("forecast", json).unwrap();
        let feed = raw.normalize().unwrap();
        assert!(feed.samples.is_empty());
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = parse_body::<OwForecastResponse>("forecast", "<html>").unwrap_err();
        assert!(matches!(err, ForecastError::Decode { endpoint: "forecast", .. }));
    }

    #[test]
    fn places_convert_to_locations() {
        let json = r#"[
            {"name": "Portland", "lat": 45.5152, "lon": -122.6784, "country": "US", "state": "Oregon"},
            {"name": "Portland", "lat": 43.6591, "lon": -70.2568, "country": "US", "state": "Maine"},
            {"name": "Atlantis", "lat": 0.0, "lon": 0.0}
        ]"#;
        let raw: Vec<OwPlace> = parse_body("location search", json).unwrap();
        let locations: Vec<Location> = raw.into_iter().map(Location::from).collect();

        assert_eq!(locations.len(), 3);
        assert_eq!(locations[0].display_name(), "Portland, Oregon, US");
        assert_eq!(locations[1].state.as_deref(), Some("Maine"));
        assert_eq!(locations[2].country, "");
    }

    #[tokio::test]
    async fn short_query_returns_empty_without_request() {
        // Unroutable base URL: any request would fail.
        let client = OpenWeatherClient::new("KEY".into(), Duration::from_millis(10))
            .unwrap()
            .with_base_url("http://127.0.0.1:9".into());

        assert!(client.search("").await.unwrap().is_empty());
        assert!(client.search(" a ").await.unwrap().is_empty());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = OpenWeatherClient::new("KEY".into(), Duration::from_secs(1))
            .unwrap()
            .with_base_url("http://proxy.local/".into());
        assert_eq!(client.base_url(), "http://proxy.local");
    }
}
