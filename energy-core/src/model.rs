use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub id: u32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// A named place; used both as a search result and as the forecast anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    /// Used when device location cannot be determined.
    pub fn default_location() -> Self {
        Self {
            name: "New York".to_string(),
            country: "US".to_string(),
            state: Some("New York".to_string()),
            lat: 40.7128,
            lon: -74.0060,
        }
    }

    pub fn from_coordinates(lat: f64, lon: f64) -> Self {
        Self {
            name: format!("{lat:.4}, {lon:.4}"),
            country: String::new(),
            state: None,
            lat,
            lon,
        }
    }

    /// `Name, State, CC` with empty parts skipped.
    pub fn display_name(&self) -> String {
        [Some(self.name.as_str()), self.state.as_deref(), Some(self.country.as_str())]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Current conditions as delivered by a weather provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub clouds: f64,
    pub visibility: f64,
    pub weather: WeatherCondition,
}

/// One step of a provider's forecast feed. `pop` is a 0..1 probability.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
    pub pop: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub clouds: f64,
    pub weather: WeatherCondition,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastFeed {
    /// Offset of the forecast location from UTC, in seconds.
    pub utc_offset_secs: i32,
    pub samples: Vec<ForecastSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub clouds: f64,
    /// Estimated; the free feed carries no UV data.
    pub uvi: f64,
    /// Current conditions carry no precipitation probability.
    pub pop: Option<f64>,
    pub visibility: f64,
    pub weather: WeatherCondition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub dt: i64,
    pub temp: f64,
    pub weather: WeatherCondition,
    /// Percent, 0..100.
    pub pop: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub clouds: f64,
    pub uvi: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayTemperatures {
    pub day: f64,
    pub min: f64,
    pub max: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayFeelsLike {
    pub day: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Timestamp of the first sample folded into this day.
    pub dt: i64,
    pub date: NaiveDate,
    /// Not derivable from the 3-hour feed; always 0.
    pub sunrise: i64,
    pub sunset: i64,
    pub temp: DayTemperatures,
    pub feels_like: DayFeelsLike,
    pub weather: WeatherCondition,
    pub clouds: f64,
    pub pop: f64,
    pub uvi: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
}

/// Normalized weather for one location, recomputed on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub location: Location,
    pub utc_offset_secs: i32,
    pub current: WeatherObservation,
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<DailyForecast>,
}

impl WeatherData {
    /// Local offset of the forecast location, UTC if the stored value is invalid.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_secs).unwrap_or_else(|| Utc.fix())
    }
}

/// Index-aligned solar/wind/label series.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EnergyForecast {
    solar: Vec<f64>,
    wind: Vec<f64>,
    labels: Vec<String>,
}

impl EnergyForecast {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            solar: Vec::with_capacity(capacity),
            wind: Vec::with_capacity(capacity),
            labels: Vec::with_capacity(capacity),
        }
    }

    /// Rebuilds a forecast from separate series. Lengths must agree and
    /// every score must be finite, so a non-empty forecast always has a peak.
    pub fn from_series(solar: Vec<f64>, wind: Vec<f64>, labels: Vec<String>) -> Result<Self> {
        if solar.len() != wind.len() || wind.len() != labels.len() {
            return Err(ForecastError::validation(format!(
                "energy series lengths differ: solar={}, wind={}, labels={}",
                solar.len(),
                wind.len(),
                labels.len()
            )));
        }
        for (series, values) in [("solar", &solar), ("wind", &wind)] {
            if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
                return Err(ForecastError::validation(format!(
                    "{series} score {idx} is not finite ({})",
                    values[idx]
                )));
            }
        }
        Ok(Self { solar, wind, labels })
    }

    pub fn push(&mut self, solar: f64, wind: f64, label: String) {
        self.solar.push(solar);
        self.wind.push(wind);
        self.labels.push(label);
    }

    pub fn solar(&self) -> &[f64] {
        &self.solar
    }

    pub fn wind(&self) -> &[f64] {
        &self.wind
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Elementwise solar + wind.
    pub fn combined(&self) -> Vec<f64> {
        self.solar.iter().zip(&self.wind).map(|(s, w)| s + w).collect()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_skips_missing_parts() {
        let mut loc = Location {
            name: "Springfield".into(),
            country: "US".into(),
            state: Some("Illinois".into()),
            lat: 39.8,
            lon: -89.6,
        };
        assert_eq!(loc.display_name(), "Springfield, Illinois, US");

        loc.state = None;
        assert_eq!(loc.display_name(), "Springfield, US");

        loc.country.clear();
        assert_eq!(loc.display_name(), "Springfield");
    }

    #[test]
    fn coordinates_location_is_named_after_position() {
        let loc = Location::from_coordinates(51.5, -0.12);
        assert_eq!(loc.name, "51.5000, -0.1200");
    }

    #[test]
    fn from_series_rejects_mismatched_lengths() {
        let err = EnergyForecast::from_series(vec![1.0], vec![], vec!["a".into()]).unwrap_err();
        assert!(matches!(err, ForecastError::Validation { .. }));
    }

    #[test]
    fn from_series_rejects_non_finite_scores() {
        let err = EnergyForecast::from_series(
            vec![10.0, 20.0],
            vec![f64::NAN, f64::NAN],
            vec!["6:00 AM".into(), "9:00 AM".into()],
        )
        .unwrap_err();
        assert!(matches!(err, ForecastError::Validation { .. }));
        assert!(err.to_string().contains("wind score 0 is not finite"));
    }

    #[test]
    fn push_keeps_series_aligned() {
        let mut forecast = EnergyForecast::default();
        forecast.push(10.0, 60.0, "6:00 AM".into());
        forecast.push(80.0, 20.0, "12:00 PM".into());

        assert_eq!(forecast.len(), 2);
        assert_eq!(forecast.solar().len(), forecast.wind().len());
        assert_eq!(forecast.combined(), vec![70.0, 100.0]);
    }

    #[test]
    fn location_toml_roundtrip_without_state() {
        let loc = Location::from_coordinates(1.0, 2.0);
        let text = toml::to_string(&loc).unwrap();
        assert!(!text.contains("state"));
        let back: Location = toml::from_str(&text).unwrap();
        assert_eq!(back, loc);
    }
}
