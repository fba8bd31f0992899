use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Meters per second in one mile per hour.
pub const MPH_TO_MPS: f64 = 0.44704;

/// Display/derivation switch. Stored values are never rewritten; the
/// provider is asked for values in the selected system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    /// Value of the OpenWeather `units` query parameter.
    pub fn api_param(&self) -> &'static str {
        self.as_str()
    }

    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn wind_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

pub fn format_temperature(temp: f64, units: UnitSystem) -> String {
    format!("{}{}", temp.round(), units.temperature_suffix())
}

pub fn format_wind_speed(speed: f64, units: UnitSystem) -> String {
    format!("{speed:.1} {}", units.wind_suffix())
}

/// Normalizes a wind speed reported in `units` to meters per second.
pub fn to_meters_per_second(speed: f64, units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Metric => speed,
        UnitSystem::Imperial => speed * MPH_TO_MPS,
    }
}
