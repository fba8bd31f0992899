//! The dashboard context: everything the presentation layer owns, threaded
//! explicitly through each refresh instead of living in global state.

use serde::Serialize;

use crate::{
    Config,
    aggregate::{HeuristicUv, TimeBasis, aggregate},
    energy::{BestTimes, EnergySummary, best_times, build_energy_forecast},
    error::Result,
    model::{EnergyForecast, Location, WeatherData},
    provider::{GeocodingProvider, WeatherProvider},
    units::UnitSystem,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub location: Location,
    pub units: UnitSystem,
    #[serde(skip)]
    pub basis: TimeBasis,
    #[serde(skip)]
    pub window_hours: usize,
    pub weather: Option<WeatherData>,
    pub energy: Option<EnergyForecast>,
}

impl Dashboard {
    pub fn new(location: Location, config: &Config) -> Self {
        Self {
            location,
            units: config.units,
            basis: config.time_basis,
            window_hours: config.window_hours,
            weather: None,
            energy: None,
        }
    }

    /// Switches location; derived data is dropped until the next refresh.
    pub fn with_location(self, location: Location) -> Self {
        Self {
            location,
            weather: None,
            energy: None,
            ..self
        }
    }

    /// Switches unit system; stored values were fetched in the old system,
    /// so derived data is dropped until the next refresh.
    pub fn with_units(self, units: UnitSystem) -> Self {
        if units == self.units {
            return self;
        }
        Self {
            units,
            weather: None,
            energy: None,
            ..self
        }
    }

    pub fn with_window_hours(self, window_hours: usize) -> Self {
        Self { window_hours, ..self }
    }

    pub fn is_loaded(&self) -> bool {
        self.weather.is_some()
    }

    /// Fetches current conditions, the forecast and the place name for the
    /// selected location, then rebuilds every derived record.
    ///
    /// All three requests run concurrently and must succeed; there is no
    /// retry. The refreshed context is returned as a new value, so on error
    /// the caller still holds the previous one.
    pub async fn refresh(
        &self,
        weather: &dyn WeatherProvider,
        geocoder: &dyn GeocodingProvider,
    ) -> Result<Self> {
        let (lat, lon) = (self.location.lat, self.location.lon);
        log::info!("Refreshing forecast for {} ({lat:.4}, {lon:.4})", self.location.display_name());

        let (current, feed, place) = tokio::try_join!(
            weather.current(lat, lon, self.units),
            weather.forecast(lat, lon, self.units),
            geocoder.reverse(lat, lon),
        )?;

        let location = place
            .map(|p| Location { lat, lon, ..p })
            .unwrap_or_else(|| Location {
                name: "Unknown".to_string(),
                country: String::new(),
                state: None,
                lat,
                lon,
            });

        let data = aggregate(location.clone(), &current, &feed, self.basis, &HeuristicUv)?;
        let energy = build_energy_forecast(&data.hourly, self.units, self.window_hours, data.offset())?;

        Ok(Self {
            location,
            units: self.units,
            basis: self.basis,
            window_hours: self.window_hours,
            weather: Some(data),
            energy: Some(energy),
        })
    }

    pub fn best_times(&self) -> Option<BestTimes> {
        self.energy.as_ref().and_then(best_times)
    }

    pub fn summary(&self) -> Option<EnergySummary> {
        self.energy.as_ref().and_then(EnergySummary::from_forecast)
    }
}
