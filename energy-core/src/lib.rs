//! Core library for the `energy` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstractions over weather, geocoding and device-location providers
//! - The forecast aggregation pipeline (raw feed → hourly/daily views)
//! - Solar and wind potential scoring and the energy forecast built on it
//!
//! Everything past the provider boundary is pure: the same feed always
//! yields the same forecast.

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod energy;
pub mod error;
pub mod model;
pub mod provider;
pub mod timefmt;
pub mod units;

pub use aggregate::{HeuristicUv, TimeBasis, UvEstimator};
pub use config::Config;
pub use dashboard::Dashboard;
pub use energy::{BestTimes, EnergySummary, best_times, build_energy_forecast, solar_potential, wind_potential};
pub use error::ForecastError;
pub use model::{DailyForecast, EnergyForecast, HourlyForecast, Location, WeatherData, WeatherObservation};
pub use provider::{DeviceLocationProvider, GeocodingProvider, WeatherProvider};
pub use units::UnitSystem;
