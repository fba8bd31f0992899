//! Renewable energy potential: per-sample scores, the hourly series built
//! from them, and selections over that series.

pub mod best_time;
pub mod forecast;
pub mod potential;
pub mod summary;

pub use best_time::{BestTimes, best_times};
pub use forecast::{DEFAULT_WINDOW_HOURS, build_energy_forecast};
pub use potential::{solar_potential, wind_potential};
pub use summary::{EnergySummary, SeriesSummary};
