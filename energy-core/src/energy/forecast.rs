use chrono::FixedOffset;

use crate::{
    error::Result,
    model::{EnergyForecast, HourlyForecast},
    timefmt::{Clock, format_time},
    units::UnitSystem,
};

use super::potential::{solar_potential, wind_potential};

pub const DEFAULT_WINDOW_HOURS: usize = 24;

/// Scores the first `window_hours` entries of `hourly`.
///
/// Shorter inputs give a shorter forecast; nothing is padded. Labels are
/// 12-hour clock times in `offset`.
pub fn build_energy_forecast(
    hourly: &[HourlyForecast],
    units: UnitSystem,
    window_hours: usize,
    offset: FixedOffset,
) -> Result<EnergyForecast> {
    let window = &hourly[..hourly.len().min(window_hours)];
    let mut forecast = EnergyForecast::with_capacity(window.len());

    for entry in window {
        forecast.push(
            solar_potential(entry.uvi, entry.clouds),
            wind_potential(entry.wind_speed, units),
            format_time(entry.dt, offset, Clock::H12)?,
        );
    }

    log::debug!("built energy forecast over {} of {} hours", forecast.len(), hourly.len());
    Ok(forecast)
}
