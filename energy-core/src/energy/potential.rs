//! Normalized 0..100 generation potential from weather observables.
//!
//! Both functions are total: out-of-domain inputs are clamped and NaN
//! scores as zero potential.

use crate::units::{UnitSystem, to_meters_per_second};

/// Practical top of the UV index scale.
pub const UV_SCALE_MAX: f64 = 12.0;

/// Below this speed (m/s) a turbine produces nothing.
pub const CUT_IN_MPS: f64 = 3.0;
/// Speed (m/s) at which output reaches rated capacity.
pub const RATED_MPS: f64 = 12.0;
/// Above this speed (m/s) turbines shut down.
pub const CUT_OUT_MPS: f64 = 25.0;

/// UV index scaled to the 0..12 range, reduced linearly by cloud cover.
pub fn solar_potential(uv_index: f64, cloud_cover_pct: f64) -> f64 {
    if uv_index.is_nan() || cloud_cover_pct.is_nan() {
        return 0.0;
    }

    let uv = uv_index.clamp(0.0, UV_SCALE_MAX);
    let clouds = cloud_cover_pct.clamp(0.0, 100.0);

    let base = (uv / UV_SCALE_MAX) * 100.0;
    let cloud_factor = 1.0 - clouds / 100.0;
    (base * cloud_factor).clamp(0.0, 100.0)
}

/// Piecewise-linear turbine power curve over the speed in m/s:
/// zero below cut-in, linear ramp up to rated speed (inclusive),
/// flat at 100 up to cut-out (inclusive), zero beyond.
pub fn wind_potential(wind_speed: f64, units: UnitSystem) -> f64 {
    let speed = to_meters_per_second(wind_speed, units);

    if speed.is_nan() || speed < CUT_IN_MPS || speed > CUT_OUT_MPS {
        return 0.0;
    }

    if speed <= RATED_MPS {
        return (speed - CUT_IN_MPS) / (RATED_MPS - CUT_IN_MPS) * 100.0;
    }

    100.0
}
