//! Turns a provider's 3-hour forecast feed into hourly and daily views.
//!
//! Local time is always an explicit [`FixedOffset`] resolved from a
//! [`TimeBasis`], so day boundaries do not depend on the host timezone.
//! UV index is not part of the free feed; it is filled in by a
//! [`UvEstimator`] so a real UV source can be swapped in later.

use std::{collections::HashMap, fmt, str::FromStr};

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ForecastError, Result},
    model::{
        CurrentConditions, DailyForecast, DayFeelsLike, DayTemperatures, ForecastFeed,
        ForecastSample, HourlyForecast, Location, WeatherData, WeatherObservation,
    },
    timefmt::{local_date, local_hour},
};

/// Number of feed samples kept for the hourly view.
pub const HOURLY_DEPTH: usize = 24;

/// Which clock defines local hours and calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBasis {
    Utc,
    /// The forecast location's own offset, as reported by the feed.
    #[default]
    Location,
    /// A fixed offset east of UTC, in seconds.
    Fixed(i32),
}

impl TimeBasis {
    pub fn resolve(self, feed_offset_secs: i32) -> Result<FixedOffset> {
        let secs = match self {
            TimeBasis::Utc => return Ok(Utc.fix()),
            TimeBasis::Location => feed_offset_secs,
            TimeBasis::Fixed(secs) => secs,
        };
        FixedOffset::east_opt(secs)
            .ok_or_else(|| ForecastError::validation(format!("UTC offset {secs}s is out of range")))
    }
}

impl fmt::Display for TimeBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBasis::Utc => f.write_str("utc"),
            TimeBasis::Location => f.write_str("location"),
            TimeBasis::Fixed(secs) => match FixedOffset::east_opt(*secs) {
                Some(offset) => write!(f, "{offset}"),
                None => write!(f, "{secs}s"),
            },
        }
    }
}

impl FromStr for TimeBasis {
    type Err = anyhow::Error;

    /// Accepts `utc`, `location` or an offset such as `+02:00`.
    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "utc" => Ok(TimeBasis::Utc),
            "location" | "local" => Ok(TimeBasis::Location),
            other => other
                .parse::<FixedOffset>()
                .map(|offset| TimeBasis::Fixed(offset.local_minus_utc()))
                .map_err(|_| {
                    anyhow::anyhow!(
                        "Unknown time basis '{value}'. Use utc, location or an offset like +02:00."
                    )
                }),
        }
    }
}

/// Source of UV index values when the feed has none.
pub trait UvEstimator {
    /// UV index for a sample taken at `local_hour` under `clouds` percent cover.
    fn hourly(&self, local_hour: u32, clouds: f64) -> f64;

    /// Representative UV index for a whole day.
    fn daily(&self, clouds: f64) -> f64;
}

/// Bell-shaped daily curve: peak 8 around midday, 4 in the shoulders,
/// 0 at night, damped linearly by cloud cover.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicUv;

impl UvEstimator for HeuristicUv {
    fn hourly(&self, local_hour: u32, clouds: f64) -> f64 {
        estimate_uv_index(local_hour, clouds)
    }

    fn daily(&self, clouds: f64) -> f64 {
        midday_uv(clouds)
    }
}

pub fn estimate_uv_index(local_hour: u32, clouds: f64) -> f64 {
    match local_hour {
        10..=16 => midday_uv(clouds),
        7..=19 => (4.0 - clouds / 50.0).max(0.0),
        _ => 0.0,
    }
}

fn midday_uv(clouds: f64) -> f64 {
    (8.0 - clouds / 25.0).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPart {
    Morning,
    Day,
    Evening,
    Night,
}

impl DayPart {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => DayPart::Morning,
            12..=16 => DayPart::Day,
            17..=21 => DayPart::Evening,
            _ => DayPart::Night,
        }
    }
}

/// Samples in this local-hour range set the day's representative weather.
fn is_midday(hour: u32) -> bool {
    (10..=14).contains(&hour)
}

fn check_finite(what: &str, fields: &[(&str, f64)]) -> Result<()> {
    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some((name, value)) => Err(ForecastError::validation(format!(
            "{what} has non-finite `{name}` ({value})"
        ))),
        None => Ok(()),
    }
}

fn check_sample(idx: usize, sample: &ForecastSample) -> Result<()> {
    check_finite(
        &format!("forecast sample {idx}"),
        &[
            ("temp", sample.temp),
            ("feels_like", sample.feels_like),
            ("temp_min", sample.temp_min),
            ("temp_max", sample.temp_max),
            ("pop", sample.pop),
            ("wind_speed", sample.wind_speed),
            ("wind_deg", sample.wind_deg),
            ("clouds", sample.clouds),
        ],
    )
}

fn check_current(current: &CurrentConditions) -> Result<()> {
    check_finite(
        "current conditions",
        &[
            ("temp", current.temp),
            ("feels_like", current.feels_like),
            ("wind_speed", current.wind_speed),
            ("wind_deg", current.wind_deg),
            ("clouds", current.clouds),
            ("visibility", current.visibility),
        ],
    )
}

/// First [`HOURLY_DEPTH`] samples with precipitation as a percentage and an
/// estimated UV index.
pub fn hourly_view(
    samples: &[ForecastSample],
    offset: FixedOffset,
    uv: &impl UvEstimator,
) -> Result<Vec<HourlyForecast>> {
    samples
        .iter()
        .take(HOURLY_DEPTH)
        .enumerate()
        .map(|(idx, sample)| -> Result<HourlyForecast> {
            check_sample(idx, sample)?;
            let hour = local_hour(sample.dt, offset)?;
            Ok(HourlyForecast {
                dt: sample.dt,
                temp: sample.temp,
                weather: sample.weather.clone(),
                pop: sample.pop * 100.0,
                wind_speed: sample.wind_speed,
                wind_deg: sample.wind_deg,
                clouds: sample.clouds,
                uvi: uv.hourly(hour, sample.clouds),
            })
        })
        .collect()
}

fn start_day(date: NaiveDate, sample: &ForecastSample) -> DailyForecast {
    DailyForecast {
        dt: sample.dt,
        date,
        sunrise: 0,
        sunset: 0,
        temp: DayTemperatures {
            day: sample.temp,
            min: sample.temp_min,
            max: sample.temp_max,
            night: sample.temp,
            eve: sample.temp,
            morn: sample.temp,
        },
        feels_like: DayFeelsLike {
            day: sample.feels_like,
            night: sample.feels_like,
            eve: sample.feels_like,
            morn: sample.feels_like,
        },
        weather: sample.weather.clone(),
        clouds: sample.clouds,
        pop: sample.pop * 100.0,
        // Only recomputed once a second sample lands on this day.
        uvi: 0.0,
        wind_speed: sample.wind_speed,
        wind_deg: sample.wind_deg,
    }
}

fn fold_into_day(day: &mut DailyForecast, sample: &ForecastSample, hour: u32, uv: &impl UvEstimator) {
    day.temp.min = day.temp.min.min(sample.temp_min);
    day.temp.max = day.temp.max.max(sample.temp_max);

    let (temp_slot, feels_slot) = match DayPart::from_hour(hour) {
        DayPart::Morning => (&mut day.temp.morn, &mut day.feels_like.morn),
        DayPart::Day => (&mut day.temp.day, &mut day.feels_like.day),
        DayPart::Evening => (&mut day.temp.eve, &mut day.feels_like.eve),
        DayPart::Night => (&mut day.temp.night, &mut day.feels_like.night),
    };
    *temp_slot = sample.temp;
    *feels_slot = sample.feels_like;

    if is_midday(hour) {
        day.weather = sample.weather.clone();
        day.clouds = sample.clouds;
        day.wind_speed = sample.wind_speed;
        day.wind_deg = sample.wind_deg;
    }

    day.uvi = uv.daily(day.clouds);
}

/// One record per local calendar date, in order of first appearance.
pub fn daily_view(
    samples: &[ForecastSample],
    offset: FixedOffset,
    uv: &impl UvEstimator,
) -> Result<Vec<DailyForecast>> {
    let mut days: Vec<DailyForecast> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for (idx, sample) in samples.iter().enumerate() {
        check_sample(idx, sample)?;
        let date = local_date(sample.dt, offset)?;
        let hour = local_hour(sample.dt, offset)?;

        match index.get(&date).copied() {
            Some(pos) => fold_into_day(&mut days[pos], sample, hour, uv),
            None => {
                index.insert(date, days.len());
                days.push(start_day(date, sample));
            }
        }
    }

    Ok(days)
}

pub fn current_observation(
    current: &CurrentConditions,
    offset: FixedOffset,
    uv: &impl UvEstimator,
) -> Result<WeatherObservation> {
    check_current(current)?;
    let hour = local_hour(current.dt, offset)?;
    Ok(WeatherObservation {
        dt: current.dt,
        temp: current.temp,
        feels_like: current.feels_like,
        humidity: current.humidity,
        wind_speed: current.wind_speed,
        wind_deg: current.wind_deg,
        clouds: current.clouds,
        uvi: uv.hourly(hour, current.clouds),
        pop: None,
        visibility: current.visibility,
        weather: current.weather.clone(),
    })
}

/// Normalizes one fetch into [`WeatherData`]. An empty feed yields empty
/// hourly and daily views.
pub fn aggregate(
    location: Location,
    current: &CurrentConditions,
    feed: &ForecastFeed,
    basis: TimeBasis,
    uv: &impl UvEstimator,
) -> Result<WeatherData> {
    let offset = basis.resolve(feed.utc_offset_secs)?;

    let data = WeatherData {
        location,
        utc_offset_secs: offset.local_minus_utc(),
        current: current_observation(current, offset, uv)?,
        hourly: hourly_view(&feed.samples, offset, uv)?,
        daily: daily_view(&feed.samples, offset, uv)?,
    };

    log::debug!(
        "aggregated {} samples into {} hourly and {} daily entries (offset {offset})",
        feed.samples.len(),
        data.hourly.len(),
        data.daily.len()
    );

    Ok(data)
}
