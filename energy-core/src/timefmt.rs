//! Epoch-second formatting under an explicit UTC offset.
//!
//! Nothing here consults the process timezone: callers pass the offset
//! that defines "local" for the forecast location.

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};

use crate::error::{ForecastError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// `6:00 AM`
    #[default]
    H12,
    /// `18:00`
    H24,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateStyle {
    /// `Mon, Jan 6`
    #[default]
    Short,
    /// `Monday, January 6, 2025`
    Long,
}

pub fn to_local(ts: i64, offset: FixedOffset) -> Result<DateTime<FixedOffset>> {
    DateTime::from_timestamp(ts, 0)
        .map(|utc| utc.with_timezone(&offset))
        .ok_or_else(|| ForecastError::validation(format!("timestamp {ts} is out of range")))
}

pub fn local_hour(ts: i64, offset: FixedOffset) -> Result<u32> {
    to_local(ts, offset).map(|dt| dt.hour())
}

pub fn local_date(ts: i64, offset: FixedOffset) -> Result<NaiveDate> {
    to_local(ts, offset).map(|dt| dt.date_naive())
}

pub fn format_time(ts: i64, offset: FixedOffset, clock: Clock) -> Result<String> {
    let pattern = match clock {
        Clock::H12 => "%-I:%M %p",
        Clock::H24 => "%-H:%M",
    };
    Ok(to_local(ts, offset)?.format(pattern).to_string())
}

pub fn format_date(ts: i64, offset: FixedOffset, style: DateStyle) -> Result<String> {
    let pattern = match style {
        DateStyle::Short => "%a, %b %-d",
        DateStyle::Long => "%A, %B %-d, %Y",
    };
    Ok(to_local(ts, offset)?.format(pattern).to_string())
}

pub fn weather_icon_url(icon: &str, large: bool) -> String {
    let size = if large { "@2x" } else { "" };
    format!("https://openweathermap.org/img/wn/{icon}{size}.png")
}
