//! Text and JSON views of a refreshed dashboard.

use std::fmt::Write;

use energy_core::{
    Dashboard, EnergyForecast, EnergySummary, Location, UnitSystem, WeatherData,
    energy::SeriesSummary,
    timefmt::{Clock, DateStyle, format_date, format_time},
    units::{format_temperature, format_wind_speed},
};
use serde_json::{Value, json};

/// Hours listed in the hourly strip.
const HOURLY_STRIP: usize = 12;

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub fn location_line(location: &Location) -> String {
    format!(
        "{} ({:.4}, {:.4})",
        location.display_name(),
        location.lat,
        location.lon
    )
}

/// One bar per value on a fixed 0..100 scale.
pub fn potential_bars(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| {
            let norm = (v / 100.0).clamp(0.0, 1.0);
            BARS[(norm * (BARS.len() - 1) as f64).round() as usize]
        })
        .collect()
}

pub fn dashboard(dashboard: &Dashboard) -> anyhow::Result<String> {
    let mut out = String::new();

    let Some(weather) = &dashboard.weather else {
        writeln!(out, "No weather data loaded for {}.", dashboard.location.display_name())?;
        return Ok(out);
    };

    current_card(&mut out, weather, dashboard.units)?;
    hourly_strip(&mut out, weather)?;
    daily_table(&mut out, weather, dashboard.units)?;

    if let Some(energy) = &dashboard.energy {
        energy_chart(&mut out, energy)?;
    }

    match dashboard.summary() {
        Some(summary) => energy_metrics(&mut out, &summary)?,
        None => writeln!(out, "\nNo forecast data available for energy estimates.")?,
    }

    Ok(out)
}

fn current_card(out: &mut String, weather: &WeatherData, units: UnitSystem) -> anyhow::Result<()> {
    let offset = weather.offset();
    let now = &weather.current;

    writeln!(out, "{}", weather.location.display_name())?;
    writeln!(
        out,
        "{} • {}",
        format_date(now.dt, offset, DateStyle::Long)?,
        format_time(now.dt, offset, Clock::H12)?
    )?;
    writeln!(
        out,
        "{}  {} (feels like {})",
        format_temperature(now.temp, units),
        now.weather.description,
        format_temperature(now.feels_like, units)
    )?;
    writeln!(
        out,
        "Humidity {}%  Wind {}  Clouds {}%  UV {:.1}",
        now.humidity,
        format_wind_speed(now.wind_speed, units),
        now.clouds,
        now.uvi
    )?;
    Ok(())
}

fn hourly_strip(out: &mut String, weather: &WeatherData) -> anyhow::Result<()> {
    if weather.hourly.is_empty() {
        return Ok(());
    }

    let offset = weather.offset();
    writeln!(out, "\nHourly")?;
    for (idx, hour) in weather.hourly.iter().take(HOURLY_STRIP).enumerate() {
        let when = if idx == 0 {
            "Now".to_string()
        } else {
            format_time(hour.dt, offset, Clock::H24)?
        };
        writeln!(
            out,
            "  {when:>5}  {:>4.0}°  {:>3.0}% rain  {}",
            hour.temp, hour.pop, hour.weather.description
        )?;
    }
    Ok(())
}

fn daily_table(out: &mut String, weather: &WeatherData, units: UnitSystem) -> anyhow::Result<()> {
    if weather.daily.is_empty() {
        return Ok(());
    }

    let offset = weather.offset();
    writeln!(out, "\nDaily")?;
    for day in &weather.daily {
        writeln!(
            out,
            "  {:<11} {:>5} / {:<5}  UV {:>3.1}  {}",
            format_date(day.dt, offset, DateStyle::Short)?,
            format_temperature(day.temp.min, units),
            format_temperature(day.temp.max, units),
            day.uvi,
            day.weather.description
        )?;
    }
    Ok(())
}

fn energy_chart(out: &mut String, energy: &EnergyForecast) -> anyhow::Result<()> {
    if energy.is_empty() {
        return Ok(());
    }

    let first = energy.labels().first().map(String::as_str).unwrap_or_default();
    let last = energy.labels().last().map(String::as_str).unwrap_or_default();

    writeln!(out, "\nEnergy potential ({first} – {last})")?;
    writeln!(out, "  Solar {}", potential_bars(energy.solar()))?;
    writeln!(out, "  Wind  {}", potential_bars(energy.wind()))?;
    Ok(())
}

fn metric_line(out: &mut String, name: &str, series: &SeriesSummary) -> anyhow::Result<()> {
    writeln!(
        out,
        "  {name:<8} now {:>5.1}%  max {:>5.1}%  best {}",
        series.current, series.max, series.best_time
    )?;
    Ok(())
}

fn energy_metrics(out: &mut String, summary: &EnergySummary) -> anyhow::Result<()> {
    writeln!(out, "\nBest times")?;
    metric_line(out, "Solar", &summary.solar)?;
    metric_line(out, "Wind", &summary.wind)?;
    metric_line(out, "Combined", &summary.combined)?;
    Ok(())
}

pub fn json_view(dashboard: &Dashboard) -> Value {
    json!({
        "dashboard": dashboard,
        "best_times": dashboard.best_times(),
        "summary": dashboard.summary(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use energy_core::Config;

    #[test]
    fn bars_follow_fixed_scale() {
        assert_eq!(potential_bars(&[0.0, 100.0, 50.0]), "▁█▅");
        assert_eq!(potential_bars(&[-5.0, 250.0]), "▁█");
        assert_eq!(potential_bars(&[]), "");
    }

    #[test]
    fn location_line_includes_coordinates() {
        let line = location_line(&Location::default_location());
        assert_eq!(line, "New York, New York, US (40.7128, -74.0060)");
    }

    #[test]
    fn unloaded_dashboard_says_so() {
        let dashboard = Dashboard::new(Location::default_location(), &Config::default());
        let text = super::dashboard(&dashboard).unwrap();
        assert!(text.starts_with("No weather data loaded"));
    }

    #[test]
    fn json_view_has_null_best_times_when_empty() {
        let dashboard = Dashboard::new(Location::default_location(), &Config::default());
        let value = json_view(&dashboard);
        assert!(value["best_times"].is_null());
        assert_eq!(value["dashboard"]["units"], "metric");
    }

    #[test]
    fn combined_metric_is_a_percentage() {
        let energy = EnergyForecast::from_series(
            vec![10.0, 90.0],
            vec![60.0, 90.0],
            vec!["6:00 AM".into(), "9:00 AM".into()],
        )
        .unwrap();
        let summary = EnergySummary::from_forecast(&energy).unwrap();

        let mut out = String::new();
        energy_metrics(&mut out, &summary).unwrap();
        assert!(out.contains("Combined now  35.0%  max  90.0%  best 9:00 AM"));
    }

    #[test]
    fn energy_chart_renders_both_series() {
        let energy = EnergyForecast::from_series(
            vec![0.0, 100.0],
            vec![100.0, 0.0],
            vec!["6:00 AM".into(), "9:00 AM".into()],
        )
        .unwrap();

        let mut out = String::new();
        energy_chart(&mut out, &energy).unwrap();
        assert!(out.contains("6:00 AM – 9:00 AM"));
        assert!(out.contains("Solar ▁█"));
        assert!(out.contains("Wind  █▁"));
    }
}
