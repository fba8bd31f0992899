use std::fmt;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Select, Text};

use energy_core::{
    Config, Dashboard, ForecastError, GeocodingProvider, Location, TimeBasis, UnitSystem,
    provider::{iplocation::IpLocationProvider, locate_or_default, openweather_from_config},
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "energy", version, about = "Weather-based solar and wind energy forecast")]
pub struct Cli {
    /// Log provider requests and pipeline steps.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, preferred units and default location.
    Configure,

    /// Search for places by name.
    Search {
        /// Free-text place name, e.g. "Portland".
        query: String,
    },

    /// Show current weather and the energy forecast.
    Show {
        /// Place name; defaults to the configured or detected location.
        place: Option<String>,

        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// metric or imperial; overrides the configured units.
        #[arg(long)]
        units: Option<UnitSystem>,

        /// Number of forecast entries in the energy chart.
        #[arg(long)]
        hours: Option<usize>,

        /// utc, location or a fixed offset like +02:00.
        #[arg(long)]
        time_basis: Option<TimeBasis>,

        /// Print the dashboard as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure().await,
            Command::Search { query } => search(&query).await,
            Command::Show {
                place,
                lat,
                lon,
                units,
                hours,
                time_basis,
                json,
            } => {
                let mut config = Config::load()?;
                if let Some(units) = units {
                    config.units = units;
                }
                if let Some(hours) = hours {
                    config.window_hours = hours;
                }
                if let Some(basis) = time_basis {
                    config.time_basis = basis;
                }

                let coordinates = lat.zip(lon);
                show(&config, place.as_deref(), coordinates, json).await
            }
        }
    }
}

/// Search result offered in the location picker; the selection carries the
/// location itself, so same-named places stay distinct.
struct PlaceChoice(Location);

impl fmt::Display for PlaceChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render::location_line(&self.0))
    }
}

/// Turns a pipeline failure into the single retry message shown to users.
fn user_facing(err: ForecastError) -> anyhow::Error {
    log::debug!("request failed: {err}");
    anyhow!("{}\nRun the command again to retry.", err.user_message())
}

async fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let current_key = config.api_key().unwrap_or_default().to_string();
    let api_key = Text::new("OpenWeather API key:")
        .with_initial_value(&current_key)
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let units = Select::new("Units:", vec![UnitSystem::Metric, UnitSystem::Imperial])
        .with_starting_cursor(usize::from(config.units == UnitSystem::Imperial))
        .prompt()
        .context("Failed to read unit system")?;
    config.units = units;

    let place = Text::new("Default location (leave empty to detect automatically):")
        .prompt()
        .context("Failed to read default location")?;

    if place.trim().is_empty() {
        config.default_location = None;
    } else {
        let client = openweather_from_config(&config).map_err(user_facing)?;
        let matches = client.search(&place).await.map_err(user_facing)?;
        if matches.is_empty() {
            println!("No places found for '{}'; keeping automatic detection.", place.trim());
            config.default_location = None;
        } else {
            let options: Vec<PlaceChoice> = matches.into_iter().map(PlaceChoice).collect();
            let choice = Select::new("Pick a location:", options)
                .prompt()
                .context("Failed to read location choice")?;
            config.default_location = Some(choice.0);
        }
    }

    config.save()?;
    println!(
        "Configuration saved to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

async fn search(query: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = openweather_from_config(&config).map_err(user_facing)?;

    let matches = client.search(query).await.map_err(user_facing)?;
    if matches.is_empty() {
        println!("No places found for '{query}'.");
        return Ok(());
    }

    for location in matches {
        println!("{}", render::location_line(&location));
    }
    Ok(())
}

async fn resolve_location(
    config: &Config,
    geocoder: &dyn GeocodingProvider,
    place: Option<&str>,
    coordinates: Option<(f64, f64)>,
) -> anyhow::Result<Location> {
    if let Some((lat, lon)) = coordinates {
        return Ok(Location::from_coordinates(lat, lon));
    }

    if let Some(place) = place {
        return geocoder
            .search(place)
            .await
            .map_err(user_facing)?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Location not found: {place}"));
    }

    if let Some(location) = &config.default_location {
        return Ok(location.clone());
    }

    let locator = IpLocationProvider::new(config.timeout()).map_err(user_facing)?;
    Ok(locate_or_default(&locator).await)
}

async fn show(
    config: &Config,
    place: Option<&str>,
    coordinates: Option<(f64, f64)>,
    json: bool,
) -> anyhow::Result<()> {
    let client = openweather_from_config(config).map_err(user_facing)?;
    let location = resolve_location(config, &client, place, coordinates).await?;

    let dashboard = Dashboard::new(location, config)
        .refresh(&client, &client)
        .await
        .map_err(user_facing)?;

    if json {
        let out = serde_json::to_string_pretty(&render::json_view(&dashboard))
            .context("Failed to serialize dashboard")?;
        println!("{out}");
    } else {
        print!("{}", render::dashboard(&dashboard)?);
    }
    Ok(())
}
