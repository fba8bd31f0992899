use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{
    aggregate::TimeBasis, energy::DEFAULT_WINDOW_HOURS, model::Location, units::UnitSystem,
};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

fn default_window_hours() -> usize {
    DEFAULT_WINDOW_HOURS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "imperial"
/// window_hours = 24
/// time_basis = "location"
///
/// [default_location]
/// name = "Denver"
/// country = "US"
/// lat = 39.74
/// lon = -104.99
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    /// Override for the OpenWeather base URL (proxies, tests).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default)]
    pub units: UnitSystem,

    /// How many forecast entries feed the energy chart.
    #[serde(default = "default_window_hours")]
    pub window_hours: usize,

    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub time_basis: TimeBasis,

    /// Used instead of device location when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_location: Option<Location>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            units: UnitSystem::default(),
            window_hours: DEFAULT_WINDOW_HOURS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            time_basis: TimeBasis::default(),
            default_location: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    /// Environment overrides are applied on top.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let cfg = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        Ok(cfg.with_env_overrides(|name| std::env::var(name).ok()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        log::info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "energy-forecast", "energy-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Applies overrides looked up by `get` (normally the process environment).
    pub fn with_env_overrides(mut self, get: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = get(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key.trim().to_string());
        }
        self
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Returns the API key, if present and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.window_hours, 24);
        assert_eq!(cfg.time_basis, TimeBasis::Location);
        assert!(!cfg.is_configured());
    }

    #[test]
    fn set_api_key_marks_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("OPEN_KEY".into());

        assert_eq!(cfg.api_key(), Some("OPEN_KEY"));
        assert!(cfg.is_configured());
    }

    #[test]
    fn blank_api_key_is_not_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".into());
        assert!(!cfg.is_configured());
    }

    #[test]
    fn env_overrides_stored_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let cfg = cfg.with_env_overrides(|name| (name == API_KEY_ENV).then(|| "ENV_KEY".to_string()));
        assert_eq!(cfg.api_key(), Some("ENV_KEY"));
    }

    #[test]
    fn blank_env_does_not_override() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let cfg = cfg.with_env_overrides(|_| Some(String::new()));
        assert_eq!(cfg.api_key(), Some("FILE_KEY"));
    }

    #[test]
    fn toml_roundtrip_with_location_and_fixed_basis() {
        let cfg = Config {
            api_key: Some("KEY".into()),
            units: UnitSystem::Imperial,
            window_hours: 12,
            time_basis: TimeBasis::Fixed(-18_000),
            default_location: Some(Location::default_location()),
            ..Config::default()
        };

        let text = toml::to_string_pretty(&cfg).unwrap();
        let back = Config::from_toml(&text).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn parses_handwritten_file() {
        let cfg = Config::from_toml(
            r#"
            api_key = "abc"
            units = "imperial"
            time_basis = "utc"

            [default_location]
            name = "Denver"
            country = "US"
            lat = 39.74
            lon = -104.99
            "#,
        )
        .unwrap();

        assert_eq!(cfg.units, UnitSystem::Imperial);
        assert_eq!(cfg.time_basis, TimeBasis::Utc);
        assert_eq!(cfg.default_location.as_ref().unwrap().name, "Denver");
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
    }
}
