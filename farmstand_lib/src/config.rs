//! Runtime settings.
//!
//! Settings come from an optional TOML file, then environment overrides
//! (`FARMSTAND_*`). Every field has a default, so an empty file or no file
//! at all is valid.

use std::path::{Path, PathBuf};

use farmstand_data::types::Coordinates;
use serde::Deserialize;
use thiserror::Error;

use crate::calendar::CalendarProvider;
use crate::validation;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "farmstand.toml";

pub const ENV_DATA_DIR: &str = "FARMSTAND_DATA_DIR";
pub const ENV_TIMEZONE: &str = "FARMSTAND_TIMEZONE";
pub const ENV_HOME: &str = "FARMSTAND_HOME";
pub const ENV_GEO_TIMEOUT_MS: &str = "FARMSTAND_GEO_TIMEOUT_MS";

/// Error types for loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding `markets.yml` etc. `None` uses the embedded seed data.
    pub data_dir: Option<PathBuf>,
    /// IANA timezone written into calendar exports.
    pub timezone: String,
    /// Calendar providers offered for export.
    pub calendar_providers: Vec<CalendarProvider>,
    /// Where `.ics` files are written.
    pub calendar_dir: PathBuf,
    /// How many markets the home listing features.
    pub featured_markets: usize,
    /// How many featured vendors the spotlight shows.
    pub spotlight_vendors: usize,
    pub map: MapSettings,
    pub geolocation: GeolocationSettings,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct MapSettings {
    /// Center used when nothing else determines the view.
    pub default_center: Coordinates,
    pub default_zoom: u8,
    /// Padding in pixels around fitted bounds.
    pub fit_padding: u32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct GeolocationSettings {
    pub timeout_ms: u64,
    /// Fixed device location. `None` means geolocation is unavailable.
    pub home: Option<Coordinates>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            timezone: "America/Sao_Paulo".to_string(),
            calendar_providers: CalendarProvider::ALL.to_vec(),
            calendar_dir: PathBuf::from("."),
            featured_markets: 3,
            spotlight_vendors: 3,
            map: MapSettings::default(),
            geolocation: GeolocationSettings::default(),
        }
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            default_center: Coordinates::new(45.522, -122.677),
            default_zoom: 11,
            fit_padding: 50,
        }
    }
}

impl Default for GeolocationSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            home: None,
        }
    }
}

impl Settings {
    /// Parses settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads settings from `path`, or from [`DEFAULT_CONFIG_FILE`] when it
    /// exists, or falls back to defaults. Environment overrides are applied
    /// last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::read_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::read_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Applies `FARMSTAND_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(tz) = lookup(ENV_TIMEZONE) {
            self.timezone = tz;
        }
        if let Some(home) = lookup(ENV_HOME) {
            let coords = validation::validate_coordinates(&home).map_err(|_| {
                ConfigError::InvalidEnv {
                    key: ENV_HOME,
                    value: home.clone(),
                }
            })?;
            self.geolocation.home = Some(coords);
        }
        if let Some(ms) = lookup(ENV_GEO_TIMEOUT_MS) {
            self.geolocation.timeout_ms =
                ms.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    key: ENV_GEO_TIMEOUT_MS,
                    value: ms.clone(),
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert!(settings.data_dir.is_none());
        assert_eq!(settings.timezone, "America/Sao_Paulo");
        assert_eq!(settings.calendar_providers.len(), 6);
        assert_eq!(settings.map.default_zoom, 11);
        assert_eq!(settings.map.fit_padding, 50);
        assert_eq!(settings.geolocation.timeout_ms, 10_000);
        assert_eq!(settings.featured_markets, 3);
    }

    #[test]
    fn toml_overrides_nested_fields() {
        let toml = r#"
timezone = "America/Los_Angeles"
calendar_providers = ["Google", "iCal"]

[map]
default_zoom = 13
default_center = { lat = 44.94, lng = -123.03 }

[geolocation]
home = { lat = 45.5, lng = -122.6 }
"#;
        let settings = Settings::from_toml(toml).unwrap();
        assert_eq!(settings.timezone, "America/Los_Angeles");
        assert_eq!(
            settings.calendar_providers,
            vec![CalendarProvider::Google, CalendarProvider::ICal]
        );
        assert_eq!(settings.map.default_zoom, 13);
        assert_eq!(settings.map.fit_padding, 50);
        assert_eq!(settings.map.default_center, Coordinates::new(44.94, -123.03));
        assert_eq!(settings.geolocation.home, Some(Coordinates::new(45.5, -122.6)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Settings::from_toml("zoom = 3").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_DATA_DIR, "/srv/farmstand"),
            (ENV_HOME, "45.52, -122.68"),
            (ENV_GEO_TIMEOUT_MS, "2500"),
        ]);
        let mut settings = Settings::default();
        settings
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(settings.data_dir, Some(PathBuf::from("/srv/farmstand")));
        assert_eq!(settings.geolocation.home, Some(Coordinates::new(45.52, -122.68)));
        assert_eq!(settings.geolocation.timeout_ms, 2500);
        assert_eq!(settings.timezone, "America/Sao_Paulo");
    }

    #[test]
    fn bad_env_value_names_the_key() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env(|key| (key == ENV_HOME).then(|| "north".to_string()))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for FARMSTAND_HOME: north");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Settings::load(Some(Path::new("/nonexistent/farmstand.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
