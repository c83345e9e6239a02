//! # Configuration Management
//!
//! This module handles loading and saving configuration from the
//! sunmoon-config.toml file. It holds the observer location (the calculator
//! remembers where you are between runs), the rise/set threshold and display
//! options for the text report.

use crate::{ObserverLocation, TwilightKind};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "sunmoon-config.toml";

/// Errors that can occur while persisting configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Writing the file failed (permissions, disk space)
    #[error("config IO: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be encoded as TOML
    #[error("config encode: {0}")]
    Encode(#[from] toml::ser::Error),

    /// Observer coordinates outside ±180° longitude or ±90° latitude
    #[error("observer out of range: longitude {longitude_deg}°, latitude {latitude_deg}°")]
    ObserverOutOfRange { longitude_deg: f64, latitude_deg: f64 },
}

/// Application configuration loaded from sunmoon-config.toml
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Observer location
    pub observer: ObserverConfig,
    /// Rise/set event options
    #[serde(default)]
    pub events: EventsConfig,
    /// Display and report options
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Observer location in degrees, as a human would type it
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObserverConfig {
    /// Human-readable place name for the report header
    pub name: String,
    /// Longitude in degrees, east positive
    pub longitude_deg: f64,
    /// Latitude in degrees, north positive
    pub latitude_deg: f64,
}

/// Rise/set event configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EventsConfig {
    /// Altitude threshold for rise and set
    #[serde(default)]
    pub twilight: TwilightKind,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Offset from UTC in minutes used when printing event times
    pub utc_offset_minutes: i32,
    /// Height of the ASCII moon sketch in text rows (0 disables it)
    pub moon_rows: usize,
}

impl ObserverConfig {
    /// Reject coordinates no place on Earth has.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let longitude_ok = (-180.0..=180.0).contains(&self.longitude_deg);
        let latitude_ok = (-90.0..=90.0).contains(&self.latitude_deg);
        if longitude_ok && latitude_ok {
            Ok(())
        } else {
            Err(ConfigError::ObserverOutOfRange {
                longitude_deg: self.longitude_deg,
                latitude_deg: self.latitude_deg,
            })
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            utc_offset_minutes: 0,
            moon_rows: 11,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            observer: ObserverConfig {
                name: "Madrid".to_string(),
                longitude_deg: -3.7038,
                latitude_deg: 40.4168,
            },
            events: EventsConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from sunmoon-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => match config.observer.validate() {
                    Ok(()) => {
                        info!("Loaded configuration for observer: {}", config.observer.name);
                        config
                    }
                    Err(e) => {
                        warn!("Invalid observer in config file: {}", e);
                        warn!("Using default configuration (Madrid)");
                        Self::default()
                    }
                },
                Err(e) => {
                    warn!("Invalid config file format: {}", e);
                    warn!("Using default configuration (Madrid)");
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config file found, using default configuration (Madrid)");
                Self::default()
            }
        }
    }

    /// Save current configuration to sunmoon-config.toml
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(CONFIG_FILE)
    }

    /// Save current configuration to the given path
    /// Refuses to write an observer outside the valid coordinate range
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.observer.validate()?;
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Observer location in radians for the engine
    pub fn observer_location(&self) -> ObserverLocation {
        ObserverLocation::from_degrees(self.observer.longitude_deg, self.observer.latitude_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.observer.name, "Madrid");
        assert_eq!(config.observer.longitude_deg, -3.7038);
        assert_eq!(config.events.twilight, TwilightKind::Horizon34Arcmin);
        assert_eq!(config.display.utc_offset_minutes, 0);
        assert_eq!(config.display.moon_rows, 11);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.events.twilight = TwilightKind::Nautical;
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("twilight = \"nautical\""));
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_file_uses_section_defaults() {
        let parsed: Config = toml::from_str(
            "[observer]\nname = \"Quito\"\nlongitude_deg = -78.5\nlatitude_deg = -0.2\n",
        )
        .unwrap();
        assert_eq!(parsed.observer.name, "Quito");
        assert_eq!(parsed.events.twilight, TwilightKind::Horizon34Arcmin);
        assert_eq!(parsed.display, DisplayConfig::default());
        let horizon: Config = toml::from_str(
            "[observer]\nname = \"x\"\nlongitude_deg = 0.0\nlatitude_deg = 0.0\n[events]\ntwilight = \"horizon_34arcmin\"\n",
        )
        .unwrap();
        assert_eq!(horizon.events.twilight, TwilightKind::Horizon34Arcmin);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("observer.toml");
        let mut config = Config::default();
        config.observer.name = "Reykjavik".to_string();
        config.observer.longitude_deg = -21.94;
        config.observer.latitude_deg = 64.15;
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path);
        assert_eq!(loaded, config);
        let location = loaded.observer_location();
        assert!((location.latitude.to_degrees() - 64.15).abs() < 1e-9);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_observer_range_limits() {
        let mut observer = Config::default().observer;
        observer.longitude_deg = 180.0;
        observer.latitude_deg = -90.0;
        assert!(observer.validate().is_ok());
        observer.latitude_deg = 95.0;
        assert!(matches!(
            observer.validate(),
            Err(ConfigError::ObserverOutOfRange { latitude_deg, .. }) if latitude_deg == 95.0
        ));
        observer.latitude_deg = 0.0;
        observer.longitude_deg = 400.0;
        assert!(observer.validate().is_err());
        observer.longitude_deg = f64::NAN;
        assert!(observer.validate().is_err());
    }

    #[test]
    fn test_load_out_of_range_observer_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("far.toml");
        fs::write(
            &path,
            "[observer]\nname = \"Nowhere\"\nlongitude_deg = 400.0\nlatitude_deg = 95.0\n",
        )
        .unwrap();
        assert_eq!(Config::load_from_path(&path), Config::default());
    }

    #[test]
    fn test_save_refuses_out_of_range_observer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("refused.toml");
        let mut config = Config::default();
        config.observer.latitude_deg = -91.0;
        assert!(config.save_to_path(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "observer = 42").unwrap();
        assert_eq!(Config::load_from_path(&path), Config::default());
    }
}
