// src/config.rs
//! Configuration management with a JSON file under the user's config dir

use crate::{
    error::{Result, TrackerError},
    gps::device::LinkSettings,
};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub enabled: bool,
    pub base_url: String,
    pub zoom: u8,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            zoom: 18,
            user_agent: "GpsTracker/0.1 (Rust serial GPS tracker)".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    pub update_interval_ms: u64,
    pub map_zoom: u8,
    pub geocoder: GeocoderConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            read_timeout_ms: 1000,
            update_interval_ms: 1000,
            map_zoom: 10,
            geocoder: GeocoderConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Save to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| TrackerError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| TrackerError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TrackerError::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        std::fs::write(path, contents)
            .map_err(|e| TrackerError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| TrackerError::Config("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home).join(".config").join("gps-tracker").join("config.json"))
    }

    fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            return Err(TrackerError::Config("baud_rate must be positive".to_string()));
        }
        if self.update_interval_ms == 0 {
            return Err(TrackerError::Config("update_interval_ms must be positive".to_string()));
        }
        Ok(())
    }

    pub fn link_settings(&self) -> LinkSettings {
        LinkSettings {
            baud_rate: self.baud_rate,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn geocoder_timeout(&self) -> Duration {
        Duration::from_secs(self.geocoder.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrackerConfig::default();
        assert_eq!(config.link_settings(), LinkSettings::default());
        assert_eq!(config.update_interval(), Duration::from_secs(1));
        assert_eq!(config.map_zoom, 10);
        assert_eq!(config.geocoder.zoom, 18);
        assert!(config.geocoder.enabled);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrackerConfig::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, TrackerConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = TrackerConfig::default();
        config.baud_rate = 4800;
        config.geocoder.enabled = false;
        config.save_to(&path).unwrap();

        assert_eq!(TrackerConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"map_zoom": 14, "geocoder": {"zoom": 16}}"#).unwrap();

        let config = TrackerConfig::load_from(&path).unwrap();
        assert_eq!(config.map_zoom, 14);
        assert_eq!(config.geocoder.zoom, 16);
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.geocoder.base_url, "https://nominatim.openstreetmap.org");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"baud_rate": 0}"#).unwrap();
        assert!(matches!(TrackerConfig::load_from(&path), Err(TrackerError::Config(_))));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(TrackerConfig::load_from(&path), Err(TrackerError::Config(_))));
    }
}
