use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::bucket::LengthPolicy;
use crate::forecast::DEFAULT_FORECAST_URL;
use crate::geocoding::{DEFAULT_GEOCODING_URL, MAX_CANDIDATES};
use crate::units::Units;

/// Top-level configuration stored on disk.
///
/// Open-Meteo needs no API key, so unlike most weather tools there are no
/// credentials here; only presentation and search preferences.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default unit selection used when no flag overrides it.
    #[serde(default)]
    pub units: Units,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// How an hourly series shorter than a full week is handled.
    #[serde(default)]
    pub hour_policy: LengthPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Candidates requested per geocoding search (the upstream caps at 10).
    #[serde(default = "default_suggestion_count")]
    pub suggestion_count: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { suggestion_count: default_suggestion_count() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,

    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self { geocoding_url: default_geocoding_url(), forecast_url: default_forecast_url() }
    }
}

fn default_suggestion_count() -> u8 {
    5
}

fn default_geocoding_url() -> String {
    DEFAULT_GEOCODING_URL.to_string()
}

fn default_forecast_url() -> String {
    DEFAULT_FORECAST_URL.to_string()
}

impl Config {
    /// Clamp and store the per-search candidate count.
    pub fn set_suggestion_count(&mut self, count: u8) {
        self.search.suggestion_count = count.clamp(1, MAX_CANDIDATES);
    }

    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
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

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weathernow", "weathernow-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
