//! Configuration file support for Postop.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/postop/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub regimen: RegimenDefaults,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Standard course parameters used when building a regimen from the
/// catalog. These mirror the usual discharge orders; a clinic with
/// different preferences overrides them in the config file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegimenDefaults {
    #[serde(default = "default_antibiotic_window_weeks")]
    pub antibiotic_window_weeks: u32,

    #[serde(default = "default_antibiotic_daily_doses")]
    pub antibiotic_daily_doses: u32,

    #[serde(default = "default_nsaid_window_weeks")]
    pub nsaid_window_weeks: u32,

    #[serde(default = "default_nsaid_daily_doses")]
    pub nsaid_daily_doses: u32,

    /// Steroid doses per day, one entry per post-op week
    #[serde(default = "default_steroid_taper")]
    pub steroid_taper: Vec<u32>,
}

impl Default for RegimenDefaults {
    fn default() -> Self {
        Self {
            antibiotic_window_weeks: default_antibiotic_window_weeks(),
            antibiotic_daily_doses: default_antibiotic_daily_doses(),
            nsaid_window_weeks: default_nsaid_window_weeks(),
            nsaid_daily_doses: default_nsaid_daily_doses(),
            steroid_taper: default_steroid_taper(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("postop")
}

fn default_antibiotic_window_weeks() -> u32 {
    1
}

fn default_antibiotic_daily_doses() -> u32 {
    3
}

fn default_nsaid_window_weeks() -> u32 {
    4
}

fn default_nsaid_daily_doses() -> u32 {
    3
}

fn default_steroid_taper() -> Vec<u32> {
    vec![4, 3, 2, 1]
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("postop").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
