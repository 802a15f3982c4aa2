use std::{io, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dmi::DMI_PRODUCT_NAME_PATH;

#[cfg(test)]
pub mod config_test;

/// Configuration file read at startup when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "/etc/padbridge/config.yaml";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

/// Runtime options of the bridge. Every field is optional in YAML.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    /// Upper bound of one wait of the event loop
    pub poll_timeout_ms: u64,
    /// Delay between the steps of the share button macro
    pub macro_delay_ms: u64,
    /// Watch device directories and reconnect automatically
    pub hotplug: bool,
    /// Forward host rumble requests to the physical controller
    pub rumble: bool,
    pub input_dir: String,
    pub hidraw_dir: String,
    pub dmi_product_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_timeout_ms: 1000,
            macro_delay_ms: 150,
            hotplug: false,
            rumble: true,
            input_dir: "/dev/input".to_string(),
            hidraw_dir: "/dev".to_string(),
            dmi_product_path: DMI_PRODUCT_NAME_PATH.to_string(),
        }
    }
}

impl Config {
    /// Load a [Config] from the given YAML string
    pub fn from_yaml(content: String) -> Result<Config, LoadError> {
        let config: Config = serde_yaml::from_str(content.as_str())?;
        Ok(config)
    }

    /// Load a [Config] from the given YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Config, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// Load the configuration from the given path, or from
    /// [DEFAULT_CONFIG_PATH] if it exists. Falls back to the defaults.
    pub fn load(path: Option<&str>) -> Result<Config, LoadError> {
        if let Some(path) = path {
            log::debug!("Loading config from {path}");
            return Self::from_yaml_file(path);
        }
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            log::debug!("Loading config from {DEFAULT_CONFIG_PATH}");
            return Self::from_yaml_file(DEFAULT_CONFIG_PATH);
        }
        log::debug!("No config file found, using defaults");
        Ok(Config::default())
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn macro_delay(&self) -> Duration {
        Duration::from_millis(self.macro_delay_ms)
    }
}
