//! Device configuration file.
//!
//! ```toml
//! [[device]]
//! id = "feather-01"
//! layout = "bme280"
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use loradec_core::{DeviceKind, DeviceRegistry};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Devices bound to a layout by id.
    #[serde(default, rename = "device")]
    pub devices: Vec<DeviceConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    pub id: String,
    pub layout: DeviceKind,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.check_unique_ids()?;
        Ok(config)
    }

    pub fn registry(&self) -> DeviceRegistry {
        self.devices
            .iter()
            .map(|device| (device.id.clone(), device.layout))
            .collect()
    }

    fn check_unique_ids(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for device in &self.devices {
            if device.id.trim().is_empty() {
                bail!("device id must not be empty");
            }
            if !seen.insert(device.id.as_str()) {
                bail!("duplicate device id '{}'", device.id);
            }
        }
        Ok(())
    }
}
