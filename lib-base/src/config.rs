// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

//! Configuration management for hidreplay
//!
//! The configuration is a YAML document listing the devices to drive and the
//! reports to replay to each of them:
//!
//! ```yaml
//! log_file: hidreplay.log
//! log_level: INFO
//! polling_frequency_ms: 2000
//! devices:
//!   - manufacturer_string: Acme
//!     product_string: Widget
//!     byte_strings:
//!       - "0x06, 0x01, 0xff, 0x00"
//! ```
//!
//! When no file is named, `config.yml` is searched in:
//! 1. Current directory
//! 2. User's config directory:
//!    - macOS: ~/Library/Application Support/hidreplay/config.yml
//!    - Linux: ~/.config/hidreplay/config.yml
//!    - Windows: %APPDATA%\hidreplay\config.yml

use anyhow::{bail, Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "config.yml";
pub const DEFAULT_POLLING_FREQUENCY_MS: u64 = 2000;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_polling_frequency_ms")]
    pub polling_frequency_ms: u64,
    #[serde(default)]
    pub devices: Vec<DeviceDescriptor>,
}

/// A configured target device and the reports to send to it.
///
/// Only `manufacturer_string` and `product_string` take part in matching.
/// `vendor_id`/`product_id` and any other keys are carried along as overlay
/// fields for the matched device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_strings: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl DeviceDescriptor {
    pub fn new(manufacturer: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            manufacturer_string: Some(manufacturer.into()),
            product_string: Some(product.into()),
            ..Default::default()
        }
    }

    pub fn with_byte_strings<I, S>(mut self, byte_strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.byte_strings = Some(byte_strings.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_ids(mut self, vendor_id: u16, product_id: u16) -> Self {
        self.vendor_id = Some(vendor_id);
        self.product_id = Some(product_id);
        self
    }
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_polling_frequency_ms() -> u64 {
    DEFAULT_POLLING_FREQUENCY_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: None,
            log_level: default_log_level(),
            polling_frequency_ms: default_polling_frequency_ms(),
            devices: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .with_context(|| "Failed to parse YAML config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.level_filter()?;
        Ok(())
    }

    /// Map the configured severity name onto a `log` level filter
    pub fn level_filter(&self) -> Result<LevelFilter> {
        let level = match self.log_level.trim().to_ascii_uppercase().as_str() {
            "TRACE" => LevelFilter::Trace,
            "DEBUG" => LevelFilter::Debug,
            "INFO" => LevelFilter::Info,
            "WARN" | "WARNING" => LevelFilter::Warn,
            "ERROR" | "CRITICAL" => LevelFilter::Error,
            "OFF" => LevelFilter::Off,
            other => bail!("Unknown log_level: {:?}", other),
        };
        Ok(level)
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_frequency_ms)
    }

    /// Find a configuration file by name.
    /// Searches the current directory first, then the user's config directory.
    pub fn locate(filename: &str) -> Option<PathBuf> {
        Self::get_config_search_paths(filename)
            .into_iter()
            .find(|path| path.exists())
    }

    fn get_config_search_paths(filename: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(filename)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("hidreplay").join(filename));
        }
        paths
    }
}
