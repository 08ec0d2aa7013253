// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

use crate::Config;
use hidreplay_hid::{EnumeratedDevice, HidError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// A live device that satisfied a configured descriptor, enriched with the
/// descriptor fields the live record does not have.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedDevice {
    #[serde(flatten)]
    pub device: EnumeratedDevice,
    pub byte_strings: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl MatchedDevice {
    pub fn path(&self) -> &str {
        &self.device.path
    }
}

/// Shared, read-only context handed to the matcher and the dispatcher
#[derive(Debug, Clone)]
pub struct ReporterContext {
    config: Config,
}

impl ReporterContext {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn poll_interval(&self) -> Duration {
        self.config.polling_interval()
    }
}

/// States of the report dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReporterState {
    Idle,
    Scanning,
    Dispatching,
    Sleeping,
    Stopped,
}

/// Failures that end a dispatch loop
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Device scan failed: {0}")]
    Enumeration(#[source] HidError),
    #[error("Send out report error on {path}: {source}")]
    Transport {
        path: String,
        #[source]
        source: HidError,
    },
}
