// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

use hidapi::{DeviceInfo, HidApi, HidDevice as RawHidDevice};
use log::debug;
use serde::{Deserialize, Serialize};
use std::ffi::CString;

/// A HID device as reported by one host enumeration.
///
/// Recreated on every scan, never cached across scans. The field order is the
/// order used when a device is written out as a configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumeratedDevice {
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial_number: Option<String>,
    pub release_number: u16,
    pub manufacturer_string: Option<String>,
    pub product_string: Option<String>,
    pub usage_page: u16,
    pub usage: u16,
    pub interface_number: i32,
}

impl EnumeratedDevice {
    /// Keys carried by every live record. Configuration fields with one of
    /// these names never override the live value.
    pub const FIELD_NAMES: [&'static str; 10] = [
        "path",
        "vendor_id",
        "product_id",
        "serial_number",
        "release_number",
        "manufacturer_string",
        "product_string",
        "usage_page",
        "usage",
        "interface_number",
    ];

    pub fn new(path: impl Into<String>, vendor_id: u16, product_id: u16) -> Self {
        Self {
            path: path.into(),
            vendor_id,
            product_id,
            serial_number: None,
            release_number: 0,
            manufacturer_string: None,
            product_string: None,
            usage_page: 0,
            usage: 0,
            interface_number: -1,
        }
    }

    pub fn with_strings(mut self, manufacturer: impl Into<String>, product: impl Into<String>) -> Self {
        self.manufacturer_string = Some(manufacturer.into());
        self.product_string = Some(product.into());
        self
    }

    pub fn with_usage(mut self, usage_page: u16, usage: u16) -> Self {
        self.usage_page = usage_page;
        self.usage = usage;
        self
    }

    pub fn has_field(name: &str) -> bool {
        Self::FIELD_NAMES.contains(&name)
    }

    /// One-line summary used in scan and dispatch logs
    pub fn summary(&self) -> String {
        format!(
            "{} {}  vid/pid:{}/{} usage:{}/{}",
            self.manufacturer_string.as_deref().unwrap_or_default(),
            self.product_string.as_deref().unwrap_or_default(),
            self.vendor_id,
            self.product_id,
            self.usage_page,
            self.usage
        )
    }
}

impl From<&DeviceInfo> for EnumeratedDevice {
    fn from(info: &DeviceInfo) -> Self {
        Self {
            path: info.path().to_string_lossy().into_owned(),
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
            serial_number: info.serial_number().map(str::to_owned),
            release_number: info.release_number(),
            manufacturer_string: info.manufacturer_string().map(str::to_owned),
            product_string: info.product_string().map(str::to_owned),
            usage_page: info.usage_page(),
            usage: info.usage(),
            interface_number: info.interface_number(),
        }
    }
}

/// Errors that can occur with HID operations
#[derive(Debug, thiserror::Error)]
pub enum HidError {
    #[error("Failed to enumerate devices: {0}")]
    EnumerationFailed(String),

    #[error("Failed to open device {path}: {reason}")]
    OpenFailed { path: String, reason: String },

    #[error("Failed to write to device: {0}")]
    WriteFailed(String),

    #[error("Invalid device path: {0:?}")]
    InvalidPath(String),

    #[error("HID API error: {0}")]
    HidApiError(String),
}

/// An open transport to one device. Released on `close` or on drop.
pub trait ReportSession {
    /// Write one output report
    fn write(&mut self, report: &[u8]) -> Result<usize, HidError>;

    fn close(self) -> Result<(), HidError>
    where
        Self: Sized;
}

/// Host enumeration and transport capability
pub trait HidBackend {
    type Session: ReportSession;

    /// List every HID device currently attached to the host
    fn enumerate(&mut self) -> Result<Vec<EnumeratedDevice>, HidError>;

    /// Open a session on the device at `path`
    fn open(&mut self, path: &str) -> Result<Self::Session, HidError>;
}

/// `HidBackend` backed by the platform hidapi library
pub struct HidApiBackend {
    api: HidApi,
}

impl HidApiBackend {
    pub fn new() -> Result<Self, HidError> {
        let api = HidApi::new().map_err(|e| HidError::HidApiError(e.to_string()))?;
        Ok(Self { api })
    }
}

impl HidBackend for HidApiBackend {
    type Session = HidApiSession;

    fn enumerate(&mut self) -> Result<Vec<EnumeratedDevice>, HidError> {
        self.api
            .refresh_devices()
            .map_err(|e| HidError::EnumerationFailed(e.to_string()))?;
        let devices: Vec<EnumeratedDevice> = self.api.device_list().map(EnumeratedDevice::from).collect();
        debug!("Enumerated {} HID devices", devices.len());
        Ok(devices)
    }

    fn open(&mut self, path: &str) -> Result<HidApiSession, HidError> {
        let c_path = CString::new(path).map_err(|_| HidError::InvalidPath(path.to_string()))?;
        let device = self.api.open_path(&c_path).map_err(|e| HidError::OpenFailed {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        debug!("Opened {}", path);
        Ok(HidApiSession {
            path: path.to_string(),
            device,
        })
    }
}

/// Session on a device opened through hidapi
pub struct HidApiSession {
    path: String,
    device: RawHidDevice,
}

impl ReportSession for HidApiSession {
    fn write(&mut self, report: &[u8]) -> Result<usize, HidError> {
        debug!("HID TX: {:02x?}", report);
        self.device
            .write(report)
            .map_err(|e| HidError::WriteFailed(e.to_string()))
    }

    fn close(self) -> Result<(), HidError> {
        // hidapi closes the handle when the device is dropped
        debug!("Closed {}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_with_missing_strings() {
        let device = EnumeratedDevice::new("/dev/hidraw3", 0x1234, 0x5678).with_usage(0xff00, 1);
        assert_eq!(device.summary(), "   vid/pid:4660/22136 usage:65280/1");
    }

    #[test]
    fn test_summary() {
        let device = EnumeratedDevice::new("/dev/hidraw0", 1, 2).with_strings("Acme", "Widget");
        assert_eq!(device.summary(), "Acme Widget  vid/pid:1/2 usage:0/0");
    }

    #[test]
    fn test_field_names() {
        assert!(EnumeratedDevice::has_field("path"));
        assert!(EnumeratedDevice::has_field("vendor_id"));
        assert!(!EnumeratedDevice::has_field("byte_strings"));
    }
}
