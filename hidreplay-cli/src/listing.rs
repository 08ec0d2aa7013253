// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

//! Printing of connected devices as a ready-to-edit configuration document

use anyhow::{Context, Result};
use hidreplay_base::{match_devices, Config, DEFAULT_POLLING_FREQUENCY_MS};
use hidreplay_hid::{EnumeratedDevice, HidApiBackend, HidBackend};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ConfigDocument<T> {
    log_file: &'static str,
    log_level: &'static str,
    polling_frequency_ms: u64,
    devices: Vec<T>,
}

/// Render `devices`, sorted by product name, as a configuration document
fn render<T, F>(mut devices: Vec<T>, product: F) -> Result<String>
where
    T: Serialize,
    F: Fn(&T) -> Option<&str>,
{
    devices.sort_by(|a, b| product(a).cmp(&product(b)));
    let document = ConfigDocument {
        log_file: "hidreplay.log",
        log_level: "INFO",
        polling_frequency_ms: DEFAULT_POLLING_FREQUENCY_MS,
        devices,
    };
    serde_yaml::to_string(&document).context("Failed to serialize device list")
}

fn enumerate() -> Result<Vec<EnumeratedDevice>> {
    let mut backend = HidApiBackend::new().context("Failed to initialize HID API")?;
    Ok(backend.enumerate()?)
}

/// Every device connected to the host
pub fn list_all() -> Result<String> {
    render(enumerate()?, |d| d.product_string.as_deref())
}

/// Connected devices matching the descriptors in `config`
pub fn list_matching(config: &Config) -> Result<String> {
    let matched = match_devices(&config.devices, &enumerate()?);
    render(matched, |m| m.device.product_string.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidreplay_base::DeviceDescriptor;

    fn devices() -> Vec<EnumeratedDevice> {
        vec![
            EnumeratedDevice::new("/dev/hidraw1", 2, 2).with_strings("Acme", "Widget"),
            EnumeratedDevice::new("/dev/hidraw0", 1, 1).with_strings("Acme", "Pad"),
            EnumeratedDevice::new("/dev/hidraw2", 3, 3),
        ]
    }

    #[test]
    fn test_render_sorts_by_product() {
        let yaml = render(devices(), |d| d.product_string.as_deref()).unwrap();

        assert!(yaml.starts_with("log_file: hidreplay.log\nlog_level: INFO\npolling_frequency_ms: 2000\n"));
        let unnamed = yaml.find("/dev/hidraw2").unwrap();
        let pad = yaml.find("/dev/hidraw0").unwrap();
        let widget = yaml.find("/dev/hidraw1").unwrap();
        assert!(unnamed < pad && pad < widget);
    }

    #[test]
    fn test_rendered_document_loads_as_config() {
        let yaml = render(devices(), |d| d.product_string.as_deref()).unwrap();
        let config = Config::from_yaml(&yaml).unwrap();

        assert_eq!(config.devices.len(), 3);
        assert_eq!(config.devices[1].product_string.as_deref(), Some("Pad"));
        assert_eq!(config.devices[1].vendor_id, Some(1));
        assert!(config.devices[1].extra.contains_key("path"));
    }

    #[test]
    fn test_render_matched_devices() {
        let descriptors = vec![DeviceDescriptor::new("Acme", "Widget").with_byte_strings(["0x01,0x02"])];
        let matched = match_devices(&descriptors, &devices());
        let yaml = render(matched, |m| m.device.product_string.as_deref()).unwrap();

        assert!(yaml.contains("product_string: Widget"));
        assert!(yaml.contains("byte_strings:"));
        assert!(yaml.contains("0x01,0x02"));
        assert!(!yaml.contains("Pad"));
    }
}
