// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

//! Matching of live HID devices against configured descriptors.
//!
//! A live device matches a descriptor when both `manufacturer_string` and
//! `product_string` are set on the descriptor and equal the live values
//! exactly. Configured `vendor_id`/`product_id` are not compared; they only
//! take part in the field overlay, where live values always win, so in
//! practice they are informational.

use crate::{DeviceDescriptor, MatchedDevice, ReportError, ReporterContext};
use hidreplay_hid::{EnumeratedDevice, HidBackend};
use log::{debug, info};
use std::collections::BTreeMap;

/// Whether `descriptor` selects `device`
pub fn is_match(descriptor: &DeviceDescriptor, device: &EnumeratedDevice) -> bool {
    let equal = |wanted: &Option<String>, live: &Option<String>| match (wanted, live) {
        (Some(wanted), Some(live)) => wanted == live,
        _ => false,
    };
    equal(&descriptor.manufacturer_string, &device.manufacturer_string)
        && equal(&descriptor.product_string, &device.product_string)
}

/// Select the live devices that match any descriptor.
///
/// The result keeps enumeration order and holds each live device at most
/// once. Every matching descriptor, in configuration order, contributes the
/// fields not yet present on the record, so the first descriptor to provide a
/// field wins.
pub fn match_devices(descriptors: &[DeviceDescriptor], live: &[EnumeratedDevice]) -> Vec<MatchedDevice> {
    live.iter()
        .filter_map(|device| {
            let mut matching = descriptors.iter().filter(|d| is_match(d, device)).peekable();
            matching.peek()?;
            info!("MATCHED DEVICE: {}", device.summary());

            let mut byte_strings = None;
            let mut extra = BTreeMap::new();
            for descriptor in matching {
                if byte_strings.is_none() {
                    if let Some(configured) = &descriptor.byte_strings {
                        debug!("Adding property to device from configuration: byte_strings = {:?}", configured);
                        byte_strings = Some(configured.clone());
                    }
                }
                for (key, value) in &descriptor.extra {
                    if EnumeratedDevice::has_field(key) || key == "byte_strings" || extra.contains_key(key) {
                        continue;
                    }
                    debug!("Adding property to device from configuration: {} = {:?}", key, value);
                    extra.insert(key.clone(), value.clone());
                }
            }

            Some(MatchedDevice {
                device: device.clone(),
                byte_strings: byte_strings.unwrap_or_default(),
                extra,
            })
        })
        .collect()
}

/// Enumerate the host and match the result against the configured devices
pub fn scan_devices<B: HidBackend>(
    context: &ReporterContext,
    backend: &mut B,
) -> Result<Vec<MatchedDevice>, ReportError> {
    info!("~ ~ ~ STARTING DEVICE SCAN ~ ~ ~");
    let live = backend.enumerate().map_err(ReportError::Enumeration)?;
    let matched = match_devices(&context.config().devices, &live);
    debug!("Scan matched {} of {} devices", matched.len(), live.len());
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_match_requires_both_strings() {
        let device = EnumeratedDevice::new("/dev/hidraw0", 1, 2).with_strings("Acme", "Widget");

        assert!(is_match(&DeviceDescriptor::new("Acme", "Widget"), &device));
        assert!(!is_match(&DeviceDescriptor::new("acme", "Widget"), &device));
        assert!(!is_match(&DeviceDescriptor::new("Acme", "Widget "), &device));

        let mut manufacturer_only = DeviceDescriptor::new("Acme", "Widget");
        manufacturer_only.product_string = None;
        assert!(!is_match(&manufacturer_only, &device));
    }

    #[test]
    fn test_unnamed_live_device_never_matches() {
        let device = EnumeratedDevice::new("/dev/hidraw0", 1, 2);
        assert!(!is_match(&DeviceDescriptor::new("Acme", "Widget"), &device));
        assert!(!is_match(&DeviceDescriptor::default(), &device));
    }
}
