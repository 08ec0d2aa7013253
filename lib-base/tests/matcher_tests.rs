// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

use hidreplay_base::{match_devices, DeviceDescriptor};
use hidreplay_hid::EnumeratedDevice;

fn widget(path: &str) -> EnumeratedDevice {
    EnumeratedDevice::new(path, 0x1234, 0x5678)
        .with_strings("Acme", "Widget")
        .with_usage(0xff00, 1)
}

fn keyboard(path: &str) -> EnumeratedDevice {
    EnumeratedDevice::new(path, 0x046d, 0xc31c).with_strings("Logitech", "USB Keyboard")
}

#[test]
fn test_match_merges_byte_strings() {
    let descriptors = vec![DeviceDescriptor::new("Acme", "Widget").with_byte_strings(["0x01,0x02"])];
    let live = vec![widget("/dev/hidraw0")];

    let matched = match_devices(&descriptors, &live);

    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].device, live[0]);
    assert_eq!(matched[0].byte_strings, vec!["0x01,0x02".to_string()]);
}

#[test]
fn test_ids_do_not_take_part_in_matching() {
    let descriptors = vec![DeviceDescriptor::new("Acme", "Widget")
        .with_ids(0xdead, 0xbeef)
        .with_byte_strings(["1"])];
    let live = vec![widget("/dev/hidraw0")];

    let matched = match_devices(&descriptors, &live);

    assert_eq!(matched.len(), 1);
    // live values win over configured ones
    assert_eq!(matched[0].device.vendor_id, 0x1234);
    assert_eq!(matched[0].device.product_id, 0x5678);
}

#[test]
fn test_unmatched_devices_and_descriptors_are_dropped() {
    let descriptors = vec![
        DeviceDescriptor::new("Acme", "Widget"),
        DeviceDescriptor::new("Nobody", "Nothing"),
    ];
    let live = vec![keyboard("/dev/hidraw0"), widget("/dev/hidraw1")];

    let matched = match_devices(&descriptors, &live);

    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].path(), "/dev/hidraw1");
}

#[test]
fn test_empty_inputs() {
    assert!(match_devices(&[], &[widget("/dev/hidraw0")]).is_empty());
    assert!(match_devices(&[DeviceDescriptor::new("Acme", "Widget")], &[]).is_empty());
}

#[test]
fn test_result_follows_enumeration_order() {
    let descriptors = vec![
        DeviceDescriptor::new("Logitech", "USB Keyboard"),
        DeviceDescriptor::new("Acme", "Widget"),
    ];
    let live = vec![
        widget("/dev/hidraw0"),
        keyboard("/dev/hidraw1"),
        widget("/dev/hidraw2"),
    ];

    let paths: Vec<_> = match_devices(&descriptors, &live)
        .iter()
        .map(|m| m.path().to_string())
        .collect();

    assert_eq!(paths, vec!["/dev/hidraw0", "/dev/hidraw1", "/dev/hidraw2"]);
}

#[test]
fn test_first_descriptor_wins_per_field() {
    let mut first = DeviceDescriptor::new("Acme", "Widget").with_byte_strings(["1,1"]);
    first.extra.insert("color".into(), "red".into());
    let mut second = DeviceDescriptor::new("Acme", "Widget").with_byte_strings(["2,2"]);
    second.extra.insert("color".into(), "blue".into());
    second.extra.insert("zone".into(), 3_i64.into());

    let matched = match_devices(&[first, second], &[widget("/dev/hidraw0")]);

    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].byte_strings, vec!["1,1".to_string()]);
    assert_eq!(matched[0].extra.get("color"), Some(&serde_yaml::Value::from("red")));
    assert_eq!(matched[0].extra.get("zone"), Some(&serde_yaml::Value::from(3_i64)));
}

#[test]
fn test_live_fields_are_never_overwritten() {
    let mut descriptor = DeviceDescriptor::new("Acme", "Widget");
    descriptor.extra.insert("path".into(), "/dev/other".into());
    descriptor.extra.insert("usage_page".into(), 1_i64.into());

    let matched = match_devices(&[descriptor], &[widget("/dev/hidraw0")]);

    assert_eq!(matched[0].path(), "/dev/hidraw0");
    assert_eq!(matched[0].device.usage_page, 0xff00);
    assert!(matched[0].extra.is_empty());
}

#[test]
fn test_matching_is_idempotent() {
    let descriptors = vec![
        DeviceDescriptor::new("Acme", "Widget").with_byte_strings(["0x01"]),
        DeviceDescriptor::new("Logitech", "USB Keyboard").with_byte_strings(["0x02"]),
    ];
    let live = vec![keyboard("/dev/hidraw0"), widget("/dev/hidraw1")];

    let first = match_devices(&descriptors, &live);
    let projected: Vec<EnumeratedDevice> = first.iter().map(|m| m.device.clone()).collect();
    let second = match_devices(&descriptors, &projected);

    assert_eq!(first, second);
    assert_eq!(first, match_devices(&descriptors, &live));
}

#[test]
fn test_descriptor_without_byte_strings() {
    let matched = match_devices(&[DeviceDescriptor::new("Acme", "Widget")], &[widget("/dev/hidraw0")]);
    assert!(matched[0].byte_strings.is_empty());
}
