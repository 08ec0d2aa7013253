// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

//! # HID Replay Device Library
//!
//! This library provides the host side of HID report replay:
//! - Device enumeration with the fields used for matching and listing
//! - Transport sessions for writing output reports to a device path
//! - A restricted parser for the textual byte lists stored in configuration

pub mod hid_device;
pub mod report_buffer;

// Re-export commonly used types
pub use hid_device::{EnumeratedDevice, HidApiBackend, HidApiSession, HidBackend, HidError, ReportSession};
pub use report_buffer::{parse_buffer, parse_report, token_count, ParseError};
