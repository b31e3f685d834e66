// Copyright 2025 DeskSpan Authors
// SPDX-License-Identifier: Apache-2.0

//! HID report descriptor and device identity
//!
//! The descriptor declares two top-level application collections: a boot-style
//! mouse on report id 1 and a boot-style keyboard on report id 2. The byte
//! sequence is the on-wire contract with the host input stack; changing any
//! byte changes how the host parses every report this device emits.

/// Device name presented to the host when the configured name is empty.
pub const DEFAULT_DEVICE_NAME: &str = "DeskSpan Virtual HID";

/// USB identity reported in the CREATE2 record.
pub const DEVICE_VENDOR: u32 = 0x1234;
pub const DEVICE_PRODUCT: u32 = 0x5678;
pub const DEVICE_VERSION: u32 = 1;
pub const DEVICE_COUNTRY: u32 = 0;

/// Report id carried in byte 0 of every mouse report.
pub const MOUSE_REPORT_ID: u8 = 0x01;
/// Report id carried in byte 0 of every keyboard report.
pub const KEYBOARD_REPORT_ID: u8 = 0x02;

/// Mouse report layout: [id, buttons, dx, dy, wheel, pan].
pub const MOUSE_REPORT_LEN: usize = 6;
/// Keyboard report layout: [id, modifiers, reserved, slot0..slot5].
pub const KEYBOARD_REPORT_LEN: usize = 9;

/// Number of simultaneously reportable non-modifier keys.
pub const KEY_SLOTS: usize = 6;

/// Combined mouse + keyboard report descriptor.
pub const REPORT_DESCRIPTOR: &[u8] = &[
    // Mouse (report id 1)
    0x05, 0x01, //       Usage Page (Generic Desktop)
    0x09, 0x02, //       Usage (Mouse)
    0xA1, 0x01, //       Collection (Application)
    0x85, 0x01, //         Report ID (1)
    0x09, 0x01, //         Usage (Pointer)
    0xA1, 0x00, //         Collection (Physical)
    0x05, 0x09, //           Usage Page (Button)
    0x19, 0x01, //           Usage Minimum (1)
    0x29, 0x05, //           Usage Maximum (5)
    0x15, 0x00, //           Logical Minimum (0)
    0x25, 0x01, //           Logical Maximum (1)
    0x95, 0x05, //           Report Count (5)
    0x75, 0x01, //           Report Size (1)
    0x81, 0x02, //           Input (Data, Var, Abs)
    0x95, 0x01, //           Report Count (1)
    0x75, 0x03, //           Report Size (3)
    0x81, 0x03, //           Input (Const) - padding
    0x05, 0x01, //           Usage Page (Generic Desktop)
    0x09, 0x30, //           Usage (X)
    0x09, 0x31, //           Usage (Y)
    0x09, 0x38, //           Usage (Wheel)
    0x05, 0x0C, //           Usage Page (Consumer)
    0x0A, 0x38, 0x02, //     Usage (AC Pan)
    0x15, 0x81, //           Logical Minimum (-127)
    0x25, 0x7F, //           Logical Maximum (127)
    0x75, 0x08, //           Report Size (8)
    0x95, 0x04, //           Report Count (4)
    0x81, 0x06, //           Input (Data, Var, Rel)
    0xC0, //               End Collection
    0xC0, //             End Collection
    // Keyboard (report id 2)
    0x05, 0x01, //       Usage Page (Generic Desktop)
    0x09, 0x06, //       Usage (Keyboard)
    0xA1, 0x01, //       Collection (Application)
    0x85, 0x02, //         Report ID (2)
    0x05, 0x07, //         Usage Page (Key Codes)
    0x19, 0xE0, //         Usage Minimum (224)
    0x29, 0xE7, //         Usage Maximum (231)
    0x15, 0x00, //         Logical Minimum (0)
    0x25, 0x01, //         Logical Maximum (1)
    0x75, 0x01, //         Report Size (1)
    0x95, 0x08, //         Report Count (8)
    0x81, 0x02, //         Input (Data, Var, Abs) - modifiers
    0x95, 0x01, //         Report Count (1)
    0x75, 0x08, //         Report Size (8)
    0x81, 0x03, //         Input (Const) - reserved
    0x95, 0x06, //         Report Count (6)
    0x75, 0x08, //         Report Size (8)
    0x15, 0x00, //         Logical Minimum (0)
    0x25, 0x65, //         Logical Maximum (101)
    0x05, 0x07, //         Usage Page (Key Codes)
    0x19, 0x00, //         Usage Minimum (0)
    0x29, 0x65, //         Usage Maximum (101)
    0x81, 0x00, //         Input (Data, Array) - key slots
    0xC0, //             End Collection
];
