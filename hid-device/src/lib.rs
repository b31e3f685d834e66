// Copyright 2025 DeskSpan Authors
// SPDX-License-Identifier: Apache-2.0

//! Virtual HID keyboard and mouse device
//!
//! This crate presents a synthetic USB-HID keyboard/mouse pair to the host
//! input stack through the Linux `uhid` facility. Remote input events are
//! translated into fixed-layout HID reports and written to `/dev/uhid` as
//! record-oriented kernel events; the host then dispatches them through its
//! normal USB HID stack, so no windowing-system API is involved.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    VirtualHidDevice                         │
//! │  - session lifecycle (create / start handshake / destroy)   │
//! │  - keyboard, mouse and repeat operations                    │
//! └─────────────────────────────────────────────────────────────┘
//!               │                              │
//!               ▼                              ▼
//! ┌─────────────────────────┐   ┌─────────────────────────────┐
//! │       InputState        │   │        UhidChannel          │
//! │  - 6-slot key set       │   │  - CREATE2 / INPUT2 /       │
//! │  - modifier byte        │   │    DESTROY records          │
//! │  - button byte          │   │  - START wait (3 s budget)  │
//! │  - delta chunking       │   │                             │
//! └─────────────────────────┘   └─────────────────────────────┘
//!               │
//!               ▼
//! ┌─────────────────────────┐
//! │         keymap          │
//! │  key id → HID usage     │
//! └─────────────────────────┘
//! ```

use std::io;

pub mod descriptor;
pub mod device;
pub mod keymap;
pub mod report;
pub mod uhid;

pub use descriptor::{
    DEFAULT_DEVICE_NAME, KEYBOARD_REPORT_ID, KEYBOARD_REPORT_LEN, KEY_SLOTS, MOUSE_REPORT_ID,
    MOUSE_REPORT_LEN, REPORT_DESCRIPTOR,
};
pub use device::VirtualHidDevice;
pub use keymap::{map_key, ButtonId, KeyId, KeyMapping, ModifierMask};
pub use report::{InputState, KeyboardReport, MouseReport};
pub use uhid::UhidChannel;

/// Result type for virtual device operations
pub type Result<T> = std::result::Result<T, HidError>;

/// Virtual device error types
#[derive(Debug, thiserror::Error)]
pub enum HidError {
    /// The uhid character device could not be opened (missing module,
    /// insufficient permissions, or a non-Linux host).
    #[error("cannot open uhid device: {0}")]
    Open(#[source] io::Error),

    /// The kernel rejected the CREATE2 record.
    #[error("uhid device creation rejected: {0}")]
    Create(#[source] io::Error),

    /// Reading kernel events while waiting for START failed.
    #[error("error while waiting for uhid START: {0}")]
    Start(#[source] io::Error),

    /// No START event arrived within the startup budget.
    #[error("timed out waiting for uhid START")]
    StartTimeout,

    /// An INPUT2 record could not be written. State stays coherent and the
    /// next operation retries afresh.
    #[error("report write failed: {0}")]
    Write(#[source] io::Error),

    /// An operation was invoked while the session is not running.
    #[error("virtual device is not running")]
    NotRunning,

    /// The host has no uhid facility at all.
    #[error("uhid is not supported on this platform")]
    Unsupported,
}
