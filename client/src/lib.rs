// Copyright 2025 DeskSpan Authors
// SPDX-License-Identifier: Apache-2.0

//! Input backend abstraction layer
//!
//! Every input event decoded from the remote protocol is handed to exactly
//! one [`InputBackend`]. Two backends exist:
//!
//! - **Virtual HID**: injects events through a kernel uhid device, so the
//!   host sees an ordinary USB keyboard and mouse.
//! - **Screen**: forwards events to the platform screen synthesizer.
//!
//! The factory attempts the virtual backend when configured and silently
//! falls back to the screen when the device cannot be brought up, so callers
//! never observe the difference.
//!
//! ```text
//!              remote events
//!                    │
//!                    ▼
//!       ┌────────────────────────┐
//!       │  create_input_backend  │
//!       └────────────────────────┘
//!              │            │
//!              ▼            ▼
//!    ┌──────────────┐  ┌──────────────┐
//!    │ VirtualHid   │  │ Screen       │
//!    │ Backend      │  │ Backend      │
//!    │ (uhid)       │  │ (synthesizer)│
//!    └──────────────┘  └──────────────┘
//! ```

mod backend;
mod config;
mod screen;

pub use backend::{create_input_backend, InputBackend, ScreenBackend, VirtualHidBackend};
pub use config::InputConfig;
pub use screen::{KeyButton, ScreenSynthesizer};
