// Copyright 2025 DeskSpan Authors
// SPDX-License-Identifier: Apache-2.0

//! Input backends and the backend selector
//!
//! An [`InputBackend`] is the sink for every decoded remote event. The
//! operation set mirrors what the protocol delivers: enter/leave for screen
//! transitions, key down/repeat/up, and the mouse operations. All backend
//! operations are invoked serially from the event dispatcher; a backend
//! never needs internal synchronization.
//!
//! Runtime emission failures inside a backend are logged and swallowed:
//! input may be momentarily lost, but the session continues and the next
//! event is attempted afresh.

use log::{debug, info, warn};

use deskspan_hid::{ButtonId, KeyId, ModifierMask, Result, VirtualHidDevice};

use crate::config::InputConfig;
use crate::screen::{KeyButton, ScreenSynthesizer};

/// Sink for decoded remote input events.
pub trait InputBackend {
    /// The remote pointer entered this screen at an absolute position.
    fn enter(&mut self, x_abs: i32, y_abs: i32);

    /// The remote pointer left this screen.
    fn leave(&mut self);

    fn key_down(&mut self, id: KeyId, mask: ModifierMask, button: KeyButton);
    fn key_repeat(&mut self, id: KeyId, mask: ModifierMask, count: i32, button: KeyButton);
    fn key_up(&mut self, id: KeyId, mask: ModifierMask, button: KeyButton);

    fn mouse_down(&mut self, button: ButtonId);
    fn mouse_up(&mut self, button: ButtonId);
    fn mouse_move(&mut self, x_abs: i32, y_abs: i32);
    fn mouse_relative_move(&mut self, dx: i32, dy: i32);
    fn mouse_wheel(&mut self, x_delta: i32, y_delta: i32);
}

// ============================================================================
// Screen Backend
// ============================================================================

/// Backend that forwards events 1:1 to the platform screen synthesizer.
pub struct ScreenBackend {
    screen: Box<dyn ScreenSynthesizer>,
}

impl ScreenBackend {
    pub fn new(screen: Box<dyn ScreenSynthesizer>) -> Self {
        Self { screen }
    }
}

impl InputBackend for ScreenBackend {
    fn enter(&mut self, x_abs: i32, y_abs: i32) {
        self.screen.mouse_move(x_abs, y_abs);
    }

    fn leave(&mut self) {}

    fn key_down(&mut self, id: KeyId, mask: ModifierMask, button: KeyButton) {
        self.screen.key_down(id, mask, button);
    }

    fn key_repeat(&mut self, id: KeyId, mask: ModifierMask, count: i32, button: KeyButton) {
        self.screen.key_repeat(id, mask, count, button);
    }

    fn key_up(&mut self, id: KeyId, mask: ModifierMask, button: KeyButton) {
        self.screen.key_up(id, mask, button);
    }

    fn mouse_down(&mut self, button: ButtonId) {
        self.screen.mouse_down(button);
    }

    fn mouse_up(&mut self, button: ButtonId) {
        self.screen.mouse_up(button);
    }

    fn mouse_move(&mut self, x_abs: i32, y_abs: i32) {
        self.screen.mouse_move(x_abs, y_abs);
    }

    fn mouse_relative_move(&mut self, dx: i32, dy: i32) {
        self.screen.mouse_relative_move(dx, dy);
    }

    fn mouse_wheel(&mut self, x_delta: i32, y_delta: i32) {
        self.screen.mouse_wheel(x_delta, y_delta);
    }
}

// ============================================================================
// Virtual HID Backend
// ============================================================================

/// Backend that injects events through the kernel uhid device.
pub struct VirtualHidBackend {
    device: VirtualHidDevice,
}

impl VirtualHidBackend {
    /// Bring up the virtual device. Construction only succeeds once the
    /// kernel has acknowledged the device with START; afterwards the backend
    /// stays usable for the whole session.
    pub fn new(device_name: &str) -> Result<Self> {
        Ok(Self {
            device: VirtualHidDevice::new(device_name)?,
        })
    }

    fn emit(result: Result<()>, what: &str) {
        if let Err(err) = result {
            debug!("uhid: {} dropped ({})", what, err);
        }
    }
}

impl InputBackend for VirtualHidBackend {
    fn enter(&mut self, x_abs: i32, y_abs: i32) {
        Self::emit(self.device.clear_input_state(), "enter reset");
        // Records the baseline for absolute-to-relative translation.
        Self::emit(self.device.mouse_move_absolute(x_abs, y_abs), "enter move");
    }

    fn leave(&mut self) {
        Self::emit(self.device.clear_input_state(), "leave reset");
    }

    fn key_down(&mut self, id: KeyId, mask: ModifierMask, _button: KeyButton) {
        Self::emit(self.device.key_down(id, mask), "key down");
    }

    fn key_repeat(&mut self, id: KeyId, mask: ModifierMask, count: i32, _button: KeyButton) {
        Self::emit(self.device.key_repeat(id, mask, count), "key repeat");
    }

    fn key_up(&mut self, id: KeyId, mask: ModifierMask, _button: KeyButton) {
        Self::emit(self.device.key_up(id, mask), "key up");
    }

    fn mouse_down(&mut self, button: ButtonId) {
        Self::emit(self.device.mouse_down(button), "mouse down");
    }

    fn mouse_up(&mut self, button: ButtonId) {
        Self::emit(self.device.mouse_up(button), "mouse up");
    }

    fn mouse_move(&mut self, x_abs: i32, y_abs: i32) {
        Self::emit(self.device.mouse_move_absolute(x_abs, y_abs), "mouse move");
    }

    fn mouse_relative_move(&mut self, dx: i32, dy: i32) {
        Self::emit(self.device.mouse_relative_move(dx, dy), "relative move");
    }

    fn mouse_wheel(&mut self, x_delta: i32, y_delta: i32) {
        Self::emit(self.device.mouse_wheel(x_delta, y_delta), "wheel");
    }
}

// ============================================================================
// Backend Selector
// ============================================================================

/// Build the input backend for a session.
///
/// Attempts the virtual HID backend when the configuration asks for it and
/// falls back to the screen synthesizer when the device cannot be created,
/// so input keeps flowing either way. The returned backend is owned by the
/// caller for the lifetime of the session.
pub fn create_input_backend(
    screen: Box<dyn ScreenSynthesizer>,
    config: &InputConfig,
) -> Box<dyn InputBackend> {
    if !config.virtual_input_enabled {
        return Box::new(ScreenBackend::new(screen));
    }

    match VirtualHidBackend::new(&config.virtual_device_name) {
        Ok(backend) => {
            info!("uhid: using virtual HID backend");
            Box::new(backend)
        }
        Err(err) => {
            warn!(
                "uhid: virtual HID backend unavailable ({}), falling back to screen synthesis",
                err
            );
            Box::new(ScreenBackend::new(screen))
        }
    }
}
