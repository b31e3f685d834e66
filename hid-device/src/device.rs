// Copyright 2025 DeskSpan Authors
// SPDX-License-Identifier: Apache-2.0

//! Virtual HID device session
//!
//! [`VirtualHidDevice`] ties the input state engine to a kernel channel:
//! construction runs the create/start handshake, each operation updates the
//! rolling state and writes the derived reports, and stop/drop tears the
//! device down. A failed report write surfaces to the caller but leaves the
//! session intact; the next operation simply tries again.

use log::info;

use crate::keymap::{self, ButtonId, KeyId, ModifierMask};
use crate::report::InputState;
use crate::uhid::UhidChannel;
use crate::{HidError, Result};

/// A running virtual keyboard/mouse session.
pub struct VirtualHidDevice {
    chan: UhidChannel,
    state: InputState,
}

impl VirtualHidDevice {
    /// Create the kernel device and wait for the host to start it.
    ///
    /// Fails when the uhid node cannot be opened, the kernel rejects the
    /// device, or no START arrives within 3 seconds. On failure the partial
    /// device is destroyed; the caller is expected to fall back to another
    /// input path.
    pub fn new(device_name: &str) -> Result<Self> {
        let mut chan = UhidChannel::create(device_name)?;
        chan.await_start()?;

        let mut device = Self {
            chan,
            state: InputState::new(),
        };

        // Give the host a clean baseline; a failed neutral report is not
        // fatal, the device is already running.
        let _ = device.clear_input_state();

        info!("uhid: virtual HID device running");
        Ok(device)
    }

    /// Whether the session is running and reports may be emitted.
    pub fn running(&self) -> bool {
        self.chan.is_running()
    }

    /// Reset all input state and report the neutral state to the host.
    ///
    /// Used on enter/leave so the host never sees keys or buttons stuck
    /// across a session boundary, and the next absolute sample becomes a
    /// baseline rather than a jump.
    pub fn clear_input_state(&mut self) -> Result<()> {
        self.state.clear();
        if !self.running() {
            return Ok(());
        }
        let keyboard = self.state.keyboard_report();
        let mouse = self.state.mouse_report(0, 0, 0, 0);
        self.chan.write_input(&keyboard)?;
        self.chan.write_input(&mouse)?;
        Ok(())
    }

    pub fn key_down(&mut self, id: KeyId, mask: ModifierMask) -> Result<()> {
        if !self.running() {
            return Err(HidError::NotRunning);
        }
        match self.state.key_down(id, mask) {
            Some(report) => self.chan.write_input(&report),
            // Unmapped ids are dropped silently; this is not an error.
            None => Ok(()),
        }
    }

    pub fn key_up(&mut self, id: KeyId, mask: ModifierMask) -> Result<()> {
        if !self.running() {
            return Err(HidError::NotRunning);
        }
        match self.state.key_up(id, mask) {
            Some(report) => self.chan.write_input(&report),
            None => Ok(()),
        }
    }

    /// Emit `count` press/release pairs for a non-modifier key.
    ///
    /// Modifier or unmapped ids have no effect; a count of zero or less is a
    /// no-op.
    pub fn key_repeat(&mut self, id: KeyId, mask: ModifierMask, count: i32) -> Result<()> {
        if !self.running() {
            return Err(HidError::NotRunning);
        }

        let key = keymap::map_key(id);
        if key.is_modifier || key.usage == 0 {
            return Ok(());
        }

        for _ in 0..count.max(0) {
            self.key_down(id, mask)?;
            self.key_up(id, mask)?;
        }
        Ok(())
    }

    pub fn mouse_down(&mut self, button: ButtonId) -> Result<()> {
        if !self.running() {
            return Err(HidError::NotRunning);
        }
        match self.state.button_down(button) {
            Some(report) => self.chan.write_input(&report),
            None => Ok(()),
        }
    }

    pub fn mouse_up(&mut self, button: ButtonId) -> Result<()> {
        if !self.running() {
            return Err(HidError::NotRunning);
        }
        match self.state.button_up(button) {
            Some(report) => self.chan.write_input(&report),
            None => Ok(()),
        }
    }

    /// Move to an absolute position, carried on the wire as running deltas.
    pub fn mouse_move_absolute(&mut self, x: i32, y: i32) -> Result<()> {
        if !self.running() {
            return Err(HidError::NotRunning);
        }
        for report in self.state.absolute_motion(x, y) {
            self.chan.write_input(&report)?;
        }
        Ok(())
    }

    pub fn mouse_relative_move(&mut self, dx: i32, dy: i32) -> Result<()> {
        if !self.running() {
            return Err(HidError::NotRunning);
        }
        for report in self.state.relative_motion(dx, dy) {
            self.chan.write_input(&report)?;
        }
        Ok(())
    }

    pub fn mouse_wheel(&mut self, x_delta: i32, y_delta: i32) -> Result<()> {
        if !self.running() {
            return Err(HidError::NotRunning);
        }
        for report in self.state.wheel_motion(x_delta, y_delta) {
            self.chan.write_input(&report)?;
        }
        Ok(())
    }

    /// Tear the device down. Idempotent; also runs on drop.
    pub fn stop(&mut self) {
        if !self.running() {
            return;
        }
        let _ = self.clear_input_state();
        self.chan.destroy();
    }
}

impl Drop for VirtualHidDevice {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Creating a real device needs a reachable /dev/uhid; exercise whichever
    // path this host offers.
    #[test]
    fn test_lifecycle_or_unavailable() {
        match VirtualHidDevice::new("") {
            Ok(mut device) => {
                assert!(device.running());
                device.stop();
                assert!(!device.running());
                // stop is idempotent.
                device.stop();
                assert!(matches!(
                    device.key_down('a' as KeyId, 0),
                    Err(HidError::NotRunning)
                ));
            }
            Err(err) => {
                assert!(matches!(
                    err,
                    HidError::Open(_)
                        | HidError::Create(_)
                        | HidError::Start(_)
                        | HidError::StartTimeout
                        | HidError::Unsupported
                ));
            }
        }
    }
}
