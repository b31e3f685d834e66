// Copyright 2025 DeskSpan Authors
// SPDX-License-Identifier: Apache-2.0

//! Screen synthesizer interface
//!
//! The on-screen synthesizer is the platform layer that injects input
//! through windowing-system APIs. It lives outside this crate; only the
//! capability set the screen backend forwards to is defined here.

use deskspan_hid::{ButtonId, KeyId, ModifierMask};

/// Opaque platform key button accompanying keyboard events.
///
/// The virtual backend has no use for it, but screen implementations need it
/// to reproduce the exact physical key.
pub type KeyButton = u16;

/// Platform screen synthesizer capability set.
pub trait ScreenSynthesizer {
    /// Warp the pointer to an absolute position.
    fn mouse_move(&mut self, x_abs: i32, y_abs: i32);

    fn key_down(&mut self, id: KeyId, mask: ModifierMask, button: KeyButton);
    fn key_repeat(&mut self, id: KeyId, mask: ModifierMask, count: i32, button: KeyButton);
    fn key_up(&mut self, id: KeyId, mask: ModifierMask, button: KeyButton);

    fn mouse_down(&mut self, button: ButtonId);
    fn mouse_up(&mut self, button: ButtonId);
    fn mouse_relative_move(&mut self, dx: i32, dy: i32);
    fn mouse_wheel(&mut self, x_delta: i32, y_delta: i32);
}
