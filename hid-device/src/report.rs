// Copyright 2025 DeskSpan Authors
// SPDX-License-Identifier: Apache-2.0

//! Input state tracking and report derivation
//!
//! [`InputState`] owns the rolling keyboard and mouse state and turns each
//! semantic input event into the exact HID report bytes to emit. It is pure
//! bookkeeping: delivery to the kernel happens one layer up, so every report
//! sequence here is directly testable.
//!
//! Large deltas are chunked into signed-byte steps because the boot-style
//! mouse descriptor caps each axis at [-127, +127] per report.

use crate::descriptor::{
    KEYBOARD_REPORT_ID, KEYBOARD_REPORT_LEN, KEY_SLOTS, MOUSE_REPORT_ID, MOUSE_REPORT_LEN,
};
use crate::keymap::{self, ButtonId, KeyId, ModifierMask};

/// One keyboard report: [id, modifiers, reserved, slot0..slot5].
pub type KeyboardReport = [u8; KEYBOARD_REPORT_LEN];

/// One mouse report: [id, buttons, dx, dy, wheel, pan].
pub type MouseReport = [u8; MOUSE_REPORT_LEN];

/// Mouse button identifiers as delivered by upstream.
pub mod buttons {
    use super::ButtonId;

    pub const LEFT: ButtonId = 1;
    pub const MIDDLE: ButtonId = 2;
    pub const RIGHT: ButtonId = 3;
    pub const EXTRA0: ButtonId = 4;
    pub const EXTRA1: ButtonId = 5;
}

/// Wheel delta corresponding to one detent.
const WHEEL_NOTCH: i32 = 120;

/// Largest per-report axis step.
const MAX_STEP: i32 = 127;

fn button_bit(id: ButtonId) -> u8 {
    match id {
        buttons::LEFT => 0x01,
        buttons::RIGHT => 0x02,
        buttons::MIDDLE => 0x04,
        buttons::EXTRA0 => 0x08,
        buttons::EXTRA1 => 0x10,
        _ => 0,
    }
}

/// Rolling keyboard and mouse state.
///
/// Keyboard state is the HID boot-keyboard model: one modifier byte plus six
/// key slots. The slots form a set; a key already present never takes a
/// second slot, and when all six are occupied a new press overwrites the
/// last slot rather than reporting a rollover error.
#[derive(Debug, Default)]
pub struct InputState {
    /// Occupied key slots; 0 means empty.
    keys: [u8; KEY_SLOTS],
    /// Current modifier byte, rewritten from the upstream mask per event.
    modifiers: u8,
    /// Current mouse button byte.
    buttons: u8,
    /// Baseline for absolute-to-relative translation.
    last_abs: Option<(i32, i32)>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset everything, including the absolute baseline.
    pub fn clear(&mut self) {
        self.keys = [0; KEY_SLOTS];
        self.modifiers = 0;
        self.buttons = 0;
        self.last_abs = None;
    }

    pub fn modifiers(&self) -> u8 {
        self.modifiers
    }

    pub fn buttons(&self) -> u8 {
        self.buttons
    }

    /// Number of occupied key slots.
    pub fn pressed_keys(&self) -> usize {
        self.keys.iter().filter(|&&k| k != 0).count()
    }

    /// Keyboard report for the current state.
    pub fn keyboard_report(&self) -> KeyboardReport {
        let mut report = [0u8; KEYBOARD_REPORT_LEN];
        report[0] = KEYBOARD_REPORT_ID;
        report[1] = self.modifiers;
        report[3..3 + KEY_SLOTS].copy_from_slice(&self.keys);
        report
    }

    /// Mouse report for the current button state plus the given motion.
    pub fn mouse_report(&self, dx: i8, dy: i8, wheel: i8, pan: i8) -> MouseReport {
        [
            MOUSE_REPORT_ID,
            self.buttons,
            dx as u8,
            dy as u8,
            wheel as u8,
            pan as u8,
        ]
    }

    /// Register a key press.
    ///
    /// The modifier byte is rewritten from `mask` (upstream is authoritative),
    /// then OR'd with whatever the key itself requires. Returns the report to
    /// emit, or `None` for unmapped ids.
    pub fn key_down(&mut self, id: KeyId, mask: ModifierMask) -> Option<KeyboardReport> {
        let key = keymap::map_key(id);
        self.modifiers = keymap::modifier_from_mask(mask);

        if key.is_modifier {
            self.modifiers |= key.modifier_bit;
            return Some(self.keyboard_report());
        }

        if key.usage == 0 {
            return None;
        }

        self.modifiers |= key.required_modifiers;

        // Re-pressing an already-present key does not allocate a new slot.
        if self.keys.contains(&key.usage) {
            return Some(self.keyboard_report());
        }

        match self.keys.iter_mut().find(|slot| **slot == 0) {
            Some(slot) => *slot = key.usage,
            // All six slots occupied: newest displaces the last slot.
            None => self.keys[KEY_SLOTS - 1] = key.usage,
        }

        Some(self.keyboard_report())
    }

    /// Register a key release.
    pub fn key_up(&mut self, id: KeyId, mask: ModifierMask) -> Option<KeyboardReport> {
        let key = keymap::map_key(id);
        self.modifiers = keymap::modifier_from_mask(mask);

        if key.is_modifier {
            self.modifiers &= !key.modifier_bit;
            return Some(self.keyboard_report());
        }

        if key.usage == 0 {
            return None;
        }

        for slot in self.keys.iter_mut() {
            if *slot == key.usage {
                *slot = 0;
            }
        }

        Some(self.keyboard_report())
    }

    /// Register a button press; unknown ids change nothing and emit nothing.
    pub fn button_down(&mut self, id: ButtonId) -> Option<MouseReport> {
        let bit = button_bit(id);
        if bit == 0 {
            return None;
        }
        self.buttons |= bit;
        Some(self.mouse_report(0, 0, 0, 0))
    }

    /// Register a button release; unknown ids change nothing and emit nothing.
    pub fn button_up(&mut self, id: ButtonId) -> Option<MouseReport> {
        let bit = button_bit(id);
        if bit == 0 {
            return None;
        }
        self.buttons &= !bit;
        Some(self.mouse_report(0, 0, 0, 0))
    }

    /// Translate an absolute position into relative motion reports.
    ///
    /// The first sample after a reset only records the baseline and emits
    /// nothing; reporting it as motion would make the pointer jump on every
    /// reconnect.
    pub fn absolute_motion(&mut self, x: i32, y: i32) -> Vec<MouseReport> {
        match self.last_abs.replace((x, y)) {
            None => Vec::new(),
            Some((last_x, last_y)) => self.relative_motion(x - last_x, y - last_y),
        }
    }

    /// Chunk a relative motion into signed-byte steps.
    pub fn relative_motion(&self, mut dx: i32, mut dy: i32) -> Vec<MouseReport> {
        let mut reports = Vec::new();
        while dx != 0 || dy != 0 {
            let step_x = dx.clamp(-MAX_STEP, MAX_STEP);
            let step_y = dy.clamp(-MAX_STEP, MAX_STEP);
            reports.push(self.mouse_report(step_x as i8, step_y as i8, 0, 0));
            dx -= step_x;
            dy -= step_y;
        }
        reports
    }

    /// Convert wheel deltas into scroll reports.
    ///
    /// Deltas arrive in 120-per-notch units; sub-notch deltas still produce
    /// one step in the delta's direction.
    pub fn wheel_motion(&self, x_delta: i32, y_delta: i32) -> Vec<MouseReport> {
        let mut wheel_steps = notch_steps(y_delta);
        let mut pan_steps = notch_steps(x_delta);

        let mut reports = Vec::new();
        while wheel_steps != 0 || pan_steps != 0 {
            let step_wheel = wheel_steps.clamp(-MAX_STEP, MAX_STEP);
            let step_pan = pan_steps.clamp(-MAX_STEP, MAX_STEP);
            reports.push(self.mouse_report(0, 0, step_wheel as i8, step_pan as i8));
            wheel_steps -= step_wheel;
            pan_steps -= step_pan;
        }
        reports
    }
}

fn notch_steps(delta: i32) -> i32 {
    if delta == 0 {
        return 0;
    }
    let steps = delta / WHEEL_NOTCH;
    if steps == 0 {
        delta.signum()
    } else {
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::{keys, mask};

    #[test]
    fn test_plain_key_report_bytes() {
        let mut state = InputState::new();
        let report = state.key_down('a' as KeyId, 0).unwrap();
        assert_eq!(report, [0x02, 0x00, 0x00, 0x04, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_shift_synthesized_for_uppercase() {
        let mut state = InputState::new();
        let report = state.key_down('A' as KeyId, 0).unwrap();
        assert_eq!(report, [0x02, 0x02, 0x00, 0x04, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_upstream_mask_is_rewritten_each_event() {
        let mut state = InputState::new();
        state.key_down('a' as KeyId, mask::CONTROL).unwrap();
        assert_eq!(state.modifiers(), 0x01);

        // The next event's mask replaces the old one entirely.
        state.key_down('b' as KeyId, 0).unwrap();
        assert_eq!(state.modifiers(), 0x00);
    }

    #[test]
    fn test_repress_does_not_take_second_slot() {
        let mut state = InputState::new();
        state.key_down('a' as KeyId, 0).unwrap();
        state.key_down('a' as KeyId, 0).unwrap();
        assert_eq!(state.pressed_keys(), 1);
    }

    #[test]
    fn test_seventh_key_overwrites_last_slot() {
        let mut state = InputState::new();
        for c in ['a', 'b', 'c', 'd', 'e', 'f'] {
            state.key_down(c as KeyId, 0).unwrap();
        }
        assert_eq!(state.pressed_keys(), 6);

        let report = state.key_down('g' as KeyId, 0).unwrap();
        assert_eq!(state.pressed_keys(), 6);
        // Slot six now carries 'g'; 'f' is gone.
        assert_eq!(report[8], 0x0a);
        assert!(!report.contains(&0x09));
    }

    #[test]
    fn test_key_up_clears_all_matching_slots() {
        let mut state = InputState::new();
        state.key_down('a' as KeyId, 0).unwrap();
        state.key_down('b' as KeyId, 0).unwrap();
        let report = state.key_up('a' as KeyId, 0).unwrap();
        assert_eq!(state.pressed_keys(), 1);
        assert_eq!(report[3], 0);
        assert_eq!(report[4], 0x05);
    }

    #[test]
    fn test_down_up_restores_state() {
        let mut state = InputState::new();
        state.key_down('q' as KeyId, 0).unwrap();
        state.key_up('q' as KeyId, 0).unwrap();
        assert_eq!(state.pressed_keys(), 0);
        assert_eq!(state.keyboard_report(), [0x02, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_modifier_key_sets_and_clears_its_bit() {
        let mut state = InputState::new();
        let report = state.key_down(keys::SHIFT_L, mask::SHIFT).unwrap();
        assert_eq!(report[1], 0x02);

        let report = state.key_up(keys::SHIFT_L, 0).unwrap();
        assert_eq!(report[1], 0x00);
    }

    #[test]
    fn test_shifted_character_sequence() {
        // shift down, '!' down, '!' up, shift up: four reports, clean finish.
        let mut state = InputState::new();
        let r1 = state.key_down(keys::SHIFT_L, mask::SHIFT).unwrap();
        let r2 = state.key_down('!' as KeyId, mask::SHIFT).unwrap();
        let r3 = state.key_up('!' as KeyId, mask::SHIFT).unwrap();
        let r4 = state.key_up(keys::SHIFT_L, 0).unwrap();

        assert_eq!(r1[1], 0x02);
        assert_eq!(r2[3], 0x1e);
        assert_eq!(r3[3], 0);
        assert_eq!(r4[1], 0x00);
        assert_eq!(&r4[3..], &[0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_unmapped_key_emits_nothing() {
        let mut state = InputState::new();
        assert!(state.key_down(0xEE99, 0).is_none());
        assert!(state.key_up(0xEE99, 0).is_none());
        assert_eq!(state.pressed_keys(), 0);
    }

    #[test]
    fn test_button_round_trip() {
        let mut state = InputState::new();
        let down = state.button_down(buttons::LEFT).unwrap();
        assert_eq!(down[1], 0x01);
        let up = state.button_up(buttons::LEFT).unwrap();
        assert_eq!(up[1], 0x00);
    }

    #[test]
    fn test_unknown_button_ignored() {
        let mut state = InputState::new();
        assert!(state.button_down(9).is_none());
        assert_eq!(state.buttons(), 0);
    }

    #[test]
    fn test_small_relative_move_is_one_report() {
        let state = InputState::new();
        let reports = state.relative_motion(10, -20);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0][2] as i8, 10);
        assert_eq!(reports[0][3] as i8, -20);
    }

    #[test]
    fn test_large_relative_move_chunks_and_sums() {
        let state = InputState::new();
        let reports = state.relative_motion(200, -300);
        assert!(reports.len() >= 3);

        let sum_x: i32 = reports.iter().map(|r| (r[2] as i8) as i32).sum();
        let sum_y: i32 = reports.iter().map(|r| (r[3] as i8) as i32).sum();
        assert_eq!(sum_x, 200);
        assert_eq!(sum_y, -300);
        for r in &reports {
            assert!(((r[2] as i8) as i32).abs() <= 127);
            assert!(((r[3] as i8) as i32).abs() <= 127);
        }
    }

    #[test]
    fn test_first_absolute_sample_is_silent() {
        let mut state = InputState::new();
        assert!(state.absolute_motion(500, 400).is_empty());

        let reports = state.absolute_motion(510, 390);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0][2] as i8, 10);
        assert_eq!(reports[0][3] as i8, -10);
    }

    #[test]
    fn test_clear_discards_absolute_baseline() {
        let mut state = InputState::new();
        state.absolute_motion(100, 100);
        state.clear();
        assert!(state.absolute_motion(700, 700).is_empty());
    }

    #[test]
    fn test_sub_notch_wheel_rounds_to_one_step() {
        let state = InputState::new();
        let reports = state.wheel_motion(0, 40);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0][4] as i8, 1);

        let reports = state.wheel_motion(0, -40);
        assert_eq!(reports[0][4] as i8, -1);
    }

    #[test]
    fn test_wheel_steps_accumulate() {
        let state = InputState::new();
        let reports = state.wheel_motion(0, 240);
        let total: i32 = reports.iter().map(|r| (r[4] as i8) as i32).sum();
        assert_eq!(total, 2);
        for r in &reports {
            assert!(((r[4] as i8) as i32).abs() <= 127);
        }
    }

    #[test]
    fn test_horizontal_pan() {
        let state = InputState::new();
        let reports = state.wheel_motion(-360, 0);
        let total: i32 = reports.iter().map(|r| (r[5] as i8) as i32).sum();
        assert_eq!(total, -3);
    }

    #[test]
    fn test_motion_reports_carry_held_buttons() {
        let mut state = InputState::new();
        state.button_down(buttons::RIGHT).unwrap();
        let reports = state.relative_motion(5, 5);
        assert_eq!(reports[0][1], 0x02);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut state = InputState::new();
        state.key_down('a' as KeyId, mask::SHIFT).unwrap();
        state.button_down(buttons::LEFT).unwrap();
        state.clear();
        assert_eq!(state.pressed_keys(), 0);
        assert_eq!(state.modifiers(), 0);
        assert_eq!(state.buttons(), 0);
        assert_eq!(state.keyboard_report(), [0x02, 0, 0, 0, 0, 0, 0, 0, 0]);
    }
}
