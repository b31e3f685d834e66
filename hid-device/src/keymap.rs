// Copyright 2025 DeskSpan Authors
// SPDX-License-Identifier: Apache-2.0

//! Key id to HID usage mapping
//!
//! Upstream identifies keys with keysym-derived 32-bit ids: printable ASCII
//! maps to itself, named keys live in the 0xEExx/0xEFxx range. [`map_key`]
//! translates one id into either a HID Keyboard/Keypad usage (with the
//! modifiers the character requires, e.g. shift for `@`) or a modifier-bit
//! contribution. The function is total; ids it does not know produce an
//! empty mapping which the engine drops silently.

/// Abstract key identifier (keysym-derived).
pub type KeyId = u32;

/// Upstream modifier mask accompanying every key event.
pub type ModifierMask = u32;

/// Mouse button identifier.
pub type ButtonId = u8;

/// Modifier bits of the upstream mask.
pub mod mask {
    use super::ModifierMask;

    pub const SHIFT: ModifierMask = 0x0001;
    pub const CONTROL: ModifierMask = 0x0002;
    pub const ALT: ModifierMask = 0x0004;
    pub const META: ModifierMask = 0x0008;
    pub const SUPER: ModifierMask = 0x0010;
    pub const ALT_GR: ModifierMask = 0x0020;
}

/// Named key identifiers.
///
/// Values follow the X keysym layout the upstream protocol uses: 0xFFxx
/// keysyms are carried as 0xEFxx, 0xFExx (ISO) keysyms as 0xEExx.
pub mod keys {
    use super::KeyId;

    pub const BACKSPACE: KeyId = 0xEF08;
    pub const TAB: KeyId = 0xEF09;
    pub const RETURN: KeyId = 0xEF0D;
    pub const PAUSE: KeyId = 0xEF13;
    pub const SCROLL_LOCK: KeyId = 0xEF14;
    pub const ESCAPE: KeyId = 0xEF1B;
    pub const HOME: KeyId = 0xEF50;
    pub const LEFT: KeyId = 0xEF51;
    pub const UP: KeyId = 0xEF52;
    pub const RIGHT: KeyId = 0xEF53;
    pub const DOWN: KeyId = 0xEF54;
    pub const PAGE_UP: KeyId = 0xEF55;
    pub const PAGE_DOWN: KeyId = 0xEF56;
    pub const END: KeyId = 0xEF57;
    pub const PRINT: KeyId = 0xEF61;
    pub const INSERT: KeyId = 0xEF63;
    pub const MENU: KeyId = 0xEF67;
    pub const NUM_LOCK: KeyId = 0xEF7F;
    pub const DELETE: KeyId = 0xEFFF;

    pub const KP_ENTER: KeyId = 0xEF8D;
    pub const KP_HOME: KeyId = 0xEF95;
    pub const KP_LEFT: KeyId = 0xEF96;
    pub const KP_UP: KeyId = 0xEF97;
    pub const KP_RIGHT: KeyId = 0xEF98;
    pub const KP_DOWN: KeyId = 0xEF99;
    pub const KP_PAGE_UP: KeyId = 0xEF9A;
    pub const KP_PAGE_DOWN: KeyId = 0xEF9B;
    pub const KP_END: KeyId = 0xEF9C;
    pub const KP_BEGIN: KeyId = 0xEF9D;
    pub const KP_INSERT: KeyId = 0xEF9E;
    pub const KP_DELETE: KeyId = 0xEF9F;
    pub const KP_MULTIPLY: KeyId = 0xEFAA;
    pub const KP_ADD: KeyId = 0xEFAB;
    pub const KP_SUBTRACT: KeyId = 0xEFAD;
    pub const KP_DECIMAL: KeyId = 0xEFAE;
    pub const KP_DIVIDE: KeyId = 0xEFAF;
    pub const KP_0: KeyId = 0xEFB0;
    pub const KP_1: KeyId = 0xEFB1;
    pub const KP_2: KeyId = 0xEFB2;
    pub const KP_3: KeyId = 0xEFB3;
    pub const KP_4: KeyId = 0xEFB4;
    pub const KP_5: KeyId = 0xEFB5;
    pub const KP_6: KeyId = 0xEFB6;
    pub const KP_7: KeyId = 0xEFB7;
    pub const KP_8: KeyId = 0xEFB8;
    pub const KP_9: KeyId = 0xEFB9;

    pub const F1: KeyId = 0xEFBE;
    pub const F2: KeyId = 0xEFBF;
    pub const F3: KeyId = 0xEFC0;
    pub const F4: KeyId = 0xEFC1;
    pub const F5: KeyId = 0xEFC2;
    pub const F6: KeyId = 0xEFC3;
    pub const F7: KeyId = 0xEFC4;
    pub const F8: KeyId = 0xEFC5;
    pub const F9: KeyId = 0xEFC6;
    pub const F10: KeyId = 0xEFC7;
    pub const F11: KeyId = 0xEFC8;
    pub const F12: KeyId = 0xEFC9;
    pub const F13: KeyId = 0xEFCA;
    pub const F24: KeyId = 0xEFD5;

    pub const SHIFT_L: KeyId = 0xEFE1;
    pub const SHIFT_R: KeyId = 0xEFE2;
    pub const CONTROL_L: KeyId = 0xEFE3;
    pub const CONTROL_R: KeyId = 0xEFE4;
    pub const CAPS_LOCK: KeyId = 0xEFE5;
    pub const META_L: KeyId = 0xEFE7;
    pub const META_R: KeyId = 0xEFE8;
    pub const ALT_L: KeyId = 0xEFE9;
    pub const ALT_R: KeyId = 0xEFEA;
    pub const SUPER_L: KeyId = 0xEFEB;
    pub const SUPER_R: KeyId = 0xEFEC;

    pub const ALT_GR: KeyId = 0xEE03;
    pub const LEFT_TAB: KeyId = 0xEE20;
}

/// HID modifier-byte bits (report byte 1).
pub const MOD_LEFT_CTRL: u8 = 0x01;
pub const MOD_LEFT_SHIFT: u8 = 0x02;
pub const MOD_LEFT_ALT: u8 = 0x04;
pub const MOD_LEFT_META: u8 = 0x08;
pub const MOD_RIGHT_CTRL: u8 = 0x10;
pub const MOD_RIGHT_SHIFT: u8 = 0x20;
pub const MOD_RIGHT_ALT: u8 = 0x40;
pub const MOD_RIGHT_META: u8 = 0x80;

use mask as mask_bits;

/// Result of mapping one key id.
///
/// `usage == 0 && !is_modifier` means the id is unmapped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyMapping {
    /// HID Keyboard/Keypad usage, or 0.
    pub usage: u8,
    /// Modifier bits the character itself requires (e.g. shift for `!`).
    pub required_modifiers: u8,
    /// Modifier-byte contribution when the key is a modifier.
    pub modifier_bit: u8,
    /// True for modifier keys; `usage` is 0 for those.
    pub is_modifier: bool,
}

/// Derive the HID modifier byte from an upstream mask.
///
/// The mask does not distinguish left from right, so everything collapses to
/// the left-side bits except alt-graph, which only exists on the right.
pub fn modifier_from_mask(mask: ModifierMask) -> u8 {
    let mut mods = 0;
    if mask & mask_bits::CONTROL != 0 {
        mods |= MOD_LEFT_CTRL;
    }
    if mask & mask_bits::SHIFT != 0 {
        mods |= MOD_LEFT_SHIFT;
    }
    if mask & mask_bits::ALT != 0 {
        mods |= MOD_LEFT_ALT;
    }
    if mask & (mask_bits::META | mask_bits::SUPER) != 0 {
        mods |= MOD_LEFT_META;
    }
    if mask & mask_bits::ALT_GR != 0 {
        mods |= MOD_RIGHT_ALT;
    }
    mods
}

fn map_ascii(id: KeyId) -> KeyMapping {
    let mut out = KeyMapping::default();
    if id > 0x7f {
        return out;
    }

    let c = id as u8 as char;

    if c.is_ascii_lowercase() {
        out.usage = 0x04 + (c as u8 - b'a');
        return out;
    }

    if c.is_ascii_uppercase() {
        out.usage = 0x04 + (c as u8 - b'A');
        out.required_modifiers = MOD_LEFT_SHIFT;
        return out;
    }

    if ('1'..='9').contains(&c) {
        out.usage = 0x1e + (c as u8 - b'1');
        return out;
    }

    if c == '0' {
        out.usage = 0x27;
        return out;
    }

    let (usage, shifted) = match c {
        '!' => (0x1e, true),
        '@' => (0x1f, true),
        '#' => (0x20, true),
        '$' => (0x21, true),
        '%' => (0x22, true),
        '^' => (0x23, true),
        '&' => (0x24, true),
        '*' => (0x25, true),
        '(' => (0x26, true),
        ')' => (0x27, true),
        '-' => (0x2d, false),
        '_' => (0x2d, true),
        '=' => (0x2e, false),
        '+' => (0x2e, true),
        '[' => (0x2f, false),
        '{' => (0x2f, true),
        ']' => (0x30, false),
        '}' => (0x30, true),
        '\\' => (0x31, false),
        '|' => (0x31, true),
        ';' => (0x33, false),
        ':' => (0x33, true),
        '\'' => (0x34, false),
        '"' => (0x34, true),
        '`' => (0x35, false),
        '~' => (0x35, true),
        ',' => (0x36, false),
        '<' => (0x36, true),
        '.' => (0x37, false),
        '>' => (0x37, true),
        '/' => (0x38, false),
        '?' => (0x38, true),
        ' ' => (0x2c, false),
        _ => (0, false),
    };

    out.usage = usage;
    if shifted {
        out.required_modifiers = MOD_LEFT_SHIFT;
    }
    out
}

/// Map an abstract key id to its HID translation.
///
/// The ASCII table is consulted first; named keys only apply when it yields
/// neither a usage nor a modifier.
pub fn map_key(id: KeyId) -> KeyMapping {
    let mut out = map_ascii(id);
    if out.usage != 0 || out.is_modifier {
        return out;
    }

    match id {
        keys::RETURN | keys::KP_ENTER => out.usage = 0x28,
        keys::ESCAPE => out.usage = 0x29,
        keys::BACKSPACE => out.usage = 0x2a,
        keys::TAB | keys::LEFT_TAB => out.usage = 0x2b,
        keys::DELETE => out.usage = 0x4c,
        keys::INSERT => out.usage = 0x49,
        keys::HOME => out.usage = 0x4a,
        keys::END => out.usage = 0x4d,
        keys::PAGE_UP => out.usage = 0x4b,
        keys::PAGE_DOWN => out.usage = 0x4e,
        keys::RIGHT => out.usage = 0x4f,
        keys::LEFT => out.usage = 0x50,
        keys::DOWN => out.usage = 0x51,
        keys::UP => out.usage = 0x52,
        keys::NUM_LOCK => out.usage = 0x53,
        keys::KP_DIVIDE => out.usage = 0x54,
        keys::KP_MULTIPLY => out.usage = 0x55,
        keys::KP_SUBTRACT => out.usage = 0x56,
        keys::KP_ADD => out.usage = 0x57,
        keys::KP_DECIMAL | keys::KP_DELETE => out.usage = 0x63,
        keys::KP_0 | keys::KP_INSERT => out.usage = 0x62,
        keys::KP_1 | keys::KP_END => out.usage = 0x59,
        keys::KP_2 | keys::KP_DOWN => out.usage = 0x5a,
        keys::KP_3 | keys::KP_PAGE_DOWN => out.usage = 0x5b,
        keys::KP_4 | keys::KP_LEFT => out.usage = 0x5c,
        keys::KP_5 | keys::KP_BEGIN => out.usage = 0x5d,
        keys::KP_6 | keys::KP_RIGHT => out.usage = 0x5e,
        keys::KP_7 | keys::KP_HOME => out.usage = 0x5f,
        keys::KP_8 | keys::KP_UP => out.usage = 0x60,
        keys::KP_9 | keys::KP_PAGE_UP => out.usage = 0x61,
        keys::CAPS_LOCK => out.usage = 0x39,
        keys::PRINT => out.usage = 0x46,
        keys::SCROLL_LOCK => out.usage = 0x47,
        keys::PAUSE => out.usage = 0x48,
        keys::MENU => out.usage = 0x65,
        keys::SHIFT_L => {
            out.is_modifier = true;
            out.modifier_bit = MOD_LEFT_SHIFT;
        }
        keys::SHIFT_R => {
            out.is_modifier = true;
            out.modifier_bit = MOD_RIGHT_SHIFT;
        }
        keys::CONTROL_L => {
            out.is_modifier = true;
            out.modifier_bit = MOD_LEFT_CTRL;
        }
        keys::CONTROL_R => {
            out.is_modifier = true;
            out.modifier_bit = MOD_RIGHT_CTRL;
        }
        keys::ALT_L => {
            out.is_modifier = true;
            out.modifier_bit = MOD_LEFT_ALT;
        }
        keys::ALT_R | keys::ALT_GR => {
            out.is_modifier = true;
            out.modifier_bit = MOD_RIGHT_ALT;
        }
        keys::META_L | keys::SUPER_L => {
            out.is_modifier = true;
            out.modifier_bit = MOD_LEFT_META;
        }
        keys::META_R | keys::SUPER_R => {
            out.is_modifier = true;
            out.modifier_bit = MOD_RIGHT_META;
        }
        _ => {}
    }

    if out.usage == 0 && !out.is_modifier {
        if (keys::F1..=keys::F12).contains(&id) {
            out.usage = 0x3a + (id - keys::F1) as u8;
        } else if (keys::F13..=keys::F24).contains(&id) {
            out.usage = 0x68 + (id - keys::F13) as u8;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_letters() {
        let m = map_key('a' as KeyId);
        assert_eq!(m.usage, 0x04);
        assert_eq!(m.required_modifiers, 0);
        let m = map_key('z' as KeyId);
        assert_eq!(m.usage, 0x1d);
    }

    #[test]
    fn test_uppercase_requires_shift() {
        let m = map_key('A' as KeyId);
        assert_eq!(m.usage, 0x04);
        assert_eq!(m.required_modifiers, MOD_LEFT_SHIFT);
    }

    #[test]
    fn test_digits() {
        assert_eq!(map_key('1' as KeyId).usage, 0x1e);
        assert_eq!(map_key('9' as KeyId).usage, 0x26);
        assert_eq!(map_key('0' as KeyId).usage, 0x27);
    }

    #[test]
    fn test_shifted_punctuation() {
        let m = map_key('@' as KeyId);
        assert_eq!(m.usage, 0x1f);
        assert_eq!(m.required_modifiers, MOD_LEFT_SHIFT);

        let m = map_key('?' as KeyId);
        assert_eq!(m.usage, 0x38);
        assert_eq!(m.required_modifiers, MOD_LEFT_SHIFT);
    }

    #[test]
    fn test_unshifted_punctuation() {
        assert_eq!(map_key('-' as KeyId).usage, 0x2d);
        assert_eq!(map_key(' ' as KeyId).usage, 0x2c);
        assert_eq!(map_key('-' as KeyId).required_modifiers, 0);
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(map_key(keys::RETURN).usage, 0x28);
        assert_eq!(map_key(keys::KP_ENTER).usage, 0x28);
        assert_eq!(map_key(keys::ESCAPE).usage, 0x29);
        assert_eq!(map_key(keys::LEFT).usage, 0x50);
        assert_eq!(map_key(keys::MENU).usage, 0x65);
    }

    #[test]
    fn test_keypad_navigation_aliases() {
        // Both the digit and its navigation alias land on the digit usage.
        assert_eq!(map_key(keys::KP_5).usage, 0x5d);
        assert_eq!(map_key(keys::KP_BEGIN).usage, 0x5d);
        assert_eq!(map_key(keys::KP_0).usage, 0x62);
        assert_eq!(map_key(keys::KP_INSERT).usage, 0x62);
    }

    #[test]
    fn test_function_key_ranges() {
        assert_eq!(map_key(keys::F1).usage, 0x3a);
        assert_eq!(map_key(keys::F12).usage, 0x45);
        assert_eq!(map_key(keys::F13).usage, 0x68);
        assert_eq!(map_key(keys::F24).usage, 0x73);
    }

    #[test]
    fn test_modifier_keys() {
        let m = map_key(keys::SHIFT_L);
        assert!(m.is_modifier);
        assert_eq!(m.modifier_bit, MOD_LEFT_SHIFT);
        assert_eq!(m.usage, 0);

        let m = map_key(keys::SHIFT_R);
        assert_eq!(m.modifier_bit, MOD_RIGHT_SHIFT);

        let m = map_key(keys::ALT_GR);
        assert_eq!(m.modifier_bit, MOD_RIGHT_ALT);

        let m = map_key(keys::SUPER_R);
        assert_eq!(m.modifier_bit, MOD_RIGHT_META);
    }

    #[test]
    fn test_unmapped_id_is_empty() {
        let m = map_key(0xEE99);
        assert_eq!(m, KeyMapping::default());
        // Control characters below the printable range are unmapped too.
        let m = map_key(0x07);
        assert_eq!(m, KeyMapping::default());
    }

    #[test]
    fn test_modifier_from_mask_collapses_to_left() {
        let mods = modifier_from_mask(mask::CONTROL | mask::SHIFT | mask::ALT);
        assert_eq!(mods, MOD_LEFT_CTRL | MOD_LEFT_SHIFT | MOD_LEFT_ALT);

        // Meta and super share the left-meta bit.
        assert_eq!(modifier_from_mask(mask::META), MOD_LEFT_META);
        assert_eq!(modifier_from_mask(mask::SUPER), MOD_LEFT_META);

        // Alt-graph is the one right-side bit the mask can produce.
        assert_eq!(modifier_from_mask(mask::ALT_GR), MOD_RIGHT_ALT);
    }
}
