// Copyright 2025 DeskSpan Authors
// SPDX-License-Identifier: Apache-2.0

//! Input backend configuration

use serde::{Deserialize, Serialize};

/// Backend selection options.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Attempt the virtual HID backend before falling back to the screen
    /// synthesizer. Off by default: the virtual device needs `/dev/uhid`
    /// access, which most setups only grant deliberately.
    pub virtual_input_enabled: bool,
    /// Device name the host shows for the virtual device; empty picks the
    /// built-in default.
    pub virtual_device_name: String,
}

impl InputConfig {
    /// Configuration that always uses the screen synthesizer.
    pub fn screen_only() -> Self {
        Self::default()
    }

    /// Configuration that requests the virtual HID backend.
    pub fn virtual_hid(device_name: impl Into<String>) -> Self {
        Self {
            virtual_input_enabled: true,
            virtual_device_name: device_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_screen_only() {
        let config = InputConfig::default();
        assert!(!config.virtual_input_enabled);
        assert!(config.virtual_device_name.is_empty());
    }

    #[test]
    fn test_virtual_hid_constructor() {
        let config = InputConfig::virtual_hid("Desk A");
        assert!(config.virtual_input_enabled);
        assert_eq!(config.virtual_device_name, "Desk A");
    }
}
