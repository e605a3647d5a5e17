//! Engine configuration: overlay hotkeys, font, and story phases.

use crate::key::Key;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("hotkey `{0}` is bound more than once")]
    DuplicateHotkey(char),
    #[error("hotkey `{0}` has no overlay name")]
    MissingOverlay(char),
}

/// A number key that toggles an overlay from gameplay scenes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotkey {
    pub key: char,
    pub overlay: String,
    /// Text shown in the key bar. May differ from the overlay name.
    pub label: String,
}

impl Hotkey {
    #[must_use]
    pub fn new(key: char, overlay: &str, label: &str) -> Self {
        Self {
            key,
            overlay: overlay.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub hotkeys: Vec<Hotkey>,
    pub font_family: String,
    /// Story phases in unlock order.
    pub phases: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hotkeys: vec![
                Hotkey::new('1', "Phone", "Phone"),
                Hotkey::new('2', "Notebook", "Notebook"),
                Hotkey::new('3', "Location", "Map"),
                Hotkey::new('4', "Inventory", "Inventory"),
            ],
            font_family: "\"Pixel-Regular\", monospace".to_string(),
            phases: (1..=5).map(|n| format!("phase{n}")).collect(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a hotkey is invalid.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if two hotkeys share a key or one names no overlay.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for hotkey in &self.hotkeys {
            let key = hotkey.key.to_ascii_lowercase();
            if !seen.insert(key) {
                return Err(ConfigError::DuplicateHotkey(hotkey.key));
            }
            if hotkey.overlay.trim().is_empty() {
                return Err(ConfigError::MissingOverlay(hotkey.key));
            }
        }
        Ok(())
    }

    /// Overlay bound to `key`, if any.
    #[must_use]
    pub fn hotkey_for(&self, key: &Key) -> Option<&str> {
        let pressed = key.as_char()?;
        self.hotkeys
            .iter()
            .find(|hotkey| hotkey.key.to_ascii_lowercase() == pressed)
            .map(|hotkey| hotkey.overlay.as_str())
    }
}
