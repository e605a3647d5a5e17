//! Keyboard input normalized from browser key names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single key press as seen by scenes and overlays.
///
/// Printable keys are lowercased so `W` and `w` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    Char(char),
    Other(String),
}

impl Key {
    /// Translate a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom(key: &str) -> Self {
        let lowered = key.to_lowercase();
        match lowered.as_str() {
            "arrowup" | "up" => Self::Up,
            "arrowdown" | "down" => Self::Down,
            "arrowleft" | "left" => Self::Left,
            "arrowright" | "right" => Self::Right,
            "enter" | "return" => Self::Enter,
            "escape" | "esc" => Self::Escape,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other(other.to_string()),
                }
            }
        }
    }

    /// DOM name of this key, the inverse of [`Key::from_dom`].
    #[must_use]
    pub fn dom_name(&self) -> String {
        match self {
            Self::Up => "ArrowUp".to_string(),
            Self::Down => "ArrowDown".to_string(),
            Self::Left => "ArrowLeft".to_string(),
            Self::Right => "ArrowRight".to_string(),
            Self::Enter => "Enter".to_string(),
            Self::Escape => "Escape".to_string(),
            Self::Char(c) => c.to_string(),
            Self::Other(name) => name.clone(),
        }
    }

    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up | Self::Char('w'))
    }

    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self, Self::Down | Self::Char('s'))
    }

    #[must_use]
    pub const fn is_left(&self) -> bool {
        matches!(self, Self::Left | Self::Char('a'))
    }

    #[must_use]
    pub const fn is_right(&self) -> bool {
        matches!(self, Self::Right | Self::Char('d'))
    }

    #[must_use]
    pub const fn is_confirm(&self) -> bool {
        matches!(self, Self::Enter)
    }

    #[must_use]
    pub const fn is_cancel(&self) -> bool {
        matches!(self, Self::Escape)
    }

    /// Printable character, if any. Used for hotkey lookup.
    #[must_use]
    pub const fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::from_dom(&value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::from_dom(value)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.dom_name()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dom_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_names_translate() {
        assert_eq!(Key::from_dom("ArrowUp"), Key::Up);
        assert_eq!(Key::from_dom("Escape"), Key::Escape);
        assert_eq!(Key::from_dom("W"), Key::Char('w'));
        assert_eq!(Key::from_dom("Shift"), Key::Other("shift".to_string()));
    }

    #[test]
    fn wasd_aliases_arrows() {
        assert!(Key::Char('w').is_up());
        assert!(Key::Char('s').is_down());
        assert!(!Key::Char('x').is_down());
    }

    #[test]
    fn serde_uses_dom_names() {
        let keys: Vec<Key> = serde_json::from_str(r#"["Enter","ArrowDown","2"]"#).unwrap();
        assert_eq!(keys, vec![Key::Enter, Key::Down, Key::Char('2')]);
        assert_eq!(serde_json::to_string(&Key::Escape).unwrap(), "\"Escape\"");
    }
}
