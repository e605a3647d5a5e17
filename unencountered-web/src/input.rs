#![allow(clippy::match_same_arms)]
//! Keyboard translation from DOM `KeyboardEvent` fields to engine keys.

use unencountered_engine::Key;

// Centralized numeric keyboard mapping
// Returns Some(0..=9) if the string is a number key; None otherwise
#[must_use]
pub fn numeric_key_to_index(key: &str) -> Option<u8> {
    match key {
        "0" => Some(0),
        "1" => Some(1),
        "2" => Some(2),
        "3" => Some(3),
        "4" => Some(4),
        "5" => Some(5),
        "6" => Some(6),
        "7" => Some(7),
        "8" => Some(8),
        "9" => Some(9),
        _ => None,
    }
}

// Parses KeyboardEvent.code such as "Digit3" or "Numpad5"
#[must_use]
pub fn numeric_code_to_index(code: &str) -> Option<u8> {
    if let Some(last) = code.chars().last()
        && last.is_ascii_digit()
        && (code.starts_with("Digit") || code.starts_with("Numpad"))
    {
        return numeric_key_to_index(&last.to_string());
    }
    None
}

/// The fields of a keydown event the game cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub code: String,
    pub repeat: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl KeyPress {
    #[must_use]
    pub fn named(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }
}

/// Engine key for a keydown, or `None` when the browser should keep it.
///
/// Shortcut chords stay with the browser, and held keys do not auto-repeat.
/// Number-row keys are matched by physical code too, so shifted digits still
/// reach the hotkeys. Numpad codes count only when the key itself is a digit,
/// since with NumLock off the same code carries an arrow or Home/End.
#[must_use]
pub fn translate(press: &KeyPress) -> Option<Key> {
    if press.ctrl || press.meta || press.alt || press.repeat {
        return None;
    }
    if let Some(digit) = numeric_code_to_index(&press.code)
        && (press.code.starts_with("Digit") || numeric_key_to_index(&press.key).is_some())
    {
        return char::from_digit(u32::from(digit), 10).map(Key::Char);
    }
    match Key::from_dom(&press.key) {
        Key::Other(_) => None,
        key => Some(key),
    }
}

/// Keys whose default action (scrolling, activating focused buttons) fights the game.
#[must_use]
pub fn should_prevent_default(key: &Key) -> bool {
    matches!(
        key,
        Key::Up | Key::Down | Key::Left | Key::Right | Key::Enter | Key::Char(' ')
    )
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn key_maps() {
        assert_eq!(numeric_key_to_index("0"), Some(0));
        assert_eq!(numeric_key_to_index("9"), Some(9));
        assert_eq!(numeric_key_to_index("x"), None);
    }

    #[test]
    fn code_maps() {
        assert_eq!(numeric_code_to_index("Digit0"), Some(0));
        assert_eq!(numeric_code_to_index("Numpad5"), Some(5));
        assert_eq!(numeric_code_to_index("KeyA"), None);
        assert_eq!(numeric_code_to_index("F1"), None);
    }

    #[test]
    fn shifted_digits_follow_the_physical_key() {
        let press = KeyPress {
            key: "!".to_string(),
            code: "Digit1".to_string(),
            ..KeyPress::default()
        };
        assert_eq!(translate(&press), Some(Key::Char('1')));
    }

    #[test]
    fn numpad_without_numlock_keeps_its_navigation_key() {
        let arrow = KeyPress {
            key: "ArrowDown".to_string(),
            code: "Numpad2".to_string(),
            ..KeyPress::default()
        };
        assert_eq!(translate(&arrow), Some(Key::Down));
        let digit = KeyPress {
            key: "2".to_string(),
            code: "Numpad2".to_string(),
            ..KeyPress::default()
        };
        assert_eq!(translate(&digit), Some(Key::Char('2')));
    }

    #[test]
    fn chords_repeats_and_modifiers_are_left_alone() {
        let chord = KeyPress {
            ctrl: true,
            ..KeyPress::named("r")
        };
        assert_eq!(translate(&chord), None);
        let held = KeyPress {
            repeat: true,
            ..KeyPress::named("ArrowDown")
        };
        assert_eq!(translate(&held), None);
        assert_eq!(translate(&KeyPress::named("Shift")), None);
        assert_eq!(translate(&KeyPress::named("ArrowDown")), Some(Key::Down));
    }

    #[test]
    fn arrows_and_enter_do_not_scroll_the_page() {
        assert!(should_prevent_default(&Key::Down));
        assert!(should_prevent_default(&Key::Enter));
        assert!(!should_prevent_default(&Key::Escape));
        assert!(!should_prevent_default(&Key::Char('1')));
    }
}
