//! The fixed verb palette and cursor movement across visible verbs.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Verbs offered by the explore bar, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Verb {
    Look,
    Speak,
    Use,
    Take,
    Move,
}

/// The full palette. Indexes into this array are stable.
pub const VERBS: [Verb; 5] = [Verb::Look, Verb::Speak, Verb::Use, Verb::Take, Verb::Move];

/// Verbs that are currently drawable, in palette order.
pub type VisibleVerbs = SmallVec<[Verb; 5]>;

impl Verb {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Look => "Look",
            Self::Speak => "Speak",
            Self::Use => "Use",
            Self::Take => "Take",
            Self::Move => "Move",
        }
    }

    /// Position of this verb in [`VERBS`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Look => 0,
            Self::Speak => 1,
            Self::Use => 2,
            Self::Take => 3,
            Self::Move => 4,
        }
    }

    /// `Move` is only offered in scenes that allow travel.
    #[must_use]
    pub const fn is_visible(self, can_move: bool) -> bool {
        !matches!(self, Self::Move) || can_move
    }

    /// Header shown above the object menu while this verb is selected.
    #[must_use]
    pub fn prompt(self) -> String {
        match self {
            Self::Move => "Where do you want to go?".to_string(),
            _ => format!("What do you want to {}?", self.label().to_lowercase()),
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        VERBS
            .into_iter()
            .find(|verb| verb.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Verbs drawable for the given move capability.
#[must_use]
pub fn visible_verbs(can_move: bool) -> VisibleVerbs {
    VERBS
        .into_iter()
        .filter(|verb| verb.is_visible(can_move))
        .collect()
}

/// Step from `start` to the nearest visible verb.
///
/// A `direction` of zero keeps `start` when it is visible and otherwise
/// searches forward. Negative directions search backward. The search wraps
/// around the palette and visits each slot at most once.
#[must_use]
pub fn next_visible(start: usize, direction: i8, can_move: bool) -> usize {
    let len = VERBS.len();
    let step = if direction < 0 { len - 1 } else { 1 };
    let mut index = start % len;
    if direction != 0 {
        index = (index + step) % len;
    }
    for _ in 0..len {
        if VERBS[index].is_visible(can_move) {
            return index;
        }
        index = (index + step) % len;
    }
    // Look is always visible, so the loop above always returns.
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_hidden_without_travel() {
        assert_eq!(visible_verbs(false).len(), 4);
        assert!(!visible_verbs(false).contains(&Verb::Move));
        assert_eq!(visible_verbs(true).as_slice(), &VERBS);
    }

    #[test]
    fn forward_step_skips_hidden_move() {
        assert_eq!(next_visible(Verb::Take.index(), 1, false), Verb::Look.index());
        assert_eq!(next_visible(Verb::Take.index(), 1, true), Verb::Move.index());
    }

    #[test]
    fn backward_step_wraps_past_hidden_move() {
        assert_eq!(next_visible(Verb::Look.index(), -1, false), Verb::Take.index());
        assert_eq!(next_visible(Verb::Look.index(), -1, true), Verb::Move.index());
    }

    #[test]
    fn zero_direction_rehomes_hidden_cursor() {
        assert_eq!(next_visible(Verb::Move.index(), 0, false), Verb::Look.index());
        assert_eq!(next_visible(Verb::Use.index(), 0, false), Verb::Use.index());
    }

    #[test]
    fn prompts_and_labels() {
        assert_eq!(Verb::Take.prompt(), "What do you want to take?");
        assert_eq!(Verb::Move.prompt(), "Where do you want to go?");
        assert_eq!(Verb::from_label("speak"), Some(Verb::Speak));
        assert_eq!(Verb::from_label("dance"), None);
    }
}
