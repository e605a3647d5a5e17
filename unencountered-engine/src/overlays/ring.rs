//! Combination rings that lock one at a time.
//!
//! Up/Down pick a ring, Left/Right turn it, Enter locks it when it sits on
//! its target. Once every ring is locked the completion flag is set, the
//! panel flashes briefly, then the puzzle is announced and the overlay closes.

use crate::context::GameContext;
use crate::events::GameEvent;
use crate::key::Key;
use crate::overlay::Overlay;
use crate::surface::{Rect, Surface, TextStyle};
use crate::ui::{self, colors};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SWITCHBOARD: &str = "Switchboard";

/// How long the solved panel flashes before closing, in milliseconds.
pub const SOLVED_FLASH_MS: f64 = 450.0;

pub const DEFAULT_POSITIONS: u8 = 9;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RingError {
    #[error("ring puzzle has no rings")]
    Empty,
    #[error("ring puzzle needs at least two positions, got {0}")]
    TooFewPositions(u8),
    #[error("ring `{label}`: target {target} is outside 1..={positions}")]
    TargetOutOfRange {
        label: String,
        target: u8,
        positions: u8,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ring {
    pub label: String,
    /// Position, counted from 1, the ring must sit on to lock.
    pub target: u8,
}

const fn default_positions() -> u8 {
    DEFAULT_POSITIONS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingPuzzleConfig {
    pub name: String,
    pub rings: Vec<Ring>,
    #[serde(default = "default_positions")]
    pub positions: u8,
    /// The rings stay dark until this flag is true. `None` is always powered.
    #[serde(default)]
    pub enable_flag: Option<String>,
    /// Flag set to `"true"` once every ring is locked.
    pub completion_flag: String,
    /// Id published in [`GameEvent::PuzzleCompleted`].
    pub puzzle: String,
    /// Line shown while the rings are being turned.
    #[serde(default)]
    pub hint: String,
}

impl RingPuzzleConfig {
    /// The lobby switchboard: four rings on nine positions.
    #[must_use]
    pub fn switchboard(enable_flag: &str) -> Self {
        let ring = |label: &str, target| Ring {
            label: label.to_string(),
            target,
        };
        Self {
            name: SWITCHBOARD.to_string(),
            rings: vec![
                ring("Outer Ring", 5),
                ring("Ring 2", 7),
                ring("Ring 3", 3),
                ring("Inner Ring", 2),
            ],
            positions: DEFAULT_POSITIONS,
            enable_flag: Some(enable_flag.to_string()),
            completion_flag: "switchboardAligned".to_string(),
            puzzle: "switchboard".to_string(),
            hint: "Code hint: 5-7-3-2".to_string(),
        }
    }

    fn validate(&self) -> Result<(), RingError> {
        if self.rings.is_empty() {
            return Err(RingError::Empty);
        }
        if self.positions < 2 {
            return Err(RingError::TooFewPositions(self.positions));
        }
        if let Some(ring) = self
            .rings
            .iter()
            .find(|ring| ring.target == 0 || ring.target > self.positions)
        {
            return Err(RingError::TargetOutOfRange {
                label: ring.label.clone(),
                target: ring.target,
                positions: self.positions,
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct RingPuzzleOverlay {
    config: RingPuzzleConfig,
    /// Current position of each ring, counted from 1.
    dials: Vec<u8>,
    locked: Vec<bool>,
    selected: usize,
    message: String,
    powered: bool,
    solved: bool,
    flash_ms: f64,
}

impl RingPuzzleOverlay {
    /// # Errors
    ///
    /// Returns an error if there are no rings or a target cannot be reached.
    pub fn new(config: RingPuzzleConfig) -> Result<Self, RingError> {
        config.validate()?;
        let count = config.rings.len();
        let mut puzzle = Self {
            config,
            dials: vec![1; count],
            locked: vec![false; count],
            selected: 0,
            message: String::new(),
            powered: true,
            solved: false,
            flash_ms: 0.0,
        };
        puzzle.reset();
        Ok(puzzle)
    }

    #[must_use]
    pub fn dials(&self) -> &[u8] {
        &self.dials
    }

    #[must_use]
    pub fn locked(&self) -> &[bool] {
        &self.locked
    }

    #[must_use]
    pub const fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn is_solved(&self) -> bool {
        self.solved
    }

    fn reset(&mut self) {
        self.dials.fill(1);
        self.locked.fill(false);
        self.selected = 0;
        self.solved = false;
        self.flash_ms = 0.0;
        self.message.clone_from(&self.config.hint);
    }

    fn show_aligned(&mut self) {
        for (dial, ring) in self.dials.iter_mut().zip(&self.config.rings) {
            *dial = ring.target;
        }
        self.locked.fill(true);
        self.solved = true;
    }

    fn label(&self, index: usize) -> &str {
        self.config
            .rings
            .get(index)
            .map_or("Ring", |ring| ring.label.as_str())
    }

    fn turn(&mut self, forward: bool) {
        if self.locked[self.selected] {
            self.message = "That ring is already locked.".to_string();
            return;
        }
        let positions = self.config.positions;
        let dial = &mut self.dials[self.selected];
        *dial = if forward {
            *dial % positions + 1
        } else if *dial == 1 {
            positions
        } else {
            *dial - 1
        };
    }

    fn try_lock(&mut self, ctx: &mut GameContext<'_>) {
        let index = self.selected;
        if self.locked[index] {
            self.message = "That ring is already locked.".to_string();
            return;
        }
        if self.dials[index] != self.config.rings[index].target {
            self.message = format!("{} is not aligned.", self.label(index));
            return;
        }
        self.locked[index] = true;
        self.message = format!("{} locked.", self.label(index));
        let count = self.locked.len();
        if let Some(next) = (1..count)
            .map(|offset| (index + offset) % count)
            .find(|next| !self.locked[*next])
        {
            self.selected = next;
            return;
        }
        log::info!("ring puzzle `{}` aligned", self.config.name);
        self.solved = true;
        self.message = "The rings click into place.".to_string();
        ctx.set_flag(&self.config.completion_flag, true);
        self.flash_ms = SOLVED_FLASH_MS;
    }
}

impl Overlay for RingPuzzleOverlay {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn init(&mut self, ctx: &mut GameContext<'_>) {
        self.reset();
        self.powered = self
            .config
            .enable_flag
            .as_deref()
            .is_none_or(|flag| ctx.flag(flag));
        if ctx.flag(&self.config.completion_flag) {
            self.show_aligned();
            self.message = "The rings are already aligned.".to_string();
        } else if !self.powered {
            self.locked.fill(true);
            self.message = "The monitor is dark...".to_string();
        }
    }

    fn update(&mut self, dt_ms: f64, ctx: &mut GameContext<'_>) {
        if self.flash_ms <= 0.0 {
            return;
        }
        self.flash_ms -= dt_ms;
        if self.flash_ms > 0.0 {
            return;
        }
        ctx.publish(GameEvent::PuzzleCompleted {
            puzzle: self.config.puzzle.clone(),
        });
        ctx.hide_overlay();
    }

    fn handle_input(&mut self, key: &Key, ctx: &mut GameContext<'_>) -> bool {
        if self.flash_ms > 0.0 {
            return true;
        }
        if key.is_cancel() {
            ctx.hide_overlay();
            return true;
        }
        if self.solved || !self.powered {
            return true;
        }
        let count = self.dials.len();
        if key.is_up() {
            self.selected = (self.selected + count - 1) % count;
        } else if key.is_down() {
            self.selected = (self.selected + 1) % count;
        } else if key.is_left() || key.is_right() {
            self.turn(key.is_right());
        } else if key.is_confirm() {
            self.try_lock(ctx);
        }
        true
    }

    #[allow(clippy::cast_precision_loss)]
    fn render(&mut self, surface: &mut dyn Surface) {
        let panel = ui::overlay_panel(surface);
        let fill = if self.flash_ms > 0.0 {
            colors::HIGHLIGHT
        } else {
            colors::SOLID
        };
        ui::draw_box(surface, panel, fill, colors::WHITE);
        ui::draw_text_centered(surface, &self.config.name, panel.y + 50.0, colors::WHITE, 32.0);

        let row_height = 44.0;
        let top = panel.y + 120.0;
        for (index, ring) in self.config.rings.iter().enumerate() {
            let y = top + index as f64 * row_height;
            if index == self.selected && self.powered && !self.solved {
                surface.fill_rect(
                    Rect::new(panel.x + 30.0, y - row_height / 2.0, panel.w - 60.0, row_height),
                    colors::HIGHLIGHT,
                );
            }
            let color = if self.locked[index] {
                colors::FAINT
            } else {
                colors::WHITE
            };
            surface.fill_text(&ring.label, panel.x + 50.0, y, &TextStyle::new(22.0, color));
            let dial = if self.powered {
                format!("< {} >", self.dials[index])
            } else {
                "< - >".to_string()
            };
            surface.fill_text(
                &dial,
                panel.center_x(),
                y,
                &TextStyle::new(22.0, color).centered(),
            );
            if self.locked[index] && self.powered {
                surface.fill_text(
                    "LOCKED",
                    panel.x + panel.w - 50.0,
                    y,
                    &TextStyle::new(18.0, colors::EXIT).right(),
                );
            }
        }
        ui::draw_text_centered(
            surface,
            &self.message,
            panel.y + panel.h - 90.0,
            colors::MUTED,
            20.0,
        );
        ui::draw_text_centered(
            surface,
            "Up/Down: ring   Left/Right: turn   Enter: lock   Esc: leave",
            panel.y + panel.h - 50.0,
            colors::FAINT,
            16.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Command, World};
    use crate::flags::MemoryFlagStore;

    fn pair() -> RingPuzzleConfig {
        RingPuzzleConfig {
            name: "Safe".to_string(),
            rings: vec![
                Ring {
                    label: "Left".to_string(),
                    target: 2,
                },
                Ring {
                    label: "Right".to_string(),
                    target: 9,
                },
            ],
            positions: 9,
            enable_flag: Some("power_on".to_string()),
            completion_flag: "safe_open".to_string(),
            puzzle: "safe".to_string(),
            hint: "Two and nine.".to_string(),
        }
    }

    fn powered_world() -> World {
        World::new(Box::new(MemoryFlagStore::with_flags([("power_on", "true")])))
    }

    #[test]
    fn switchboard_config_is_valid() {
        let puzzle = RingPuzzleOverlay::new(RingPuzzleConfig::switchboard("met")).unwrap();
        assert_eq!(puzzle.dials(), &[1, 1, 1, 1]);
        assert_eq!(puzzle.message(), "Code hint: 5-7-3-2");
    }

    #[test]
    fn dials_wrap_in_both_directions() {
        let mut world = powered_world();
        let mut puzzle = RingPuzzleOverlay::new(pair()).unwrap();
        let mut ctx = world.context(true);
        puzzle.init(&mut ctx);
        puzzle.handle_input(&Key::Left, &mut ctx);
        assert_eq!(puzzle.dials(), &[9, 1]);
        puzzle.handle_input(&Key::Char('d'), &mut ctx);
        assert_eq!(puzzle.dials(), &[1, 1]);
    }

    #[test]
    fn misaligned_ring_refuses_to_lock() {
        let mut world = powered_world();
        let mut puzzle = RingPuzzleOverlay::new(pair()).unwrap();
        let mut ctx = world.context(true);
        puzzle.init(&mut ctx);
        puzzle.handle_input(&Key::Enter, &mut ctx);
        assert_eq!(puzzle.message(), "Left is not aligned.");
        assert_eq!(puzzle.locked(), &[false, false]);
    }

    #[test]
    fn locking_every_ring_solves_after_the_flash() {
        let mut world = powered_world();
        let mut puzzle = RingPuzzleOverlay::new(pair()).unwrap();
        {
            let mut ctx = world.context(true);
            puzzle.init(&mut ctx);
            puzzle.handle_input(&Key::Right, &mut ctx);
            puzzle.handle_input(&Key::Enter, &mut ctx);
            assert_eq!(puzzle.message(), "Left locked.");
            assert_eq!(puzzle.selected(), 1, "advances to the next open ring");

            puzzle.handle_input(&Key::Left, &mut ctx);
            puzzle.handle_input(&Key::Up, &mut ctx);
            puzzle.handle_input(&Key::Right, &mut ctx);
            assert_eq!(puzzle.message(), "That ring is already locked.");
            assert_eq!(puzzle.dials(), &[2, 9]);

            puzzle.handle_input(&Key::Down, &mut ctx);
            puzzle.handle_input(&Key::Enter, &mut ctx);
            assert!(puzzle.is_solved());
            assert!(ctx.flag("safe_open"));
            assert!(ctx.pending_commands().is_empty(), "waits for the flash");
            puzzle.update(SOLVED_FLASH_MS / 2.0, &mut ctx);
            assert!(ctx.pending_commands().is_empty());
            puzzle.update(SOLVED_FLASH_MS, &mut ctx);
        }
        assert_eq!(world.take_commands(), vec![Command::HideOverlay]);
        assert_eq!(
            world.take_events(),
            vec![GameEvent::PuzzleCompleted {
                puzzle: "safe".to_string()
            }]
        );
    }

    #[test]
    fn unpowered_rings_only_accept_escape() {
        let mut world = World::new(Box::new(MemoryFlagStore::new()));
        let mut puzzle = RingPuzzleOverlay::new(pair()).unwrap();
        {
            let mut ctx = world.context(true);
            puzzle.init(&mut ctx);
            assert_eq!(puzzle.message(), "The monitor is dark...");
            puzzle.handle_input(&Key::Right, &mut ctx);
            assert_eq!(puzzle.dials(), &[1, 1]);
            puzzle.handle_input(&Key::Escape, &mut ctx);
        }
        assert_eq!(world.take_commands(), vec![Command::HideOverlay]);
    }

    #[test]
    fn solved_puzzle_reopens_aligned() {
        let mut world = World::new(Box::new(MemoryFlagStore::with_flags([
            ("power_on", "true"),
            ("safe_open", "true"),
        ])));
        let mut puzzle = RingPuzzleOverlay::new(pair()).unwrap();
        puzzle.init(&mut world.context(true));
        assert_eq!(puzzle.dials(), &[2, 9]);
        assert_eq!(puzzle.message(), "The rings are already aligned.");
    }

    #[test]
    fn unreachable_targets_are_rejected() {
        let mut config = pair();
        config.rings[1].target = 10;
        assert_eq!(
            RingPuzzleOverlay::new(config).unwrap_err(),
            RingError::TargetOutOfRange {
                label: "Right".to_string(),
                target: 10,
                positions: 9
            }
        );
    }
}
