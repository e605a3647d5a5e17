//! Travel map: unlocked places with a description panel.
//!
//! Entries are gated by flags, read again every time the map opens.
//! Confirming a place twice (list, then description) closes the map and
//! travels to its scene.

use crate::context::GameContext;
use crate::flags::FlagStore;
use crate::key::Key;
use crate::overlay::Overlay;
use crate::scene::SceneId;
use crate::surface::{Surface, TextStyle};
use crate::ui::{self, colors};
use serde::{Deserialize, Serialize};

pub const LOCATION: &str = "Location";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub name: String,
    pub description: String,
    pub scene: SceneId,
    /// Shown only once this flag is true. `None` is always listed.
    #[serde(default)]
    pub unlock_flag: Option<String>,
}

impl LocationEntry {
    #[must_use]
    pub fn new(name: &str, description: &str, scene: impl Into<SceneId>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            scene: scene.into(),
            unlock_flag: None,
        }
    }

    #[must_use]
    pub fn unlocked_by(mut self, flag: &str) -> Self {
        self.unlock_flag = Some(flag.to_string());
        self
    }

    fn is_unlocked(&self, flags: &dyn FlagStore) -> bool {
        self.unlock_flag
            .as_deref()
            .is_none_or(|flag| flags.get_bool(flag))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    List,
    Description,
}

#[derive(Debug)]
pub struct LocationOverlay {
    places: Vec<LocationEntry>,
    unlocked: Vec<usize>,
    cursor: usize,
    mode: Mode,
}

impl LocationOverlay {
    #[must_use]
    pub const fn new(places: Vec<LocationEntry>) -> Self {
        Self {
            places,
            unlocked: Vec::new(),
            cursor: 0,
            mode: Mode::List,
        }
    }

    /// Every configured place, locked or not.
    #[must_use]
    pub fn places(&self) -> &[LocationEntry] {
        &self.places
    }

    /// Names of the places listed since the map last opened.
    #[must_use]
    pub fn unlocked(&self) -> Vec<&str> {
        self.unlocked
            .iter()
            .filter_map(|index| self.places.get(*index))
            .map(|place| place.name.as_str())
            .collect()
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn is_describing(&self) -> bool {
        self.mode == Mode::Description
    }

    fn selected(&self) -> Option<&LocationEntry> {
        self.unlocked
            .get(self.cursor)
            .and_then(|index| self.places.get(*index))
    }

    fn travel(&mut self, ctx: &mut GameContext<'_>) {
        let Some(place) = self.selected() else {
            return;
        };
        log::info!("travelling to `{}` from the map", place.scene);
        let scene = place.scene.clone();
        ctx.hide_overlay();
        ctx.navigate(scene);
    }
}

impl Overlay for LocationOverlay {
    fn name(&self) -> &str {
        LOCATION
    }

    fn init(&mut self, ctx: &mut GameContext<'_>) {
        let flags = ctx.flags();
        self.unlocked = self
            .places
            .iter()
            .enumerate()
            .filter(|(_, place)| place.is_unlocked(flags))
            .map(|(index, _)| index)
            .collect();
        self.cursor = 0;
        self.mode = Mode::List;
    }

    fn handle_input(&mut self, key: &Key, ctx: &mut GameContext<'_>) -> bool {
        let len = self.unlocked.len();
        match self.mode {
            Mode::List => {
                if key.is_cancel() {
                    ctx.hide_overlay();
                } else if len > 0 && key.is_up() {
                    self.cursor = (self.cursor + len - 1) % len;
                } else if len > 0 && key.is_down() {
                    self.cursor = (self.cursor + 1) % len;
                } else if len > 0 && key.is_confirm() {
                    self.mode = Mode::Description;
                }
            }
            Mode::Description => {
                if key.is_cancel() {
                    self.mode = Mode::List;
                } else if key.is_confirm() {
                    self.travel(ctx);
                }
            }
        }
        true
    }

    #[allow(clippy::cast_precision_loss)]
    fn render(&mut self, surface: &mut dyn Surface) {
        let panel = ui::overlay_panel(surface);
        ui::draw_box(surface, panel, colors::SOLID, colors::WHITE);
        ui::draw_text_centered(surface, LOCATION, panel.y + 50.0, colors::WHITE, 32.0);

        if self.unlocked.is_empty() {
            ui::draw_text_centered(
                surface,
                "Nowhere else to go yet.",
                panel.y + panel.h / 2.0,
                colors::MUTED,
                22.0,
            );
            return;
        }

        if self.mode == Mode::Description {
            if let Some(place) = self.selected() {
                ui::draw_text_centered(surface, &place.name, panel.y + 110.0, colors::WHITE, 26.0);
                ui::draw_wrapped(
                    surface,
                    &place.description,
                    panel.x + 40.0,
                    panel.y + 160.0,
                    panel.w - 80.0,
                    &TextStyle::new(20.0, colors::MUTED),
                );
            }
            ui::draw_text_centered(
                surface,
                "Enter: travel   Esc: back",
                panel.y + panel.h - 40.0,
                colors::FAINT,
                18.0,
            );
            return;
        }

        for (row, index) in self.unlocked.iter().enumerate() {
            let Some(place) = self.places.get(*index) else {
                continue;
            };
            let selected = row == self.cursor;
            let color = if selected { colors::WHITE } else { colors::MUTED };
            let marker = if selected { "> " } else { "  " };
            surface.fill_text(
                &format!("{marker}{}", place.name),
                panel.x + 40.0,
                panel.y + 110.0 + row as f64 * 34.0,
                &TextStyle::new(22.0, color),
            );
        }
        ui::draw_text_centered(
            surface,
            "Enter: details   Esc: close",
            panel.y + panel.h - 40.0,
            colors::FAINT,
            18.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Command, World};
    use crate::flags::MemoryFlagStore;
    use crate::surface::RecordingSurface;

    fn map() -> LocationOverlay {
        LocationOverlay::new(vec![
            LocationEntry::new("Office", "Your desk, still warm.", "office"),
            LocationEntry::new("Diner", "Open all night.", "diner").unlocked_by("diner_unlocked"),
            LocationEntry::new("Pier", "Fog rolls in.", "pier"),
        ])
    }

    #[test]
    fn locked_places_stay_hidden_until_their_flag_is_set() {
        let mut world = World::new(Box::new(MemoryFlagStore::new()));
        let mut overlay = map();
        overlay.init(&mut world.context(true));
        assert_eq!(overlay.unlocked(), vec!["Office", "Pier"]);

        world.context(true).set_flag("diner_unlocked", true);
        overlay.init(&mut world.context(true));
        assert_eq!(overlay.unlocked(), vec!["Office", "Diner", "Pier"]);
    }

    #[test]
    fn cursor_wraps_over_unlocked_places() {
        let mut world = World::new(Box::new(MemoryFlagStore::new()));
        let mut overlay = map();
        let mut ctx = world.context(true);
        overlay.init(&mut ctx);
        overlay.handle_input(&Key::Up, &mut ctx);
        assert_eq!(overlay.cursor(), 1);
        overlay.handle_input(&Key::Char('s'), &mut ctx);
        assert_eq!(overlay.cursor(), 0);
    }

    #[test]
    fn confirming_twice_travels_and_closes() {
        let mut world = World::new(Box::new(MemoryFlagStore::new()));
        let mut overlay = map();
        {
            let mut ctx = world.context(true);
            overlay.init(&mut ctx);
            overlay.handle_input(&Key::Down, &mut ctx);
            overlay.handle_input(&Key::Enter, &mut ctx);
            assert!(overlay.is_describing());
            assert!(ctx.pending_commands().is_empty());
            overlay.handle_input(&Key::Enter, &mut ctx);
        }
        assert_eq!(
            world.take_commands(),
            vec![
                Command::HideOverlay,
                Command::Navigate {
                    scene: "pier".into()
                }
            ]
        );
    }

    #[test]
    fn escape_backs_out_of_the_description_first() {
        let mut world = World::new(Box::new(MemoryFlagStore::new()));
        let mut overlay = map();
        {
            let mut ctx = world.context(true);
            overlay.init(&mut ctx);
            overlay.handle_input(&Key::Enter, &mut ctx);
            overlay.handle_input(&Key::Escape, &mut ctx);
            assert!(!overlay.is_describing());
            assert!(ctx.pending_commands().is_empty());
            overlay.handle_input(&Key::Escape, &mut ctx);
        }
        assert_eq!(world.take_commands(), vec![Command::HideOverlay]);
    }

    #[test]
    fn empty_map_says_so() {
        let mut world = World::new(Box::new(MemoryFlagStore::new()));
        let mut overlay = LocationOverlay::new(vec![
            LocationEntry::new("Vault", "Sealed.", "vault").unlocked_by("vault_open"),
        ]);
        overlay.init(&mut world.context(true));
        assert!(overlay.handle_input(&Key::Enter, &mut world.context(true)));
        assert!(!overlay.is_describing());
        let mut surface = RecordingSurface::default();
        overlay.render(&mut surface);
        assert!(surface.contains_text("Nowhere else to go yet."));
    }
}
