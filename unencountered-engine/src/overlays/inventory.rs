use crate::context::GameContext;
use crate::events::GameEvent;
use crate::flags::{FlagStore, inventory_key};
use crate::key::Key;
use crate::overlay::Overlay;
use crate::surface::{Surface, TextStyle};
use crate::ui::{self, colors};
use serde::{Deserialize, Serialize};

pub const INVENTORY: &str = "Inventory";

const ITEM_VERBS: [&str; 2] = ["Examine", "Use"];

/// An item the player can hold. Holding is recorded by [`inventory_key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEntry {
    pub name: String,
    pub description: String,
}

impl ItemEntry {
    #[must_use]
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    List,
    Verbs,
    Examine,
}

/// Held items, with Examine and Use on each.
#[derive(Debug)]
pub struct InventoryOverlay {
    catalog: Vec<ItemEntry>,
    items: Vec<ItemEntry>,
    mode: Mode,
    selected: usize,
    verb: usize,
}

impl InventoryOverlay {
    /// `catalog` lists every item the game knows, in display order.
    #[must_use]
    pub const fn new(catalog: Vec<ItemEntry>) -> Self {
        Self {
            catalog,
            items: Vec::new(),
            mode: Mode::List,
            selected: 0,
            verb: 0,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[ItemEntry] {
        &self.items
    }

    fn reload(&mut self, flags: &dyn FlagStore) {
        self.items = self
            .catalog
            .iter()
            .filter(|item| flags.get_bool(&inventory_key(&item.name)))
            .cloned()
            .collect();
        // Uncatalogued items only live until the next reload.
    }

    fn acquire(&mut self, item: &str, ctx: &mut GameContext<'_>) {
        ctx.set_flag(&inventory_key(item), true);
        if self.items.iter().any(|held| held.name == item) {
            return;
        }
        let entry = self
            .catalog
            .iter()
            .find(|known| known.name == item)
            .cloned()
            .unwrap_or_else(|| {
                ItemEntry::new(item, &format!("An unremarkable {}.", item.to_lowercase()))
            });
        log::debug!("inventory gained `{item}`");
        self.items.push(entry);
    }

    fn current(&self) -> Option<&ItemEntry> {
        self.items.get(self.selected)
    }
}

fn step(index: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        0
    } else if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    }
}

impl Overlay for InventoryOverlay {
    fn name(&self) -> &str {
        INVENTORY
    }

    fn init(&mut self, ctx: &mut GameContext<'_>) {
        self.reload(ctx.flags());
        self.mode = Mode::List;
        self.selected = 0;
        self.verb = 0;
    }

    fn handle_input(&mut self, key: &Key, ctx: &mut GameContext<'_>) -> bool {
        match self.mode {
            Mode::List => {
                if key.is_cancel() {
                    ctx.hide_overlay();
                } else if key.is_up() || key.is_down() {
                    self.selected = step(self.selected, self.items.len(), key.is_down());
                } else if key.is_confirm() && !self.items.is_empty() {
                    self.mode = Mode::Verbs;
                    self.verb = 0;
                }
            }
            Mode::Verbs => {
                if key.is_cancel() {
                    self.mode = Mode::List;
                } else if key.is_up() || key.is_down() {
                    self.verb = step(self.verb, ITEM_VERBS.len(), key.is_down());
                } else if key.is_confirm() {
                    if self.verb == 0 {
                        self.mode = Mode::Examine;
                    } else if let Some(item) = self.current().map(|item| item.name.clone()) {
                        ctx.publish(GameEvent::ItemUsed { item });
                        ctx.hide_overlay();
                    }
                }
            }
            Mode::Examine => {
                if key.is_confirm() || key.is_cancel() {
                    self.mode = Mode::List;
                }
            }
        }
        true
    }

    fn on_event(&mut self, event: &GameEvent, ctx: &mut GameContext<'_>) {
        if let GameEvent::ItemAcquired { item } = event {
            self.acquire(item, ctx);
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn render(&mut self, surface: &mut dyn Surface) {
        let panel = ui::overlay_panel(surface);
        ui::draw_box(surface, panel, colors::SOLID, colors::WHITE);
        ui::draw_text_centered(surface, INVENTORY, panel.y + 50.0, colors::WHITE, 32.0);

        let left = panel.x + 40.0;
        if self.items.is_empty() {
            ui::draw_text_centered(
                surface,
                "Your pockets are empty.",
                panel.y + panel.h / 2.0,
                colors::MUTED,
                22.0,
            );
            return;
        }
        for (index, item) in self.items.iter().enumerate() {
            let selected = index == self.selected;
            let color = if selected { colors::WHITE } else { colors::MUTED };
            let marker = if selected { "> " } else { "  " };
            surface.fill_text(
                &format!("{marker}{}", item.name),
                left,
                panel.y + 110.0 + index as f64 * 34.0,
                &TextStyle::new(22.0, color),
            );
        }

        let detail_x = panel.x + panel.w * 0.5;
        match self.mode {
            Mode::List => {}
            Mode::Verbs => {
                for (index, verb) in ITEM_VERBS.iter().enumerate() {
                    let color = if index == self.verb {
                        colors::WHITE
                    } else {
                        colors::MUTED
                    };
                    surface.fill_text(
                        verb,
                        detail_x,
                        panel.y + 110.0 + index as f64 * 34.0,
                        &TextStyle::new(22.0, color),
                    );
                }
            }
            Mode::Examine => {
                if let Some(item) = self.current() {
                    ui::draw_wrapped(
                        surface,
                        &item.description,
                        detail_x,
                        panel.y + 110.0,
                        panel.w * 0.45,
                        &TextStyle::new(20.0, colors::WHITE),
                    );
                }
            }
        }
        ui::draw_text_centered(
            surface,
            "[Enter] choose  [Esc] back",
            panel.y + panel.h - 30.0,
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

    fn catalog() -> Vec<ItemEntry> {
        vec![
            ItemEntry::new("Rusty Key", "Teeth worn smooth."),
            ItemEntry::new("Napkin", "A phone number in blue ink."),
        ]
    }

    #[test]
    fn init_loads_held_items_in_catalog_order() {
        let mut world = World::new(Box::new(MemoryFlagStore::with_flags([
            ("inventory_napkin", "true"),
            ("inventory_rustykey", "true"),
        ])));
        let mut inventory = InventoryOverlay::new(catalog());
        inventory.init(&mut world.context(true));
        let names: Vec<_> = inventory.items().iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["Rusty Key", "Napkin"]);
    }

    #[test]
    fn acquisition_sets_flag_once() {
        let mut world = World::new(Box::new(MemoryFlagStore::new()));
        let mut inventory = InventoryOverlay::new(catalog());
        let event = GameEvent::ItemAcquired {
            item: "Napkin".to_string(),
        };
        let mut ctx = world.context(false);
        inventory.on_event(&event, &mut ctx);
        inventory.on_event(&event, &mut ctx);
        assert_eq!(inventory.items().len(), 1);
        assert!(ctx.flag("inventory_napkin"));
    }

    #[test]
    fn use_publishes_and_closes() {
        let mut world = World::new(Box::new(MemoryFlagStore::with_flags([(
            "inventory_rustykey",
            "true",
        )])));
        let mut inventory = InventoryOverlay::new(catalog());
        let mut ctx = world.context(true);
        inventory.init(&mut ctx);
        for key in [Key::Enter, Key::Down, Key::Enter] {
            assert!(inventory.handle_input(&key, &mut ctx));
        }
        assert_eq!(world.take_commands(), vec![Command::HideOverlay]);
        assert_eq!(
            world.take_events(),
            vec![GameEvent::ItemUsed {
                item: "Rusty Key".to_string()
            }]
        );
    }
}
