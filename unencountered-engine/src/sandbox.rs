//! A small playable world wired from every engine part.
//!
//! Title card -> lobby (interactive) -> street (hub) -> sewer maze -> ending.
//! The lobby switchboard is an optional ring puzzle that unlocks a phone message.
//! The browser build boots into it, and the tester and integration tests
//! script against it.

use crate::config::EngineConfig;
use crate::context::GameContext;
use crate::descriptor::ObjectDescriptor;
use crate::dialogue::QueuedDialogue;
use crate::director::Director;
use crate::events::GameEvent;
use crate::flags::{FlagStore, inventory_key};
use crate::interaction::Interaction;
use crate::key::Key;
use crate::overlay::Overlay;
use crate::overlays::{
    InventoryOverlay, ItemEntry, LocationEntry, LocationOverlay, MazeConfig, MazeOverlay,
    NotebookOverlay, PhoneMessage, PhoneOverlay, PhonePage, RingPuzzleConfig,
    RingPuzzleOverlay, SEWER_MAZE, SWITCHBOARD,
};
use crate::registry::SceneRegistry;
use crate::scene::{InteractiveScene, RenderContext, Room, Scene, SceneKind};
use crate::surface::{Surface, TextStyle};
use crate::ui::{self, colors};
use crate::verb::Verb;

pub mod ids {
    pub const TITLE: &str = "title";
    pub const LOBBY: &str = "lobby";
    pub const STREET: &str = "street";
    pub const ENDING: &str = "ending";
}

pub mod progress {
    pub const LOBBY_VISITED: &str = "lobby_visited";
    pub const DOOR_UNLOCKED: &str = "lobby_door_unlocked";
    pub const MET_RECEPTIONIST: &str = "met_receptionist";
    pub const MAZE_SOLVED: &str = "finalMazeSolved";
    pub const SWITCHBOARD_ALIGNED: &str = "switchboardAligned";
}

pub const RUSTY_KEY: &str = "Rusty Key";

/// Milliseconds the title card waits before moving on by itself.
pub const TITLE_HOLD_MS: f64 = 6000.0;

#[must_use]
pub fn registry() -> SceneRegistry {
    SceneRegistry::new()
        .with(ids::TITLE, Card::title)
        .with(ids::LOBBY, || InteractiveScene::new(Lobby))
        .with(ids::STREET, Street::default)
        .with(ids::ENDING, Card::ending)
}

#[must_use]
pub fn item_catalog() -> Vec<ItemEntry> {
    vec![ItemEntry::new(
        RUSTY_KEY,
        "Stamped 'LOBBY'. The teeth are worn smooth.",
    )]
}

/// Places on the travel map. The street opens with the staff door.
#[must_use]
pub fn places() -> Vec<LocationEntry> {
    vec![
        LocationEntry::new(
            "Lobby",
            "Carpet glue, a plastic fern and a receptionist who never leaves.",
            ids::LOBBY,
        ),
        LocationEntry::new(
            "Street",
            "Empty in both directions. A manhole cover sits slightly ajar.",
            ids::STREET,
        )
        .unlocked_by(progress::DOOR_UNLOCKED),
    ]
}

/// Phone inbox per narrative phase.
#[must_use]
pub fn phone_pages() -> Vec<PhonePage> {
    vec![
        PhonePage {
            phase: "phase1".to_string(),
            status: "No signal.".to_string(),
            messages: vec![PhoneMessage::new(
                "Unknown",
                "Check the street.",
                "Whatever you are looking for left through the lobby.",
            )],
        },
        PhonePage {
            phase: "phase2".to_string(),
            status: "One bar.".to_string(),
            messages: vec![
                PhoneMessage::new(
                    "Front desk",
                    "Switchboard",
                    "Four rings. The code is on the monitor if you can get it powered.",
                ),
                PhoneMessage::new(
                    "Operator",
                    "Connected",
                    "Line open. Nobody has called this building in years.",
                )
                .unlocked_by(progress::SWITCHBOARD_ALIGNED),
            ],
        },
    ]
}

/// Every overlay the key bar can reach, plus the two puzzles.
///
/// # Errors
///
/// Returns an error if a puzzle layout is invalid.
pub fn overlays() -> anyhow::Result<Vec<Box<dyn Overlay>>> {
    Ok(vec![
        Box::new(PhoneOverlay::new(phone_pages())),
        Box::new(NotebookOverlay::new()),
        Box::new(LocationOverlay::new(places())),
        Box::new(InventoryOverlay::new(item_catalog())),
        Box::new(MazeOverlay::new(MazeConfig::sewer())?),
        Box::new(RingPuzzleOverlay::new(RingPuzzleConfig::switchboard(
            progress::MET_RECEPTIONIST,
        ))?),
    ])
}

/// A director with the sandbox registered and the title card showing.
///
/// # Errors
///
/// Returns an error if the overlays cannot be built or the title scene is missing.
pub fn director(flags: Box<dyn FlagStore>, config: EngineConfig) -> anyhow::Result<Director> {
    let mut director = Director::new(flags, registry(), config);
    for overlay in overlays()? {
        director.add_overlay(overlay);
    }
    director.goto(ids::TITLE)?;
    Ok(director)
}

/// Full-screen text card. Title and ending screens.
pub struct Card {
    heading: &'static str,
    prompt: &'static str,
    next: &'static str,
    hold_ms: Option<f64>,
}

impl Card {
    #[must_use]
    pub const fn title() -> Self {
        Self {
            heading: "UNENCOUNTERED",
            prompt: "Press Enter",
            next: ids::LOBBY,
            hold_ms: Some(TITLE_HOLD_MS),
        }
    }

    #[must_use]
    pub const fn ending() -> Self {
        Self {
            heading: "There is no turning back now.",
            prompt: "Press Enter to return to the title",
            next: ids::TITLE,
            hold_ms: None,
        }
    }
}

impl Scene for Card {
    fn kind(&self) -> SceneKind {
        SceneKind::Cinematic
    }

    fn init(&mut self, ctx: &mut GameContext<'_>) {
        if let Some(hold) = self.hold_ms {
            ctx.navigate_after(self.next, hold);
        }
    }

    fn render(&mut self, surface: &mut dyn Surface, _frame: &RenderContext<'_>) {
        let (width, height) = surface.size();
        surface.fill_rect(surface.bounds(), colors::FOG);
        ui::draw_text_centered(surface, self.heading, height * 0.4, colors::WHITE, 48.0);
        surface.fill_text(
            self.prompt,
            width / 2.0,
            height * 0.6,
            &TextStyle::new(20.0, colors::MUTED).centered(),
        );
    }

    fn handle_input(&mut self, key: &Key, ctx: &mut GameContext<'_>) -> bool {
        if key.is_confirm() {
            ctx.navigate(self.next);
            return true;
        }
        false
    }
}

/// The interactive lobby.
pub struct Lobby;

impl Lobby {
    fn receptionist() -> ObjectDescriptor {
        ObjectDescriptor::new("Receptionist")
            .describe("She is filing the same folder over and over.")
            .on(Verb::Speak, |ctx| {
                if ctx.flag(progress::MET_RECEPTIONIST) {
                    return Some("\"Still here? The manager is not coming back.\"".to_string());
                }
                ctx.queue_then(
                    [
                        "\"Welcome. Nobody comes here anymore.\"",
                        "\"The manager left early. Years ago, I think.\"",
                        "\"He said to check the street if anyone asked.\"",
                    ],
                    Box::new(|ctx: &mut GameContext<'_>| {
                        ctx.set_flag(progress::MET_RECEPTIONIST, true);
                        ctx.publish(GameEvent::NoteAdded {
                            title: "The manager".to_string(),
                            text: "Left early, years ago. Try the street.".to_string(),
                        });
                        ctx.notify_message();
                        ctx.arm_phase("phase2");
                    }),
                );
                None
            })
    }

    fn key() -> ObjectDescriptor {
        ObjectDescriptor::new(RUSTY_KEY)
            .describe("A rusty key half-buried in the planter.")
            .with_index(inventory_key(RUSTY_KEY))
            .on(Verb::Take, |ctx| {
                ctx.publish(GameEvent::ItemAcquired {
                    item: RUSTY_KEY.to_string(),
                });
                ctx.set_flag(&inventory_key(RUSTY_KEY), true);
                Some("You pocket the rusty key.".to_string())
            })
    }

    fn switchboard() -> ObjectDescriptor {
        ObjectDescriptor::new(SWITCHBOARD)
            .describe("Four brass rings around a small monitor.")
            .on(Verb::Use, |ctx| {
                ctx.show_overlay(SWITCHBOARD);
                None
            })
    }

    fn door() -> ObjectDescriptor {
        ObjectDescriptor::new("Door")
            .describe_with(|| "A steel door marked STAFF.".to_string())
            .on(Verb::Use, |ctx| {
                if ctx.flag(progress::DOOR_UNLOCKED) {
                    return Some("It's already open.".to_string());
                }
                if !ctx.flag(&inventory_key(RUSTY_KEY)) {
                    return Some("It's locked tight.".to_string());
                }
                ctx.set_flag(progress::DOOR_UNLOCKED, true);
                Some("The lock gives with a dry click.".to_string())
            })
    }
}

impl Room for Lobby {
    fn objects(&self, flags: &dyn FlagStore) -> Vec<ObjectDescriptor> {
        let mut objects = vec![
            ObjectDescriptor::new("Plant").describe("A plastic fern, dusted weekly."),
            Self::receptionist(),
        ];
        if !flags.get_bool(&inventory_key(RUSTY_KEY)) {
            objects.push(Self::key());
        }
        objects.push(Self::door());
        objects.push(Self::switchboard());
        objects
    }

    fn can_move(&self) -> bool {
        true
    }

    fn destinations(&self, flags: &dyn FlagStore) -> Vec<ObjectDescriptor> {
        let mut destinations = vec![ObjectDescriptor::destination("Title screen", ids::TITLE)];
        if flags.get_bool(progress::DOOR_UNLOCKED) {
            destinations.push(ObjectDescriptor::destination("Street", ids::STREET));
        }
        destinations
    }

    fn enter(
        &mut self,
        _engine: &mut Interaction,
        ctx: &mut GameContext<'_>,
    ) -> Option<QueuedDialogue> {
        if ctx.flag(progress::LOBBY_VISITED) {
            return None;
        }
        ctx.set_flag(progress::LOBBY_VISITED, true);
        Some(QueuedDialogue::new([
            "The lobby smells of carpet glue.",
            "Someone has been expecting you.",
        ]))
    }

    fn render_backdrop(&mut self, surface: &mut dyn Surface, _frame: &RenderContext<'_>) {
        surface.fill_rect(surface.bounds(), "#1d1a24");
        ui::draw_text_centered(surface, "Lobby", 48.0, colors::MUTED, 28.0);
    }
}

const STREET_OPTIONS: [&str; 2] = ["Back inside", "Climb down the manhole"];

/// Menu-driven hub outside the lobby.
#[derive(Debug, Default)]
pub struct Street {
    selected: usize,
}

impl Scene for Street {
    fn kind(&self) -> SceneKind {
        SceneKind::Hub
    }

    fn update(&mut self, _dt_ms: f64, ctx: &mut GameContext<'_>) {
        if ctx.flag(progress::MAZE_SOLVED) && !ctx.overlay_active() {
            ctx.navigate(ids::ENDING);
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn render(&mut self, surface: &mut dyn Surface, _frame: &RenderContext<'_>) {
        surface.fill_rect(surface.bounds(), "#10141c");
        ui::draw_text_centered(surface, "Street", 48.0, colors::MUTED, 28.0);
        let (width, height) = surface.size();
        for (index, option) in STREET_OPTIONS.iter().enumerate() {
            let color = if index == self.selected {
                colors::WHITE
            } else {
                colors::MUTED
            };
            surface.fill_text(
                option,
                width / 2.0,
                height * 0.4 + index as f64 * 40.0,
                &TextStyle::new(24.0, color).centered(),
            );
        }
    }

    fn handle_input(&mut self, key: &Key, ctx: &mut GameContext<'_>) -> bool {
        if key.is_up() || key.is_down() {
            self.selected = (self.selected + 1) % STREET_OPTIONS.len();
            return true;
        }
        if !key.is_confirm() {
            return false;
        }
        match self.selected {
            0 => ctx.navigate(ids::LOBBY),
            _ => ctx.show_overlay(SEWER_MAZE),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::MemoryFlagStore;

    #[test]
    fn every_lobby_destination_is_registered() {
        let flags = MemoryFlagStore::with_flags([(progress::DOOR_UNLOCKED, "true")]);
        let destinations = Lobby.destinations(&flags);
        assert_eq!(destinations.len(), 2);
        assert!(registry().unknown_targets(&destinations).is_empty());
    }

    #[test]
    fn key_leaves_the_room_once_held() {
        let held = MemoryFlagStore::with_flags([(inventory_key(RUSTY_KEY), "true".to_string())]);
        let names: Vec<_> = Lobby
            .objects(&held)
            .into_iter()
            .map(|object| object.name)
            .collect();
        assert_eq!(names, vec!["Plant", "Receptionist", "Door", SWITCHBOARD]);
    }

    #[test]
    fn overlays_cover_every_default_hotkey() {
        let overlays = overlays().expect("overlays build");
        let names: Vec<_> = overlays
            .iter()
            .map(|overlay| overlay.name().to_string())
            .collect();
        for hotkey in EngineConfig::default_config().hotkeys {
            assert!(names.contains(&hotkey.overlay), "missing {}", hotkey.overlay);
        }
    }

    #[test]
    fn every_map_place_is_registered() {
        let places: Vec<_> = places()
            .into_iter()
            .map(|place| ObjectDescriptor::destination(place.name, place.scene))
            .collect();
        assert!(registry().unknown_targets(&places).is_empty());
    }

    #[test]
    fn phone_has_a_page_for_every_armed_phase() {
        let pages = phone_pages();
        let default_phases = EngineConfig::default_config().phases;
        for page in &pages {
            assert!(default_phases.contains(&page.phase), "{}", page.phase);
        }
        assert!(pages.iter().any(|page| page.phase == "phase2"));
    }

    #[test]
    fn switchboard_flag_matches_its_puzzle() {
        assert_eq!(
            RingPuzzleConfig::switchboard(progress::MET_RECEPTIONIST).completion_flag,
            progress::SWITCHBOARD_ALIGNED
        );
    }
}
