//! Scene lifecycle and the reusable interactive-room scaffold.

use crate::context::GameContext;
use crate::descriptor::ObjectDescriptor;
use crate::dialogue::{Completion, DialogueQueue, QueuedDialogue};
use crate::flags::FlagStore;
use crate::interaction::{Interaction, InteractionSnapshot, ObjectSet, TravelMenu};
use crate::key::Key;
use crate::surface::Surface;
use crate::verb::Verb;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Registry name of a scene, e.g. `"office"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(String);

impl SceneId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SceneId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SceneId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&SceneId> for SceneId {
    fn from(value: &SceneId) -> Self {
        value.clone()
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    /// Verb/object gameplay.
    Interactive,
    /// Menu-style gameplay scenes without the verb bar.
    Hub,
    /// Title cards, cutscenes, endings. Receive raw input, no hotkeys.
    Cinematic,
}

/// Read-only view handed to scenes while drawing.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub flags: &'a dyn FlagStore,
    pub overlay_active: bool,
}

/// A full-screen game state driven by the director.
pub trait Scene {
    fn kind(&self) -> SceneKind;

    /// Gameplay scenes share the keyboard with the overlay hotkeys.
    fn is_gameplay(&self) -> bool {
        !matches!(self.kind(), SceneKind::Cinematic)
    }

    fn shows_key_bar(&self) -> bool {
        self.is_gameplay()
    }

    fn can_move(&self) -> bool {
        false
    }

    fn init(&mut self, _ctx: &mut GameContext<'_>) {}

    fn update(&mut self, _dt_ms: f64, _ctx: &mut GameContext<'_>) {}

    fn render(&mut self, surface: &mut dyn Surface, frame: &RenderContext<'_>);

    /// Returns whether the key was consumed.
    fn handle_input(&mut self, key: &Key, ctx: &mut GameContext<'_>) -> bool;

    fn destroy(&mut self, _ctx: &mut GameContext<'_>) {}

    /// Interaction engine state, for scenes that have one.
    fn interaction(&self) -> Option<InteractionSnapshot> {
        None
    }
}

/// Content of an interactive room: its objects and any room-specific behavior.
///
/// Objects are rebuilt from flags on every frame and key press, so a handler
/// that flips a flag changes what the room offers immediately.
pub trait Room {
    fn objects(&self, flags: &dyn FlagStore) -> Vec<ObjectDescriptor>;

    /// Travel targets for the Move verb. Only used when [`Room::can_move`] is true.
    fn destinations(&self, _flags: &dyn FlagStore) -> Vec<ObjectDescriptor> {
        Vec::new()
    }

    fn can_move(&self) -> bool {
        false
    }

    /// Called once when the scene starts. Returned lines play before anything else.
    fn enter(
        &mut self,
        _engine: &mut Interaction,
        _ctx: &mut GameContext<'_>,
    ) -> Option<QueuedDialogue> {
        None
    }

    fn update(&mut self, _dt_ms: f64, _ctx: &mut GameContext<'_>) {}

    fn render_backdrop(&mut self, _surface: &mut dyn Surface, _frame: &RenderContext<'_>) {}

    /// Keys the engine did not consume.
    fn on_unhandled(&mut self, _key: &Key, _ctx: &mut GameContext<'_>) -> bool {
        false
    }

    fn leave(&mut self, _ctx: &mut GameContext<'_>) {}
}

/// Interactive scene built from a [`Room`].
///
/// Queued dialogue is played here rather than inside the engine: the scene
/// intercepts Enter and Escape while one of its lines is on screen.
pub struct InteractiveScene<R> {
    room: R,
    engine: Interaction,
    dialogue: DialogueQueue,
}

impl<R: Room> InteractiveScene<R> {
    pub fn new(room: R) -> Self {
        let can_move = room.can_move();
        let mut engine = Interaction::interactive().with_can_move(can_move);
        if can_move {
            engine.set_strategy(Verb::Move, Rc::new(TravelMenu));
        }
        Self {
            room,
            engine,
            dialogue: DialogueQueue::new(),
        }
    }

    pub const fn room(&self) -> &R {
        &self.room
    }

    pub const fn room_mut(&mut self) -> &mut R {
        &mut self.room
    }

    pub const fn engine(&self) -> &Interaction {
        &self.engine
    }

    pub const fn engine_mut(&mut self) -> &mut Interaction {
        &mut self.engine
    }

    /// The object set as the engine currently sees it.
    pub fn objects(&self, flags: &dyn FlagStore) -> ObjectSet {
        let set = ObjectSet::new(self.room.objects(flags));
        if self.room.can_move() {
            set.with_destinations(self.room.destinations(flags))
        } else {
            set
        }
    }

    /// Play a cutscene-style run of lines from outside a verb handler.
    pub fn queue_dialogue<I, S>(
        &mut self,
        lines: I,
        then: Option<Completion>,
        ctx: &mut GameContext<'_>,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queued = QueuedDialogue::new(lines);
        let queued = match then {
            Some(then) => queued.then(then),
            None => queued,
        };
        self.dialogue.play(queued, &mut self.engine, ctx);
    }

    /// Lines still waiting behind the one on screen.
    #[must_use]
    pub fn queued_lines(&self) -> usize {
        if self.dialogue.is_active() {
            self.dialogue.remaining()
        } else {
            0
        }
    }
}

impl<R: Room> Scene for InteractiveScene<R> {
    fn kind(&self) -> SceneKind {
        SceneKind::Interactive
    }

    fn can_move(&self) -> bool {
        self.room.can_move()
    }

    fn init(&mut self, ctx: &mut GameContext<'_>) {
        if let Some(intro) = self.room.enter(&mut self.engine, ctx) {
            self.dialogue.play(intro, &mut self.engine, ctx);
        }
    }

    fn update(&mut self, dt_ms: f64, ctx: &mut GameContext<'_>) {
        self.room.update(dt_ms, ctx);
    }

    fn render(&mut self, surface: &mut dyn Surface, frame: &RenderContext<'_>) {
        self.room.render_backdrop(surface, frame);
        let set = self.objects(frame.flags);
        self.engine.render(surface, &set, frame.overlay_active);
        self.dialogue.sync(&self.engine);
    }

    fn handle_input(&mut self, key: &Key, ctx: &mut GameContext<'_>) -> bool {
        if !ctx.overlay_active() && self.dialogue.intercept(key, &mut self.engine, ctx) {
            return true;
        }
        let set = self.objects(ctx.flags());
        let handled = self.engine.handle_input(key, &set, ctx);
        if let Some(queued) = self.engine.take_queued_dialogue() {
            self.dialogue.play(queued, &mut self.engine, ctx);
        }
        handled || self.room.on_unhandled(key, ctx)
    }

    fn destroy(&mut self, ctx: &mut GameContext<'_>) {
        self.room.leave(ctx);
    }

    fn interaction(&self) -> Option<InteractionSnapshot> {
        let mut snapshot = self.engine.snapshot();
        snapshot.queued_lines = self.queued_lines();
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::World;
    use crate::flags::{MemoryFlagStore, inventory_key};
    use crate::interaction::EngineState;

    struct Closet;

    impl Room for Closet {
        fn objects(&self, flags: &dyn FlagStore) -> Vec<ObjectDescriptor> {
            let mut objects = vec![ObjectDescriptor::new("Coat")];
            if !flags.get_bool(&inventory_key("Umbrella")) {
                objects.push(ObjectDescriptor::new("Umbrella").on(Verb::Take, |ctx| {
                    ctx.set_flag(&inventory_key("Umbrella"), true);
                    Some("You take the umbrella.".to_string())
                }));
            }
            objects
        }
    }

    #[test]
    fn taking_an_item_removes_it_from_the_room() {
        let mut world = World::new(Box::new(MemoryFlagStore::new()));
        let mut scene = InteractiveScene::new(Closet);
        assert!(scene.objects(world.flags()).contains("Umbrella"));
        scene.engine_mut().enable_explore();
        scene.engine_mut().select_verb(Verb::Take);
        for key in [Key::Enter, Key::Down, Key::Enter] {
            let mut ctx = world.context(false);
            assert!(scene.handle_input(&key, &mut ctx));
        }
        assert_eq!(
            scene.engine().dialogue_line(),
            Some("You take the umbrella.")
        );
        assert!(!scene.objects(world.flags()).contains("Umbrella"));
        assert_eq!(scene.objects(world.flags()).names(), vec!["Coat"]);
    }

    #[test]
    fn scene_reports_engine_snapshot() {
        let mut scene = InteractiveScene::new(Closet);
        scene.engine_mut().enable_explore();
        let snapshot = scene.interaction().unwrap();
        assert_eq!(snapshot.state, EngineState::Explore);
        assert!(!snapshot.can_move);
        assert!(scene.is_gameplay());
        assert!(scene.shows_key_bar());
    }

    struct Booth;

    impl Room for Booth {
        fn objects(&self, _flags: &dyn FlagStore) -> Vec<ObjectDescriptor> {
            vec![ObjectDescriptor::new("Operator").on(Verb::Speak, |ctx| {
                ctx.queue_then(
                    ["Number, please.", "Connecting you now."],
                    Box::new(|ctx: &mut GameContext<'_>| ctx.set_flag("connected", true)),
                );
                None
            })]
        }

        fn enter(
            &mut self,
            _engine: &mut Interaction,
            _ctx: &mut GameContext<'_>,
        ) -> Option<QueuedDialogue> {
            Some(QueuedDialogue::new(["The booth smells of pennies."]))
        }
    }

    #[test]
    fn scene_plays_intro_and_queued_replies() {
        let mut world = World::new(Box::new(MemoryFlagStore::new()));
        let mut scene = InteractiveScene::new(Booth);
        scene.init(&mut world.context(false));
        assert_eq!(
            scene.engine().dialogue_line(),
            Some("The booth smells of pennies.")
        );
        assert!(scene.handle_input(&Key::Enter, &mut world.context(false)));
        assert_eq!(scene.engine().state(), EngineState::Explore);

        scene.engine_mut().select_verb(Verb::Speak);
        for key in [Key::Enter, Key::Enter] {
            assert!(scene.handle_input(&key, &mut world.context(false)));
        }
        assert_eq!(scene.engine().dialogue_line(), Some("Number, please."));
        assert_eq!(scene.interaction().unwrap().queued_lines, 1);
        assert!(scene.handle_input(&Key::Enter, &mut world.context(false)));
        assert_eq!(scene.engine().dialogue_line(), Some("Connecting you now."));
        assert!(!world.flags().get_bool("connected"));
        assert!(scene.handle_input(&Key::Enter, &mut world.context(false)));
        assert!(world.flags().get_bool("connected"));
        assert_eq!(scene.engine().state(), EngineState::Explore);
    }
}
