//! The verb/object interaction state machine.
//!
//! Flow: `Explore` (pick a verb) -> `SelectObject` (pick a target) ->
//! `Dialogue` (read the response) -> back to `Explore`. Scenes that must stay
//! interactive never leave the player stuck in `Idle`: both [`Interaction::render`]
//! and [`Interaction::handle_input`] re-enter `Explore` when they find the
//! engine idle with no overlay open.

mod render;
mod strategy;

pub use strategy::{GenericResolution, Menu, ObjectSet, TravelMenu, VerbStrategy};

use crate::context::{ActionContext, EngineRequest, GameContext};
use crate::descriptor::ObjectDescriptor;
use crate::dialogue::QueuedDialogue;
use crate::key::Key;
use crate::surface::Surface;
use crate::verb::{self, VERBS, Verb, VisibleVerbs};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    #[default]
    Idle,
    Explore,
    SelectObject,
    Dialogue,
    /// Deliberately inert. Never auto-recovers; leave with [`Interaction::resume`].
    Suppressed,
}

/// Whether an idle engine may stay idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryMode {
    /// Idle is transient: the engine re-enters explore on the next frame.
    #[default]
    Interactive,
    /// Cutscenes and title cards: idle is allowed to persist.
    Cinematic,
}

/// Serializable view of the engine, used by test harnesses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionSnapshot {
    pub state: EngineState,
    pub verb: Verb,
    pub object_index: i64,
    pub dialogue_line: Option<String>,
    /// Lines waiting behind the current one. Filled in by the owning scene.
    pub queued_lines: usize,
    pub presenting: bool,
    pub can_move: bool,
}

pub struct Interaction {
    state: EngineState,
    mode: RecoveryMode,
    can_move: bool,
    verb_index: usize,
    object_index: i64,
    dialogue_line: Option<String>,
    /// Queued dialogue a handler asked for, waiting for the owning scene to play it.
    handoff: Option<QueuedDialogue>,
    strategies: BTreeMap<Verb, Rc<dyn VerbStrategy>>,
    presented: Option<Rc<dyn VerbStrategy>>,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new(RecoveryMode::Interactive)
    }
}

impl Interaction {
    #[must_use]
    pub fn new(mode: RecoveryMode) -> Self {
        Self {
            state: EngineState::Idle,
            mode,
            can_move: false,
            verb_index: 0,
            object_index: 0,
            dialogue_line: None,
            handoff: None,
            strategies: BTreeMap::new(),
            presented: None,
        }
    }

    #[must_use]
    pub fn interactive() -> Self {
        Self::new(RecoveryMode::Interactive)
    }

    #[must_use]
    pub fn cinematic() -> Self {
        Self::new(RecoveryMode::Cinematic)
    }

    #[must_use]
    pub fn with_can_move(mut self, can_move: bool) -> Self {
        self.set_can_move(can_move);
        self
    }

    /// Install a strategy that owns `verb` for as long as it stays installed.
    #[must_use]
    pub fn with_strategy(mut self, verb: Verb, strategy: Rc<dyn VerbStrategy>) -> Self {
        self.set_strategy(verb, strategy);
        self
    }

    pub fn set_strategy(&mut self, verb: Verb, strategy: Rc<dyn VerbStrategy>) {
        self.strategies.insert(verb, strategy);
    }

    pub fn clear_strategy(&mut self, verb: Verb) -> Option<Rc<dyn VerbStrategy>> {
        self.strategies.remove(&verb)
    }

    pub fn set_can_move(&mut self, can_move: bool) {
        self.can_move = can_move;
        self.rehome_verb();
    }

    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    #[must_use]
    pub const fn mode(&self) -> RecoveryMode {
        self.mode
    }

    #[must_use]
    pub const fn can_move(&self) -> bool {
        self.can_move
    }

    #[must_use]
    pub const fn verb_index(&self) -> usize {
        self.verb_index
    }

    #[must_use]
    pub const fn verb(&self) -> Verb {
        VERBS[self.verb_index % VERBS.len()]
    }

    #[must_use]
    pub const fn object_index(&self) -> i64 {
        self.object_index
    }

    #[must_use]
    pub fn dialogue_line(&self) -> Option<&str> {
        self.dialogue_line.as_deref()
    }

    #[must_use]
    pub const fn is_presenting(&self) -> bool {
        self.presented.is_some()
    }

    #[must_use]
    pub fn visible_verbs(&self) -> VisibleVerbs {
        verb::visible_verbs(self.can_move)
    }

    /// Move the object cursor. Wrapped into range on the next frame.
    pub const fn set_object_index(&mut self, index: i64) {
        self.object_index = index;
    }

    /// Point the verb cursor at `target`, or the nearest visible verb after it.
    pub fn select_verb(&mut self, target: Verb) {
        self.verb_index = verb::next_visible(target.index(), 0, self.can_move);
    }

    #[must_use]
    pub fn snapshot(&self) -> InteractionSnapshot {
        InteractionSnapshot {
            state: self.state,
            verb: self.verb(),
            object_index: self.object_index,
            dialogue_line: self.dialogue_line.clone(),
            queued_lines: 0,
            presenting: self.presented.is_some(),
            can_move: self.can_move,
        }
    }

    /// Enter explore with both cursors reset.
    pub fn enable_explore(&mut self) {
        self.enter_explore();
        self.verb_index = verb::next_visible(0, 0, self.can_move);
        self.object_index = 0;
    }

    /// Force the engine idle.
    ///
    /// In an interactive scene this only lasts until the next frame. Use
    /// [`Interaction::suppress`] to keep the engine inert.
    pub fn disable(&mut self) {
        if self.state != EngineState::Idle {
            log::warn!("interaction forced idle from {:?}", self.state);
        }
        self.state = EngineState::Idle;
        self.clear_transient();
    }

    /// Park the engine until [`Interaction::resume`] is called.
    pub fn suppress(&mut self) {
        log::debug!("interaction suppressed from {:?}", self.state);
        self.state = EngineState::Suppressed;
        self.clear_transient();
    }

    pub fn resume(&mut self) {
        if self.state == EngineState::Suppressed {
            self.enable_explore();
        }
    }

    /// Show a single line of modal text.
    pub fn show_dialogue(&mut self, line: impl Into<String>) {
        self.presented = None;
        self.dialogue_line = Some(line.into());
        self.state = EngineState::Dialogue;
    }

    /// Dismiss the current line.
    pub fn close_dialogue(&mut self) {
        if self.state == EngineState::Dialogue {
            self.enter_explore();
        }
    }

    /// Take the queued dialogue a verb handler requested during the last resolve.
    ///
    /// The engine only shows single lines; the owning scene plays the run.
    pub fn take_queued_dialogue(&mut self) -> Option<QueuedDialogue> {
        self.handoff.take()
    }

    /// Open a one-off menu. It is discarded as soon as the engine leaves object selection.
    pub fn present(&mut self, strategy: Rc<dyn VerbStrategy>) {
        self.dialogue_line = None;
        self.presented = Some(strategy);
        self.state = EngineState::SelectObject;
        self.object_index = 0;
    }

    /// Entries the object menu lists right now.
    #[must_use]
    pub fn candidates(&self, set: &ObjectSet) -> Vec<ObjectDescriptor> {
        self.active_strategy()
            .map_or_else(|| set.objects.clone(), |strategy| strategy.candidates(set))
    }

    pub fn render(&mut self, surface: &mut dyn Surface, set: &ObjectSet, overlay_active: bool) {
        self.check_presented();
        if overlay_active {
            return;
        }
        self.recover(overlay_active);
        self.rehome_verb();
        match self.state {
            EngineState::Idle | EngineState::Suppressed => {}
            EngineState::Explore => {
                render::draw_verb_bar(surface, &self.visible_verbs(), self.verb());
            }
            EngineState::SelectObject => {
                let candidates = self.candidates(set);
                let Some(selected) = self.wrap_object_index(candidates.len()) else {
                    self.enter_explore();
                    return;
                };
                let prompt = self
                    .active_strategy()
                    .map_or_else(|| self.verb().prompt(), |strategy| strategy.prompt(self.verb()));
                render::draw_object_menu(surface, &prompt, &candidates, selected);
            }
            EngineState::Dialogue => {
                if let Some(line) = &self.dialogue_line {
                    render::draw_dialogue(surface, line);
                }
            }
        }
    }

    /// Route one key press. Returns whether the key was consumed.
    pub fn handle_input(&mut self, key: &Key, set: &ObjectSet, ctx: &mut GameContext<'_>) -> bool {
        self.check_presented();
        if ctx.overlay_active() {
            return true;
        }
        self.recover(false);
        self.rehome_verb();
        match self.state {
            EngineState::Idle | EngineState::Suppressed => false,
            EngineState::Dialogue => {
                if !(key.is_confirm() || key.is_cancel()) {
                    return false;
                }
                self.enter_explore();
                true
            }
            EngineState::SelectObject => {
                if key.is_cancel() {
                    self.enter_explore();
                    return true;
                }
                let mut candidates = self.candidates(set);
                let Some(selected) = self.wrap_object_index(candidates.len()) else {
                    self.enter_explore();
                    return true;
                };
                let len = i64::try_from(candidates.len()).unwrap_or(i64::MAX);
                if key.is_down() {
                    self.object_index = (self.object_index + 1).rem_euclid(len);
                } else if key.is_up() {
                    self.object_index = (self.object_index - 1).rem_euclid(len);
                } else if key.is_confirm() {
                    let object = candidates.swap_remove(selected);
                    self.resolve(self.verb(), Some(&object), ctx);
                }
                true
            }
            EngineState::Explore => {
                if key.is_up() {
                    self.verb_index = verb::next_visible(self.verb_index, -1, self.can_move);
                    true
                } else if key.is_down() {
                    self.verb_index = verb::next_visible(self.verb_index, 1, self.can_move);
                    true
                } else if key.is_confirm() {
                    self.state = EngineState::SelectObject;
                    self.object_index = 0;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Run `verb` against `object` and move to the resulting state.
    ///
    /// A one-off menu, if open, handles the request and is then discarded.
    /// With no object, or Move while moving is disabled, the engine simply
    /// returns to explore.
    pub fn resolve(
        &mut self,
        verb: Verb,
        object: Option<&ObjectDescriptor>,
        ctx: &mut GameContext<'_>,
    ) {
        let strategy = self
            .presented
            .take()
            .or_else(|| self.strategies.get(&verb).cloned());
        let Some(object) = object else {
            self.enter_explore();
            return;
        };
        if verb == Verb::Move && !self.can_move {
            log::debug!("Move ignored on `{}`: moving is disabled here", object.name);
            self.enter_explore();
            return;
        }
        log::debug!("resolve {verb} on `{}`", object.name);
        let mut action = ActionContext::new(ctx);
        let line = match &strategy {
            Some(strategy) => strategy.resolve(verb, object, &mut action),
            None => GenericResolution.resolve(verb, object, &mut action),
        };
        let requests = action.into_requests();
        self.apply_outcome(line, requests);
    }

    fn apply_outcome(&mut self, line: Option<String>, requests: Vec<EngineRequest>) {
        let mut said = line.filter(|line| !line.is_empty());
        let mut queued = None;
        let mut menu = None;
        for request in requests {
            match request {
                EngineRequest::Say(line) if said.is_none() && !line.is_empty() => {
                    said = Some(line);
                }
                EngineRequest::Say(_) => {}
                EngineRequest::Queue(lines) => queued = Some(lines),
                EngineRequest::Present(strategy) => menu = Some(strategy),
            }
        }
        if let Some(queued) = queued {
            self.enter_explore();
            if self.handoff.replace(queued).is_some() {
                log::warn!("queued dialogue replaced before the scene played it");
            }
        } else if let Some(strategy) = menu {
            self.present(strategy);
        } else if let Some(line) = said {
            self.show_dialogue(line);
        } else {
            self.enter_explore();
        }
    }

    fn active_strategy(&self) -> Option<&Rc<dyn VerbStrategy>> {
        self.presented
            .as_ref()
            .or_else(|| self.strategies.get(&self.verb()))
    }

    fn enter_explore(&mut self) {
        self.state = EngineState::Explore;
        self.clear_transient();
    }

    fn clear_transient(&mut self) {
        self.presented = None;
        self.dialogue_line = None;
    }

    fn recover(&mut self, overlay_active: bool) {
        if self.mode == RecoveryMode::Interactive
            && self.state == EngineState::Idle
            && !overlay_active
        {
            log::debug!("interaction idle in an interactive scene; re-entering explore");
            self.enable_explore();
        }
    }

    fn rehome_verb(&mut self) {
        self.verb_index = verb::next_visible(self.verb_index, 0, self.can_move);
    }

    /// Normalize the object cursor into `0..len`. `None` when there is nothing to select.
    fn wrap_object_index(&mut self, len: usize) -> Option<usize> {
        let len = i64::try_from(len).ok().filter(|len| *len > 0)?;
        self.object_index = self.object_index.rem_euclid(len);
        usize::try_from(self.object_index).ok()
    }

    fn check_presented(&self) {
        debug_assert!(
            self.presented.is_none() || self.state == EngineState::SelectObject,
            "one-off menu outlived object selection (state {:?})",
            self.state
        );
    }
}

impl std::fmt::Debug for Interaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interaction")
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("can_move", &self.can_move)
            .field("verb", &self.verb())
            .field("object_index", &self.object_index)
            .field("dialogue_line", &self.dialogue_line)
            .field("handoff", &self.handoff.as_ref().map(|queued| queued.lines.len()))
            .field("strategies", &self.strategies.keys().collect::<Vec<_>>())
            .field("presenting", &self.presented.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::World;
    use crate::flags::MemoryFlagStore;
    use crate::surface::RecordingSurface;

    fn world() -> World {
        World::new(Box::new(MemoryFlagStore::new()))
    }

    fn press(engine: &mut Interaction, world: &mut World, set: &ObjectSet, key: Key) -> bool {
        let mut ctx = world.context(false);
        engine.handle_input(&key, set, &mut ctx)
    }

    fn room() -> ObjectSet {
        ObjectSet::new(vec![
            ObjectDescriptor::new("Plant").describe("A tired fern."),
            ObjectDescriptor::new("Key"),
            ObjectDescriptor::new("Door"),
        ])
    }

    #[test]
    fn first_input_recovers_from_idle() {
        let mut world = world();
        let mut engine = Interaction::interactive();
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(press(&mut engine, &mut world, &room(), Key::Down));
        assert_eq!(engine.state(), EngineState::Explore);
        assert_eq!(engine.verb(), Verb::Speak);
    }

    #[test]
    fn cinematic_engine_stays_idle() {
        let mut world = world();
        let mut engine = Interaction::cinematic();
        assert!(!press(&mut engine, &mut world, &room(), Key::Enter));
        let mut surface = RecordingSurface::default();
        engine.render(&mut surface, &room(), false);
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(surface.is_blank());
    }

    #[test]
    fn look_shows_description_then_returns_to_explore() {
        let mut world = world();
        let mut engine = Interaction::interactive();
        engine.enable_explore();
        let set = room();
        assert!(press(&mut engine, &mut world, &set, Key::Enter));
        assert_eq!(engine.state(), EngineState::SelectObject);
        assert!(press(&mut engine, &mut world, &set, Key::Enter));
        assert_eq!(engine.state(), EngineState::Dialogue);
        assert_eq!(engine.dialogue_line(), Some("A tired fern."));
        assert!(press(&mut engine, &mut world, &set, Key::Enter));
        assert_eq!(engine.state(), EngineState::Explore);
        assert_eq!(engine.dialogue_line(), None);
    }

    #[test]
    fn object_cursor_wraps_both_ways() {
        let mut world = world();
        let mut engine = Interaction::interactive();
        engine.enable_explore();
        let set = room();
        press(&mut engine, &mut world, &set, Key::Enter);
        press(&mut engine, &mut world, &set, Key::Up);
        assert_eq!(engine.object_index(), 2);
        press(&mut engine, &mut world, &set, Key::Char('s'));
        assert_eq!(engine.object_index(), 0);
    }

    #[test]
    fn stale_object_index_is_normalized_on_render() {
        let mut engine = Interaction::interactive();
        engine.enable_explore();
        engine.present(Menu::new("Pick", room().objects, |_, _| None).into_strategy());
        engine.set_object_index(-4);
        let mut surface = RecordingSurface::default();
        engine.render(&mut surface, &ObjectSet::default(), false);
        assert_eq!(engine.object_index(), 2);
        assert!(surface.contains_text("> Door"));
    }

    #[test]
    fn suppressed_engine_ignores_input_until_resumed() {
        let mut world = world();
        let mut engine = Interaction::interactive();
        engine.suppress();
        assert!(!press(&mut engine, &mut world, &room(), Key::Enter));
        assert_eq!(engine.state(), EngineState::Suppressed);
        engine.resume();
        assert_eq!(engine.state(), EngineState::Explore);
    }

    #[test]
    fn disable_is_undone_by_next_render() {
        let mut engine = Interaction::interactive();
        engine.enable_explore();
        engine.disable();
        assert_eq!(engine.state(), EngineState::Idle);
        let mut surface = RecordingSurface::default();
        engine.render(&mut surface, &room(), false);
        assert_eq!(engine.state(), EngineState::Explore);
        assert!(surface.contains_text("Look"));
    }

    #[test]
    fn handler_can_open_follow_up_menu() {
        let mut world = world();
        let drawers = Menu::new(
            "Which drawer?",
            vec![ObjectDescriptor::new("Top"), ObjectDescriptor::new("Bottom")],
            |item, _| Some(format!("The {} drawer is empty.", item.name.to_lowercase())),
        )
        .into_strategy();
        let set = ObjectSet::new(vec![ObjectDescriptor::new("Desk").on(Verb::Use, move |ctx| {
            ctx.present(Rc::clone(&drawers));
            None
        })]);
        let mut engine = Interaction::interactive();
        engine.enable_explore();
        engine.select_verb(Verb::Use);
        press(&mut engine, &mut world, &set, Key::Enter);
        press(&mut engine, &mut world, &set, Key::Enter);
        assert!(engine.is_presenting());
        assert_eq!(engine.candidates(&set).len(), 2);
        press(&mut engine, &mut world, &set, Key::Down);
        press(&mut engine, &mut world, &set, Key::Enter);
        assert!(!engine.is_presenting());
        assert_eq!(engine.dialogue_line(), Some("The bottom drawer is empty."));
    }

    #[test]
    fn move_is_ignored_while_moving_is_disabled() {
        let mut world = world();
        let mut engine = Interaction::interactive();
        engine.enable_explore();
        let hatch = ObjectDescriptor::new("Hatch").on(Verb::Move, |ctx| {
            ctx.set_flag("climbed", true);
            Some("You climb through.".to_string())
        });
        let mut ctx = world.context(false);
        engine.resolve(Verb::Move, Some(&hatch), &mut ctx);
        assert_eq!(engine.state(), EngineState::Explore);
        assert_eq!(engine.dialogue_line(), None);
        assert!(!ctx.flag("climbed"));
        assert!(ctx.pending_commands().is_empty());
    }

    #[test]
    fn queued_lines_are_handed_to_the_scene() {
        let mut world = world();
        let set = ObjectSet::new(vec![ObjectDescriptor::new("Clerk").on(Verb::Speak, |ctx| {
            ctx.queue(["Hello.", "Goodbye."]);
            Some("ignored".to_string())
        })]);
        let mut engine = Interaction::interactive();
        engine.enable_explore();
        engine.select_verb(Verb::Speak);
        press(&mut engine, &mut world, &set, Key::Enter);
        press(&mut engine, &mut world, &set, Key::Enter);
        assert_eq!(engine.state(), EngineState::Explore);
        assert_eq!(engine.dialogue_line(), None);
        let queued = engine.take_queued_dialogue().expect("handoff");
        assert_eq!(queued.lines, ["Hello.", "Goodbye."]);
        assert!(engine.take_queued_dialogue().is_none());
        assert_eq!(engine.snapshot().queued_lines, 0);
    }
}
