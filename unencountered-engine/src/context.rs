//! Handles passed to scenes, overlays and verb handlers.
//!
//! Nothing below the director mutates the director directly. Scenes and
//! overlays read and write flags in place, and everything else (navigation,
//! overlay visibility, alerts) is queued as a [`Command`] that the director
//! applies once the current call has returned.

use crate::config::EngineConfig;
use crate::dialogue::{Completion, QueuedDialogue};
use crate::events::{EventBus, GameEvent};
use crate::flags::FlagStore;
use crate::interaction::VerbStrategy;
use crate::phases::PhaseTracker;
use crate::scene::SceneId;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

/// Deferred request applied by the director after the current call returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Navigate { scene: SceneId },
    /// Navigate once `delay_ms` of game time has passed, unless the scene changes first.
    NavigateAfter { scene: SceneId, delay_ms: f64 },
    ShowOverlay { name: String },
    ToggleOverlay { name: String },
    HideOverlay,
    NotifyMessage,
    NotifyCall,
    ClearMessageAlert,
    ClearCallAlert,
}

/// Owner of the state every context borrows from.
pub struct World {
    flags: Box<dyn FlagStore>,
    events: EventBus,
    outbox: Vec<Command>,
    phases: PhaseTracker,
}

impl World {
    /// A world tracking the default story phases.
    #[must_use]
    pub fn new(flags: Box<dyn FlagStore>) -> Self {
        Self {
            flags,
            events: EventBus::new(),
            outbox: Vec::new(),
            phases: PhaseTracker::new(EngineConfig::default_config().phases),
        }
    }

    #[must_use]
    pub fn with_phases(mut self, phases: PhaseTracker) -> Self {
        self.phases = phases;
        self
    }

    /// Borrow a context for one scene or overlay call.
    pub fn context(&mut self, overlay_active: bool) -> GameContext<'_> {
        GameContext {
            flags: self.flags.as_mut(),
            events: &mut self.events,
            outbox: &mut self.outbox,
            phases: &self.phases,
            overlay_active,
        }
    }

    #[must_use]
    pub const fn phases(&self) -> &PhaseTracker {
        &self.phases
    }

    #[must_use]
    pub fn flags(&self) -> &dyn FlagStore {
        self.flags.as_ref()
    }

    pub fn flags_mut(&mut self) -> &mut dyn FlagStore {
        self.flags.as_mut()
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Queued commands, oldest first.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.outbox
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.outbox)
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// Queue a command from outside any scene call.
    pub fn push(&mut self, command: Command) {
        self.outbox.push(command);
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("events", &self.events)
            .field("outbox", &self.outbox)
            .finish_non_exhaustive()
    }
}

/// Access granted to scenes and overlays during one call.
pub struct GameContext<'a> {
    flags: &'a mut dyn FlagStore,
    events: &'a mut EventBus,
    outbox: &'a mut Vec<Command>,
    phases: &'a PhaseTracker,
    overlay_active: bool,
}

impl<'a> GameContext<'a> {
    pub fn new(
        flags: &'a mut dyn FlagStore,
        events: &'a mut EventBus,
        outbox: &'a mut Vec<Command>,
        phases: &'a PhaseTracker,
        overlay_active: bool,
    ) -> Self {
        Self {
            flags,
            events,
            outbox,
            phases,
            overlay_active,
        }
    }

    /// The story phases this game was configured with.
    #[must_use]
    pub const fn phases(&self) -> &'a PhaseTracker {
        self.phases
    }

    /// Arm `phase` through the configured tracker.
    pub fn arm_phase(&mut self, phase: &str) -> bool {
        let phases = self.phases;
        phases.arm(self, phase)
    }

    /// The latest ready phase, if any phase is configured.
    #[must_use]
    pub fn current_phase(&self) -> Option<&'a str> {
        self.phases.current(&*self.flags)
    }

    #[must_use]
    pub fn flags(&self) -> &dyn FlagStore {
        &*self.flags
    }

    pub fn flags_mut(&mut self) -> &mut dyn FlagStore {
        &mut *self.flags
    }

    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.flags.get_bool(key)
    }

    #[must_use]
    pub fn flag_value(&self, key: &str) -> Option<String> {
        self.flags.get(key)
    }

    /// Write a boolean flag. Storage failures are logged, never fatal.
    pub fn set_flag(&mut self, key: &str, value: bool) {
        if let Err(err) = self.flags.set_bool(key, value) {
            log::warn!("could not persist flag `{key}`: {err}");
        }
    }

    pub fn set_flag_value(&mut self, key: &str, value: &str) {
        if let Err(err) = self.flags.set(key, value) {
            log::warn!("could not persist flag `{key}`: {err}");
        }
    }

    pub fn clear_flag(&mut self, key: &str) {
        if let Err(err) = self.flags.remove(key) {
            log::warn!("could not clear flag `{key}`: {err}");
        }
    }

    pub fn publish(&mut self, event: GameEvent) {
        self.events.publish(event);
    }

    pub fn push(&mut self, command: Command) {
        self.outbox.push(command);
    }

    pub fn navigate(&mut self, scene: impl Into<SceneId>) {
        self.push(Command::Navigate {
            scene: scene.into(),
        });
    }

    pub fn navigate_after(&mut self, scene: impl Into<SceneId>, delay_ms: f64) {
        self.push(Command::NavigateAfter {
            scene: scene.into(),
            delay_ms,
        });
    }

    pub fn show_overlay(&mut self, name: &str) {
        self.push(Command::ShowOverlay {
            name: name.to_string(),
        });
    }

    pub fn toggle_overlay(&mut self, name: &str) {
        self.push(Command::ToggleOverlay {
            name: name.to_string(),
        });
    }

    pub fn hide_overlay(&mut self) {
        self.push(Command::HideOverlay);
    }

    pub fn notify_message(&mut self) {
        self.push(Command::NotifyMessage);
    }

    pub fn notify_call(&mut self) {
        self.push(Command::NotifyCall);
    }

    /// Whether an overlay held the input focus when this context was issued.
    #[must_use]
    pub const fn overlay_active(&self) -> bool {
        self.overlay_active
    }

    pub(crate) const fn set_overlay_active(&mut self, active: bool) {
        self.overlay_active = active;
    }

    /// Commands queued so far and not yet applied.
    #[must_use]
    pub fn pending_commands(&self) -> &[Command] {
        self.outbox.as_slice()
    }
}

/// What a verb handler asked the interaction engine to do next.
pub enum EngineRequest {
    Say(String),
    Queue(QueuedDialogue),
    Present(Rc<dyn VerbStrategy>),
}

impl std::fmt::Debug for EngineRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Say(line) => f.debug_tuple("Say").field(line).finish(),
            Self::Queue(queued) => f.debug_tuple("Queue").field(&queued.lines).finish(),
            Self::Present(_) => f.write_str("Present(..)"),
        }
    }
}

/// Context handed to verb handlers while an object action resolves.
///
/// Dereferences to the [`GameContext`], and adds requests that only make
/// sense while the engine is resolving a verb.
pub struct ActionContext<'a, 'w> {
    game: &'a mut GameContext<'w>,
    requests: Vec<EngineRequest>,
}

impl<'a, 'w> ActionContext<'a, 'w> {
    pub fn new(game: &'a mut GameContext<'w>) -> Self {
        Self {
            game,
            requests: Vec::new(),
        }
    }

    /// Show a single dialogue line once the handler returns.
    pub fn say(&mut self, line: impl Into<String>) {
        self.requests.push(EngineRequest::Say(line.into()));
    }

    /// Play `lines` one per Enter/Escape press.
    pub fn queue<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requests
            .push(EngineRequest::Queue(QueuedDialogue::new(lines)));
    }

    /// Play `lines`, then run `then` exactly once after the last one closes.
    pub fn queue_then<I, S>(&mut self, lines: I, then: Completion)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requests
            .push(EngineRequest::Queue(QueuedDialogue::new(lines).then(then)));
    }

    /// Open a follow-up menu driven by `strategy`.
    pub fn present(&mut self, strategy: Rc<dyn VerbStrategy>) {
        self.requests.push(EngineRequest::Present(strategy));
    }

    pub fn into_requests(self) -> Vec<EngineRequest> {
        self.requests
    }
}

impl<'w> Deref for ActionContext<'_, 'w> {
    type Target = GameContext<'w>;

    fn deref(&self) -> &Self::Target {
        &*self.game
    }
}

impl DerefMut for ActionContext<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.game
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::MemoryFlagStore;

    #[test]
    fn context_queues_commands_and_writes_flags() {
        let mut world = World::new(Box::new(MemoryFlagStore::new()));
        {
            let mut ctx = world.context(false);
            ctx.set_flag("lamp_on", true);
            ctx.navigate("hallway");
            ctx.toggle_overlay("Phone");
            assert_eq!(ctx.pending_commands().len(), 2);
        }
        assert!(world.flags().get_bool("lamp_on"));
        assert_eq!(
            world.take_commands(),
            vec![
                Command::Navigate {
                    scene: SceneId::from("hallway")
                },
                Command::ToggleOverlay {
                    name: "Phone".to_string()
                },
            ]
        );
        assert!(world.commands().is_empty());
    }

    #[test]
    fn context_arms_configured_phases_only() {
        let mut world = World::new(Box::new(MemoryFlagStore::new()))
            .with_phases(PhaseTracker::new(["prologue", "act_one"]));
        let mut ctx = world.context(false);
        assert_eq!(ctx.current_phase(), Some("prologue"));
        assert!(!ctx.arm_phase("phase2"));
        assert!(ctx.arm_phase("act_one"));
        assert_eq!(ctx.current_phase(), Some("act_one"));
    }

    #[test]
    fn action_context_collects_requests() {
        let mut world = World::new(Box::new(MemoryFlagStore::new()));
        let mut ctx = world.context(false);
        let mut action = ActionContext::new(&mut ctx);
        action.say("Hello.");
        action.queue(["One.", "Two."]);
        action.set_flag("spoke", true);
        let requests = action.into_requests();
        assert_eq!(requests.len(), 2);
        assert!(matches!(&requests[0], EngineRequest::Say(line) if line == "Hello."));
        assert!(ctx.flag("spoke"));
    }
}
