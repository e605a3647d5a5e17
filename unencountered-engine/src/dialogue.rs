//! FIFO dialogue playback with an optional completion callback.
//!
//! The interaction engine only shows one line at a time. Runs of lines are
//! played by a [`DialogueQueue`] owned by the scene, which feeds the engine
//! through [`Interaction::show_dialogue`] and intercepts the dismissing keys.

use crate::context::GameContext;
use crate::interaction::{EngineState, Interaction};
use crate::key::Key;
use std::collections::VecDeque;

/// Runs once after the final queued line is dismissed.
pub type Completion = Box<dyn FnOnce(&mut GameContext<'_>)>;

/// Lines waiting to be played, as requested by a verb handler or scene.
pub struct QueuedDialogue {
    pub lines: Vec<String>,
    then: Option<Completion>,
}

impl QueuedDialogue {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            then: None,
        }
    }

    #[must_use]
    pub fn then(mut self, completion: Completion) -> Self {
        self.then = Some(completion);
        self
    }

    #[must_use]
    pub const fn has_completion(&self) -> bool {
        self.then.is_some()
    }
}

/// Result of dismissing the current queued line.
pub enum Advance {
    /// Show this line next.
    Next(String),
    /// The queue ran dry. Carries the completion, if one was attached.
    Finished(Option<Completion>),
}

/// Plays lines one per dismissal.
#[derive(Default)]
pub struct DialogueQueue {
    lines: VecDeque<String>,
    then: Option<Completion>,
    /// Line the engine should be showing while the run is active.
    current: Option<String>,
    active: bool,
}

impl DialogueQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any running queue and return the first line to show.
    ///
    /// An empty request yields `Advance::Finished` immediately so the caller
    /// can still run its completion.
    pub fn load(&mut self, queued: QueuedDialogue) -> Advance {
        if self.active {
            log::debug!("dialogue queue replaced with {} pending", self.lines.len());
        }
        self.lines = queued.lines.into();
        self.then = queued.then;
        self.active = true;
        self.advance()
    }

    /// Dismiss the current line.
    pub fn advance(&mut self) -> Advance {
        if let Some(next) = self.lines.pop_front() {
            self.current = Some(next.clone());
            return Advance::Next(next);
        }
        self.active = false;
        self.current = None;
        Advance::Finished(self.then.take())
    }

    /// Start `queued` on `engine`, replacing any run in progress.
    pub fn play(
        &mut self,
        queued: QueuedDialogue,
        engine: &mut Interaction,
        ctx: &mut GameContext<'_>,
    ) {
        let step = self.load(queued);
        Self::show(step, engine, ctx);
    }

    /// Advance on Enter or Escape while `engine` still shows this run's line.
    ///
    /// Returns false when the key belongs to the engine instead.
    pub fn intercept(
        &mut self,
        key: &Key,
        engine: &mut Interaction,
        ctx: &mut GameContext<'_>,
    ) -> bool {
        self.sync(engine);
        if !self.active || !(key.is_confirm() || key.is_cancel()) {
            return false;
        }
        let step = self.advance();
        Self::show(step, engine, ctx);
        true
    }

    /// Drop the run if the engine left its line by some other route.
    pub fn sync(&mut self, engine: &Interaction) {
        if !self.active {
            return;
        }
        let showing = engine.state() == EngineState::Dialogue
            && engine.dialogue_line() == self.current.as_deref();
        if !showing {
            self.cancel();
        }
    }

    fn show(step: Advance, engine: &mut Interaction, ctx: &mut GameContext<'_>) {
        match step {
            Advance::Next(line) => engine.show_dialogue(line),
            Advance::Finished(then) => {
                engine.close_dialogue();
                if let Some(then) = then {
                    then(ctx);
                }
            }
        }
    }

    /// Drop the queue without running its completion.
    pub fn cancel(&mut self) {
        if self.active && (self.then.is_some() || !self.lines.is_empty()) {
            log::debug!(
                "dialogue queue cancelled with {} line(s) left",
                self.lines.len()
            );
        }
        self.lines.clear();
        self.then = None;
        self.current = None;
        self.active = false;
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Lines still waiting behind the one on screen.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl std::fmt::Debug for DialogueQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueQueue")
            .field("lines", &self.lines)
            .field("current", &self.current)
            .field("has_completion", &self.then.is_some())
            .field("active", &self.active)
            .finish()
    }
}
