//! Interactable objects as scenes describe them to the engine.

use crate::context::ActionContext;
use crate::scene::SceneId;
use crate::verb::Verb;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Callable verb handler. The returned text, if any, becomes the next dialogue line.
pub type ActionFn = Rc<dyn Fn(&mut ActionContext<'_, '_>) -> Option<String>>;

/// Text that may be computed from current game state each time it is shown.
#[derive(Clone)]
pub enum Text {
    Static(String),
    Dynamic(Rc<dyn Fn() -> String>),
}

impl Text {
    #[must_use]
    pub fn resolve(&self) -> String {
        match self {
            Self::Static(text) => text.clone(),
            Self::Dynamic(compute) => compute(),
        }
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(text) => f.debug_tuple("Static").field(text).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// How an object responds to a verb.
#[derive(Clone)]
pub enum VerbHandler {
    /// Fixed response line.
    Text(String),
    /// Code run against the game context.
    Action(ActionFn),
}

impl fmt::Debug for VerbHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Action(_) => f.write_str("Action(..)"),
        }
    }
}

/// One entry in a scene's object list.
///
/// Descriptors are rebuilt from flags whenever the scene is asked for its
/// objects, so they carry no state of their own.
#[derive(Clone, Debug, Default)]
pub struct ObjectDescriptor {
    pub name: String,
    pub description: Option<Text>,
    handlers: BTreeMap<Verb, VerbHandler>,
    /// Destination scene when this entry is offered by the Move verb.
    pub move_target: Option<SceneId>,
    /// Scene-defined tag, e.g. the item key an entry stands for.
    pub index: Option<String>,
}

impl ObjectDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A Move destination leading to `scene`.
    #[must_use]
    pub fn destination(name: impl Into<String>, scene: impl Into<SceneId>) -> Self {
        Self::new(name).travel_to(scene)
    }

    #[must_use]
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(Text::Static(text.into()));
        self
    }

    #[must_use]
    pub fn describe_with(mut self, compute: impl Fn() -> String + 'static) -> Self {
        self.description = Some(Text::Dynamic(Rc::new(compute)));
        self
    }

    /// Respond to `verb` with a fixed line.
    #[must_use]
    pub fn reply(mut self, verb: Verb, text: impl Into<String>) -> Self {
        self.handlers.insert(verb, VerbHandler::Text(text.into()));
        self
    }

    /// Respond to `verb` by running `action`.
    #[must_use]
    pub fn on<F>(mut self, verb: Verb, action: F) -> Self
    where
        F: Fn(&mut ActionContext<'_, '_>) -> Option<String> + 'static,
    {
        self.handlers
            .insert(verb, VerbHandler::Action(Rc::new(action)));
        self
    }

    #[must_use]
    pub fn travel_to(mut self, scene: impl Into<SceneId>) -> Self {
        self.move_target = Some(scene.into());
        self
    }

    #[must_use]
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    #[must_use]
    pub fn handler(&self, verb: Verb) -> Option<&VerbHandler> {
        self.handlers.get(&verb)
    }

    #[must_use]
    pub fn responds_to(&self, verb: Verb) -> bool {
        self.handlers.contains_key(&verb)
    }

    #[must_use]
    pub fn description_text(&self) -> Option<String> {
        self.description.as_ref().map(Text::resolve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn dynamic_description_reads_latest_state() {
        let counter = Rc::new(Cell::new(1));
        let seen = Rc::clone(&counter);
        let plant = ObjectDescriptor::new("Plant")
            .describe_with(move || format!("It has {} leaves.", seen.get()));
        assert_eq!(plant.description_text().as_deref(), Some("It has 1 leaves."));
        counter.set(3);
        assert_eq!(plant.description_text().as_deref(), Some("It has 3 leaves."));
    }

    #[test]
    fn builder_registers_handlers() {
        let key = ObjectDescriptor::new("Key")
            .reply(Verb::Speak, "It says nothing.")
            .on(Verb::Take, |_| None)
            .with_index("rustykey");
        assert!(key.responds_to(Verb::Take));
        assert!(!key.responds_to(Verb::Use));
        assert!(matches!(key.handler(Verb::Speak), Some(VerbHandler::Text(_))));
        assert_eq!(key.index.as_deref(), Some("rustykey"));

        let exit = ObjectDescriptor::destination("Hallway", "hallway");
        assert_eq!(exit.move_target, Some(SceneId::from("hallway")));
    }
}
