//! Per-verb candidate lists and resolution.
//!
//! A scene customizes a verb by installing a [`VerbStrategy`] for it instead
//! of replacing engine methods. Anything a strategy does not override falls
//! through to [`GenericResolution`].

use crate::context::ActionContext;
use crate::descriptor::{ObjectDescriptor, VerbHandler};
use crate::verb::Verb;
use std::rc::Rc;

/// What a scene currently offers the player.
#[derive(Debug, Clone, Default)]
pub struct ObjectSet {
    pub objects: Vec<ObjectDescriptor>,
    /// Travel targets listed by the Move verb.
    pub destinations: Vec<ObjectDescriptor>,
}

impl ObjectSet {
    #[must_use]
    pub const fn new(objects: Vec<ObjectDescriptor>) -> Self {
        Self {
            objects,
            destinations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_destinations(mut self, destinations: Vec<ObjectDescriptor>) -> Self {
        self.destinations = destinations;
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.objects.iter().any(|object| object.name == name)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.objects.iter().map(|object| object.name.as_str()).collect()
    }
}

impl From<Vec<ObjectDescriptor>> for ObjectSet {
    fn from(objects: Vec<ObjectDescriptor>) -> Self {
        Self::new(objects)
    }
}

/// Decides what a verb lists and what confirming an entry does.
pub trait VerbStrategy {
    /// Entries shown in the object menu.
    fn candidates(&self, set: &ObjectSet) -> Vec<ObjectDescriptor> {
        set.objects.clone()
    }

    /// Menu header.
    fn prompt(&self, verb: Verb) -> String {
        verb.prompt()
    }

    /// Run the action for `object`. Returned text becomes the next dialogue line.
    fn resolve(
        &self,
        verb: Verb,
        object: &ObjectDescriptor,
        ctx: &mut ActionContext<'_, '_>,
    ) -> Option<String>;
}

/// Default verb behavior for plain descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericResolution;

impl VerbStrategy for GenericResolution {
    fn resolve(
        &self,
        verb: Verb,
        object: &ObjectDescriptor,
        ctx: &mut ActionContext<'_, '_>,
    ) -> Option<String> {
        if let Some(handler) = object.handler(verb) {
            return match handler {
                VerbHandler::Text(text) => Some(text.clone()),
                VerbHandler::Action(action) => action(ctx),
            };
        }
        match verb {
            Verb::Look => Some(object.description_text().unwrap_or_else(|| {
                format!("You look at the {}.", object.name.to_lowercase())
            })),
            Verb::Speak => Some(format!("You try speaking to the {}.", object.name)),
            Verb::Use => Some("You can't use that.".to_string()),
            Verb::Take => Some("You can't take that.".to_string()),
            // Travel belongs to a Move strategy such as [`TravelMenu`].
            Verb::Move => None,
        }
    }
}

/// Move strategy listing the scene's destinations.
#[derive(Debug, Clone, Copy, Default)]
pub struct TravelMenu;

impl VerbStrategy for TravelMenu {
    fn candidates(&self, set: &ObjectSet) -> Vec<ObjectDescriptor> {
        set.destinations.clone()
    }

    fn resolve(
        &self,
        verb: Verb,
        object: &ObjectDescriptor,
        ctx: &mut ActionContext<'_, '_>,
    ) -> Option<String> {
        match &object.move_target {
            Some(target) => {
                log::debug!("travel to {target} via `{}`", object.name);
                ctx.navigate(target.clone());
                None
            }
            None => GenericResolution.resolve(verb, object, ctx),
        }
    }
}

type PickFn = dyn Fn(&ObjectDescriptor, &mut ActionContext<'_, '_>) -> Option<String>;

/// One-off menu opened with [`Interaction::present`](super::Interaction::present).
///
/// The menu lives only until an entry is picked or the player backs out.
pub struct Menu {
    prompt: String,
    items: Vec<ObjectDescriptor>,
    pick: Box<PickFn>,
}

impl Menu {
    pub fn new<F>(prompt: impl Into<String>, items: Vec<ObjectDescriptor>, pick: F) -> Self
    where
        F: Fn(&ObjectDescriptor, &mut ActionContext<'_, '_>) -> Option<String> + 'static,
    {
        Self {
            prompt: prompt.into(),
            items,
            pick: Box::new(pick),
        }
    }

    #[must_use]
    pub fn into_strategy(self) -> Rc<dyn VerbStrategy> {
        Rc::new(self)
    }
}

impl VerbStrategy for Menu {
    fn candidates(&self, _set: &ObjectSet) -> Vec<ObjectDescriptor> {
        self.items.clone()
    }

    fn prompt(&self, _verb: Verb) -> String {
        self.prompt.clone()
    }

    fn resolve(
        &self,
        _verb: Verb,
        object: &ObjectDescriptor,
        ctx: &mut ActionContext<'_, '_>,
    ) -> Option<String> {
        (self.pick)(object, ctx)
    }
}

impl std::fmt::Debug for Menu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Menu")
            .field("prompt", &self.prompt)
            .field("items", &self.items.len())
            .finish_non_exhaustive()
    }
}
