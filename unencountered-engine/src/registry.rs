use crate::descriptor::ObjectDescriptor;
use crate::scene::{Scene, SceneId};
use std::collections::BTreeMap;

pub type SceneFactory = Box<dyn Fn() -> Box<dyn Scene>>;

/// Scene constructors keyed by id. Navigation builds a fresh instance each time.
#[derive(Default)]
pub struct SceneRegistry {
    factories: BTreeMap<SceneId, SceneFactory>,
}

impl SceneRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, S>(&mut self, id: impl Into<SceneId>, factory: F)
    where
        F: Fn() -> S + 'static,
        S: Scene + 'static,
    {
        let id = id.into();
        let boxed: SceneFactory = Box::new(move || -> Box<dyn Scene> { Box::new(factory()) });
        if self.factories.insert(id.clone(), boxed).is_some() {
            log::warn!("scene `{id}` registered twice; keeping the latest");
        }
    }

    #[must_use]
    pub fn with<F, S>(mut self, id: impl Into<SceneId>, factory: F) -> Self
    where
        F: Fn() -> S + 'static,
        S: Scene + 'static,
    {
        self.register(id, factory);
        self
    }

    #[must_use]
    pub fn create(&self, id: &SceneId) -> Option<Box<dyn Scene>> {
        self.factories.get(id).map(|factory| factory())
    }

    #[must_use]
    pub fn contains(&self, id: &SceneId) -> bool {
        self.factories.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &SceneId> {
        self.factories.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Move targets that name no registered scene.
    pub fn unknown_targets<'a, I>(&self, destinations: I) -> Vec<SceneId>
    where
        I: IntoIterator<Item = &'a ObjectDescriptor>,
    {
        destinations
            .into_iter()
            .filter_map(|destination| destination.move_target.as_ref())
            .filter(|target| !self.contains(target))
            .cloned()
            .collect()
    }
}

impl std::fmt::Debug for SceneRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}
