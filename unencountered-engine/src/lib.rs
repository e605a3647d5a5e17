//! Unencountered Engine
//!
//! Platform-agnostic core of the Unencountered narrative adventure: the verb/object
//! interaction engine, scene and overlay contracts, and the director that routes every
//! key press to exactly one consumer. No browser dependencies live here.

pub mod config;
pub mod context;
pub mod descriptor;
pub mod dialogue;
pub mod director;
pub mod events;
pub mod flags;
pub mod interaction;
pub mod key;
pub mod overlay;
pub mod overlays;
pub mod phases;
pub mod registry;
pub mod sandbox;
pub mod scene;
pub mod surface;
pub mod timers;
pub mod ui;
pub mod verb;

// Re-export commonly used types
pub use config::{ConfigError, EngineConfig, Hotkey};
pub use context::{ActionContext, Command, EngineRequest, GameContext, World};
pub use descriptor::{ActionFn, ObjectDescriptor, Text, VerbHandler};
pub use dialogue::{Advance, Completion, DialogueQueue, QueuedDialogue};
pub use director::{Director, DirectorError, DirectorSnapshot};
pub use events::{EventBus, EventKind, GameEvent, ListenerId};
pub use flags::{FlagError, FlagStore, MemoryFlagStore, WatchId, inventory_key};
pub use interaction::{
    EngineState, GenericResolution, Interaction, InteractionSnapshot, Menu, ObjectSet,
    RecoveryMode, TravelMenu, VerbStrategy,
};
pub use key::Key;
pub use overlay::{Alerts, Overlay, OverlayManager};
pub use phases::PhaseTracker;
pub use registry::SceneRegistry;
pub use scene::{InteractiveScene, RenderContext, Room, Scene, SceneId, SceneKind};
pub use surface::{RecordingSurface, Rect, Surface, TextAlign, TextStyle};
pub use timers::Timers;
pub use verb::{VERBS, Verb};

/// Trait for abstracting configuration loading
/// Platform-specific implementations should provide this
pub trait ConfigLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the engine configuration from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read or fails validation.
    fn load_engine_config(&self) -> Result<EngineConfig, Self::Error>;
}

/// Entry point for hosts: builds directors from a loaded configuration
pub struct GameEngine<L>
where
    L: ConfigLoader,
{
    config_loader: L,
}

impl<L> GameEngine<L>
where
    L: ConfigLoader,
{
    pub const fn new(config_loader: L) -> Self {
        Self { config_loader }
    }

    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn load_config(&self) -> Result<EngineConfig, L::Error> {
        self.config_loader.load_engine_config()
    }

    /// Create a director over `registry` with no scene installed yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn create_director(
        &self,
        flags: Box<dyn FlagStore>,
        registry: SceneRegistry,
    ) -> Result<Director, L::Error> {
        let config = self.load_config()?;
        Ok(Director::new(flags, registry, config))
    }

    /// Create a director running the sandbox world from its title card.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the sandbox cannot start.
    pub fn create_sandbox(&self, flags: Box<dyn FlagStore>) -> Result<Director, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let config = self.load_config().map_err(Into::into)?;
        sandbox::director(flags, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct FixtureLoader {
        loads: Rc<Cell<u32>>,
    }

    impl ConfigLoader for FixtureLoader {
        type Error = Infallible;

        fn load_engine_config(&self) -> Result<EngineConfig, Self::Error> {
            self.loads.set(self.loads.get() + 1);
            Ok(EngineConfig::default_config())
        }
    }

    struct BrokenLoader;

    impl ConfigLoader for BrokenLoader {
        type Error = ConfigError;

        fn load_engine_config(&self) -> Result<EngineConfig, Self::Error> {
            EngineConfig::from_json("{\"hotkeys\": 3}")
        }
    }

    #[test]
    fn sandbox_starts_on_the_title_card() {
        let loader = FixtureLoader::default();
        let engine = GameEngine::new(loader.clone());
        let director = engine
            .create_sandbox(Box::new(MemoryFlagStore::new()))
            .unwrap();
        assert_eq!(loader.loads.get(), 1);
        assert_eq!(
            director.scene_id().map(SceneId::as_str),
            Some(sandbox::ids::TITLE)
        );
        assert_eq!(director.snapshot().scene_kind, Some(SceneKind::Cinematic));
    }

    #[test]
    fn create_director_leaves_scene_empty() {
        let engine = GameEngine::new(FixtureLoader::default());
        let director = engine
            .create_director(Box::new(MemoryFlagStore::new()), SceneRegistry::new())
            .unwrap();
        assert!(director.scene().is_none());
        assert_eq!(director.generation(), 0);
    }

    #[test]
    fn config_errors_surface_through_anyhow() {
        let engine = GameEngine::new(BrokenLoader);
        let err = engine
            .create_sandbox(Box::new(MemoryFlagStore::new()))
            .unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }
}
