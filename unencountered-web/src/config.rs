//! Engine configuration embedded in the wasm bundle.

use unencountered_engine::{ConfigError, ConfigLoader, EngineConfig, GameEngine};

/// Raw contents of `static/assets/data/engine.json`.
pub const ENGINE_JSON: &str = include_str!("../static/assets/data/engine.json");

/// Web-specific config loader reading the embedded engine config
pub struct WebConfigLoader;

impl ConfigLoader for WebConfigLoader {
    type Error = ConfigError;

    fn load_engine_config(&self) -> Result<EngineConfig, Self::Error> {
        EngineConfig::from_json(ENGINE_JSON)
    }
}

/// Create a web-compatible game engine with `WebConfigLoader`
#[must_use]
pub const fn create_web_game_engine() -> GameEngine<WebConfigLoader> {
    GameEngine::new(WebConfigLoader)
}
