use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use unencountered_engine::{ConfigError, ConfigLoader, EngineConfig};

#[derive(Debug, Error)]
pub enum FileConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Loads the engine config from a JSON file, or the built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct FileConfigLoader {
    path: Option<PathBuf>,
}

impl FileConfigLoader {
    pub const fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl ConfigLoader for FileConfigLoader {
    type Error = FileConfigError;

    fn load_engine_config(&self) -> Result<EngineConfig, Self::Error> {
        let Some(path) = &self.path else {
            return Ok(EngineConfig::default_config());
        };
        let json = fs::read_to_string(path).map_err(|source| FileConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(EngineConfig::from_json(&json)?)
    }
}
