//! Engine configuration: the game config plus the engine-only sections.
//!
//! The whole of `idlefarm-config.yaml` is read and parsed once into
//! [`EngineConfig`]. Game keys sit at the top level as they do for
//! [`GameConfig`]; the `autopilot` section is only meaningful here.

use std::path::Path;

use idlefarm_core::config::{ConfigError, GameConfig};
use serde::Deserialize;

use crate::autopilot::AutopilotConfig;
use crate::error::EngineError;

/// Everything the engine binary reads from its config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// The game itself.
    #[serde(flatten)]
    pub game: GameConfig,

    /// The scripted player.
    #[serde(default)]
    pub autopilot: AutopilotConfig,
}

impl EngineConfig {
    /// Load from `path`, or use defaults when the file does not exist.
    ///
    /// `IDLEFARM_LOG_LEVEL` overrides `logging.level` either way.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        if !path.exists() {
            return Self::parse("");
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        Self::parse(&contents)
    }

    /// Parse from a YAML string. An empty document yields defaults.
    pub fn parse(yaml: &str) -> Result<Self, EngineError> {
        let mut config = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml).map_err(ConfigError::from)?
        };
        config.game.logging.apply_env_overrides();
        Ok(config)
    }
}
