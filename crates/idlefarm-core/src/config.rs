//! Configuration loading and typed config structures for the idle farm.
//!
//! The canonical configuration lives in `idlefarm-config.yaml` at the
//! project root. Every key is optional; omitted keys take the defaults
//! below, which reproduce the stock game balance.

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use idlefarm_ledger::{
    CropCatalog, CropDefinition, LedgerError, PacingModel, UpgradeSchedule, UpgradeTerms,
};
use idlefarm_types::UpgradeType;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "idlefarm-config.yaml";

/// Environment variable overriding `logging.level`.
pub const LOG_LEVEL_ENV: &str = "IDLEFARM_LOG_LEVEL";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The values parsed but do not describe a playable game.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },

    /// The economy section was rejected by the ledger.
    #[error("invalid economy configuration: {source}")]
    Economy {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `idlefarm-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// Initial grid size and new-plot defaults.
    #[serde(default)]
    pub farm: FarmConfig,

    /// Starting balance and upgrade cost table.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Growth and automation timing.
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Crop catalog in progression order.
    #[serde(default = "default_crops")]
    pub crops: Vec<CropConfig>,

    /// Frame loop settings for the runner.
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            farm: FarmConfig::default(),
            economy: EconomyConfig::default(),
            pacing: PacingConfig::default(),
            crops: default_crops(),
            runner: RunnerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `IDLEFARM_LOG_LEVEL` overrides `logging.level` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty map.
        if yaml.trim().is_empty() {
            let mut config = Self::default();
            config.logging.apply_env_overrides();
            return Ok(config);
        }
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.logging.apply_env_overrides();
        Ok(config)
    }

    /// Check that the configuration describes a playable game.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.farm.width == 0 || self.farm.height == 0 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "farm must be at least 1x1, got {}x{}",
                    self.farm.width, self.farm.height
                ),
            });
        }
        if self.economy.starting_money < Decimal::ZERO {
            return Err(ConfigError::Invalid {
                reason: "starting money must not be negative".to_owned(),
            });
        }
        if self.runner.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "frame interval must be at least 1ms".to_owned(),
            });
        }
        self.pacing().validate()?;
        self.schedule()?;
        self.catalog()?;
        Ok(())
    }

    /// Build the upgrade schedule: defaults overlaid with configured terms.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Economy`] if any terms fail validation.
    pub fn schedule(&self) -> Result<UpgradeSchedule, ConfigError> {
        let defaults = UpgradeSchedule::default();
        let mut terms: BTreeMap<UpgradeType, UpgradeTerms> = UpgradeType::ALL
            .into_iter()
            .filter_map(|upgrade| defaults.terms(upgrade).map(|t| (upgrade, *t)))
            .collect();
        terms.extend(self.economy.upgrades.iter().map(|(u, t)| (*u, *t)));
        Ok(UpgradeSchedule::new(terms)?)
    }

    /// Build the crop catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Economy`] if the catalog fails validation.
    pub fn catalog(&self) -> Result<CropCatalog, ConfigError> {
        let crops = self.crops.iter().map(CropConfig::to_definition).collect();
        Ok(CropCatalog::new(crops)?)
    }

    /// Timing parameters for the ledger.
    pub const fn pacing(&self) -> PacingModel {
        PacingModel {
            base_growth_time_ms: self.pacing.base_growth_time_ms,
            growth_reduction_per_level: self.pacing.growth_reduction_per_level,
            auto_harvest_base_interval_ms: self.pacing.auto_harvest_base_interval_ms,
            auto_plant_base_interval_ms: self.pacing.auto_plant_base_interval_ms,
        }
    }
}

/// Farm grid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FarmConfig {
    /// Initial number of columns.
    #[serde(default = "default_farm_side")]
    pub width: u32,

    /// Initial number of rows.
    #[serde(default = "default_farm_side")]
    pub height: u32,

    /// Whether newly created plots allow auto-planting.
    #[serde(default = "default_true")]
    pub auto_plant_default: bool,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            width: default_farm_side(),
            height: default_farm_side(),
            auto_plant_default: true,
        }
    }
}

/// Economy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Balance at session start.
    #[serde(default = "default_starting_money")]
    pub starting_money: Decimal,

    /// Per-upgrade cost overrides; upgrades not listed keep their stock
    /// terms.
    #[serde(default)]
    pub upgrades: BTreeMap<UpgradeType, UpgradeTerms>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_money: default_starting_money(),
            upgrades: BTreeMap::new(),
        }
    }
}

/// Growth and automation timing, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PacingConfig {
    /// Growth duration with no growth upgrades.
    #[serde(default = "default_base_growth_time_ms")]
    pub base_growth_time_ms: Decimal,

    /// Multiplier per level of fertilizer, soil, and irrigation.
    #[serde(default = "default_growth_reduction")]
    pub growth_reduction_per_level: Decimal,

    /// Auto-harvest interval before harvester upgrades.
    #[serde(default = "default_auto_harvest_interval_ms")]
    pub auto_harvest_base_interval_ms: Decimal,

    /// Auto-plant interval before planter upgrades.
    #[serde(default = "default_auto_plant_interval_ms")]
    pub auto_plant_base_interval_ms: Decimal,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            base_growth_time_ms: default_base_growth_time_ms(),
            growth_reduction_per_level: default_growth_reduction(),
            auto_harvest_base_interval_ms: default_auto_harvest_interval_ms(),
            auto_plant_base_interval_ms: default_auto_plant_interval_ms(),
        }
    }
}

/// One crop catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CropConfig {
    /// Display name.
    pub name: String,
    /// Payout per harvest before the crop multiplier.
    pub base_value: Decimal,
    /// One-time unlock cost.
    #[serde(default)]
    pub unlock_cost: Decimal,
    /// Cost per planting.
    #[serde(default)]
    pub plant_cost: Decimal,
    /// Whether the crop starts unlocked.
    #[serde(default)]
    pub unlocked: bool,
}

impl CropConfig {
    fn to_definition(&self) -> CropDefinition {
        CropDefinition::new(
            self.name.clone(),
            self.base_value,
            self.unlock_cost,
            self.plant_cost,
            self.unlocked,
        )
    }
}

/// Runner frame loop configuration.
///
/// A value of 0 for either bound means unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunnerConfig {
    /// Real-time milliseconds between frames.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Stop after this many frames (0 = unlimited).
    #[serde(default)]
    pub max_frames: u64,

    /// Stop after this many wall-clock seconds (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            max_frames: 0,
            max_real_time_seconds: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Override the level with `IDLEFARM_LOG_LEVEL` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(LOG_LEVEL_ENV) {
            self.level = val;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_farm_side() -> u32 {
    3
}

const fn default_true() -> bool {
    true
}

fn default_starting_money() -> Decimal {
    Decimal::from(20_u32)
}

fn default_base_growth_time_ms() -> Decimal {
    PacingModel::default().base_growth_time_ms
}

fn default_growth_reduction() -> Decimal {
    PacingModel::default().growth_reduction_per_level
}

fn default_auto_harvest_interval_ms() -> Decimal {
    PacingModel::default().auto_harvest_base_interval_ms
}

fn default_auto_plant_interval_ms() -> Decimal {
    PacingModel::default().auto_plant_base_interval_ms
}

fn default_crops() -> Vec<CropConfig> {
    CropCatalog::default()
        .iter()
        .map(|(_, crop)| CropConfig {
            name: crop.name().to_owned(),
            base_value: crop.base_value(),
            unlock_cost: crop.unlock_cost(),
            plant_cost: crop.plant_cost(),
            unlocked: crop.is_unlocked(),
        })
        .collect()
}

const fn default_frame_interval_ms() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_owned()
}
