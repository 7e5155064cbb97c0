//! Enumeration types for the idle farm engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Plot state
// ---------------------------------------------------------------------------

/// Lifecycle state of a single farm plot.
///
/// The only legal transitions are `Empty -> Growing -> Ready -> Empty`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum PlotState {
    /// Nothing planted; the plot can accept a crop.
    #[default]
    Empty,
    /// A crop is planted and has not yet reached its growth time.
    Growing,
    /// The crop is mature and can be harvested.
    Ready,
}

// ---------------------------------------------------------------------------
// Upgrade types
// ---------------------------------------------------------------------------

/// Every purchasable upgrade in the economy.
///
/// Most upgrades are leveled (each purchase increments a counter). The two
/// automation unlocks are one-shot flags: once bought they cannot be bought
/// again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum UpgradeType {
    /// Expands the farm by one row or column.
    Property,
    /// Shortens the auto-harvest interval.
    Harvester,
    /// Shortens the auto-plant interval.
    Planter,
    /// Multiplies harvest payouts.
    Crop,
    /// Reduces growth time by 15% per level.
    Fertilizer,
    /// Reduces growth time by 15% per level.
    Soil,
    /// Reduces growth time by 15% per level.
    Irrigation,
    /// Unlocks automatic planting.
    AutoPlant,
    /// Unlocks automatic harvesting.
    AutoHarvest,
}

impl UpgradeType {
    /// All upgrade types in shop display order.
    pub const ALL: [Self; 9] = [
        Self::Property,
        Self::Harvester,
        Self::Planter,
        Self::Crop,
        Self::Fertilizer,
        Self::Soil,
        Self::Irrigation,
        Self::AutoPlant,
        Self::AutoHarvest,
    ];

    /// Whether this upgrade is a one-shot unlock rather than a level.
    pub const fn is_unlock(self) -> bool {
        matches!(self, Self::AutoPlant | Self::AutoHarvest)
    }

    /// Whether this upgrade contributes to the growth-time reduction.
    pub const fn reduces_growth_time(self) -> bool {
        matches!(self, Self::Fertilizer | Self::Soil | Self::Irrigation)
    }

    /// Stable `snake_case` name, matching the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Property => "property",
            Self::Harvester => "harvester",
            Self::Planter => "planter",
            Self::Crop => "crop",
            Self::Fertilizer => "fertilizer",
            Self::Soil => "soil",
            Self::Irrigation => "irrigation",
            Self::AutoPlant => "auto_plant",
            Self::AutoHarvest => "auto_harvest",
        }
    }
}

impl core::fmt::Display for UpgradeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Grid axis
// ---------------------------------------------------------------------------

/// Which dimension of the farm grows on a property purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum GridAxis {
    /// Add one column.
    Width,
    /// Add one row.
    Height,
}

impl GridAxis {
    /// The axis that grows when the property level reaches `new_level`.
    ///
    /// Even levels widen the farm, odd levels deepen it.
    pub const fn for_property_level(new_level: u32) -> Self {
        if matches!(new_level.checked_rem(2), Some(0)) { Self::Width } else { Self::Height }
    }
}
