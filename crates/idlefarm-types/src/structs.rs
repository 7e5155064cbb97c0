//! Read-only view structs handed to the presentation layer.
//!
//! These are snapshots: the engine builds them on demand and never reads
//! them back. They derive `TS` so the web front end can import generated
//! bindings instead of hand-maintaining mirror types.

use core::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{PlotState, UpgradeType};
use crate::time::Timestamp;

// ---------------------------------------------------------------------------
// GridCoord
// ---------------------------------------------------------------------------

/// A plot coordinate on the farm grid.
///
/// Ordering is row-major (`y` first, then `x`), so a `BTreeMap` keyed by
/// `GridCoord` iterates plots in the same order the farm is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GridCoord {
    /// Column, starting at 0 on the left.
    pub x: u32,
    /// Row, starting at 0 at the top.
    pub y: u32,
}

impl GridCoord {
    /// Create a coordinate.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl Ord for GridCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for GridCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl core::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// FarmDimensions
// ---------------------------------------------------------------------------

/// Width and height of the farm grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FarmDimensions {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl FarmDimensions {
    /// Total number of plots, or `None` if `width * height` overflows.
    pub const fn plot_count(self) -> Option<u32> {
        self.width.checked_mul(self.height)
    }

    /// Whether `coord` lies inside these bounds.
    pub const fn contains(self, coord: GridCoord) -> bool {
        coord.x < self.width && coord.y < self.height
    }
}

impl core::fmt::Display for FarmDimensions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// PlotView
// ---------------------------------------------------------------------------

/// Snapshot of a single plot for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlotView {
    /// Where the plot sits on the grid.
    pub coord: GridCoord,
    /// Current lifecycle state.
    pub state: PlotState,
    /// Catalog index of the planted crop, if any.
    pub crop_index: Option<usize>,
    /// Display name of the planted crop, if any.
    pub crop_name: Option<String>,
    /// When the current crop was planted, if any.
    pub planted_at: Option<Timestamp>,
    /// Crop used by auto-plant and replant-all.
    pub last_crop_index: usize,
    /// Whether the auto-planter may plant here.
    pub auto_plant_enabled: bool,
    /// Crop to plant immediately after the next harvest.
    pub queued_crop_index: Option<usize>,
}

// ---------------------------------------------------------------------------
// CropView
// ---------------------------------------------------------------------------

/// Snapshot of one crop catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CropView {
    /// Position in the catalog (stable for the session).
    pub index: usize,
    /// Display name.
    pub name: String,
    /// Payout per harvest before the crop multiplier.
    #[ts(as = "String")]
    pub base_value: Decimal,
    /// One-time cost to make the crop plantable.
    #[ts(as = "String")]
    pub unlock_cost: Decimal,
    /// Cost charged each time the crop is planted.
    #[ts(as = "String")]
    pub plant_cost: Decimal,
    /// Whether the crop can be planted.
    pub unlocked: bool,
}

// ---------------------------------------------------------------------------
// UpgradeView / UpgradeState
// ---------------------------------------------------------------------------

/// Shop entry for a single upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UpgradeView {
    /// Which upgrade this is.
    pub upgrade: UpgradeType,
    /// Current level (0 or 1 for unlock upgrades).
    pub level: u32,
    /// Price of the next purchase.
    #[ts(as = "String")]
    pub cost: Decimal,
    /// Multiplier applied to `cost` after each purchase.
    #[ts(as = "String")]
    pub growth_factor: Decimal,
    /// Whether another purchase is possible at all (false once an unlock
    /// upgrade is owned).
    pub purchasable: bool,
}

/// Full economy snapshot: money, levels, costs, and automation flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UpgradeState {
    /// Current balance.
    #[ts(as = "String")]
    pub money: Decimal,
    /// One entry per upgrade, in shop order.
    pub upgrades: Vec<UpgradeView>,
    /// Whether auto-harvest has been bought.
    pub auto_harvest_unlocked: bool,
    /// Whether auto-harvest is currently switched on.
    pub auto_harvest_enabled: bool,
    /// Whether auto-plant has been bought.
    pub auto_plant_unlocked: bool,
    /// Growth duration after all reductions, in milliseconds.
    #[ts(as = "String")]
    pub effective_growth_time_ms: Decimal,
}

impl UpgradeState {
    /// Look up the view for one upgrade.
    pub fn get(&self, upgrade: UpgradeType) -> Option<&UpgradeView> {
        self.upgrades.iter().find(|view| view.upgrade == upgrade)
    }
}
