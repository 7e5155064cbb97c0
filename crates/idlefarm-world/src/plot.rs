//! The plot state machine: planting, growth, and harvest.
//!
//! A [`Plot`] moves through `Empty -> Growing -> Ready -> Empty` and nothing
//! else. The planted crop and its planting time live inside the `Growing`
//! and `Ready` variants, so a plot can never report a crop while empty or
//! lose its crop while growing.
//!
//! Growth is purely time based. A plot does not ripen on its own; the
//! caller advances it with [`Plot::update`] and the effective growth time
//! supplied by the ledger.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug;

use idlefarm_ledger::{CropCatalog, EconomyLedger};
use idlefarm_types::{GridCoord, PlotState, PlotView, Timestamp};

use crate::error::WorldError;

// ---------------------------------------------------------------------------
// PlantedCrop
// ---------------------------------------------------------------------------

/// A crop in the ground, captured at planting time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantedCrop {
    /// Catalog index of the crop.
    pub crop_index: usize,
    /// Display name at planting time.
    pub name: String,
    /// Harvest value before the crop multiplier.
    pub base_value: Decimal,
    /// When the crop went into the ground.
    pub planted_at: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
enum Growth {
    #[default]
    Empty,
    Growing(PlantedCrop),
    Ready(PlantedCrop),
}

// ---------------------------------------------------------------------------
// Plot
// ---------------------------------------------------------------------------

/// One cell of the farm grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plot {
    coord: GridCoord,
    growth: Growth,
    /// Crop used by auto-plant and replant-all. Updated only by a
    /// successful plant.
    last_crop_index: usize,
    auto_plant_enabled: bool,
    queued_crop_index: Option<usize>,
}

impl Plot {
    /// Create an empty plot at `coord`.
    pub const fn new(coord: GridCoord, auto_plant_enabled: bool) -> Self {
        Self {
            coord,
            growth: Growth::Empty,
            last_crop_index: 0,
            auto_plant_enabled,
            queued_crop_index: None,
        }
    }

    /// Grid position.
    pub const fn coord(&self) -> GridCoord {
        self.coord
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> PlotState {
        match self.growth {
            Growth::Empty => PlotState::Empty,
            Growth::Growing(_) => PlotState::Growing,
            Growth::Ready(_) => PlotState::Ready,
        }
    }

    /// The crop in the ground, if any.
    pub const fn crop(&self) -> Option<&PlantedCrop> {
        match &self.growth {
            Growth::Empty => None,
            Growth::Growing(crop) | Growth::Ready(crop) => Some(crop),
        }
    }

    /// When the current crop was planted, if any.
    pub fn planted_at(&self) -> Option<Timestamp> {
        self.crop().map(|crop| crop.planted_at)
    }

    /// Crop index used by auto-plant and replant-all.
    pub const fn last_crop_index(&self) -> usize {
        self.last_crop_index
    }

    /// Whether the auto-planter may plant here.
    pub const fn auto_plant_enabled(&self) -> bool {
        self.auto_plant_enabled
    }

    /// Crop queued to be planted right after the next harvest.
    pub const fn queued_crop_index(&self) -> Option<usize> {
        self.queued_crop_index
    }

    /// Allow or forbid the auto-planter on this plot.
    pub const fn set_auto_plant(&mut self, enabled: bool) {
        self.auto_plant_enabled = enabled;
    }

    /// Queue `crop_index` to be planted immediately after the next harvest.
    ///
    /// Replaces any previous queue entry. Whether the crop is unlocked and
    /// affordable is checked when the replant happens, not here.
    ///
    /// # Errors
    ///
    /// Returns an invalid crop index error if `crop_index` is not in the
    /// catalog.
    pub fn queue_crop(
        &mut self,
        crop_index: usize,
        catalog: &CropCatalog,
    ) -> Result<(), WorldError> {
        catalog.require(crop_index)?;
        self.queued_crop_index = Some(crop_index);
        Ok(())
    }

    /// Drop the queued crop, if any.
    pub const fn clear_queue(&mut self) {
        self.queued_crop_index = None;
    }

    /// Plant `crop_index` at `now`, paying its plant cost.
    ///
    /// Returns `Ok(false)` without side effects if the plot is not empty,
    /// the crop is locked, or the ledger cannot cover the cost.
    ///
    /// # Errors
    ///
    /// Returns an invalid crop index error for an index outside the
    /// catalog, whatever the plot's state.
    pub fn plant(
        &mut self,
        crop_index: usize,
        catalog: &CropCatalog,
        ledger: &mut EconomyLedger,
        now: Timestamp,
    ) -> Result<bool, WorldError> {
        let crop = catalog.require(crop_index)?;

        if !matches!(self.growth, Growth::Empty) || !crop.is_unlocked() {
            return Ok(false);
        }
        if !ledger.withdraw(crop.plant_cost())? {
            debug!(coord = %self.coord, crop = crop.name(), "Plant not affordable");
            return Ok(false);
        }

        self.growth = Growth::Growing(PlantedCrop {
            crop_index,
            name: crop.name().to_owned(),
            base_value: crop.base_value(),
            planted_at: now,
        });
        self.last_crop_index = crop_index;
        Ok(true)
    }

    /// Ripen a growing crop whose growth time has elapsed by `now`.
    ///
    /// Returns `true` only on the `Growing -> Ready` transition. Calling it
    /// again on a ready plot changes nothing.
    pub fn update(&mut self, now: Timestamp, effective_growth_time_ms: Decimal) -> bool {
        let Growth::Growing(crop) = &self.growth else {
            return false;
        };
        let elapsed = Decimal::from(now.elapsed_since(crop.planted_at));
        if elapsed < effective_growth_time_ms {
            return false;
        }

        let growth = core::mem::take(&mut self.growth);
        if let Growth::Growing(crop) = growth {
            self.growth = Growth::Ready(crop);
        }
        true
    }

    /// Harvest a ready crop and credit the payout to `ledger`.
    ///
    /// The payout is `base_value * crop level`. It is deposited before the
    /// queued crop (if any) is replanted, so the replant can be paid for
    /// from it. The queue is cleared whether or not the replant succeeds.
    /// Returns the payout for reporting; callers must not deposit it again.
    /// Returns zero without side effects if the plot is not ready.
    ///
    /// # Errors
    ///
    /// Returns a ledger error if the payout overflows.
    pub fn harvest(
        &mut self,
        catalog: &CropCatalog,
        ledger: &mut EconomyLedger,
        now: Timestamp,
    ) -> Result<Decimal, WorldError> {
        let Growth::Ready(crop) = &self.growth else {
            return Ok(Decimal::ZERO);
        };

        let payout = ledger.harvest_payout(crop.base_value)?;
        ledger.deposit(payout)?;
        self.growth = Growth::Empty;

        if let Some(queued) = self.queued_crop_index.take() {
            let replanted = self.plant(queued, catalog, ledger, now)?;
            debug!(coord = %self.coord, crop_index = queued, replanted, "Queued replant");
        }

        Ok(payout)
    }

    /// Fraction of the growth time elapsed, in `[0, 1]`.
    ///
    /// Zero for empty and ready plots. Only meant for drawing progress.
    pub fn growth_progress(&self, now: Timestamp, effective_growth_time_ms: Decimal) -> f64 {
        let Growth::Growing(crop) = &self.growth else {
            return 0.0;
        };
        let elapsed = Decimal::from(now.elapsed_since(crop.planted_at));
        elapsed
            .checked_div(effective_growth_time_ms)
            .map_or(1.0, |ratio| {
                ratio.clamp(Decimal::ZERO, Decimal::ONE).to_f64().unwrap_or(0.0)
            })
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> PlotView {
        let crop = self.crop();
        PlotView {
            coord: self.coord,
            state: self.state(),
            crop_index: crop.map(|c| c.crop_index),
            crop_name: crop.map(|c| c.name.clone()),
            planted_at: crop.map(|c| c.planted_at),
            last_crop_index: self.last_crop_index,
            auto_plant_enabled: self.auto_plant_enabled,
            queued_crop_index: self.queued_crop_index,
        }
    }
}
