//! The tick scheduler: growth and automation on every frame.
//!
//! Each call to [`TickScheduler::tick`] runs three steps in order:
//!
//! 1. **Growth** -- every plot is advanced against the ledger's effective
//!    growth time.
//! 2. **Auto-harvest** -- if bought and switched on, and at least one
//!    auto-harvest interval has elapsed since the last sweep, every ready
//!    plot is harvested.
//! 3. **Auto-plant** -- if bought, and at least one auto-plant interval has
//!    elapsed since the last sweep, every empty plot that allows it is
//!    planted with its last crop.
//!
//! Gating is strict elapsed time against the timestamp of the last sweep.
//! A sweep that fires records `now` even if it did nothing, so back-to-back
//! ticks inside an interval only run the growth step.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use idlefarm_ledger::{CropCatalog, EconomyLedger};
use idlefarm_types::Timestamp;
use idlefarm_world::{FarmGrid, Plot, WorldError};

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    /// The timestamp the tick ran at.
    pub now: Timestamp,
    /// Plots that became ready this tick.
    pub ripened: u32,
    /// Whether the auto-harvest sweep ran.
    pub auto_harvest_fired: bool,
    /// Plots harvested by the sweep.
    pub auto_harvested: u32,
    /// Money earned by the sweep.
    pub auto_harvest_payout: Decimal,
    /// Whether the auto-plant sweep ran.
    pub auto_plant_fired: bool,
    /// Plots planted by the sweep.
    pub auto_planted: u32,
}

/// Last-fired timestamps for the growth and automation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickScheduler {
    last_update: Timestamp,
    last_auto_harvest: Timestamp,
    last_auto_plant: Timestamp,
}

impl TickScheduler {
    /// Create a scheduler whose timers all start at `start`.
    pub const fn new(start: Timestamp) -> Self {
        Self {
            last_update: start,
            last_auto_harvest: start,
            last_auto_plant: start,
        }
    }

    /// Timestamp of the most recent tick.
    pub const fn last_update(&self) -> Timestamp {
        self.last_update
    }

    /// Timestamp of the most recent auto-harvest sweep.
    pub const fn last_auto_harvest(&self) -> Timestamp {
        self.last_auto_harvest
    }

    /// Timestamp of the most recent auto-plant sweep.
    pub const fn last_auto_plant(&self) -> Timestamp {
        self.last_auto_plant
    }

    /// Advance the farm to `now`.
    ///
    /// # Errors
    ///
    /// Returns the first plot error from a sweep. Growth has already been
    /// applied when that happens.
    pub fn tick(
        &mut self,
        now: Timestamp,
        grid: &mut FarmGrid,
        catalog: &CropCatalog,
        ledger: &mut EconomyLedger,
    ) -> Result<TickSummary, WorldError> {
        let mut summary = TickSummary {
            now,
            ..TickSummary::default()
        };

        summary.ripened = grid.update_all(now, ledger.effective_growth_time());
        self.last_update = now;

        if ledger.auto_harvest_unlocked()
            && ledger.auto_harvest_enabled()
            && interval_elapsed(now, self.last_auto_harvest, ledger.auto_harvest_interval())
        {
            let report = grid.harvest_all(catalog, ledger, now)?;
            self.last_auto_harvest = now;
            summary.auto_harvest_fired = true;
            summary.auto_harvested = report.plots;
            summary.auto_harvest_payout = report.payout;
            debug!(%now, plots = report.plots, payout = %report.payout, "Auto-harvest sweep");
        }

        if ledger.auto_plant_unlocked()
            && interval_elapsed(now, self.last_auto_plant, ledger.auto_plant_interval())
        {
            let planted = grid.replant_empty(catalog, ledger, now, Plot::auto_plant_enabled)?;
            self.last_auto_plant = now;
            summary.auto_plant_fired = true;
            summary.auto_planted = planted;
            debug!(%now, planted, "Auto-plant sweep");
        }

        Ok(summary)
    }
}

fn interval_elapsed(now: Timestamp, last: Timestamp, interval_ms: Decimal) -> bool {
    Decimal::from(now.elapsed_since(last)) >= interval_ms
}
