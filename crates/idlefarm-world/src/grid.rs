//! The farm grid: a fixed-size rectangle of plots.
//!
//! [`FarmGrid`] owns every [`Plot`]. It holds exactly `width * height`
//! plots, one per coordinate, contiguous from `(0, 0)`. Plots are keyed by
//! [`GridCoord`], whose ordering is row-major, so every iteration visits
//! plots `y` outer, `x` inner.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, info};

use idlefarm_ledger::{CropCatalog, EconomyLedger, LedgerError};
use idlefarm_types::{FarmDimensions, GridAxis, GridCoord, PlotState, PlotView, Timestamp};

use crate::error::WorldError;
use crate::plot::Plot;

/// Largest number of plots a farm may hold.
pub const MAX_PLOTS: u32 = 4_096;

/// Coordinates added and removed by a [`FarmGrid::resize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeSummary {
    /// Size before the resize.
    pub from: FarmDimensions,
    /// Size after the resize.
    pub to: FarmDimensions,
    /// New empty plots, in row-major order.
    pub added: Vec<GridCoord>,
    /// Plots that fell outside the new bounds, in row-major order.
    pub dropped: Vec<GridCoord>,
}

/// Totals from harvesting many plots at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestReport {
    /// Number of plots harvested.
    pub plots: u32,
    /// Sum of the payouts, already deposited.
    pub payout: Decimal,
}

/// Rectangular grid of plots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarmGrid {
    dimensions: FarmDimensions,
    plots: BTreeMap<GridCoord, Plot>,
    /// Auto-plant flag given to newly created plots.
    default_auto_plant: bool,
}

impl FarmGrid {
    /// Create a grid of empty plots.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if either side is zero or
    /// the plot count exceeds [`MAX_PLOTS`].
    pub fn new(width: u32, height: u32, default_auto_plant: bool) -> Result<Self, WorldError> {
        let dimensions = checked_dimensions(width, height)?;
        let plots = coords(dimensions)
            .map(|coord| (coord, Plot::new(coord, default_auto_plant)))
            .collect();
        Ok(Self {
            dimensions,
            plots,
            default_auto_plant,
        })
    }

    /// Current width and height.
    pub const fn dimensions(&self) -> FarmDimensions {
        self.dimensions
    }

    /// Number of plots.
    pub fn len(&self) -> usize {
        self.plots.len()
    }

    /// Whether the grid has no plots (never true for a constructed grid).
    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    /// Plot at `(x, y)`, if inside the grid.
    pub fn get(&self, x: u32, y: u32) -> Option<&Plot> {
        self.plots.get(&GridCoord::new(x, y))
    }

    /// Mutable plot at `(x, y)`, if inside the grid.
    pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut Plot> {
        self.plots.get_mut(&GridCoord::new(x, y))
    }

    /// Plot at `(x, y)`, or an out-of-bounds error.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CoordinateOutOfBounds`] if `(x, y)` is outside
    /// the grid.
    pub fn plot(&self, x: u32, y: u32) -> Result<&Plot, WorldError> {
        let dimensions = self.dimensions;
        self.get(x, y).ok_or(WorldError::CoordinateOutOfBounds {
            coord: GridCoord::new(x, y),
            dimensions,
        })
    }

    /// Mutable plot at `(x, y)`, or an out-of-bounds error.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CoordinateOutOfBounds`] if `(x, y)` is outside
    /// the grid.
    pub fn plot_mut(&mut self, x: u32, y: u32) -> Result<&mut Plot, WorldError> {
        let dimensions = self.dimensions;
        self.get_mut(x, y).ok_or(WorldError::CoordinateOutOfBounds {
            coord: GridCoord::new(x, y),
            dimensions,
        })
    }

    /// Iterate over plots in row-major order.
    pub fn plots(&self) -> impl Iterator<Item = &Plot> {
        self.plots.values()
    }

    /// Call `f` on every plot in row-major order.
    pub fn for_each_plot<F: FnMut(&Plot)>(&self, f: F) {
        self.plots.values().for_each(f);
    }

    /// Number of plots currently in `state`.
    pub fn count_in_state(&self, state: PlotState) -> usize {
        self.plots.values().filter(|p| p.state() == state).count()
    }

    /// Snapshots of every plot in row-major order.
    pub fn views(&self) -> Vec<PlotView> {
        self.plots.values().map(Plot::view).collect()
    }

    // -----------------------------------------------------------------------
    // Resizing
    // -----------------------------------------------------------------------

    /// Change the grid to `width x height`.
    ///
    /// Plots whose coordinates persist are moved over untouched. New
    /// coordinates get empty plots; coordinates outside the new bounds are
    /// dropped along with whatever was planted there.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if either side is zero or
    /// the plot count exceeds [`MAX_PLOTS`]. The grid is unchanged on error.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<ResizeSummary, WorldError> {
        let to = checked_dimensions(width, height)?;
        let from = self.dimensions;

        let mut old = core::mem::take(&mut self.plots);
        let mut added = Vec::new();
        for coord in coords(to) {
            let plot = match old.remove(&coord) {
                Some(plot) => plot,
                None => {
                    added.push(coord);
                    Plot::new(coord, self.default_auto_plant)
                }
            };
            self.plots.insert(coord, plot);
        }
        let dropped: Vec<GridCoord> = old.into_keys().collect();
        self.dimensions = to;

        info!(
            %from,
            %to,
            added = added.len(),
            dropped = dropped.len(),
            "Farm resized"
        );
        Ok(ResizeSummary {
            from,
            to,
            added,
            dropped,
        })
    }

    /// Grow the grid by one column or one row.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if the new size is too large.
    pub fn expand(&mut self, axis: GridAxis) -> Result<ResizeSummary, WorldError> {
        let to = self.expanded_dimensions(axis)?;
        self.resize(to.width, to.height)
    }

    /// The size [`expand`](Self::expand) would produce, without changing
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if the grid cannot grow
    /// along `axis`.
    pub fn expanded_dimensions(&self, axis: GridAxis) -> Result<FarmDimensions, WorldError> {
        let FarmDimensions { width, height } = self.dimensions;
        let overflow = WorldError::InvalidDimensions { width, height };
        match axis {
            GridAxis::Width => checked_dimensions(width.checked_add(1).ok_or(overflow)?, height),
            GridAxis::Height => checked_dimensions(width, height.checked_add(1).ok_or(overflow)?),
        }
    }

    // -----------------------------------------------------------------------
    // Bulk operations
    // -----------------------------------------------------------------------

    /// Ripen every plot whose growth time has elapsed. Returns how many
    /// plots became ready.
    pub fn update_all(&mut self, now: Timestamp, effective_growth_time_ms: Decimal) -> u32 {
        let mut ripened: u32 = 0;
        for plot in self.plots.values_mut() {
            if plot.update(now, effective_growth_time_ms) {
                ripened = ripened.saturating_add(1);
            }
        }
        ripened
    }

    /// Harvest every ready plot, depositing each payout.
    ///
    /// The total equals the sum of harvesting the same plots one by one,
    /// queued replants included, and no plot is left ready afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first harvest error. Plots harvested before it keep
    /// their payouts.
    pub fn harvest_all(
        &mut self,
        catalog: &CropCatalog,
        ledger: &mut EconomyLedger,
        now: Timestamp,
    ) -> Result<HarvestReport, WorldError> {
        let mut report = HarvestReport::default();
        for plot in self.plots.values_mut() {
            if plot.state() != PlotState::Ready {
                continue;
            }
            let payout = plot.harvest(catalog, ledger, now)?;
            report.plots = report.plots.saturating_add(1);
            report.payout = report
                .payout
                .checked_add(payout)
                .ok_or(LedgerError::ArithmeticOverflow {
                    context: "harvest total",
                })?;
        }
        if report.plots > 0 {
            debug!(plots = report.plots, payout = %report.payout, "Harvested all ready plots");
        }
        Ok(report)
    }

    /// Plant each empty plot accepted by `filter` with its last crop.
    ///
    /// Plots are visited in row-major order, so when money runs out the
    /// earliest plots get planted. Returns how many plots were planted.
    ///
    /// # Errors
    ///
    /// Returns the first planting error.
    pub fn replant_empty<F>(
        &mut self,
        catalog: &CropCatalog,
        ledger: &mut EconomyLedger,
        now: Timestamp,
        mut filter: F,
    ) -> Result<u32, WorldError>
    where
        F: FnMut(&Plot) -> bool,
    {
        let mut planted: u32 = 0;
        for plot in self.plots.values_mut() {
            if plot.state() != PlotState::Empty || !filter(&*plot) {
                continue;
            }
            let crop_index = plot.last_crop_index();
            if plot.plant(crop_index, catalog, ledger, now)? {
                planted = planted.saturating_add(1);
            }
        }
        Ok(planted)
    }
}

fn checked_dimensions(width: u32, height: u32) -> Result<FarmDimensions, WorldError> {
    let dimensions = FarmDimensions { width, height };
    if width == 0 || height == 0 || dimensions.plot_count().is_none_or(|n| n > MAX_PLOTS) {
        return Err(WorldError::InvalidDimensions { width, height });
    }
    Ok(dimensions)
}

/// Every coordinate inside `dimensions`, row-major.
fn coords(dimensions: FarmDimensions) -> impl Iterator<Item = GridCoord> {
    (0..dimensions.height)
        .flat_map(move |y| (0..dimensions.width).map(move |x| GridCoord::new(x, y)))
}
