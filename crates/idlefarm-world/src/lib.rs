//! Plots and the farm grid for the idle farm economy engine.
//!
//! This crate models the physical farm: a rectangle of plots, each cycling
//! through `Empty -> Growing -> Ready -> Empty`. Money never moves here on
//! its own; planting and harvesting go through the
//! [`EconomyLedger`](idlefarm_ledger::EconomyLedger) passed in by the
//! caller.
//!
//! # Modules
//!
//! - [`error`] -- Error types for plot and grid operations.
//! - [`plot`] -- The [`Plot`] state machine: plant, ripen, harvest, queued
//!   replant, growth progress.
//! - [`grid`] -- The [`FarmGrid`]: row-major plot storage, resize with
//!   preservation, and bulk update/harvest/replant.

pub mod error;
pub mod grid;
pub mod plot;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use grid::{FarmGrid, HarvestReport, MAX_PLOTS, ResizeSummary};
pub use plot::{PlantedCrop, Plot};
