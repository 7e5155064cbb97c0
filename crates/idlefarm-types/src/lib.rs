//! Shared type definitions for the idle farm economy engine.
//!
//! This crate is the single source of truth for the value types that cross
//! crate boundaries and the views handed to the presentation layer. View
//! types flow downstream to `TypeScript` via `ts-rs` for the browser front
//! end.
//!
//! # Modules
//!
//! - [`time`] -- Millisecond [`Timestamp`] on the session clock
//! - [`enums`] -- Plot states, upgrade kinds, grid axes
//! - [`structs`] -- Grid coordinates and read-only view snapshots

pub mod enums;
pub mod structs;
pub mod time;

// Re-export all public types at crate root for convenience.
pub use enums::{GridAxis, PlotState, UpgradeType};
pub use structs::{
    CropView, FarmDimensions, GridCoord, PlotView, UpgradeState, UpgradeView,
};
pub use time::Timestamp;
