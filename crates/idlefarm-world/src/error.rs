//! Error types for the `idlefarm-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`]. Unmet game
//! preconditions (planting on an occupied plot, harvesting an unripe one)
//! are not errors; they come back as `false` or a zero payout.

use idlefarm_ledger::LedgerError;
use idlefarm_types::{FarmDimensions, GridCoord};

/// Errors that can occur during plot and grid operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A coordinate lies outside the current grid.
    #[error("coordinate {coord} is outside the {dimensions} farm")]
    CoordinateOutOfBounds {
        /// The requested coordinate.
        coord: GridCoord,
        /// The grid's current size.
        dimensions: FarmDimensions,
    },

    /// A grid was given a zero or overflowing size.
    #[error("invalid farm dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// A ledger or catalog operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
