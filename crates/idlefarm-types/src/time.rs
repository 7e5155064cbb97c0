//! Millisecond timestamps on the session clock.
//!
//! The engine never reads wall-clock time itself. Every operation that cares
//! about time receives a [`Timestamp`] from the caller, which in turn pulls
//! it from a clock once per tick.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A point in time, in milliseconds, on the session's monotonic clock.
///
/// The epoch is whatever the clock chooses (Unix epoch for the system
/// clock, zero for manual test clocks). Only differences between two
/// timestamps carry meaning for the engine.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// The zero timestamp.
    pub const ZERO: Self = Self(0);

    /// Create a timestamp from a millisecond count.
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Return the millisecond count.
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`.
    ///
    /// Saturates at zero when `earlier` is actually later than `self`, so a
    /// stale or reordered timestamp never produces a huge elapsed value.
    pub const fn elapsed_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Return a timestamp `millis` later, saturating at `u64::MAX`.
    #[must_use]
    pub const fn saturating_add_millis(self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }
}

impl core::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

impl From<u64> for Timestamp {
    fn from(millis: u64) -> Self {
        Self(millis)
    }
}
