//! Time sources for the session.
//!
//! The engine never reads the wall clock itself. Every operation that
//! depends on time takes a [`Timestamp`], and the driver obtains those from
//! a [`Clock`]. Tests drive a [`ManualClock`]; the binary uses
//! [`SystemClock`] wrapped in a [`MonotonicClock`] so wall-clock
//! corrections never move session time backwards.

use chrono::Utc;

use idlefarm_types::Timestamp;

/// A source of millisecond timestamps.
pub trait Clock {
    /// The current time.
    fn now(&mut self) -> Timestamp;
}

/// Wall-clock time in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> Timestamp {
        let millis = Utc::now().timestamp_millis();
        // Pre-epoch clocks read as zero.
        Timestamp(u64::try_from(millis.max(0)).unwrap_or(0))
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualClock {
    now: Timestamp,
}

impl ManualClock {
    /// Create a clock reading `start`.
    pub const fn new(start: Timestamp) -> Self {
        Self { now: start }
    }

    /// Jump to `now`, forwards or backwards.
    pub const fn set(&mut self, now: Timestamp) {
        self.now = now;
    }

    /// Move forward by `millis`, saturating at the maximum timestamp.
    pub const fn advance(&mut self, millis: u64) -> Timestamp {
        self.now = self.now.saturating_add_millis(millis);
        self.now
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> Timestamp {
        self.now
    }
}

/// Wraps another clock so readings never decrease.
///
/// A reading earlier than the previous one is replaced by the previous one.
#[derive(Debug, Clone, Default)]
pub struct MonotonicClock<C> {
    inner: C,
    last: Timestamp,
}

impl<C: Clock> MonotonicClock<C> {
    /// Wrap `inner`.
    pub const fn new(inner: C) -> Self {
        Self {
            inner,
            last: Timestamp::ZERO,
        }
    }

    /// The wrapped clock.
    pub const fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}

impl<C: Clock> Clock for MonotonicClock<C> {
    fn now(&mut self) -> Timestamp {
        let reading = self.inner.now();
        if reading > self.last {
            self.last = reading;
        }
        self.last
    }
}
