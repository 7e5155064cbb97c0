//! Frame loop runner with a command queue and run bounds.
//!
//! [`run_session`] owns the session for the duration of a run. Each frame
//! it:
//!
//! 1. Waits for the next frame interval.
//! 2. Reads the clock.
//! 3. Drains every queued [`Command`] and applies it at that timestamp.
//! 4. Ticks the session and notifies the [`FrameCallback`].
//!
//! Player input arrives on a `tokio::sync::mpsc` channel, so a UI task never
//! touches the session directly and every mutation is serialized on the
//! runner's task. A malformed command is logged and skipped; a failing tick
//! ends the run with an error.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::time::{Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::command::Command;
use crate::config::RunnerConfig;
use crate::scheduler::TickSummary;
use crate::session::{GameSession, SessionError};

/// Errors that can end a run early.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A session tick failed.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: SessionError,
    },
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEndReason {
    /// Reached the configured frame limit.
    MaxFramesReached,
    /// Reached the configured wall-clock limit.
    MaxRealTimeReached,
    /// [`RunControl::request_stop`] was called.
    StopRequested,
}

/// Result of a run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Why the run ended.
    pub end_reason: RunEndReason,
    /// The last frame's tick summary, if any frame ran.
    pub final_summary: Option<TickSummary>,
    /// Frames executed.
    pub total_frames: u64,
    /// Commands applied without error.
    pub commands_applied: u64,
    /// Commands rejected as malformed.
    pub commands_failed: u64,
}

/// Callback invoked after each frame.
pub trait FrameCallback: Send {
    /// Called after a frame's tick completes.
    fn on_frame(&mut self, summary: &TickSummary, session: &GameSession);
}

/// A callback that does nothing.
pub struct NoOpCallback;

impl FrameCallback for NoOpCallback {
    fn on_frame(&mut self, _summary: &TickSummary, _session: &GameSession) {}
}

/// Shared stop flag and run bounds.
///
/// Share it behind an `Arc` to stop a run from another task.
#[derive(Debug)]
pub struct RunControl {
    stop_requested: AtomicBool,
    started_at: DateTime<Utc>,
    frame_interval_ms: u64,
    max_frames: u64,
    max_real_time_seconds: u64,
}

impl RunControl {
    /// Create control state from configuration. Bounds of 0 mean unlimited;
    /// a zero frame interval is raised to 1ms.
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            started_at: Utc::now(),
            frame_interval_ms: config.frame_interval_ms.max(1),
            max_frames: config.max_frames,
            max_real_time_seconds: config.max_real_time_seconds,
        }
    }

    /// Ask the runner to stop before its next frame.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Real-time milliseconds between frames.
    pub const fn frame_interval_ms(&self) -> u64 {
        self.frame_interval_ms
    }

    /// Whether `frames` has reached the frame limit.
    pub const fn frame_limit_reached(&self, frames: u64) -> bool {
        self.max_frames > 0 && frames >= self.max_frames
    }

    /// Whether the wall-clock limit has been reached.
    pub fn time_limit_reached(&self) -> bool {
        self.max_real_time_seconds > 0 && self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Seconds since the control state was created.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }
}

/// Run `session` until a bound is reached or a stop is requested.
///
/// # Errors
///
/// Returns [`RunnerError::Session`] if a tick fails.
pub async fn run_session<C: Clock>(
    session: &mut GameSession,
    clock: &mut C,
    commands: &mut mpsc::Receiver<Command>,
    control: &RunControl,
    callback: &mut dyn FrameCallback,
) -> Result<RunResult, RunnerError> {
    let mut result = RunResult {
        end_reason: RunEndReason::StopRequested,
        final_summary: None,
        total_frames: 0,
        commands_applied: 0,
        commands_failed: 0,
    };
    let mut commands_open = true;

    let mut interval = tokio::time::interval(Duration::from_millis(control.frame_interval_ms()));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        frame_interval_ms = control.frame_interval_ms(),
        max_frames = control.max_frames,
        max_real_time_seconds = control.max_real_time_seconds,
        "Runner starting"
    );

    loop {
        if control.is_stop_requested() {
            info!("Stop requested");
            result.end_reason = RunEndReason::StopRequested;
            return Ok(result);
        }
        if control.time_limit_reached() {
            info!(elapsed = control.elapsed_seconds(), "Real-time limit reached");
            result.end_reason = RunEndReason::MaxRealTimeReached;
            return Ok(result);
        }

        interval.tick().await;
        let now = clock.now();

        while commands_open {
            match commands.try_recv() {
                Ok(command) => match session.apply(command, now) {
                    Ok(outcome) => {
                        debug!(?command, ?outcome, "Command applied");
                        result.commands_applied = result.commands_applied.saturating_add(1);
                    }
                    Err(e) => {
                        warn!(?command, error = %e, "Command rejected");
                        result.commands_failed = result.commands_failed.saturating_add(1);
                    }
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("Command channel closed");
                    commands_open = false;
                }
            }
        }

        let summary = session.tick(now)?;
        result.total_frames = result.total_frames.saturating_add(1);
        callback.on_frame(&summary, session);
        result.final_summary = Some(summary);

        if control.frame_limit_reached(result.total_frames) {
            info!(frames = result.total_frames, "Frame limit reached");
            result.end_reason = RunEndReason::MaxFramesReached;
            return Ok(result);
        }
    }
}

/// Log how a run ended.
pub fn log_run_end(result: &RunResult, session: &GameSession) {
    info!(
        reason = ?result.end_reason,
        frames = result.total_frames,
        commands_applied = result.commands_applied,
        commands_failed = result.commands_failed,
        money = %session.money(),
        dimensions = %session.farm_dimensions(),
        "Run ended"
    );
    if result.final_summary.is_none() {
        warn!("Run ended with no frames executed");
    }
}
