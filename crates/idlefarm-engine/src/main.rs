//! Engine binary for the idle farm economy.
//!
//! Wires the session, wall clock, command queue, and autopilot together
//! and runs the frame loop until a bound is hit or Ctrl-C is pressed.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `idlefarm-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Start the session at the current wall-clock time
//! 4. Create the command queue and the autopilot
//! 5. Install the Ctrl-C handler
//! 6. Run the frame loop
//! 7. Log the result and print the final snapshot as JSON

mod autopilot;
mod config;
mod error;

use std::path::Path;
use std::sync::Arc;

use idlefarm_core::clock::{Clock, MonotonicClock, SystemClock};
use idlefarm_core::config::DEFAULT_CONFIG_FILE;
use idlefarm_core::runner::{self, RunControl};
use idlefarm_core::session::GameSession;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::autopilot::Autopilot;
use crate::config::EngineConfig;
use crate::error::EngineError;

/// Capacity of the command queue between the autopilot and the runner.
const COMMAND_QUEUE_CAPACITY: usize = 256;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, session setup, or the run fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet; report once it is.
    let config_path = Path::new(DEFAULT_CONFIG_FILE);
    let EngineConfig {
        game: config,
        autopilot: autopilot_config,
    } = EngineConfig::load(config_path)?;

    // 2. Initialize structured logging.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    info!("idlefarm-engine starting");
    info!(
        path = %config_path.display(),
        found = config_path.exists(),
        width = config.farm.width,
        height = config.farm.height,
        starting_money = %config.economy.starting_money,
        crops = config.crops.len(),
        frame_interval_ms = config.runner.frame_interval_ms,
        "Configuration loaded"
    );

    // 3. Start the session.
    let mut clock = MonotonicClock::new(SystemClock);
    let start = clock.now();
    let mut session = GameSession::new(&config, start).map_err(EngineError::from)?;

    // 4. Command queue and autopilot.
    let (command_tx, mut command_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    info!(
        enabled = autopilot_config.enabled,
        decide_every_frames = autopilot_config.decide_every_frames,
        buy_upgrades = autopilot_config.buy_upgrades,
        "Autopilot configured"
    );
    let mut autopilot = Autopilot::new(autopilot_config, command_tx);

    // 5. Ctrl-C stops the loop before its next frame.
    let control = Arc::new(RunControl::new(&config.runner));
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping");
                    control.request_stop();
                }
                Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
            }
        });
    }

    // 6. Run.
    let result = runner::run_session(
        &mut session,
        &mut clock,
        &mut command_rx,
        &control,
        &mut autopilot,
    )
    .await
    .map_err(EngineError::from)?;

    // 7. Report.
    runner::log_run_end(&result, &session);
    info!(
        end_reason = ?result.end_reason,
        total_frames = result.total_frames,
        autopilot_commands = autopilot.commands_sent(),
        "idlefarm-engine shutdown complete"
    );

    let snapshot = serde_json::to_string_pretty(&session.snapshot()).map_err(EngineError::from)?;
    println!("{snapshot}");

    Ok(())
}
