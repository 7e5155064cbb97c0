//! A scripted player that drives the farm through the command queue.
//!
//! The autopilot is a [`FrameCallback`]: after each frame it reads the
//! session and pushes [`Command`]s onto the runner's channel. The runner
//! applies them at the start of the next frame, so the autopilot never
//! mutates the session directly.
//!
//! Each decision pass, in order:
//!
//! 1. Harvest ready plots by hand until auto-harvest is running.
//! 2. Switch auto-harvest on once it has been bought.
//! 3. Unlock the next locked crop when affordable.
//! 4. Move plots onto the most valuable unlocked crop.
//! 5. Replant empty plots until auto-plant is bought.
//! 6. Buy the cheapest affordable upgrade.

use rust_decimal::Decimal;
use serde::Deserialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use idlefarm_core::command::Command;
use idlefarm_core::runner::FrameCallback;
use idlefarm_core::scheduler::TickSummary;
use idlefarm_core::session::GameSession;
use idlefarm_types::{CropView, PlotState, UpgradeView};

// -----------------------------------------------------------------------
// Configuration
// -----------------------------------------------------------------------

/// Configuration for the autopilot, read from the `autopilot` section of
/// `idlefarm-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AutopilotConfig {
    /// Whether the autopilot issues commands at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Frames between decision passes. 0 disables decisions.
    #[serde(default = "default_decide_every_frames")]
    pub decide_every_frames: u64,

    /// Frames between progress log lines. 0 disables them.
    #[serde(default = "default_report_every_frames")]
    pub report_every_frames: u64,

    /// Whether to spend money on upgrades.
    #[serde(default = "default_true")]
    pub buy_upgrades: bool,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            decide_every_frames: default_decide_every_frames(),
            report_every_frames: default_report_every_frames(),
            buy_upgrades: true,
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_decide_every_frames() -> u64 {
    10
}

const fn default_report_every_frames() -> u64 {
    100
}

// -----------------------------------------------------------------------
// Autopilot
// -----------------------------------------------------------------------

/// Frame callback that plays the game.
pub struct Autopilot {
    config: AutopilotConfig,
    commands: mpsc::Sender<Command>,
    frames: u64,
    sent: u64,
}

impl Autopilot {
    /// Create an autopilot that sends on `commands`.
    pub const fn new(config: AutopilotConfig, commands: mpsc::Sender<Command>) -> Self {
        Self {
            config,
            commands,
            frames: 0,
            sent: 0,
        }
    }

    /// Commands sent so far.
    pub const fn commands_sent(&self) -> u64 {
        self.sent
    }

    /// Decide what to do given the current session state.
    pub fn decide(&self, session: &GameSession) -> Vec<Command> {
        let mut commands = Vec::new();
        let upgrades = session.upgrade_state();
        let plots = session.plots();
        let crops = session.catalog();
        let mut budget = session.money();

        let auto_harvest_running = upgrades.auto_harvest_unlocked && upgrades.auto_harvest_enabled;
        if !auto_harvest_running && plots.iter().any(|p| p.state == PlotState::Ready) {
            commands.push(Command::HarvestAll);
        }
        if upgrades.auto_harvest_unlocked && !upgrades.auto_harvest_enabled {
            commands.push(Command::SetAutoHarvestEnabled { enabled: true });
        }

        let mut best = best_unlocked(&crops);
        if let Some(next) = crops.iter().find(|c| !c.unlocked) {
            if next.unlock_cost <= budget {
                commands.push(Command::UnlockCrop {
                    crop_index: next.index,
                });
                budget = budget.checked_sub(next.unlock_cost).unwrap_or(Decimal::ZERO);
                if best.is_none_or(|b| next.base_value > b.base_value) {
                    best = Some(next);
                }
            }
        }

        if let Some(best) = best {
            for plot in plots.iter().filter(|p| p.last_crop_index != best.index) {
                let (x, y) = (plot.coord.x, plot.coord.y);
                match plot.state {
                    PlotState::Empty => {
                        if best.plant_cost <= budget {
                            commands.push(Command::PlantAt {
                                x,
                                y,
                                crop_index: best.index,
                            });
                            budget = budget.checked_sub(best.plant_cost).unwrap_or(Decimal::ZERO);
                        }
                    }
                    PlotState::Growing | PlotState::Ready => {
                        if plot.queued_crop_index != Some(best.index) {
                            commands.push(Command::QueueCropChange {
                                x,
                                y,
                                crop_index: best.index,
                            });
                        }
                    }
                }
            }
        }

        if !upgrades.auto_plant_unlocked && plots.iter().any(|p| p.state == PlotState::Empty) {
            commands.push(Command::ReplantAll);
        }

        if self.config.buy_upgrades {
            if let Some(upgrade) = cheapest_affordable(&upgrades.upgrades, budget) {
                commands.push(Command::PurchaseUpgrade {
                    upgrade: upgrade.upgrade,
                });
            }
        }

        commands
    }

    fn send(&mut self, commands: Vec<Command>) {
        for command in commands {
            match self.commands.try_send(command) {
                Ok(()) => self.sent = self.sent.saturating_add(1),
                Err(TrySendError::Full(_)) => {
                    debug!("Command queue full, deferring to next pass");
                    return;
                }
                Err(TrySendError::Closed(_)) => {
                    warn!("Command queue closed, autopilot disabled");
                    self.config.enabled = false;
                    return;
                }
            }
        }
    }
}

impl FrameCallback for Autopilot {
    fn on_frame(&mut self, summary: &TickSummary, session: &GameSession) {
        self.frames = self.frames.saturating_add(1);

        if every(self.frames, self.config.report_every_frames) {
            info!(
                frame = self.frames,
                now = %summary.now,
                money = %session.money(),
                income_per_second = %session.estimated_income_per_second(),
                dimensions = %session.farm_dimensions(),
                commands_sent = self.sent,
                "Farm progress"
            );
        }

        if self.config.enabled && every(self.frames, self.config.decide_every_frames) {
            let commands = self.decide(session);
            debug!(frame = self.frames, count = commands.len(), "Autopilot decided");
            self.send(commands);
        }
    }
}

fn every(frames: u64, period: u64) -> bool {
    frames.checked_rem(period) == Some(0)
}

fn best_unlocked(crops: &[CropView]) -> Option<&CropView> {
    crops
        .iter()
        .filter(|c| c.unlocked)
        .max_by(|a, b| a.base_value.cmp(&b.base_value))
}

fn cheapest_affordable(upgrades: &[UpgradeView], budget: Decimal) -> Option<&UpgradeView> {
    upgrades
        .iter()
        .filter(|u| u.purchasable && u.cost <= budget)
        .min_by(|a, b| a.cost.cmp(&b.cost))
}
