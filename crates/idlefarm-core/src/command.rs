//! Player intents as data.
//!
//! Every mutating entry point of [`GameSession`] has a [`Command`] variant,
//! so intents from a UI task can be queued on a channel, logged, or sent as
//! JSON and applied later on the task that owns the session.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use idlefarm_types::{Timestamp, UpgradeType};

use crate::session::{GameSession, SessionError};

/// A player intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Plant a crop on one plot.
    PlantAt {
        /// Column.
        x: u32,
        /// Row.
        y: u32,
        /// Catalog index of the crop.
        crop_index: usize,
    },
    /// Harvest one plot.
    HarvestAt {
        /// Column.
        x: u32,
        /// Row.
        y: u32,
    },
    /// Harvest every ready plot.
    HarvestAll,
    /// Plant every empty plot with its last crop.
    ReplantAll,
    /// Buy one level of an upgrade.
    PurchaseUpgrade {
        /// The upgrade to buy.
        upgrade: UpgradeType,
    },
    /// Unlock a crop.
    UnlockCrop {
        /// Catalog index of the crop.
        crop_index: usize,
    },
    /// Allow or forbid auto-planting on one plot.
    SetAutoPlant {
        /// Column.
        x: u32,
        /// Row.
        y: u32,
        /// New flag value.
        enabled: bool,
    },
    /// Queue a crop to plant on one plot after its next harvest.
    QueueCropChange {
        /// Column.
        x: u32,
        /// Row.
        y: u32,
        /// Catalog index of the crop.
        crop_index: usize,
    },
    /// Cancel the queued crop on one plot.
    ClearCropQueue {
        /// Column.
        x: u32,
        /// Row.
        y: u32,
    },
    /// Switch auto-harvest on or off.
    SetAutoHarvestEnabled {
        /// New flag value.
        enabled: bool,
    },
}

/// What applying a [`Command`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// A plant, purchase, or unlock; `accepted` is false when a game rule
    /// refused it.
    Applied {
        /// Whether the action took effect.
        accepted: bool,
    },
    /// A harvest; zero when nothing was ready.
    Harvested {
        /// Money credited.
        payout: Decimal,
    },
    /// A replant sweep.
    Replanted {
        /// Plots planted.
        count: u32,
    },
    /// A setting changed.
    Updated,
}

impl GameSession {
    /// Apply `command` at `now`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as the corresponding session method.
    pub fn apply(
        &mut self,
        command: Command,
        now: Timestamp,
    ) -> Result<CommandOutcome, SessionError> {
        let outcome = match command {
            Command::PlantAt { x, y, crop_index } => CommandOutcome::Applied {
                accepted: self.plant_at(x, y, crop_index, now)?,
            },
            Command::HarvestAt { x, y } => CommandOutcome::Harvested {
                payout: self.harvest_at(x, y, now)?,
            },
            Command::HarvestAll => CommandOutcome::Harvested {
                payout: self.harvest_all(now)?,
            },
            Command::ReplantAll => CommandOutcome::Replanted {
                count: self.replant_all_with_last_crop(now)?,
            },
            Command::PurchaseUpgrade { upgrade } => CommandOutcome::Applied {
                accepted: self.purchase_upgrade(upgrade)?,
            },
            Command::UnlockCrop { crop_index } => CommandOutcome::Applied {
                accepted: self.unlock_crop(crop_index)?,
            },
            Command::SetAutoPlant { x, y, enabled } => {
                self.set_auto_plant(x, y, enabled)?;
                CommandOutcome::Updated
            }
            Command::QueueCropChange { x, y, crop_index } => {
                self.queue_crop_change(x, y, crop_index)?;
                CommandOutcome::Updated
            }
            Command::ClearCropQueue { x, y } => {
                self.clear_crop_queue(x, y)?;
                CommandOutcome::Updated
            }
            Command::SetAutoHarvestEnabled { enabled } => {
                self.set_auto_harvest_enabled(enabled);
                CommandOutcome::Updated
            }
        };

        if outcome == (CommandOutcome::Applied { accepted: false }) {
            debug!(?command, money = %self.money(), "Command refused");
        }
        Ok(outcome)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn commands_round_trip_as_tagged_json() {
        let cmd = Command::PurchaseUpgrade {
            upgrade: UpgradeType::AutoHarvest,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"type":"purchase_upgrade","upgrade":"auto_harvest"}"#);

        let parsed: Command =
            serde_json::from_str(r#"{"type":"plant_at","x":1,"y":2,"crop_index":0}"#).unwrap();
        assert_eq!(
            parsed,
            Command::PlantAt {
                x: 1,
                y: 2,
                crop_index: 0
            }
        );
    }

    #[test]
    fn apply_dispatches_to_session() {
        let mut session = GameSession::with_defaults(Timestamp(0)).unwrap();
        let planted = session
            .apply(
                Command::PlantAt {
                    x: 0,
                    y: 0,
                    crop_index: 0,
                },
                Timestamp(0),
            )
            .unwrap();
        assert_eq!(planted, CommandOutcome::Applied { accepted: true });

        let refused = session
            .apply(
                Command::PurchaseUpgrade {
                    upgrade: UpgradeType::Soil,
                },
                Timestamp(0),
            )
            .unwrap();
        assert_eq!(refused, CommandOutcome::Applied { accepted: false });

        session.tick(Timestamp(15_000)).unwrap();
        let harvested = session.apply(Command::HarvestAll, Timestamp(15_000)).unwrap();
        assert_eq!(harvested, CommandOutcome::Harvested { payout: dec!(10) });

        let toggled = session
            .apply(
                Command::SetAutoHarvestEnabled { enabled: true },
                Timestamp(15_000),
            )
            .unwrap();
        assert_eq!(toggled, CommandOutcome::Updated);
        assert!(session.upgrade_state().auto_harvest_enabled);
    }

    #[test]
    fn apply_propagates_input_errors() {
        let mut session = GameSession::with_defaults(Timestamp(0)).unwrap();
        let result = session.apply(Command::HarvestAt { x: 10, y: 10 }, Timestamp(0));
        assert!(result.is_err());
    }
}
