//! The game session: one farm, one ledger, one catalog, one scheduler.
//!
//! [`GameSession`] is the only surface a front end talks to. Queries return
//! owned view snapshots; commands report rule failures as `false` or a zero
//! payout and reserve `Err` for malformed input such as an off-grid
//! coordinate or an unknown crop index.
//!
//! There is no global state. The caller owns the session and drives it by
//! calling [`GameSession::tick`] with timestamps from a
//! [`Clock`](crate::clock::Clock).

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use idlefarm_ledger::{BalanceCheck, CropCatalog, EconomyLedger, LedgerError, verify_balance};
use idlefarm_types::{
    CropView, FarmDimensions, GridAxis, PlotView, Timestamp, UpgradeState, UpgradeType,
};
use idlefarm_world::{FarmGrid, Plot, WorldError};

use crate::config::{ConfigError, GameConfig};
use crate::scheduler::{TickScheduler, TickSummary};

/// Milliseconds added to the growth time in the income estimate, standing
/// in for the delay between ripening and harvest.
const HARVEST_DELAY_MS: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Errors that can occur during session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A plot or grid operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// A ledger or catalog operation failed.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// The session configuration was rejected.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },
}

/// Serializable dump of everything a front end would draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// Timestamp of the most recent tick.
    pub last_tick: Timestamp,
    /// Current balance.
    pub money: Decimal,
    /// Total harvested over the session.
    pub lifetime_earned: Decimal,
    /// Total spent over the session.
    pub lifetime_spent: Decimal,
    /// Grid size.
    pub dimensions: FarmDimensions,
    /// Every plot, row-major.
    pub plots: Vec<PlotView>,
    /// Levels, costs, and automation flags.
    pub upgrades: UpgradeState,
    /// The crop catalog.
    pub crops: Vec<CropView>,
    /// Rough income rate for display.
    pub estimated_income_per_second: Decimal,
}

/// A running farm.
#[derive(Debug, Clone)]
pub struct GameSession {
    grid: FarmGrid,
    catalog: CropCatalog,
    ledger: EconomyLedger,
    scheduler: TickScheduler,
    last_tick: Timestamp,
}

impl GameSession {
    /// Start a session from `config` at `start`.
    ///
    /// All scheduler timers start at `start`, so the first automation
    /// sweep waits a full interval.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if the configuration is invalid.
    pub fn new(config: &GameConfig, start: Timestamp) -> Result<Self, SessionError> {
        config.validate()?;
        let catalog = config.catalog()?;
        let ledger = EconomyLedger::new(
            config.economy.starting_money,
            &config.schedule()?,
            config.pacing(),
        )?;
        let grid = FarmGrid::new(
            config.farm.width,
            config.farm.height,
            config.farm.auto_plant_default,
        )?;

        info!(
            dimensions = %grid.dimensions(),
            money = %ledger.money(),
            crops = catalog.len(),
            %start,
            "Session started"
        );

        Ok(Self {
            grid,
            catalog,
            ledger,
            scheduler: TickScheduler::new(start),
            last_tick: start,
        })
    }

    /// Start a session with the stock configuration.
    ///
    /// # Errors
    ///
    /// Only fails if the stock configuration itself is broken.
    pub fn with_defaults(start: Timestamp) -> Result<Self, SessionError> {
        Self::new(&GameConfig::default(), start)
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Advance growth and automation to `now`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::World`] if a sweep fails.
    pub fn tick(&mut self, now: Timestamp) -> Result<TickSummary, SessionError> {
        let summary =
            self.scheduler
                .tick(now, &mut self.grid, &self.catalog, &mut self.ledger)?;
        self.last_tick = now;
        Ok(summary)
    }

    /// Timestamp passed to the most recent [`tick`](Self::tick).
    pub const fn last_tick(&self) -> Timestamp {
        self.last_tick
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Current balance.
    pub const fn money(&self) -> Decimal {
        self.ledger.money()
    }

    /// Current grid size.
    pub const fn farm_dimensions(&self) -> FarmDimensions {
        self.grid.dimensions()
    }

    /// Every plot, row-major.
    pub fn plots(&self) -> Vec<PlotView> {
        self.grid.views()
    }

    /// One plot.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::World`] for an off-grid coordinate.
    pub fn plot(&self, x: u32, y: u32) -> Result<PlotView, SessionError> {
        Ok(self.grid.plot(x, y)?.view())
    }

    /// Growth fraction in `[0, 1]` of the plot at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::World`] for an off-grid coordinate.
    pub fn growth_progress(&self, x: u32, y: u32, now: Timestamp) -> Result<f64, SessionError> {
        let plot = self.grid.plot(x, y)?;
        Ok(plot.growth_progress(now, self.ledger.effective_growth_time()))
    }

    /// Levels, costs, and automation flags.
    pub fn upgrade_state(&self) -> UpgradeState {
        self.ledger.upgrade_state()
    }

    /// The crop catalog.
    pub fn catalog(&self) -> Vec<CropView> {
        self.catalog.views()
    }

    /// The underlying ledger.
    pub const fn ledger(&self) -> &EconomyLedger {
        &self.ledger
    }

    /// The underlying grid.
    pub const fn grid(&self) -> &FarmGrid {
        &self.grid
    }

    /// The underlying catalog.
    pub const fn crop_catalog(&self) -> &CropCatalog {
        &self.catalog
    }

    /// Check the ledger balance against its lifetime totals.
    pub fn audit(&self) -> BalanceCheck {
        verify_balance(&self.ledger)
    }

    /// Rough income per second, for display only.
    ///
    /// Assumes every plot grows the most valuable unlocked crop back to
    /// back, with a short delay before each harvest, and halves the rate
    /// when no harvester has been bought. Rounded to cents.
    pub fn estimated_income_per_second(&self) -> Decimal {
        let value = self
            .catalog
            .best_unlocked()
            .and_then(|index| self.catalog.get(index))
            .map_or(Decimal::ZERO, |crop| crop.base_value());
        let cycle_ms = self
            .ledger
            .effective_growth_time()
            .checked_add(HARVEST_DELAY_MS);

        let rate = Decimal::from(self.grid.len())
            .checked_mul(value)
            .and_then(|r| r.checked_mul(Decimal::from(self.ledger.crop_level())))
            .and_then(|r| r.checked_mul(Decimal::ONE_THOUSAND))
            .zip(cycle_ms)
            .and_then(|(r, cycle)| r.checked_div(cycle));
        let rate = if self.ledger.level(UpgradeType::Harvester) == 0 {
            rate.and_then(|r| r.checked_div(Decimal::TWO))
        } else {
            rate
        };
        rate.unwrap_or(Decimal::MAX).round_dp(2)
    }

    /// Everything a front end would draw, in one serializable value.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            last_tick: self.last_tick,
            money: self.ledger.money(),
            lifetime_earned: self.ledger.lifetime_earned(),
            lifetime_spent: self.ledger.lifetime_spent(),
            dimensions: self.grid.dimensions(),
            plots: self.plots(),
            upgrades: self.upgrade_state(),
            crops: self.catalog(),
            estimated_income_per_second: self.estimated_income_per_second(),
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Plant `crop_index` at `(x, y)`.
    ///
    /// Returns `false` if the plot is occupied, the crop is locked, or the
    /// balance is short.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::World`] for an off-grid coordinate or an
    /// unknown crop.
    pub fn plant_at(
        &mut self,
        x: u32,
        y: u32,
        crop_index: usize,
        now: Timestamp,
    ) -> Result<bool, SessionError> {
        let plot = self.grid.plot_mut(x, y)?;
        Ok(plot.plant(crop_index, &self.catalog, &mut self.ledger, now)?)
    }

    /// Harvest `(x, y)`, crediting the payout. Returns the payout, zero if
    /// the plot was not ready.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::World`] for an off-grid coordinate.
    pub fn harvest_at(&mut self, x: u32, y: u32, now: Timestamp) -> Result<Decimal, SessionError> {
        let plot = self.grid.plot_mut(x, y)?;
        Ok(plot.harvest(&self.catalog, &mut self.ledger, now)?)
    }

    /// Harvest every ready plot. Returns the total payout.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::World`] if a harvest fails.
    pub fn harvest_all(&mut self, now: Timestamp) -> Result<Decimal, SessionError> {
        let report = self.grid.harvest_all(&self.catalog, &mut self.ledger, now)?;
        Ok(report.payout)
    }

    /// Plant every empty plot with its last crop, in row-major order until
    /// money runs out. Returns how many were planted.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::World`] if a planting fails.
    pub fn replant_all_with_last_crop(&mut self, now: Timestamp) -> Result<u32, SessionError> {
        let planted = self
            .grid
            .replant_empty(&self.catalog, &mut self.ledger, now, |_: &Plot| true)?;
        Ok(planted)
    }

    /// Buy one level of `upgrade`, growing the farm for property.
    ///
    /// Returns `false` if the balance is short or the unlock is owned.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Ledger`] on arithmetic overflow, or
    /// [`SessionError::World`] if the grid cannot grow. No money moves in
    /// either case.
    pub fn purchase_upgrade(&mut self, upgrade: UpgradeType) -> Result<bool, SessionError> {
        if upgrade == UpgradeType::Property && self.ledger.can_afford(self.ledger.cost(upgrade)) {
            let next_level = self.ledger.level(upgrade).checked_add(1).ok_or(
                LedgerError::ArithmeticOverflow {
                    context: "property level",
                },
            )?;
            self.grid
                .expanded_dimensions(GridAxis::for_property_level(next_level))?;
        }
        let Some(receipt) = self.ledger.purchase(upgrade)? else {
            return Ok(false);
        };
        if let Some(axis) = receipt.expand {
            self.grid.expand(axis)?;
        }
        Ok(true)
    }

    /// Unlock the crop at `crop_index`.
    ///
    /// Returns `false` if it is already unlocked or the balance is short.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Ledger`] for an unknown crop.
    pub fn unlock_crop(&mut self, crop_index: usize) -> Result<bool, SessionError> {
        Ok(self.catalog.unlock(crop_index, &mut self.ledger)?)
    }

    /// Allow or forbid auto-planting on `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::World`] for an off-grid coordinate.
    pub fn set_auto_plant(&mut self, x: u32, y: u32, enabled: bool) -> Result<(), SessionError> {
        self.grid.plot_mut(x, y)?.set_auto_plant(enabled);
        Ok(())
    }

    /// Queue `crop_index` to be planted on `(x, y)` right after its next
    /// harvest.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::World`] for an off-grid coordinate or an
    /// unknown crop.
    pub fn queue_crop_change(
        &mut self,
        x: u32,
        y: u32,
        crop_index: usize,
    ) -> Result<(), SessionError> {
        self.grid.plot_mut(x, y)?.queue_crop(crop_index, &self.catalog)?;
        Ok(())
    }

    /// Drop any crop queued on `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::World`] for an off-grid coordinate.
    pub fn clear_crop_queue(&mut self, x: u32, y: u32) -> Result<(), SessionError> {
        self.grid.plot_mut(x, y)?.clear_queue();
        Ok(())
    }

    /// Switch auto-harvest on or off. Has no effect on the farm until the
    /// unlock is bought.
    pub const fn set_auto_harvest_enabled(&mut self, enabled: bool) {
        self.ledger.set_auto_harvest_enabled(enabled);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use idlefarm_types::{GridCoord, PlotState};

    use super::*;

    fn session() -> GameSession {
        GameSession::with_defaults(Timestamp(0)).unwrap()
    }

    #[test]
    fn fresh_session_matches_config() {
        let s = session();
        assert_eq!(s.money(), dec!(20));
        assert_eq!(s.farm_dimensions(), FarmDimensions { width: 3, height: 3 });
        assert_eq!(s.plots().len(), 9);
        assert_eq!(s.catalog().len(), 5);
        assert!(s.audit().is_balanced());
    }

    #[test]
    fn off_grid_coordinates_are_errors() {
        let mut s = session();
        assert!(matches!(
            s.plant_at(3, 0, 0, Timestamp(0)),
            Err(SessionError::World { .. })
        ));
        assert!(s.harvest_at(0, 9, Timestamp(0)).is_err());
        assert!(s.set_auto_plant(7, 7, false).is_err());
        assert!(s.growth_progress(3, 3, Timestamp(0)).is_err());
        assert_eq!(s.money(), dec!(20));
    }

    #[test]
    fn unknown_crop_is_error() {
        let mut s = session();
        assert!(s.plant_at(0, 0, 99, Timestamp(0)).is_err());
        assert!(s.unlock_crop(99).is_err());
        assert!(s.queue_crop_change(0, 0, 99).is_err());
    }

    #[test]
    fn property_purchase_grows_width_and_keeps_plots() {
        let mut config = GameConfig::default();
        config.economy.starting_money = dec!(102);
        let mut s = GameSession::new(&config, Timestamp(0)).unwrap();
        assert!(s.plant_at(1, 1, 0, Timestamp(0)).unwrap());
        assert_eq!(s.money(), dec!(100));

        assert!(s.purchase_upgrade(UpgradeType::Property).unwrap());
        assert_eq!(s.money(), Decimal::ZERO);
        assert_eq!(s.upgrade_state().get(UpgradeType::Property).map(|v| v.level), Some(2));
        assert_eq!(s.farm_dimensions(), FarmDimensions { width: 4, height: 3 });

        let kept = s.plot(1, 1).unwrap();
        assert_eq!(kept.state, PlotState::Growing);
        assert_eq!(kept.planted_at, Some(Timestamp(0)));
        assert_eq!(s.plot(3, 2).unwrap().state, PlotState::Empty);
    }

    #[test]
    fn second_property_purchase_grows_height() {
        let mut config = GameConfig::default();
        config.economy.starting_money = dec!(250);
        let mut s = GameSession::new(&config, Timestamp(0)).unwrap();
        assert!(s.purchase_upgrade(UpgradeType::Property).unwrap());
        assert!(s.purchase_upgrade(UpgradeType::Property).unwrap());
        assert_eq!(s.farm_dimensions(), FarmDimensions { width: 4, height: 4 });
        assert_eq!(s.plots().len(), 16);
    }

    #[test]
    fn property_purchase_refused_at_plot_cap() {
        let mut config = GameConfig::default();
        config.farm.width = 64;
        config.farm.height = 64;
        config.economy.starting_money = dec!(500);
        let mut s = GameSession::new(&config, Timestamp(0)).unwrap();

        let result = s.purchase_upgrade(UpgradeType::Property);
        assert!(matches!(result, Err(SessionError::World { .. })));
        assert_eq!(s.money(), dec!(500));
        assert_eq!(s.upgrade_state().get(UpgradeType::Property).map(|v| v.level), Some(1));
        assert_eq!(s.farm_dimensions(), FarmDimensions { width: 64, height: 64 });
        assert!(s.audit().is_balanced());

        // A short balance is still a plain refusal, not an error.
        config.economy.starting_money = dec!(10);
        let mut poor = GameSession::new(&config, Timestamp(0)).unwrap();
        assert!(!poor.purchase_upgrade(UpgradeType::Property).unwrap());
    }

    #[test]
    fn failed_purchase_leaves_state_alone() {
        let mut s = session();
        assert!(!s.purchase_upgrade(UpgradeType::Property).unwrap());
        assert_eq!(s.farm_dimensions(), FarmDimensions { width: 3, height: 3 });
        assert_eq!(s.money(), dec!(20));
    }

    #[test]
    fn harvest_all_and_replant() {
        let mut s = session();
        assert_eq!(s.replant_all_with_last_crop(Timestamp(0)).unwrap(), 9);
        assert_eq!(s.money(), dec!(2));
        s.tick(Timestamp(15_000)).unwrap();
        assert_eq!(s.harvest_all(Timestamp(15_000)).unwrap(), dec!(90));
        assert_eq!(s.money(), dec!(92));
        assert!(s.plots().iter().all(|p| p.state == PlotState::Empty));
        assert!(s.audit().is_balanced());
    }

    #[test]
    fn replant_ignores_auto_plant_flag() {
        let mut s = session();
        s.set_auto_plant(0, 0, false).unwrap();
        assert_eq!(s.replant_all_with_last_crop(Timestamp(0)).unwrap(), 9);
        assert!(!s.plot(0, 0).unwrap().auto_plant_enabled);
    }

    #[test]
    fn queue_crop_change_sets_queue() {
        let mut s = session();
        s.queue_crop_change(2, 1, 1).unwrap();
        let view = s.plot(2, 1).unwrap();
        assert_eq!(view.coord, GridCoord::new(2, 1));
        assert_eq!(view.queued_crop_index, Some(1));

        s.clear_crop_queue(2, 1).unwrap();
        assert_eq!(s.plot(2, 1).unwrap().queued_crop_index, None);
        assert!(s.clear_crop_queue(5, 5).is_err());
    }

    #[test]
    fn tick_records_last_tick() {
        let mut s = session();
        s.tick(Timestamp(1_234)).unwrap();
        assert_eq!(s.last_tick(), Timestamp(1_234));
    }

    #[test]
    fn income_estimate_tracks_upgrades() {
        let mut config = GameConfig::default();
        config.economy.starting_money = dec!(1_000);
        let mut s = GameSession::new(&config, Timestamp(0)).unwrap();
        // 9 plots * 10 * 1 * 1000 / 15500 / 2
        assert_eq!(s.estimated_income_per_second(), dec!(2.90));
        assert!(s.purchase_upgrade(UpgradeType::Harvester).unwrap());
        assert_eq!(s.estimated_income_per_second(), dec!(5.81));
    }

    #[test]
    fn snapshot_serializes() {
        let s = session();
        let json = serde_json::to_value(s.snapshot()).unwrap();
        assert_eq!(json["dimensions"]["width"], 3);
        assert_eq!(json["plots"].as_array().map(Vec::len), Some(9));
    }
}
