//! The economy ledger: balance, upgrade levels, and scaling costs.
//!
//! The [`EconomyLedger`] is the in-memory record of everything the player
//! owns. It is the only place money moves, and the only place upgrade
//! levels change.
//!
//! # Design
//!
//! - **Non-negative balance**: withdrawals the balance cannot cover are
//!   rejected before anything is mutated.
//! - **Monotonic costs**: every purchase replaces the cost with
//!   `floor(cost * factor)`; the schedule is validated so this strictly
//!   increases.
//! - **No grid knowledge**: a property purchase returns the [`GridAxis`] to
//!   grow in its [`PurchaseReceipt`]; applying it is the caller's job.
//! - **Precision**: all currency uses [`Decimal`] -- no floating point.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use idlefarm_types::{GridAxis, UpgradeState, UpgradeType, UpgradeView};

use crate::LedgerError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Growth-time multiplier applied once per level of each growth upgrade.
pub const DEFAULT_GROWTH_REDUCTION: Decimal = Decimal::from_parts(85, 0, 0, false, 2);

/// Lower bound on the effective growth time, in milliseconds.
///
/// Keeps the growth time strictly positive at levels where decimal
/// precision would otherwise round it to zero.
pub const MIN_EFFECTIVE_GROWTH_TIME_MS: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Smallest allowed per-upgrade cost growth factor.
pub const MIN_GROWTH_FACTOR: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Largest allowed per-upgrade cost growth factor.
pub const MAX_GROWTH_FACTOR: Decimal = Decimal::from_parts(25, 0, 0, false, 1);

/// Level an upgrade starts at in a fresh session.
///
/// The farm starts with one property level (the initial plot grid) and a
/// crop multiplier of 1; everything else starts unowned.
pub const fn starting_level(upgrade: UpgradeType) -> u32 {
    match upgrade {
        UpgradeType::Property | UpgradeType::Crop => 1,
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// UpgradeSchedule
// ---------------------------------------------------------------------------

/// Starting cost and growth factor for one upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeTerms {
    /// Price of the first purchase.
    pub base_cost: Decimal,
    /// Multiplier applied to the cost after each purchase.
    pub growth_factor: Decimal,
}

impl UpgradeTerms {
    /// Build terms from whole-number cost and a factor in tenths.
    const fn new(base_cost: u32, factor_tenths: u32) -> Self {
        Self {
            base_cost: Decimal::from_parts(base_cost, 0, 0, false, 0),
            growth_factor: Decimal::from_parts(factor_tenths, 0, 0, false, 1),
        }
    }
}

/// Validated cost table covering every [`UpgradeType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeSchedule {
    terms: BTreeMap<UpgradeType, UpgradeTerms>,
}

impl UpgradeSchedule {
    /// Build a schedule, checking every upgrade's terms.
    ///
    /// Each upgrade must be present, have a positive starting cost, a
    /// growth factor within `[1.5, 2.5]`, and `floor(base_cost * factor)`
    /// strictly greater than `base_cost`. The last condition guarantees
    /// every later cost also strictly increases, because costs only grow.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidSchedule`] for the first upgrade that
    /// fails a check.
    pub fn new(terms: BTreeMap<UpgradeType, UpgradeTerms>) -> Result<Self, LedgerError> {
        for upgrade in UpgradeType::ALL {
            let Some(t) = terms.get(&upgrade) else {
                return Err(LedgerError::InvalidSchedule {
                    upgrade,
                    reason: "missing from schedule".to_owned(),
                });
            };
            validate_terms(upgrade, t)?;
        }
        Ok(Self { terms })
    }

    /// Return the terms for one upgrade.
    pub fn terms(&self, upgrade: UpgradeType) -> Option<&UpgradeTerms> {
        self.terms.get(&upgrade)
    }
}

impl Default for UpgradeSchedule {
    fn default() -> Self {
        let terms = [
            (UpgradeType::Property, UpgradeTerms::new(100, 15)),
            (UpgradeType::Harvester, UpgradeTerms::new(50, 18)),
            (UpgradeType::Planter, UpgradeTerms::new(75, 18)),
            (UpgradeType::Crop, UpgradeTerms::new(200, 20)),
            (UpgradeType::Fertilizer, UpgradeTerms::new(150, 17)),
            (UpgradeType::Soil, UpgradeTerms::new(300, 19)),
            (UpgradeType::Irrigation, UpgradeTerms::new(500, 22)),
            (UpgradeType::AutoPlant, UpgradeTerms::new(400, 25)),
            (UpgradeType::AutoHarvest, UpgradeTerms::new(250, 25)),
        ]
        .into_iter()
        .collect();
        Self { terms }
    }
}

fn validate_terms(upgrade: UpgradeType, terms: &UpgradeTerms) -> Result<(), LedgerError> {
    let invalid = |reason: String| LedgerError::InvalidSchedule { upgrade, reason };

    if terms.base_cost <= Decimal::ZERO {
        return Err(invalid(format!(
            "base cost must be positive, got {}",
            terms.base_cost
        )));
    }
    if terms.growth_factor < MIN_GROWTH_FACTOR || terms.growth_factor > MAX_GROWTH_FACTOR {
        return Err(invalid(format!(
            "growth factor {} outside [{MIN_GROWTH_FACTOR}, {MAX_GROWTH_FACTOR}]",
            terms.growth_factor
        )));
    }
    let next = scaled_cost(terms.base_cost, terms.growth_factor)?;
    if next <= terms.base_cost {
        return Err(invalid(format!(
            "cost {} does not increase after one purchase (next {next})",
            terms.base_cost
        )));
    }
    Ok(())
}

/// `floor(cost * factor)` with overflow checking.
fn scaled_cost(cost: Decimal, factor: Decimal) -> Result<Decimal, LedgerError> {
    cost.checked_mul(factor)
        .map(|c| c.floor())
        .ok_or(LedgerError::ArithmeticOverflow {
            context: "upgrade cost scaling",
        })
}

// ---------------------------------------------------------------------------
// PacingModel
// ---------------------------------------------------------------------------

/// Timing parameters for growth and automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingModel {
    /// Growth duration with no growth upgrades, in milliseconds.
    pub base_growth_time_ms: Decimal,
    /// Multiplier applied per level of fertilizer, soil, and irrigation.
    pub growth_reduction_per_level: Decimal,
    /// Auto-harvest interval at harvester level 1 (or 0), in milliseconds.
    pub auto_harvest_base_interval_ms: Decimal,
    /// Auto-plant interval at planter level 1 (or 0), in milliseconds.
    pub auto_plant_base_interval_ms: Decimal,
}

impl PacingModel {
    /// Check that all durations are positive and the reduction shrinks.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidPacing`] describing the first problem.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let invalid = |reason: &str| LedgerError::InvalidPacing {
            reason: reason.to_owned(),
        };
        if self.base_growth_time_ms <= Decimal::ZERO {
            return Err(invalid("base growth time must be positive"));
        }
        if self.growth_reduction_per_level <= Decimal::ZERO
            || self.growth_reduction_per_level >= Decimal::ONE
        {
            return Err(invalid("growth reduction must be in (0, 1)"));
        }
        if self.auto_harvest_base_interval_ms <= Decimal::ZERO {
            return Err(invalid("auto-harvest interval must be positive"));
        }
        if self.auto_plant_base_interval_ms <= Decimal::ZERO {
            return Err(invalid("auto-plant interval must be positive"));
        }
        Ok(())
    }
}

impl Default for PacingModel {
    fn default() -> Self {
        Self {
            base_growth_time_ms: Decimal::from(15_000_u32),
            growth_reduction_per_level: DEFAULT_GROWTH_REDUCTION,
            auto_harvest_base_interval_ms: Decimal::from(1_000_u32),
            auto_plant_base_interval_ms: Decimal::from(1_500_u32),
        }
    }
}

// ---------------------------------------------------------------------------
// PurchaseReceipt
// ---------------------------------------------------------------------------

/// What a successful upgrade purchase did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    /// The upgrade bought.
    pub upgrade: UpgradeType,
    /// Amount deducted from the balance.
    pub price: Decimal,
    /// Level after the purchase (1 for unlocks).
    pub new_level: u32,
    /// Price of the next purchase of the same upgrade.
    pub next_cost: Decimal,
    /// Grid axis to grow by one, for property purchases.
    pub expand: Option<GridAxis>,
}

// ---------------------------------------------------------------------------
// EconomyLedger
// ---------------------------------------------------------------------------

/// Balance, upgrade levels, and current upgrade costs for one session.
///
/// Holds three invariants:
/// 1. `money >= 0` after every operation.
/// 2. Every cost is positive and strictly increases with each purchase.
/// 3. `money == starting_money + lifetime_earned - lifetime_spent`
///    (see [`crate::audit`]).
#[derive(Debug, Clone)]
pub struct EconomyLedger {
    /// Current balance.
    money: Decimal,
    /// Balance the session started with.
    starting_money: Decimal,
    /// Sum of every deposit.
    lifetime_earned: Decimal,
    /// Sum of every successful withdrawal.
    lifetime_spent: Decimal,
    /// Level per upgrade (0/1 for unlock upgrades).
    levels: BTreeMap<UpgradeType, u32>,
    /// Price of the next purchase per upgrade.
    costs: BTreeMap<UpgradeType, Decimal>,
    /// Fixed cost growth factor per upgrade.
    factors: BTreeMap<UpgradeType, Decimal>,
    /// Player toggle for auto-harvest; only meaningful once unlocked.
    auto_harvest_enabled: bool,
    /// Growth and automation timing.
    pacing: PacingModel,
}

impl EconomyLedger {
    /// Create a ledger with the given starting balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NegativeAmount`] for a negative balance and
    /// [`LedgerError::InvalidPacing`] if `pacing` fails validation.
    pub fn new(
        starting_money: Decimal,
        schedule: &UpgradeSchedule,
        pacing: PacingModel,
    ) -> Result<Self, LedgerError> {
        if starting_money < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount {
                amount: starting_money,
            });
        }
        pacing.validate()?;

        let mut levels = BTreeMap::new();
        let mut costs = BTreeMap::new();
        let mut factors = BTreeMap::new();
        for upgrade in UpgradeType::ALL {
            let terms = schedule
                .terms(upgrade)
                .ok_or_else(|| LedgerError::InvalidSchedule {
                    upgrade,
                    reason: "missing from schedule".to_owned(),
                })?;
            levels.insert(upgrade, starting_level(upgrade));
            costs.insert(upgrade, terms.base_cost);
            factors.insert(upgrade, terms.growth_factor);
        }

        Ok(Self {
            money: starting_money,
            starting_money,
            lifetime_earned: Decimal::ZERO,
            lifetime_spent: Decimal::ZERO,
            levels,
            costs,
            factors,
            auto_harvest_enabled: false,
            pacing,
        })
    }

    // -----------------------------------------------------------------------
    // Balance
    // -----------------------------------------------------------------------

    /// Current balance.
    pub const fn money(&self) -> Decimal {
        self.money
    }

    /// Balance the session started with.
    pub const fn starting_money(&self) -> Decimal {
        self.starting_money
    }

    /// Total deposited over the session.
    pub const fn lifetime_earned(&self) -> Decimal {
        self.lifetime_earned
    }

    /// Total spent over the session.
    pub const fn lifetime_spent(&self) -> Decimal {
        self.lifetime_spent
    }

    /// Whether the balance covers `amount`.
    pub fn can_afford(&self, amount: Decimal) -> bool {
        self.money >= amount
    }

    /// Add `amount` to the balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NegativeAmount`] for a negative amount and
    /// [`LedgerError::ArithmeticOverflow`] if the balance would overflow.
    /// The ledger is unchanged on error.
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { amount });
        }
        let money = self
            .money
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow { context: "deposit" })?;
        let earned = self
            .lifetime_earned
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow {
                context: "lifetime earnings",
            })?;
        self.money = money;
        self.lifetime_earned = earned;
        Ok(())
    }

    /// Remove `amount` from the balance if it can be covered.
    ///
    /// Returns `Ok(false)` without touching the balance when funds are
    /// insufficient.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NegativeAmount`] for a negative amount and
    /// [`LedgerError::ArithmeticOverflow`] if lifetime spending overflows.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<bool, LedgerError> {
        if amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { amount });
        }
        if !self.can_afford(amount) {
            return Ok(false);
        }
        let money = self
            .money
            .checked_sub(amount)
            .ok_or(LedgerError::ArithmeticOverflow { context: "withdrawal" })?;
        let spent = self
            .lifetime_spent
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow {
                context: "lifetime spending",
            })?;
        self.money = money;
        self.lifetime_spent = spent;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Levels and costs
    // -----------------------------------------------------------------------

    /// Current level of an upgrade (0 or 1 for unlock upgrades).
    pub fn level(&self, upgrade: UpgradeType) -> u32 {
        self.levels.get(&upgrade).copied().unwrap_or(0)
    }

    /// Price of the next purchase of an upgrade.
    pub fn cost(&self, upgrade: UpgradeType) -> Decimal {
        self.costs.get(&upgrade).copied().unwrap_or(Decimal::MAX)
    }

    /// Fixed cost growth factor of an upgrade.
    pub fn growth_factor(&self, upgrade: UpgradeType) -> Decimal {
        self.factors.get(&upgrade).copied().unwrap_or(Decimal::ONE)
    }

    /// Harvest multiplier.
    pub fn crop_level(&self) -> u32 {
        self.level(UpgradeType::Crop)
    }

    /// Whether auto-harvest has been bought.
    pub fn auto_harvest_unlocked(&self) -> bool {
        self.level(UpgradeType::AutoHarvest) > 0
    }

    /// Whether auto-plant has been bought.
    pub fn auto_plant_unlocked(&self) -> bool {
        self.level(UpgradeType::AutoPlant) > 0
    }

    /// Whether the player has auto-harvest switched on.
    pub const fn auto_harvest_enabled(&self) -> bool {
        self.auto_harvest_enabled
    }

    /// Switch auto-harvest on or off.
    ///
    /// The flag can be set before the unlock is bought; the scheduler only
    /// acts on it once both are true.
    pub const fn set_auto_harvest_enabled(&mut self, enabled: bool) {
        self.auto_harvest_enabled = enabled;
    }

    /// Whether another purchase of `upgrade` is possible at any price.
    pub fn is_purchasable(&self, upgrade: UpgradeType) -> bool {
        !(upgrade.is_unlock() && self.level(upgrade) > 0)
    }

    /// Timing parameters in effect.
    pub const fn pacing(&self) -> &PacingModel {
        &self.pacing
    }

    /// Buy one level of `upgrade`.
    ///
    /// Returns `Ok(None)` without side effects when the balance is short or
    /// the upgrade is an unlock that is already owned. On success the price
    /// is deducted, the level incremented, the cost rescaled, and a
    /// [`PurchaseReceipt`] returned. Buying [`UpgradeType::AutoHarvest`]
    /// also switches auto-harvest on.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ArithmeticOverflow`] if the next cost or level
    /// cannot be represented. The ledger is unchanged on error.
    pub fn purchase(
        &mut self,
        upgrade: UpgradeType,
    ) -> Result<Option<PurchaseReceipt>, LedgerError> {
        if !self.is_purchasable(upgrade) {
            debug!(%upgrade, "Upgrade already unlocked");
            return Ok(None);
        }

        let price = self.cost(upgrade);
        if !self.can_afford(price) {
            debug!(%upgrade, %price, money = %self.money, "Upgrade not affordable");
            return Ok(None);
        }

        // Compute everything fallible before mutating.
        let next_cost = scaled_cost(price, self.growth_factor(upgrade))?;
        let new_level = self
            .level(upgrade)
            .checked_add(1)
            .ok_or(LedgerError::ArithmeticOverflow {
                context: "upgrade level",
            })?;

        if !self.withdraw(price)? {
            return Ok(None);
        }
        self.levels.insert(upgrade, new_level);
        self.costs.insert(upgrade, next_cost);

        if upgrade == UpgradeType::AutoHarvest {
            self.auto_harvest_enabled = true;
        }

        let expand = (upgrade == UpgradeType::Property)
            .then(|| GridAxis::for_property_level(new_level));

        info!(
            %upgrade,
            %price,
            level = new_level,
            %next_cost,
            money = %self.money,
            "Upgrade purchased"
        );

        Ok(Some(PurchaseReceipt {
            upgrade,
            price,
            new_level,
            next_cost,
            expand,
        }))
    }

    // -----------------------------------------------------------------------
    // Derived pacing
    // -----------------------------------------------------------------------

    /// Growth duration after fertilizer, soil, and irrigation reductions.
    ///
    /// `base * r^fertilizer * r^soil * r^irrigation`, floored at
    /// [`MIN_EFFECTIVE_GROWTH_TIME_MS`].
    pub fn effective_growth_time(&self) -> Decimal {
        let reduction = self.pacing.growth_reduction_per_level;
        let mut time = self.pacing.base_growth_time_ms;

        for upgrade in UpgradeType::ALL.into_iter().filter(|u| u.reduces_growth_time()) {
            for _ in 0..self.level(upgrade) {
                if time <= MIN_EFFECTIVE_GROWTH_TIME_MS {
                    return MIN_EFFECTIVE_GROWTH_TIME_MS;
                }
                // Multiplying by a factor below one cannot overflow.
                time = time.checked_mul(reduction).unwrap_or(Decimal::ZERO);
            }
        }

        time.max(MIN_EFFECTIVE_GROWTH_TIME_MS)
    }

    /// Milliseconds between auto-harvest sweeps: `base / max(1, harvester)`.
    pub fn auto_harvest_interval(&self) -> Decimal {
        divide_by_level(
            self.pacing.auto_harvest_base_interval_ms,
            self.level(UpgradeType::Harvester),
        )
    }

    /// Milliseconds between auto-plant sweeps: `base / max(1, planter)`.
    pub fn auto_plant_interval(&self) -> Decimal {
        divide_by_level(
            self.pacing.auto_plant_base_interval_ms,
            self.level(UpgradeType::Planter),
        )
    }

    /// Payout for harvesting a crop worth `base_value`: `base * crop level`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ArithmeticOverflow`] if the product overflows.
    pub fn harvest_payout(&self, base_value: Decimal) -> Result<Decimal, LedgerError> {
        base_value
            .checked_mul(Decimal::from(self.crop_level()))
            .ok_or(LedgerError::ArithmeticOverflow {
                context: "harvest payout",
            })
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Snapshot of money, levels, costs, and flags for the shop UI.
    pub fn upgrade_state(&self) -> UpgradeState {
        let upgrades = UpgradeType::ALL
            .into_iter()
            .map(|upgrade| UpgradeView {
                upgrade,
                level: self.level(upgrade),
                cost: self.cost(upgrade),
                growth_factor: self.growth_factor(upgrade),
                purchasable: self.is_purchasable(upgrade),
            })
            .collect();

        UpgradeState {
            money: self.money,
            upgrades,
            auto_harvest_unlocked: self.auto_harvest_unlocked(),
            auto_harvest_enabled: self.auto_harvest_enabled,
            auto_plant_unlocked: self.auto_plant_unlocked(),
            effective_growth_time_ms: self.effective_growth_time(),
        }
    }
}

fn divide_by_level(base: Decimal, level: u32) -> Decimal {
    base.checked_div(Decimal::from(level.max(1))).unwrap_or(base)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn ledger_with(money: Decimal) -> EconomyLedger {
        EconomyLedger::new(money, &UpgradeSchedule::default(), PacingModel::default()).unwrap()
    }

    #[test]
    fn fresh_ledger_levels() {
        let ledger = ledger_with(Decimal::ZERO);
        assert_eq!(ledger.level(UpgradeType::Property), 1);
        assert_eq!(ledger.level(UpgradeType::Crop), 1);
        assert_eq!(ledger.level(UpgradeType::Harvester), 0);
        assert!(!ledger.auto_harvest_unlocked());
        assert!(!ledger.auto_plant_unlocked());
        assert!(!ledger.auto_harvest_enabled());
    }

    #[test]
    fn negative_starting_money_rejected() {
        let result =
            EconomyLedger::new(dec!(-1), &UpgradeSchedule::default(), PacingModel::default());
        assert!(matches!(result, Err(LedgerError::NegativeAmount { .. })));
    }

    #[test]
    fn withdraw_rejects_overdraft() {
        let mut ledger = ledger_with(dec!(10));
        assert!(!ledger.withdraw(dec!(11)).unwrap());
        assert_eq!(ledger.money(), dec!(10));
        assert!(ledger.withdraw(dec!(10)).unwrap());
        assert_eq!(ledger.money(), Decimal::ZERO);
        assert_eq!(ledger.lifetime_spent(), dec!(10));
    }

    #[test]
    fn negative_amounts_are_errors() {
        let mut ledger = ledger_with(dec!(10));
        assert!(ledger.withdraw(dec!(-1)).is_err());
        assert!(ledger.deposit(dec!(-1)).is_err());
        assert_eq!(ledger.money(), dec!(10));
    }

    #[test]
    fn purchase_fails_when_short() {
        let mut ledger = ledger_with(dec!(50));
        // Planter costs 75.
        let receipt = ledger.purchase(UpgradeType::Planter).unwrap();
        assert!(receipt.is_none());
        assert_eq!(ledger.money(), dec!(50));
        assert_eq!(ledger.level(UpgradeType::Planter), 0);
        assert_eq!(ledger.cost(UpgradeType::Planter), dec!(75));
    }

    #[test]
    fn purchase_scales_cost_with_floor() {
        let mut ledger = ledger_with(dec!(10_000));
        // Harvester: 50 -> 90 -> 162 -> 291 (floor(291.6))
        let expected = [dec!(90), dec!(162), dec!(291)];
        for next in expected {
            let receipt = ledger.purchase(UpgradeType::Harvester).unwrap().unwrap();
            assert_eq!(receipt.next_cost, next);
            assert_eq!(ledger.cost(UpgradeType::Harvester), next);
        }
        assert_eq!(ledger.level(UpgradeType::Harvester), 3);
        assert_eq!(ledger.money(), dec!(9_698));
    }

    #[test]
    fn every_cost_strictly_increases() {
        let mut ledger = ledger_with(dec!(100_000_000));
        for upgrade in UpgradeType::ALL {
            let before = ledger.cost(upgrade);
            let factor = ledger.growth_factor(upgrade);
            assert!(factor > Decimal::ONE);
            let receipt = ledger.purchase(upgrade).unwrap().unwrap();
            assert_eq!(receipt.next_cost, before.checked_mul(factor).unwrap().floor());
            assert!(ledger.cost(upgrade) > before);
        }
    }

    #[test]
    fn unlock_upgrade_only_once() {
        let mut ledger = ledger_with(dec!(10_000));
        let receipt = ledger.purchase(UpgradeType::AutoPlant).unwrap();
        assert_eq!(receipt.map(|r| r.new_level), Some(1));
        assert!(ledger.auto_plant_unlocked());

        let money = ledger.money();
        assert!(ledger.purchase(UpgradeType::AutoPlant).unwrap().is_none());
        assert_eq!(ledger.money(), money);
    }

    #[test]
    fn auto_harvest_purchase_enables_it() {
        let mut ledger = ledger_with(dec!(250));
        assert!(ledger.purchase(UpgradeType::AutoHarvest).unwrap().is_some());
        assert!(ledger.auto_harvest_unlocked());
        assert!(ledger.auto_harvest_enabled());
        ledger.set_auto_harvest_enabled(false);
        assert!(!ledger.auto_harvest_enabled());
    }

    #[test]
    fn property_alternates_expansion_axis() {
        let mut ledger = ledger_with(dec!(10_000));
        let first = ledger.purchase(UpgradeType::Property).unwrap().unwrap();
        assert_eq!(first.new_level, 2);
        assert_eq!(first.expand, Some(GridAxis::Width));
        let second = ledger.purchase(UpgradeType::Property).unwrap().unwrap();
        assert_eq!(second.new_level, 3);
        assert_eq!(second.expand, Some(GridAxis::Height));
        let other = ledger.purchase(UpgradeType::Soil).unwrap().unwrap();
        assert_eq!(other.expand, None);
    }

    #[test]
    fn growth_time_stacks_reductions() {
        let mut ledger = ledger_with(dec!(100_000));
        assert_eq!(ledger.effective_growth_time(), dec!(15000));

        let _ = ledger.purchase(UpgradeType::Fertilizer).unwrap();
        assert_eq!(ledger.effective_growth_time(), dec!(12750));

        let _ = ledger.purchase(UpgradeType::Soil).unwrap();
        let _ = ledger.purchase(UpgradeType::Irrigation).unwrap();
        // 15000 * 0.85^3
        assert_eq!(ledger.effective_growth_time(), dec!(9211.875));
    }

    #[test]
    fn growth_time_never_reaches_zero() {
        let mut ledger = ledger_with(Decimal::ZERO);
        ledger.levels.insert(UpgradeType::Fertilizer, 10_000);
        let time = ledger.effective_growth_time();
        assert!(time > Decimal::ZERO);
        assert_eq!(time, MIN_EFFECTIVE_GROWTH_TIME_MS);
    }

    #[test]
    fn automation_intervals_divide_by_level() {
        let mut ledger = ledger_with(dec!(10_000));
        // Level 0 behaves like level 1.
        assert_eq!(ledger.auto_harvest_interval(), dec!(1000));
        assert_eq!(ledger.auto_plant_interval(), dec!(1500));

        let _ = ledger.purchase(UpgradeType::Harvester).unwrap();
        let _ = ledger.purchase(UpgradeType::Harvester).unwrap();
        assert_eq!(ledger.auto_harvest_interval(), dec!(500));

        let _ = ledger.purchase(UpgradeType::Planter).unwrap();
        assert_eq!(ledger.auto_plant_interval(), dec!(1500));
    }

    #[test]
    fn payout_multiplies_by_crop_level() {
        let mut ledger = ledger_with(dec!(1_000));
        assert_eq!(ledger.harvest_payout(dec!(10)).unwrap(), dec!(10));
        let _ = ledger.purchase(UpgradeType::Crop).unwrap();
        assert_eq!(ledger.harvest_payout(dec!(10)).unwrap(), dec!(20));
    }

    #[test]
    fn schedule_rejects_flat_cost() {
        let mut terms: BTreeMap<UpgradeType, UpgradeTerms> = UpgradeType::ALL
            .into_iter()
            .map(|u| (u, UpgradeSchedule::default().terms(u).copied().unwrap()))
            .collect();
        // floor(1 * 1.5) == 1: never increases.
        terms.insert(
            UpgradeType::Soil,
            UpgradeTerms {
                base_cost: dec!(1),
                growth_factor: dec!(1.5),
            },
        );
        let result = UpgradeSchedule::new(terms);
        assert!(matches!(
            result,
            Err(LedgerError::InvalidSchedule {
                upgrade: UpgradeType::Soil,
                ..
            })
        ));
    }

    #[test]
    fn schedule_rejects_factor_out_of_range() {
        let mut terms: BTreeMap<UpgradeType, UpgradeTerms> = UpgradeType::ALL
            .into_iter()
            .map(|u| (u, UpgradeSchedule::default().terms(u).copied().unwrap()))
            .collect();
        terms.insert(
            UpgradeType::Crop,
            UpgradeTerms {
                base_cost: dec!(200),
                growth_factor: dec!(3),
            },
        );
        assert!(UpgradeSchedule::new(terms).is_err());
    }

    #[test]
    fn schedule_rejects_missing_upgrade() {
        let mut terms = BTreeMap::new();
        terms.insert(
            UpgradeType::Property,
            UpgradeTerms {
                base_cost: dec!(100),
                growth_factor: dec!(1.5),
            },
        );
        assert!(UpgradeSchedule::new(terms).is_err());
    }

    #[test]
    fn default_schedule_is_valid() {
        let terms: BTreeMap<UpgradeType, UpgradeTerms> = UpgradeType::ALL
            .into_iter()
            .map(|u| (u, UpgradeSchedule::default().terms(u).copied().unwrap()))
            .collect();
        assert!(UpgradeSchedule::new(terms).is_ok());
    }

    #[test]
    fn pacing_validation() {
        let mut pacing = PacingModel::default();
        assert!(pacing.validate().is_ok());
        pacing.growth_reduction_per_level = Decimal::ONE;
        assert!(pacing.validate().is_err());
    }

    #[test]
    fn upgrade_state_reports_everything() {
        let mut ledger = ledger_with(dec!(1_000));
        let _ = ledger.purchase(UpgradeType::AutoHarvest).unwrap();
        let state = ledger.upgrade_state();
        assert_eq!(state.money, dec!(750));
        assert_eq!(state.upgrades.len(), UpgradeType::ALL.len());
        assert!(state.auto_harvest_unlocked);
        assert!(state.auto_harvest_enabled);
        assert!(!state.auto_plant_unlocked);
        let view = state.get(UpgradeType::AutoHarvest).unwrap();
        assert!(!view.purchasable);
        assert_eq!(view.cost, dec!(625));
    }
}
