//! The crop catalog: what can be planted, what it costs, what it pays.
//!
//! Catalog order is progression order. Entries are never removed or
//! reordered during a session, so a crop index stays valid for the whole
//! session once it has been checked against [`CropCatalog::len`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use idlefarm_types::CropView;

use crate::LedgerError;
use crate::economy::EconomyLedger;

// ---------------------------------------------------------------------------
// CropDefinition
// ---------------------------------------------------------------------------

/// One plantable crop.
///
/// Everything except the unlock flag is fixed at construction. The flag
/// only ever moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropDefinition {
    name: String,
    base_value: Decimal,
    unlock_cost: Decimal,
    plant_cost: Decimal,
    unlocked: bool,
}

impl CropDefinition {
    /// Create a crop definition.
    pub fn new(
        name: impl Into<String>,
        base_value: Decimal,
        unlock_cost: Decimal,
        plant_cost: Decimal,
        unlocked: bool,
    ) -> Self {
        Self {
            name: name.into(),
            base_value,
            unlock_cost,
            plant_cost,
            unlocked,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Payout per harvest before the crop multiplier.
    pub const fn base_value(&self) -> Decimal {
        self.base_value
    }

    /// One-time cost to make the crop plantable.
    pub const fn unlock_cost(&self) -> Decimal {
        self.unlock_cost
    }

    /// Cost charged every time the crop is planted.
    pub const fn plant_cost(&self) -> Decimal {
        self.plant_cost
    }

    /// Whether the crop can be planted.
    pub const fn is_unlocked(&self) -> bool {
        self.unlocked
    }
}

// ---------------------------------------------------------------------------
// CropCatalog
// ---------------------------------------------------------------------------

/// Ordered table of crop definitions for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropCatalog {
    crops: Vec<CropDefinition>,
}

impl CropCatalog {
    /// Build a catalog from definitions in progression order.
    ///
    /// The catalog must be non-empty, its first crop must start unlocked
    /// (so index 0 is always a plantable default), and every amount must be
    /// non-negative with a positive base value.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidCatalog`] describing the first problem.
    pub fn new(crops: Vec<CropDefinition>) -> Result<Self, LedgerError> {
        let invalid = |reason: String| LedgerError::InvalidCatalog { reason };

        let Some(first) = crops.first() else {
            return Err(invalid("catalog must contain at least one crop".to_owned()));
        };
        if !first.unlocked {
            return Err(invalid(format!(
                "first crop {:?} must start unlocked",
                first.name
            )));
        }
        for crop in &crops {
            if crop.base_value <= Decimal::ZERO {
                return Err(invalid(format!("crop {:?} must have a positive value", crop.name)));
            }
            if crop.unlock_cost < Decimal::ZERO || crop.plant_cost < Decimal::ZERO {
                return Err(invalid(format!("crop {:?} has a negative cost", crop.name)));
            }
        }
        Ok(Self { crops })
    }

    /// Number of crops.
    pub fn len(&self) -> usize {
        self.crops.len()
    }

    /// Whether the catalog is empty (never true for a validated catalog).
    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }

    /// Look up a crop by index.
    pub fn get(&self, index: usize) -> Option<&CropDefinition> {
        self.crops.get(index)
    }

    /// Look up a crop by index, failing on an out-of-range index.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidCropIndex`] if `index` is out of range.
    pub fn require(&self, index: usize) -> Result<&CropDefinition, LedgerError> {
        self.crops.get(index).ok_or(LedgerError::InvalidCropIndex {
            index,
            len: self.crops.len(),
        })
    }

    /// Whether the crop at `index` exists and is unlocked.
    pub fn is_unlocked(&self, index: usize) -> bool {
        self.crops.get(index).is_some_and(CropDefinition::is_unlocked)
    }

    /// Iterate over `(index, crop)` pairs in progression order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &CropDefinition)> {
        self.crops.iter().enumerate()
    }

    /// Index of the most valuable unlocked crop.
    pub fn best_unlocked(&self) -> Option<usize> {
        self.iter()
            .filter(|(_, crop)| crop.unlocked)
            .max_by_key(|(_, crop)| crop.base_value)
            .map(|(index, _)| index)
    }

    /// Unlock the crop at `index`, paying its unlock cost from `ledger`.
    ///
    /// Returns `Ok(false)` with no side effect if the crop is already
    /// unlocked or the ledger cannot cover the cost.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidCropIndex`] for an out-of-range index,
    /// or any error from [`EconomyLedger::withdraw`].
    pub fn unlock(
        &mut self,
        index: usize,
        ledger: &mut EconomyLedger,
    ) -> Result<bool, LedgerError> {
        let len = self.crops.len();
        let crop = self
            .crops
            .get_mut(index)
            .ok_or(LedgerError::InvalidCropIndex { index, len })?;

        if crop.unlocked {
            debug!(index, crop = crop.name, "Crop already unlocked");
            return Ok(false);
        }
        if !ledger.withdraw(crop.unlock_cost)? {
            debug!(index, crop = crop.name, cost = %crop.unlock_cost, "Crop unlock not affordable");
            return Ok(false);
        }

        crop.unlocked = true;
        info!(index, crop = crop.name, cost = %crop.unlock_cost, "Crop unlocked");
        Ok(true)
    }

    /// Snapshot of every entry for the UI.
    pub fn views(&self) -> Vec<CropView> {
        self.iter()
            .map(|(index, crop)| CropView {
                index,
                name: crop.name.clone(),
                base_value: crop.base_value,
                unlock_cost: crop.unlock_cost,
                plant_cost: crop.plant_cost,
                unlocked: crop.unlocked,
            })
            .collect()
    }
}

impl Default for CropCatalog {
    /// Wheat, Carrot, Corn, Pumpkin, Strawberry; only Wheat unlocked.
    fn default() -> Self {
        let crop = |name: &str, value: u32, unlock: u32, plant: u32| {
            CropDefinition::new(
                name,
                Decimal::from(value),
                Decimal::from(unlock),
                Decimal::from(plant),
                unlock == 0,
            )
        };
        Self {
            crops: vec![
                crop("Wheat", 10, 0, 2),
                crop("Carrot", 25, 150, 5),
                crop("Corn", 60, 600, 12),
                crop("Pumpkin", 200, 2_500, 40),
                crop("Strawberry", 750, 10_000, 150),
            ],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::economy::{PacingModel, UpgradeSchedule};

    fn ledger_with(money: Decimal) -> EconomyLedger {
        EconomyLedger::new(money, &UpgradeSchedule::default(), PacingModel::default()).unwrap()
    }

    #[test]
    fn default_catalog_starts_with_wheat() {
        let catalog = CropCatalog::default();
        let wheat = catalog.get(0).unwrap();
        assert_eq!(wheat.name(), "Wheat");
        assert_eq!(wheat.plant_cost(), dec!(2));
        assert_eq!(wheat.base_value(), dec!(10));
        assert!(wheat.is_unlocked());
        assert!(!catalog.is_unlocked(1));
        assert_eq!(catalog.len(), 5);
    }

    #[test]
    fn unlock_deducts_and_sets_flag() {
        let mut catalog = CropCatalog::default();
        let mut ledger = ledger_with(dec!(200));
        assert!(catalog.unlock(1, &mut ledger).unwrap());
        assert!(catalog.is_unlocked(1));
        assert_eq!(ledger.money(), dec!(50));
    }

    #[test]
    fn unlock_short_of_funds_is_noop() {
        let mut catalog = CropCatalog::default();
        let mut ledger = ledger_with(dec!(100));
        assert!(!catalog.unlock(1, &mut ledger).unwrap());
        assert!(!catalog.is_unlocked(1));
        assert_eq!(ledger.money(), dec!(100));
    }

    #[test]
    fn unlock_is_monotonic() {
        let mut catalog = CropCatalog::default();
        let mut ledger = ledger_with(dec!(1_000));
        assert!(catalog.unlock(1, &mut ledger).unwrap());
        let money = ledger.money();
        assert!(!catalog.unlock(1, &mut ledger).unwrap());
        assert!(catalog.is_unlocked(1));
        assert_eq!(ledger.money(), money);
    }

    #[test]
    fn unlock_invalid_index_is_error() {
        let mut catalog = CropCatalog::default();
        let mut ledger = ledger_with(dec!(1_000));
        let result = catalog.unlock(99, &mut ledger);
        assert!(matches!(
            result,
            Err(LedgerError::InvalidCropIndex { index: 99, len: 5 })
        ));
        assert_eq!(ledger.money(), dec!(1_000));
    }

    #[test]
    fn catalog_requires_unlocked_first_crop() {
        let crops = vec![CropDefinition::new("Rye", dec!(5), dec!(10), dec!(1), false)];
        assert!(CropCatalog::new(crops).is_err());
        assert!(CropCatalog::new(Vec::new()).is_err());
    }

    #[test]
    fn catalog_rejects_negative_costs() {
        let crops = vec![
            CropDefinition::new("Rye", dec!(5), dec!(0), dec!(1), true),
            CropDefinition::new("Oat", dec!(5), dec!(-3), dec!(1), false),
        ];
        assert!(CropCatalog::new(crops).is_err());
    }

    #[test]
    fn best_unlocked_tracks_progress() {
        let mut catalog = CropCatalog::default();
        assert_eq!(catalog.best_unlocked(), Some(0));
        let mut ledger = ledger_with(dec!(1_000));
        assert!(catalog.unlock(2, &mut ledger).unwrap());
        assert_eq!(catalog.best_unlocked(), Some(2));
    }

    #[test]
    fn views_mirror_entries() {
        let catalog = CropCatalog::default();
        let views = catalog.views();
        assert_eq!(views.len(), catalog.len());
        assert_eq!(views.first().map(|v| v.name.as_str()), Some("Wheat"));
        assert_eq!(views.get(3).map(|v| v.index), Some(3));
    }
}
