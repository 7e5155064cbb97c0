//! Currency, upgrade costs, and the crop catalog for the idle farm engine.
//!
//! Every coin in a session passes through the [`EconomyLedger`]. Money only
//! enters through harvest payouts (plus the starting balance) and only
//! leaves through purchases: planting, unlocking crops, and buying upgrades.
//! The balance never goes negative; a purchase the ledger cannot cover is
//! rejected without side effects.
//!
//! # Modules
//!
//! - [`catalog`] -- The [`CropCatalog`]: ordered, append-never crop table
//!   with monotonic unlocks.
//! - [`economy`] -- The [`EconomyLedger`]: balance, upgrade levels, scaling
//!   costs, growth-time and automation-interval derivation.
//! - [`audit`] -- Balance verification against lifetime earned and spent.
//!
//! # Cost scaling
//!
//! Each upgrade has a fixed growth factor in `[1.5, 2.5]`. After every
//! purchase:
//!
//! ```text
//! cost = floor(cost * factor)
//! ```
//!
//! Schedules are validated up front so this always strictly increases.
//!
//! # Usage
//!
//! ```
//! use idlefarm_ledger::{CropCatalog, EconomyLedger, PacingModel, UpgradeSchedule};
//! use idlefarm_types::UpgradeType;
//! use rust_decimal::Decimal;
//!
//! let mut ledger = EconomyLedger::new(
//!     Decimal::new(120, 0),
//!     &UpgradeSchedule::default(),
//!     PacingModel::default(),
//! )
//! .ok();
//! let Some(ledger) = ledger.as_mut() else { return };
//!
//! // Property starts at 100 and scales by 1.5.
//! let receipt = ledger.purchase(UpgradeType::Property).ok().flatten();
//! assert!(receipt.is_some());
//! assert_eq!(ledger.money(), Decimal::new(20, 0));
//! assert_eq!(ledger.cost(UpgradeType::Property), Decimal::new(150, 0));
//!
//! // Wheat is unlocked from the start.
//! let catalog = CropCatalog::default();
//! assert!(catalog.is_unlocked(0));
//! ```

pub mod audit;
pub mod catalog;
pub mod economy;

// Re-export primary types at crate root.
pub use audit::{BalanceCheck, verify_balance};
pub use catalog::{CropCatalog, CropDefinition};
pub use economy::{EconomyLedger, PacingModel, PurchaseReceipt, UpgradeSchedule, UpgradeTerms};

use rust_decimal::Decimal;

use idlefarm_types::UpgradeType;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur in ledger and catalog operations.
///
/// These describe malformed input or broken configuration. Ordinary rule
/// failures (not enough money, already unlocked) are not errors; the
/// operations report them through their `bool` / `Option` return values.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A crop index does not refer to a catalog entry.
    #[error("invalid crop index {index} (catalog has {len} entries)")]
    InvalidCropIndex {
        /// The requested index.
        index: usize,
        /// Number of entries in the catalog.
        len: usize,
    },

    /// An amount that must be non-negative was negative.
    #[error("amount must not be negative, got {amount}")]
    NegativeAmount {
        /// The offending amount.
        amount: Decimal,
    },

    /// The upgrade schedule failed validation.
    #[error("invalid schedule for {upgrade}: {reason}")]
    InvalidSchedule {
        /// The upgrade whose terms are wrong.
        upgrade: UpgradeType,
        /// What is wrong with them.
        reason: String,
    },

    /// The pacing model failed validation.
    #[error("invalid pacing model: {reason}")]
    InvalidPacing {
        /// What is wrong with it.
        reason: String,
    },

    /// The crop catalog failed validation.
    #[error("invalid crop catalog: {reason}")]
    InvalidCatalog {
        /// What is wrong with it.
        reason: String,
    },

    /// Checked decimal or integer arithmetic overflowed.
    #[error("arithmetic overflow computing {context}")]
    ArithmeticOverflow {
        /// What was being computed.
        context: &'static str,
    },
}
