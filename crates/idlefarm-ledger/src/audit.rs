//! Balance verification for the economy ledger.
//!
//! Money enters a session through the starting balance and harvest
//! deposits, and leaves only through purchases. For any ledger the
//! following must hold after every operation:
//!
//! ```text
//! money == starting_money + lifetime_earned - lifetime_spent
//! money >= 0
//! ```
//!
//! Both hold by construction for a ledger mutated only through its own
//! methods. A failed check means state was corrupted and is reported as a
//! [`BalanceCheck::Imbalanced`].

use rust_decimal::Decimal;
use tracing::warn;

use crate::economy::EconomyLedger;

/// The result of a balance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceCheck {
    /// The balance matches the lifetime totals and is non-negative.
    Balanced,
    /// The balance does not match the lifetime totals, or is negative.
    Imbalanced {
        /// `starting_money + lifetime_earned - lifetime_spent`, or `None`
        /// if that sum overflowed.
        expected: Option<Decimal>,
        /// The ledger's actual balance.
        actual: Decimal,
    },
}

impl BalanceCheck {
    /// Whether the check passed.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Verify that the ledger's balance is consistent with its history.
pub fn verify_balance(ledger: &EconomyLedger) -> BalanceCheck {
    let actual = ledger.money();
    let expected = ledger
        .starting_money()
        .checked_add(ledger.lifetime_earned())
        .and_then(|sum| sum.checked_sub(ledger.lifetime_spent()));

    if expected == Some(actual) && actual >= Decimal::ZERO {
        return BalanceCheck::Balanced;
    }

    warn!(
        actual = %actual,
        expected = ?expected,
        earned = %ledger.lifetime_earned(),
        spent = %ledger.lifetime_spent(),
        "Ledger balance check failed"
    );
    BalanceCheck::Imbalanced { expected, actual }
}
