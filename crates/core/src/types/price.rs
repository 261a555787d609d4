//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use core::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes accepted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// Peruvian sol.
    #[default]
    PEN,
}

impl CurrencyCode {
    /// Display symbol placed before the amount.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::PEN => "S/ ",
        }
    }
}

/// A price with currency information.
///
/// Arithmetic stays in [`Decimal`] so cart totals never pick up binary
/// floating point error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (soles, not céntimos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in soles from a count of céntimos.
    #[must_use]
    pub fn soles_from_cents(cents: i64) -> Self {
        Self::new(Decimal::new(cents, 2), CurrencyCode::PEN)
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Multiply by a quantity (line total).
    #[must_use]
    pub fn times(self, qty: u32) -> Self {
        Self::new(self.amount * Decimal::from(qty), self.currency_code)
    }

    /// Apply a rate (e.g. a tax fraction) and round half-up to céntimos.
    #[must_use]
    pub fn scaled(self, rate: Decimal) -> Self {
        Self::new(round_cents(self.amount * rate), self.currency_code)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        debug_assert_eq!(self.currency_code, rhs.currency_code);
        Self::new(self.amount + rhs.amount, self.currency_code)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:.2}",
            self.currency_code.symbol(),
            round_cents(self.amount)
        )
    }
}

/// Half a céntimo rounds away from zero, as on a receipt.
fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
