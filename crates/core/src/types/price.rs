//! Type-safe price representation using decimal arithmetic.
//!
//! Money is never held in floating point. Line totals and sums are computed
//! with [`Decimal`] and only rounded when formatted for display.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Quantity;

/// Errors from price arithmetic and validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// Two prices in different currencies were combined.
    #[error("currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch {
        /// Currency of the left-hand side.
        expected: CurrencyCode,
        /// Currency of the right-hand side.
        actual: CurrencyCode,
    },
    /// The result does not fit in a decimal.
    #[error("price arithmetic overflowed")]
    Overflow,
}

/// A price with currency information.
///
/// Deserializes from either a bare number (`10.5`, in the default currency)
/// or an object with `amount` and optional `currency_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "PriceRepr")]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceRepr {
    Bare(Decimal),
    Full {
        amount: Decimal,
        #[serde(default)]
        currency_code: CurrencyCode,
    },
}

impl From<PriceRepr> for Price {
    fn from(repr: PriceRepr) -> Self {
        match repr {
            PriceRepr::Bare(amount) => Self::new(amount, CurrencyCode::default()),
            PriceRepr::Full {
                amount,
                currency_code,
            } => Self::new(amount, currency_code),
        }
    }
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

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Check that the amount is not negative.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn validate(&self) -> Result<(), PriceError> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(PriceError::Negative(self.amount));
        }
        Ok(())
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Price of `quantity` units at this unit price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the product does not fit.
    pub fn times(&self, quantity: Quantity) -> Result<Self, PriceError> {
        let amount = self
            .amount
            .checked_mul(Decimal::from(quantity.get()))
            .ok_or(PriceError::Overflow)?;
        Ok(Self::new(amount, self.currency_code))
    }

    /// Add two prices of the same currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the currencies differ or the sum overflows.
    pub fn checked_add(&self, other: &Self) -> Result<Self, PriceError> {
        if self.currency_code != other.currency_code {
            return Err(PriceError::CurrencyMismatch {
                expected: self.currency_code,
                actual: other.currency_code,
            });
        }
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(PriceError::Overflow)?;
        Ok(Self::new(amount, self.currency_code))
    }

    /// Format for display with the currency prefix (e.g., "US $19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{}{:.2}",
            self.currency_code.display_prefix(),
            self.amount.round_dp(2)
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Currency symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }

    /// Prefix used when rendering amounts, disambiguating dollar currencies.
    #[must_use]
    pub const fn display_prefix(&self) -> &'static str {
        match self {
            Self::USD => "US $",
            Self::CAD => "CA $",
            Self::AUD => "AU $",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            other => Err(format!("unsupported currency code: {other}")),
        }
    }
}
