//! Line item quantity.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// Zero or negative input.
    #[error("quantity must be at least 1 (got {0})")]
    NotPositive(i64),
    /// Input exceeds the supported range.
    #[error("quantity must be at most {max} (got {got})")]
    TooLarge {
        /// Maximum allowed quantity.
        max: u32,
        /// Rejected input.
        got: i64,
    },
}

/// A positive number of units of one product.
///
/// ## Examples
///
/// ```
/// use cartwheel_core::Quantity;
///
/// assert_eq!(Quantity::new(3).unwrap().get(), 3);
/// assert!(Quantity::new(0).is_err());
/// assert!(Quantity::new(-2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Validate a raw quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if `n` is zero, negative, or larger than `u32::MAX`.
    pub fn new(n: i64) -> Result<Self, QuantityError> {
        if n < 1 {
            return Err(QuantityError::NotPositive(n));
        }
        let value = u32::try_from(n).map_err(|_| QuantityError::TooLarge {
            max: u32::MAX,
            got: n,
        })?;
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(QuantityError::NotPositive(n))
    }

    /// The number of units.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add two quantities, failing instead of wrapping.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::TooLarge`] if the sum exceeds `u32::MAX`.
    pub fn checked_add(self, other: Self) -> Result<Self, QuantityError> {
        self.0.checked_add(other.get()).map(Self).ok_or_else(|| {
            QuantityError::TooLarge {
                max: u32::MAX,
                got: i64::from(self.get()) + i64::from(other.get()),
            }
        })
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.get()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
