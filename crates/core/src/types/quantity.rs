//! Line item quantity type.

use core::fmt;
use core::num::NonZeroU64;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// The value is zero. Absence is represented by removing the item.
    #[error("quantity must be at least 1")]
    Zero,
    /// The value is negative.
    #[error("quantity cannot be negative (got {0})")]
    Negative(i64),
    /// The value is larger than any stock count can be.
    #[error("quantity is too large (got {0})")]
    TooLarge(u64),
}

/// The number of units of a product held in the cart.
///
/// Always at least 1 and at most `i64::MAX`, the range a stock count can
/// cover.
///
/// ## Examples
///
/// ```
/// use storecart_core::Quantity;
///
/// assert_eq!(Quantity::new(3).unwrap().get(), 3);
/// assert!(Quantity::new(0).is_err());
/// assert!(Quantity::try_from(-2_i64).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u64")]
pub struct Quantity(NonZeroU64);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU64::MIN);

    /// The largest representable quantity.
    pub const MAX: u64 = i64::MAX.unsigned_abs();

    /// Create a quantity from a raw count.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Zero`] if `value` is 0, or
    /// [`QuantityError::TooLarge`] if it exceeds [`Quantity::MAX`].
    pub const fn new(value: u64) -> Result<Self, QuantityError> {
        if value > Self::MAX {
            return Err(QuantityError::TooLarge(value));
        }
        match NonZeroU64::new(value) {
            Some(value) => Ok(Self(value)),
            None => Err(QuantityError::Zero),
        }
    }

    /// Get the raw count.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }

    /// The next quantity up, or `None` on overflow.
    #[must_use]
    pub const fn checked_increment(self) -> Option<Self> {
        if self.get() >= Self::MAX {
            return None;
        }
        match self.0.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// The quantity as a signed count, for comparison against stock.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn as_i64(self) -> i64 {
        self.get() as i64
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(QuantityError::Negative(value));
        }
        Self::new(value.unsigned_abs())
    }
}

impl From<Quantity> for u64 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_rejects_zero() {
        assert_eq!(Quantity::new(0), Err(QuantityError::Zero));
        assert_eq!(Quantity::try_from(0_i64), Err(QuantityError::Zero));
    }

    #[test]
    fn test_quantity_rejects_negative_and_oversized() {
        assert_eq!(Quantity::try_from(-1_i64), Err(QuantityError::Negative(-1)));
        assert_eq!(
            Quantity::new(Quantity::MAX + 1),
            Err(QuantityError::TooLarge(Quantity::MAX + 1))
        );
    }

    #[test]
    fn test_quantity_accepts_full_signed_range() {
        let quantity = Quantity::try_from(i64::MAX).unwrap();
        assert_eq!(quantity.as_i64(), i64::MAX);
        assert_eq!(Quantity::try_from(5_000_000_000_i64).unwrap().get(), 5_000_000_000);
    }

    #[test]
    fn test_quantity_increment() {
        assert_eq!(Quantity::ONE.checked_increment(), Quantity::new(2).ok());
        assert_eq!(Quantity::new(Quantity::MAX).unwrap().checked_increment(), None);
    }

    #[test]
    fn test_quantity_deserialize_validates() {
        let quantity: Quantity = serde_json::from_str("5").unwrap();
        assert_eq!(quantity.get(), 5);
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert!(serde_json::from_str::<Quantity>("-3").is_err());
    }

    #[test]
    fn test_quantity_error_display() {
        assert_eq!(QuantityError::Zero.to_string(), "quantity must be at least 1");
        assert_eq!(
            QuantityError::Negative(-4).to_string(),
            "quantity cannot be negative (got -4)"
        );
    }
}
