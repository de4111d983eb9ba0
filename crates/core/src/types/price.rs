//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is negative.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative amount of money in BRL.
///
/// Backed by [`Decimal`] so cart totals never accumulate floating-point
/// error. The catalog is priced in a single currency, so no currency code
/// is carried.
///
/// # Examples
///
/// ```
/// use livraria_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(1990, 2)).unwrap(); // 19.90
/// assert_eq!(price.to_string(), "R$ 19,90");
/// assert!(Price::new(Decimal::NEGATIVE_ONE).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of centavos.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `centavos` is below zero.
    pub fn from_centavos(centavos: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(centavos, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether this price is zero (a free title).
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.0.is_zero()
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        // Sum of non-negatives stays non-negative
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    /// Formats as Brazilian currency, e.g. `R$ 19,90`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round_dp(2);
        write!(f, "R$ {}", format!("{rounded:.2}").replace('.', ","))
    }
}
