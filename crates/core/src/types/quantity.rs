//! Positive quantity for wire-bound cart requests.
//!
//! Absolute quantity updates must be at least 1; callers route zero or
//! negative quantities to a delete instead. Encoding that rule in the type
//! keeps invalid updates from ever reaching the network layer.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when constructing a [`Quantity`] from a non-positive value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantity must be at least 1.
    #[error("quantity must be at least 1, got {0}")]
    NotPositive(i64),
}

/// A strictly positive item quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// The smallest valid quantity.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::NotPositive`] if `value` is 0.
    pub fn new(value: u32) -> Result<Self, QuantityError> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(QuantityError::NotPositive(i64::from(value)))
    }

    /// Get the quantity as a plain `u32`.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero() {
        assert_eq!(Quantity::new(0), Err(QuantityError::NotPositive(0)));
    }

    #[test]
    fn test_accepts_positive() {
        let q = Quantity::new(3).expect("valid quantity");
        assert_eq!(q.get(), 3);
        assert_eq!(q.to_string(), "3");
    }

    #[test]
    fn test_one_constant() {
        assert_eq!(Quantity::ONE.get(), 1);
    }
}
