//! Fixed-point decimal types for prices and quantities
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point errors).
//! Both `Price` and `Quantity` are scale-checked to `SCALE` fractional
//! digits at construction so the engine never has to re-validate a value
//! it already holds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::EngineError;

/// Maximum fractional digits carried by `Price`/`Quantity`.
pub const SCALE: u32 = 8;

fn scale_ok(d: &Decimal) -> bool {
    d.scale() <= SCALE
}

/// A strictly positive, scale-checked price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Construct from an already-validated decimal, returning `None` if the
    /// value is not strictly positive or carries too many fractional digits.
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO && scale_ok(&value) {
            Some(Self(value.round_dp(SCALE)))
        } else {
            None
        }
    }

    /// Construct from a whole-number price (test/demo convenience).
    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    /// Parse a canonical decimal string, e.g. `"50000.25"`.
    pub fn from_str_exact(s: &str) -> Result<Self, EngineError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EngineError::BadRequest("price must not be empty".into()));
        }
        let value = Decimal::from_str(trimmed)
            .map_err(|_| EngineError::BadRequest(format!("invalid price: {s}")))?;
        Self::try_new(value)
            .ok_or_else(|| EngineError::BadRequest(format!("price must be positive with at most {SCALE} fractional digits: {s}")))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_exact(s)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = EngineError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::try_new(value)
            .ok_or_else(|| EngineError::BadRequest(format!("invalid price: {value}")))
    }
}

impl From<Price> for Decimal {
    fn from(p: Price) -> Self {
        p.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative, scale-checked quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Quantity(Decimal);

impl Quantity {
    /// Construct from an already-validated decimal, returning `None` if the
    /// value is negative or carries too many fractional digits.
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value >= Decimal::ZERO && scale_ok(&value) {
            Some(Self(value.round_dp(SCALE)))
        } else {
            None
        }
    }

    /// The additive identity. Used as the "nothing left" sentinel when a
    /// level or order is fully consumed.
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == Decimal::ZERO
    }

    /// Parse a canonical decimal string, e.g. `"1.5"`.
    pub fn from_str_exact(s: &str) -> Result<Self, EngineError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EngineError::BadRequest("quantity must not be empty".into()));
        }
        let value = Decimal::from_str(trimmed)
            .map_err(|_| EngineError::BadRequest(format!("invalid quantity: {s}")))?;
        Self::try_new(value)
            .ok_or_else(|| EngineError::BadRequest(format!("quantity must be non-negative with at most {SCALE} fractional digits: {s}")))
    }

    /// Parse requiring the result to be strictly positive (a new order's
    /// original quantity may never be zero).
    pub fn from_str_positive(s: &str) -> Result<Self, EngineError> {
        let q = Self::from_str_exact(s)?;
        if q.is_zero() {
            return Err(EngineError::BadRequest("quantity must be positive".into()));
        }
        Ok(q)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Quantity {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_exact(s)
    }
}

impl TryFrom<Decimal> for Quantity {
    type Error = EngineError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::try_new(value)
            .ok_or_else(|| EngineError::BadRequest(format!("invalid quantity: {value}")))
    }
}

impl From<Quantity> for Decimal {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
