//! Rate value model.
//!
//! A tier's rate is either a fixed currency amount or a percentage of the
//! order subtotal. Configuration may write it as a bare number (`40`), a
//! currency string (`"$40.00"`), a percent string (`"9%"`) or the tagged form
//! produced by serialization (`{ kind: percentage, value: "0.09" }`). All of
//! these are parsed once, when the tier table is built.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::EngineError;

/// Which kind of rate a [`RateValue`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKind {
    /// A flat currency amount.
    Fixed,
    /// A fraction of a base amount.
    Percentage,
}

/// A tier rate: a fixed amount or a percentage in `[0, 1]`.
///
/// # Example
///
/// ```
/// use rate_engine::models::{RateKind, RateValue};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let rate = RateValue::from_str("9%").unwrap();
/// assert_eq!(rate, RateValue::Percentage(Decimal::from_str("0.09").unwrap()));
/// assert_eq!(rate.kind(), RateKind::Percentage);
///
/// let fixed = RateValue::from_str("$40.00").unwrap();
/// assert_eq!(fixed, RateValue::Fixed(Decimal::from(40)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RateValue {
    /// A flat amount, independent of the order subtotal.
    Fixed(Decimal),
    /// A fraction of the order subtotal (0.09 means 9%).
    Percentage(Decimal),
}

impl RateValue {
    /// Creates a fixed rate, rejecting negative amounts.
    pub fn fixed(amount: Decimal) -> Result<Self, EngineError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(EngineError::InvalidRate {
                value: amount.to_string(),
                message: "fixed amounts cannot be negative".to_string(),
            });
        }
        Ok(Self::Fixed(amount))
    }

    /// Creates a percentage rate from a fraction, which must lie in `[0, 1]`.
    pub fn percentage(fraction: Decimal) -> Result<Self, EngineError> {
        if fraction < Decimal::ZERO || fraction > Decimal::ONE {
            return Err(EngineError::InvalidRate {
                value: fraction.to_string(),
                message: "percentage must be between 0% and 100%".to_string(),
            });
        }
        Ok(Self::Percentage(fraction))
    }

    /// Returns the kind of this rate.
    pub fn kind(&self) -> RateKind {
        match self {
            RateValue::Fixed(_) => RateKind::Fixed,
            RateValue::Percentage(_) => RateKind::Percentage,
        }
    }

    /// Compares two rates of the same kind.
    ///
    /// Two percentages apply to the same base, so they compare directly. A
    /// fixed amount and a percentage are not comparable and yield `None`.
    pub fn compare_same_kind(&self, other: &RateValue) -> Option<Ordering> {
        match (self, other) {
            (RateValue::Fixed(a), RateValue::Fixed(b)) => Some(a.cmp(b)),
            (RateValue::Percentage(a), RateValue::Percentage(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for RateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateValue::Fixed(amount) => write!(f, "${}", amount.normalize()),
            RateValue::Percentage(fraction) => {
                write!(f, "{}%", (*fraction * Decimal::ONE_HUNDRED).normalize())
            }
        }
    }
}

impl FromStr for RateValue {
    type Err = EngineError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let invalid = |message: &str| EngineError::InvalidRate {
            value: raw.to_string(),
            message: message.to_string(),
        };

        if let Some(number) = trimmed.strip_suffix('%') {
            let percent = Decimal::from_str(number.trim())
                .map_err(|_| invalid("percentage is not a number"))?;
            return Self::percentage(percent / Decimal::ONE_HUNDRED)
                .map_err(|_| invalid("percentage must be between 0% and 100%"));
        }

        let number = trimmed.strip_prefix('$').unwrap_or(trimmed).replace(',', "");
        let amount =
            Decimal::from_str(number.trim()).map_err(|_| invalid("amount is not a number"))?;
        Self::fixed(amount).map_err(|_| invalid("fixed amounts cannot be negative"))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRateValue {
    Tagged { kind: RateKind, value: Decimal },
    Amount(Decimal),
    Text(String),
}

impl TryFrom<RawRateValue> for RateValue {
    type Error = EngineError;

    fn try_from(raw: RawRateValue) -> Result<Self, Self::Error> {
        match raw {
            RawRateValue::Tagged {
                kind: RateKind::Fixed,
                value,
            } => Self::fixed(value),
            RawRateValue::Tagged {
                kind: RateKind::Percentage,
                value,
            } => Self::percentage(value),
            RawRateValue::Amount(amount) => Self::fixed(amount),
            RawRateValue::Text(text) => text.parse(),
        }
    }
}

impl<'de> Deserialize<'de> for RateValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawRateValue::deserialize(deserializer)?;
        RateValue::try_from(raw).map_err(serde::de::Error::custom)
    }
}
