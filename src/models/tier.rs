//! Tier table models.
//!
//! A [`TierTable`] is an ordered list of [`RateTier`] rows. Each row is bound
//! to an inclusive headcount range and an inclusive cost range and carries two
//! rate columns, one used when gratuity is included and one when it is not.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::RateValue;

/// An inclusive range with an optional upper bound.
///
/// A missing `max` means the range is unbounded above.
///
/// # Example
///
/// ```
/// use rate_engine::models::TierRange;
///
/// let range = TierRange::new(25_u32, Some(49));
/// assert!(range.contains(25));
/// assert!(range.contains(49));
/// assert!(!range.contains(50));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRange<T> {
    /// The smallest value in the range.
    pub min: T,
    /// The largest value in the range, or `None` when unbounded.
    #[serde(default)]
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy + Default> TierRange<T> {
    /// Creates a range from `min` to `max` inclusive.
    pub fn new(min: T, max: Option<T>) -> Self {
        Self { min, max }
    }

    /// Creates a range starting at `min` with no upper bound.
    pub fn at_least(min: T) -> Self {
        Self { min, max: None }
    }

    /// Creates a range covering every non-negative value.
    pub fn unbounded() -> Self {
        Self::at_least(T::default())
    }

    /// Returns true if `value` falls within the range, bounds included.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && self.max.is_none_or(|max| value <= max)
    }

    /// Returns true if the range places no constraint on a non-negative value.
    pub fn is_unbounded(&self) -> bool {
        self.min <= T::default() && self.max.is_none()
    }

    /// Returns true if every value of this range lies strictly below `next`.
    pub fn is_below(&self, next: &Self) -> bool {
        self.max.is_some_and(|max| max < next.min)
    }

    fn is_well_formed(&self) -> bool {
        self.max.is_none_or(|max| self.min <= max)
    }
}

/// One row of a pricing table.
///
/// In configuration a tier either names both rate columns or a single `rate`,
/// which is then used for both. An omitted range spans every value.
///
/// ```yaml
/// - label: "Under $300"
///   cost: { min: 0, max: 299.99 }
///   rate_with_gratuity: 35
///   rate_without_gratuity: 40
/// - label: "100+ guests"
///   headcount: { min: 100 }
///   rate: "10%"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRateTier")]
pub struct RateTier {
    /// Human-readable name of the tier.
    pub label: String,
    /// Inclusive headcount bounds.
    pub headcount: TierRange<u32>,
    /// Inclusive order subtotal bounds.
    pub cost: TierRange<Decimal>,
    /// Rate applied when gratuity is included in the order.
    pub rate_with_gratuity: RateValue,
    /// Rate applied when gratuity is not included.
    pub rate_without_gratuity: RateValue,
}

impl RateTier {
    /// Creates a tier with a single rate used for both gratuity columns.
    pub fn single_rate(
        label: impl Into<String>,
        headcount: TierRange<u32>,
        cost: TierRange<Decimal>,
        rate: RateValue,
    ) -> Self {
        Self {
            label: label.into(),
            headcount,
            cost,
            rate_with_gratuity: rate,
            rate_without_gratuity: rate,
        }
    }

    /// Returns the rate column selected by the gratuity flag.
    pub fn rate_for(&self, has_gratuity: bool) -> RateValue {
        if has_gratuity {
            self.rate_with_gratuity
        } else {
            self.rate_without_gratuity
        }
    }

    /// Returns true if the headcount range contains `headcount`.
    pub fn matches_headcount(&self, headcount: u32) -> bool {
        self.headcount.contains(headcount)
    }

    /// Returns true if the cost range contains `subtotal`.
    pub fn matches_cost(&self, subtotal: Decimal) -> bool {
        self.cost.contains(subtotal)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRateTier {
    label: String,
    #[serde(default = "TierRange::unbounded")]
    headcount: TierRange<u32>,
    #[serde(default = "TierRange::unbounded")]
    cost: TierRange<Decimal>,
    #[serde(default)]
    rate: Option<RateValue>,
    #[serde(default)]
    rate_with_gratuity: Option<RateValue>,
    #[serde(default)]
    rate_without_gratuity: Option<RateValue>,
}

impl TryFrom<RawRateTier> for RateTier {
    type Error = String;

    fn try_from(raw: RawRateTier) -> Result<Self, Self::Error> {
        if !raw.headcount.is_well_formed() {
            return Err(format!("tier '{}' has headcount min above max", raw.label));
        }
        if !raw.cost.is_well_formed() {
            return Err(format!("tier '{}' has cost min above max", raw.label));
        }

        let (with_gratuity, without_gratuity) =
            match (raw.rate, raw.rate_with_gratuity, raw.rate_without_gratuity) {
                (Some(rate), None, None) => (rate, rate),
                (None, Some(with), Some(without)) => (with, without),
                (Some(_), _, _) => {
                    return Err(format!(
                        "tier '{}' sets both `rate` and a gratuity-specific rate",
                        raw.label
                    ));
                }
                (None, _, _) => {
                    return Err(format!(
                        "tier '{}' needs `rate` or both `rate_with_gratuity` and `rate_without_gratuity`",
                        raw.label
                    ));
                }
            };

        Ok(RateTier {
            label: raw.label,
            headcount: raw.headcount,
            cost: raw.cost,
            rate_with_gratuity: with_gratuity,
            rate_without_gratuity: without_gratuity,
        })
    }
}

/// Policy for choosing between the headcount-axis and cost-axis candidates
/// when no tier matches an order on both axes.
///
/// Client tiers default to [`TieBreakStrategy::LowerRate`]; driver tiers are
/// always resolved with [`TieBreakStrategy::HigherRate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakStrategy {
    /// Pick the cheaper candidate.
    #[default]
    LowerRate,
    /// Pick the more expensive candidate.
    HigherRate,
    /// Always pick the headcount-axis candidate.
    HeadcountPriority,
    /// Always pick the cost-axis candidate.
    CostPriority,
}

/// An ordered, validated, read-only collection of rate tiers.
///
/// Construction checks that the table is non-empty and that every tier lies
/// strictly above its predecessor on at least one axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierTable {
    id: String,
    description: String,
    tiers: Vec<RateTier>,
}

impl TierTable {
    /// Builds a table, validating tier ordering.
    ///
    /// # Example
    ///
    /// ```
    /// use rate_engine::models::{RateTier, RateValue, TierRange, TierTable};
    /// use rust_decimal::Decimal;
    ///
    /// let table = TierTable::new(
    ///     "driver_headcount",
    ///     "Driver pay by headcount",
    ///     vec![
    ///         RateTier::single_rate(
    ///             "Up to 24",
    ///             TierRange::new(0, Some(24)),
    ///             TierRange::unbounded(),
    ///             RateValue::Fixed(Decimal::from(35)),
    ///         ),
    ///         RateTier::single_rate(
    ///             "25 and up",
    ///             TierRange::at_least(25),
    ///             TierRange::unbounded(),
    ///             RateValue::Fixed(Decimal::from(45)),
    ///         ),
    ///     ],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(table.highest().label, "25 and up");
    /// assert!(table.keys_headcount());
    /// assert!(!table.keys_cost());
    /// ```
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        tiers: Vec<RateTier>,
    ) -> EngineResult<Self> {
        let id = id.into();

        if tiers.is_empty() {
            return Err(EngineError::InvalidTierTable {
                table: id,
                message: "table has no tiers".to_string(),
            });
        }

        for pair in tiers.windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            if !previous.headcount.is_below(&next.headcount) && !previous.cost.is_below(&next.cost)
            {
                return Err(EngineError::InvalidTierTable {
                    table: id,
                    message: format!(
                        "tier '{}' must lie strictly above tier '{}' on headcount or cost",
                        next.label, previous.label
                    ),
                });
            }
        }

        Ok(Self {
            id,
            description: description.into(),
            tiers,
        })
    }

    /// Returns the table identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the tiers in ascending order.
    pub fn tiers(&self) -> &[RateTier] {
        &self.tiers
    }

    /// Returns the last (highest) tier.
    pub fn highest(&self) -> &RateTier {
        // Non-empty by construction.
        &self.tiers[self.tiers.len() - 1]
    }

    /// Returns the position of the highest tier.
    pub fn highest_position(&self) -> usize {
        self.tiers.len() - 1
    }

    /// Returns true if any tier constrains headcount.
    pub fn keys_headcount(&self) -> bool {
        self.tiers.iter().any(|tier| !tier.headcount.is_unbounded())
    }

    /// Returns true if any tier constrains the order subtotal.
    pub fn keys_cost(&self) -> bool {
        self.tiers.iter().any(|tier| !tier.cost.is_unbounded())
    }
}
