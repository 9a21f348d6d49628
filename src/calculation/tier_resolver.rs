//! Tier resolution.
//!
//! This module picks the tier of a [`TierTable`] that applies to an order.
//! Resolution runs in three steps:
//!
//! 1. **Exact match**: the first tier whose headcount range and cost range both
//!    contain the order.
//! 2. **Axis fallback**: the first tier matching on headcount alone and the
//!    first matching on cost alone. When both exist the
//!    [`TieBreakStrategy`] chooses; when only one exists it is used. An axis
//!    that no tier of the table constrains does not produce a candidate.
//! 3. **Highest tier**: when nothing matches on either axis.
//!
//! Cost ranges are written in cents, so the subtotal is rounded to cents
//! before it is matched. A subtotal of 299.995 falls in the tier starting at
//! 300 rather than between `max: 299.99` and `min: 300`.
//!
//! Client tiers take the strategy as a parameter. Driver tiers always use
//! [`TieBreakStrategy::HigherRate`], so the driver side of an ambiguous order
//! resolves toward the better-paying tier while the client side resolves toward
//! the cheaper one.

use std::cmp::Ordering;

use tracing::debug;

use crate::models::{
    AuditStep, AuditWarning, OrderContext, RateTier, TieBreakStrategy, TierMatch, TierTable,
};

use super::rate_evaluator::round_currency;

/// The outcome of resolving a tier against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierResolution<'a> {
    /// The tier that applies.
    pub tier: &'a RateTier,
    /// Position of the tier in its table.
    pub position: usize,
    /// How the tier was selected.
    pub resolution: TierMatch,
    /// Position of the headcount-only candidate, when step 2 ran.
    pub by_headcount: Option<usize>,
    /// Position of the cost-only candidate, when step 2 ran.
    pub by_cost: Option<usize>,
    /// The strategy that was in effect.
    pub strategy: TieBreakStrategy,
}

impl TierResolution<'_> {
    /// Returns true if both axes produced different candidates.
    pub fn is_ambiguous(&self) -> bool {
        matches!((self.by_headcount, self.by_cost), (Some(h), Some(c)) if h != c)
    }

    /// Builds the audit step describing this resolution.
    pub fn audit_step(
        &self,
        table: &TierTable,
        ctx: &OrderContext,
        step_number: u32,
        rule_id: &str,
        rule_name: &str,
    ) -> AuditStep {
        let reasoning = match self.resolution {
            TierMatch::Exact => format!(
                "Headcount {} and subtotal ${} both fall in tier '{}'",
                ctx.headcount, ctx.subtotal, self.tier.label
            ),
            TierMatch::Headcount | TierMatch::Cost if self.is_ambiguous() => format!(
                "No tier matches both axes; headcount suggests '{}', cost suggests '{}'; {:?} picked '{}'",
                label_at(table, self.by_headcount),
                label_at(table, self.by_cost),
                self.strategy,
                self.tier.label
            ),
            TierMatch::Headcount => format!(
                "Only headcount {} matched a tier: '{}'",
                ctx.headcount, self.tier.label
            ),
            TierMatch::Cost => format!(
                "Only subtotal ${} matched a tier: '{}'",
                ctx.subtotal, self.tier.label
            ),
            TierMatch::Fallback => format!(
                "No tier matches headcount {} or subtotal ${}; using highest tier '{}'",
                ctx.headcount, ctx.subtotal, self.tier.label
            ),
        };

        AuditStep {
            step_number,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            reference: table.id().to_string(),
            input: serde_json::json!({
                "headcount": ctx.headcount,
                "subtotal": ctx.subtotal.to_string(),
                "has_gratuity": ctx.has_gratuity,
                "tie_break": self.strategy,
            }),
            output: serde_json::json!({
                "tier": self.tier.label,
                "position": self.position,
                "resolution": self.resolution,
                "by_headcount": self.by_headcount,
                "by_cost": self.by_cost,
                "rate": self.tier.rate_for(ctx.has_gratuity).to_string(),
            }),
            reasoning,
        }
    }

    /// Returns the warnings this resolution should raise.
    ///
    /// `side` names whose tier this is ("client" or "driver").
    pub fn warnings(&self, table: &TierTable, side: &str) -> Vec<AuditWarning> {
        let mut warnings = Vec::new();

        if self.is_ambiguous() {
            warnings.push(AuditWarning::new(
                "AMBIGUOUS_TIER_MATCH",
                format!(
                    "{} table '{}': headcount and cost point to different tiers ('{}' vs '{}'); resolved to '{}'",
                    side,
                    table.id(),
                    label_at(table, self.by_headcount),
                    label_at(table, self.by_cost),
                    self.tier.label
                ),
                "low",
            ));
        }

        if self.resolution == TierMatch::Fallback {
            warnings.push(AuditWarning::new(
                "FALLBACK_TO_HIGHEST_TIER",
                format!(
                    "{} table '{}' has no tier for this order; highest tier '{}' applied",
                    side,
                    table.id(),
                    self.tier.label
                ),
                "medium",
            ));
        }

        warnings
    }
}

fn label_at(table: &TierTable, position: Option<usize>) -> &str {
    position
        .and_then(|p| table.tiers().get(p))
        .map(|tier| tier.label.as_str())
        .unwrap_or("-")
}

/// Resolves the tier of `table` that applies to `ctx`.
///
/// Never fails: when nothing matches, the highest tier is returned with
/// [`TierMatch::Fallback`].
///
/// # Example
///
/// ```
/// use rate_engine::calculation::resolve_tier;
/// use rate_engine::models::{
///     OrderContext, RateTier, RateValue, TieBreakStrategy, TierMatch, TierRange, TierTable,
/// };
/// use rust_decimal::Decimal;
///
/// let table = TierTable::new(
///     "by_cost",
///     "",
///     vec![
///         RateTier::single_rate(
///             "Under $300",
///             TierRange::unbounded(),
///             TierRange::new(Decimal::ZERO, Some(Decimal::new(29999, 2))),
///             RateValue::Fixed(Decimal::from(40)),
///         ),
///         RateTier::single_rate(
///             "$300 and up",
///             TierRange::unbounded(),
///             TierRange::at_least(Decimal::from(300)),
///             RateValue::Fixed(Decimal::from(55)),
///         ),
///     ],
/// )
/// .unwrap();
///
/// let ctx = OrderContext::new("standard").with_subtotal(Decimal::from(250));
/// let resolved = resolve_tier(&table, &ctx, TieBreakStrategy::LowerRate);
///
/// assert_eq!(resolved.tier.label, "Under $300");
/// assert_eq!(resolved.resolution, TierMatch::Exact);
/// ```
pub fn resolve_tier<'a>(
    table: &'a TierTable,
    ctx: &OrderContext,
    strategy: TieBreakStrategy,
) -> TierResolution<'a> {
    let tiers = table.tiers();
    let subtotal = round_currency(ctx.subtotal);

    if let Some(position) = tiers
        .iter()
        .position(|tier| tier.matches_headcount(ctx.headcount) && tier.matches_cost(subtotal))
    {
        debug!(table = table.id(), position, "exact tier match");
        return TierResolution {
            tier: &tiers[position],
            position,
            resolution: TierMatch::Exact,
            by_headcount: None,
            by_cost: None,
            strategy,
        };
    }

    let by_headcount = if table.keys_headcount() {
        tiers
            .iter()
            .position(|tier| tier.matches_headcount(ctx.headcount))
    } else {
        None
    };
    let by_cost = if table.keys_cost() {
        tiers.iter().position(|tier| tier.matches_cost(subtotal))
    } else {
        None
    };

    let (position, resolution) = match (by_headcount, by_cost) {
        (Some(headcount), Some(cost)) => {
            let chosen = break_tie(tiers, headcount, cost, strategy, ctx.has_gratuity);
            if chosen == headcount {
                (headcount, TierMatch::Headcount)
            } else {
                (cost, TierMatch::Cost)
            }
        }
        (Some(headcount), None) => (headcount, TierMatch::Headcount),
        (None, Some(cost)) => (cost, TierMatch::Cost),
        (None, None) => (table.highest_position(), TierMatch::Fallback),
    };

    debug!(
        table = table.id(),
        position,
        ?resolution,
        ?by_headcount,
        ?by_cost,
        ?strategy,
        "tier resolved without exact match"
    );

    TierResolution {
        tier: &tiers[position],
        position,
        resolution,
        by_headcount,
        by_cost,
        strategy,
    }
}

/// Resolves the driver compensation tier of `table` for `ctx`.
///
/// Uses the same steps as [`resolve_tier`] with the fallback policy fixed to
/// [`TieBreakStrategy::HigherRate`].
pub fn resolve_driver_tier<'a>(table: &'a TierTable, ctx: &OrderContext) -> TierResolution<'a> {
    resolve_tier(table, ctx, TieBreakStrategy::HigherRate)
}

/// Returns only the tier that applies to `ctx`.
pub fn resolve<'a>(
    table: &'a TierTable,
    ctx: &OrderContext,
    strategy: TieBreakStrategy,
) -> &'a RateTier {
    resolve_tier(table, ctx, strategy).tier
}

/// Picks between the headcount-axis and cost-axis candidates.
///
/// Rate comparisons use the column selected by the gratuity flag. Fixed and
/// percentage rates are not comparable, so a mixed pair goes to the cost-axis
/// candidate. Equal rates go to the earlier tier.
fn break_tie(
    tiers: &[RateTier],
    by_headcount: usize,
    by_cost: usize,
    strategy: TieBreakStrategy,
    has_gratuity: bool,
) -> usize {
    let prefer_lower = match strategy {
        TieBreakStrategy::HeadcountPriority => return by_headcount,
        TieBreakStrategy::CostPriority => return by_cost,
        TieBreakStrategy::LowerRate => true,
        TieBreakStrategy::HigherRate => false,
    };

    let headcount_rate = tiers[by_headcount].rate_for(has_gratuity);
    let cost_rate = tiers[by_cost].rate_for(has_gratuity);

    match headcount_rate.compare_same_kind(&cost_rate) {
        None => by_cost,
        Some(Ordering::Equal) => by_headcount.min(by_cost),
        Some(Ordering::Less) if prefer_lower => by_headcount,
        Some(Ordering::Less) => by_cost,
        Some(Ordering::Greater) if prefer_lower => by_cost,
        Some(Ordering::Greater) => by_headcount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RateValue, TierRange};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rate(s: &str) -> RateValue {
        RateValue::from_str(s).unwrap()
    }

    fn tier(label: &str, headcount: (u32, Option<u32>), cost: (&str, Option<&str>), r: &str) -> RateTier {
        RateTier::single_rate(
            label,
            TierRange::new(headcount.0, headcount.1),
            TierRange::new(dec(cost.0), cost.1.map(dec)),
            rate(r),
        )
    }

    /// Headcount and cost ranges that agree tier by tier, so orders with a
    /// large headcount but a small subtotal (or the reverse) are ambiguous.
    fn two_axis_table() -> TierTable {
        TierTable::new(
            "catering_headcount",
            "Two-axis catering table",
            vec![
                tier("Small", (0, Some(24)), ("0", Some("299.99")), "40"),
                tier("Medium", (25, Some(49)), ("300", Some("599.99")), "50"),
                tier("Large", (50, Some(74)), ("600", Some("899.99")), "60"),
                tier("X-Large", (75, Some(99)), ("900", Some("1199.99")), "75"),
            ],
        )
        .unwrap()
    }

    fn cost_table() -> TierTable {
        TierTable::new(
            "catering_cost",
            "",
            vec![
                tier("Under $300", (0, None), ("0", Some("299.99")), "40"),
                tier("$300-$599", (0, None), ("300", Some("599.99")), "55"),
                tier("Over $1200", (0, None), ("1200", None), "9%"),
            ],
        )
        .unwrap()
    }

    fn ctx(headcount: u32, subtotal: &str) -> OrderContext {
        OrderContext::new("standard")
            .with_headcount(headcount)
            .with_subtotal(dec(subtotal))
    }

    #[test]
    fn test_exact_match_on_both_axes() {
        let table = two_axis_table();
        let resolved = resolve_tier(&table, &ctx(30, "450"), TieBreakStrategy::LowerRate);
        assert_eq!(resolved.tier.label, "Medium");
        assert_eq!(resolved.position, 1);
        assert_eq!(resolved.resolution, TierMatch::Exact);
        assert!(!resolved.is_ambiguous());
    }

    /// Headcount places the order in "Medium" ($50), cost in "Large" ($60).
    #[test]
    fn test_ambiguous_lower_rate_picks_cheaper_headcount_tier() {
        let table = two_axis_table();
        let resolved = resolve_tier(&table, &ctx(30, "700"), TieBreakStrategy::LowerRate);
        assert_eq!(resolved.tier.label, "Medium");
        assert_eq!(resolved.resolution, TierMatch::Headcount);
        assert_eq!(resolved.by_headcount, Some(1));
        assert_eq!(resolved.by_cost, Some(2));
        assert!(resolved.is_ambiguous());
    }

    #[test]
    fn test_ambiguous_cost_priority_picks_cost_tier() {
        let table = two_axis_table();
        let resolved = resolve_tier(&table, &ctx(30, "700"), TieBreakStrategy::CostPriority);
        assert_eq!(resolved.tier.label, "Large");
        assert_eq!(resolved.tier.rate_for(false), RateValue::Fixed(dec("60")));
        assert_eq!(resolved.resolution, TierMatch::Cost);
    }

    #[test]
    fn test_ambiguous_headcount_priority_picks_headcount_tier() {
        let table = two_axis_table();
        let resolved = resolve_tier(&table, &ctx(60, "100"), TieBreakStrategy::HeadcountPriority);
        assert_eq!(resolved.tier.label, "Large");
    }

    #[test]
    fn test_ambiguous_lower_rate_picks_cheaper_cost_tier() {
        let table = two_axis_table();
        let resolved = resolve_tier(&table, &ctx(60, "100"), TieBreakStrategy::LowerRate);
        assert_eq!(resolved.tier.label, "Small");
        assert_eq!(resolved.resolution, TierMatch::Cost);
    }

    #[test]
    fn test_driver_resolution_prefers_higher_rate() {
        let table = two_axis_table();
        let resolved = resolve_driver_tier(&table, &ctx(30, "700"));
        assert_eq!(resolved.tier.label, "Large");
        assert_eq!(resolved.strategy, TieBreakStrategy::HigherRate);

        let resolved = resolve_driver_tier(&table, &ctx(60, "100"));
        assert_eq!(resolved.tier.label, "Large");
    }

    #[test]
    fn test_mixed_rate_kinds_prefer_cost_axis() {
        let table = TierTable::new(
            "mixed",
            "",
            vec![
                tier("Fixed", (0, Some(49)), ("0", Some("999.99")), "50"),
                tier("Percent", (50, None), ("1000", None), "5%"),
            ],
        )
        .unwrap();

        let client = resolve_tier(&table, &ctx(10, "2000"), TieBreakStrategy::LowerRate);
        assert_eq!(client.tier.label, "Percent");
        let driver = resolve_driver_tier(&table, &ctx(10, "2000"));
        assert_eq!(driver.tier.label, "Percent");
        let client = resolve_tier(&table, &ctx(80, "100"), TieBreakStrategy::LowerRate);
        assert_eq!(client.tier.label, "Fixed");
    }

    #[test]
    fn test_two_percentages_compare_directly() {
        let table = TierTable::new(
            "percentages",
            "",
            vec![
                tier("Low", (0, Some(49)), ("0", Some("999.99")), "8%"),
                tier("High", (50, None), ("1000", None), "10%"),
            ],
        )
        .unwrap();
        let resolved = resolve_tier(&table, &ctx(80, "100"), TieBreakStrategy::LowerRate);
        assert_eq!(resolved.tier.label, "Low");
        let resolved = resolve_tier(&table, &ctx(80, "100"), TieBreakStrategy::HigherRate);
        assert_eq!(resolved.tier.label, "High");
    }

    #[test]
    fn test_equal_rates_pick_earlier_tier() {
        let table = TierTable::new(
            "flat",
            "",
            vec![
                tier("A", (0, Some(49)), ("0", Some("999.99")), "50"),
                tier("B", (50, None), ("1000", None), "50"),
            ],
        )
        .unwrap();
        let resolved = resolve_tier(&table, &ctx(80, "100"), TieBreakStrategy::LowerRate);
        assert_eq!(resolved.tier.label, "A");
        let resolved = resolve_tier(&table, &ctx(10, "5000"), TieBreakStrategy::HigherRate);
        assert_eq!(resolved.tier.label, "A");
    }

    #[test]
    fn test_single_axis_candidate_is_used() {
        let table = two_axis_table();
        // Headcount 30 matches "Medium"; subtotal 5000 matches nothing.
        let resolved = resolve_tier(&table, &ctx(30, "5000"), TieBreakStrategy::CostPriority);
        assert_eq!(resolved.tier.label, "Medium");
        assert_eq!(resolved.resolution, TierMatch::Headcount);
        assert_eq!(resolved.by_cost, None);
    }

    #[test]
    fn test_no_match_falls_back_to_highest_tier() {
        let table = two_axis_table();
        let resolved = resolve_tier(&table, &ctx(500, "5000"), TieBreakStrategy::LowerRate);
        assert_eq!(resolved.tier.label, "X-Large");
        assert_eq!(resolved.resolution, TierMatch::Fallback);
        let warnings = resolved.warnings(&table, "client");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "FALLBACK_TO_HIGHEST_TIER");
    }

    #[test]
    fn test_cost_only_table_ignores_headcount_axis() {
        let table = TierTable::new(
            "gapped",
            "",
            vec![
                tier("Under $300", (0, None), ("0", Some("299.99")), "40"),
                tier("$300-$599", (0, None), ("300", Some("599.99")), "55"),
            ],
        )
        .unwrap();
        let resolved = resolve_tier(&table, &ctx(10, "800"), TieBreakStrategy::LowerRate);
        assert_eq!(resolved.resolution, TierMatch::Fallback);
        assert_eq!(resolved.tier.label, "$300-$599");
        assert_eq!(resolved.by_headcount, None);
    }

    #[test]
    fn test_boundary_values_are_inclusive() {
        let table = cost_table();
        assert_eq!(resolve(&table, &ctx(0, "299.99"), TieBreakStrategy::LowerRate).label, "Under $300");
        assert_eq!(resolve(&table, &ctx(0, "300"), TieBreakStrategy::LowerRate).label, "$300-$599");
        assert_eq!(resolve(&table, &ctx(0, "1200"), TieBreakStrategy::LowerRate).label, "Over $1200");
    }

    #[test]
    fn test_sub_cent_subtotal_matches_rounded_tier() {
        let table = cost_table();

        let resolved = resolve_tier(&table, &ctx(0, "299.995"), TieBreakStrategy::LowerRate);
        assert_eq!(resolved.tier.label, "$300-$599");
        assert_eq!(resolved.resolution, TierMatch::Exact);

        let resolved = resolve_tier(&table, &ctx(0, "299.994"), TieBreakStrategy::LowerRate);
        assert_eq!(resolved.tier.label, "Under $300");
        assert_eq!(resolved.resolution, TierMatch::Exact);
    }

    #[test]
    fn test_audit_step_records_candidates() {
        let table = two_axis_table();
        let order = ctx(30, "700");
        let resolved = resolve_tier(&table, &order, TieBreakStrategy::LowerRate);
        let step = resolved.audit_step(&table, &order, 3, "client_tier_resolution", "Client Tier Resolution");

        assert_eq!(step.step_number, 3);
        assert_eq!(step.reference, "catering_headcount");
        assert_eq!(step.output["tier"], "Medium");
        assert_eq!(step.output["by_cost"], 2);
        assert_eq!(step.input["tie_break"], "lower_rate");
        assert!(step.reasoning.contains("Large"));

        let warnings = resolved.warnings(&table, "client");
        assert_eq!(warnings[0].code, "AMBIGUOUS_TIER_MATCH");
    }
}
