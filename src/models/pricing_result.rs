//! Pricing result models for the rate engine.
//!
//! This module contains the [`PricingResult`] type and its associated
//! structures: the snapshots of the client and driver tiers that were applied,
//! the named sub-amounts of the breakdown, and the audit trace that records
//! every decision made along the way.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ClientType, RateKind, RateTier, RateValue, TieBreakStrategy};

/// How a tier was selected from its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierMatch {
    /// The tier contains the order on both headcount and cost.
    Exact,
    /// Only the headcount-axis candidate was chosen.
    Headcount,
    /// Only the cost-axis candidate was chosen.
    Cost,
    /// Nothing matched; the highest tier was used.
    Fallback,
}

/// A read-only snapshot of the tier a calculation applied.
///
/// # Example
///
/// ```
/// use rate_engine::models::{AppliedTier, RateTier, RateValue, TierMatch, TierRange};
/// use rust_decimal::Decimal;
///
/// let tier = RateTier::single_rate(
///     "Under $300",
///     TierRange::unbounded(),
///     TierRange::new(Decimal::ZERO, Some(Decimal::new(29999, 2))),
///     RateValue::Fixed(Decimal::from(40)),
/// );
/// let applied = AppliedTier {
///     table: "catering_cost".to_string(),
///     position: 0,
///     rate: tier.rate_without_gratuity,
///     tier,
///     resolution: TierMatch::Exact,
/// };
/// assert_eq!(applied.tier.label, "Under $300");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedTier {
    /// Id of the table the tier came from.
    pub table: String,
    /// Zero-based position of the tier in its table.
    pub position: usize,
    /// The tier row itself.
    pub tier: RateTier,
    /// The rate column that was used (selected by the gratuity flag).
    pub rate: RateValue,
    /// How the tier was selected.
    pub resolution: TierMatch,
}

/// Named sub-amounts that make up the client charge and driver pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// The client tier rate evaluated against the subtotal.
    pub base_charge: Decimal,
    /// Extra-mile charge billed to the client.
    pub client_mileage_surcharge: Decimal,
    /// Extra-mile compensation paid to the driver.
    pub driver_mileage_surcharge: Decimal,
    /// Toll fee, billed to the client and reimbursed to the driver.
    pub toll_fee: Decimal,
    /// Multi-order discount subtracted from the client charge.
    pub discount: Decimal,
    /// The driver tier rate evaluated against the subtotal.
    pub driver_rate: Decimal,
    /// Tip passed through to the driver; not part of `driver_pay`.
    pub tip_amount: Decimal,
    /// Driver pay plus the tip.
    pub driver_total: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The table or policy the rule read from.
    pub reference: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag results that are computed as configured but deserve a second
/// look, such as a fallback to the highest tier or a negative client charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: severity.into(),
        }
    }
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// Returns true if a warning with `code` was recorded.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|warning| warning.code == code)
    }
}

/// The complete result of one rate calculation.
///
/// Identical inputs always produce an identical `PricingResult`; request ids and
/// timings belong to the API response that wraps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    /// The client type the order was priced for.
    pub client_type: ClientType,
    /// Name of the pricing profile that supplied tables and policies.
    pub profile: String,
    /// Total billed to the client.
    pub client_charge: Decimal,
    /// Total paid to the driver, excluding tips.
    pub driver_pay: Decimal,
    /// Whether the client tier rate was fixed or a percentage.
    pub rate_kind: RateKind,
    /// The tie-break strategy used for the client tier.
    pub tie_break: TieBreakStrategy,
    /// The client tier that was applied.
    pub applied_tier: AppliedTier,
    /// The driver compensation tier that was applied.
    pub driver_tier: AppliedTier,
    /// The named sub-amounts.
    pub breakdown: PriceBreakdown,
    /// Record of every decision made.
    pub audit_trace: AuditTrace,
}
