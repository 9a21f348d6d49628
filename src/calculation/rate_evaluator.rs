//! Rate evaluation.
//!
//! Turns a resolved tier's [`RateValue`] into a currency amount.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{AuditStep, RateValue};

/// Number of decimal places charges are rounded to.
pub const CURRENCY_DECIMAL_PLACES: u32 = 2;

/// The result of evaluating a rate, including the amount and audit step.
#[derive(Debug, Clone)]
pub struct RateEvaluationResult {
    /// The evaluated amount, rounded to cents.
    pub amount: Decimal,
    /// The audit step recording this evaluation.
    pub audit_step: AuditStep,
}

/// Evaluates `rate` against `base`.
///
/// A fixed rate returns its amount and ignores the base; a percentage returns
/// `base * rate`. The result is not rounded.
///
/// # Examples
///
/// ```
/// use rate_engine::calculation::evaluate_rate;
/// use rate_engine::models::RateValue;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let nine_percent = RateValue::Percentage(Decimal::from_str("0.09").unwrap());
/// assert_eq!(evaluate_rate(nine_percent, Decimal::from(1000)), Decimal::from(90));
///
/// let fixed = RateValue::Fixed(Decimal::from(40));
/// assert_eq!(evaluate_rate(fixed, Decimal::from(1000)), Decimal::from(40));
/// ```
pub fn evaluate_rate(rate: RateValue, base: Decimal) -> Decimal {
    match rate {
        RateValue::Fixed(amount) => amount,
        RateValue::Percentage(fraction) => base.saturating_mul(fraction),
    }
}

/// Rounds an amount to cents, halves away from zero.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(
        CURRENCY_DECIMAL_PLACES,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

/// Evaluates a tier rate and records the audit step.
///
/// # Arguments
///
/// * `rate` - The rate column selected from the resolved tier
/// * `base` - The order subtotal
/// * `reference` - Id of the table the rate came from
/// * `rule_id` / `rule_name` - Identify the step in the audit trace
/// * `step_number` - The step number for audit trail sequencing
pub fn evaluate_tier_rate(
    rate: RateValue,
    base: Decimal,
    reference: &str,
    rule_id: &str,
    rule_name: &str,
    step_number: u32,
) -> RateEvaluationResult {
    let raw_amount = evaluate_rate(rate, base);
    let amount = round_currency(raw_amount);

    let reasoning = match rate {
        RateValue::Fixed(_) => format!("Fixed rate {} applies regardless of subtotal", rate),
        RateValue::Percentage(_) => format!(
            "{} of subtotal ${} = ${}",
            rate,
            base.normalize(),
            amount
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: rule_id.to_string(),
        rule_name: rule_name.to_string(),
        reference: reference.to_string(),
        input: serde_json::json!({
            "rate": rate,
            "base": base.to_string()
        }),
        output: serde_json::json!({
            "raw_amount": raw_amount.to_string(),
            "amount": amount.to_string()
        }),
        reasoning,
    };

    RateEvaluationResult { amount, audit_step }
}
