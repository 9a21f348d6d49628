//! Mileage surcharge calculation.
//!
//! Client and driver each get their own allowance of included miles and their
//! own overage rate. The two sides are computed independently with no shared
//! state.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculation::round_currency;
use crate::config::MileagePolicy;
use crate::models::{AuditStep, OrderContext};

/// Which party a mileage surcharge applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MileageSide {
    /// Extra miles billed to the client.
    Client,
    /// Extra miles paid to the driver.
    Driver,
}

/// The result of a mileage surcharge calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct MileageSurchargeResult {
    /// Which party the surcharge applies to.
    pub side: MileageSide,
    /// Miles included before overage applies.
    pub allowance_miles: Decimal,
    /// Miles beyond the allowance.
    pub extra_miles: Decimal,
    /// The surcharge, rounded to cents.
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Returns `max(0, total_miles - allowance_miles) * overage_rate`.
///
/// # Examples
///
/// ```
/// use rate_engine::calculation::calculate_surcharge;
/// use rust_decimal::Decimal;
///
/// // 55 miles with 40 included at $2.00 per extra mile.
/// let charge = calculate_surcharge(Decimal::from(55), Decimal::from(40), Decimal::from(2));
/// assert_eq!(charge, Decimal::from(30));
///
/// // Under the allowance there is no charge.
/// let charge = calculate_surcharge(Decimal::from(20), Decimal::from(40), Decimal::from(2));
/// assert_eq!(charge, Decimal::ZERO);
/// ```
pub fn calculate_surcharge(
    total_miles: Decimal,
    allowance_miles: Decimal,
    overage_rate: Decimal,
) -> Decimal {
    extra_miles(total_miles, allowance_miles).saturating_mul(overage_rate)
}

fn extra_miles(total_miles: Decimal, allowance_miles: Decimal) -> Decimal {
    total_miles.saturating_sub(allowance_miles).max(Decimal::ZERO)
}

/// Calculates one side's mileage surcharge for an order.
///
/// # Arguments
///
/// * `policy` - The profile's mileage policy
/// * `side` - Whether to use the client or the driver allowance and rate
/// * `ctx` - The order (mileage and stops are read)
/// * `reference` - Name of the profile the policy came from
/// * `step_number` - The step number for audit trail sequencing
pub fn calculate_mileage_surcharge(
    policy: &MileagePolicy,
    side: MileageSide,
    ctx: &OrderContext,
    reference: &str,
    step_number: u32,
) -> MileageSurchargeResult {
    let (allowance_miles, overage_rate, rule_id, rule_name) = match side {
        MileageSide::Client => (
            policy.allowance.client_allowance(ctx.stops),
            policy.client_overage_rate,
            "client_mileage_surcharge",
            "Client Mileage Surcharge",
        ),
        MileageSide::Driver => (
            policy.allowance.driver_allowance(ctx.stops),
            policy.driver_overage_rate,
            "driver_mileage_surcharge",
            "Driver Mileage Surcharge",
        ),
    };

    let extra = extra_miles(ctx.mileage, allowance_miles);
    let amount = round_currency(calculate_surcharge(ctx.mileage, allowance_miles, overage_rate));

    let reasoning = if extra.is_zero() {
        format!(
            "{} miles within the {} mile allowance; no surcharge",
            ctx.mileage.normalize(),
            allowance_miles.normalize()
        )
    } else {
        format!(
            "{} miles - {} mile allowance = {} extra × ${} = ${}",
            ctx.mileage.normalize(),
            allowance_miles.normalize(),
            extra.normalize(),
            overage_rate.normalize(),
            amount
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: rule_id.to_string(),
        rule_name: rule_name.to_string(),
        reference: reference.to_string(),
        input: serde_json::json!({
            "mileage": ctx.mileage.to_string(),
            "stops": ctx.stops,
            "allowance": policy.allowance,
            "overage_rate": overage_rate.to_string()
        }),
        output: serde_json::json!({
            "allowance_miles": allowance_miles.to_string(),
            "extra_miles": extra.to_string(),
            "amount": amount.to_string()
        }),
        reasoning,
    };

    MileageSurchargeResult {
        side,
        allowance_miles,
        extra_miles: extra,
        amount,
        audit_step,
    }
}
