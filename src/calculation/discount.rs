//! Multi-order discount calculation.
//!
//! Discounts are configured per client type as a [`DiscountPolicy`]. Client
//! types without a policy receive no discount.

use rust_decimal::Decimal;

use crate::config::{DiscountPolicy, DiscountSchedule};
use crate::models::{AuditStep, ClientType};

/// The result of a discount calculation, including the amount and audit step.
#[derive(Debug, Clone)]
pub struct DiscountResult {
    /// The discount to subtract from the client charge.
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Returns the discount `policy` grants for `order_count` orders.
///
/// # Examples
///
/// ```
/// use rate_engine::calculation::policy_discount;
/// use rate_engine::config::{DiscountPolicy, DiscountStep};
/// use rust_decimal::Decimal;
///
/// let stepped = DiscountPolicy::Stepped {
///     steps: vec![
///         DiscountStep { min_orders: 2, amount: Decimal::from(5) },
///         DiscountStep { min_orders: 3, amount: Decimal::from(10) },
///     ],
/// };
/// assert_eq!(policy_discount(&stepped, 1), Decimal::ZERO);
/// assert_eq!(policy_discount(&stepped, 4), Decimal::from(10));
///
/// let per_order = DiscountPolicy::PerAdditionalOrder { amount: Decimal::from(5) };
/// assert_eq!(policy_discount(&per_order, 3), Decimal::from(10));
/// ```
pub fn policy_discount(policy: &DiscountPolicy, order_count: u32) -> Decimal {
    match policy {
        DiscountPolicy::None => Decimal::ZERO,
        DiscountPolicy::Stepped { steps } => steps
            .iter()
            .rev()
            .find(|step| step.min_orders <= order_count)
            .map(|step| step.amount)
            .unwrap_or(Decimal::ZERO),
        DiscountPolicy::PerAdditionalOrder { amount } => {
            amount.saturating_mul(Decimal::from(order_count.saturating_sub(1)))
        }
    }
}

/// Returns the discount for `client_type` at `order_count` orders.
pub fn discount_for(
    schedule: &DiscountSchedule,
    client_type: &ClientType,
    order_count: u32,
) -> Decimal {
    schedule
        .policy_for(client_type)
        .map(|policy| policy_discount(policy, order_count))
        .unwrap_or(Decimal::ZERO)
}

/// Calculates the multi-order discount and records the audit step.
pub fn calculate_discount(
    schedule: &DiscountSchedule,
    client_type: &ClientType,
    order_count: u32,
    step_number: u32,
) -> DiscountResult {
    let policy = schedule.policy_for(client_type);
    let amount = discount_for(schedule, client_type, order_count);

    let reasoning = match policy {
        None => format!("No discount policy for client type '{}'", client_type),
        Some(DiscountPolicy::None) => {
            format!("Discounts are disabled for client type '{}'", client_type)
        }
        Some(DiscountPolicy::Stepped { .. }) if amount.is_zero() => format!(
            "{} order(s) does not reach the first discount step",
            order_count
        ),
        Some(DiscountPolicy::Stepped { .. }) => {
            format!("{} orders qualify for a ${} discount", order_count, amount.normalize())
        }
        Some(DiscountPolicy::PerAdditionalOrder { amount: per_order }) => format!(
            "{} additional order(s) × ${} = ${}",
            order_count.saturating_sub(1),
            per_order.normalize(),
            amount.normalize()
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "multi_order_discount".to_string(),
        rule_name: "Multi-Order Discount".to_string(),
        reference: client_type.to_string(),
        input: serde_json::json!({
            "client_type": client_type,
            "order_count": order_count,
            "policy": policy
        }),
        output: serde_json::json!({
            "amount": amount.to_string()
        }),
        reasoning,
    };

    DiscountResult { amount, audit_step }
}
