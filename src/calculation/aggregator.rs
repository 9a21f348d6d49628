//! Result aggregation.
//!
//! Combines the evaluated sub-amounts into the two independent outputs: the
//! client charge and the driver pay. The toll fee flows into both.

use rust_decimal::Decimal;

use crate::models::{AuditStep, AuditWarning};

/// Warning code raised when discounts push the client charge below zero.
pub const NEGATIVE_CLIENT_CHARGE: &str = "NEGATIVE_CLIENT_CHARGE";

/// The two totals of a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeTotals {
    /// Total billed to the client.
    pub client_charge: Decimal,
    /// Total paid to the driver.
    pub driver_pay: Decimal,
}

/// The sub-amounts a calculation aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeComponents {
    /// The evaluated client tier rate.
    pub base_charge: Decimal,
    /// Extra-mile charge billed to the client.
    pub client_mileage_surcharge: Decimal,
    /// Extra-mile pay for the driver.
    pub driver_mileage_surcharge: Decimal,
    /// Toll fee, added to both sides.
    pub toll_fee: Decimal,
    /// Multi-order discount.
    pub discount: Decimal,
    /// The evaluated driver tier rate.
    pub driver_rate: Decimal,
}

/// The result of aggregation, including the audit step and any warning.
#[derive(Debug, Clone)]
pub struct AggregationResult {
    /// The client and driver totals.
    pub totals: ChargeTotals,
    /// The audit step recording this aggregation.
    pub audit_step: AuditStep,
    /// Set when the client charge came out negative.
    pub warning: Option<AuditWarning>,
}

/// Composes the client charge and driver pay.
///
/// A negative client charge is returned as is. Sums saturate at the
/// `Decimal` bounds instead of overflowing.
///
/// # Examples
///
/// ```
/// use rate_engine::calculation::aggregate;
/// use rust_decimal::Decimal;
///
/// let totals = aggregate(
///     Decimal::from(40),
///     Decimal::from(30),
///     Decimal::from(25),
///     Decimal::from(6),
///     Decimal::from(10),
///     Decimal::from(35),
/// );
/// assert_eq!(totals.client_charge, Decimal::from(66));
/// assert_eq!(totals.driver_pay, Decimal::from(66));
/// ```
pub fn aggregate(
    base_charge: Decimal,
    mileage_client: Decimal,
    mileage_driver: Decimal,
    toll_fee: Decimal,
    discount: Decimal,
    driver_rate: Decimal,
) -> ChargeTotals {
    ChargeTotals {
        client_charge: base_charge
            .saturating_add(mileage_client)
            .saturating_add(toll_fee)
            .saturating_sub(discount),
        driver_pay: driver_rate
            .saturating_add(mileage_driver)
            .saturating_add(toll_fee),
    }
}

/// Aggregates `components` and records the audit step.
pub fn calculate_totals(components: &ChargeComponents, step_number: u32) -> AggregationResult {
    let totals = aggregate(
        components.base_charge,
        components.client_mileage_surcharge,
        components.driver_mileage_surcharge,
        components.toll_fee,
        components.discount,
        components.driver_rate,
    );

    let warning = (totals.client_charge < Decimal::ZERO).then(|| {
        AuditWarning::new(
            NEGATIVE_CLIENT_CHARGE,
            format!(
                "Discount ${} exceeds the charges it applies to; client charge is ${}",
                components.discount, totals.client_charge
            ),
            "high",
        )
    });

    let audit_step = AuditStep {
        step_number,
        rule_id: "result_aggregation".to_string(),
        rule_name: "Result Aggregation".to_string(),
        reference: "totals".to_string(),
        input: serde_json::json!({
            "base_charge": components.base_charge.to_string(),
            "client_mileage_surcharge": components.client_mileage_surcharge.to_string(),
            "driver_mileage_surcharge": components.driver_mileage_surcharge.to_string(),
            "toll_fee": components.toll_fee.to_string(),
            "discount": components.discount.to_string(),
            "driver_rate": components.driver_rate.to_string()
        }),
        output: serde_json::json!({
            "client_charge": totals.client_charge.to_string(),
            "driver_pay": totals.driver_pay.to_string()
        }),
        reasoning: format!(
            "Client: ${} + ${} mileage + ${} toll - ${} discount = ${}; driver: ${} + ${} mileage + ${} toll = ${}",
            components.base_charge,
            components.client_mileage_surcharge,
            components.toll_fee,
            components.discount,
            totals.client_charge,
            components.driver_rate,
            components.driver_mileage_surcharge,
            components.toll_fee,
            totals.driver_pay
        ),
    };

    AggregationResult {
        totals,
        audit_step,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn components(discount: &str) -> ChargeComponents {
        ChargeComponents {
            base_charge: dec("40.00"),
            client_mileage_surcharge: dec("30.00"),
            driver_mileage_surcharge: dec("25.00"),
            toll_fee: dec("6.50"),
            discount: dec(discount),
            driver_rate: dec("35.00"),
        }
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let totals = aggregate(
            Decimal::MAX,
            dec("30"),
            Decimal::MAX,
            Decimal::MAX,
            Decimal::ZERO,
            dec("35"),
        );
        assert_eq!(totals.client_charge, Decimal::MAX);
        assert_eq!(totals.driver_pay, Decimal::MAX);
    }

    #[test]
    fn test_toll_flows_into_both_totals() {
        let result = calculate_totals(&components("0"), 9);
        assert_eq!(result.totals.client_charge, dec("76.50"));
        assert_eq!(result.totals.driver_pay, dec("66.50"));
        assert!(result.warning.is_none());
        assert_eq!(result.audit_step.step_number, 9);
        assert_eq!(result.audit_step.output["client_charge"], "76.50");
    }

    #[test]
    fn test_discount_reduces_client_charge_only() {
        let result = calculate_totals(&components("10"), 1);
        assert_eq!(result.totals.client_charge, dec("66.50"));
        assert_eq!(result.totals.driver_pay, dec("66.50"));
    }

    #[test]
    fn test_negative_client_charge_is_kept_and_warned() {
        let result = calculate_totals(&components("100"), 1);
        assert_eq!(result.totals.client_charge, dec("-23.50"));
        let warning = result.warning.unwrap();
        assert_eq!(warning.code, NEGATIVE_CLIENT_CHARGE);
        assert_eq!(warning.severity, "high");
    }

    #[test]
    fn test_zero_client_charge_is_not_warned() {
        let result = calculate_totals(&components("76.50"), 1);
        assert_eq!(result.totals.client_charge, Decimal::ZERO);
        assert!(result.warning.is_none());
    }
}
