//! Calculation logic for the rate engine.
//!
//! This module contains the pricing stages (tier resolution, rate evaluation,
//! mileage surcharges, multi-order discounts and result aggregation) and the
//! pipeline that runs them in order for one order.

mod aggregator;
mod discount;
mod mileage_surcharge;
mod pipeline;
mod rate_evaluator;
mod tier_resolver;

pub use aggregator::{
    AggregationResult, ChargeComponents, ChargeTotals, NEGATIVE_CLIENT_CHARGE, aggregate,
    calculate_totals,
};
pub use discount::{DiscountResult, calculate_discount, discount_for, policy_discount};
pub use mileage_surcharge::{
    MileageSide, MileageSurchargeResult, calculate_mileage_surcharge, calculate_surcharge,
};
pub use pipeline::{calculate_price, price_order};
pub use rate_evaluator::{
    CURRENCY_DECIMAL_PLACES, RateEvaluationResult, evaluate_rate, evaluate_tier_rate,
    round_currency,
};
pub use tier_resolver::{TierResolution, resolve, resolve_driver_tier, resolve_tier};
