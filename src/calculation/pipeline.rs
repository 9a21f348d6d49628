//! The pricing pipeline.
//!
//! Runs every calculation stage for one order, in a fixed order, and collects
//! the audit trace:
//!
//! 1. Client tier resolution
//! 2. Client rate evaluation
//! 3. Driver tier resolution
//! 4. Driver rate evaluation
//! 5. Client mileage surcharge
//! 6. Driver mileage surcharge
//! 7. Multi-order discount
//! 8. Result aggregation

use tracing::{debug, warn};

use crate::config::{DiscountSchedule, PricingProfile, RateCard};
use crate::models::{
    AppliedTier, AuditTrace, AuditWarning, OrderContext, PriceBreakdown, PricingResult,
    TieBreakStrategy, TierTable,
};

use super::aggregator::{ChargeComponents, calculate_totals};
use super::discount::calculate_discount;
use super::mileage_surcharge::{MileageSide, calculate_mileage_surcharge};
use super::rate_evaluator::evaluate_tier_rate;
use super::tier_resolver::{TierResolution, resolve_driver_tier, resolve_tier};

/// Prices `ctx` with the given profile, discount schedule and client tie-break
/// strategy.
///
/// The result depends only on the arguments.
pub fn price_order(
    profile: &PricingProfile,
    discounts: &DiscountSchedule,
    ctx: &OrderContext,
    tie_break: TieBreakStrategy,
) -> PricingResult {
    let mut trace = AuditTrace::default();
    let mut step_number: u32 = 1;
    let profile_name = profile.name.as_str();

    // Client side
    let client_table = profile.client_table.as_ref();
    let client_resolution = resolve_tier(client_table, ctx, tie_break);
    trace.steps.push(client_resolution.audit_step(
        client_table,
        ctx,
        step_number,
        "client_tier_resolution",
        "Client Tier Resolution",
    ));
    trace
        .warnings
        .extend(client_resolution.warnings(client_table, "client"));
    step_number += 1;

    let client_rate = client_resolution.tier.rate_for(ctx.has_gratuity);
    let base = evaluate_tier_rate(
        client_rate,
        ctx.subtotal,
        client_table.id(),
        "client_rate_evaluation",
        "Client Rate Evaluation",
        step_number,
    );
    trace.steps.push(base.audit_step);
    step_number += 1;

    // Driver side
    let driver_table = profile.driver_table.as_ref();
    let driver_resolution = resolve_driver_tier(driver_table, ctx);
    trace.steps.push(driver_resolution.audit_step(
        driver_table,
        ctx,
        step_number,
        "driver_tier_resolution",
        "Driver Tier Resolution",
    ));
    trace
        .warnings
        .extend(driver_resolution.warnings(driver_table, "driver"));
    step_number += 1;

    let driver_rate = evaluate_tier_rate(
        driver_resolution.tier.rate_for(ctx.has_gratuity),
        ctx.subtotal,
        driver_table.id(),
        "driver_rate_evaluation",
        "Driver Rate Evaluation",
        step_number,
    );
    trace.steps.push(driver_rate.audit_step);
    step_number += 1;

    // Mileage
    let client_mileage = calculate_mileage_surcharge(
        &profile.mileage,
        MileageSide::Client,
        ctx,
        profile_name,
        step_number,
    );
    trace.steps.push(client_mileage.audit_step);
    step_number += 1;

    let driver_mileage = calculate_mileage_surcharge(
        &profile.mileage,
        MileageSide::Driver,
        ctx,
        profile_name,
        step_number,
    );
    trace.steps.push(driver_mileage.audit_step);
    step_number += 1;

    // Discount
    let discount = calculate_discount(discounts, &ctx.client_type, ctx.order_count, step_number);
    trace.steps.push(discount.audit_step);
    step_number += 1;

    // Totals
    let components = ChargeComponents {
        base_charge: base.amount,
        client_mileage_surcharge: client_mileage.amount,
        driver_mileage_surcharge: driver_mileage.amount,
        toll_fee: ctx.toll_fee,
        discount: discount.amount,
        driver_rate: driver_rate.amount,
    };
    let aggregation = calculate_totals(&components, step_number);
    trace.steps.push(aggregation.audit_step);
    trace.warnings.extend(aggregation.warning);

    log_warnings(profile_name, &trace.warnings);

    let totals = aggregation.totals;
    debug!(
        client_type = %ctx.client_type,
        profile = profile_name,
        client_charge = %totals.client_charge,
        driver_pay = %totals.driver_pay,
        "order priced"
    );

    PricingResult {
        client_type: ctx.client_type.clone(),
        profile: profile_name.to_string(),
        client_charge: totals.client_charge,
        driver_pay: totals.driver_pay,
        rate_kind: client_rate.kind(),
        tie_break,
        applied_tier: applied_tier(&client_resolution, client_table, ctx.has_gratuity),
        driver_tier: applied_tier(&driver_resolution, driver_table, ctx.has_gratuity),
        breakdown: PriceBreakdown {
            base_charge: base.amount,
            client_mileage_surcharge: client_mileage.amount,
            driver_mileage_surcharge: driver_mileage.amount,
            toll_fee: ctx.toll_fee,
            discount: discount.amount,
            driver_rate: driver_rate.amount,
            tip_amount: ctx.tip_amount,
            driver_total: totals.driver_pay.saturating_add(ctx.tip_amount),
        },
        audit_trace: trace,
    }
}

/// Prices `ctx` with the profile registered for its client type.
///
/// Client types without a profile use the rate card's default profile. The
/// profile's tie-break strategy applies unless `tie_break` overrides it.
pub fn calculate_price(
    card: &RateCard,
    ctx: &OrderContext,
    tie_break: Option<TieBreakStrategy>,
) -> PricingResult {
    let profile = card.profile_for(&ctx.client_type);
    let strategy = tie_break.unwrap_or(profile.tie_break);
    price_order(profile, card.discounts(), ctx, strategy)
}

fn applied_tier(resolution: &TierResolution<'_>, table: &TierTable, has_gratuity: bool) -> AppliedTier {
    AppliedTier {
        table: table.id().to_string(),
        position: resolution.position,
        tier: resolution.tier.clone(),
        rate: resolution.tier.rate_for(has_gratuity),
        resolution: resolution.resolution,
    }
}

fn log_warnings(profile: &str, warnings: &[AuditWarning]) {
    for warning in warnings {
        // Ambiguity is expected for two-axis tables.
        if warning.severity == "low" {
            debug!(profile, code = %warning.code, "{}", warning.message);
        } else {
            warn!(profile, code = %warning.code, "{}", warning.message);
        }
    }
}
