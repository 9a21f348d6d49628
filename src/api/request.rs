//! Request types for the rate engine API.
//!
//! This module defines the JSON request structure for the `/calculate`
//! endpoint and its conversion into an [`OrderContext`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{OrderContext, TieBreakStrategy};

/// Largest amount (currency or miles) a request may carry.
pub const MAX_REQUEST_AMOUNT: u64 = 1_000_000_000;

/// A request amount above [`MAX_REQUEST_AMOUNT`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} exceeds the maximum of {max}")]
pub struct AmountTooLarge {
    /// The request field that was rejected.
    pub field: &'static str,
    /// The largest accepted value.
    pub max: Decimal,
}

/// Request body for the `/calculate` endpoint.
///
/// Only `client_type` is required. Counts are accepted as signed integers so
/// that out-of-range values can be coerced instead of rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The client type whose profile prices the order.
    pub client_type: String,
    /// Number of guests.
    #[serde(default)]
    pub headcount: i64,
    /// Order subtotal.
    #[serde(default)]
    pub subtotal: Decimal,
    /// Total delivery distance in miles.
    #[serde(default)]
    pub mileage: Decimal,
    /// Toll fee incurred on the delivery.
    #[serde(default)]
    pub toll_fee: Decimal,
    /// Whether gratuity is included in the order.
    #[serde(default)]
    pub has_gratuity: bool,
    /// Number of orders placed together.
    #[serde(default = "default_count")]
    pub order_count: i64,
    /// Number of stops on the route.
    #[serde(default = "default_count")]
    pub stops: i64,
    /// Tip passed through to the driver.
    #[serde(default)]
    pub tip_amount: Decimal,
    /// Overrides the profile's client tie-break strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie_break: Option<TieBreakStrategy>,
}

fn default_count() -> i64 {
    1
}

impl CalculationRequest {
    /// Creates a request for `client_type` with every other field defaulted.
    pub fn new(client_type: impl Into<String>) -> Self {
        Self {
            client_type: client_type.into(),
            headcount: 0,
            subtotal: Decimal::ZERO,
            mileage: Decimal::ZERO,
            toll_fee: Decimal::ZERO,
            has_gratuity: false,
            order_count: default_count(),
            stops: default_count(),
            tip_amount: Decimal::ZERO,
            tie_break: None,
        }
    }

    /// Converts the request into an order, coercing out-of-range values.
    ///
    /// Negative amounts and counts become zero, and `order_count` is raised to
    /// at least 1. Returns the order together with the names of the fields that
    /// were adjusted.
    ///
    /// # Errors
    ///
    /// Returns [`AmountTooLarge`] for the first amount above
    /// [`MAX_REQUEST_AMOUNT`].
    pub fn into_order_context(self) -> Result<(OrderContext, Vec<&'static str>), AmountTooLarge> {
        let mut adjusted = Vec::new();
        let max = Decimal::from(MAX_REQUEST_AMOUNT);

        let mut amount = |field: &'static str, value: Decimal| {
            if value > max {
                Err(AmountTooLarge { field, max })
            } else if value < Decimal::ZERO {
                adjusted.push(field);
                Ok(Decimal::ZERO)
            } else {
                Ok(value)
            }
        };
        let subtotal = amount("subtotal", self.subtotal)?;
        let mileage = amount("mileage", self.mileage)?;
        let toll_fee = amount("toll_fee", self.toll_fee)?;
        let tip_amount = amount("tip_amount", self.tip_amount)?;

        let mut count = |name: &'static str, value: i64, floor: u32| {
            let clamped = u32::try_from(value).unwrap_or(if value < 0 { 0 } else { u32::MAX });
            if clamped < floor || i64::from(clamped) != value {
                adjusted.push(name);
            }
            clamped.max(floor)
        };
        let headcount = count("headcount", self.headcount, 0);
        let order_count = count("order_count", self.order_count, 1);
        let stops = count("stops", self.stops, 0);

        let ctx = OrderContext::new(self.client_type)
            .with_headcount(headcount)
            .with_subtotal(subtotal)
            .with_mileage(mileage)
            .with_toll_fee(toll_fee)
            .with_gratuity(self.has_gratuity)
            .with_order_count(order_count)
            .with_stops(stops)
            .with_tip_amount(tip_amount);

        Ok((ctx, adjusted))
    }
}
