//! Order context model.
//!
//! This module defines the facts a single rate calculation operates on.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of client an order belongs to (e.g. "standard", "corporate").
///
/// Client types are open-ended: they key pricing profiles and discount
/// policies, and names are normalized to trimmed lowercase.
///
/// # Example
///
/// ```
/// use rate_engine::models::ClientType;
///
/// assert_eq!(ClientType::new(" Corporate "), ClientType::new("corporate"));
/// assert_eq!(ClientType::new("Flower").as_str(), "flower");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ClientType(String);

impl ClientType {
    /// Creates a normalized client type.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_lowercase())
    }

    /// Returns the normalized name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ClientType {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for ClientType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<ClientType> for String {
    fn from(client_type: ClientType) -> Self {
        client_type.0
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The facts about one order that a rate calculation reads.
///
/// All amounts are expected to be non-negative and `order_count` at least 1;
/// the engine does not re-check these preconditions.
///
/// # Example
///
/// ```
/// use rate_engine::models::OrderContext;
/// use rust_decimal::Decimal;
///
/// let ctx = OrderContext::new("corporate")
///     .with_headcount(40)
///     .with_subtotal(Decimal::from(650))
///     .with_gratuity(true);
///
/// assert_eq!(ctx.order_count, 1);
/// assert_eq!(ctx.stops, 1);
/// assert!(ctx.has_gratuity);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderContext {
    /// The client type used to pick a pricing profile and discount policy.
    pub client_type: ClientType,
    /// Number of people the order serves.
    pub headcount: u32,
    /// Order subtotal in currency units.
    pub subtotal: Decimal,
    /// Total route mileage.
    pub mileage: Decimal,
    /// Tolls incurred on the route.
    pub toll_fee: Decimal,
    /// Whether gratuity is included in the order.
    pub has_gratuity: bool,
    /// Number of orders placed together by the client.
    pub order_count: u32,
    /// Number of delivery stops on the route.
    pub stops: u32,
    /// Tip collected for the driver.
    pub tip_amount: Decimal,
}

impl OrderContext {
    /// Creates a context for a single one-stop order with every amount at zero.
    pub fn new(client_type: impl Into<ClientType>) -> Self {
        Self {
            client_type: client_type.into(),
            headcount: 0,
            subtotal: Decimal::ZERO,
            mileage: Decimal::ZERO,
            toll_fee: Decimal::ZERO,
            has_gratuity: false,
            order_count: 1,
            stops: 1,
            tip_amount: Decimal::ZERO,
        }
    }

    /// Sets the headcount.
    pub fn with_headcount(mut self, headcount: u32) -> Self {
        self.headcount = headcount;
        self
    }

    /// Sets the order subtotal.
    pub fn with_subtotal(mut self, subtotal: Decimal) -> Self {
        self.subtotal = subtotal;
        self
    }

    /// Sets the total mileage.
    pub fn with_mileage(mut self, mileage: Decimal) -> Self {
        self.mileage = mileage;
        self
    }

    /// Sets the toll fee.
    pub fn with_toll_fee(mut self, toll_fee: Decimal) -> Self {
        self.toll_fee = toll_fee;
        self
    }

    /// Sets the gratuity flag.
    pub fn with_gratuity(mut self, has_gratuity: bool) -> Self {
        self.has_gratuity = has_gratuity;
        self
    }

    /// Sets the number of orders placed together.
    pub fn with_order_count(mut self, order_count: u32) -> Self {
        self.order_count = order_count;
        self
    }

    /// Sets the number of delivery stops.
    pub fn with_stops(mut self, stops: u32) -> Self {
        self.stops = stops;
        self
    }

    /// Sets the driver tip.
    pub fn with_tip_amount(mut self, tip_amount: Decimal) -> Self {
        self.tip_amount = tip_amount;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_type_deserializes_normalized() {
        let client_type: ClientType = serde_json::from_str("\"  MarketPlace \"").unwrap();
        assert_eq!(client_type.as_str(), "marketplace");
        assert_eq!(serde_json::to_string(&client_type).unwrap(), "\"marketplace\"");
    }

    #[test]
    fn test_client_type_as_map_key() {
        let map: std::collections::HashMap<ClientType, u32> =
            serde_yaml::from_str("Corporate: 1\nflower: 2").unwrap();
        assert_eq!(map.get(&ClientType::new("corporate")), Some(&1));
        assert_eq!(map.get(&ClientType::new("flower")), Some(&2));
    }

    #[test]
    fn test_new_context_defaults() {
        let ctx = OrderContext::new("standard");
        assert_eq!(ctx.headcount, 0);
        assert_eq!(ctx.subtotal, Decimal::ZERO);
        assert_eq!(ctx.order_count, 1);
        assert_eq!(ctx.stops, 1);
        assert!(!ctx.has_gratuity);
    }

    #[test]
    fn test_builder_sets_fields() {
        let ctx = OrderContext::new("flower")
            .with_stops(3)
            .with_mileage(Decimal::from(55))
            .with_toll_fee(Decimal::from(6))
            .with_order_count(2)
            .with_tip_amount(Decimal::from(10));
        assert_eq!(ctx.stops, 3);
        assert_eq!(ctx.mileage, Decimal::from(55));
        assert_eq!(ctx.toll_fee, Decimal::from(6));
        assert_eq!(ctx.order_count, 2);
        assert_eq!(ctx.tip_amount, Decimal::from(10));
    }
}
