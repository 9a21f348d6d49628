//! Core data models for the rate engine.
//!
//! This module contains the domain models shared by configuration, the
//! calculation pipeline and the HTTP API.

mod order;
mod pricing_result;
mod rate_value;
mod tier;

pub use order::{ClientType, OrderContext};
pub use pricing_result::{
    AppliedTier, AuditStep, AuditTrace, AuditWarning, PriceBreakdown, PricingResult, TierMatch,
};
pub use rate_value::{RateKind, RateValue};
pub use tier::{RateTier, TieBreakStrategy, TierRange, TierTable};
