//! Tiered rate-resolution engine for catering delivery pricing.
//!
//! This crate resolves range-bound pricing tiers for an order, turns the
//! resolved rates into a client charge and an independent driver pay, and
//! applies mileage surcharges, tolls and multi-order discounts. Rate cards are
//! loaded from YAML and served over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod settings;
pub mod telemetry;
