//! HTTP API module for the rate engine.
//!
//! This module provides the REST endpoints for pricing catering deliveries
//! and inspecting the loaded rate card.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{AmountTooLarge, CalculationRequest, MAX_REQUEST_AMOUNT};
pub use response::{
    ApiError, ApiErrorResponse, CalculationResponse, ProfileSummary, ProfilesResponse,
};
pub use state::AppState;
