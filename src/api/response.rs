//! Response types for the rate engine API.
//!
//! This module defines the success envelopes and the error response
//! structures for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{MileagePolicy, PricingProfile, RateCardMetadata};
use crate::models::{PricingResult, TieBreakStrategy};

/// Response body for the `/calculate` endpoint.
///
/// The pricing result is flattened into the envelope, so `client_charge`,
/// `driver_pay` and `breakdown` appear at the top level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResponse {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The version of the rate card that was applied.
    pub rate_card_version: String,
    /// Time taken to price the order, in microseconds.
    pub duration_us: u64,
    /// The pricing result.
    #[serde(flatten)]
    pub result: PricingResult,
}

/// One configured profile as reported by `/profiles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// The client type the profile is registered under.
    pub client_type: String,
    /// What the profile prices.
    pub description: String,
    /// Id of the client pricing table.
    pub client_table: String,
    /// Id of the driver compensation table.
    pub driver_table: String,
    /// Client tie-break strategy.
    pub tie_break: TieBreakStrategy,
    /// Mileage allowances and overage rates.
    pub mileage: MileagePolicy,
}

impl From<&PricingProfile> for ProfileSummary {
    fn from(profile: &PricingProfile) -> Self {
        Self {
            client_type: profile.name.to_string(),
            description: profile.description.clone(),
            client_table: profile.client_table.id().to_string(),
            driver_table: profile.driver_table.id().to_string(),
            tie_break: profile.tie_break,
            mileage: profile.mileage.clone(),
        }
    }
}

/// Response body for the `/profiles` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilesResponse {
    /// The loaded rate card.
    pub rate_card: RateCardMetadata,
    /// Profile used for client types without one of their own.
    pub default_profile: String,
    /// Every configured profile, ordered by client type.
    pub profiles: Vec<ProfileSummary>,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }
}
