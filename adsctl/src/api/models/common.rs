//! Envelope and payloads shared by every resource.

use crate::db::models::cpc::CpcFields;
use crate::errors::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Success envelope wrapping every API response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Human-readable outcome
    #[schema(example = "Campaign retrieved successfully")]
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

/// Error envelope returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Campaign with ID 550e8400-e29b-41d4-a716-446655440000 not found")]
    pub error: String,
}

/// Largest CPC value the storage columns hold (NUMERIC(10,4))
const MAX_CPC: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
/// Decimal places kept by the storage columns
const CPC_SCALE: u32 = 4;

/// Request body for overwriting the CPC fields. All three are written; an absent field is cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CpcUpdate {
    /// Cost per click
    #[schema(value_type = Option<String>, example = "1.50")]
    pub cpc: Option<Decimal>,
    /// Average cost per click
    #[schema(value_type = Option<String>, example = "1.25")]
    pub average_cpc: Option<Decimal>,
    /// Maximum cost per click
    #[schema(value_type = Option<String>, example = "2.00")]
    pub max_cpc: Option<Decimal>,
}

impl CpcUpdate {
    /// Each value is rounded to four decimal places, half away from zero as PostgreSQL does,
    /// and must then be non-negative and below one million. No ordering between the three
    /// values is required.
    pub fn into_fields(self) -> Result<CpcFields> {
        Ok(CpcFields {
            cpc: normalize_cpc("cpc", self.cpc)?,
            average_cpc: normalize_cpc("average_cpc", self.average_cpc)?,
            max_cpc: normalize_cpc("max_cpc", self.max_cpc)?,
        })
    }
}

fn normalize_cpc(field: &str, value: Option<Decimal>) -> Result<Option<Decimal>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let rounded = value.round_dp_with_strategy(CPC_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_sign_negative() || rounded >= MAX_CPC {
        return Err(Error::BadRequest {
            message: format!("{field} must be between 0 and 999999.9999"),
        });
    }
    Ok(Some(rounded))
}

/// Reject empty required strings
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::BadRequest {
            message: format!("{field} must not be empty"),
        });
    }
    Ok(trimmed.to_string())
}

pub(crate) fn default_status(status: Option<String>) -> Result<String> {
    match status {
        None => Ok("active".to_string()),
        Some(status) => require_non_empty("status", &status),
    }
}
