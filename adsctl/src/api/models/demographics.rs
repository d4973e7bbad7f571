//! API request/response models for user demographics.

use crate::config::{MAX_STALE_WINDOW, MIN_STALE_WINDOW};
use crate::db::models::demographics::{AgeRange, DemographicsPerformance, DemographicsSummary, Gender, UserDemographics};
use crate::errors::{Error, Result};
use crate::types::{DemographicsId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use utoipa::{IntoParams, ToSchema};

/// Query parameters for refreshing stale records
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct StaleRefreshQuery {
    /// Refresh records last updated more than this many hours ago (1 to 8760). Defaults to the
    /// configured staleness window.
    pub older_than_hours: Option<u64>,
}

impl StaleRefreshQuery {
    pub fn window(&self, default: Duration) -> Result<Duration> {
        let Some(hours) = self.older_than_hours else {
            return Ok(default);
        };
        let window = Duration::from_secs(hours.saturating_mul(3600));
        if !(MIN_STALE_WINDOW..=MAX_STALE_WINDOW).contains(&window) {
            return Err(Error::BadRequest {
                message: "older_than_hours must be between 1 and 8760".to_string(),
            });
        }
        Ok(window)
    }
}

/// A user's demographics record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DemographicsResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: DemographicsId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub age_range: AgeRange,
    pub gender: Gender,
    /// Confidence of the classification, in [0, 1]
    pub confidence: Option<f64>,
    #[schema(example = "google_ads")]
    pub data_source: String,
    pub privacy_compliant: bool,
    pub last_updated_from_api: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserDemographics> for DemographicsResponse {
    fn from(db: UserDemographics) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            age_range: db.age_range,
            gender: db.gender,
            confidence: db.confidence,
            data_source: db.data_source,
            privacy_compliant: db.privacy_compliant,
            last_updated_from_api: db.last_updated_from_api,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Distribution of users across demographic buckets
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DemographicsSummaryResponse {
    /// User count per age range label
    pub age_distribution: BTreeMap<String, i64>,
    /// User count per gender label
    pub gender_distribution: BTreeMap<String, i64>,
    pub total_users: i64,
    /// Most recent platform refresh, null when there are no records
    pub last_updated: Option<DateTime<Utc>>,
}

impl From<DemographicsSummary> for DemographicsSummaryResponse {
    fn from(summary: DemographicsSummary) -> Self {
        Self {
            age_distribution: summary
                .age_distribution
                .into_iter()
                .map(|(age, count)| (age.to_string(), count))
                .collect(),
            gender_distribution: summary
                .gender_distribution
                .into_iter()
                .map(|(gender, count)| (gender.to_string(), count))
                .collect(),
            total_users: summary.total_users,
            last_updated: summary.last_updated,
        }
    }
}

/// Campaign metrics averaged over one demographic bucket
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DemographicsPerformanceResponse {
    pub age_range: AgeRange,
    pub gender: Gender,
    /// Distinct users in the bucket
    pub user_count: i64,
    pub click_through_rate: f64,
    pub conversion_rate: f64,
    pub average_cpc: f64,
    pub roas: f64,
}

impl From<DemographicsPerformance> for DemographicsPerformanceResponse {
    fn from(db: DemographicsPerformance) -> Self {
        Self {
            age_range: db.age_range,
            gender: db.gender,
            user_count: db.user_count,
            click_through_rate: db.click_through_rate,
            conversion_rate: db.conversion_rate,
            average_cpc: db.average_cpc,
            roas: db.roas,
        }
    }
}
