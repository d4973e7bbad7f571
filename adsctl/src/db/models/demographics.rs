//! Database models for per-user audience demographics.

use crate::types::{DemographicsId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

/// Age bucket stored as TEXT in database
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, PartialOrd, Ord, Hash, ToSchema)]
#[sqlx(type_name = "text")]
pub enum AgeRange {
    #[sqlx(rename = "18-24")]
    #[serde(rename = "18-24")]
    From18To24,
    #[sqlx(rename = "25-34")]
    #[serde(rename = "25-34")]
    From25To34,
    #[sqlx(rename = "35-44")]
    #[serde(rename = "35-44")]
    From35To44,
    #[sqlx(rename = "45-54")]
    #[serde(rename = "45-54")]
    From45To54,
    #[sqlx(rename = "55-64")]
    #[serde(rename = "55-64")]
    From55To64,
    #[sqlx(rename = "65+")]
    #[serde(rename = "65+")]
    Over65,
    #[default]
    #[sqlx(rename = "unknown")]
    #[serde(rename = "unknown")]
    Unknown,
}

impl AgeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeRange::From18To24 => "18-24",
            AgeRange::From25To34 => "25-34",
            AgeRange::From35To44 => "35-44",
            AgeRange::From45To54 => "45-54",
            AgeRange::From55To64 => "55-64",
            AgeRange::Over65 => "65+",
            AgeRange::Unknown => "unknown",
        }
    }

    /// Normalise an age label as reported by the ads platform. Both the platform enum names
    /// (`AGE_RANGE_25_34`) and the plain bucket labels (`25-34`) are accepted.
    pub fn from_platform(label: &str) -> Self {
        match label {
            "18-24" | "AGE_RANGE_18_24" => AgeRange::From18To24,
            "25-34" | "AGE_RANGE_25_34" => AgeRange::From25To34,
            "35-44" | "AGE_RANGE_35_44" => AgeRange::From35To44,
            "45-54" | "AGE_RANGE_45_54" => AgeRange::From45To54,
            "55-64" | "AGE_RANGE_55_64" => AgeRange::From55To64,
            "65+" | "AGE_RANGE_65_UP" | "AGE_RANGE_65_PLUS" => AgeRange::Over65,
            _ => AgeRange::Unknown,
        }
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gender stored as TEXT in database
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, PartialOrd, Ord, Hash, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
    Other,
    #[default]
    Unknown,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
            Gender::Other => "other",
            Gender::Unknown => "unknown",
        }
    }

    /// Normalise a gender label as reported by the ads platform
    pub fn from_platform(label: &str) -> Self {
        match label {
            "MALE" | "male" => Gender::Male,
            "FEMALE" | "female" => Gender::Female,
            "OTHER" | "other" => Gender::Other,
            _ => Gender::Unknown,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database representation of a user's demographics record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserDemographics {
    pub id: DemographicsId,
    pub user_id: UserId,
    pub age_range: AgeRange,
    pub gender: Gender,
    pub confidence: Option<f64>,
    pub data_source: String,
    pub privacy_compliant: bool,
    pub last_updated_from_api: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// The mutable fields written by an upsert, keyed by user. Identity and creation time of an
/// existing record are preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct DemographicsUpsert {
    pub user_id: UserId,
    pub age_range: AgeRange,
    pub gender: Gender,
    pub confidence: Option<f64>,
    pub data_source: String,
    pub privacy_compliant: bool,
    pub last_updated_from_api: DateTime<Utc>,
}

/// Result of a bulk upsert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpsertOutcome {
    pub inserted: usize,
    pub updated: usize,
}

/// Distribution of live demographics records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemographicsSummary {
    pub age_distribution: BTreeMap<AgeRange, i64>,
    pub gender_distribution: BTreeMap<Gender, i64>,
    pub total_users: i64,
    /// Most recent platform refresh, `None` when there are no records
    pub last_updated: Option<DateTime<Utc>>,
}

/// Campaign performance averaged over one (age range, gender) bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DemographicsPerformance {
    pub age_range: AgeRange,
    pub gender: Gender,
    pub user_count: i64,
    pub click_through_rate: f64,
    pub conversion_rate: f64,
    pub average_cpc: f64,
    pub roas: f64,
}
