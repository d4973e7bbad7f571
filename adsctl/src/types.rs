//! Common type definitions.
//!
//! # ID Types
//!
//! All entity IDs are UUIDs wrapped in type aliases for readability:
//!
//! - [`UserId`]: Advertiser / audience member identifier
//! - [`CampaignId`]: Campaign identifier
//! - [`AdGroupId`]: Ad group identifier
//! - [`KeywordId`]: Keyword identifier
//!
//! # Entity kinds
//!
//! [`EntityKind`] names the three ad entities that carry CPC metrics. It is used to route
//! external platform lookups and to build user-facing error messages.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type CampaignId = Uuid;
pub type AdGroupId = Uuid;
pub type KeywordId = Uuid;
pub type DemographicsId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// The ad entities that carry CPC metrics and can be linked to the external ads platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Campaign,
    AdGroup,
    Keyword,
}

impl EntityKind {
    /// Stable snake_case name, matching the serialized form. Used for metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Campaign => "campaign",
            EntityKind::AdGroup => "ad_group",
            EntityKind::Keyword => "keyword",
        }
    }

    /// Capitalised name used in user-facing messages ("Campaign with ID ... not found")
    pub fn resource_name(&self) -> &'static str {
        match self {
            EntityKind::Campaign => "Campaign",
            EntityKind::AdGroup => "Ad group",
            EntityKind::Keyword => "Keyword",
        }
    }

    /// Capitalised name of the owning resource
    pub fn parent_resource_name(&self) -> &'static str {
        match self {
            EntityKind::Campaign => "User",
            EntityKind::AdGroup => "Campaign",
            EntityKind::Keyword => "Ad group",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Campaign => write!(f, "campaign"),
            EntityKind::AdGroup => write!(f, "ad group"),
            EntityKind::Keyword => write!(f, "keyword"),
        }
    }
}
