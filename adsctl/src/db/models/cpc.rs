//! The CPC capability shared by campaigns, ad groups and keywords.

use crate::ads_platform::MetricsSnapshot;
use crate::types::EntityKind;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three cost-per-click fields carried by every ad entity.
///
/// Fields are independent: no ordering is enforced between them, and `None` clears a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpcFields {
    pub cpc: Option<Decimal>,
    pub average_cpc: Option<Decimal>,
    pub max_cpc: Option<Decimal>,
}

impl CpcFields {
    pub fn new(cpc: Decimal, average_cpc: Decimal, max_cpc: Decimal) -> Self {
        Self {
            cpc: Some(cpc),
            average_cpc: Some(average_cpc),
            max_cpc: Some(max_cpc),
        }
    }
}

/// Capability implemented by every entity the generic CPC service manages.
///
/// Storage backends use the lifecycle hooks (`from_draft`, `touch`, `mark_deleted`) so that one
/// generic store and one generic service can handle campaigns, ad groups and keywords alike.
pub trait CpcEntity: Clone + Send + Sync + 'static {
    /// Fields supplied by the caller when provisioning a new entity
    type Draft: Clone + Send + Sync + 'static;

    const KIND: EntityKind;

    fn id(&self) -> Uuid;

    /// Owner of this entity: the user for campaigns, the campaign for ad groups, the ad group
    /// for keywords
    fn parent_id(&self) -> Uuid;

    /// Identifier of this entity on the external ads platform, if linked
    fn external_id(&self) -> Option<&str>;

    fn cpc(&self) -> CpcFields;

    fn set_cpc(&mut self, cpc: CpcFields);

    fn created_at(&self) -> DateTime<Utc>;

    /// The platform-sourced fields currently held by this entity
    fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cpc: self.cpc(),
            ..Default::default()
        }
    }

    /// Overwrite the platform-sourced fields with a fresh snapshot. Identity, name and status
    /// are never touched.
    fn apply_snapshot(&mut self, snapshot: &MetricsSnapshot) {
        self.set_cpc(snapshot.cpc.clone());
    }

    fn from_draft(id: Uuid, parent_id: Uuid, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    fn touch(&mut self, now: DateTime<Utc>);

    fn is_deleted(&self) -> bool;

    fn mark_deleted(&mut self, now: DateTime<Utc>);
}
