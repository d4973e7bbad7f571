//! In-memory implementation of the storage traits.
//!
//! All tables live behind a single lock, so every operation (including bulk upserts) is atomic.
//! Suitable for tests and single-process deployments. Data is lost on restart.

use crate::db::{
    errors::{DbError, Result},
    models::{
        ad_groups::AdGroup,
        campaigns::Campaign,
        cpc::CpcEntity,
        demographics::{
            AgeRange, DemographicsPerformance, DemographicsSummary, DemographicsUpsert, Gender, UpsertOutcome, UserDemographics,
        },
        keywords::Keyword,
        users::User,
    },
    store::{DemographicsStore, EntityStore},
};
use crate::types::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    campaigns: HashMap<Uuid, Campaign>,
    ad_groups: HashMap<Uuid, AdGroup>,
    keywords: HashMap<Uuid, Keyword>,
    /// Keyed by record id; at most one live record per user
    demographics: HashMap<Uuid, UserDemographics>,
}

impl Tables {
    fn live_demographics(&self) -> impl Iterator<Item = &UserDemographics> {
        self.demographics.values().filter(|d| d.deleted_at.is_none())
    }

    fn upsert_demographics(&mut self, record: &DemographicsUpsert, now: DateTime<Utc>) -> Result<(UserDemographics, bool)> {
        if !self.users.contains_key(&record.user_id) {
            return Err(foreign_key_violation("user_demographics", "user_id"));
        }
        if let Some(c) = record.confidence
            && !(0.0..=1.0).contains(&c)
        {
            return Err(DbError::CheckViolation {
                constraint: Some("user_demographics_confidence_check".to_string()),
                table: Some("user_demographics".to_string()),
                message: format!("confidence {c} out of range"),
            });
        }

        let existing = self
            .demographics
            .values_mut()
            .find(|d| d.user_id == record.user_id && d.deleted_at.is_none());

        match existing {
            Some(current) => {
                current.age_range = record.age_range;
                current.gender = record.gender;
                current.confidence = record.confidence;
                current.data_source = record.data_source.clone();
                current.privacy_compliant = record.privacy_compliant;
                current.last_updated_from_api = record.last_updated_from_api;
                current.updated_at = now;
                Ok((current.clone(), false))
            }
            None => {
                let created = UserDemographics {
                    id: Uuid::new_v4(),
                    user_id: record.user_id,
                    age_range: record.age_range,
                    gender: record.gender,
                    confidence: record.confidence,
                    data_source: record.data_source.clone(),
                    privacy_compliant: record.privacy_compliant,
                    last_updated_from_api: record.last_updated_from_api,
                    created_at: now,
                    updated_at: now,
                    deleted_at: None,
                };
                self.demographics.insert(created.id, created.clone());
                Ok((created, true))
            }
        }
    }
}

fn foreign_key_violation(table: &str, column: &str) -> DbError {
    DbError::ForeignKeyViolation {
        constraint: Some(format!("{table}_{column}_fkey")),
        table: Some(table.to_string()),
        message: format!("referenced {column} does not exist"),
    }
}

/// Binds an entity type to the table that holds it.
trait MemoryTable: CpcEntity {
    const TABLE: &'static str;
    const PARENT_COLUMN: &'static str;

    fn table(tables: &Tables) -> &HashMap<Uuid, Self>;
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self>;
    fn parent_exists(tables: &Tables, parent_id: Uuid) -> bool;
}

impl MemoryTable for Campaign {
    const TABLE: &'static str = "campaigns";
    const PARENT_COLUMN: &'static str = "user_id";

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.campaigns
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.campaigns
    }

    fn parent_exists(tables: &Tables, user_id: Uuid) -> bool {
        tables.users.contains_key(&user_id)
    }
}

impl MemoryTable for AdGroup {
    const TABLE: &'static str = "ad_groups";
    const PARENT_COLUMN: &'static str = "campaign_id";

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.ad_groups
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.ad_groups
    }

    fn parent_exists(tables: &Tables, campaign_id: Uuid) -> bool {
        tables.campaigns.get(&campaign_id).is_some_and(|c| !c.is_deleted())
    }
}

impl MemoryTable for Keyword {
    const TABLE: &'static str = "keywords";
    const PARENT_COLUMN: &'static str = "ad_group_id";

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.keywords
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.keywords
    }

    fn parent_exists(tables: &Tables, ad_group_id: Uuid) -> bool {
        tables.ad_groups.get(&ad_group_id).is_some_and(|g| !g.is_deleted())
    }
}

/// In-memory implementation of [`EntityStore`] and [`DemographicsStore`].
///
/// # Example
/// ```ignore
/// let store = InMemoryStore::new();
/// let user = store.seed_user("someone@example.com").await;
/// let campaign = EntityStore::<Campaign>::create(&store, user.id, &draft).await?;
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user, standing in for upstream provisioning
    pub async fn seed_user(&self, email: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        self.tables.write().await.users.insert(user.id, user.clone());
        user
    }
}

#[async_trait]
impl<E: MemoryTable> EntityStore<E> for InMemoryStore {
    async fn create(&self, parent_id: Uuid, draft: &E::Draft) -> Result<E> {
        let mut tables = self.tables.write().await;
        if !E::parent_exists(&tables, parent_id) {
            return Err(foreign_key_violation(E::TABLE, E::PARENT_COLUMN));
        }

        let entity = E::from_draft(Uuid::new_v4(), parent_id, draft.clone(), Utc::now());
        E::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<E>> {
        let tables = self.tables.read().await;
        Ok(E::table(&tables).get(&id).filter(|e| !e.is_deleted()).cloned())
    }

    async fn list_by_parent(&self, parent_id: Uuid) -> Result<Vec<E>> {
        let tables = self.tables.read().await;
        let mut children: Vec<E> = E::table(&tables)
            .values()
            .filter(|e| e.parent_id() == parent_id && !e.is_deleted())
            .cloned()
            .collect();
        children.sort_by_key(|e| (e.created_at(), e.id()));
        Ok(children)
    }

    async fn save(&self, entity: &E) -> Result<E> {
        let mut tables = self.tables.write().await;
        let stored = E::table_mut(&mut tables)
            .get_mut(&entity.id())
            .filter(|e| !e.is_deleted())
            .ok_or(DbError::NotFound)?;

        stored.apply_snapshot(&entity.snapshot());
        stored.touch(Utc::now());
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match E::table_mut(&mut tables).get_mut(&id).filter(|e| !e.is_deleted()) {
            Some(entity) => {
                entity.mark_deleted(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl DemographicsStore for InMemoryStore {
    async fn get_by_user(&self, user_id: UserId) -> Result<Option<UserDemographics>> {
        let tables = self.tables.read().await;
        Ok(tables.live_demographics().find(|d| d.user_id == user_id).cloned())
    }

    async fn upsert(&self, record: &DemographicsUpsert) -> Result<UserDemographics> {
        let mut tables = self.tables.write().await;
        let (stored, _) = tables.upsert_demographics(record, Utc::now())?;
        Ok(stored)
    }

    async fn bulk_upsert(&self, records: &[DemographicsUpsert]) -> Result<UpsertOutcome> {
        let mut tables = self.tables.write().await;

        let now = Utc::now();
        let mut outcome = UpsertOutcome::default();
        // Restored on failure so the batch is all-or-nothing
        let snapshot = tables.demographics.clone();
        for record in records {
            match tables.upsert_demographics(record, now) {
                Ok((_, true)) => outcome.inserted += 1,
                Ok((_, false)) => outcome.updated += 1,
                Err(e) => {
                    tables.demographics = snapshot;
                    return Err(e);
                }
            }
        }
        Ok(outcome)
    }

    async fn list_stale(&self, cutoff: DateTime<Utc>) -> Result<Vec<UserDemographics>> {
        let tables = self.tables.read().await;
        let mut stale: Vec<UserDemographics> = tables
            .live_demographics()
            .filter(|d| d.last_updated_from_api < cutoff)
            .cloned()
            .collect();
        stale.sort_by_key(|d| d.last_updated_from_api);
        Ok(stale)
    }

    async fn list_user_ids(&self) -> Result<Vec<UserId>> {
        let tables = self.tables.read().await;
        let mut users: Vec<&User> = tables.users.values().collect();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(users.into_iter().map(|u| u.id).collect())
    }

    async fn summary(&self) -> Result<DemographicsSummary> {
        let tables = self.tables.read().await;
        let mut summary = DemographicsSummary::default();
        for record in tables.live_demographics() {
            *summary.age_distribution.entry(record.age_range).or_default() += 1;
            *summary.gender_distribution.entry(record.gender).or_default() += 1;
            summary.total_users += 1;
            summary.last_updated = summary.last_updated.max(Some(record.last_updated_from_api));
        }
        Ok(summary)
    }

    async fn performance(&self) -> Result<Vec<DemographicsPerformance>> {
        let tables = self.tables.read().await;

        #[derive(Default)]
        struct Bucket {
            users: HashSet<UserId>,
            ctr: Vec<f64>,
            conversion: Vec<f64>,
            cpc: Vec<f64>,
            roas: Vec<f64>,
        }

        let mut buckets: BTreeMap<(AgeRange, Gender), Bucket> = BTreeMap::new();
        for record in tables.live_demographics() {
            let bucket = buckets.entry((record.age_range, record.gender)).or_default();
            bucket.users.insert(record.user_id);
            for campaign in tables
                .campaigns
                .values()
                .filter(|c| c.user_id == record.user_id && c.deleted_at.is_none())
            {
                bucket.ctr.extend(campaign.click_through_rate);
                bucket.conversion.extend(campaign.conversion_rate);
                bucket.cpc.extend(campaign.average_cpc.and_then(|d| d.to_f64()));
                bucket.roas.extend(campaign.roas);
            }
        }

        let mut rows: Vec<DemographicsPerformance> = buckets
            .into_iter()
            .map(|((age_range, gender), bucket)| DemographicsPerformance {
                age_range,
                gender,
                user_count: bucket.users.len() as i64,
                click_through_rate: mean(&bucket.ctr),
                conversion_rate: mean(&bucket.conversion),
                average_cpc: mean(&bucket.cpc),
                roas: mean(&bucket.roas),
            })
            .collect();
        // BTreeMap iteration already orders by (age, gender); a stable sort keeps that for ties
        rows.sort_by(|a, b| b.user_count.cmp(&a.user_count));
        Ok(rows)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
