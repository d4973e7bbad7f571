//! Behavioural tests shared by both storage backends.
//!
//! Each scenario is written once against the storage traits and run against the in-memory store.
//! The PostgreSQL variants are ignored by default; run them with `cargo test -- --ignored` and
//! `DATABASE_URL` pointing at a server that allows database creation.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::{
    DemographicsStore, EntityStore, InMemoryStore, PostgresStore,
    errors::DbError,
    handlers::Users,
    models::{
        ad_groups::{AdGroup, AdGroupCreateDBRequest},
        campaigns::{Campaign, CampaignCreateDBRequest},
        cpc::{CpcEntity, CpcFields},
        demographics::{AgeRange, DemographicsUpsert, Gender},
        keywords::{Keyword, KeywordCreateDBRequest, MatchType},
    },
};
use crate::types::UserId;

trait TestStore: EntityStore<Campaign> + EntityStore<AdGroup> + EntityStore<Keyword> + DemographicsStore {}
impl<T: EntityStore<Campaign> + EntityStore<AdGroup> + EntityStore<Keyword> + DemographicsStore> TestStore for T {}

fn campaign_draft(name: &str) -> CampaignCreateDBRequest {
    CampaignCreateDBRequest {
        name: name.to_string(),
        status: "active".to_string(),
        google_ads_campaign_id: Some("123456789".to_string()),
        cpc: CpcFields::default(),
        click_through_rate: None,
        conversion_rate: None,
        roas: None,
    }
}

fn demographics(user_id: UserId, age_range: AgeRange, gender: Gender, hours_ago: i64) -> DemographicsUpsert {
    DemographicsUpsert {
        user_id,
        age_range,
        gender,
        confidence: Some(0.5),
        data_source: "google_ads".to_string(),
        privacy_compliant: true,
        last_updated_from_api: Utc::now() - Duration::hours(hours_ago),
    }
}

async fn run_entity_lifecycle<S: TestStore>(store: &S, user_id: UserId) {
    let campaign = EntityStore::<Campaign>::create(store, user_id, &campaign_draft("Spring sale")).await.unwrap();
    assert_eq!(campaign.user_id, user_id);
    assert_eq!(campaign.cpc(), CpcFields::default());

    let second = EntityStore::<Campaign>::create(store, user_id, &campaign_draft("Summer sale")).await.unwrap();
    let listed = EntityStore::<Campaign>::list_by_parent(store, user_id).await.unwrap();
    assert_eq!(listed.iter().map(|c| c.id).collect::<Vec<_>>(), vec![campaign.id, second.id]);

    let mut changed = campaign.clone();
    changed.set_cpc(CpcFields {
        cpc: Some(Decimal::new(250, 2)),
        average_cpc: None,
        max_cpc: Some(Decimal::new(100, 2)),
    });
    let saved = store.save(&changed).await.unwrap();
    assert_eq!(saved.cpc, Some(Decimal::new(250, 2)));
    assert_eq!(saved.average_cpc, None);
    assert_eq!(saved.max_cpc, Some(Decimal::new(100, 2)));
    assert_eq!(saved.name, "Spring sale");
    assert_eq!(saved.created_at, campaign.created_at);

    assert!(EntityStore::<Campaign>::delete(store, campaign.id).await.unwrap());
    assert!(!EntityStore::<Campaign>::delete(store, campaign.id).await.unwrap());
    assert!(EntityStore::<Campaign>::get_by_id(store, campaign.id).await.unwrap().is_none());
    assert!(matches!(store.save(&changed).await, Err(DbError::NotFound)));

    let remaining = EntityStore::<Campaign>::list_by_parent(store, user_id).await.unwrap();
    assert_eq!(remaining.len(), 1);
}

async fn run_create_requires_parent<S: TestStore>(store: &S) {
    let draft = AdGroupCreateDBRequest {
        name: "Orphan".to_string(),
        status: "active".to_string(),
        targeting: None,
        google_ads_ad_group_id: None,
        cpc: CpcFields::default(),
    };
    let result = EntityStore::<AdGroup>::create(store, Uuid::new_v4(), &draft).await;
    assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));
}

async fn run_create_rejects_deleted_parent<S: TestStore>(store: &S, user_id: UserId) {
    let campaign = EntityStore::<Campaign>::create(store, user_id, &campaign_draft("Retired")).await.unwrap();
    let draft = AdGroupCreateDBRequest {
        name: "Late".to_string(),
        status: "active".to_string(),
        targeting: None,
        google_ads_ad_group_id: None,
        cpc: CpcFields::default(),
    };
    let ad_group = EntityStore::<AdGroup>::create(store, campaign.id, &draft).await.unwrap();

    assert!(EntityStore::<AdGroup>::delete(store, ad_group.id).await.unwrap());
    let keyword = KeywordCreateDBRequest {
        text: "late shoes".to_string(),
        match_type: MatchType::Broad,
        status: "active".to_string(),
        google_ads_keyword_id: None,
        cpc: CpcFields::default(),
    };
    let result = EntityStore::<Keyword>::create(store, ad_group.id, &keyword).await;
    assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));

    assert!(EntityStore::<Campaign>::delete(store, campaign.id).await.unwrap());
    let result = EntityStore::<AdGroup>::create(store, campaign.id, &draft).await;
    assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));
    assert!(EntityStore::<AdGroup>::list_by_parent(store, campaign.id).await.unwrap().is_empty());
}

async fn run_keyword_metrics_persist<S: TestStore>(store: &S, user_id: UserId) {
    let campaign = EntityStore::<Campaign>::create(store, user_id, &campaign_draft("Shoes")).await.unwrap();
    let ad_group = EntityStore::<AdGroup>::create(
        store,
        campaign.id,
        &AdGroupCreateDBRequest {
            name: "Running".to_string(),
            status: "active".to_string(),
            targeting: Some(serde_json::json!({ "locations": ["GB"] })),
            google_ads_ad_group_id: Some("555".to_string()),
            cpc: CpcFields::default(),
        },
    )
    .await
    .unwrap();
    let keyword = EntityStore::<Keyword>::create(
        store,
        ad_group.id,
        &KeywordCreateDBRequest {
            text: "trail shoes".to_string(),
            match_type: MatchType::Exact,
            status: "active".to_string(),
            google_ads_keyword_id: Some("987654321".to_string()),
            cpc: CpcFields::default(),
        },
    )
    .await
    .unwrap();

    let mut refreshed = keyword.clone();
    refreshed.quality_score = Some(8);
    refreshed.impressions = Some(1000);
    refreshed.clicks = Some(50);
    refreshed.cost = Some(Decimal::new(6750, 2));
    store.save(&refreshed).await.unwrap();

    let stored = EntityStore::<Keyword>::get_by_id(store, keyword.id).await.unwrap().unwrap();
    assert_eq!(stored.quality_score, Some(8));
    assert_eq!(stored.impressions, Some(1000));
    assert_eq!(stored.clicks, Some(50));
    assert_eq!(stored.cost, Some(Decimal::new(6750, 2)));
    assert_eq!(stored.match_type, MatchType::Exact);
}

async fn run_bulk_upsert_counts<S: TestStore>(store: &S, users: &[UserId]) {
    // Two of the four users already have records
    let existing_a = store
        .upsert(&demographics(users[0], AgeRange::From18To24, Gender::Male, 48))
        .await
        .unwrap();
    let existing_b = store
        .upsert(&demographics(users[1], AgeRange::Unknown, Gender::Unknown, 48))
        .await
        .unwrap();

    let batch: Vec<DemographicsUpsert> = users
        .iter()
        .map(|u| demographics(*u, AgeRange::From25To34, Gender::Female, 0))
        .collect();
    let outcome = store.bulk_upsert(&batch).await.unwrap();
    assert_eq!(outcome.inserted, 2);
    assert_eq!(outcome.updated, 2);

    let a = store.get_by_user(users[0]).await.unwrap().unwrap();
    assert_eq!(a.id, existing_a.id);
    assert_eq!(a.created_at, existing_a.created_at);
    assert_eq!(a.age_range, AgeRange::From25To34);
    assert_eq!(a.gender, Gender::Female);

    let b = store.get_by_user(users[1]).await.unwrap().unwrap();
    assert_eq!(b.id, existing_b.id);
    assert_eq!(b.created_at, existing_b.created_at);

    assert_eq!(store.summary().await.unwrap().total_users, 4);
}

async fn run_bulk_upsert_is_atomic<S: TestStore>(store: &S, user_id: UserId) {
    let batch = vec![
        demographics(user_id, AgeRange::From35To44, Gender::Other, 0),
        demographics(Uuid::new_v4(), AgeRange::From35To44, Gender::Other, 0),
    ];
    assert!(store.bulk_upsert(&batch).await.is_err());
    assert!(store.get_by_user(user_id).await.unwrap().is_none());
}

async fn run_stale_selection<S: TestStore>(store: &S, users: &[UserId]) {
    store
        .upsert(&demographics(users[0], AgeRange::Unknown, Gender::Unknown, 1))
        .await
        .unwrap();
    store
        .upsert(&demographics(users[1], AgeRange::Unknown, Gender::Unknown, 25))
        .await
        .unwrap();
    store
        .upsert(&demographics(users[2], AgeRange::Unknown, Gender::Unknown, 24 * 30))
        .await
        .unwrap();

    let stale = store.list_stale(Utc::now() - Duration::hours(24)).await.unwrap();
    let stale_users: Vec<UserId> = stale.iter().map(|d| d.user_id).collect();
    // Oldest first
    assert_eq!(stale_users, vec![users[2], users[1]]);
}

async fn run_summary<S: TestStore>(store: &S, users: &[UserId]) {
    let empty = store.summary().await.unwrap();
    assert_eq!(empty.total_users, 0);
    assert!(empty.last_updated.is_none());
    assert!(empty.age_distribution.is_empty());

    store
        .upsert(&demographics(users[0], AgeRange::From25To34, Gender::Female, 3))
        .await
        .unwrap();
    store
        .upsert(&demographics(users[1], AgeRange::From25To34, Gender::Male, 2))
        .await
        .unwrap();
    let newest = store
        .upsert(&demographics(users[2], AgeRange::Over65, Gender::Male, 1))
        .await
        .unwrap();

    let summary = store.summary().await.unwrap();
    assert_eq!(summary.total_users, 3);
    assert_eq!(summary.age_distribution.get(&AgeRange::From25To34), Some(&2));
    assert_eq!(summary.age_distribution.get(&AgeRange::Over65), Some(&1));
    assert_eq!(summary.gender_distribution.get(&Gender::Male), Some(&2));
    assert_eq!(summary.gender_distribution.get(&Gender::Female), Some(&1));
    assert_eq!(summary.last_updated, Some(newest.last_updated_from_api));
}

async fn run_performance<S: TestStore>(store: &S, users: &[UserId]) {
    for (user, ctr, cpc) in [(users[0], 0.04, Decimal::new(100, 2)), (users[1], 0.08, Decimal::new(200, 2))] {
        let mut draft = campaign_draft("Perf");
        draft.click_through_rate = Some(ctr);
        draft.conversion_rate = Some(0.01);
        draft.roas = Some(3.0);
        draft.cpc.average_cpc = Some(cpc);
        EntityStore::<Campaign>::create(store, user, &draft).await.unwrap();
    }

    store
        .upsert(&demographics(users[0], AgeRange::From25To34, Gender::Female, 0))
        .await
        .unwrap();
    store
        .upsert(&demographics(users[1], AgeRange::From25To34, Gender::Female, 0))
        .await
        .unwrap();
    // No campaigns for this user: metrics fall back to zero
    store
        .upsert(&demographics(users[2], AgeRange::From18To24, Gender::Male, 0))
        .await
        .unwrap();

    let rows = store.performance().await.unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].age_range, AgeRange::From25To34);
    assert_eq!(rows[0].gender, Gender::Female);
    assert_eq!(rows[0].user_count, 2);
    assert!((rows[0].click_through_rate - 0.06).abs() < 1e-9);
    assert!((rows[0].average_cpc - 1.5).abs() < 1e-9);
    assert!((rows[0].roas - 3.0).abs() < 1e-9);

    assert_eq!(rows[1].age_range, AgeRange::From18To24);
    assert_eq!(rows[1].user_count, 1);
    assert_eq!(rows[1].click_through_rate, 0.0);
    assert_eq!(rows[1].roas, 0.0);
}

async fn seed_memory_users(store: &InMemoryStore, n: usize) -> Vec<UserId> {
    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        ids.push(store.seed_user(&format!("user{i}@example.com")).await.id);
    }
    ids
}

async fn seed_pg_users(pool: &sqlx::PgPool, n: usize) -> Vec<UserId> {
    let mut conn = pool.acquire().await.unwrap();
    let mut repo = Users::new(&mut conn);
    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        ids.push(repo.create(&format!("user{i}@example.com")).await.unwrap().id);
    }
    ids
}

#[tokio::test]
async fn test_entity_lifecycle() {
    let store = InMemoryStore::new();
    let users = seed_memory_users(&store, 1).await;
    run_entity_lifecycle(&store, users[0]).await;
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_entity_lifecycle_postgres(pool: sqlx::PgPool) {
    let users = seed_pg_users(&pool, 1).await;
    run_entity_lifecycle(&PostgresStore::new(pool), users[0]).await;
}

#[tokio::test]
async fn test_create_requires_parent() {
    run_create_requires_parent(&InMemoryStore::new()).await;
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_requires_parent_postgres(pool: sqlx::PgPool) {
    run_create_requires_parent(&PostgresStore::new(pool)).await;
}

#[tokio::test]
async fn test_create_rejects_deleted_parent() {
    let store = InMemoryStore::new();
    let users = seed_memory_users(&store, 1).await;
    run_create_rejects_deleted_parent(&store, users[0]).await;
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_rejects_deleted_parent_postgres(pool: sqlx::PgPool) {
    let users = seed_pg_users(&pool, 1).await;
    run_create_rejects_deleted_parent(&PostgresStore::new(pool), users[0]).await;
}

#[tokio::test]
async fn test_keyword_metrics_persist() {
    let store = InMemoryStore::new();
    let users = seed_memory_users(&store, 1).await;
    run_keyword_metrics_persist(&store, users[0]).await;
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_keyword_metrics_persist_postgres(pool: sqlx::PgPool) {
    let users = seed_pg_users(&pool, 1).await;
    run_keyword_metrics_persist(&PostgresStore::new(pool), users[0]).await;
}

#[tokio::test]
async fn test_bulk_upsert_counts() {
    let store = InMemoryStore::new();
    let users = seed_memory_users(&store, 4).await;
    run_bulk_upsert_counts(&store, &users).await;
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_bulk_upsert_counts_postgres(pool: sqlx::PgPool) {
    let users = seed_pg_users(&pool, 4).await;
    run_bulk_upsert_counts(&PostgresStore::new(pool), &users).await;
}

#[tokio::test]
async fn test_bulk_upsert_is_atomic() {
    let store = InMemoryStore::new();
    let users = seed_memory_users(&store, 1).await;
    run_bulk_upsert_is_atomic(&store, users[0]).await;
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_bulk_upsert_is_atomic_postgres(pool: sqlx::PgPool) {
    let users = seed_pg_users(&pool, 1).await;
    run_bulk_upsert_is_atomic(&PostgresStore::new(pool), users[0]).await;
}

#[tokio::test]
async fn test_stale_selection() {
    let store = InMemoryStore::new();
    let users = seed_memory_users(&store, 3).await;
    run_stale_selection(&store, &users).await;
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_stale_selection_postgres(pool: sqlx::PgPool) {
    let users = seed_pg_users(&pool, 3).await;
    run_stale_selection(&PostgresStore::new(pool), &users).await;
}

#[tokio::test]
async fn test_summary() {
    let store = InMemoryStore::new();
    let users = seed_memory_users(&store, 3).await;
    run_summary(&store, &users).await;
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_summary_postgres(pool: sqlx::PgPool) {
    let users = seed_pg_users(&pool, 3).await;
    run_summary(&PostgresStore::new(pool), &users).await;
}

#[tokio::test]
async fn test_performance() {
    let store = InMemoryStore::new();
    let users = seed_memory_users(&store, 3).await;
    run_performance(&store, &users).await;
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_performance_postgres(pool: sqlx::PgPool) {
    let users = seed_pg_users(&pool, 3).await;
    run_performance(&PostgresStore::new(pool), &users).await;
}
