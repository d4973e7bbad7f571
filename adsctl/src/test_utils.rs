//! Test utilities for API-level tests against the in-memory backend.

use crate::{
    api::models::{
        ad_groups::AdGroupResponse,
        campaigns::CampaignResponse,
        common::ApiResponse,
        keywords::KeywordResponse,
    },
    config::{Config, DatabaseConfig},
    db::{InMemoryStore, models::users::User},
    types::{AdGroupId, CampaignId},
};
use axum_test::TestServer;
use serde_json::json;

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseConfig::Memory,
        ..Default::default()
    }
}

/// Router over a fresh in-memory store and the mock ads platform. The store handle is returned
/// so tests can seed users.
pub fn create_test_app() -> (TestServer, InMemoryStore) {
    create_test_app_with_config(create_test_config())
}

pub fn create_test_app_with_config(config: Config) -> (TestServer, InMemoryStore) {
    let store = InMemoryStore::new();
    let state = crate::build_state(store.clone(), &config).expect("Failed to build application state");
    let router = crate::build_router(&state).expect("Failed to build router");
    let server = TestServer::new(router.into_make_service()).expect("Failed to create test server");
    (server, store)
}

pub fn user_header(user: &User) -> (&'static str, String) {
    ("x-user-id", user.id.to_string())
}

pub async fn create_test_campaign(server: &TestServer, user: &User, external_id: Option<&str>) -> CampaignResponse {
    let (name, value) = user_header(user);
    let response = server
        .post("/api/v1/campaigns")
        .add_header(name, value)
        .json(&json!({
            "name": "Spring Shoes",
            "google_ads_campaign_id": external_id,
            "click_through_rate": 0.05,
            "conversion_rate": 0.02,
            "roas": 3.5,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<ApiResponse<CampaignResponse>>().data
}

pub async fn create_test_ad_group(server: &TestServer, campaign_id: CampaignId, external_id: Option<&str>) -> AdGroupResponse {
    let response = server
        .post(&format!("/api/v1/campaigns/{campaign_id}/adgroups"))
        .json(&json!({
            "name": "Running",
            "google_ads_ad_group_id": external_id,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<ApiResponse<AdGroupResponse>>().data
}

pub async fn create_test_keyword(server: &TestServer, ad_group_id: AdGroupId, external_id: Option<&str>) -> KeywordResponse {
    let response = server
        .post(&format!("/api/v1/adgroups/{ad_group_id}/keywords"))
        .json(&json!({
            "text": "running shoes",
            "match_type": "exact",
            "google_ads_keyword_id": external_id,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<ApiResponse<KeywordResponse>>().data
}
