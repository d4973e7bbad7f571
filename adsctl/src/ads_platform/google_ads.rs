//! Google Ads REST client.
//!
//! Every lookup is a GAQL query sent to `POST {base_url}/{api_version}/customers/{customer_id}/googleAds:search`.
//! Monetary values come back in micros and are converted to decimals here.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer};
use tracing::{debug, instrument};
use url::Url;

use super::{AdsPlatform, AdsPlatformError, DemographicsSnapshot, MetricsSnapshot, Result};
use crate::{
    config::GoogleAdsConfig,
    db::models::cpc::CpcFields,
    types::{EntityKind, UserId},
};

const MICROS: i64 = 1_000_000;

/// Decimal places kept for CPC values (matches the NUMERIC(10,4) columns)
const CPC_SCALE: u32 = 4;

/// Decimal places kept for spend (matches the NUMERIC(12,2) column)
const COST_SCALE: u32 = 2;

pub struct GoogleAdsPlatform {
    client: Client,
    search_url: Url,
    developer_token: String,
    access_token: String,
    login_customer_id: Option<String>,
    request_timeout: Duration,
}

impl GoogleAdsPlatform {
    pub fn new(config: GoogleAdsConfig, request_timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AdsPlatformError::Configuration(format!("invalid base_url '{}': {e}", config.base_url)))?;
        let search_url = ensure_slash(&base_url)
            .join(&format!("{}/customers/{}/googleAds:search", config.api_version, config.customer_id))
            .map_err(|e| AdsPlatformError::Configuration(format!("failed to construct search URL: {e}")))?;

        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            client,
            search_url,
            developer_token: config.developer_token,
            access_token: config.access_token,
            login_customer_id: config.login_customer_id,
            request_timeout,
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchRow>> {
        debug!(url = %self.search_url, query, "Running Google Ads query");

        let mut request = self
            .client
            .post(self.search_url.clone())
            .bearer_auth(&self.access_token)
            .header("developer-token", &self.developer_token)
            .json(&serde_json::json!({ "query": query }));
        if let Some(login_customer_id) = &self.login_customer_id {
            request = request.header("login-customer-id", login_customer_id);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Google Ads API returned {} for query: {}", status, query);
            return Err(AdsPlatformError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body_text = response.text().await.map_err(|e| self.classify(e))?;
        match serde_json::from_str::<SearchResponse>(&body_text) {
            Ok(parsed) => Ok(parsed.results),
            Err(e) => {
                tracing::error!("Failed to parse Google Ads response as JSON. Error: {}", e);
                tracing::debug!("Response body was: {}", body_text);
                Err(AdsPlatformError::InvalidResponse(e.to_string()))
            }
        }
    }

    fn classify(&self, error: reqwest::Error) -> AdsPlatformError {
        if error.is_timeout() {
            AdsPlatformError::Timeout(self.request_timeout)
        } else {
            AdsPlatformError::Transport(error)
        }
    }
}

/// Makes sure a url has a trailing slash, so that `join` appends rather than replaces the last
/// path segment.
fn ensure_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        url.clone()
    } else {
        let mut new_url = url.clone();
        let mut path = new_url.path().to_string();
        path.push('/');
        new_url.set_path(&path);
        new_url
    }
}

/// GAQL for one entity's metrics. External IDs are interpolated, so callers must pass digits only.
fn metrics_query(kind: EntityKind, external_id: &str) -> String {
    match kind {
        EntityKind::Campaign => format!(
            "SELECT campaign.id, campaign.target_spend.cpc_bid_ceiling_micros, metrics.average_cpc, \
             metrics.cost_micros, metrics.clicks FROM campaign WHERE campaign.id = {external_id}"
        ),
        EntityKind::AdGroup => format!(
            "SELECT ad_group.id, ad_group.cpc_bid_micros, metrics.average_cpc, metrics.cost_micros, \
             metrics.clicks FROM ad_group WHERE ad_group.id = {external_id}"
        ),
        EntityKind::Keyword => format!(
            "SELECT ad_group_criterion.criterion_id, ad_group_criterion.effective_cpc_bid_micros, \
             ad_group_criterion.quality_info.quality_score, metrics.average_cpc, metrics.impressions, \
             metrics.clicks, metrics.cost_micros FROM keyword_view \
             WHERE ad_group_criterion.criterion_id = {external_id}"
        ),
    }
}

const AGE_RANGE_QUERY: &str = "SELECT ad_group_criterion.age_range.type, metrics.impressions FROM age_range_view";
const GENDER_QUERY: &str = "SELECT ad_group_criterion.gender.type, metrics.impressions FROM gender_view";

#[async_trait]
impl AdsPlatform for GoogleAdsPlatform {
    #[instrument(skip(self), err)]
    async fn fetch_metrics(&self, kind: EntityKind, external_id: &str) -> Result<MetricsSnapshot> {
        let unknown = || AdsPlatformError::UnknownEntity {
            kind,
            external_id: external_id.to_string(),
        };

        if external_id.is_empty() || !external_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(unknown());
        }

        let rows = self.search(&metrics_query(kind, external_id)).await?;
        let row = rows.into_iter().next().ok_or_else(unknown)?;
        Ok(row.into_snapshot(kind))
    }

    /// Resolves the dominant audience bucket of the configured account, weighted by impressions.
    /// Confidence is the share of impressions in the weaker of the two dominant buckets.
    ///
    /// The API reports audiences per account, not per person, so every user receives the same
    /// snapshot and `user_id` only tags the span. A full refresh issues two queries per user.
    #[instrument(skip(self), err)]
    async fn fetch_demographics(&self, user_id: UserId) -> Result<DemographicsSnapshot> {
        let age_rows = self.search(AGE_RANGE_QUERY).await?;
        let gender_rows = self.search(GENDER_QUERY).await?;

        let age = dominant(age_rows.iter().filter_map(|row| {
            let criterion = row.ad_group_criterion.as_ref()?;
            Some((criterion.age_range.as_ref()?.kind.clone(), row.impressions()))
        }));
        let gender = dominant(gender_rows.iter().filter_map(|row| {
            let criterion = row.ad_group_criterion.as_ref()?;
            Some((criterion.gender.as_ref()?.kind.clone(), row.impressions()))
        }));

        let confidence = match (&age, &gender) {
            (Some((_, a)), Some((_, g))) => Some(a.min(*g)),
            (Some((_, share)), None) | (None, Some((_, share))) => Some(*share),
            (None, None) => None,
        };

        Ok(DemographicsSnapshot::from_labels(
            age.as_ref().map(|(label, _)| label.as_str()).unwrap_or_default(),
            gender.as_ref().map(|(label, _)| label.as_str()).unwrap_or_default(),
            confidence,
            "google_ads",
        ))
    }
}

/// Label with the most impressions and its share of the total. `None` when nothing was served.
fn dominant(weights: impl Iterator<Item = (String, i64)>) -> Option<(String, f64)> {
    let mut totals: HashMap<String, i64> = HashMap::new();
    for (label, impressions) in weights {
        *totals.entry(label).or_default() += impressions.max(0);
    }

    let total: i64 = totals.values().sum();
    if total == 0 {
        return None;
    }

    // Ties resolve to the alphabetically first label so results are stable
    let (label, count) = totals
        .into_iter()
        .max_by(|(la, ca), (lb, cb)| ca.cmp(cb).then_with(|| lb.cmp(la)))?;
    Some((label, count as f64 / total as f64))
}

fn micros_to_decimal(micros: i64, scale: u32) -> Decimal {
    (Decimal::from(micros) / Decimal::from(MICROS)).round_dp(scale)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SearchRow {
    campaign: Option<CampaignFields>,
    ad_group: Option<AdGroupFields>,
    ad_group_criterion: Option<CriterionFields>,
    metrics: Option<MetricFields>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CampaignFields {
    target_spend: Option<TargetSpend>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TargetSpend {
    #[serde(deserialize_with = "int64")]
    cpc_bid_ceiling_micros: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AdGroupFields {
    #[serde(deserialize_with = "int64")]
    cpc_bid_micros: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CriterionFields {
    #[serde(deserialize_with = "int64")]
    effective_cpc_bid_micros: Option<i64>,
    quality_info: Option<QualityInfo>,
    age_range: Option<TypedLabel>,
    gender: Option<TypedLabel>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct QualityInfo {
    quality_score: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
struct TypedLabel {
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct MetricFields {
    /// Micros, reported as a double
    average_cpc: Option<f64>,
    #[serde(deserialize_with = "int64")]
    cost_micros: Option<i64>,
    #[serde(deserialize_with = "int64")]
    clicks: Option<i64>,
    #[serde(deserialize_with = "int64")]
    impressions: Option<i64>,
}

/// The REST API encodes int64 fields as JSON strings
fn int64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64 {
        Number(i64),
        Text(String),
    }

    match Option::<Int64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Int64::Number(n)) => Ok(Some(n)),
        Some(Int64::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl SearchRow {
    fn impressions(&self) -> i64 {
        self.metrics.as_ref().and_then(|m| m.impressions).unwrap_or(0)
    }

    fn into_snapshot(self, kind: EntityKind) -> MetricsSnapshot {
        let metrics = self.metrics.unwrap_or_default();

        let average_cpc = metrics
            .average_cpc
            .and_then(|micros| Decimal::from_f64(micros / MICROS as f64))
            .map(|d| d.round_dp(CPC_SCALE));
        let cpc = match (metrics.cost_micros, metrics.clicks) {
            (Some(cost), Some(clicks)) if clicks > 0 => {
                Some((micros_to_decimal(cost, 6) / Decimal::from(clicks)).round_dp(CPC_SCALE))
            }
            _ => average_cpc,
        };

        let max_cpc_micros = match kind {
            EntityKind::Campaign => self
                .campaign
                .and_then(|c| c.target_spend)
                .and_then(|t| t.cpc_bid_ceiling_micros),
            EntityKind::AdGroup => self.ad_group.and_then(|g| g.cpc_bid_micros),
            EntityKind::Keyword => self.ad_group_criterion.as_ref().and_then(|c| c.effective_cpc_bid_micros),
        };

        let mut snapshot = MetricsSnapshot {
            cpc: CpcFields {
                cpc,
                average_cpc,
                max_cpc: max_cpc_micros.map(|m| micros_to_decimal(m, CPC_SCALE)),
            },
            ..Default::default()
        };

        if kind == EntityKind::Keyword {
            snapshot.quality_score = self
                .ad_group_criterion
                .and_then(|c| c.quality_info)
                .and_then(|q| q.quality_score);
            snapshot.impressions = metrics.impressions;
            snapshot.clicks = metrics.clicks;
            snapshot.cost = metrics.cost_micros.map(|m| micros_to_decimal(m, COST_SCALE));
        }

        snapshot
    }
}
