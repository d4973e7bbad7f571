//! OpenAPI documentation for the `/api/v1` surface.
//!
//! [`ApiDoc`] collects every handler annotated with `#[utoipa::path]` and is served as JSON at
//! `/openapi.json` and rendered by Scalar at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api;
use crate::db::models::{
    demographics::{AgeRange, Gender},
    keywords::MatchType,
};

/// Security scheme for the user identity header.
struct UserHeaderAddon;

impl Modify for UserHeaderAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "UserHeader".to_string(),
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "x-user-id",
                    "UUID of the acting user. The header name is configurable with `auth.user_header`.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "adsctl",
        description = "Campaigns, ad groups and keywords with CPC metrics synchronized from an ads platform, plus per-user demographics."
    ),
    servers(
        (url = "/api/v1", description = "Ads control layer API")
    ),
    modifiers(&UserHeaderAddon),
    paths(
        api::handlers::info::get_info,
        api::handlers::campaigns::list_campaigns,
        api::handlers::campaigns::create_campaign,
        api::handlers::campaigns::get_campaign,
        api::handlers::campaigns::delete_campaign,
        api::handlers::campaigns::update_campaign_cpc,
        api::handlers::campaigns::refresh_campaign_cpc,
        api::handlers::ad_groups::list_ad_groups,
        api::handlers::ad_groups::create_ad_group,
        api::handlers::ad_groups::get_ad_group,
        api::handlers::ad_groups::delete_ad_group,
        api::handlers::ad_groups::update_ad_group_cpc,
        api::handlers::ad_groups::refresh_ad_group_cpc,
        api::handlers::keywords::list_keywords,
        api::handlers::keywords::create_keyword,
        api::handlers::keywords::get_keyword,
        api::handlers::keywords::delete_keyword,
        api::handlers::keywords::update_keyword_cpc,
        api::handlers::keywords::refresh_keyword_cpc,
        api::handlers::demographics::get_user_demographics,
        api::handlers::demographics::update_user_demographics,
        api::handlers::demographics::get_demographics_summary,
        api::handlers::demographics::get_demographics_performance,
        api::handlers::demographics::refresh_all_demographics,
        api::handlers::demographics::refresh_stale_demographics,
    ),
    components(
        schemas(
            api::models::common::ErrorResponse,
            api::models::common::CpcUpdate,
            api::models::info::ServiceInfo,
            api::models::campaigns::CampaignCreate,
            api::models::campaigns::CampaignResponse,
            api::models::ad_groups::AdGroupCreate,
            api::models::ad_groups::AdGroupResponse,
            api::models::keywords::KeywordCreate,
            api::models::keywords::KeywordResponse,
            api::models::demographics::DemographicsResponse,
            api::models::demographics::DemographicsSummaryResponse,
            api::models::demographics::DemographicsPerformanceResponse,
            crate::services::RefreshReport,
            MatchType,
            AgeRange,
            Gender,
        )
    ),
    tags(
        (name = "info", description = "Service information"),
        (name = "campaigns", description = "Campaigns owned by the identified user"),
        (name = "ad_groups", description = "Ad groups within campaigns"),
        (name = "keywords", description = "Keywords within ad groups"),
        (name = "demographics", description = "User demographics from the ads platform"),
    )
)]
pub struct ApiDoc;
