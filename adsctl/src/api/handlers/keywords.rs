use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    AppState,
    api::{
        extract::{JsonBody, PathParams},
        models::{
            common::{ApiResponse, CpcUpdate, ErrorResponse},
            keywords::{KeywordCreate, KeywordResponse},
        },
    },
    errors::Result,
};

#[utoipa::path(
    get,
    path = "/adgroups/{id}/keywords",
    tag = "keywords",
    summary = "List keywords of an ad group",
    description = "Returns an empty list when the ad group has no live keywords or does not exist.",
    responses(
        (status = 200, description = "Keywords of the ad group", body = ApiResponse<Vec<KeywordResponse>>),
        (status = 400, description = "Malformed ad group ID", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(("id" = uuid::Uuid, Path, description = "Ad group ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn list_keywords(
    State(state): State<AppState>,
    PathParams(ad_group_id): PathParams<Uuid>,
) -> Result<Json<ApiResponse<Vec<KeywordResponse>>>> {
    let keywords = state.keywords.list(ad_group_id).await?;
    Ok(Json(ApiResponse::new(
        "Keywords retrieved successfully",
        keywords.into_iter().map(KeywordResponse::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/adgroups/{id}/keywords",
    tag = "keywords",
    summary = "Create keyword",
    request_body = KeywordCreate,
    responses(
        (status = 201, description = "Keyword created", body = ApiResponse<KeywordResponse>),
        (status = 400, description = "Malformed ad group ID or body", body = ErrorResponse),
        (status = 404, description = "Ad group not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(("id" = uuid::Uuid, Path, description = "Ad group ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn create_keyword(
    State(state): State<AppState>,
    PathParams(ad_group_id): PathParams<Uuid>,
    JsonBody(create): JsonBody<KeywordCreate>,
) -> Result<(StatusCode, Json<ApiResponse<KeywordResponse>>)> {
    let draft = create.into_db_request()?;
    state.ad_groups.get(ad_group_id).await?;
    let keyword = state.keywords.create(ad_group_id, &draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Keyword created successfully", KeywordResponse::from(keyword))),
    ))
}

#[utoipa::path(
    get,
    path = "/keywords/{id}",
    tag = "keywords",
    summary = "Get keyword",
    responses(
        (status = 200, description = "Keyword details", body = ApiResponse<KeywordResponse>),
        (status = 400, description = "Malformed keyword ID", body = ErrorResponse),
        (status = 404, description = "Keyword not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(("id" = uuid::Uuid, Path, description = "Keyword ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn get_keyword(State(state): State<AppState>, PathParams(id): PathParams<Uuid>) -> Result<Json<ApiResponse<KeywordResponse>>> {
    let keyword = state.keywords.get(id).await?;
    Ok(Json(ApiResponse::new("Keyword retrieved successfully", KeywordResponse::from(keyword))))
}

#[utoipa::path(
    delete,
    path = "/keywords/{id}",
    tag = "keywords",
    summary = "Delete keyword",
    responses(
        (status = 204, description = "Keyword deleted"),
        (status = 400, description = "Malformed keyword ID", body = ErrorResponse),
        (status = 404, description = "Keyword not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(("id" = uuid::Uuid, Path, description = "Keyword ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_keyword(State(state): State<AppState>, PathParams(id): PathParams<Uuid>) -> Result<StatusCode> {
    state.keywords.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/keywords/{id}/cpc",
    tag = "keywords",
    summary = "Overwrite keyword CPC",
    description = "Writes all three CPC fields. Omitted fields are cleared.",
    request_body = CpcUpdate,
    responses(
        (status = 200, description = "CPC updated", body = ApiResponse<KeywordResponse>),
        (status = 400, description = "Malformed keyword ID or body", body = ErrorResponse),
        (status = 404, description = "Keyword not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(("id" = uuid::Uuid, Path, description = "Keyword ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn update_keyword_cpc(
    State(state): State<AppState>,
    PathParams(id): PathParams<Uuid>,
    JsonBody(update): JsonBody<CpcUpdate>,
) -> Result<Json<ApiResponse<KeywordResponse>>> {
    let keyword = state.keywords.update_cpc(id, update.into_fields()?).await?;
    Ok(Json(ApiResponse::new("Keyword CPC updated successfully", KeywordResponse::from(keyword))))
}

#[utoipa::path(
    post,
    path = "/keywords/{id}/refresh-cpc",
    tag = "keywords",
    summary = "Refresh keyword CPC and metrics",
    description = "Pulls CPC values, quality score, impressions, clicks and cost from the ads platform.",
    responses(
        (status = 200, description = "Metrics refreshed", body = ApiResponse<KeywordResponse>),
        (status = 400, description = "Malformed keyword ID", body = ErrorResponse),
        (status = 404, description = "Keyword not found", body = ErrorResponse),
        (status = 422, description = "Keyword is not linked to the ads platform", body = ErrorResponse),
        (status = 500, description = "Ads platform or storage failure", body = ErrorResponse)
    ),
    params(("id" = uuid::Uuid, Path, description = "Keyword ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn refresh_keyword_cpc(State(state): State<AppState>, PathParams(id): PathParams<Uuid>) -> Result<Json<ApiResponse<KeywordResponse>>> {
    let keyword = state.keywords.refresh_from_external(id).await?;
    Ok(Json(ApiResponse::new("Keyword CPC refreshed successfully", KeywordResponse::from(keyword))))
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::{
            common::{ApiResponse, ErrorResponse},
            keywords::KeywordResponse,
        },
        db::models::keywords::MatchType,
        test_utils::*,
    };
    use axum::http::StatusCode;
    use rust_decimal::Decimal;
    use serde_json::json;
    use uuid::Uuid;

    #[test_log::test(tokio::test)]
    async fn test_keyword_refresh_pulls_metrics() {
        let (app, store) = create_test_app();
        let user = store.seed_user("a@example.com").await;
        let campaign = create_test_campaign(&app, &user, None).await;
        let ad_group = create_test_ad_group(&app, campaign.id, None).await;
        let keyword = create_test_keyword(&app, ad_group.id, Some("987654321")).await;
        assert_eq!(keyword.match_type, MatchType::Exact);
        assert_eq!(keyword.cpc, None);

        let response = app.post(&format!("/api/v1/keywords/{}/refresh-cpc", keyword.id)).await;
        response.assert_status_ok();
        let body: ApiResponse<KeywordResponse> = response.json();
        assert_eq!(body.message, "Keyword CPC refreshed successfully");
        assert_eq!(body.data.cpc, Some(Decimal::new(135, 2)));
        assert_eq!(body.data.average_cpc, Some(Decimal::new(110, 2)));
        assert_eq!(body.data.max_cpc, Some(Decimal::new(175, 2)));
        assert_eq!(body.data.quality_score, Some(8));
        assert_eq!(body.data.impressions, Some(1000));
        assert_eq!(body.data.clicks, Some(50));
        assert_eq!(body.data.cost, Some(Decimal::new(6750, 2)));
        assert_eq!(body.data.text, keyword.text);
        assert_eq!(body.data.created_at, keyword.created_at);

        // Decimals travel as strings
        let raw: serde_json::Value = app.get(&format!("/api/v1/keywords/{}", keyword.id)).await.json();
        assert_eq!(raw["data"]["cost"], "67.50");
        assert_eq!(raw["message"], "Keyword retrieved successfully");
    }

    #[test_log::test(tokio::test)]
    async fn test_unlinked_keyword_refresh_leaves_record_untouched() {
        let (app, store) = create_test_app();
        let user = store.seed_user("a@example.com").await;
        let campaign = create_test_campaign(&app, &user, None).await;
        let ad_group = create_test_ad_group(&app, campaign.id, None).await;
        let keyword = create_test_keyword(&app, ad_group.id, None).await;

        let response = app.post(&format!("/api/v1/keywords/{}/refresh-cpc", keyword.id)).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "Keyword is not linked to the ads platform");

        let body: ApiResponse<KeywordResponse> = app.get(&format!("/api/v1/keywords/{}", keyword.id)).await.json();
        assert_eq!(body.data.updated_at, keyword.updated_at);
        assert_eq!(body.data.quality_score, None);
    }

    #[test_log::test(tokio::test)]
    async fn test_list_and_create_keywords() {
        let (app, store) = create_test_app();
        let user = store.seed_user("a@example.com").await;
        let campaign = create_test_campaign(&app, &user, None).await;
        let ad_group = create_test_ad_group(&app, campaign.id, None).await;

        let response = app
            .post(&format!("/api/v1/adgroups/{}/keywords", ad_group.id))
            .json(&json!({"text": "trail shoes"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<KeywordResponse> = response.json();
        assert_eq!(body.message, "Keyword created successfully");
        assert_eq!(body.data.match_type, MatchType::Broad);

        let response = app
            .post(&format!("/api/v1/adgroups/{}/keywords", ad_group.id))
            .json(&json!({"text": "trail shoes", "match_type": "fuzzy"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = app
            .post(&format!("/api/v1/adgroups/{}/keywords", Uuid::new_v4()))
            .json(&json!({"text": "trail shoes"}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = app.get(&format!("/api/v1/adgroups/{}/keywords", ad_group.id)).await;
        response.assert_status_ok();
        let body: ApiResponse<Vec<KeywordResponse>> = response.json();
        assert_eq!(body.message, "Keywords retrieved successfully");
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0].ad_group_id, ad_group.id);
    }

    #[test_log::test(tokio::test)]
    async fn test_keyword_cpc_update_and_delete() {
        let (app, store) = create_test_app();
        let user = store.seed_user("a@example.com").await;
        let campaign = create_test_campaign(&app, &user, None).await;
        let ad_group = create_test_ad_group(&app, campaign.id, None).await;
        let keyword = create_test_keyword(&app, ad_group.id, None).await;

        let response = app
            .put(&format!("/api/v1/keywords/{}/cpc", keyword.id))
            .json(&json!({"max_cpc": "5"}))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<KeywordResponse> = response.json();
        assert_eq!(body.message, "Keyword CPC updated successfully");
        assert_eq!(body.data.cpc, None);
        assert_eq!(body.data.max_cpc, Some(Decimal::new(5, 0)));

        let response = app
            .put(&format!("/api/v1/keywords/{}/cpc", keyword.id))
            .json(&json!({"max_cpc": "1000000"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        app.delete(&format!("/api/v1/keywords/{}", keyword.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        let body: ApiResponse<Vec<KeywordResponse>> = app
            .get(&format!("/api/v1/adgroups/{}/keywords", ad_group.id))
            .await
            .json();
        assert!(body.data.is_empty());
    }
}
