use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    AppState,
    api::{
        extract::{JsonBody, PathParams},
        models::{
            ad_groups::{AdGroupCreate, AdGroupResponse},
            common::{ApiResponse, CpcUpdate, ErrorResponse},
        },
    },
    errors::Result,
};

#[utoipa::path(
    get,
    path = "/campaigns/{id}/adgroups",
    tag = "ad_groups",
    summary = "List ad groups of a campaign",
    description = "Returns an empty list when the campaign has no live ad groups or does not exist.",
    responses(
        (status = 200, description = "Ad groups of the campaign", body = ApiResponse<Vec<AdGroupResponse>>),
        (status = 400, description = "Malformed campaign ID", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(("id" = uuid::Uuid, Path, description = "Campaign ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn list_ad_groups(
    State(state): State<AppState>,
    PathParams(campaign_id): PathParams<Uuid>,
) -> Result<Json<ApiResponse<Vec<AdGroupResponse>>>> {
    let ad_groups = state.ad_groups.list(campaign_id).await?;
    Ok(Json(ApiResponse::new(
        "Ad groups retrieved successfully",
        ad_groups.into_iter().map(AdGroupResponse::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/campaigns/{id}/adgroups",
    tag = "ad_groups",
    summary = "Create ad group",
    request_body = AdGroupCreate,
    responses(
        (status = 201, description = "Ad group created", body = ApiResponse<AdGroupResponse>),
        (status = 400, description = "Malformed campaign ID or body", body = ErrorResponse),
        (status = 404, description = "Campaign not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(("id" = uuid::Uuid, Path, description = "Campaign ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn create_ad_group(
    State(state): State<AppState>,
    PathParams(campaign_id): PathParams<Uuid>,
    JsonBody(create): JsonBody<AdGroupCreate>,
) -> Result<(StatusCode, Json<ApiResponse<AdGroupResponse>>)> {
    let draft = create.into_db_request()?;
    // Soft-deleted campaigns still satisfy the foreign key
    state.campaigns.get(campaign_id).await?;
    let ad_group = state.ad_groups.create(campaign_id, &draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Ad group created successfully", AdGroupResponse::from(ad_group))),
    ))
}

#[utoipa::path(
    get,
    path = "/adgroups/{id}",
    tag = "ad_groups",
    summary = "Get ad group",
    responses(
        (status = 200, description = "Ad group details", body = ApiResponse<AdGroupResponse>),
        (status = 400, description = "Malformed ad group ID", body = ErrorResponse),
        (status = 404, description = "Ad group not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(("id" = uuid::Uuid, Path, description = "Ad group ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn get_ad_group(State(state): State<AppState>, PathParams(id): PathParams<Uuid>) -> Result<Json<ApiResponse<AdGroupResponse>>> {
    let ad_group = state.ad_groups.get(id).await?;
    Ok(Json(ApiResponse::new("Ad group retrieved successfully", AdGroupResponse::from(ad_group))))
}

#[utoipa::path(
    delete,
    path = "/adgroups/{id}",
    tag = "ad_groups",
    summary = "Delete ad group",
    responses(
        (status = 204, description = "Ad group deleted"),
        (status = 400, description = "Malformed ad group ID", body = ErrorResponse),
        (status = 404, description = "Ad group not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(("id" = uuid::Uuid, Path, description = "Ad group ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_ad_group(State(state): State<AppState>, PathParams(id): PathParams<Uuid>) -> Result<StatusCode> {
    state.ad_groups.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/adgroups/{id}/cpc",
    tag = "ad_groups",
    summary = "Overwrite ad group CPC",
    description = "Writes all three CPC fields. Omitted fields are cleared.",
    request_body = CpcUpdate,
    responses(
        (status = 200, description = "CPC updated", body = ApiResponse<AdGroupResponse>),
        (status = 400, description = "Malformed ad group ID or body", body = ErrorResponse),
        (status = 404, description = "Ad group not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(("id" = uuid::Uuid, Path, description = "Ad group ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn update_ad_group_cpc(
    State(state): State<AppState>,
    PathParams(id): PathParams<Uuid>,
    JsonBody(update): JsonBody<CpcUpdate>,
) -> Result<Json<ApiResponse<AdGroupResponse>>> {
    let ad_group = state.ad_groups.update_cpc(id, update.into_fields()?).await?;
    Ok(Json(ApiResponse::new("Ad group CPC updated successfully", AdGroupResponse::from(ad_group))))
}

#[utoipa::path(
    post,
    path = "/adgroups/{id}/refresh-cpc",
    tag = "ad_groups",
    summary = "Refresh ad group CPC",
    responses(
        (status = 200, description = "CPC refreshed", body = ApiResponse<AdGroupResponse>),
        (status = 400, description = "Malformed ad group ID", body = ErrorResponse),
        (status = 404, description = "Ad group not found", body = ErrorResponse),
        (status = 422, description = "Ad group is not linked to the ads platform", body = ErrorResponse),
        (status = 500, description = "Ads platform or storage failure", body = ErrorResponse)
    ),
    params(("id" = uuid::Uuid, Path, description = "Ad group ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn refresh_ad_group_cpc(State(state): State<AppState>, PathParams(id): PathParams<Uuid>) -> Result<Json<ApiResponse<AdGroupResponse>>> {
    let ad_group = state.ad_groups.refresh_from_external(id).await?;
    Ok(Json(ApiResponse::new("Ad group CPC refreshed successfully", AdGroupResponse::from(ad_group))))
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::{
            ad_groups::AdGroupResponse,
            common::{ApiResponse, ErrorResponse},
        },
        test_utils::*,
    };
    use axum::http::StatusCode;
    use rust_decimal::Decimal;
    use serde_json::json;
    use uuid::Uuid;

    #[test_log::test(tokio::test)]
    async fn test_list_ad_groups() {
        let (app, store) = create_test_app();
        let user = store.seed_user("a@example.com").await;
        let campaign = create_test_campaign(&app, &user, None).await;
        let first = create_test_ad_group(&app, campaign.id, None).await;
        let second = create_test_ad_group(&app, campaign.id, Some("456")).await;

        let response = app.get(&format!("/api/v1/campaigns/{}/adgroups", campaign.id)).await;
        response.assert_status_ok();
        let body: ApiResponse<Vec<AdGroupResponse>> = response.json();
        assert_eq!(body.message, "Ad groups retrieved successfully");
        let ids: Vec<_> = body.data.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);

        // Unknown campaign lists as empty
        let response = app.get(&format!("/api/v1/campaigns/{}/adgroups", Uuid::new_v4())).await;
        response.assert_status_ok();
        let body: ApiResponse<Vec<AdGroupResponse>> = response.json();
        assert!(body.data.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_create_ad_group_under_missing_or_deleted_campaign() {
        let (app, store) = create_test_app();
        let user = store.seed_user("a@example.com").await;

        let missing = Uuid::new_v4();
        let response = app
            .post(&format!("/api/v1/campaigns/{missing}/adgroups"))
            .json(&json!({"name": "Running"}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, format!("Campaign with ID {missing} not found"));

        let campaign = create_test_campaign(&app, &user, None).await;
        app.delete(&format!("/api/v1/campaigns/{}", campaign.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        let response = app
            .post(&format!("/api/v1/campaigns/{}/adgroups", campaign.id))
            .json(&json!({"name": "Running"}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[test_log::test(tokio::test)]
    async fn test_create_ad_group_rejects_non_object_targeting() {
        let (app, store) = create_test_app();
        let user = store.seed_user("a@example.com").await;
        let campaign = create_test_campaign(&app, &user, None).await;

        let response = app
            .post(&format!("/api/v1/campaigns/{}/adgroups", campaign.id))
            .json(&json!({"name": "Running", "targeting": [1, 2]}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = app
            .post(&format!("/api/v1/campaigns/{}/adgroups", campaign.id))
            .json(&json!({"name": "Running", "targeting": {"locations": ["US"]}}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<AdGroupResponse> = response.json();
        assert_eq!(body.data.targeting, Some(json!({"locations": ["US"]})));
        assert_eq!(body.data.campaign_id, campaign.id);
    }

    #[test_log::test(tokio::test)]
    async fn test_ad_group_cpc_update_and_refresh() {
        let (app, store) = create_test_app();
        let user = store.seed_user("a@example.com").await;
        let campaign = create_test_campaign(&app, &user, None).await;
        let ad_group = create_test_ad_group(&app, campaign.id, Some("456")).await;

        let response = app
            .put(&format!("/api/v1/adgroups/{}/cpc", ad_group.id))
            .json(&json!({"cpc": "0.90", "average_cpc": "0.80", "max_cpc": "1.10"}))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<AdGroupResponse> = response.json();
        assert_eq!(body.message, "Ad group CPC updated successfully");
        assert_eq!(body.data.cpc, Some(Decimal::new(90, 2)));

        let response = app.post(&format!("/api/v1/adgroups/{}/refresh-cpc", ad_group.id)).await;
        response.assert_status_ok();
        let body: ApiResponse<AdGroupResponse> = response.json();
        assert_eq!(body.data.cpc, Some(Decimal::new(140, 2)));
        assert_eq!(body.data.average_cpc, Some(Decimal::new(115, 2)));
        assert_eq!(body.data.max_cpc, Some(Decimal::new(180, 2)));

        let response = app.get(&format!("/api/v1/adgroups/{}", ad_group.id)).await;
        response.assert_status_ok();
        let body: ApiResponse<AdGroupResponse> = response.json();
        assert_eq!(body.message, "Ad group retrieved successfully");
        assert_eq!(body.data.max_cpc, Some(Decimal::new(180, 2)));
    }

    #[test_log::test(tokio::test)]
    async fn test_unlinked_ad_group_refresh_is_unprocessable() {
        let (app, store) = create_test_app();
        let user = store.seed_user("a@example.com").await;
        let campaign = create_test_campaign(&app, &user, None).await;
        let ad_group = create_test_ad_group(&app, campaign.id, None).await;

        let response = app.post(&format!("/api/v1/adgroups/{}/refresh-cpc", ad_group.id)).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "Ad group is not linked to the ads platform");

        app.delete(&format!("/api/v1/adgroups/{}", ad_group.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        app.post(&format!("/api/v1/adgroups/{}/refresh-cpc", ad_group.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
