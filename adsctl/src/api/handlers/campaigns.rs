use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    AppState,
    api::{
        extract::{JsonBody, PathParams},
        models::{
            campaigns::{CampaignCreate, CampaignResponse},
            common::{ApiResponse, CpcUpdate, ErrorResponse},
        },
    },
    auth::current_user::CurrentUser,
    errors::Result,
};

#[utoipa::path(
    get,
    path = "/campaigns",
    tag = "campaigns",
    summary = "List campaigns",
    description = "Lists the live campaigns owned by the user named in the identity header, oldest first.",
    responses(
        (status = 200, description = "Campaigns owned by the caller", body = ApiResponse<Vec<CampaignResponse>>),
        (status = 400, description = "Malformed user ID header", body = ErrorResponse),
        (status = 401, description = "Missing user ID header", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("UserHeader" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_campaigns(State(state): State<AppState>, user: CurrentUser) -> Result<Json<ApiResponse<Vec<CampaignResponse>>>> {
    let campaigns = state.campaigns.list(user.id).await?;
    Ok(Json(ApiResponse::new(
        "Campaigns retrieved successfully",
        campaigns.into_iter().map(CampaignResponse::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/campaigns",
    tag = "campaigns",
    summary = "Create campaign",
    request_body = CampaignCreate,
    responses(
        (status = 201, description = "Campaign created", body = ApiResponse<CampaignResponse>),
        (status = 400, description = "Invalid request body or user ID header", body = ErrorResponse),
        (status = 401, description = "Missing user ID header", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("UserHeader" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_campaign(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(create): JsonBody<CampaignCreate>,
) -> Result<(StatusCode, Json<ApiResponse<CampaignResponse>>)> {
    let draft = create.into_db_request()?;
    let campaign = state.campaigns.create(user.id, &draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Campaign created successfully", CampaignResponse::from(campaign))),
    ))
}

#[utoipa::path(
    get,
    path = "/campaigns/{id}",
    tag = "campaigns",
    summary = "Get campaign",
    responses(
        (status = 200, description = "Campaign details", body = ApiResponse<CampaignResponse>),
        (status = 400, description = "Malformed campaign ID", body = ErrorResponse),
        (status = 404, description = "Campaign not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(("id" = uuid::Uuid, Path, description = "Campaign ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn get_campaign(State(state): State<AppState>, PathParams(id): PathParams<Uuid>) -> Result<Json<ApiResponse<CampaignResponse>>> {
    let campaign = state.campaigns.get(id).await?;
    Ok(Json(ApiResponse::new("Campaign retrieved successfully", CampaignResponse::from(campaign))))
}

#[utoipa::path(
    delete,
    path = "/campaigns/{id}",
    tag = "campaigns",
    summary = "Delete campaign",
    responses(
        (status = 204, description = "Campaign deleted"),
        (status = 400, description = "Malformed campaign ID", body = ErrorResponse),
        (status = 404, description = "Campaign not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(("id" = uuid::Uuid, Path, description = "Campaign ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_campaign(State(state): State<AppState>, PathParams(id): PathParams<Uuid>) -> Result<StatusCode> {
    state.campaigns.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/campaigns/{id}/cpc",
    tag = "campaigns",
    summary = "Overwrite campaign CPC",
    description = "Writes all three CPC fields. Omitted fields are cleared.",
    request_body = CpcUpdate,
    responses(
        (status = 200, description = "CPC updated", body = ApiResponse<CampaignResponse>),
        (status = 400, description = "Malformed campaign ID or body", body = ErrorResponse),
        (status = 404, description = "Campaign not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(("id" = uuid::Uuid, Path, description = "Campaign ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn update_campaign_cpc(
    State(state): State<AppState>,
    PathParams(id): PathParams<Uuid>,
    JsonBody(update): JsonBody<CpcUpdate>,
) -> Result<Json<ApiResponse<CampaignResponse>>> {
    let campaign = state.campaigns.update_cpc(id, update.into_fields()?).await?;
    Ok(Json(ApiResponse::new("Campaign CPC updated successfully", CampaignResponse::from(campaign))))
}

#[utoipa::path(
    post,
    path = "/campaigns/{id}/refresh-cpc",
    tag = "campaigns",
    summary = "Refresh campaign CPC",
    description = "Pulls current CPC values from the ads platform and overwrites the stored ones.",
    responses(
        (status = 200, description = "CPC refreshed", body = ApiResponse<CampaignResponse>),
        (status = 400, description = "Malformed campaign ID", body = ErrorResponse),
        (status = 404, description = "Campaign not found", body = ErrorResponse),
        (status = 422, description = "Campaign is not linked to the ads platform", body = ErrorResponse),
        (status = 500, description = "Ads platform or storage failure", body = ErrorResponse)
    ),
    params(("id" = uuid::Uuid, Path, description = "Campaign ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn refresh_campaign_cpc(State(state): State<AppState>, PathParams(id): PathParams<Uuid>) -> Result<Json<ApiResponse<CampaignResponse>>> {
    let campaign = state.campaigns.refresh_from_external(id).await?;
    Ok(Json(ApiResponse::new(
        "Campaign CPC refreshed successfully",
        CampaignResponse::from(campaign),
    )))
}
