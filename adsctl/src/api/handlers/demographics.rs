use axum::{Json, extract::State};

use crate::{
    AppState,
    api::{
        extract::{PathParams, QueryParams},
        models::{
            common::{ApiResponse, ErrorResponse},
            demographics::{DemographicsPerformanceResponse, DemographicsResponse, DemographicsSummaryResponse, StaleRefreshQuery},
        },
    },
    errors::Result,
    services::RefreshReport,
    types::UserId,
};

#[utoipa::path(
    get,
    path = "/demographics/users/{user_id}",
    tag = "demographics",
    summary = "Get user demographics",
    responses(
        (status = 200, description = "Stored demographics of the user", body = ApiResponse<DemographicsResponse>),
        (status = 400, description = "Malformed user ID", body = ErrorResponse),
        (status = 404, description = "No demographics stored for the user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(("user_id" = uuid::Uuid, Path, description = "User ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn get_user_demographics(
    State(state): State<AppState>,
    PathParams(user_id): PathParams<UserId>,
) -> Result<Json<ApiResponse<DemographicsResponse>>> {
    let record = state.demographics.get(user_id).await?;
    Ok(Json(ApiResponse::new(
        "User demographics retrieved successfully",
        DemographicsResponse::from(record),
    )))
}

#[utoipa::path(
    put,
    path = "/demographics/users/{user_id}",
    tag = "demographics",
    summary = "Refresh user demographics",
    description = "Fetches the user's demographics from the ads platform and stores them, creating the record if needed.",
    responses(
        (status = 200, description = "Demographics stored", body = ApiResponse<DemographicsResponse>),
        (status = 400, description = "Malformed user ID", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Ads platform or storage failure", body = ErrorResponse)
    ),
    params(("user_id" = uuid::Uuid, Path, description = "User ID"))
)]
#[tracing::instrument(skip_all)]
pub async fn update_user_demographics(
    State(state): State<AppState>,
    PathParams(user_id): PathParams<UserId>,
) -> Result<Json<ApiResponse<DemographicsResponse>>> {
    let record = state.demographics.update(user_id).await?;
    Ok(Json(ApiResponse::new(
        "User demographics updated successfully",
        DemographicsResponse::from(record),
    )))
}

#[utoipa::path(
    get,
    path = "/demographics/summary",
    tag = "demographics",
    summary = "Demographics distribution",
    responses(
        (status = 200, description = "User counts per age range and gender", body = ApiResponse<DemographicsSummaryResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_demographics_summary(State(state): State<AppState>) -> Result<Json<ApiResponse<DemographicsSummaryResponse>>> {
    let summary = state.demographics.summary().await?;
    Ok(Json(ApiResponse::new(
        "Demographics summary retrieved successfully",
        DemographicsSummaryResponse::from(summary),
    )))
}

#[utoipa::path(
    get,
    path = "/demographics/performance",
    tag = "demographics",
    summary = "Campaign performance by demographic bucket",
    description = "Averages the campaign metrics of each bucket's users. Buckets are ordered by user count, largest first.",
    responses(
        (status = 200, description = "Metrics per bucket", body = ApiResponse<Vec<DemographicsPerformanceResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_demographics_performance(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DemographicsPerformanceResponse>>>> {
    let buckets = state.demographics.performance_by_demographics().await?;
    Ok(Json(ApiResponse::new(
        "Performance by demographics retrieved successfully",
        buckets.into_iter().map(DemographicsPerformanceResponse::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/demographics/refresh/all",
    tag = "demographics",
    summary = "Refresh demographics of every user",
    description = "Users whose fetch fails are skipped; the successful ones are written in one transaction.",
    responses(
        (status = 200, description = "Refresh outcome", body = ApiResponse<RefreshReport>),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn refresh_all_demographics(State(state): State<AppState>) -> Result<Json<ApiResponse<RefreshReport>>> {
    let report = state.demographics.refresh_all().await?;
    Ok(Json(ApiResponse::new("All user demographics refreshed successfully", report)))
}

#[utoipa::path(
    post,
    path = "/demographics/refresh/stale",
    tag = "demographics",
    summary = "Refresh stale demographics",
    description = "Refreshes records last updated from the ads platform longer ago than the window.",
    responses(
        (status = 200, description = "Refresh outcome", body = ApiResponse<RefreshReport>),
        (status = 400, description = "older_than_hours out of range", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    params(StaleRefreshQuery)
)]
#[tracing::instrument(skip_all)]
pub async fn refresh_stale_demographics(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<StaleRefreshQuery>,
) -> Result<Json<ApiResponse<RefreshReport>>> {
    let window = query.window(state.config.demographics.default_stale_after)?;
    let report = state.demographics.refresh_stale(window).await?;
    Ok(Json(ApiResponse::new("Stale user demographics refreshed successfully", report)))
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::{
            common::{ApiResponse, ErrorResponse},
            demographics::{DemographicsPerformanceResponse, DemographicsResponse, DemographicsSummaryResponse},
        },
        db::models::demographics::{AgeRange, Gender},
        services::RefreshReport,
        test_utils::*,
    };
    use axum::http::StatusCode;
    use uuid::Uuid;

    #[test_log::test(tokio::test)]
    async fn test_get_and_update_user_demographics() {
        let (app, store) = create_test_app();
        let user = store.seed_user("a@example.com").await;
        let path = format!("/api/v1/demographics/users/{}", user.id);

        let response = app.get(&path).await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = app.put(&path).await;
        response.assert_status_ok();
        let created: ApiResponse<DemographicsResponse> = response.json();
        assert_eq!(created.message, "User demographics updated successfully");
        assert_eq!(created.data.user_id, user.id);
        assert_eq!(created.data.age_range, AgeRange::Unknown);
        assert_eq!(created.data.gender, Gender::Unknown);
        assert_eq!(created.data.data_source, "google_ads");

        let response = app.put(&path).await;
        response.assert_status_ok();
        let updated: ApiResponse<DemographicsResponse> = response.json();
        assert_eq!(updated.data.id, created.data.id);
        assert_eq!(updated.data.created_at, created.data.created_at);

        let response = app.get(&path).await;
        response.assert_status_ok();
        let fetched: ApiResponse<DemographicsResponse> = response.json();
        assert_eq!(fetched.message, "User demographics retrieved successfully");
        assert_eq!(fetched.data.id, created.data.id);
    }

    #[test_log::test(tokio::test)]
    async fn test_update_demographics_for_unknown_user() {
        let (app, _store) = create_test_app();

        let response = app.put(&format!("/api/v1/demographics/users/{}", Uuid::new_v4())).await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = app.get("/api/v1/demographics/users/not-a-uuid").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[test_log::test(tokio::test)]
    async fn test_summary_and_performance() {
        let (app, store) = create_test_app();

        let response = app.get("/api/v1/demographics/summary").await;
        response.assert_status_ok();
        let empty: ApiResponse<DemographicsSummaryResponse> = response.json();
        assert_eq!(empty.data.total_users, 0);
        assert_eq!(empty.data.last_updated, None);

        let user = store.seed_user("a@example.com").await;
        create_test_campaign(&app, &user, None).await;
        app.put(&format!("/api/v1/demographics/users/{}", user.id))
            .await
            .assert_status_ok();

        let response = app.get("/api/v1/demographics/summary").await;
        response.assert_status_ok();
        let summary: ApiResponse<DemographicsSummaryResponse> = response.json();
        assert_eq!(summary.message, "Demographics summary retrieved successfully");
        assert_eq!(summary.data.total_users, 1);
        assert_eq!(summary.data.age_distribution["unknown"], 1);
        assert_eq!(summary.data.gender_distribution["unknown"], 1);
        assert!(summary.data.last_updated.is_some());

        let response = app.get("/api/v1/demographics/performance").await;
        response.assert_status_ok();
        let performance: ApiResponse<Vec<DemographicsPerformanceResponse>> = response.json();
        assert_eq!(performance.data.len(), 1);
        let bucket = &performance.data[0];
        assert_eq!(bucket.user_count, 1);
        assert!((bucket.click_through_rate - 0.05).abs() < 1e-9);
        assert!((bucket.roas - 3.5).abs() < 1e-9);
    }

    #[test_log::test(tokio::test)]
    async fn test_refresh_all_and_stale() {
        let (app, store) = create_test_app();
        for i in 0..3 {
            store.seed_user(&format!("user{i}@example.com")).await;
        }

        let response = app.post("/api/v1/demographics/refresh/all").await;
        response.assert_status_ok();
        let body: ApiResponse<RefreshReport> = response.json();
        assert_eq!(body.message, "All user demographics refreshed successfully");
        assert_eq!(
            body.data,
            RefreshReport {
                attempted: 3,
                refreshed: 3,
                failed: 0,
                inserted: 3,
                updated: 0,
            }
        );

        // Everything was just refreshed
        let response = app.post("/api/v1/demographics/refresh/stale").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Stale user demographics refreshed successfully");
        assert_eq!(body["data"]["attempted"], 0);

        let response = app.post("/api/v1/demographics/refresh/stale?older_than_hours=1").await;
        response.assert_status_ok();
    }

    #[test_log::test(tokio::test)]
    async fn test_refresh_stale_rejects_bad_window() {
        let (app, _store) = create_test_app();

        for query in ["older_than_hours=0", "older_than_hours=8761", "older_than_hours=abc", "older_than_hours=-1"] {
            let response = app.post(&format!("/api/v1/demographics/refresh/stale?{query}")).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let body: ErrorResponse = response.json();
            assert!(!body.error.is_empty(), "{query}");
        }
    }
}
