use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use givebox_core::campaigns::{CampaignUpdate, NewCampaign};
use givebox_core::{AccessPolicy, Operation};

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiJson, ApiResult},
    main_lib::AppState,
    models::{campaign_list, CampaignResponse},
};

async fn list_campaigns(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<CampaignResponse>>> {
    let campaigns = state.campaign_service.list_campaigns()?;
    Ok(Json(campaign_list(campaigns)))
}

async fn my_campaigns(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<CampaignResponse>>> {
    let principal = AccessPolicy::require_principal(user.principal())?;
    let campaigns = state
        .campaign_service
        .list_by_organizer(&principal.user_id)?;
    Ok(Json(campaign_list(campaigns)))
}

async fn get_campaign(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CampaignResponse>> {
    let campaign = state.campaign_service.get_campaign(&id)?;
    let donations = state.donation_service.recent_donations(&id)?;
    Ok(Json(CampaignResponse::from(campaign).with_donations(donations)))
}

async fn create_campaign(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    body: Result<ApiJson<NewCampaign>, ApiError>,
) -> ApiResult<(StatusCode, Json<CampaignResponse>)> {
    AccessPolicy::authorize(user.principal(), Operation::Create, None)?;
    let ApiJson(new_campaign) = body?;
    let campaign = state
        .campaign_service
        .create_campaign(new_campaign, user.principal())
        .await?;
    tracing::info!(campaign = %campaign.id, organizer = %campaign.organizer_username, "campaign created");
    Ok((StatusCode::CREATED, Json(campaign.into())))
}

async fn update_campaign(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    body: Result<ApiJson<CampaignUpdate>, ApiError>,
) -> ApiResult<Json<CampaignResponse>> {
    let current = state.campaign_service.get_campaign(&id)?;
    AccessPolicy::authorize(user.principal(), Operation::Update, Some(&current))?;
    let ApiJson(changes) = body?;
    let campaign = state
        .campaign_service
        .update_campaign(&id, changes, user.principal())
        .await?;
    Ok(Json(campaign.into()))
}

async fn delete_campaign(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<StatusCode> {
    state
        .campaign_service
        .delete_campaign(&id, user.principal())
        .await?;
    tracing::info!(campaign = %id, "campaign deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/campaigns", get(list_campaigns).post(create_campaign))
        .route("/campaigns/mine", get(my_campaigns))
        .route(
            "/campaigns/{id}",
            get(get_campaign)
                .put(update_campaign)
                .patch(update_campaign)
                .delete(delete_campaign),
        )
}
