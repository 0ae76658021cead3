use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use givebox_core::donations::{
    Donation, DonationOrder, DonationQuery, DonationReceipt, DonationSubmission,
};
use givebox_core::{AccessPolicy, Operation};
use serde::Deserialize;

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiJson, ApiResult},
    main_lib::AppState,
};

/// Raw listing parameters. `limit` stays a string so that junk is ignored
/// instead of rejected.
#[derive(Debug, Default, Deserialize)]
struct DonationListParams {
    campaign: Option<String>,
    ordering: Option<String>,
    limit: Option<String>,
}

impl DonationListParams {
    fn into_query(self) -> DonationQuery {
        DonationQuery {
            campaign_id: self.campaign.filter(|c| !c.trim().is_empty()),
            donor_id: None,
            order: DonationOrder::from_param(self.ordering.as_deref()),
            limit: DonationQuery::parse_limit(self.limit.as_deref()),
        }
    }
}

async fn list_donations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DonationListParams>,
) -> ApiResult<Json<Vec<Donation>>> {
    let donations = state.donation_service.list_donations(&params.into_query())?;
    Ok(Json(donations))
}

async fn my_donations(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Donation>>> {
    let principal = AccessPolicy::require_principal(user.principal())?;
    let donations = state
        .donation_service
        .donations_by_donor(&principal.user_id)?;
    Ok(Json(donations))
}

async fn create_donation(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    body: Result<ApiJson<DonationSubmission>, ApiError>,
) -> ApiResult<(StatusCode, Json<DonationReceipt>)> {
    AccessPolicy::authorize(user.principal(), Operation::Create, None)?;
    let ApiJson(submission) = body?;
    let receipt = state
        .donation_service
        .submit_donation(submission, user.principal())
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/donations", get(list_donations).post(create_donation))
        .route("/donations/mine", get(my_donations))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparsable_limit_means_unlimited() {
        let query = DonationListParams {
            campaign: Some("c-1".into()),
            ordering: Some("-amount".into()),
            limit: Some("abc".into()),
        }
        .into_query();
        assert_eq!(query.limit, None);
        assert_eq!(query.order, DonationOrder::AmountDesc);
        assert_eq!(query.campaign_id.as_deref(), Some("c-1"));
    }

    #[test]
    fn blank_campaign_filter_is_ignored() {
        let query = DonationListParams {
            campaign: Some("  ".into()),
            limit: Some("2".into()),
            ..Default::default()
        }
        .into_query();
        assert!(query.campaign_id.is_none());
        assert_eq!(query.limit, Some(2));
        assert_eq!(query.order, DonationOrder::Newest);
    }
}
