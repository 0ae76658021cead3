//! Page surface: view models for the server-rendered pages.
//!
//! Every page handler returns the data a template would render. Form posts
//! answer with a `success` flag so that pages can show field errors inline.

use std::sync::Arc;

use axum::{
    extract::{FromRequest, Path, Query, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::NaiveDate;
use givebox_core::campaigns::{
    CampaignSearch, CampaignSort, CampaignStatus, CampaignUpdate, NewCampaign,
};
use givebox_core::categories::{category_name, Category};
use givebox_core::donations::{DonationKind, DonationSubmission};
use givebox_core::errors::{Error as CoreError, FieldErrors};
use givebox_core::{AccessPolicy, Operation};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    auth::CurrentUser,
    error::{classify_core, rejected_body},
    main_lib::AppState,
    models::{
        campaign_list, CampaignFormOptions, CampaignPageResponse, CampaignResponse,
        DashboardResponse,
    },
};

/// Failure body for page requests: field errors for invalid input, a
/// message otherwise.
#[derive(Debug)]
pub struct SiteError(CoreError);

impl<E: Into<CoreError>> From<E> for SiteError {
    fn from(err: E) -> Self {
        SiteError(err.into())
    }
}

#[derive(Serialize)]
struct FailureBody {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<FieldErrors>,
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let (status, message, errors) = classify_core(&self.0);
        let body = match errors {
            Some(errors) => FailureBody {
                success: false,
                message: None,
                errors: Some(errors),
            },
            None => FailureBody {
                success: false,
                message: Some(message),
                errors: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

type SiteResult<T> = Result<T, SiteError>;

/// `Form` whose rejection renders as page field errors.
#[derive(Debug)]
pub struct SiteForm<T>(pub T);

impl<S, T> FromRequest<S> for SiteForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = SiteError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(SiteForm(value)),
            Err(rejection) => Err(SiteError(rejected_body(&rejection.body_text()))),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_decimal(errors: &mut FieldErrors, field: &str, raw: Option<String>) -> Option<Decimal> {
    let raw = non_blank(raw)?;
    match raw.replace(',', ".").parse::<Decimal>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.add(field, "must be a number");
            None
        }
    }
}

fn parse_date(errors: &mut FieldErrors, field: &str, raw: Option<String>) -> Option<NaiveDate> {
    let raw = non_blank(raw)?;
    match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "must be a date (YYYY-MM-DD)");
            None
        }
    }
}

// ==================== Read pages ====================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HomePage {
    campaigns: Vec<CampaignResponse>,
}

async fn home(State(state): State<Arc<AppState>>) -> SiteResult<Json<HomePage>> {
    let campaigns = state.campaign_service.home_campaigns()?;
    Ok(Json(HomePage {
        campaigns: campaign_list(campaigns),
    }))
}

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    q: Option<String>,
    cat: Option<String>,
    orden: Option<String>,
    page: Option<String>,
}

impl SearchParams {
    fn into_search(self) -> CampaignSearch {
        CampaignSearch {
            query: self.q,
            category_id: self.cat,
            sort: CampaignSort::from_param(self.orden.as_deref()),
            page: self
                .page
                .and_then(|p| p.trim().parse::<usize>().ok())
                .unwrap_or(1),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchPage {
    results: CampaignPageResponse,
    categories: Vec<Category>,
    q: String,
    cat: String,
    orden: &'static str,
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> SiteResult<Json<SearchPage>> {
    let search = params.into_search();
    let results = state.campaign_service.search_campaigns(&search)?;
    let categories = state.category_service.get_all_categories()?;
    Ok(Json(SearchPage {
        results: results.into(),
        categories,
        q: search
            .query
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        cat: search.category().unwrap_or_default().to_string(),
        orden: search.sort.as_param(),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailPage {
    campaign: CampaignResponse,
    category_name: String,
    categories: Vec<Category>,
    can_edit: bool,
}

async fn campaign_detail(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> SiteResult<Json<DetailPage>> {
    let campaign = state.campaign_service.get_campaign(&id)?;
    let donations = state.donation_service.recent_donations(&id)?;
    let categories = state.category_service.get_all_categories()?;
    let can_edit =
        AccessPolicy::evaluate(user.principal(), Operation::Update, Some(&campaign)).is_allowed();
    Ok(Json(DetailPage {
        category_name: category_name(&categories, campaign.category_id.as_deref()),
        campaign: CampaignResponse::from(campaign).with_donations(donations),
        categories,
        can_edit,
    }))
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> SiteResult<Json<DashboardResponse>> {
    let dashboard = state.dashboard_service.dashboard(user.principal())?;
    Ok(Json(dashboard.into()))
}

// ==================== Campaign forms ====================

/// Campaign form as posted by the create and edit pages.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<String>,
    #[serde(alias = "monetary_goal")]
    pub monetary_goal: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub status: Option<String>,
}

impl CampaignForm {
    fn parse_status(errors: &mut FieldErrors, raw: Option<String>) -> Option<CampaignStatus> {
        let raw = non_blank(raw)?;
        match raw.parse() {
            Ok(status) => Some(status),
            Err(_) => {
                errors.add("status", "is not a valid choice");
                None
            }
        }
    }

    pub fn into_new_campaign(self) -> Result<NewCampaign, CoreError> {
        let mut errors = FieldErrors::new();
        let deadline = parse_date(&mut errors, "deadline", self.deadline);
        let monetary_goal =
            parse_decimal(&mut errors, "monetaryGoal", self.monetary_goal).unwrap_or_default();
        let status = Self::parse_status(&mut errors, self.status);
        errors.into_result()?;
        Ok(NewCampaign {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            deadline,
            monetary_goal,
            category_id: non_blank(self.category),
            image: non_blank(self.image),
            status,
        })
    }

    /// Fields left out of the form stay untouched; blank optional fields
    /// clear the stored value.
    pub fn into_update(self) -> Result<CampaignUpdate, CoreError> {
        let mut errors = FieldErrors::new();
        let deadline = self
            .deadline
            .map(|raw| parse_date(&mut errors, "deadline", Some(raw)));
        let monetary_goal = match self.monetary_goal {
            Some(raw) if raw.trim().is_empty() => Some(Decimal::ZERO),
            Some(raw) => parse_decimal(&mut errors, "monetaryGoal", Some(raw)),
            None => None,
        };
        let status = Self::parse_status(&mut errors, self.status);
        errors.into_result()?;
        Ok(CampaignUpdate {
            title: self.title,
            description: self.description,
            deadline,
            monetary_goal,
            category_id: self.category.map(|c| non_blank(Some(c))),
            image: self.image.map(|i| non_blank(Some(i))),
            status,
            organizer_id: None,
        })
    }
}

async fn new_campaign_form(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> SiteResult<Json<CampaignFormOptions>> {
    AccessPolicy::authorize(user.principal(), Operation::Create, None)?;
    let categories = state.category_service.get_all_categories()?;
    Ok(Json(CampaignFormOptions::new(categories)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CampaignSaved {
    success: bool,
    campaign: CampaignResponse,
}

async fn create_campaign(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    form: SiteResult<SiteForm<CampaignForm>>,
) -> SiteResult<(StatusCode, Json<CampaignSaved>)> {
    AccessPolicy::authorize(user.principal(), Operation::Create, None)?;
    let SiteForm(form) = form?;
    let new_campaign = form.into_new_campaign()?;
    let campaign = state
        .campaign_service
        .create_campaign(new_campaign, user.principal())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CampaignSaved {
            success: true,
            campaign: campaign.into(),
        }),
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EditPage {
    campaign: CampaignResponse,
    #[serde(flatten)]
    options: CampaignFormOptions,
}

async fn edit_campaign_form(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> SiteResult<Json<EditPage>> {
    let campaign = state.campaign_service.get_campaign(&id)?;
    AccessPolicy::authorize(user.principal(), Operation::Update, Some(&campaign))?;
    let categories = state.category_service.get_all_categories()?;
    Ok(Json(EditPage {
        campaign: campaign.into(),
        options: CampaignFormOptions::new(categories),
    }))
}

async fn edit_campaign(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    form: SiteResult<SiteForm<CampaignForm>>,
) -> SiteResult<Json<CampaignSaved>> {
    let current = state.campaign_service.get_campaign(&id)?;
    AccessPolicy::authorize(user.principal(), Operation::Update, Some(&current))?;
    let SiteForm(form) = form?;
    let changes = form.into_update()?;
    let campaign = state
        .campaign_service
        .update_campaign(&id, changes, user.principal())
        .await?;
    Ok(Json(CampaignSaved {
        success: true,
        campaign: campaign.into(),
    }))
}

// ==================== Donation form ====================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationForm {
    pub kind: Option<String>,
    pub amount: Option<String>,
    #[serde(alias = "item_description")]
    pub item_description: Option<String>,
}

impl DonationForm {
    pub fn into_submission(self, campaign_id: String) -> Result<DonationSubmission, CoreError> {
        let mut errors = FieldErrors::new();
        let kind = match non_blank(self.kind) {
            None => {
                errors.add("kind", "is required");
                DonationKind::default()
            }
            Some(raw) => raw.parse::<DonationKind>().unwrap_or_else(|_| {
                errors.add("kind", "is not a valid choice");
                DonationKind::default()
            }),
        };
        let amount = parse_decimal(&mut errors, "amount", self.amount);
        errors.into_result()?;
        Ok(DonationSubmission {
            campaign_id,
            kind,
            amount,
            item_description: self.item_description,
        })
    }
}

#[derive(Serialize)]
struct DonationAccepted {
    success: bool,
    message: String,
    new_recaudado: Decimal,
    new_porcentaje: u8,
}

async fn donate(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    form: SiteResult<SiteForm<DonationForm>>,
) -> SiteResult<Json<DonationAccepted>> {
    AccessPolicy::authorize(user.principal(), Operation::Create, None)?;
    let SiteForm(form) = form?;
    let submission = form.into_submission(id)?;
    let receipt = state
        .donation_service
        .submit_donation(submission, user.principal())
        .await?;
    tracing::info!(
        campaign = %receipt.donation.campaign_id,
        kind = %receipt.donation.kind,
        "donation accepted"
    );
    Ok(Json(DonationAccepted {
        success: true,
        message: "Thank you for your donation!".to_string(),
        new_recaudado: receipt.raised,
        new_porcentaje: receipt.percent_complete(),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/site/home", get(home))
        .route("/site/dashboard", get(dashboard))
        .route("/site/campaigns", get(search).post(create_campaign))
        .route("/site/campaigns/new", get(new_campaign_form))
        .route("/site/campaigns/{id}", get(campaign_detail))
        .route(
            "/site/campaigns/{id}/edit",
            get(edit_campaign_form).post(edit_campaign),
        )
        .route("/site/campaigns/{id}/donate", post(donate))
}
