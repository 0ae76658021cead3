//! Campaign domain models.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{CAMPAIGN_PAGE_SIZE, CAMPAIGN_TITLE_MAX_LEN};
use crate::errors::{FieldErrors, Result, ValidationError};
use crate::money::check_amount;

/// Lifecycle state of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    #[default]
    #[serde(alias = "ACT")]
    Active,
    #[serde(alias = "PAU")]
    Paused,
    #[serde(alias = "FIN")]
    Finished,
}

impl CampaignStatus {
    /// Three-letter code used by storage.
    pub fn as_code(&self) -> &'static str {
        match self {
            CampaignStatus::Active => "ACT",
            CampaignStatus::Paused => "PAU",
            CampaignStatus::Finished => "FIN",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

impl FromStr for CampaignStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACT" | "ACTIVE" => Ok(CampaignStatus::Active),
            "PAU" | "PAUSED" => Ok(CampaignStatus::Paused),
            "FIN" | "FINISHED" => Ok(CampaignStatus::Finished),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown campaign status '{}'",
                other
            ))),
        }
    }
}

/// Domain model representing a campaign
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: NaiveDateTime,
    pub deadline: Option<NaiveDate>,
    pub monetary_goal: Decimal,
    pub raised: Decimal,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub organizer_id: String,
    pub organizer_username: String,
    pub status: CampaignStatus,
    pub image: Option<String>,
}

impl Campaign {
    /// A goal of zero marks an item-based campaign.
    pub fn is_monetary(&self) -> bool {
        self.monetary_goal > Decimal::ZERO
    }

    /// Whole-number progress towards the monetary goal, clamped to `0..=100`.
    pub fn percent_complete(&self) -> u8 {
        percent_complete(self.raised, self.monetary_goal)
    }
}

/// `min(100, floor(raised / goal * 100))`, or 0 when there is no monetary goal.
pub fn percent_complete(raised: Decimal, goal: Decimal) -> u8 {
    if goal <= Decimal::ZERO || raised <= Decimal::ZERO {
        return 0;
    }
    let pct = (raised * Decimal::ONE_HUNDRED / goal).floor();
    pct.min(Decimal::ONE_HUNDRED).to_u8().unwrap_or(0)
}

/// Input model for creating a new campaign.
///
/// Carries no organizer; the service takes it from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub monetary_goal: Decimal,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: Option<CampaignStatus>,
}

impl NewCampaign {
    /// Validates the new campaign data, reporting every failing field.
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        check_title(&mut errors, &self.title);
        if self.description.trim().is_empty() {
            errors.add("description", "cannot be empty");
        }
        check_amount(&mut errors, "monetaryGoal", self.monetary_goal, true);
        errors.into_result()
    }
}

fn check_title(errors: &mut FieldErrors, title: &str) {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        errors.add("title", "cannot be empty");
    } else if trimmed.chars().count() > CAMPAIGN_TITLE_MAX_LEN {
        errors.add(
            "title",
            format!("must be at most {} characters", CAMPAIGN_TITLE_MAX_LEN),
        );
    }
}

/// Partial update of a campaign.
///
/// Nullable columns use a double option: absent leaves the value alone,
/// `null` clears it. `raised` is not updatable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub deadline: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monetary_goal: Option<Decimal>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub category_id: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub image: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CampaignStatus>,
    /// Present only so that attempts to reassign ownership can be refused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer_id: Option<String>,
}

impl CampaignUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.deadline.is_none()
            && self.monetary_goal.is_none()
            && self.category_id.is_none()
            && self.image.is_none()
            && self.status.is_none()
    }

    /// Validates the changed fields against `current`.
    pub fn validate(&self, current: &Campaign) -> Result<()> {
        let mut errors = FieldErrors::new();
        if let Some(organizer) = &self.organizer_id {
            if organizer != &current.organizer_id {
                errors.add("organizerId", "cannot be changed");
            }
        }
        if let Some(title) = &self.title {
            check_title(&mut errors, title);
        }
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                errors.add("description", "cannot be empty");
            }
        }
        if let Some(goal) = self.monetary_goal {
            check_amount(&mut errors, "monetaryGoal", goal, true);
        }
        errors.into_result()
    }

    /// The category this update points at, if it sets one.
    pub fn target_category(&self) -> Option<&str> {
        self.category_id.as_ref().and_then(|c| c.as_deref())
    }
}

/// Filter for plain campaign listings.
#[derive(Debug, Clone, Default)]
pub struct CampaignFilter {
    pub status: Option<CampaignStatus>,
    pub organizer_id: Option<String>,
    pub category_id: Option<String>,
    pub limit: Option<usize>,
}

/// Sort orders offered by the campaign search page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CampaignSort {
    /// Newest first.
    #[default]
    #[serde(rename = "recientes")]
    Recent,
    /// Most donations first.
    #[serde(rename = "populares")]
    Popular,
    /// Largest raised amount first.
    #[serde(rename = "recaudado")]
    MostRaised,
}

impl CampaignSort {
    /// Parses the `orden` query value, falling back to newest-first.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("populares") => CampaignSort::Popular,
            Some("recaudado") => CampaignSort::MostRaised,
            _ => CampaignSort::Recent,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            CampaignSort::Recent => "recientes",
            CampaignSort::Popular => "populares",
            CampaignSort::MostRaised => "recaudado",
        }
    }
}

/// Search over active campaigns.
#[derive(Debug, Clone, Default)]
pub struct CampaignSearch {
    pub query: Option<String>,
    pub category_id: Option<String>,
    pub sort: CampaignSort,
    /// 1-based page number.
    pub page: usize,
}

impl CampaignSearch {
    /// Normalized search text, `None` when blank.
    pub fn needle(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    pub fn category(&self) -> Option<&str> {
        self.category_id
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Case-insensitive substring match over title and description.
    pub fn matches(&self, campaign: &Campaign) -> bool {
        match self.needle() {
            None => true,
            Some(needle) => {
                campaign.title.to_lowercase().contains(&needle)
                    || campaign.description.to_lowercase().contains(&needle)
            }
        }
    }
}

/// A campaign together with its number of donations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub donation_count: i64,
}

/// One page of search results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPage {
    pub items: Vec<CampaignSummary>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_count: usize,
}

fn newest_first(a: &Campaign, b: &Campaign) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// Orders summaries for the given sort; ties fall back to newest-first.
pub fn sort_summaries(items: &mut [CampaignSummary], sort: CampaignSort) {
    match sort {
        CampaignSort::Recent => items.sort_by(|a, b| newest_first(&a.campaign, &b.campaign)),
        CampaignSort::Popular => items.sort_by(|a, b| {
            b.donation_count
                .cmp(&a.donation_count)
                .then_with(|| newest_first(&a.campaign, &b.campaign))
        }),
        CampaignSort::MostRaised => items.sort_by(|a, b| {
            b.campaign
                .raised
                .cmp(&a.campaign.raised)
                .then_with(|| newest_first(&a.campaign, &b.campaign))
        }),
    }
}

/// Slices a sorted result set into a fixed-size page.
///
/// Page numbers below 1 are treated as 1, and pages past the end are clamped
/// to the last page.
pub fn paginate(items: Vec<CampaignSummary>, page: usize) -> CampaignPage {
    let total_count = items.len();
    let total_pages = total_count.div_ceil(CAMPAIGN_PAGE_SIZE).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * CAMPAIGN_PAGE_SIZE;
    let items = items
        .into_iter()
        .skip(start)
        .take(CAMPAIGN_PAGE_SIZE)
        .collect();
    CampaignPage {
        items,
        page,
        page_size: CAMPAIGN_PAGE_SIZE,
        total_pages,
        total_count,
    }
}
