use givebox_core::campaigns::{Campaign, CampaignPage, CampaignStatus, CampaignSummary};
use givebox_core::categories::Category;
use givebox_core::dashboard::Dashboard;
use givebox_core::donations::Donation;
use serde::Serialize;

/// Campaign record as exposed over HTTP, with its progress precomputed.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CampaignResponse {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub percent_complete: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donation_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_donations: Option<Vec<Donation>>,
}

impl From<Campaign> for CampaignResponse {
    fn from(campaign: Campaign) -> Self {
        Self {
            percent_complete: campaign.percent_complete(),
            campaign,
            donation_count: None,
            latest_donations: None,
        }
    }
}

impl From<CampaignSummary> for CampaignResponse {
    fn from(summary: CampaignSummary) -> Self {
        Self {
            donation_count: Some(summary.donation_count),
            ..CampaignResponse::from(summary.campaign)
        }
    }
}

impl CampaignResponse {
    pub fn with_donations(mut self, donations: Vec<Donation>) -> Self {
        self.latest_donations = Some(donations);
        self
    }
}

pub fn campaign_list(campaigns: Vec<Campaign>) -> Vec<CampaignResponse> {
    campaigns.into_iter().map(CampaignResponse::from).collect()
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPageResponse {
    pub items: Vec<CampaignResponse>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl From<CampaignPage> for CampaignPageResponse {
    fn from(page: CampaignPage) -> Self {
        Self {
            items: page.items.into_iter().map(CampaignResponse::from).collect(),
            has_previous: page.page > 1,
            has_next: page.page < page.total_pages,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
            total_count: page.total_count,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub campaigns: Vec<CampaignResponse>,
    pub donations: Vec<Donation>,
    pub total_donated: rust_decimal::Decimal,
    pub donation_count: usize,
    pub campaign_count: usize,
    pub total_raised: rust_decimal::Decimal,
}

impl From<Dashboard> for DashboardResponse {
    fn from(d: Dashboard) -> Self {
        Self {
            campaigns: campaign_list(d.campaigns),
            donations: d.donations,
            total_donated: d.total_donated,
            donation_count: d.donation_count,
            campaign_count: d.campaign_count,
            total_raised: d.total_raised,
        }
    }
}

/// Choices a campaign form offers.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CampaignFormOptions {
    pub categories: Vec<Category>,
    pub statuses: Vec<CampaignStatus>,
}

impl CampaignFormOptions {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories,
            statuses: vec![
                CampaignStatus::Active,
                CampaignStatus::Paused,
                CampaignStatus::Finished,
            ],
        }
    }
}
