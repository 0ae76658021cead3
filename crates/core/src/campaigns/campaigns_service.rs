use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use rust_decimal::Decimal;

use crate::access::{AccessPolicy, Operation, Principal};
use crate::campaigns::campaigns_model::{
    paginate, sort_summaries, Campaign, CampaignFilter, CampaignPage, CampaignSearch,
    CampaignStatus, CampaignSummary, CampaignUpdate, NewCampaign,
};
use crate::campaigns::campaigns_traits::{CampaignRepositoryTrait, CampaignServiceTrait};
use crate::categories::CategoryRepositoryTrait;
use crate::constants::HOME_CAMPAIGN_LIMIT;
use crate::errors::{Error, FieldErrors, Result};
use crate::money::check_amount;

/// Service for managing campaigns and their raised totals.
pub struct CampaignService {
    campaign_repo: Arc<dyn CampaignRepositoryTrait>,
    category_repo: Arc<dyn CategoryRepositoryTrait>,
}

impl CampaignService {
    pub fn new(
        campaign_repo: Arc<dyn CampaignRepositoryTrait>,
        category_repo: Arc<dyn CategoryRepositoryTrait>,
    ) -> Self {
        CampaignService {
            campaign_repo,
            category_repo,
        }
    }

    fn ensure_category_exists(&self, category_id: Option<&str>) -> Result<()> {
        if let Some(category_id) = category_id {
            if self.category_repo.find_by_id(category_id)?.is_none() {
                return Err(Error::NotFound(format!(
                    "Category {} not found",
                    category_id
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CampaignServiceTrait for CampaignService {
    fn get_campaign(&self, campaign_id: &str) -> Result<Campaign> {
        self.campaign_repo.get_by_id(campaign_id)
    }

    fn list_campaigns(&self) -> Result<Vec<Campaign>> {
        self.campaign_repo.list(&CampaignFilter::default())
    }

    fn list_by_organizer(&self, organizer_id: &str) -> Result<Vec<Campaign>> {
        self.campaign_repo.list(&CampaignFilter {
            organizer_id: Some(organizer_id.to_string()),
            ..Default::default()
        })
    }

    fn search_campaigns(&self, search: &CampaignSearch) -> Result<CampaignPage> {
        let filter = CampaignFilter {
            status: Some(CampaignStatus::Active),
            category_id: search.category().map(str::to_string),
            ..Default::default()
        };
        let matching: Vec<Campaign> = self
            .campaign_repo
            .list(&filter)?
            .into_iter()
            .filter(|c| search.matches(c))
            .collect();

        let ids: Vec<String> = matching.iter().map(|c| c.id.clone()).collect();
        let counts = self.campaign_repo.donation_counts(&ids)?;

        let mut summaries: Vec<CampaignSummary> = matching
            .into_iter()
            .map(|campaign| {
                let donation_count = counts.get(&campaign.id).copied().unwrap_or(0);
                CampaignSummary {
                    campaign,
                    donation_count,
                }
            })
            .collect();
        sort_summaries(&mut summaries, search.sort);

        debug!(
            "Campaign search q={:?} cat={:?} orden={} matched {}",
            search.needle(),
            search.category(),
            search.sort.as_param(),
            summaries.len()
        );
        Ok(paginate(summaries, search.page))
    }

    fn home_campaigns(&self) -> Result<Vec<Campaign>> {
        self.campaign_repo.list(&CampaignFilter {
            status: Some(CampaignStatus::Active),
            limit: Some(HOME_CAMPAIGN_LIMIT),
            ..Default::default()
        })
    }

    async fn create_campaign(
        &self,
        mut new_campaign: NewCampaign,
        principal: Option<&Principal>,
    ) -> Result<Campaign> {
        AccessPolicy::authorize(principal, Operation::Create, None)?;
        let organizer = AccessPolicy::require_principal(principal)?;

        new_campaign.validate()?;
        new_campaign.title = new_campaign.title.trim().to_string();
        self.ensure_category_exists(new_campaign.category_id.as_deref())?;
        new_campaign.status.get_or_insert(CampaignStatus::Active);

        let campaign = self
            .campaign_repo
            .create(new_campaign, organizer.user_id.clone())
            .await?;
        info!(
            "Campaign {} created by {}",
            campaign.id, organizer.username
        );
        Ok(campaign)
    }

    async fn update_campaign(
        &self,
        campaign_id: &str,
        mut changes: CampaignUpdate,
        principal: Option<&Principal>,
    ) -> Result<Campaign> {
        let current = self.campaign_repo.get_by_id(campaign_id)?;
        AccessPolicy::authorize(principal, Operation::Update, Some(&current))?;

        changes.validate(&current)?;
        self.ensure_category_exists(changes.target_category())?;
        if changes.is_empty() {
            return Ok(current);
        }
        if let Some(title) = changes.title.as_mut() {
            *title = title.trim().to_string();
        }
        changes.organizer_id = None;

        self.campaign_repo
            .update(campaign_id.to_string(), changes)
            .await
    }

    async fn delete_campaign(
        &self,
        campaign_id: &str,
        principal: Option<&Principal>,
    ) -> Result<()> {
        let current = self.campaign_repo.get_by_id(campaign_id)?;
        AccessPolicy::authorize(principal, Operation::Delete, Some(&current))?;

        self.campaign_repo
            .delete_if_no_donations(campaign_id.to_string())
            .await?;
        info!("Campaign {} deleted", campaign_id);
        Ok(())
    }

    async fn apply_contribution(&self, campaign_id: &str, amount: Decimal) -> Result<Decimal> {
        let mut errors = FieldErrors::new();
        check_amount(&mut errors, "amount", amount, false);
        errors.into_result()?;

        self.campaign_repo
            .apply_contribution(campaign_id.to_string(), amount)
            .await
    }
}
