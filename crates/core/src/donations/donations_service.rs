use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use crate::access::{AccessPolicy, Operation, Principal};
use crate::campaigns::CampaignRepositoryTrait;
use crate::constants::RECENT_DONATIONS_LIMIT;
use crate::donations::donations_model::{
    Donation, DonationQuery, DonationReceipt, DonationSubmission,
};
use crate::donations::donations_traits::{DonationRepositoryTrait, DonationServiceTrait};
use crate::errors::Result;

/// Records donations and keeps each campaign's raised total in step.
pub struct DonationService {
    donation_repo: Arc<dyn DonationRepositoryTrait>,
    campaign_repo: Arc<dyn CampaignRepositoryTrait>,
}

impl DonationService {
    pub fn new(
        donation_repo: Arc<dyn DonationRepositoryTrait>,
        campaign_repo: Arc<dyn CampaignRepositoryTrait>,
    ) -> Self {
        DonationService {
            donation_repo,
            campaign_repo,
        }
    }
}

#[async_trait]
impl DonationServiceTrait for DonationService {
    async fn submit_donation(
        &self,
        submission: DonationSubmission,
        principal: Option<&Principal>,
    ) -> Result<DonationReceipt> {
        AccessPolicy::authorize(principal, Operation::Create, None)?;
        let donor = AccessPolicy::require_principal(principal)?;

        let new_donation = submission.validate(Some(donor.user_id.clone()))?;
        let campaign = self.campaign_repo.get_by_id(&new_donation.campaign_id)?;
        debug!(
            "Recording {} donation from {} to campaign {}",
            new_donation.kind, donor.username, campaign.id
        );

        let receipt = self.donation_repo.record(new_donation).await?;
        info!(
            "Donation {} recorded for campaign {}; raised is now {}",
            receipt.donation.id, receipt.donation.campaign_id, receipt.raised
        );
        Ok(receipt)
    }

    fn list_donations(&self, query: &DonationQuery) -> Result<Vec<Donation>> {
        self.donation_repo.list(query)
    }

    fn recent_donations(&self, campaign_id: &str) -> Result<Vec<Donation>> {
        self.donation_repo.list(&DonationQuery {
            campaign_id: Some(campaign_id.to_string()),
            limit: Some(RECENT_DONATIONS_LIMIT),
            ..Default::default()
        })
    }

    fn donations_by_donor(&self, donor_id: &str) -> Result<Vec<Donation>> {
        self.donation_repo.list(&DonationQuery {
            donor_id: Some(donor_id.to_string()),
            ..Default::default()
        })
    }
}
