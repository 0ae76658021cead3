use async_trait::async_trait;

use crate::access::Principal;
use crate::donations::donations_model::{
    Donation, DonationQuery, DonationReceipt, DonationSubmission, NewDonation,
};
use crate::errors::Result;

/// Trait for donation repository operations
#[async_trait]
pub trait DonationRepositoryTrait: Send + Sync {
    /// Inserts the donation and applies its contribution to the campaign's
    /// raised total in a single transaction.
    async fn record(&self, new_donation: NewDonation) -> Result<DonationReceipt>;

    fn list(&self, query: &DonationQuery) -> Result<Vec<Donation>>;
}

/// Trait for donation service operations
#[async_trait]
pub trait DonationServiceTrait: Send + Sync {
    async fn submit_donation(
        &self,
        submission: DonationSubmission,
        principal: Option<&Principal>,
    ) -> Result<DonationReceipt>;
    fn list_donations(&self, query: &DonationQuery) -> Result<Vec<Donation>>;
    fn recent_donations(&self, campaign_id: &str) -> Result<Vec<Donation>>;
    fn donations_by_donor(&self, donor_id: &str) -> Result<Vec<Donation>>;
}
