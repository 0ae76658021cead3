use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::access::Principal;
use crate::campaigns::campaigns_model::{
    Campaign, CampaignFilter, CampaignPage, CampaignSearch, CampaignUpdate, NewCampaign,
};
use crate::errors::Result;

/// Trait for campaign repository operations
#[async_trait]
pub trait CampaignRepositoryTrait: Send + Sync {
    fn get_by_id(&self, campaign_id: &str) -> Result<Campaign>;

    /// Campaigns matching `filter`, newest first.
    fn list(&self, filter: &CampaignFilter) -> Result<Vec<Campaign>>;

    /// Number of donations per campaign id. Campaigns without donations may be absent.
    fn donation_counts(&self, campaign_ids: &[String]) -> Result<HashMap<String, i64>>;

    async fn create(&self, new_campaign: NewCampaign, organizer_id: String) -> Result<Campaign>;

    async fn update(&self, campaign_id: String, changes: CampaignUpdate) -> Result<Campaign>;

    /// Deletes the campaign unless donations reference it (`Error::Conflict`).
    async fn delete_if_no_donations(&self, campaign_id: String) -> Result<usize>;

    /// Atomically adds `amount` to `raised` and returns the new total.
    async fn apply_contribution(&self, campaign_id: String, amount: Decimal) -> Result<Decimal>;
}

/// Trait for campaign service operations
#[async_trait]
pub trait CampaignServiceTrait: Send + Sync {
    fn get_campaign(&self, campaign_id: &str) -> Result<Campaign>;
    fn list_campaigns(&self) -> Result<Vec<Campaign>>;
    fn list_by_organizer(&self, organizer_id: &str) -> Result<Vec<Campaign>>;
    fn search_campaigns(&self, search: &CampaignSearch) -> Result<CampaignPage>;
    fn home_campaigns(&self) -> Result<Vec<Campaign>>;
    async fn create_campaign(
        &self,
        new_campaign: NewCampaign,
        principal: Option<&Principal>,
    ) -> Result<Campaign>;
    async fn update_campaign(
        &self,
        campaign_id: &str,
        changes: CampaignUpdate,
        principal: Option<&Principal>,
    ) -> Result<Campaign>;
    async fn delete_campaign(&self, campaign_id: &str, principal: Option<&Principal>)
        -> Result<()>;
    async fn apply_contribution(&self, campaign_id: &str, amount: Decimal) -> Result<Decimal>;
}
