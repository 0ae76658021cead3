//! Campaigns module - the campaign ledger, listing and search.

mod campaigns_model;
mod campaigns_service;
mod campaigns_traits;

#[cfg(test)]
mod campaigns_service_tests;


pub use campaigns_model::{
    paginate, percent_complete, sort_summaries, Campaign, CampaignFilter, CampaignPage,
    CampaignSearch, CampaignSort, CampaignStatus, CampaignSummary, CampaignUpdate, NewCampaign,
};
pub use campaigns_service::CampaignService;
pub use campaigns_traits::{CampaignRepositoryTrait, CampaignServiceTrait};
