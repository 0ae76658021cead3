use rust_decimal::Decimal;
use serde::Serialize;

use crate::campaigns::Campaign;
use crate::donations::Donation;

/// Personal summary shown after sign-in.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub campaigns: Vec<Campaign>,
    pub donations: Vec<Donation>,
    /// Sum of the user's monetary donations.
    pub total_donated: Decimal,
    pub donation_count: usize,
    pub campaign_count: usize,
    /// Sum of `raised` over the user's own campaigns.
    pub total_raised: Decimal,
}

impl Dashboard {
    pub fn new(campaigns: Vec<Campaign>, donations: Vec<Donation>) -> Self {
        let total_donated = donations.iter().filter_map(|d| d.amount).sum();
        let total_raised = campaigns.iter().map(|c| c.raised).sum();
        Dashboard {
            donation_count: donations.len(),
            campaign_count: campaigns.len(),
            campaigns,
            donations,
            total_donated,
            total_raised,
        }
    }
}
