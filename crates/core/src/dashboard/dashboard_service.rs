use std::sync::Arc;

use crate::access::{AccessPolicy, Principal};
use crate::campaigns::CampaignServiceTrait;
use crate::dashboard::dashboard_model::Dashboard;
use crate::donations::DonationServiceTrait;
use crate::errors::Result;

pub trait DashboardServiceTrait: Send + Sync {
    fn dashboard(&self, principal: Option<&Principal>) -> Result<Dashboard>;
}

pub struct DashboardService {
    campaign_service: Arc<dyn CampaignServiceTrait>,
    donation_service: Arc<dyn DonationServiceTrait>,
}

impl DashboardService {
    pub fn new(
        campaign_service: Arc<dyn CampaignServiceTrait>,
        donation_service: Arc<dyn DonationServiceTrait>,
    ) -> Self {
        DashboardService {
            campaign_service,
            donation_service,
        }
    }
}

impl DashboardServiceTrait for DashboardService {
    fn dashboard(&self, principal: Option<&Principal>) -> Result<Dashboard> {
        let principal = AccessPolicy::require_principal(principal)?;
        let campaigns = self.campaign_service.list_by_organizer(&principal.user_id)?;
        let donations = self.donation_service.donations_by_donor(&principal.user_id)?;
        Ok(Dashboard::new(campaigns, donations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaigns::{
        Campaign, CampaignPage, CampaignSearch, CampaignStatus, CampaignUpdate, NewCampaign,
    };
    use crate::donations::{
        Donation, DonationKind, DonationQuery, DonationReceipt, DonationSubmission,
    };
    use crate::errors::{AuthorizationError, Error};
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    struct MockCampaignService;

    #[async_trait]
    impl CampaignServiceTrait for MockCampaignService {
        fn get_campaign(&self, _campaign_id: &str) -> Result<Campaign> {
            unimplemented!()
        }

        fn list_campaigns(&self) -> Result<Vec<Campaign>> {
            unimplemented!()
        }

        fn list_by_organizer(&self, organizer_id: &str) -> Result<Vec<Campaign>> {
            let raised = [dec!(40), dec!(12.50)];
            Ok(raised
                .iter()
                .enumerate()
                .map(|(i, r)| Campaign {
                    id: format!("c-{}", i),
                    title: "Ropa de invierno".to_string(),
                    description: "Abrigos".to_string(),
                    created_at: Utc::now().naive_utc(),
                    deadline: None,
                    monetary_goal: dec!(100),
                    raised: *r,
                    category_id: None,
                    category_name: None,
                    organizer_id: organizer_id.to_string(),
                    organizer_username: "ana".to_string(),
                    status: CampaignStatus::Active,
                    image: None,
                })
                .collect())
        }

        fn search_campaigns(&self, _search: &CampaignSearch) -> Result<CampaignPage> {
            unimplemented!()
        }

        fn home_campaigns(&self) -> Result<Vec<Campaign>> {
            unimplemented!()
        }

        async fn create_campaign(
            &self,
            _new_campaign: NewCampaign,
            _principal: Option<&Principal>,
        ) -> Result<Campaign> {
            unimplemented!()
        }

        async fn update_campaign(
            &self,
            _campaign_id: &str,
            _changes: CampaignUpdate,
            _principal: Option<&Principal>,
        ) -> Result<Campaign> {
            unimplemented!()
        }

        async fn delete_campaign(
            &self,
            _campaign_id: &str,
            _principal: Option<&Principal>,
        ) -> Result<()> {
            unimplemented!()
        }

        async fn apply_contribution(&self, _campaign_id: &str, _amount: Decimal) -> Result<Decimal> {
            unimplemented!()
        }
    }

    struct MockDonationService;

    #[async_trait]
    impl DonationServiceTrait for MockDonationService {
        async fn submit_donation(
            &self,
            _submission: DonationSubmission,
            _principal: Option<&Principal>,
        ) -> Result<DonationReceipt> {
            unimplemented!()
        }

        fn list_donations(&self, _query: &DonationQuery) -> Result<Vec<Donation>> {
            unimplemented!()
        }

        fn recent_donations(&self, _campaign_id: &str) -> Result<Vec<Donation>> {
            unimplemented!()
        }

        fn donations_by_donor(&self, donor_id: &str) -> Result<Vec<Donation>> {
            let donation = |id: &str, kind, amount| Donation {
                id: id.to_string(),
                campaign_id: "c-9".to_string(),
                campaign_title: "Comedor".to_string(),
                donor_id: Some(donor_id.to_string()),
                donor_username: Some("ana".to_string()),
                kind,
                amount,
                item_description: None,
                created_at: Utc::now().naive_utc(),
            };
            Ok(vec![
                donation("d-1", DonationKind::Monetary, Some(dec!(30))),
                donation("d-2", DonationKind::Item, None),
                donation("d-3", DonationKind::Monetary, Some(dec!(45))),
            ])
        }
    }

    fn service() -> DashboardService {
        DashboardService::new(Arc::new(MockCampaignService), Arc::new(MockDonationService))
    }

    #[test]
    fn dashboard_totals() {
        let principal = Principal::new("u-1", "ana");
        let dashboard = service().dashboard(Some(&principal)).unwrap();
        assert_eq!(dashboard.campaign_count, 2);
        assert_eq!(dashboard.donation_count, 3);
        assert_eq!(dashboard.total_donated, dec!(75));
        assert_eq!(dashboard.total_raised, dec!(52.50));
    }

    #[test]
    fn dashboard_requires_authentication() {
        let err = service().dashboard(None).unwrap_err();
        assert!(matches!(
            err,
            Error::Unauthorized(AuthorizationError::NotAuthenticated)
        ));
    }
}
