#[cfg(test)]
mod tests {
    use crate::access::Principal;
    use crate::campaigns::{
        Campaign, CampaignFilter, CampaignRepositoryTrait, CampaignSearch, CampaignService,
        CampaignServiceTrait, CampaignSort, CampaignStatus, CampaignUpdate, NewCampaign,
    };
    use crate::categories::{Category, CategoryRepositoryTrait, NewCategory};
    use crate::errors::{AuthorizationError, Error, Result, ValidationError};
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    // --- Mock CampaignRepository ---
    #[derive(Clone, Default)]
    struct MockCampaignRepository {
        campaigns: Arc<Mutex<Vec<Campaign>>>,
        donation_counts: Arc<Mutex<HashMap<String, i64>>>,
    }

    impl MockCampaignRepository {
        fn add(&self, campaign: Campaign) {
            self.campaigns.lock().unwrap().push(campaign);
        }

        fn set_donations(&self, campaign_id: &str, count: i64) {
            self.donation_counts
                .lock()
                .unwrap()
                .insert(campaign_id.to_string(), count);
        }

        fn raised(&self, campaign_id: &str) -> Decimal {
            self.campaigns
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == campaign_id)
                .map(|c| c.raised)
                .unwrap()
        }
    }

    #[async_trait]
    impl CampaignRepositoryTrait for MockCampaignRepository {
        fn get_by_id(&self, campaign_id: &str) -> Result<Campaign> {
            self.campaigns
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == campaign_id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("Campaign {} not found", campaign_id)))
        }

        fn list(&self, filter: &CampaignFilter) -> Result<Vec<Campaign>> {
            let mut items: Vec<Campaign> = self
                .campaigns
                .lock()
                .unwrap()
                .iter()
                .filter(|c| filter.status.map_or(true, |s| c.status == s))
                .filter(|c| {
                    filter
                        .organizer_id
                        .as_ref()
                        .map_or(true, |o| &c.organizer_id == o)
                })
                .filter(|c| {
                    filter
                        .category_id
                        .as_ref()
                        .map_or(true, |cat| c.category_id.as_ref() == Some(cat))
                })
                .cloned()
                .collect();
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            if let Some(limit) = filter.limit {
                items.truncate(limit);
            }
            Ok(items)
        }

        fn donation_counts(&self, campaign_ids: &[String]) -> Result<HashMap<String, i64>> {
            let counts = self.donation_counts.lock().unwrap();
            Ok(campaign_ids
                .iter()
                .filter_map(|id| counts.get(id).map(|n| (id.clone(), *n)))
                .collect())
        }

        async fn create(&self, new_campaign: NewCampaign, organizer_id: String) -> Result<Campaign> {
            let mut campaigns = self.campaigns.lock().unwrap();
            let campaign = Campaign {
                id: format!("c-{}", campaigns.len() + 1),
                title: new_campaign.title,
                description: new_campaign.description,
                created_at: ts(0),
                deadline: new_campaign.deadline,
                monetary_goal: new_campaign.monetary_goal,
                raised: Decimal::ZERO,
                category_id: new_campaign.category_id,
                category_name: None,
                organizer_username: format!("user-{}", organizer_id),
                organizer_id,
                status: new_campaign.status.unwrap_or_default(),
                image: new_campaign.image,
            };
            campaigns.push(campaign.clone());
            Ok(campaign)
        }

        async fn update(&self, campaign_id: String, changes: CampaignUpdate) -> Result<Campaign> {
            let mut campaigns = self.campaigns.lock().unwrap();
            let campaign = campaigns
                .iter_mut()
                .find(|c| c.id == campaign_id)
                .ok_or_else(|| Error::NotFound(campaign_id.clone()))?;
            if let Some(title) = changes.title {
                campaign.title = title;
            }
            if let Some(description) = changes.description {
                campaign.description = description;
            }
            if let Some(deadline) = changes.deadline {
                campaign.deadline = deadline;
            }
            if let Some(goal) = changes.monetary_goal {
                campaign.monetary_goal = goal;
            }
            if let Some(category_id) = changes.category_id {
                campaign.category_id = category_id;
            }
            if let Some(image) = changes.image {
                campaign.image = image;
            }
            if let Some(status) = changes.status {
                campaign.status = status;
            }
            Ok(campaign.clone())
        }

        async fn delete_if_no_donations(&self, campaign_id: String) -> Result<usize> {
            if self
                .donation_counts
                .lock()
                .unwrap()
                .get(&campaign_id)
                .is_some_and(|n| *n > 0)
            {
                return Err(Error::Conflict("campaign has donations".to_string()));
            }
            let mut campaigns = self.campaigns.lock().unwrap();
            let before = campaigns.len();
            campaigns.retain(|c| c.id != campaign_id);
            Ok(before - campaigns.len())
        }

        async fn apply_contribution(&self, campaign_id: String, amount: Decimal) -> Result<Decimal> {
            let mut campaigns = self.campaigns.lock().unwrap();
            let campaign = campaigns
                .iter_mut()
                .find(|c| c.id == campaign_id)
                .ok_or_else(|| Error::NotFound(campaign_id.clone()))?;
            campaign.raised += amount;
            Ok(campaign.raised)
        }
    }

    // --- Mock CategoryRepository ---
    struct MockCategoryRepository {
        categories: Vec<Category>,
    }

    #[async_trait]
    impl CategoryRepositoryTrait for MockCategoryRepository {
        fn list(&self) -> Result<Vec<Category>> {
            Ok(self.categories.clone())
        }

        fn find_by_id(&self, category_id: &str) -> Result<Option<Category>> {
            Ok(self.categories.iter().find(|c| c.id == category_id).cloned())
        }

        async fn create(&self, _new_category: NewCategory) -> Result<Category> {
            unimplemented!()
        }

        async fn delete(&self, _category_id: String) -> Result<usize> {
            unimplemented!()
        }
    }

    fn ts(minutes: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            + Duration::minutes(minutes)
    }

    fn campaign(id: &str, organizer_id: &str, minutes: i64) -> Campaign {
        Campaign {
            id: id.to_string(),
            title: format!("Campaign {}", id),
            description: "Food for the community kitchen".to_string(),
            created_at: ts(minutes),
            deadline: None,
            monetary_goal: dec!(100),
            raised: Decimal::ZERO,
            category_id: None,
            category_name: None,
            organizer_id: organizer_id.to_string(),
            organizer_username: organizer_id.to_string(),
            status: CampaignStatus::Active,
            image: None,
        }
    }

    fn new_campaign(title: &str) -> NewCampaign {
        NewCampaign {
            title: title.to_string(),
            description: "Shoes for the school".to_string(),
            deadline: None,
            monetary_goal: dec!(500),
            category_id: None,
            image: None,
            status: None,
        }
    }

    fn setup() -> (MockCampaignRepository, CampaignService) {
        let repo = MockCampaignRepository::default();
        let categories = MockCategoryRepository {
            categories: vec![Category {
                id: "edu".to_string(),
                name: "Education".to_string(),
                description: None,
            }],
        };
        let service = CampaignService::new(Arc::new(repo.clone()), Arc::new(categories));
        (repo, service)
    }

    fn ana() -> Principal {
        Principal::new("u-1", "ana")
    }

    fn bruno() -> Principal {
        Principal::new("u-2", "bruno")
    }

    #[tokio::test]
    async fn test_create_campaign_uses_principal_as_organizer() {
        let (_, service) = setup();
        let created = service
            .create_campaign(new_campaign("  Shoes  "), Some(&ana()))
            .await
            .unwrap();
        assert_eq!(created.organizer_id, "u-1");
        assert_eq!(created.title, "Shoes");
        assert_eq!(created.raised, Decimal::ZERO);
        assert_eq!(created.status, CampaignStatus::Active);
    }

    #[tokio::test]
    async fn test_create_campaign_requires_authentication() {
        let (repo, service) = setup();
        let err = service
            .create_campaign(new_campaign("Shoes"), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Unauthorized(AuthorizationError::NotAuthenticated)
        ));
        assert!(repo.campaigns.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_campaign_with_unknown_category_is_not_found() {
        let (_, service) = setup();
        let mut input = new_campaign("Shoes");
        input.category_id = Some("sports".to_string());
        let err = service
            .create_campaign(input, Some(&ana()))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let mut input = new_campaign("Books");
        input.category_id = Some("edu".to_string());
        assert!(service.create_campaign(input, Some(&ana())).await.is_ok());
    }

    #[tokio::test]
    async fn test_non_organizer_cannot_update() {
        let (repo, service) = setup();
        repo.add(campaign("c-1", "u-1", 0));
        let changes = CampaignUpdate {
            title: Some("Hijacked".to_string()),
            ..Default::default()
        };
        let err = service
            .update_campaign("c-1", changes, Some(&bruno()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Unauthorized(AuthorizationError::NotOrganizer)
        ));
        assert_eq!(repo.get_by_id("c-1").unwrap().title, "Campaign c-1");
    }

    #[tokio::test]
    async fn test_update_rejects_organizer_change_and_keeps_raised() {
        let (repo, service) = setup();
        let mut existing = campaign("c-1", "u-1", 0);
        existing.raised = dec!(40);
        repo.add(existing);

        let changes = CampaignUpdate {
            organizer_id: Some("u-2".to_string()),
            ..Default::default()
        };
        let err = service
            .update_campaign("c-1", changes, Some(&ana()))
            .await
            .unwrap_err();
        let Error::Validation(ValidationError::Fields(fields)) = err else {
            panic!("expected field errors");
        };
        assert!(fields.contains("organizerId"));

        let changes = CampaignUpdate {
            title: Some("Renamed".to_string()),
            deadline: Some(Some(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap())),
            ..Default::default()
        };
        let updated = service
            .update_campaign("c-1", changes, Some(&ana()))
            .await
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.raised, dec!(40));
        assert_eq!(updated.organizer_id, "u-1");
    }

    #[tokio::test]
    async fn test_update_missing_campaign_is_not_found() {
        let (_, service) = setup();
        let err = service
            .update_campaign("nope", CampaignUpdate::default(), Some(&ana()))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_with_donations_is_conflict() {
        let (repo, service) = setup();
        repo.add(campaign("c-1", "u-1", 0));
        repo.set_donations("c-1", 2);

        let err = service
            .delete_campaign("c-1", Some(&ana()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert!(repo.get_by_id("c-1").is_ok());
    }

    #[tokio::test]
    async fn test_delete_is_owner_gated() {
        let (repo, service) = setup();
        repo.add(campaign("c-1", "u-1", 0));

        let err = service.delete_campaign("c-1", None).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Unauthorized(AuthorizationError::NotAuthenticated)
        ));
        let err = service
            .delete_campaign("c-1", Some(&bruno()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Unauthorized(AuthorizationError::NotOrganizer)
        ));

        service.delete_campaign("c-1", Some(&ana())).await.unwrap();
        assert!(repo.get_by_id("c-1").unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_apply_contribution_rejects_non_positive() {
        let (repo, service) = setup();
        repo.add(campaign("c-1", "u-1", 0));
        assert!(service.apply_contribution("c-1", Decimal::ZERO).await.is_err());
        assert!(service.apply_contribution("c-1", dec!(-3)).await.is_err());

        assert_eq!(service.apply_contribution("c-1", dec!(30)).await.unwrap(), dec!(30));
        assert_eq!(service.apply_contribution("c-1", dec!(45)).await.unwrap(), dec!(75));
        assert_eq!(repo.raised("c-1"), dec!(75));
    }

    #[test]
    fn test_search_only_returns_active_campaigns() {
        let (repo, service) = setup();
        repo.add(campaign("active", "u-1", 0));
        let mut paused = campaign("paused", "u-1", 1);
        paused.status = CampaignStatus::Paused;
        repo.add(paused);
        let mut finished = campaign("finished", "u-1", 2);
        finished.status = CampaignStatus::Finished;
        repo.add(finished);

        let page = service
            .search_campaigns(&CampaignSearch::default())
            .unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].campaign.id, "active");
    }

    #[test]
    fn test_search_by_category_and_text() {
        let (repo, service) = setup();
        let mut books = campaign("books", "u-1", 0);
        books.category_id = Some("edu".to_string());
        books.title = "Libros para todos".to_string();
        repo.add(books);
        let mut food = campaign("food", "u-1", 1);
        food.title = "Comida".to_string();
        repo.add(food);

        let page = service
            .search_campaigns(&CampaignSearch {
                category_id: Some("edu".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.total_count, 1);

        let page = service
            .search_campaigns(&CampaignSearch {
                query: Some("LIBROS".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.items[0].campaign.id, "books");
    }

    #[test]
    fn test_search_orders_by_popularity_with_counts() {
        let (repo, service) = setup();
        repo.add(campaign("a", "u-1", 0));
        repo.add(campaign("b", "u-1", 1));
        repo.add(campaign("c", "u-1", 2));
        repo.set_donations("a", 5);
        repo.set_donations("b", 1);

        let page = service
            .search_campaigns(&CampaignSearch {
                sort: CampaignSort::Popular,
                ..Default::default()
            })
            .unwrap();
        let ids: Vec<_> = page.items.iter().map(|s| s.campaign.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(page.items[0].donation_count, 5);
        assert_eq!(page.items[2].donation_count, 0);
    }

    #[test]
    fn test_home_shows_six_newest_active() {
        let (repo, service) = setup();
        for i in 0..8 {
            repo.add(campaign(&format!("c{}", i), "u-1", i));
        }
        let mut paused = campaign("paused", "u-1", 100);
        paused.status = CampaignStatus::Paused;
        repo.add(paused);

        let home = service.home_campaigns().unwrap();
        assert_eq!(home.len(), 6);
        assert_eq!(home[0].id, "c7");
        assert!(home.iter().all(|c| c.status == CampaignStatus::Active));
    }

    #[test]
    fn test_list_by_organizer() {
        let (repo, service) = setup();
        repo.add(campaign("mine", "u-1", 0));
        repo.add(campaign("theirs", "u-2", 1));
        let mine = service.list_by_organizer("u-1").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "mine");
        assert_eq!(service.list_campaigns().unwrap().len(), 2);
    }
}
