use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;
use uuid::Uuid;

use givebox_core::campaigns::{
    Campaign, CampaignFilter, CampaignRepositoryTrait, CampaignStatus, CampaignUpdate,
    NewCampaign,
};
use givebox_core::money::from_minor_units;
use givebox_core::{Error, Result};

use super::model::{cents, CampaignChangesetDB, CampaignDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{campaigns, categories, donations};
use crate::users::load_usernames;
use crate::utils::chunk_for_sqlite;

pub struct CampaignRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CampaignRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        CampaignRepository { pool, writer }
    }
}

fn not_found(campaign_id: &str) -> Error {
    Error::NotFound(format!("Campaign {} not found", campaign_id))
}

fn load_category_names(
    conn: &mut SqliteConnection,
    ids: &[String],
) -> Result<HashMap<String, String>> {
    let mut names = HashMap::with_capacity(ids.len());
    for chunk in chunk_for_sqlite(ids) {
        let rows: Vec<(String, String)> = categories::table
            .filter(categories::id.eq_any(chunk))
            .select((categories::id, categories::name))
            .load(conn)
            .map_err(StorageError::from)?;
        names.extend(rows);
    }
    Ok(names)
}

/// Maps campaign ids to titles for donation read models.
pub(crate) fn load_titles(
    conn: &mut SqliteConnection,
    ids: &[String],
) -> Result<HashMap<String, String>> {
    let mut titles = HashMap::with_capacity(ids.len());
    for chunk in chunk_for_sqlite(ids) {
        let rows: Vec<(String, String)> = campaigns::table
            .filter(campaigns::id.eq_any(chunk))
            .select((campaigns::id, campaigns::title))
            .load(conn)
            .map_err(StorageError::from)?;
        titles.extend(rows);
    }
    Ok(titles)
}

/// Attaches organizer usernames and category names to campaign rows.
fn hydrate(conn: &mut SqliteConnection, rows: Vec<CampaignDB>) -> Result<Vec<Campaign>> {
    let organizer_ids: Vec<String> = rows
        .iter()
        .map(|r| r.organizer_id.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let category_ids: Vec<String> = rows
        .iter()
        .filter_map(|r| r.category_id.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let usernames = load_usernames(conn, &organizer_ids)?;
    let category_names = load_category_names(conn, &category_ids)?;

    rows.into_iter()
        .map(|row| {
            let username = usernames.get(&row.organizer_id).cloned().unwrap_or_default();
            let category_name = row
                .category_id
                .as_ref()
                .and_then(|id| category_names.get(id).cloned());
            row.into_domain(username, category_name)
        })
        .collect()
}

fn find_one(conn: &mut SqliteConnection, campaign_id: &str) -> Result<Campaign> {
    let row = campaigns::table
        .find(campaign_id)
        .select(CampaignDB::as_select())
        .first(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| not_found(campaign_id))?;
    hydrate(conn, vec![row])?
        .pop()
        .ok_or_else(|| not_found(campaign_id))
}

/// Adds `amount_cents` to the campaign's raised total in one statement and
/// returns the new total in cents.
pub(crate) fn increment_raised(
    conn: &mut SqliteConnection,
    campaign_id: &str,
    amount_cents: i64,
) -> Result<i64> {
    diesel::update(campaigns::table.find(campaign_id))
        .set(campaigns::raised_cents.eq(campaigns::raised_cents + amount_cents))
        .returning(campaigns::raised_cents)
        .get_result::<i64>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| not_found(campaign_id))
}

#[async_trait]
impl CampaignRepositoryTrait for CampaignRepository {
    fn get_by_id(&self, campaign_id: &str) -> Result<Campaign> {
        let mut conn = get_connection(&self.pool)?;
        find_one(&mut conn, campaign_id)
    }

    fn list(&self, filter: &CampaignFilter) -> Result<Vec<Campaign>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = campaigns::table.into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(campaigns::status.eq(status.as_code()));
        }
        if let Some(organizer_id) = &filter.organizer_id {
            query = query.filter(campaigns::organizer_id.eq(organizer_id.clone()));
        }
        if let Some(category_id) = &filter.category_id {
            query = query.filter(campaigns::category_id.eq(category_id.clone()));
        }
        if let Some(limit) = filter.limit {
            query = query.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        let rows = query
            .order((campaigns::created_at.desc(), campaigns::id.desc()))
            .select(CampaignDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?;
        hydrate(&mut conn, rows)
    }

    fn donation_counts(&self, campaign_ids: &[String]) -> Result<HashMap<String, i64>> {
        let mut conn = get_connection(&self.pool)?;
        let mut counts = HashMap::new();
        for chunk in chunk_for_sqlite(campaign_ids) {
            let rows: Vec<(String, i64)> = donations::table
                .filter(donations::campaign_id.eq_any(chunk))
                .group_by(donations::campaign_id)
                .select((donations::campaign_id, count_star()))
                .load(&mut conn)
                .map_err(StorageError::from)?;
            counts.extend(rows);
        }
        Ok(counts)
    }

    async fn create(&self, new_campaign: NewCampaign, organizer_id: String) -> Result<Campaign> {
        let goal_cents = cents(new_campaign.monetary_goal)?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Campaign> {
                let row = CampaignDB {
                    id: Uuid::now_v7().to_string(),
                    title: new_campaign.title,
                    description: new_campaign.description,
                    created_at: Utc::now().naive_utc(),
                    deadline: new_campaign.deadline,
                    monetary_goal_cents: goal_cents,
                    raised_cents: 0,
                    category_id: new_campaign.category_id,
                    organizer_id,
                    status: new_campaign
                        .status
                        .unwrap_or(CampaignStatus::Active)
                        .as_code()
                        .to_string(),
                    image: new_campaign.image,
                };
                diesel::insert_into(campaigns::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                find_one(conn, &row.id)
            })
            .await
    }

    async fn update(&self, campaign_id: String, changes: CampaignUpdate) -> Result<Campaign> {
        let changeset = CampaignChangesetDB::try_from(changes)?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Campaign> {
                let updated = diesel::update(campaigns::table.find(&campaign_id))
                    .set(&changeset)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if updated == 0 {
                    return Err(not_found(&campaign_id));
                }
                find_one(conn, &campaign_id)
            })
            .await
    }

    async fn delete_if_no_donations(&self, campaign_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let donation_count: i64 = donations::table
                    .filter(donations::campaign_id.eq(&campaign_id))
                    .count()
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                if donation_count > 0 {
                    return Err(Error::Conflict(format!(
                        "Campaign {} has {} donation(s) and cannot be deleted",
                        campaign_id, donation_count
                    )));
                }
                let deleted = diesel::delete(campaigns::table.find(&campaign_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if deleted == 0 {
                    return Err(not_found(&campaign_id));
                }
                Ok(deleted)
            })
            .await
    }

    async fn apply_contribution(&self, campaign_id: String, amount: Decimal) -> Result<Decimal> {
        let amount_cents = cents(amount)?;
        let raised = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<i64> {
                increment_raised(conn, &campaign_id, amount_cents)
            })
            .await?;
        debug!("Raised total is now {} cents", raised);
        Ok(from_minor_units(raised))
    }
}
