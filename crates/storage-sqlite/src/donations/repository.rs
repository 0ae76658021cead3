use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use uuid::Uuid;

use givebox_core::donations::{
    Donation, DonationOrder, DonationQuery, DonationReceipt, DonationRepositoryTrait,
    NewDonation,
};
use givebox_core::money::from_minor_units;
use givebox_core::{Error, Result};

use super::model::DonationDB;
use crate::campaigns::{cents, increment_raised, load_titles};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{campaigns, donations};
use crate::users::load_usernames;

pub struct DonationRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl DonationRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        DonationRepository { pool, writer }
    }
}

fn unique(ids: impl Iterator<Item = String>) -> Vec<String> {
    ids.collect::<HashSet<_>>().into_iter().collect()
}

/// Attaches campaign titles and donor usernames to donation rows.
fn hydrate(conn: &mut SqliteConnection, rows: Vec<DonationDB>) -> Result<Vec<Donation>> {
    let campaign_ids = unique(rows.iter().map(|r| r.campaign_id.clone()));
    let donor_ids = unique(rows.iter().filter_map(|r| r.donor_id.clone()));

    let titles = load_titles(conn, &campaign_ids)?;
    let usernames = load_usernames(conn, &donor_ids)?;

    rows.into_iter()
        .map(|row| {
            let title = titles.get(&row.campaign_id).cloned().unwrap_or_default();
            let username = row.donor_id.as_ref().and_then(|id| usernames.get(id).cloned());
            row.into_domain(title, username)
        })
        .collect()
}

#[async_trait]
impl DonationRepositoryTrait for DonationRepository {
    async fn record(&self, new_donation: NewDonation) -> Result<DonationReceipt> {
        let contribution_cents = new_donation.contribution().map(cents).transpose()?;

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<DonationReceipt> {
                let (goal_cents, current_cents): (i64, i64) = campaigns::table
                    .find(&new_donation.campaign_id)
                    .select((campaigns::monetary_goal_cents, campaigns::raised_cents))
                    .first(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| {
                        Error::NotFound(format!(
                            "Campaign {} not found",
                            new_donation.campaign_id
                        ))
                    })?;

                let row = DonationDB {
                    id: Uuid::now_v7().to_string(),
                    campaign_id: new_donation.campaign_id,
                    donor_id: new_donation.donor_id,
                    kind: new_donation.kind.as_code().to_string(),
                    amount_cents: contribution_cents,
                    item_description: new_donation.item_description,
                    created_at: Utc::now().naive_utc(),
                };
                diesel::insert_into(donations::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let raised_cents = match contribution_cents {
                    Some(amount_cents) => increment_raised(conn, &row.campaign_id, amount_cents)?,
                    None => current_cents,
                };

                let donation = hydrate(conn, vec![row])?
                    .pop()
                    .ok_or_else(|| Error::Unexpected("recorded donation vanished".to_string()))?;
                Ok(DonationReceipt {
                    donation,
                    raised: from_minor_units(raised_cents),
                    monetary_goal: from_minor_units(goal_cents),
                })
            })
            .await
    }

    fn list(&self, query: &DonationQuery) -> Result<Vec<Donation>> {
        let mut conn = get_connection(&self.pool)?;
        let mut sql = donations::table.into_boxed();
        if let Some(campaign_id) = &query.campaign_id {
            sql = sql.filter(donations::campaign_id.eq(campaign_id.clone()));
        }
        if let Some(donor_id) = &query.donor_id {
            sql = sql.filter(donations::donor_id.eq(donor_id.clone()));
        }
        // NULL amounts (item donations) sort lowest, as if they were zero.
        sql = match query.order {
            DonationOrder::Newest => {
                sql.order((donations::created_at.desc(), donations::id.desc()))
            }
            DonationOrder::Oldest => sql.order((donations::created_at.asc(), donations::id.asc())),
            DonationOrder::AmountAsc => sql.order((
                donations::amount_cents.asc(),
                donations::created_at.desc(),
                donations::id.desc(),
            )),
            DonationOrder::AmountDesc => sql.order((
                donations::amount_cents.desc(),
                donations::created_at.desc(),
                donations::id.desc(),
            )),
        };
        if let Some(limit) = query.limit {
            sql = sql.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        let rows = sql
            .select(DonationDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?;
        hydrate(&mut conn, rows)
    }
}
