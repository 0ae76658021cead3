//! Database models for donations.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use givebox_core::donations::{Donation, DonationKind};
use givebox_core::errors::{DatabaseError, Error, Result};
use givebox_core::money::from_minor_units;

/// Database model for donations
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::donations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DonationDB {
    pub id: String,
    pub campaign_id: String,
    pub donor_id: Option<String>,
    pub kind: String,
    pub amount_cents: Option<i64>,
    pub item_description: Option<String>,
    pub created_at: NaiveDateTime,
}

impl DonationDB {
    pub fn into_domain(
        self,
        campaign_title: String,
        donor_username: Option<String>,
    ) -> Result<Donation> {
        let kind: DonationKind = self.kind.parse().map_err(|_| {
            Error::Database(DatabaseError::Internal(format!(
                "donation {} has unknown kind '{}'",
                self.id, self.kind
            )))
        })?;
        Ok(Donation {
            id: self.id,
            campaign_id: self.campaign_id,
            campaign_title,
            donor_id: self.donor_id,
            donor_username,
            kind,
            amount: self.amount_cents.map(from_minor_units),
            item_description: self.item_description,
            created_at: self.created_at,
        })
    }
}
