//! Database models for campaigns.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use givebox_core::campaigns::{Campaign, CampaignStatus, CampaignUpdate};
use givebox_core::errors::{DatabaseError, Error, Result, ValidationError};
use givebox_core::money::{from_minor_units, to_minor_units};
use rust_decimal::Decimal;

/// Database model for campaigns
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::campaigns)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CampaignDB {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: NaiveDateTime,
    pub deadline: Option<NaiveDate>,
    pub monetary_goal_cents: i64,
    pub raised_cents: i64,
    pub category_id: Option<String>,
    pub organizer_id: String,
    pub status: String,
    pub image: Option<String>,
}

impl CampaignDB {
    /// Builds the domain record; display names are supplied by the caller.
    pub fn into_domain(
        self,
        organizer_username: String,
        category_name: Option<String>,
    ) -> Result<Campaign> {
        let status: CampaignStatus = self.status.parse().map_err(|_| {
            Error::Database(DatabaseError::Internal(format!(
                "campaign {} has unknown status '{}'",
                self.id, self.status
            )))
        })?;
        Ok(Campaign {
            id: self.id,
            title: self.title,
            description: self.description,
            created_at: self.created_at,
            deadline: self.deadline,
            monetary_goal: from_minor_units(self.monetary_goal_cents),
            raised: from_minor_units(self.raised_cents),
            category_id: self.category_id,
            category_name,
            organizer_id: self.organizer_id,
            organizer_username,
            status,
            image: self.image,
        })
    }
}

/// Partial update of a campaign row.
///
/// `raised_cents`, `created_at` and `organizer_id` are never written here.
#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = crate::schema::campaigns)]
pub struct CampaignChangesetDB {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<Option<NaiveDate>>,
    pub monetary_goal_cents: Option<i64>,
    pub category_id: Option<Option<String>>,
    pub image: Option<Option<String>>,
    pub status: Option<String>,
}

impl TryFrom<CampaignUpdate> for CampaignChangesetDB {
    type Error = Error;

    fn try_from(update: CampaignUpdate) -> Result<Self> {
        let monetary_goal_cents = update.monetary_goal.map(cents).transpose()?;
        Ok(Self {
            title: update.title,
            description: update.description,
            deadline: update.deadline,
            monetary_goal_cents,
            category_id: update.category_id,
            image: update.image,
            status: update.status.map(|s| s.as_code().to_string()),
        })
    }
}

/// Converts a validated amount into stored cents.
pub(crate) fn cents(amount: Decimal) -> Result<i64> {
    to_minor_units(amount).ok_or_else(|| {
        Error::Validation(ValidationError::field(
            "amount",
            "must have at most 2 decimal places",
        ))
    })
}
