//! Donation domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::campaigns::percent_complete;
use crate::constants::ITEM_DESCRIPTION_MAX_LEN;
use crate::errors::{FieldErrors, Result, ValidationError};
use crate::money::check_amount;

/// What a donor gives: money or goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationKind {
    #[default]
    #[serde(alias = "MON")]
    Monetary,
    #[serde(alias = "ART")]
    Item,
}

impl DonationKind {
    /// Three-letter code used by storage and the donation form.
    pub fn as_code(&self) -> &'static str {
        match self {
            DonationKind::Monetary => "MON",
            DonationKind::Item => "ART",
        }
    }
}

impl fmt::Display for DonationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

impl FromStr for DonationKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MON" | "MONETARY" => Ok(DonationKind::Monetary),
            "ART" | "ITEM" => Ok(DonationKind::Item),
            _ => Err(ValidationError::field("kind", "must be MON or ART")),
        }
    }
}

/// Domain model representing a recorded donation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: String,
    pub campaign_id: String,
    pub campaign_title: String,
    /// `None` for anonymous or removed donors.
    pub donor_id: Option<String>,
    pub donor_username: Option<String>,
    pub kind: DonationKind,
    pub amount: Option<Decimal>,
    pub item_description: Option<String>,
    pub created_at: NaiveDateTime,
}

/// A donation as submitted by a client, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationSubmission {
    #[serde(default)]
    pub campaign_id: String,
    #[serde(default)]
    pub kind: DonationKind,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default, alias = "item_description")]
    pub item_description: Option<String>,
}

impl DonationSubmission {
    /// Validates the submission for `donor_id`, collecting every field error.
    ///
    /// Only the field relevant to the kind is kept.
    pub fn validate(self, donor_id: Option<String>) -> Result<NewDonation> {
        let mut errors = FieldErrors::new();
        if self.campaign_id.trim().is_empty() {
            errors.add("campaignId", "is required");
        }

        let (amount, item_description) = match self.kind {
            DonationKind::Monetary => {
                match self.amount {
                    None => errors.add("amount", "is required for monetary donations"),
                    Some(amount) => check_amount(&mut errors, "amount", amount, false),
                }
                (self.amount, None)
            }
            DonationKind::Item => {
                let description = self
                    .item_description
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string);
                match &description {
                    None => errors.add("itemDescription", "is required for item donations"),
                    Some(d) if d.chars().count() > ITEM_DESCRIPTION_MAX_LEN => errors.add(
                        "itemDescription",
                        format!("must be at most {} characters", ITEM_DESCRIPTION_MAX_LEN),
                    ),
                    Some(_) => {}
                }
                (None, description)
            }
        };
        errors.into_result()?;

        Ok(NewDonation {
            campaign_id: self.campaign_id.trim().to_string(),
            donor_id,
            kind: self.kind,
            amount,
            item_description,
        })
    }
}

/// A validated donation ready to be recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDonation {
    pub campaign_id: String,
    pub donor_id: Option<String>,
    pub kind: DonationKind,
    pub amount: Option<Decimal>,
    pub item_description: Option<String>,
}

impl NewDonation {
    /// Amount to add to the campaign's raised total.
    pub fn contribution(&self) -> Option<Decimal> {
        match self.kind {
            DonationKind::Monetary => self.amount,
            DonationKind::Item => None,
        }
    }
}

/// Outcome of recording a donation, including the campaign's updated total.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DonationReceipt {
    pub donation: Donation,
    pub raised: Decimal,
    pub monetary_goal: Decimal,
}

impl DonationReceipt {
    pub fn percent_complete(&self) -> u8 {
        percent_complete(self.raised, self.monetary_goal)
    }
}

/// Orderings accepted by donation listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DonationOrder {
    /// `-created_at`
    #[default]
    Newest,
    /// `created_at`
    Oldest,
    /// `amount`
    AmountAsc,
    /// `-amount`
    AmountDesc,
}

impl DonationOrder {
    /// Parses an `ordering` query value; unknown values fall back to newest-first.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("created_at") => DonationOrder::Oldest,
            Some("amount") => DonationOrder::AmountAsc,
            Some("-amount") => DonationOrder::AmountDesc,
            _ => DonationOrder::Newest,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            DonationOrder::Newest => "-created_at",
            DonationOrder::Oldest => "created_at",
            DonationOrder::AmountAsc => "amount",
            DonationOrder::AmountDesc => "-amount",
        }
    }
}

/// Filter for donation listings.
#[derive(Debug, Clone, Default)]
pub struct DonationQuery {
    pub campaign_id: Option<String>,
    pub donor_id: Option<String>,
    pub order: DonationOrder,
    pub limit: Option<usize>,
}

impl DonationQuery {
    /// A `limit` that is absent or not a non-negative integer means unlimited.
    pub fn parse_limit(value: Option<&str>) -> Option<usize> {
        value.and_then(|v| v.trim().parse::<usize>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use rust_decimal_macros::dec;

    fn submission(kind: DonationKind, amount: Option<Decimal>, item: Option<&str>) -> DonationSubmission {
        DonationSubmission {
            campaign_id: "c-1".to_string(),
            kind,
            amount,
            item_description: item.map(str::to_string),
        }
    }

    fn field_errors(result: Result<NewDonation>) -> FieldErrors {
        match result {
            Err(Error::Validation(ValidationError::Fields(fields))) => fields,
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    #[test]
    fn error_keys_match_submitted_field_names() {
        let mut blank = submission(DonationKind::Item, None, None);
        blank.campaign_id = "  ".to_string();
        let fields = field_errors(blank.validate(None));
        assert_eq!(
            fields.fields().collect::<Vec<_>>(),
            vec!["campaignId", "itemDescription"]
        );
    }

    #[test]
    fn monetary_requires_positive_amount() {
        let fields = field_errors(submission(DonationKind::Monetary, None, None).validate(None));
        assert!(fields.contains("amount"));

        for bad in [dec!(0), dec!(-1), dec!(1.001), dec!(100000000)] {
            let fields =
                field_errors(submission(DonationKind::Monetary, Some(bad), None).validate(None));
            assert!(fields.contains("amount"), "{} should be rejected", bad);
        }
    }

    #[test]
    fn monetary_discards_item_description() {
        let new_donation = submission(DonationKind::Monetary, Some(dec!(30)), Some("ignored"))
            .validate(Some("u-1".to_string()))
            .unwrap();
        assert_eq!(new_donation.amount, Some(dec!(30)));
        assert_eq!(new_donation.item_description, None);
        assert_eq!(new_donation.contribution(), Some(dec!(30)));
        assert_eq!(new_donation.donor_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn item_requires_description_and_discards_amount() {
        let fields =
            field_errors(submission(DonationKind::Item, Some(dec!(5)), Some("   ")).validate(None));
        assert!(fields.contains("itemDescription"));
        assert!(!fields.contains("amount"));

        let long = "x".repeat(ITEM_DESCRIPTION_MAX_LEN + 1);
        let fields = field_errors(submission(DonationKind::Item, None, Some(&long)).validate(None));
        assert!(fields.contains("itemDescription"));

        let new_donation = submission(DonationKind::Item, Some(dec!(5)), Some(" 3 mantas "))
            .validate(None)
            .unwrap();
        assert_eq!(new_donation.amount, None);
        assert_eq!(new_donation.item_description.as_deref(), Some("3 mantas"));
        assert_eq!(new_donation.contribution(), None);
    }

    #[test]
    fn kind_parses_codes_and_names() {
        assert_eq!("MON".parse::<DonationKind>().unwrap(), DonationKind::Monetary);
        assert_eq!("art".parse::<DonationKind>().unwrap(), DonationKind::Item);
        assert!("cash".parse::<DonationKind>().is_err());
        let kind: DonationKind = serde_json::from_str("\"ART\"").unwrap();
        assert_eq!(kind, DonationKind::Item);
        assert_eq!(serde_json::to_string(&DonationKind::Item).unwrap(), "\"ITEM\"");
    }

    #[test]
    fn limit_parsing() {
        assert_eq!(DonationQuery::parse_limit(Some("2")), Some(2));
        assert_eq!(DonationQuery::parse_limit(Some("0")), Some(0));
        assert_eq!(DonationQuery::parse_limit(Some("abc")), None);
        assert_eq!(DonationQuery::parse_limit(Some("-1")), None);
        assert_eq!(DonationQuery::parse_limit(None), None);
    }

    #[test]
    fn order_parsing() {
        assert_eq!(DonationOrder::from_param(None), DonationOrder::Newest);
        assert_eq!(DonationOrder::from_param(Some("amount")), DonationOrder::AmountAsc);
        assert_eq!(DonationOrder::from_param(Some("-amount")), DonationOrder::AmountDesc);
        assert_eq!(DonationOrder::from_param(Some("created_at")), DonationOrder::Oldest);
        assert_eq!(DonationOrder::from_param(Some("title")), DonationOrder::Newest);
    }

    #[test]
    fn receipt_reports_progress() {
        let receipt = DonationReceipt {
            donation: Donation {
                id: "d-1".to_string(),
                campaign_id: "c-1".to_string(),
                campaign_title: "Coats".to_string(),
                donor_id: None,
                donor_username: None,
                kind: DonationKind::Monetary,
                amount: Some(dec!(45)),
                item_description: None,
                created_at: chrono::Utc::now().naive_utc(),
            },
            raised: dec!(75),
            monetary_goal: dec!(100),
        };
        assert_eq!(receipt.percent_complete(), 75);
    }
}
