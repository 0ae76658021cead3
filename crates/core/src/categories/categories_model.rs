//! Category domain models.

use serde::{Deserialize, Serialize};

use crate::constants::CATEGORY_NAME_MAX_LEN;
use crate::errors::{FieldErrors, Result};

/// Domain model representing a campaign category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Input model for creating a new category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewCategory {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "cannot be empty");
        } else if name.chars().count() > CATEGORY_NAME_MAX_LEN {
            errors.add(
                "name",
                format!("must be at most {} characters", CATEGORY_NAME_MAX_LEN),
            );
        }
        errors.into_result()
    }
}

/// Looks up a category name by id for display.
///
/// A missing id or an unknown category renders as an empty string.
pub fn category_name(categories: &[Category], category_id: Option<&str>) -> String {
    category_id
        .and_then(|id| categories.iter().find(|c| c.id == id))
        .map(|c| c.name.clone())
        .unwrap_or_default()
}
