//! Database models for categories.

use diesel::prelude::*;
use givebox_core::categories::{Category, NewCategory};

/// Database model for categories
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CategoryDB {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<CategoryDB> for Category {
    fn from(db: CategoryDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            description: db.description,
        }
    }
}

impl CategoryDB {
    pub fn from_new(new_category: NewCategory, id: String) -> Self {
        Self {
            id: new_category.id.unwrap_or(id),
            name: new_category.name,
            description: new_category
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        }
    }
}
