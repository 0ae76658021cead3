use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use crate::categories::categories_model::{Category, NewCategory};
use crate::categories::categories_traits::{CategoryRepositoryTrait, CategoryServiceTrait};
use crate::errors::{DatabaseError, Error, Result};

pub struct CategoryService {
    category_repo: Arc<dyn CategoryRepositoryTrait>,
}

impl CategoryService {
    pub fn new(category_repo: Arc<dyn CategoryRepositoryTrait>) -> Self {
        CategoryService { category_repo }
    }
}

#[async_trait]
impl CategoryServiceTrait for CategoryService {
    fn get_all_categories(&self) -> Result<Vec<Category>> {
        self.category_repo.list()
    }

    fn get_category(&self, category_id: &str) -> Result<Category> {
        self.category_repo
            .find_by_id(category_id)?
            .ok_or_else(|| Error::NotFound(format!("Category {} not found", category_id)))
    }

    async fn create_category(&self, mut new_category: NewCategory) -> Result<Category> {
        new_category.validate()?;
        new_category.name = new_category.name.trim().to_string();
        let name = new_category.name.clone();
        match self.category_repo.create(new_category).await {
            Err(Error::Database(DatabaseError::UniqueViolation(_))) => Err(Error::Conflict(
                format!("A category named '{}' already exists", name),
            )),
            other => other,
        }
    }

    /// Campaigns in the deleted category keep existing without one.
    async fn delete_category(&self, category_id: String) -> Result<usize> {
        let deleted = self.category_repo.delete(category_id.clone()).await?;
        if deleted == 0 {
            return Err(Error::NotFound(format!(
                "Category {} not found",
                category_id
            )));
        }
        debug!("Deleted category {}", category_id);
        Ok(deleted)
    }
}
