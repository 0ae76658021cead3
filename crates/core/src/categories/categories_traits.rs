use crate::categories::categories_model::{Category, NewCategory};
use crate::errors::Result;
use async_trait::async_trait;

/// Trait for category repository operations
#[async_trait]
pub trait CategoryRepositoryTrait: Send + Sync {
    fn list(&self) -> Result<Vec<Category>>;
    fn find_by_id(&self, category_id: &str) -> Result<Option<Category>>;
    async fn create(&self, new_category: NewCategory) -> Result<Category>;
    async fn delete(&self, category_id: String) -> Result<usize>;
}

/// Trait for category service operations
#[async_trait]
pub trait CategoryServiceTrait: Send + Sync {
    fn get_all_categories(&self) -> Result<Vec<Category>>;
    fn get_category(&self, category_id: &str) -> Result<Category>;
    async fn create_category(&self, new_category: NewCategory) -> Result<Category>;
    async fn delete_category(&self, category_id: String) -> Result<usize>;
}
