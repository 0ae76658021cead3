use async_trait::async_trait;

use crate::errors::Result;
use crate::users::users_model::{NewUser, User, UserCredentials};

/// Trait for user repository operations
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn create(&self, new_user: NewUser) -> Result<User>;
    fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>>;
    fn get_by_id(&self, user_id: &str) -> Result<User>;
}

/// Trait for user service operations
#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn register(&self, new_user: NewUser) -> Result<User>;
    fn find_credentials(&self, username: &str) -> Result<Option<UserCredentials>>;
    fn get_user(&self, user_id: &str) -> Result<User>;
}
