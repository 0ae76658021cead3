use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use crate::errors::{DatabaseError, Error, Result};
use crate::users::users_model::{NewUser, User, UserCredentials};
use crate::users::users_traits::{UserRepositoryTrait, UserServiceTrait};

pub struct UserService {
    user_repo: Arc<dyn UserRepositoryTrait>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepositoryTrait>) -> Self {
        UserService { user_repo }
    }
}

#[async_trait]
impl UserServiceTrait for UserService {
    async fn register(&self, mut new_user: NewUser) -> Result<User> {
        new_user.validate()?;
        new_user.username = new_user.username.trim().to_string();
        new_user.email = new_user
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());

        if self.user_repo.find_by_username(&new_user.username)?.is_some() {
            return Err(Error::Conflict(format!(
                "Username '{}' is already taken",
                new_user.username
            )));
        }

        let username = new_user.username.clone();
        let user = match self.user_repo.create(new_user).await {
            Err(Error::Database(DatabaseError::UniqueViolation(_))) => {
                return Err(Error::Conflict(format!(
                    "Username '{}' is already taken",
                    username
                )))
            }
            other => other?,
        };
        info!("Registered user {}", user.username);
        Ok(user)
    }

    fn find_credentials(&self, username: &str) -> Result<Option<UserCredentials>> {
        self.user_repo.find_by_username(username.trim())
    }

    fn get_user(&self, user_id: &str) -> Result<User> {
        self.user_repo.get_by_id(user_id)
    }
}
