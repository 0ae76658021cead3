//! SQLite storage implementation for user accounts.

mod model;
mod repository;

pub use model::UserDB;
pub use repository::{load_usernames, UserRepository};
