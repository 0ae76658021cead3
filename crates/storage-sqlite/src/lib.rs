//! SQLite storage implementation for Givebox.
//!
//! This crate is the only place where Diesel is used. It implements the
//! repository traits defined in `givebox-core` and contains:
//! - connection pooling and the single-writer actor
//! - embedded Diesel migrations
//! - repository implementations and their row types
//!
//! ```text
//! core (domain, traits)
//!         │
//!         ▼
//! storage-sqlite (this crate)
//!         │
//!         ▼
//!     SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod campaigns;
pub mod categories;
pub mod donations;
pub mod users;

pub use db::{
    create_pool, get_connection, init, ping, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

pub use errors::{IntoCore, StorageError};

pub use campaigns::CampaignRepository;
pub use categories::CategoryRepository;
pub use donations::DonationRepository;
pub use users::UserRepository;

pub use givebox_core::errors::{DatabaseError, Error, Result};
