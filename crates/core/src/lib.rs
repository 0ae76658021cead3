//! Givebox Core - Domain entities, services, and traits.
//!
//! This crate contains the donation-accounting logic for Givebox.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod access;
pub mod campaigns;
pub mod categories;
pub mod constants;
pub mod dashboard;
pub mod donations;
pub mod errors;
pub mod money;
pub mod users;

pub use access::{AccessPolicy, Decision, Operation, Principal};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
