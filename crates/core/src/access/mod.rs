//! Access policy - who may view or mutate campaigns and donations.

mod access_policy;

pub use access_policy::{AccessPolicy, Decision, Operation, Principal};
