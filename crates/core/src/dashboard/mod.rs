//! Dashboard module - a signed-in user's campaigns and donations.

mod dashboard_model;
mod dashboard_service;

pub use dashboard_model::Dashboard;
pub use dashboard_service::{DashboardService, DashboardServiceTrait};
