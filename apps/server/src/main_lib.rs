use std::sync::Arc;

use crate::{
    auth::{decode_secret_key, AuthManager},
    config::Config,
};
use givebox_core::{
    campaigns::{CampaignService, CampaignServiceTrait},
    categories::{CategoryService, CategoryServiceTrait},
    dashboard::{DashboardService, DashboardServiceTrait},
    donations::{DonationService, DonationServiceTrait},
    users::{UserService, UserServiceTrait},
};
use givebox_storage_sqlite::{
    db::{self, DbPool},
    CampaignRepository, CategoryRepository, DonationRepository, UserRepository,
};
use rand::RngCore;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub campaign_service: Arc<dyn CampaignServiceTrait>,
    pub donation_service: Arc<dyn DonationServiceTrait>,
    pub category_service: Arc<dyn CategoryServiceTrait>,
    pub user_service: Arc<dyn UserServiceTrait>,
    pub dashboard_service: Arc<dyn DashboardServiceTrait>,
    pub auth: Arc<AuthManager>,
    pub admin_users: Vec<String>,
    /// Read pool, used by the readiness probe.
    pub pool: Arc<DbPool>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("GB_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

fn jwt_secret(config: &Config) -> anyhow::Result<Vec<u8>> {
    match &config.secret_key {
        Some(raw) => decode_secret_key(raw),
        None => {
            tracing::warn!(
                "GB_SECRET_KEY is not set; using a random key, issued tokens will not survive a restart"
            );
            let mut secret = vec![0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut secret);
            Ok(secret)
        }
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let category_repo = Arc::new(CategoryRepository::new(pool.clone(), writer.clone()));
    let campaign_repo = Arc::new(CampaignRepository::new(pool.clone(), writer.clone()));
    let donation_repo = Arc::new(DonationRepository::new(pool.clone(), writer.clone()));
    let user_repo = Arc::new(UserRepository::new(pool.clone(), writer.clone()));

    let category_service = Arc::new(CategoryService::new(category_repo.clone()));
    let campaign_service: Arc<dyn CampaignServiceTrait> = Arc::new(CampaignService::new(
        campaign_repo.clone(),
        category_repo,
    ));
    let donation_service: Arc<dyn DonationServiceTrait> =
        Arc::new(DonationService::new(donation_repo, campaign_repo));
    let user_service = Arc::new(UserService::new(user_repo));
    let dashboard_service = Arc::new(DashboardService::new(
        campaign_service.clone(),
        donation_service.clone(),
    ));

    let auth = Arc::new(AuthManager::new(&jwt_secret(config)?, config.token_ttl));

    Ok(Arc::new(AppState {
        campaign_service,
        donation_service,
        category_service,
        user_service,
        dashboard_service,
        auth,
        admin_users: config.admin_users.clone(),
        pool,
        db_path,
    }))
}
