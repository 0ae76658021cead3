use std::{net::SocketAddr, time::Duration};

use anyhow::Context;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Raw `GB_SECRET_KEY`; a random key is generated at startup when unset.
    pub secret_key: Option<String>,
    pub token_ttl: Duration,
    /// Usernames allowed to manage categories.
    pub admin_users: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr: SocketAddr = lookup("GB_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid GB_LISTEN_ADDR")?;
        let db_path = lookup("GB_DB_PATH").unwrap_or_else(|| "./db/app.db".into());
        let cors_allow = lookup("GB_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = lookup("GB_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(30000);
        let ttl_minutes: u64 = lookup("GB_TOKEN_TTL_MINUTES")
            .and_then(|v| v.trim().parse().ok())
            .filter(|m| *m > 0)
            .unwrap_or(1440);
        let secret_key = lookup("GB_SECRET_KEY").filter(|s| !s.trim().is_empty());
        let admin_users = lookup("GB_ADMIN_USERS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            secret_key,
            token_ttl: Duration::from_secs(ttl_minutes * 60),
            admin_users,
        })
    }
}
