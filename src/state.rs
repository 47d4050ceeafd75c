use std::sync::Arc;

use anyhow::Context;

use crate::{
    auth::{PasswordService, TokenService},
    config::AppConfig,
    db,
    users::{MemoryUserStore, PgUserStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub passwords: PasswordService,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    /// Connects to Postgres, runs migrations and wires the services.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(&config).await?;
        db::migrate(&pool).await?;
        let users = Arc::new(PgUserStore::new(pool)) as Arc<dyn UserStore>;
        Self::from_parts(config, users)
    }

    pub fn from_parts(config: AppConfig, users: Arc<dyn UserStore>) -> anyhow::Result<Self> {
        let tokens = Arc::new(TokenService::new(&config.jwt));
        let passwords = PasswordService::new(&config.password).context("password hashing config")?;
        Ok(Self {
            config: Arc::new(config),
            tokens,
            passwords,
            users,
        })
    }

    pub fn in_memory(config: AppConfig) -> anyhow::Result<Self> {
        Self::from_parts(config, Arc::new(MemoryUserStore::new()))
    }
}
