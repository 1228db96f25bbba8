use crate::auth::{
    memory::InMemoryUserStore, Authenticator, PasswordHasher, PgUserStore, UserRegistrar,
    UserStore,
};
use crate::config::AppConfig;
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migrations failed; continuing");
        }

        let hasher = PasswordHasher::new(config.password.params()?);
        let users = Arc::new(PgUserStore::new(db)) as Arc<dyn UserStore>;
        Ok(Self::from_parts(config, users, hasher))
    }

    pub fn from_parts(config: Arc<AppConfig>, users: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self {
            config,
            users,
            hasher,
        }
    }

    /// State over an in-process store; nothing touches the network.
    pub fn in_memory(config: AppConfig) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::new(config.password.params()?);
        let users = Arc::new(InMemoryUserStore::new()) as Arc<dyn UserStore>;
        Ok(Self::from_parts(Arc::new(config), users, hasher))
    }

    pub fn registrar(&self) -> UserRegistrar {
        UserRegistrar::new(self.hasher.clone(), self.users.clone())
    }

    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(self.hasher.clone(), self.users.clone())
    }
}
