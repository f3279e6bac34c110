use std::sync::Arc;

use behuman_core::config::{AppConfig, ConfigError, LoadOptions};
use behuman_core::RecommendationEngine;
use behuman_db::repositories::{SqlCatalogRepository, SqlWellnessRequestRepository};
use behuman_db::{connect_with_settings, migrations, DbPool};
use thiserror::Error;
use tracing::info;

use crate::api::ApiState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub engine: Arc<RecommendationEngine>,
    pub wellness_requests: Arc<SqlWellnessRequestRepository>,
}

impl Application {
    pub fn api_state(&self) -> ApiState {
        ApiState::new(self.engine.clone(), self.wellness_requests.clone())
            .with_top_n(self.config.recommendation.top_n)
            .with_persistence(self.config.recommendation.persist_requests)
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let catalog = Arc::new(SqlCatalogRepository::new(db_pool.clone()));
    let wellness_requests = Arc::new(SqlWellnessRequestRepository::new(db_pool.clone()));
    let mut engine = RecommendationEngine::new(catalog, wellness_requests.clone());
    if let Some(seed) = config.recommendation.rng_seed {
        engine = engine.with_seed(seed);
    }

    info!(
        event_name = "system.bootstrap.engine_ready",
        correlation_id = "bootstrap",
        top_n = config.recommendation.top_n,
        persist_requests = config.recommendation.persist_requests,
        seeded = config.recommendation.rng_seed.is_some(),
        "recommendation engine ready"
    );

    Ok(Application { config, db_pool, engine: Arc::new(engine), wellness_requests })
}
