use std::sync::Arc;

use common::{
    error::AppError, pipeline::MessagePipeline, storage::db::SurrealDbClient,
    utils::config::AppConfig,
};

#[derive(Clone)]
pub struct ApiState {
    pub db: Arc<SurrealDbClient>,
    pub config: AppConfig,
    pub pipeline: MessagePipeline,
}

impl ApiState {
    /// Connects to the configured database and applies migrations.
    pub async fn new(config: &AppConfig) -> Result<Self, AppError> {
        let surreal_db_client = Arc::new(
            SurrealDbClient::new(
                &config.surrealdb_address,
                &config.surrealdb_username,
                &config.surrealdb_password,
                &config.surrealdb_namespace,
                &config.surrealdb_database,
            )
            .await?,
        );

        surreal_db_client.apply_migrations().await?;

        Ok(Self::with_db(surreal_db_client, config.clone()))
    }

    /// Builds state around an already prepared database client.
    pub fn with_db(db: Arc<SurrealDbClient>, config: AppConfig) -> Self {
        Self {
            db,
            pipeline: MessagePipeline::new(config.profanity_policy),
            config,
        }
    }
}
