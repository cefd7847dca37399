use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use rolecall_core::config::{AppConfig, ConfigError, LoadOptions};
use rolecall_discord::gateway::{GatewayRunner, ReconnectPolicy};
use rolecall_discord::publish::NoopMessageTransport;
use rolecall_discord::roles::NoopRoleGateway;
use rolecall_discord::router::{router_dispatcher, InteractionRouter};
use rolecall_store::repositories::{MenuRepository, SqlMenuRepository};
use rolecall_store::{connect_with_settings, migrations, DbPool};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub menu_store: Arc<dyn MenuRepository>,
    pub gateway_runner: GatewayRunner,
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
        guild_id = "unknown",
        menu_id = "unknown",
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
        guild_id = "unknown",
        menu_id = "unknown",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        guild_id = "unknown",
        menu_id = "unknown",
        "database migrations applied"
    );

    let menu_store: Arc<dyn MenuRepository> = Arc::new(SqlMenuRepository::new(db_pool.clone()));

    // Noop collaborators stand in until a realtime session is wired; the
    // router and store behind them are the real thing.
    let router = Arc::new(InteractionRouter::new(
        menu_store.clone(),
        Arc::new(NoopRoleGateway),
        Arc::new(NoopMessageTransport),
    ));
    let gateway_runner =
        GatewayRunner::with_noop_transport(router_dispatcher(router), ReconnectPolicy::default());

    Ok(Application { config, db_pool, menu_store, gateway_runner })
}
