use std::sync::Arc;

use axum::Router;
use geoinsight_core::config::{AppConfig, ConfigError};
use geoinsight_core::{
    AgentRegistry, CampaignOrchestrator, LeadHunter, ProviderError, TelephonyProvisioner,
};
use geoinsight_db::{connect, migrations, DbPool};
use geoinsight_integrations::{StaticLeadHunter, TwilioProvisioner};
use thiserror::Error;
use tracing::info;

use crate::app::{self, Services};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub orchestrator: Arc<CampaignOrchestrator>,
    pub provisioner: Arc<dyn TelephonyProvisioner>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("provider client setup failed: {0}")]
    Provider(#[from] ProviderError),
}

impl Application {
    pub fn router(&self) -> Router {
        let services = Services {
            db_pool: self.db_pool.clone(),
            orchestrator: self.orchestrator.clone(),
            provisioner: self.provisioner.clone(),
        };
        app::router(services, &self.config.server.cors_allowed_origins)
    }
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
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

    let hunter: Arc<dyn LeadHunter> = Arc::new(StaticLeadHunter::new(&config.prospecting));
    let orchestrator = Arc::new(CampaignOrchestrator::new(Arc::new(AgentRegistry::new()), hunter));
    let provisioner: Arc<dyn TelephonyProvisioner> =
        Arc::new(TwilioProvisioner::from_config(&config.telephony)?);
    info!(
        event_name = "system.bootstrap.providers_ready",
        correlation_id = "bootstrap",
        telephony_configured = config.telephony.is_configured(),
        enrichment_configured = config.prospecting.firecrawl_api_key.is_some(),
        "provider clients constructed"
    );

    Ok(Application { config, db_pool, orchestrator, provisioner })
}
