use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use geoinsight_core::{CampaignOrchestrator, TelephonyProvisioner};
use geoinsight_db::DbPool;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::warn;

use crate::{health, navigation, telephony};

/// Shared handles the HTTP layer is built from.
#[derive(Clone)]
pub struct Services {
    pub db_pool: DbPool,
    pub orchestrator: Arc<CampaignOrchestrator>,
    pub provisioner: Arc<dyn TelephonyProvisioner>,
}

pub fn router(services: Services, cors_allowed_origins: &[String]) -> Router {
    Router::new()
        .merge(health::router(services.db_pool))
        .merge(navigation::router(services.orchestrator))
        .merge(telephony::router(services.provisioner))
        .layer(cors_layer(cors_allowed_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            // Credentialed CORS cannot use a wildcard origin.
            Ok(value) if value != "*" => Some(value),
            Ok(_) => {
                warn!(
                    event_name = "system.cors.wildcard_ignored",
                    "ignoring wildcard CORS origin; credentials require explicit origins"
                );
                None
            }
            Err(error) => {
                warn!(
                    event_name = "system.cors.invalid_origin",
                    origin = %origin,
                    error = %error,
                    "ignoring invalid CORS origin"
                );
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}
