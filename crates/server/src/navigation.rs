use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use geoinsight_core::{Agent, AgentId, AgentInput, CampaignOrchestrator, CampaignStartResult};
use serde::Serialize;
use tracing::info;

use crate::errors::ApiError;

#[derive(Clone)]
pub struct NavigationState {
    orchestrator: Arc<CampaignOrchestrator>,
}

#[derive(Debug, Serialize)]
pub struct LayerStatus {
    status: &'static str,
    capa: &'static str,
}

pub fn router(orchestrator: Arc<CampaignOrchestrator>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/agents", get(list_agents).post(create_agent))
        .route("/agents/{id}", get(get_agent))
        .route("/agents/{id}/start", post(start_campaign))
        .with_state(NavigationState { orchestrator })
}

pub async fn root() -> Json<LayerStatus> {
    Json(LayerStatus { status: "activo", capa: "Navegación" })
}

pub async fn list_agents(State(state): State<NavigationState>) -> Json<Vec<Agent>> {
    Json(state.orchestrator.registry().list().await)
}

pub async fn create_agent(
    State(state): State<NavigationState>,
    input: Result<Json<AgentInput>, JsonRejection>,
) -> Result<Json<Agent>, ApiError> {
    let Json(input) = input?;
    let agent = state
        .orchestrator
        .registry()
        .create(input)
        .await
        .map_err(|error| ApiError::from_application(error.into()))?;

    info!(
        event_name = "http.agents.created",
        agent_id = %agent.id,
        "agent created via navigation api"
    );
    Ok(Json(agent))
}

pub async fn get_agent(
    State(state): State<NavigationState>,
    Path(id): Path<String>,
) -> Result<Json<Agent>, ApiError> {
    state
        .orchestrator
        .registry()
        .get(&AgentId(id))
        .await
        .map(Json)
        .map_err(|error| ApiError::from_application(error.into()))
}

pub async fn start_campaign(
    State(state): State<NavigationState>,
    Path(id): Path<String>,
) -> Result<Json<CampaignStartResult>, ApiError> {
    state
        .orchestrator
        .start(&AgentId(id))
        .await
        .map(Json)
        .map_err(ApiError::from_application)
}
