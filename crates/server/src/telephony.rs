use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use geoinsight_core::{AvailableNumber, ProvisionOutcome, TelephonyProvisioner};
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

const DEFAULT_COUNTRY_CODE: &str = "CO";

#[derive(Clone)]
pub struct TelephonyState {
    provisioner: Arc<dyn TelephonyProvisioner>,
}

#[derive(Debug, Deserialize)]
pub struct NumbersQuery {
    country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProvisionQuery {
    phone_number: String,
}

#[derive(Debug, Serialize)]
pub struct NumbersResponse {
    numeros: Vec<AvailableNumber>,
}

pub fn router(provisioner: Arc<dyn TelephonyProvisioner>) -> Router {
    Router::new()
        .route("/telephony/numbers", get(list_numbers))
        .route("/telephony/provision", post(provision_number))
        .with_state(TelephonyState { provisioner })
}

/// Never fails: provider problems surface as an empty list.
pub async fn list_numbers(
    State(state): State<TelephonyState>,
    Query(query): Query<NumbersQuery>,
) -> Json<NumbersResponse> {
    let country_code = query
        .country_code
        .filter(|code| !code.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string());

    let numeros = state.provisioner.list_available_numbers(&country_code).await;
    Json(NumbersResponse { numeros })
}

pub async fn provision_number(
    State(state): State<TelephonyState>,
    query: Result<Query<ProvisionQuery>, QueryRejection>,
) -> Result<Json<ProvisionOutcome>, ApiError> {
    let Query(query) = query?;

    match state.provisioner.buy_and_bind(&query.phone_number).await {
        outcome @ ProvisionOutcome::Success { .. } => Ok(Json(outcome)),
        ProvisionOutcome::Error { message } => Err(ApiError::internal(message)),
    }
}
