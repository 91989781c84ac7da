use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use geoinsight_core::{ApplicationError, InterfaceError};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// HTTP error carrying a status code and the `{"detail": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self { status, detail: detail.into() }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    /// Maps an application failure, tagging the log line with a fresh correlation id.
    pub fn from_application(error: ApplicationError) -> Self {
        let interface = error.into_interface(Uuid::new_v4().to_string());
        warn!(
            event_name = "http.request.failed",
            correlation_id = %interface.correlation_id(),
            error = %interface,
            "request failed"
        );
        Self::from(interface)
    }
}

impl From<InterfaceError> for ApiError {
    fn from(error: InterfaceError) -> Self {
        let status = match &error {
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, error.message())
    }
}

/// Every malformed body or query string is a 422, including syntax and content-type errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}
