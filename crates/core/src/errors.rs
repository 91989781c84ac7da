use thiserror::Error;

use crate::domain::agent::AgentId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("agent `{0}` not found")]
    AgentNotFound(AgentId),
    #[error("invalid target configuration: {0}")]
    InvalidTarget(String),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

/// Failure reported by a downstream SaaS provider or its client.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{provider} is not configured")]
    NotConfigured { provider: &'static str },
    #[error("{provider} request failed: {message}")]
    Request { provider: &'static str, message: String },
    #[error("{provider} responded with status {status}: {body}")]
    UnexpectedStatus { provider: &'static str, status: u16, body: String },
    #[error("{provider} response could not be decoded: {message}")]
    Decode { provider: &'static str, message: String },
}

impl ProviderError {
    pub fn provider(&self) -> &'static str {
        match self {
            Self::NotConfigured { provider }
            | Self::Request { provider, .. }
            | Self::UnexpectedStatus { provider, .. }
            | Self::Decode { provider, .. } => provider,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("validation failed: {message}")]
    Validation { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound { message, .. }
            | Self::Validation { message, .. }
            | Self::ServiceUnavailable { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::NotFound { correlation_id, .. }
            | Self::Validation { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Validation { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Domain(DomainError::AgentNotFound(_)) => {
                Self::NotFound { message: "Agente no encontrado".to_owned(), correlation_id }
            }
            ApplicationError::Domain(error @ DomainError::InvalidTarget(_))
            | ApplicationError::Domain(error @ DomainError::InvariantViolation(_)) => {
                Self::Validation { message: error.to_string(), correlation_id }
            }
            ApplicationError::Provider(error) => {
                Self::Internal { message: error.to_string(), correlation_id }
            }
            ApplicationError::Persistence(message) => {
                Self::ServiceUnavailable { message, correlation_id }
            }
            ApplicationError::Configuration(message) => Self::Internal { message, correlation_id },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::agent::AgentId;
    use crate::errors::{ApplicationError, DomainError, InterfaceError, ProviderError};

    #[test]
    fn unknown_agent_maps_to_not_found() {
        let interface =
            ApplicationError::from(DomainError::AgentNotFound(AgentId("missing".to_owned())))
                .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::NotFound { ref correlation_id, .. } if correlation_id == "req-1"
        ));
        assert_eq!(interface.message(), "Agente no encontrado");
    }

    #[test]
    fn invalid_target_maps_to_validation() {
        let interface = ApplicationError::from(DomainError::InvalidTarget(
            "target_config.radius_km must be greater than zero".to_owned(),
        ))
        .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::Validation { .. }));
        assert!(interface.message().contains("radius_km"));
    }

    #[test]
    fn provider_failure_maps_to_internal() {
        let interface = ApplicationError::from(ProviderError::Request {
            provider: "serper",
            message: "connection reset".to_owned(),
        })
        .into_interface("req-3");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.correlation_id(), "req-3");
    }

    #[test]
    fn persistence_failure_maps_to_service_unavailable() {
        let interface =
            ApplicationError::Persistence("database lock timeout".to_owned()).into_interface("r4");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
    }
}
