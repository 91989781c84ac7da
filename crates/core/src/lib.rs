pub mod campaign;
pub mod config;
pub mod domain;
pub mod errors;
pub mod prospecting;
pub mod registry;
pub mod telephony;

pub use campaign::{CampaignOrchestrator, CampaignStartResult, CampaignStatus};
pub use domain::agent::{Agent, AgentId, AgentInput, AgentStatus, TargetConfig};
pub use domain::lead::{EnrichmentOutcome, LeadCandidate, LeadId, LeadRecord, LeadStatus};
pub use domain::organization::{OrganizationId, OrganizationVoiceSettings};
pub use domain::quote::{QuoteDocument, QuoteItem};
pub use domain::telephony::{AvailableNumber, NumberCapabilities, ProvisionOutcome};
pub use errors::{ApplicationError, DomainError, InterfaceError, ProviderError};
pub use prospecting::{grid_cells, GridCell, LeadHunter};
pub use registry::AgentRegistry;
pub use telephony::TelephonyProvisioner;
