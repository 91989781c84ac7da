use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use geoinsight_core::domain::lead::LeadRecord;
use geoinsight_core::domain::organization::OrganizationId;

pub mod lead;
pub mod memory;
pub mod organization;

pub use lead::SqlLeadRepository;
pub use memory::{InMemoryLeadRepository, InMemoryOrganizationRepository};
pub use organization::SqlOrganizationRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Lead persistence. Records are keyed naturally by `(name, address)`.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Inserts the lead or, when a lead with the same name and address exists,
    /// refreshes its website, keyword, source and `updated_at`. Returns the stored row.
    async fn upsert(&self, lead: LeadRecord) -> Result<LeadRecord, RepositoryError>;

    async fn list_recent(&self, limit: u32) -> Result<Vec<LeadRecord>, RepositoryError>;
}

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn voice_settings(&self, id: &OrganizationId) -> Result<Option<Value>, RepositoryError>;

    async fn save_voice_settings(
        &self,
        id: &OrganizationId,
        settings: Value,
    ) -> Result<(), RepositoryError>;
}
