use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::RwLock;

use geoinsight_core::domain::lead::LeadRecord;
use geoinsight_core::domain::organization::OrganizationId;

use super::{LeadRepository, OrganizationRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryLeadRepository {
    leads: RwLock<Vec<LeadRecord>>,
}

#[async_trait::async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn upsert(&self, lead: LeadRecord) -> Result<LeadRecord, RepositoryError> {
        let mut leads = self.leads.write().await;
        let existing = leads
            .iter_mut()
            .find(|stored| stored.name == lead.name && stored.address == lead.address);

        let stored = match existing {
            Some(stored) => {
                if lead.website.is_some() {
                    stored.website = lead.website;
                }
                if lead.keyword.is_some() {
                    stored.keyword = lead.keyword;
                }
                stored.source = lead.source;
                stored.updated_at = lead.updated_at;
                stored.clone()
            }
            None => {
                leads.push(lead.clone());
                lead
            }
        };
        Ok(stored)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<LeadRecord>, RepositoryError> {
        let mut leads = self.leads.read().await.clone();
        leads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.name.cmp(&b.name)));
        leads.truncate(limit as usize);
        Ok(leads)
    }
}

#[derive(Default)]
pub struct InMemoryOrganizationRepository {
    settings: RwLock<HashMap<String, Value>>,
}

#[async_trait::async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn voice_settings(&self, id: &OrganizationId) -> Result<Option<Value>, RepositoryError> {
        Ok(self.settings.read().await.get(&id.0).cloned())
    }

    async fn save_voice_settings(
        &self,
        id: &OrganizationId,
        settings: Value,
    ) -> Result<(), RepositoryError> {
        self.settings.write().await.insert(id.0.clone(), settings);
        Ok(())
    }
}
