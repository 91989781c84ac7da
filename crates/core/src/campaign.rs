use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::domain::agent::AgentId;
use crate::errors::ApplicationError;
use crate::prospecting::LeadHunter;
use crate::registry::AgentRegistry;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    #[serde(rename = "procesando")]
    Processing,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignStartResult {
    pub status: CampaignStatus,
    pub message: String,
    #[serde(rename = "leads_encontrados")]
    pub leads_found: usize,
}

/// Bridges an agent's target to the prospecting capability.
#[derive(Clone)]
pub struct CampaignOrchestrator {
    registry: Arc<AgentRegistry>,
    hunter: Arc<dyn LeadHunter>,
}

impl CampaignOrchestrator {
    pub fn new(registry: Arc<AgentRegistry>, hunter: Arc<dyn LeadHunter>) -> Self {
        Self { registry, hunter }
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// Runs one grid search for the agent's target and reports the count.
    /// Found leads are not persisted here.
    pub async fn start(&self, agent_id: &AgentId) -> Result<CampaignStartResult, ApplicationError> {
        let agent = self.registry.get(agent_id).await?;
        let target = &agent.target_config;

        info!(
            event_name = "campaign.start.requested",
            agent_id = %agent.id,
            keyword = %target.keyword,
            lat = target.latitude,
            lng = target.longitude,
            radius_km = target.radius_km,
            "starting campaign grid search"
        );

        let leads = self.hunter.grid_search(target).await.map_err(|error| {
            error!(
                event_name = "campaign.start.failed",
                agent_id = %agent.id,
                provider = error.provider(),
                error = %error,
                "grid search failed"
            );
            ApplicationError::from(error)
        })?;

        info!(
            event_name = "campaign.start.completed",
            agent_id = %agent.id,
            leads_found = leads.len(),
            "campaign grid search completed"
        );

        Ok(CampaignStartResult {
            status: CampaignStatus::Processing,
            message: format!("Campaña iniciada para agente {}", agent.name),
            leads_found: leads.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use super::{CampaignOrchestrator, CampaignStatus};
    use crate::domain::agent::{AgentId, AgentInput, AgentStatus, TargetConfig};
    use crate::domain::lead::{EnrichmentOutcome, LeadCandidate};
    use crate::errors::{ApplicationError, DomainError, ProviderError};
    use crate::prospecting::LeadHunter;
    use crate::registry::AgentRegistry;

    struct CountingHunter {
        results: usize,
        fail: bool,
        calls: AtomicUsize,
    }

    impl CountingHunter {
        fn returning(results: usize) -> Self {
            Self { results, fail: false, calls: AtomicUsize::new(0) }
        }

        fn failing() -> Self {
            Self { results: 0, fail: true, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl LeadHunter for CountingHunter {
        async fn grid_search(
            &self,
            target: &TargetConfig,
        ) -> Result<Vec<LeadCandidate>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::Request {
                    provider: "serper",
                    message: "upstream timeout".to_string(),
                });
            }
            Ok((0..self.results)
                .map(|index| LeadCandidate {
                    name: format!("{} #{index}", target.keyword),
                    address: format!("Calle {index}"),
                    website: None,
                })
                .collect())
        }

        async fn enrich(&self, _website: &str) -> EnrichmentOutcome {
            EnrichmentOutcome::Skipped { reason: "not used".to_string() }
        }
    }

    fn input() -> AgentInput {
        AgentInput {
            name: "A".to_string(),
            role: "sdr".to_string(),
            phone_number: "+5716000000".to_string(),
            gender: "male".to_string(),
            accent: "paisa".to_string(),
            instructions: "Agenda demos".to_string(),
            company_info: "Software de inventario".to_string(),
            target_config: TargetConfig {
                latitude: 4.71,
                longitude: -74.07,
                radius_km: 5.0,
                keyword: "Ferreterías".to_string(),
            },
            status: AgentStatus::Active,
        }
    }

    #[tokio::test]
    async fn start_reports_count_returned_by_hunter() {
        for results in [0, 1, 2, 7] {
            let registry = Arc::new(AgentRegistry::new());
            let hunter = Arc::new(CountingHunter::returning(results));
            let orchestrator = CampaignOrchestrator::new(registry.clone(), hunter.clone());
            let agent = registry.create(input()).await.expect("create");

            let result = orchestrator.start(&agent.id).await.expect("start");

            assert_eq!(result.leads_found, results);
            assert_eq!(result.status, CampaignStatus::Processing);
            assert_eq!(result.message, "Campaña iniciada para agente A");
            assert_eq!(hunter.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn unknown_agent_is_not_found_and_hunter_is_never_called() {
        let registry = Arc::new(AgentRegistry::new());
        let hunter = Arc::new(CountingHunter::returning(2));
        let orchestrator = CampaignOrchestrator::new(registry, hunter.clone());

        let missing = AgentId("doesnotexist".to_string());
        let error = orchestrator.start(&missing).await.expect_err("should fail");

        assert_eq!(error, ApplicationError::Domain(DomainError::AgentNotFound(missing)));
        assert_eq!(hunter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn hunter_failure_propagates() {
        let registry = Arc::new(AgentRegistry::new());
        let orchestrator =
            CampaignOrchestrator::new(registry.clone(), Arc::new(CountingHunter::failing()));
        let agent = registry.create(input()).await.expect("create");

        let error = orchestrator.start(&agent.id).await.expect_err("should propagate");
        assert!(matches!(error, ApplicationError::Provider(_)));
    }

    #[tokio::test]
    async fn start_result_uses_historical_wire_keys() {
        let registry = Arc::new(AgentRegistry::new());
        let orchestrator =
            CampaignOrchestrator::new(registry.clone(), Arc::new(CountingHunter::returning(2)));
        let agent = registry.create(input()).await.expect("create");

        let result = orchestrator.start(&agent.id).await.expect("start");
        assert_eq!(
            serde_json::to_value(&result).expect("serialize"),
            json!({
                "status": "procesando",
                "message": "Campaña iniciada para agente A",
                "leads_encontrados": 2
            })
        );
    }
}
