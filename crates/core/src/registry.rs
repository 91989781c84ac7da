use tokio::sync::RwLock;
use tracing::info;

use crate::domain::agent::{Agent, AgentId, AgentInput};
use crate::errors::DomainError;

/// Process-local agent collection. Insertion order is preserved; agents are
/// never updated or removed once created.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: RwLock<Vec<Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, input: AgentInput) -> Result<Agent, DomainError> {
        input.target_config.validate()?;

        let agent = Agent::from_input(AgentId::generate(), input);
        let mut agents = self.agents.write().await;
        agents.push(agent.clone());

        info!(
            event_name = "registry.agent.created",
            agent_id = %agent.id,
            agent_name = %agent.name,
            registry_size = agents.len(),
            "agent registered"
        );
        Ok(agent)
    }

    pub async fn list(&self) -> Vec<Agent> {
        self.agents.read().await.clone()
    }

    pub async fn get(&self, id: &AgentId) -> Result<Agent, DomainError> {
        let agents = self.agents.read().await;
        agents
            .iter()
            .find(|agent| &agent.id == id)
            .cloned()
            .ok_or_else(|| DomainError::AgentNotFound(id.clone()))
    }

    pub async fn len(&self) -> usize {
        self.agents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.agents.read().await.is_empty()
    }
}
