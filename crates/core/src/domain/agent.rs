use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Active,
    Paused,
}

/// Geographic prospecting area and search term.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(rename = "lat", alias = "latitude")]
    pub latitude: f64,
    #[serde(rename = "lng", alias = "longitude")]
    pub longitude: f64,
    pub radius_km: f64,
    pub keyword: String,
}

impl TargetConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(DomainError::InvalidTarget(
                "target_config.lat must be within -90..=90".to_string(),
            ));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(DomainError::InvalidTarget(
                "target_config.lng must be within -180..=180".to_string(),
            ));
        }
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(DomainError::InvalidTarget(
                "target_config.radius_km must be greater than zero".to_string(),
            ));
        }
        if self.keyword.trim().is_empty() {
            return Err(DomainError::InvalidTarget(
                "target_config.keyword must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Create payload for an agent. Any `id` sent by a client is dropped during
/// deserialization because this type has no such field.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AgentInput {
    pub name: String,
    pub role: String,
    pub phone_number: String,
    pub gender: String,
    pub accent: String,
    pub instructions: String,
    pub company_info: String,
    pub target_config: TargetConfig,
    #[serde(default)]
    pub status: AgentStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub role: String,
    pub phone_number: String,
    pub gender: String,
    pub accent: String,
    pub instructions: String,
    pub company_info: String,
    pub target_config: TargetConfig,
    pub status: AgentStatus,
}

impl Agent {
    pub fn from_input(id: AgentId, input: AgentInput) -> Self {
        Self {
            id,
            name: input.name,
            role: input.role,
            phone_number: input.phone_number,
            gender: input.gender,
            accent: input.accent,
            instructions: input.instructions,
            company_info: input.company_info,
            target_config: input.target_config,
            status: input.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{AgentInput, AgentStatus, TargetConfig};

    fn target(radius_km: f64, keyword: &str) -> TargetConfig {
        TargetConfig { latitude: 4.71, longitude: -74.07, radius_km, keyword: keyword.to_string() }
    }

    #[test]
    fn input_ignores_client_supplied_id_and_defaults_status() {
        let input: AgentInput = serde_json::from_value(json!({
            "id": "client-chosen",
            "name": "A",
            "role": "sdr",
            "phone_number": "+571234",
            "gender": "female",
            "accent": "bogotano",
            "instructions": "be brief",
            "company_info": "hardware supplier",
            "target_config": {"lat": 4.71, "lng": -74.07, "radius_km": 5.0, "keyword": "Ferreterías"}
        }))
        .expect("input should deserialize");

        assert_eq!(input.status, AgentStatus::Active);
        assert_eq!(input.target_config.keyword, "Ferreterías");
    }

    #[test]
    fn target_accepts_long_coordinate_names() {
        let target: TargetConfig = serde_json::from_value(json!({
            "latitude": 6.25, "longitude": -75.56, "radius_km": 2, "keyword": "Panaderías"
        }))
        .expect("aliases should deserialize");

        assert_eq!(target.latitude, 6.25);
        let wire = serde_json::to_value(&target).expect("serialize");
        assert_eq!(wire["lat"], json!(6.25));
        assert_eq!(wire["lng"], json!(-75.56));
    }

    #[test]
    fn target_validation_rejects_non_positive_radius_and_blank_keyword() {
        assert!(target(5.0, "Ferreterías").validate().is_ok());
        assert!(target(0.0, "Ferreterías").validate().is_err());
        assert!(target(-1.0, "Ferreterías").validate().is_err());
        assert!(target(5.0, "   ").validate().is_err());
    }
}
