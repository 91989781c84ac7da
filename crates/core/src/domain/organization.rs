use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(pub String);


#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrganizationVoiceSettings {
    pub organization_id: OrganizationId,
    pub voice_settings: Value,
}
