use geoinsight_core::config::VoiceConfig;
use geoinsight_core::ProviderError;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::info;

use crate::http::{build_client, read_json, request_error, trim_base_url};

const PROVIDER: &str = "vapi";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Assistant {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Voice-AI platform client. Numbers bought through Twilio route their calls here.
#[derive(Clone)]
pub struct VapiClient {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
}

impl VapiClient {
    pub fn from_config(config: &VoiceConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(PROVIDER, config.timeout_secs)?,
            api_key: config.api_key.clone(),
            base_url: trim_base_url(&config.base_url).to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn list_assistants(&self) -> Result<Vec<Assistant>, ProviderError> {
        let api_key =
            self.api_key.as_ref().ok_or(ProviderError::NotConfigured { provider: PROVIDER })?;

        let response = self
            .client
            .get(format!("{}/assistant", self.base_url))
            .bearer_auth(api_key.expose_secret())
            .send()
            .await
            .map_err(|error| request_error(PROVIDER, error))?;

        let assistants: Vec<Assistant> = read_json(PROVIDER, response).await?;
        info!(event_name = "voice.assistants.listed", count = assistants.len(), "assistants listed");
        Ok(assistants)
    }
}

#[cfg(test)]
mod tests {
    use geoinsight_core::config::AppConfig;
    use geoinsight_core::ProviderError;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::VapiClient;

    fn client(base_url: &str, api_key: Option<&str>) -> VapiClient {
        let mut config = AppConfig::default().voice;
        config.base_url = format!("{base_url}/");
        config.api_key = api_key.map(|key| key.to_string().into());
        VapiClient::from_config(&config).expect("client")
    }

    #[tokio::test]
    async fn lists_assistants_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assistant"))
            .and(header("authorization", "Bearer vapi-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "asst-1", "name": "Recepción"},
                {"id": "asst-2"}
            ])))
            .mount(&server)
            .await;

        let assistants =
            client(&server.uri(), Some("vapi-key")).list_assistants().await.expect("assistants");

        assert_eq!(assistants.len(), 2);
        assert_eq!(assistants[0].name.as_deref(), Some("Recepción"));
        assert_eq!(assistants[1].name, None);
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let result = client("http://127.0.0.1:9", None).list_assistants().await;
        assert!(matches!(result, Err(ProviderError::NotConfigured { provider: "vapi" })));
    }

    #[tokio::test]
    async fn rejected_key_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let result = client(&server.uri(), Some("bad")).list_assistants().await;

        match result {
            Err(ProviderError::UnexpectedStatus { status, body, .. }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid key");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
