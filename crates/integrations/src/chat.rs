use anyhow::{anyhow, Context};
use async_trait::async_trait;
use geoinsight_core::config::LlmConfig;
use geoinsight_core::ProviderError;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{build_client, read_json, request_error, trim_base_url};

const PROVIDER: &str = "groq";

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

/// OpenAI-compatible chat-completions client.
#[derive(Clone)]
pub struct GroqChatClient {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

impl GroqChatClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(PROVIDER, config.timeout_secs)?,
            api_key: config.api_key.clone(),
            base_url: trim_base_url(&config.base_url).to_string(),
            model: config.model.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for GroqChatClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(ProviderError::NotConfigured { provider: PROVIDER })?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|error| request_error(PROVIDER, error))?;

        let body: ChatResponse = read_json(PROVIDER, response)
            .await
            .with_context(|| format!("chat completion with model {}", self.model))?;

        let reply = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("chat completion returned no choices"))?;

        debug!(
            event_name = "llm.completion.received",
            model = %self.model,
            chars = reply.len(),
            "completion received"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use geoinsight_core::config::AppConfig;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{GroqChatClient, LlmClient};

    fn client(base_url: &str, api_key: Option<&str>) -> GroqChatClient {
        let mut config = AppConfig::default().llm;
        config.base_url = base_url.to_string();
        config.api_key = api_key.map(|key| key.to_string().into());
        GroqChatClient::from_config(&config).expect("client")
    }

    #[tokio::test]
    async fn complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer groq-key"))
            .and(body_partial_json(json!({
                "model": "llama-3.1-8b-instant",
                "messages": [{"role": "user", "content": "ping"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "pong"}}]
            })))
            .mount(&server)
            .await;

        let reply = client(&server.uri(), Some("groq-key")).complete("ping").await.expect("reply");
        assert_eq!(reply, "pong");
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let error = client(&server.uri(), Some("groq-key")).complete("ping").await.unwrap_err();
        assert!(error.to_string().contains("no choices"));
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let error = client("http://127.0.0.1:9", None).complete("ping").await.unwrap_err();
        assert!(error.to_string().contains("not configured"));
    }
}
