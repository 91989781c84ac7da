//! One-shot connectivity checks against each configured provider.
//!
//! A provider without credentials is reported as skipped rather than failed so
//! partially configured deployments still pass the checks they can run.

use geoinsight_core::config::AppConfig;
use serde::Serialize;

use crate::chat::{GroqChatClient, LlmClient};
use crate::telephony::TwilioProvisioner;
use crate::voice::VapiClient;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HandshakeReport {
    pub provider: &'static str,
    pub status: HandshakeStatus,
    pub details: String,
}

impl HandshakeReport {
    fn pass(provider: &'static str, details: impl Into<String>) -> Self {
        Self { provider, status: HandshakeStatus::Pass, details: details.into() }
    }

    fn fail(provider: &'static str, details: impl Into<String>) -> Self {
        Self { provider, status: HandshakeStatus::Fail, details: details.into() }
    }

    fn skipped(provider: &'static str) -> Self {
        Self {
            provider,
            status: HandshakeStatus::Skipped,
            details: "credentials not configured".to_string(),
        }
    }
}

pub async fn twilio(config: &AppConfig) -> HandshakeReport {
    const PROVIDER: &str = "twilio";
    let client = match TwilioProvisioner::from_config(&config.telephony) {
        Ok(client) => client,
        Err(error) => return HandshakeReport::fail(PROVIDER, error.to_string()),
    };
    if !client.is_configured() {
        return HandshakeReport::skipped(PROVIDER);
    }

    match client.fetch_account_name().await {
        Ok(name) => HandshakeReport::pass(PROVIDER, format!("authenticated as `{name}`")),
        Err(error) => HandshakeReport::fail(PROVIDER, error.to_string()),
    }
}

pub async fn vapi(config: &AppConfig) -> HandshakeReport {
    const PROVIDER: &str = "vapi";
    let client = match VapiClient::from_config(&config.voice) {
        Ok(client) => client,
        Err(error) => return HandshakeReport::fail(PROVIDER, error.to_string()),
    };
    if !client.is_configured() {
        return HandshakeReport::skipped(PROVIDER);
    }

    match client.list_assistants().await {
        Ok(assistants) => {
            HandshakeReport::pass(PROVIDER, format!("{} assistant(s) visible", assistants.len()))
        }
        Err(error) => HandshakeReport::fail(PROVIDER, error.to_string()),
    }
}

pub async fn groq(config: &AppConfig) -> HandshakeReport {
    const PROVIDER: &str = "groq";
    let client = match GroqChatClient::from_config(&config.llm) {
        Ok(client) => client,
        Err(error) => return HandshakeReport::fail(PROVIDER, error.to_string()),
    };
    if !client.is_configured() {
        return HandshakeReport::skipped(PROVIDER);
    }

    match client.complete("Responde solo con: ok").await {
        Ok(reply) => HandshakeReport::pass(
            PROVIDER,
            format!("model `{}` replied: {}", client.model(), truncate_reply(&reply)),
        ),
        Err(error) => HandshakeReport::fail(PROVIDER, format!("{error:#}")),
    }
}

fn truncate_reply(reply: &str) -> String {
    const MAX_CHARS: usize = 80;
    let reply = reply.trim();
    if reply.chars().count() <= MAX_CHARS {
        return reply.to_string();
    }
    let head: String = reply.chars().take(MAX_CHARS).collect();
    format!("{head}...")
}

pub async fn run_all(config: &AppConfig) -> Vec<HandshakeReport> {
    let (twilio, vapi, groq) = tokio::join!(twilio(config), vapi(config), groq(config));
    vec![twilio, vapi, groq]
}
