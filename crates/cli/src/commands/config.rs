use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use geoinsight_core::config::{AppConfig, LoadOptions};
use secrecy::SecretString;
use toml::Value;

struct Entry {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    for entry in entries(&config) {
        let source = field_source(
            entry.key_path,
            entry.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(entry.key_path, &entry.value, source));
    }

    lines.join("\n")
}

fn entries(config: &AppConfig) -> Vec<Entry> {
    let target = &config.scheduler.target;
    vec![
        Entry {
            key_path: "database.url",
            env_keys: &["GEOINSIGHT_DATABASE_URL"],
            value: config.database.url.clone(),
        },
        Entry {
            key_path: "database.max_connections",
            env_keys: &["GEOINSIGHT_DATABASE_MAX_CONNECTIONS"],
            value: config.database.max_connections.to_string(),
        },
        Entry {
            key_path: "server.bind_address",
            env_keys: &["GEOINSIGHT_SERVER_BIND_ADDRESS"],
            value: config.server.bind_address.clone(),
        },
        Entry {
            key_path: "server.port",
            env_keys: &["GEOINSIGHT_SERVER_PORT"],
            value: config.server.port.to_string(),
        },
        Entry {
            key_path: "server.cors_allowed_origins",
            env_keys: &["GEOINSIGHT_SERVER_CORS_ALLOWED_ORIGINS"],
            value: config.server.cors_allowed_origins.join(","),
        },
        Entry {
            key_path: "prospecting.serper_api_key",
            env_keys: &["GEOINSIGHT_SERPER_API_KEY", "SERPER_API_KEY"],
            value: redact_secret(config.prospecting.serper_api_key.as_ref()),
        },
        Entry {
            key_path: "prospecting.firecrawl_api_key",
            env_keys: &["GEOINSIGHT_FIRECRAWL_API_KEY", "FIRECRAWL_API_KEY"],
            value: redact_secret(config.prospecting.firecrawl_api_key.as_ref()),
        },
        Entry {
            key_path: "telephony.account_sid",
            env_keys: &["GEOINSIGHT_TWILIO_ACCOUNT_SID", "TWILIO_ACCOUNT_SID"],
            value: config
                .telephony
                .account_sid
                .as_deref()
                .map(redact_identifier)
                .unwrap_or_else(|| "<unset>".to_string()),
        },
        Entry {
            key_path: "telephony.auth_token",
            env_keys: &["GEOINSIGHT_TWILIO_AUTH_TOKEN", "TWILIO_AUTH_TOKEN"],
            value: redact_secret(config.telephony.auth_token.as_ref()),
        },
        Entry {
            key_path: "telephony.base_url",
            env_keys: &["GEOINSIGHT_TWILIO_BASE_URL"],
            value: config.telephony.base_url.clone(),
        },
        Entry {
            key_path: "telephony.voice_webhook_url",
            env_keys: &["GEOINSIGHT_TWILIO_VOICE_WEBHOOK_URL"],
            value: config.telephony.voice_webhook_url.clone(),
        },
        Entry {
            key_path: "voice.api_key",
            env_keys: &["GEOINSIGHT_VAPI_API_KEY", "VAPI_API_KEY"],
            value: redact_secret(config.voice.api_key.as_ref()),
        },
        Entry {
            key_path: "llm.api_key",
            env_keys: &["GEOINSIGHT_LLM_API_KEY", "GROQ_API_KEY"],
            value: redact_secret(config.llm.api_key.as_ref()),
        },
        Entry {
            key_path: "llm.model",
            env_keys: &["GEOINSIGHT_LLM_MODEL"],
            value: config.llm.model.clone(),
        },
        Entry {
            key_path: "scheduler.interval_secs",
            env_keys: &["GEOINSIGHT_SCHEDULER_INTERVAL_SECS"],
            value: config.scheduler.interval_secs.to_string(),
        },
        Entry {
            key_path: "scheduler.keyword",
            env_keys: &["GEOINSIGHT_SCHEDULER_KEYWORD"],
            value: format!(
                "{} @ ({}, {}) r={}km",
                target.keyword, target.latitude, target.longitude, target.radius_km
            ),
        },
        Entry {
            key_path: "quotes.output_dir",
            env_keys: &["GEOINSIGHT_QUOTES_OUTPUT_DIR"],
            value: config.quotes.output_dir.display().to_string(),
        },
        Entry {
            key_path: "logging.level",
            env_keys: &["GEOINSIGHT_LOGGING_LEVEL", "GEOINSIGHT_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Entry {
            key_path: "logging.format",
            env_keys: &["GEOINSIGHT_LOGGING_FORMAT", "GEOINSIGHT_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format),
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("geoinsight.toml"), PathBuf::from("config/geoinsight.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_secret(secret: Option<&SecretString>) -> String {
    match secret {
        Some(_) => "<redacted>".to_string(),
        None => "<unset>".to_string(),
    }
}

fn redact_identifier(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.chars().count() <= 6 {
        return "***".to_string();
    }
    format!("{}***", trimmed.chars().take(6).collect::<String>())
}
