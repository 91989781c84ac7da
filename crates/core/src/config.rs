use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::agent::TargetConfig;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub prospecting: ProspectingConfig,
    pub telephony: TelephonyConfig,
    pub voice: VoiceConfig,
    pub llm: LlmConfig,
    pub scheduler: SchedulerConfig,
    pub quotes: QuotesConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ProspectingConfig {
    pub serper_api_key: Option<SecretString>,
    pub firecrawl_api_key: Option<SecretString>,
}

#[derive(Clone, Debug)]
pub struct TelephonyConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<SecretString>,
    pub base_url: String,
    pub voice_webhook_url: String,
    pub timeout_secs: u64,
}

impl TelephonyConfig {
    pub fn is_configured(&self) -> bool {
        self.account_sid.is_some() && self.auth_token.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct VoiceConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    pub interval_secs: u64,
    pub target: TargetConfig,
}

#[derive(Clone, Debug)]
pub struct QuotesConfig {
    pub output_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub server_port: Option<u16>,
    pub serper_api_key: Option<String>,
    pub firecrawl_api_key: Option<String>,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_base_url: Option<String>,
    pub vapi_api_key: Option<String>,
    pub vapi_base_url: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub scheduler_interval_secs: Option<u64>,
    pub quotes_output_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:5174",
    "http://localhost:5175",
    "http://localhost:5176",
    "http://127.0.0.1:5173",
];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://geoinsight.db?mode=rwc".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 8000,
                graceful_shutdown_secs: 15,
                cors_allowed_origins: DEFAULT_CORS_ORIGINS
                    .iter()
                    .map(|origin| origin.to_string())
                    .collect(),
            },
            prospecting: ProspectingConfig::default(),
            telephony: TelephonyConfig {
                account_sid: None,
                auth_token: None,
                base_url: "https://api.twilio.com".to_string(),
                voice_webhook_url: "https://api.vapi.ai/phone/twilio".to_string(),
                timeout_secs: 30,
            },
            voice: VoiceConfig {
                api_key: None,
                base_url: "https://api.vapi.ai".to_string(),
                timeout_secs: 30,
            },
            llm: LlmConfig {
                api_key: None,
                base_url: "https://api.groq.com/openai/v1".to_string(),
                model: "llama-3.1-8b-instant".to_string(),
                timeout_secs: 30,
            },
            scheduler: SchedulerConfig {
                interval_secs: 24 * 60 * 60,
                target: TargetConfig {
                    latitude: 4.71,
                    longitude: -74.07,
                    radius_km: 5.0,
                    keyword: "Ferreterías".to_string(),
                },
            },
            quotes: QuotesConfig { output_dir: PathBuf::from(".tmp") },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("geoinsight.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
            if let Some(origins) = server.cors_allowed_origins {
                self.server.cors_allowed_origins = origins;
            }
        }

        if let Some(prospecting) = patch.prospecting {
            if let Some(serper_api_key_value) = prospecting.serper_api_key {
                self.prospecting.serper_api_key = Some(secret_value(serper_api_key_value));
            }
            if let Some(firecrawl_api_key_value) = prospecting.firecrawl_api_key {
                self.prospecting.firecrawl_api_key = Some(secret_value(firecrawl_api_key_value));
            }
        }

        if let Some(telephony) = patch.telephony {
            if let Some(account_sid) = telephony.account_sid {
                self.telephony.account_sid = Some(account_sid);
            }
            if let Some(auth_token_value) = telephony.auth_token {
                self.telephony.auth_token = Some(secret_value(auth_token_value));
            }
            if let Some(base_url) = telephony.base_url {
                self.telephony.base_url = base_url;
            }
            if let Some(voice_webhook_url) = telephony.voice_webhook_url {
                self.telephony.voice_webhook_url = voice_webhook_url;
            }
            if let Some(timeout_secs) = telephony.timeout_secs {
                self.telephony.timeout_secs = timeout_secs;
            }
        }

        if let Some(voice) = patch.voice {
            if let Some(api_key_value) = voice.api_key {
                self.voice.api_key = Some(secret_value(api_key_value));
            }
            if let Some(base_url) = voice.base_url {
                self.voice.base_url = base_url;
            }
            if let Some(timeout_secs) = voice.timeout_secs {
                self.voice.timeout_secs = timeout_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(scheduler) = patch.scheduler {
            if let Some(interval_secs) = scheduler.interval_secs {
                self.scheduler.interval_secs = interval_secs;
            }
            if let Some(lat) = scheduler.lat {
                self.scheduler.target.latitude = lat;
            }
            if let Some(lng) = scheduler.lng {
                self.scheduler.target.longitude = lng;
            }
            if let Some(radius_km) = scheduler.radius_km {
                self.scheduler.target.radius_km = radius_km;
            }
            if let Some(keyword) = scheduler.keyword {
                self.scheduler.target.keyword = keyword;
            }
        }

        if let Some(quotes) = patch.quotes {
            if let Some(output_dir) = quotes.output_dir {
                self.quotes.output_dir = output_dir;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("GEOINSIGHT_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("GEOINSIGHT_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("GEOINSIGHT_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("GEOINSIGHT_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("GEOINSIGHT_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("GEOINSIGHT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("GEOINSIGHT_SERVER_PORT") {
            self.server.port = parse_u16("GEOINSIGHT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("GEOINSIGHT_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("GEOINSIGHT_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }
        if let Some(value) = read_env("GEOINSIGHT_SERVER_CORS_ALLOWED_ORIGINS") {
            self.server.cors_allowed_origins = value
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
        }

        if let Some(value) = read_env_alias("GEOINSIGHT_SERPER_API_KEY", "SERPER_API_KEY") {
            self.prospecting.serper_api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env_alias("GEOINSIGHT_FIRECRAWL_API_KEY", "FIRECRAWL_API_KEY") {
            self.prospecting.firecrawl_api_key = Some(secret_value(value));
        }

        if let Some(value) =
            read_env_alias("GEOINSIGHT_TWILIO_ACCOUNT_SID", "TWILIO_ACCOUNT_SID")
        {
            self.telephony.account_sid = Some(value);
        }
        if let Some(value) = read_env_alias("GEOINSIGHT_TWILIO_AUTH_TOKEN", "TWILIO_AUTH_TOKEN") {
            self.telephony.auth_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("GEOINSIGHT_TWILIO_BASE_URL") {
            self.telephony.base_url = value;
        }
        if let Some(value) = read_env("GEOINSIGHT_TWILIO_VOICE_WEBHOOK_URL") {
            self.telephony.voice_webhook_url = value;
        }

        if let Some(value) = read_env_alias("GEOINSIGHT_VAPI_API_KEY", "VAPI_API_KEY") {
            self.voice.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("GEOINSIGHT_VAPI_BASE_URL") {
            self.voice.base_url = value;
        }

        if let Some(value) = read_env_alias("GEOINSIGHT_LLM_API_KEY", "GROQ_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("GEOINSIGHT_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = read_env("GEOINSIGHT_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("GEOINSIGHT_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("GEOINSIGHT_LLM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("GEOINSIGHT_SCHEDULER_INTERVAL_SECS") {
            self.scheduler.interval_secs =
                parse_u64("GEOINSIGHT_SCHEDULER_INTERVAL_SECS", &value)?;
        }
        if let Some(value) = read_env("GEOINSIGHT_SCHEDULER_KEYWORD") {
            self.scheduler.target.keyword = value;
        }

        if let Some(value) = read_env("GEOINSIGHT_QUOTES_OUTPUT_DIR") {
            self.quotes.output_dir = PathBuf::from(value);
        }

        let log_level =
            read_env("GEOINSIGHT_LOGGING_LEVEL").or_else(|| read_env("GEOINSIGHT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("GEOINSIGHT_LOGGING_FORMAT").or_else(|| read_env("GEOINSIGHT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(serper_api_key) = overrides.serper_api_key {
            self.prospecting.serper_api_key = Some(secret_value(serper_api_key));
        }
        if let Some(firecrawl_api_key) = overrides.firecrawl_api_key {
            self.prospecting.firecrawl_api_key = Some(secret_value(firecrawl_api_key));
        }
        if let Some(account_sid) = overrides.twilio_account_sid {
            self.telephony.account_sid = Some(account_sid);
        }
        if let Some(auth_token) = overrides.twilio_auth_token {
            self.telephony.auth_token = Some(secret_value(auth_token));
        }
        if let Some(base_url) = overrides.twilio_base_url {
            self.telephony.base_url = base_url;
        }
        if let Some(vapi_api_key) = overrides.vapi_api_key {
            self.voice.api_key = Some(secret_value(vapi_api_key));
        }
        if let Some(base_url) = overrides.vapi_base_url {
            self.voice.base_url = base_url;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(base_url) = overrides.llm_base_url {
            self.llm.base_url = base_url;
        }
        if let Some(interval_secs) = overrides.scheduler_interval_secs {
            self.scheduler.interval_secs = interval_secs;
        }
        if let Some(output_dir) = overrides.quotes_output_dir {
            self.quotes.output_dir = output_dir;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_server(&self.server)?;
        validate_telephony(&self.telephony)?;
        validate_voice(&self.voice)?;
        validate_llm(&self.llm)?;
        validate_scheduler(&self.scheduler)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("geoinsight.toml"), PathBuf::from("config/geoinsight.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Replaces `${VAR}` with the variable's value. Comment lines are left untouched.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());

    for line in input.split_inclusive('\n') {
        if line.trim_start().starts_with('#') {
            output.push_str(line);
            continue;
        }

        let mut chars = line.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '$' && matches!(chars.peek(), Some('{')) {
                chars.next();
                let mut key = String::new();

                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(next) => key.push(next),
                        None => return Err(ConfigError::UnterminatedInterpolation),
                    }
                }

                let value = env::var(&key)
                    .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
                output.push_str(&value);
                continue;
            }

            output.push(ch);
        }
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    if let Some(origin) = server.cors_allowed_origins.iter().find(|origin| !is_http_url(origin)) {
        return Err(ConfigError::Validation(format!(
            "server.cors_allowed_origins entry `{origin}` must start with http:// or https://"
        )));
    }

    Ok(())
}

fn validate_telephony(telephony: &TelephonyConfig) -> Result<(), ConfigError> {
    let has_sid = telephony.account_sid.as_ref().is_some_and(|sid| !sid.trim().is_empty());
    let has_token =
        telephony.auth_token.as_ref().is_some_and(|token| !token.expose_secret().trim().is_empty());
    if has_sid != has_token {
        return Err(ConfigError::Validation(
            "telephony.account_sid and telephony.auth_token must be configured together"
                .to_string(),
        ));
    }

    if let Some(sid) = &telephony.account_sid {
        if !sid.starts_with("AC") {
            return Err(ConfigError::Validation(
                "telephony.account_sid must start with `AC`. Find it on the Twilio console dashboard"
                    .to_string(),
            ));
        }
    }

    if !is_http_url(&telephony.base_url) {
        return Err(ConfigError::Validation(
            "telephony.base_url must start with http:// or https://".to_string(),
        ));
    }
    if !is_http_url(&telephony.voice_webhook_url) {
        return Err(ConfigError::Validation(
            "telephony.voice_webhook_url must start with http:// or https://".to_string(),
        ));
    }

    validate_timeout("telephony.timeout_secs", telephony.timeout_secs)
}

fn validate_voice(voice: &VoiceConfig) -> Result<(), ConfigError> {
    if !is_http_url(&voice.base_url) {
        return Err(ConfigError::Validation(
            "voice.base_url must start with http:// or https://".to_string(),
        ));
    }
    validate_timeout("voice.timeout_secs", voice.timeout_secs)
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if !is_http_url(&llm.base_url) {
        return Err(ConfigError::Validation(
            "llm.base_url must start with http:// or https://".to_string(),
        ));
    }
    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }
    validate_timeout("llm.timeout_secs", llm.timeout_secs)
}

fn validate_scheduler(scheduler: &SchedulerConfig) -> Result<(), ConfigError> {
    if scheduler.interval_secs == 0 {
        return Err(ConfigError::Validation(
            "scheduler.interval_secs must be greater than zero".to_string(),
        ));
    }

    scheduler
        .target
        .validate()
        .map_err(|error| ConfigError::Validation(format!("scheduler target: {error}")))
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn validate_timeout(key: &str, timeout_secs: u64) -> Result<(), ConfigError> {
    if timeout_secs == 0 || timeout_secs > 300 {
        return Err(ConfigError::Validation(format!("{key} must be in range 1..=300")));
    }
    Ok(())
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Prefixed variable first, then the provider's conventional name.
fn read_env_alias(key: &str, fallback: &str) -> Option<String> {
    read_env(key).or_else(|| read_env(fallback))
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    server: Option<ServerPatch>,
    prospecting: Option<ProspectingPatch>,
    telephony: Option<TelephonyPatch>,
    voice: Option<VoicePatch>,
    llm: Option<LlmPatch>,
    scheduler: Option<SchedulerPatch>,
    quotes: Option<QuotesPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
    cors_allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ProspectingPatch {
    serper_api_key: Option<String>,
    firecrawl_api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TelephonyPatch {
    account_sid: Option<String>,
    auth_token: Option<String>,
    base_url: Option<String>,
    voice_webhook_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct VoicePatch {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SchedulerPatch {
    interval_secs: Option<u64>,
    lat: Option<f64>,
    lng: Option<f64>,
    radius_km: Option<f64>,
    keyword: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct QuotesPatch {
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_are_valid_without_any_provider_credentials() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.server.port == 8000, "default port should be 8000")?;
        ensure(!config.telephony.is_configured(), "telephony should be unconfigured")?;
        ensure(config.prospecting.firecrawl_api_key.is_none(), "firecrawl key should be unset")?;
        ensure(config.scheduler.interval_secs == 86_400, "scheduler should run daily")?;
        ensure(config.scheduler.target.keyword == "Ferreterías", "default keyword")?;
        ensure(config.server.cors_allowed_origins.len() == 5, "five dev origins by default")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_TWILIO_SID", "AC-from-env");
        env::set_var("TEST_TWILIO_TOKEN", "token-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("geoinsight.toml");
            fs::write(
                &path,
                r#"
[telephony]
account_sid = "${TEST_TWILIO_SID}"
auth_token = "${TEST_TWILIO_TOKEN}"

[scheduler]
keyword = "Panaderías"
radius_km = 2.5
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.telephony.account_sid.as_deref() == Some("AC-from-env"),
                "account sid should be interpolated from environment",
            )?;
            ensure(
                config
                    .telephony
                    .auth_token
                    .as_ref()
                    .is_some_and(|token| token.expose_secret() == "token-from-env"),
                "auth token should be interpolated from environment",
            )?;
            ensure(config.scheduler.target.keyword == "Panaderías", "file keyword should apply")?;
            ensure(config.scheduler.target.radius_km == 2.5, "file radius should apply")
        })();

        clear_vars(&["TEST_TWILIO_SID", "TEST_TWILIO_TOKEN"]);
        result
    }

    #[test]
    fn provider_conventional_env_names_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("FIRECRAWL_API_KEY", "fc-test");
        env::set_var("VAPI_API_KEY", "vapi-test");
        env::set_var("GEOINSIGHT_LOG_LEVEL", "warn");
        env::set_var("GEOINSIGHT_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config
                    .prospecting
                    .firecrawl_api_key
                    .as_ref()
                    .is_some_and(|key| key.expose_secret() == "fc-test"),
                "firecrawl key should load from FIRECRAWL_API_KEY",
            )?;
            ensure(config.voice.api_key.is_some(), "vapi key should load from VAPI_API_KEY")?;
            ensure(config.logging.level == "warn", "log level alias should apply")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "log format alias should apply",
            )
        })();

        clear_vars(&[
            "FIRECRAWL_API_KEY",
            "VAPI_API_KEY",
            "GEOINSIGHT_LOG_LEVEL",
            "GEOINSIGHT_LOG_FORMAT",
        ]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("GEOINSIGHT_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("GEOINSIGHT_SERVER_PORT", "9100");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("geoinsight.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://from-file.db"

[server]
port = 9000
bind_address = "127.0.0.1"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.server.port == 9100, "env port should win over file")?;
            ensure(config.server.bind_address == "127.0.0.1", "file bind address should apply")
        })();

        clear_vars(&["GEOINSIGHT_DATABASE_URL", "GEOINSIGHT_SERVER_PORT"]);
        result
    }

    #[test]
    fn half_configured_telephony_fails_fast() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let error = match AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                twilio_account_sid: Some("AC123".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected validation failure but config load succeeded".into()),
            Err(error) => error,
        };

        let has_message = matches!(
            error,
            ConfigError::Validation(ref message) if message.contains("telephony.auth_token")
        );
        ensure(has_message, "validation failure should mention telephony.auth_token")
    }

    #[test]
    fn non_sqlite_database_url_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("postgres://localhost/leads".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::Validation(ref m)) if m.contains("database.url")),
            "postgres url should fail validation",
        )
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                twilio_account_sid: Some("AC-visible".to_string()),
                twilio_auth_token: Some("twilio-secret-value".to_string()),
                llm_api_key: Some("gsk-secret-value".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .map_err(|err| format!("config load failed: {err}"))?;
        let debug = format!("{config:?}");

        ensure(!debug.contains("twilio-secret-value"), "debug should not contain twilio token")?;
        ensure(!debug.contains("gsk-secret-value"), "debug should not contain llm key")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn interpolation_skips_commented_lines() -> Result<(), String> {
        let raw = "# api_key = \"${GEOINSIGHT_TEST_NEVER_SET}\"\nport = 8000\n";

        let interpolated =
            super::interpolate_env_vars(raw).map_err(|err| format!("interpolation failed: {err}"))?;

        ensure(interpolated == raw, "commented placeholders should be kept verbatim")
    }
}
