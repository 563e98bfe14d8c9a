use regex::Regex;
use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ORIGIN_PATTERN: &str =
    r"^(https://([a-z0-9-]+\.)*apluz\.vercel\.app|http://(localhost|127\.0\.0\.1|\[::1\]):\d+)$";
pub const DEFAULT_FALLBACK_ORIGIN: &str = "https://apluz.vercel.app";

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub cors: CorsConfig,
    pub poll: PollConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Upstream API location and the credentials the relay holds on behalf of
/// its clients. Credentials stay optional here: a missing value fails the
/// request that needs it, not process start.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub workflow_id: Option<String>,
    pub assistant_id: Option<String>,
    pub session_beta: String,
    pub assistants_beta: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Regex,
    pub fallback_origin: String,
    pub allow_any: bool,
}

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 60,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

#[derive(Debug, Clone)]
pub struct SessionCredentials {
    pub api_key: String,
    pub workflow_id: String,
}

#[derive(Debug, Clone)]
pub struct ConversationCredentials {
    pub api_key: String,
    pub assistant_id: String,
}

impl CorsConfig {
    pub fn new(pattern: &str, fallback_origin: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            allowed_origins: Regex::new(pattern)?,
            fallback_origin: fallback_origin.into(),
            allow_any: false,
        })
    }
}

impl UpstreamConfig {
    pub fn session_credentials(&self) -> Result<SessionCredentials, ConfigError> {
        match (&self.api_key, &self.workflow_id) {
            (Some(api_key), Some(workflow_id)) => Ok(SessionCredentials {
                api_key: api_key.clone(),
                workflow_id: workflow_id.clone(),
            }),
            (api_key, workflow_id) => Err(missing(&[
                ("OPENAI_API_KEY", api_key.is_none()),
                ("WORKFLOW_ID", workflow_id.is_none()),
            ])),
        }
    }

    pub fn conversation_credentials(&self) -> Result<ConversationCredentials, ConfigError> {
        match (&self.api_key, &self.assistant_id) {
            (Some(api_key), Some(assistant_id)) => Ok(ConversationCredentials {
                api_key: api_key.clone(),
                assistant_id: assistant_id.clone(),
            }),
            (api_key, assistant_id) => Err(missing(&[
                ("OPENAI_API_KEY", api_key.is_none()),
                ("ASSISTANT_ID", assistant_id.is_none()),
            ])),
        }
    }
}

fn missing(checks: &[(&'static str, bool)]) -> ConfigError {
    ConfigError::Missing(
        checks
            .iter()
            .filter(|(_, absent)| *absent)
            .map(|(name, _)| *name)
            .collect(),
    )
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("Invalid {}: {}", name, e)),
        None => Ok(default),
    }
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    ["1", "true", "yes"]
        .iter()
        .any(|t| value.eq_ignore_ascii_case(t))
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from any variable source. Malformed values are an
    /// error; missing credentials are not.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let var_or =
            |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        // Blank credentials count as absent.
        let secret = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let pattern = var_or("CORS_ALLOWED_ORIGIN_PATTERN", DEFAULT_ORIGIN_PATTERN);

        Ok(Settings {
            server: ServerConfig {
                host: var_or("SERVER_HOST", "0.0.0.0"),
                port: parse_var(&lookup, "SERVER_PORT", 8080)?,
            },
            upstream: UpstreamConfig {
                base_url: var_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
                api_key: secret("OPENAI_API_KEY"),
                workflow_id: secret("WORKFLOW_ID"),
                assistant_id: secret("ASSISTANT_ID"),
                session_beta: var_or("SESSION_BETA_HEADER", "chatkit_beta=v1"),
                assistants_beta: var_or("ASSISTANTS_BETA_HEADER", "assistants=v2"),
                timeout: Duration::from_secs(parse_var(&lookup, "UPSTREAM_TIMEOUT_SECS", 30)?),
            },
            cors: CorsConfig {
                allow_any: lookup("CORS_ALLOW_ANY").is_some_and(|v| is_truthy(&v)),
                ..CorsConfig::new(
                    &pattern,
                    var_or("CORS_FALLBACK_ORIGIN", DEFAULT_FALLBACK_ORIGIN),
                )
                .map_err(|e| format!("Invalid CORS_ALLOWED_ORIGIN_PATTERN: {}", e))?
            },
            poll: PollConfig {
                interval: Duration::from_millis(parse_var(&lookup, "POLL_INTERVAL_MS", 1000)?),
                max_attempts: parse_var(&lookup, "POLL_MAX_ATTEMPTS", 60)?,
            },
        })
    }
}
