//! Layered process configuration: defaults, optional YAML file, environment.

use std::path::Path;

use anyhow::{Context, Result, bail};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};
use ticketdesk_auth::AuthConfig;
use tickets::TicketsConfig;

/// Environment variables with this prefix override file values,
/// e.g. `TICKETDESK__AUTH__SECRET` or `TICKETDESK__SERVER__PORT`.
pub const ENV_PREFIX: &str = "TICKETDESK__";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub tickets: TicketsConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Requests running longer than this answer 504.
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_owned(),
            port: 8080,
            request_timeout_secs: 30,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DatabaseConfig {
    /// `sqlite://...` or `postgres://...`
    pub dsn: String,
    pub max_connections: u32,
    pub connect_retries: u32,
    pub connect_retry_delay_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: "sqlite://ticketdesk.db?mode=rwc".to_owned(),
            max_connections: 10,
            connect_retries: 10,
            connect_retry_delay_ms: 2000,
        }
    }
}

/// CORS settings. A single `"*"` entry means "any".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CorsConfig {
    pub enabled: bool,
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
    /// Zero leaves `Access-Control-Max-Age` unset.
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_owned()],
            allowed_methods: ["GET", "POST", "PATCH", "OPTIONS"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            allowed_headers: vec!["Authorization".to_owned(), "Content-Type".to_owned()],
            allow_credentials: false,
            max_age_seconds: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive such as `info` or `tickets=debug,info`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Defaults, then the YAML file when given, then `TICKETDESK__*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("failed to load configuration")
    }

    /// Checks everything `run` would otherwise fail on after startup.
    pub fn validate(&self) -> Result<()> {
        if !self.auth.has_secret() {
            bail!("auth.secret must not be empty (set {ENV_PREFIX}AUTH__SECRET)");
        }
        if self.database.dsn.trim().is_empty() {
            bail!("database.dsn must not be empty");
        }
        if self.server.request_timeout_secs == 0 {
            bail!("server.request_timeout_secs must be greater than zero");
        }
        self.tickets.validate()?;
        crate::cors::build_cors_layer(&self.cors)?;
        Ok(())
    }

    /// YAML rendering with the token secret redacted.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration")
    }
}
