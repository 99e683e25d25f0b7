//! Application configuration structs
//!
//! Loads configuration from environment variables (with optional `.env` file).

use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub store: StoreConfig,
    pub redis: Option<RedisConfig>,
    pub devops: DevOpsConfig,
    pub content: ContentConfig,
    pub settings: SettingsConfig,
    pub sessions: SessionConfig,
    pub cors: CorsConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Settings blob store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

/// Settings blob store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_store_key")]
    pub key: String,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Work-tracking platform REST configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DevOpsConfig {
    pub org_url: String,
    #[serde(default)]
    pub pat: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// Daily content dataset locations
#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_questions_url")]
    pub questions_url: String,
    #[serde(default = "default_holidays_url")]
    pub holidays_url: String,
}

/// Settings editor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_save_min_interval_ms")]
    pub save_min_interval_ms: u64,
}

impl SettingsConfig {
    #[must_use]
    pub fn save_min_interval(&self) -> Duration {
        Duration::from_millis(self.save_min_interval_ms)
    }
}

/// Open session expiry
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_session_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl SessionConfig {
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

// Default value functions
fn default_app_name() -> String {
    "team-randomizer".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_store_key() -> String {
    "availableMembers".to_string()
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_api_version() -> String {
    "7.1".to_string()
}

fn default_page_size() -> usize {
    100
}

fn default_questions_url() -> String {
    "https://raw.githubusercontent.com/microsoft/azdo-extension-team-randomizer/main/qotd.json"
        .to_string()
}

fn default_holidays_url() -> String {
    "https://raw.githubusercontent.com/microsoft/azdo-extension-team-randomizer/main/hotd.json"
        .to_string()
}

fn default_save_min_interval_ms() -> u64 {
    600
}

fn default_session_idle_timeout_secs() -> u64 {
    30 * 60
}

fn default_session_sweep_interval_secs() -> u64 {
    60
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("STORE_BACKEND") {
            None => StoreBackend::default(),
            Some(value) => match value.trim().to_lowercase().as_str() {
                "memory" => StoreBackend::Memory,
                "redis" => StoreBackend::Redis,
                _ => return Err(ConfigError::InvalidValue("STORE_BACKEND", value)),
            },
        };

        let redis = match lookup("REDIS_URL") {
            Some(url) => Some(RedisConfig {
                url,
                max_connections: parse_or(&lookup, "REDIS_MAX_CONNECTIONS", default_redis_max_connections)?,
            }),
            None if backend == StoreBackend::Redis => {
                return Err(ConfigError::MissingVar("REDIS_URL"));
            }
            None => None,
        };

        let page_size = parse_or(&lookup, "DEVOPS_PAGE_SIZE", default_page_size)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidValue("DEVOPS_PAGE_SIZE", "0".to_string()));
        }

        let sessions = SessionConfig {
            idle_timeout_secs: parse_or(&lookup, "SESSION_IDLE_TIMEOUT_SECS", default_session_idle_timeout_secs)?,
            sweep_interval_secs: parse_or(&lookup, "SESSION_SWEEP_INTERVAL_SECS", default_session_sweep_interval_secs)?,
        };
        if sessions.idle_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("SESSION_IDLE_TIMEOUT_SECS", "0".to_string()));
        }
        if sessions.sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidValue("SESSION_SWEEP_INTERVAL_SECS", "0".to_string()));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: lookup("API_HOST").unwrap_or_else(default_host),
                port: lookup("API_PORT")
                    .ok_or(ConfigError::MissingVar("API_PORT"))?
                    .parse()
                    .map_err(|_| invalid(&lookup, "API_PORT"))?,
            },
            store: StoreConfig {
                backend,
                key: lookup("STORE_KEY").unwrap_or_else(default_store_key),
            },
            redis,
            devops: DevOpsConfig {
                org_url: lookup("DEVOPS_ORG_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .ok_or(ConfigError::MissingVar("DEVOPS_ORG_URL"))?,
                pat: lookup("DEVOPS_PAT").filter(|pat| !pat.is_empty()),
                api_version: lookup("DEVOPS_API_VERSION").unwrap_or_else(default_api_version),
                page_size,
            },
            content: ContentConfig {
                questions_url: lookup("QUESTIONS_URL").unwrap_or_else(default_questions_url),
                holidays_url: lookup("HOLIDAYS_URL").unwrap_or_else(default_holidays_url),
            },
            settings: SettingsConfig {
                save_min_interval_ms: parse_or(&lookup, "SAVE_MIN_INTERVAL_MS", default_save_min_interval_ms)?,
            },
            sessions,
            cors: CorsConfig {
                allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|origin| !origin.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: fn() -> T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, value)),
        None => Ok(default()),
    }
}

fn invalid<F>(lookup: &F, name: &'static str) -> ConfigError
where
    F: Fn(&str) -> Option<String>,
{
    ConfigError::InvalidValue(name, lookup(name).unwrap_or_default())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
