//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, ContentConfig, CorsConfig, DevOpsConfig, Environment,
    RedisConfig, ServerConfig, SessionConfig, SettingsConfig, StoreBackend, StoreConfig,
};
