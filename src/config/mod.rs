//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, DatabaseConfig, LogFormat, LoggingConfig, MetricsConfig, ServerConfig,
    StorageConfig,
};
