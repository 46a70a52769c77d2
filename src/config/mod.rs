//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, GraphConfig, IngestionConfig, LogFormat, LoggingConfig, ProvidersConfig,
    RetrievalKnobs, ServerConfig,
};
