//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AssetsConfig, AuthConfig, BlobStoreSettings, DocumentStoreSettings, LogFormat,
    LoggingConfig,
};
