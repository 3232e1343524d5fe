//! Configuration management: defaults, validation, loading from file + environment.

pub mod app_config;
pub mod defaults;
pub mod validation;

pub use app_config::AppConfig;

use serde::Serialize;

/// A setting as reported by the `settings` command.
#[derive(Debug, Clone, Serialize)]
pub struct SettingInfo {
    pub key: String,
    pub value: String,
    pub default: String,
    pub description: String,
    pub overridden: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown setting key: {0}")]
    UnknownKey(String),
    #[error("validation error for {key}: {message}")]
    Invalid { key: String, message: String },
    #[error("barcode box {width}x{height} does not fit a {canvas}px canvas")]
    BoxTooLarge { width: u32, height: u32, canvas: u32 },
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file {path} is not a JSON object: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
