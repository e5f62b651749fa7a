use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod text;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use text::{slugify_tag, truncate_chars};
pub use types::{
    merge_tags, EnrichmentConfig, EnrichmentResult, FailureKind, ItemFailure, ItemStatus,
    ProcessingRun, MARKER_TAG,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
