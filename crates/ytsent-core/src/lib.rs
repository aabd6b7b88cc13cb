//! Shared configuration and domain types for the comment sentiment service.

mod app_config;
mod comment;
mod config;
mod link;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use comment::Comment;
pub use config::{load_app_config, load_app_config_from_env};
pub use link::{extract_video_id, VideoId};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
