use thiserror::Error;

use crate::direction::Direction;
use crate::loader::LoadStage;

#[derive(Error, Debug)]
pub enum BilingualError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown translation direction: {0} (expected ar-en or en-ar)")]
    UnknownDirection(String),

    #[error("Failed to load {direction} pipeline during {stage}: {message}")]
    PipelineLoad {
        direction: Direction,
        stage: LoadStage,
        message: String,
    },

    #[error("Reference data error: {0}")]
    Data(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Translation error: {0}")]
    Translation(String),
}

pub type Result<T> = std::result::Result<T, BilingualError>;
