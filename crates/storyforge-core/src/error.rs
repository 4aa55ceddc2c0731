use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("authentication failed: {0}")]
    AuthFailure(String),

    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error("validation failure: {0}")]
    ValidationFailure(String),

    #[error("assistant unavailable: {0}")]
    AssistantUnavailable(String),

    #[error("generation failed: {0}")]
    GenerationFailure(String),

    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
