#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Model inference failed: {0}")]
    ModelInference(String),
    #[error("Model artifact error: {0}")]
    ModelArtifact(String),
    #[error("Training error: {0}")]
    Training(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DetectorError>;
