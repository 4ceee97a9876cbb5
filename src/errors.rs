use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("CLI_INVALID: {0}")]
    Cli(String),
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("MALFORMED_HEADER: {0}")]
    MalformedHeader(String),
    #[error("SERIALIZE_FAILURE: {0}")]
    Serialize(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<walkdir::Error> for AppError {
    fn from(value: walkdir::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(format!("{:#}", value))
    }
}

pub type AppResult<T> = Result<T, AppError>;
