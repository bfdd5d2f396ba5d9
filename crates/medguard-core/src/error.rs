//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MedguardError {
    #[error("STORE/{0}")]
    Store(String),

    #[error("NOT_FOUND/{0}")]
    NotFound(String),

    #[error("DECODE/{0}")]
    Decode(String),

    #[error("TIMEOUT/{0}")]
    Timeout(String),

    #[error("CONFIG/{0}")]
    Config(String),

    #[error("DATASET/{0}")]
    Dataset(String),

    #[error("INTERNAL/{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, MedguardError>;

impl From<serde_json::Error> for MedguardError {
    fn from(err: serde_json::Error) -> Self {
        MedguardError::Dataset(err.to_string())
    }
}

impl From<serde_yaml::Error> for MedguardError {
    fn from(err: serde_yaml::Error) -> Self {
        MedguardError::Config(err.to_string())
    }
}
