use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum StanzaError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] Arc<serde_json::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Parsing Error in {0}: {1}")]
    ParseError(&'static str, String),

    #[error("Version error: {0}")]
    VersionError(String),

    #[error("invalid depends_on key: '{0}'")]
    InvalidKey(String),

    #[error("Only a single 'depends_on macos' is allowed.")]
    DuplicateConstraint,

    #[error("invalid 'depends_on macos' value: {0}")]
    InvalidVersionValue(String),

    #[error("invalid 'depends_on arch' values: {0:?}")]
    InvalidArchToken(Vec<String>),

    #[error("Unknown OS: {0}")]
    InvalidOsValue(String),

    #[error("New arch must be arm or intel, got: {0}")]
    InvalidArchValue(String),

    #[error("At least one of `os` or `arch` must be specified.")]
    InvalidScopeRequest,

    #[error("Invalid tag: {0}")]
    InvalidTag(String),
}

impl From<std::io::Error> for StanzaError {
    fn from(err: std::io::Error) -> Self {
        StanzaError::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for StanzaError {
    fn from(err: serde_json::Error) -> Self {
        StanzaError::Json(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, StanzaError>;
