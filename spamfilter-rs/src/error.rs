use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("no such '{namespace}' with id '{key}'")]
    NotFound { namespace: String, key: String },

    #[error("already have a(n) '{namespace}' with id '{key}'")]
    AlreadyExists { namespace: String, key: String },

    #[error("data corruption: {0}")]
    DataCorruption(String),

    #[error("unknown category: {0}")]
    InvalidCategory(String),

    #[error("unreachable state: {0}")]
    UnreachableState(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FilterError {
    /// True for a lookup miss on a store key.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FilterError::NotFound { .. })
    }

    /// True for an attempted `create` on an existing key.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, FilterError::AlreadyExists { .. })
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
