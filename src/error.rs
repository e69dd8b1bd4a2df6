//! Error types for dayplan.

use thiserror::Error;

use crate::models::{GroupId, TaskId};

/// Everything a store operation or a command can fail with.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Task group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Nothing matches '{0}'")]
    NoMatch(String),

    #[error("'{0}' matches more than one entry; use a longer id")]
    Ambiguous(String),

    #[error("Invalid color '{0}'. Use a palette name (blue, green, ...) or #RRGGBB.")]
    InvalidColor(String),

    #[error("Invalid date '{0}'. Use YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid value '{0}'")]
    InvalidValue(String),

    #[error("Unsupported storage version {0}")]
    UnsupportedVersion(u32),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
