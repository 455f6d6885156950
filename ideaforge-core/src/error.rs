use thiserror::Error;

use crate::db::DbError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// Input is well-formed but violates a pipeline rule.
    #[error("{0}")]
    BusinessRule(String),

    #[error("Persistence error: {0}")]
    Persistence(#[source] DbError),
}

impl CoreError {
    pub fn not_found(resource: &str) -> Self {
        Self::NotFound(resource.to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(what) => Self::NotFound(what),
            DbError::Conflict(what) => Self::Conflict(what),
            other => Self::Persistence(other),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
