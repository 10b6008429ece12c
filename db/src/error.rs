use sea_orm::{DbErr, SqlErr};

/// Failures raised by model-level operations on top of plain database errors.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    Db(#[from] DbErr),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Conflict(String),
}

/// True when `err` comes from a UNIQUE index rejecting a write.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

impl ModelError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ModelError::Invalid(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ModelError::Conflict(msg.into())
    }
}
