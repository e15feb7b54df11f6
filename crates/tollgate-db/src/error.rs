//! Database-specific error types and conversions.

use tollgate_core::error::TollgateError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// A statement failed at request time for a reason not classified below.
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Duplicate {entity}: {detail}")]
    Duplicate { entity: String, detail: String },

    /// A value the schema refused (type mismatch or failed ASSERT).
    #[error("Rejected field value: {0}")]
    Rejected(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl DbError {
    /// Classify a failed statement by the message SurrealDB attaches to it.
    pub(crate) fn from_statement(entity: &str, message: String) -> Self {
        if message.contains("already contains") {
            DbError::Duplicate {
                entity: entity.into(),
                detail: message,
            }
        } else if message.contains("for field")
            || message.contains("must conform")
            || message.contains("coerce")
        {
            DbError::Rejected(message)
        } else {
            DbError::Query(message)
        }
    }
}

impl From<DbError> for TollgateError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => TollgateError::NotFound { entity, id },
            DbError::Duplicate { entity, .. } => TollgateError::AlreadyExists { entity },
            DbError::Rejected(message) => TollgateError::InvalidArgument {
                message: format!("invalid data has been entered: {message}"),
            },
            other => TollgateError::Database(other.to_string()),
        }
    }
}
