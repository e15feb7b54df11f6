//! Error types for the Tollgate system.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TollgateError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    Unauthenticated { reason: String },

    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type TollgateResult<T> = Result<T, TollgateError>;

/// Transport-neutral status tag for a [`TollgateError`].
///
/// Whatever carries requests to the service maps these onto its own
/// status mechanism (gRPC codes, HTTP statuses, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotFound,
    PermissionDenied,
    InvalidArgument,
    AlreadyExists,
    Unauthenticated,
    Unknown,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TollgateError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TollgateError::NotFound { .. } => ErrorCode::NotFound,
            TollgateError::AlreadyExists { .. } => ErrorCode::AlreadyExists,
            TollgateError::Unauthenticated { .. } => ErrorCode::Unauthenticated,
            TollgateError::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            TollgateError::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            TollgateError::Database(_) | TollgateError::Crypto(_) | TollgateError::Unknown(_) => {
                ErrorCode::Unknown
            }
        }
    }

    /// Message safe to hand back to a caller.
    ///
    /// Store driver errors, crypto failures and `Unknown` are reduced to a
    /// generic string; the full `Display` output is for logs only.
    pub fn public_message(&self) -> String {
        match self {
            TollgateError::NotFound { entity, .. } => format!("{entity} not found"),
            TollgateError::AlreadyExists { entity } => format!("this {entity} is already registered"),
            TollgateError::Unauthenticated { reason } => reason.clone(),
            TollgateError::PermissionDenied { reason } => format!("permission denied: {reason}"),
            TollgateError::InvalidArgument { message } => message.clone(),
            TollgateError::Database(_) | TollgateError::Crypto(_) | TollgateError::Unknown(_) => {
                "internal error".into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_failures_share_unknown_code() {
        assert_eq!(TollgateError::Database("x".into()).code(), ErrorCode::Unknown);
        assert_eq!(TollgateError::Crypto("x".into()).code(), ErrorCode::Unknown);
        assert_eq!(TollgateError::Unknown("x".into()).code(), ErrorCode::Unknown);
    }

    #[test]
    fn store_details_stay_out_of_public_message() {
        let err = TollgateError::Database("connection reset by 10.0.0.3:8000".into());
        assert_eq!(err.public_message(), "internal error");
        assert!(err.to_string().contains("10.0.0.3"));
    }

    #[test]
    fn not_found_hides_lookup_key() {
        let err = TollgateError::NotFound {
            entity: "user".into(),
            id: "42".into(),
        };
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.public_message(), "user not found");
    }
}
