//! Authentication error types.

use std::fmt;

use thiserror::Error;
use tollgate_core::error::TollgateError;

/// Caller-facing message for any failed login.
pub const INCORRECT_CREDENTIALS: &str = "incorrect username/password";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("incorrect username/password")]
    InvalidCredentials,

    /// Every token failure renders identically; the rejection reason is
    /// kept for logs and tests only.
    #[error("invalid token")]
    InvalidToken(TokenRejection),

    #[error("{0}")]
    PermissionDenied(&'static str),

    #[error("cryptography error: {0}")]
    Crypto(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Why a token was refused by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// Not three dot-separated base64url segments, or an unreadable header.
    Malformed,
    /// Signature does not verify against the public key.
    BadSignature,
    /// Header declares an algorithm other than the pinned one.
    AlgorithmMismatch,
    Expired,
    /// Payload does not decode into claims.
    InvalidClaims,
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenRejection::Malformed => "malformed",
            TokenRejection::BadSignature => "bad signature",
            TokenRejection::AlgorithmMismatch => "algorithm mismatch",
            TokenRejection::Expired => "expired",
            TokenRejection::InvalidClaims => "invalid claims",
        };
        f.write_str(s)
    }
}

impl From<AuthError> for TollgateError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => TollgateError::Unauthenticated {
                reason: err.to_string(),
            },
            AuthError::InvalidToken(_) => TollgateError::Unauthenticated {
                reason: "token not valid".into(),
            },
            AuthError::PermissionDenied(reason) => TollgateError::PermissionDenied {
                reason: reason.into(),
            },
            AuthError::Crypto(msg) => TollgateError::Crypto(msg),
            AuthError::InvalidConfig(message) => TollgateError::InvalidArgument { message },
        }
    }
}
