//! Signed claims tokens: minting and two-phase verification.
//!
//! Tokens are compact JWS strings (`header.payload.signature`, each
//! segment base64url without padding) signed with [`PINNED_ALGORITHM`].
//! Access and refresh tokens share the format and differ only in the
//! validity window of the [`TokenEngine`] that minted them.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Header, Validation};
use serde::{Deserialize, Serialize};
use tollgate_core::models::user::{User, UserId};
use tracing::debug;

use crate::error::{AuthError, TokenRejection};
use crate::keys::{PINNED_ALGORITHM, SigningKeys};

/// Claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiration (Unix timestamp, seconds).
    pub exp: i64,
    pub user_id: UserId,
    pub username: String,
    /// Role id of the user at mint time.
    pub role: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Claims {
    fn for_user(user: &User, exp: i64) -> Self {
        Self {
            exp,
            user_id: user.id,
            username: user.username.clone(),
            role: user.role_id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Mints and verifies tokens with a validity window fixed at
/// construction.
///
/// Holds only immutable state, so a single engine can be shared across
/// any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct TokenEngine {
    kind: TokenKind,
    keys: Arc<SigningKeys>,
    validity: Duration,
}

impl TokenEngine {
    /// Build an engine. The validity window must be positive so every
    /// minted token expires strictly after its mint time.
    pub fn new(
        kind: TokenKind,
        keys: Arc<SigningKeys>,
        validity: Duration,
    ) -> Result<Self, AuthError> {
        if validity <= Duration::zero() {
            return Err(AuthError::InvalidConfig(format!(
                "{kind} token validity must be positive, got {}s",
                validity.num_seconds()
            )));
        }
        Ok(Self {
            kind,
            keys,
            validity,
        })
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Mint a token for `user` expiring one validity window from now.
    pub fn generate(&self, user: &User) -> Result<String, AuthError> {
        self.generate_at(user, Utc::now())
    }

    /// Mint a token as if the current time were `now`.
    pub fn generate_at(&self, user: &User, now: DateTime<Utc>) -> Result<String, AuthError> {
        let exp = (now + self.validity).timestamp();
        let claims = Claims::for_user(user, exp);

        jsonwebtoken::encode(&Header::new(PINNED_ALGORITHM), &claims, self.keys.encoding())
            .map_err(|e| AuthError::Crypto(format!("{} token encode: {e}", self.kind)))
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// Phase one checks the three-segment structure and the raw
    /// signature over `header.payload`. Phase two decodes the header and
    /// claims, refuses any header algorithm other than the pinned one,
    /// and checks expiry. A token is valid while `now < exp`.
    ///
    /// `exp` is a whole Unix second: minting truncates the sub-second
    /// part of the mint time, so a token lives between `W - 1s` and `W`
    /// depending on where in its second it was minted.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        self.check_signature(token).inspect_err(|e| self.log_rejection(e))?;
        self.decode_claims(token, now)
            .inspect_err(|e| self.log_rejection(e))
    }

    fn check_signature(&self, token: &str) -> Result<(), AuthError> {
        let (message, signature) = split_signed(token)?;

        let valid = jsonwebtoken::crypto::verify(
            signature,
            message.as_bytes(),
            self.keys.decoding(),
            PINNED_ALGORITHM,
        )
        .map_err(|_| AuthError::InvalidToken(TokenRejection::Malformed))?;

        if !valid {
            return Err(AuthError::InvalidToken(TokenRejection::BadSignature));
        }
        Ok(())
    }

    fn decode_claims(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|_| AuthError::InvalidToken(TokenRejection::Malformed))?;
        if header.alg != PINNED_ALGORITHM {
            return Err(AuthError::InvalidToken(TokenRejection::AlgorithmMismatch));
        }

        // Expiry is checked below against `now` with no leeway.
        let mut validation = Validation::new(PINNED_ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = jsonwebtoken::decode::<Claims>(token, self.keys.decoding(), &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(classify(e.kind())))?;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::InvalidToken(TokenRejection::Expired));
        }
        Ok(claims)
    }

    fn log_rejection(&self, err: &AuthError) {
        if let AuthError::InvalidToken(reason) = err {
            debug!(kind = %self.kind, %reason, "Token rejected");
        }
    }
}

/// Split `header.payload.signature` into the signed message and the
/// signature segment. Exactly three non-empty segments are accepted.
fn split_signed(token: &str) -> Result<(&str, &str), AuthError> {
    let malformed = || AuthError::InvalidToken(TokenRejection::Malformed);

    let (message, signature) = token.rsplit_once('.').ok_or_else(malformed)?;
    let (header, payload) = message.split_once('.').ok_or_else(malformed)?;
    if header.is_empty() || payload.is_empty() || signature.is_empty() || payload.contains('.') {
        return Err(malformed());
    }
    Ok((message, signature))
}

fn classify(kind: &ErrorKind) -> TokenRejection {
    match kind {
        ErrorKind::InvalidSignature => TokenRejection::BadSignature,
        ErrorKind::InvalidAlgorithm => TokenRejection::AlgorithmMismatch,
        ErrorKind::ExpiredSignature => TokenRejection::Expired,
        ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => TokenRejection::InvalidClaims,
        _ => TokenRejection::Malformed,
    }
}
