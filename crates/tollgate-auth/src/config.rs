//! Authentication configuration.

/// Configuration for the authentication service.
///
/// Key material is not part of this struct; it is loaded once into
/// [`SigningKeys`](crate::keys::SigningKeys) and injected separately.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Access token lifetime in seconds (default: 900 = 15 minutes).
    pub access_token_lifetime_secs: u64,
    /// Refresh token lifetime in seconds (default: 86_400 = 24 hours).
    pub refresh_token_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id hashing
    /// and verification.
    pub pepper: Option<String>,
    /// Refuse login and refresh for users whose `is_active` flag is
    /// cleared (default: true).
    pub reject_inactive: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime_secs: 900,
            refresh_token_lifetime_secs: 86_400,
            pepper: None,
            reject_inactive: true,
        }
    }
}

impl AuthConfig {
    pub fn access_token_lifetime(&self) -> chrono::Duration {
        lifetime(self.access_token_lifetime_secs)
    }

    pub fn refresh_token_lifetime(&self) -> chrono::Duration {
        lifetime(self.refresh_token_lifetime_secs)
    }
}

// chrono caps durations at i64::MAX milliseconds.
const MAX_LIFETIME_SECS: u64 = i64::MAX as u64 / 1000;

fn lifetime(secs: u64) -> chrono::Duration {
    chrono::Duration::seconds(secs.min(MAX_LIFETIME_SECS) as i64)
}
