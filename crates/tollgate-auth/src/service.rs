//! Authentication service: login, signup, refresh and admin lookup.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tollgate_core::error::{TollgateError, TollgateResult};
use tollgate_core::models::user::{CreateUser, NewUserRequest, User, UserId, UserProfile};
use tollgate_core::repository::UserRepository;
use tracing::{debug, error, info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::keys::SigningKeys;
use crate::password;
use crate::token::{TokenEngine, TokenKind};

/// Username and plaintext password for a single login attempt.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Access and refresh token minted from the same user record at the
/// same instant.
#[derive(Debug, Clone, Serialize)]
pub struct PairToken {
    pub access: String,
    pub refresh: String,
}

/// Authenticated identity of whoever is invoking an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub username: String,
    pub is_admin: bool,
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    access: TokenEngine,
    refresh: TokenEngine,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    /// Fails if either token lifetime is zero.
    pub fn new(
        user_repo: U,
        keys: Arc<SigningKeys>,
        config: AuthConfig,
    ) -> Result<Self, AuthError> {
        let access = TokenEngine::new(
            TokenKind::Access,
            Arc::clone(&keys),
            config.access_token_lifetime(),
        )?;
        let refresh =
            TokenEngine::new(TokenKind::Refresh, keys, config.refresh_token_lifetime())?;
        Ok(Self {
            user_repo,
            access,
            refresh,
            config,
        })
    }

    pub fn access_engine(&self) -> &TokenEngine {
        &self.access
    }

    pub fn refresh_engine(&self) -> &TokenEngine {
        &self.refresh
    }

    /// Check a username/password pair and issue an access + refresh
    /// token pair.
    ///
    /// An unknown username and a wrong password produce the same error.
    pub async fn login(&self, credentials: Credentials) -> TollgateResult<PairToken> {
        let user = match self.user_repo.get_by_username(&credentials.username).await {
            Ok(u) => u,
            Err(TollgateError::NotFound { .. }) => {
                warn!(username = %credentials.username, "Login rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        // A corrupt stored hash must not look different from a wrong password.
        let valid = match password::verify_password(
            &credentials.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        ) {
            Ok(valid) => valid,
            Err(e) => {
                error!(user_id = user.id, error = %e, "Stored password hash unusable");
                false
            }
        };

        if !valid || (self.config.reject_inactive && !user.is_active) {
            warn!(username = %credentials.username, "Login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        let now = Utc::now();
        let pair = PairToken {
            access: self.access.generate_at(&user, now)?,
            refresh: self.refresh.generate_at(&user, now)?,
        };

        info!(user_id = user.id, "Login succeeded");
        Ok(pair)
    }

    /// Create a user. Only an administrator may call this.
    pub async fn signup(
        &self,
        caller: Option<&Caller>,
        request: NewUserRequest,
    ) -> TollgateResult<UserProfile> {
        let caller = require_admin(caller, "only admin can create users")?;
        request.validate()?;

        let password_hash =
            password::hash_password(&request.password, self.config.pepper.as_deref())?;

        let user = self
            .user_repo
            .create(CreateUser {
                username: request.username,
                password_hash,
                role_id: request.role_id,
                first_name: request.first_name,
                last_name: request.last_name,
                email: request.email,
                is_admin: request.is_admin,
                is_active: true,
            })
            .await
            .map_err(|e| match e {
                TollgateError::InvalidArgument { .. } | TollgateError::AlreadyExists { .. } => e,
                other => {
                    error!(error = %other, "User store rejected signup");
                    TollgateError::Unknown(other.to_string())
                }
            })?;

        info!(user_id = user.id, created_by = caller.user_id, "User created");
        Ok(user.into())
    }

    /// Exchange a valid refresh token for a new access token.
    ///
    /// The user is re-read by the username in the claims, so the new
    /// token reflects the current record and a deleted account gets
    /// `NotFound`.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> TollgateResult<String> {
        let claims = self.refresh.verify(refresh_token)?;
        let user = self.user_repo.get_by_username(&claims.username).await?;

        if self.config.reject_inactive && !user.is_active {
            return Err(TollgateError::Unauthenticated {
                reason: "account is inactive".into(),
            });
        }

        debug!(user_id = user.id, "Access token refreshed");
        Ok(self.access.generate(&user)?)
    }

    /// Fetch profiles for `ids`, in request order. Admin only.
    ///
    /// Any unknown id fails the whole call.
    pub async fn get_user_info(
        &self,
        caller: Option<&Caller>,
        ids: &[UserId],
    ) -> TollgateResult<Vec<UserProfile>> {
        require_admin(caller, "only admin can see user's list")?;

        let mut users = Vec::with_capacity(ids.len());
        for &id in ids {
            let user = self.user_repo.get_by_id(id).await?;
            users.push(UserProfile::from(user));
        }
        Ok(users)
    }

    /// Turn a bearer access token into a [`Caller`].
    ///
    /// The admin flag comes from the stored record, not from the token.
    pub async fn authenticate(&self, access_token: &str) -> TollgateResult<Caller> {
        let claims = self.access.verify(access_token)?;
        let user = match self.user_repo.get_by_username(&claims.username).await {
            Ok(u) => u,
            Err(TollgateError::NotFound { .. }) => {
                return Err(TollgateError::Unauthenticated {
                    reason: "token not valid".into(),
                });
            }
            Err(e) => return Err(e),
        };

        if self.config.reject_inactive && !user.is_active {
            return Err(TollgateError::Unauthenticated {
                reason: "account is inactive".into(),
            });
        }

        Ok(Caller::from(&user))
    }
}

fn require_admin<'a>(
    caller: Option<&'a Caller>,
    reason: &'static str,
) -> Result<&'a Caller, AuthError> {
    match caller {
        Some(c) if c.is_admin => Ok(c),
        Some(c) => {
            warn!(user_id = c.user_id, "Admin operation denied");
            Err(AuthError::PermissionDenied(reason))
        }
        None => {
            warn!("Admin operation denied: no caller identity");
            Err(AuthError::PermissionDenied(reason))
        }
    }
}
