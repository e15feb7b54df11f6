//! Tollgate Auth: signing keys, token minting/verification, password
//! hashing, and the authentication service built on top of them.

pub mod config;
pub mod error;
pub mod keys;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::{AuthError, TokenRejection};
pub use keys::SigningKeys;
pub use service::{AuthService, Caller, Credentials, PairToken};
pub use token::{Claims, TokenEngine, TokenKind};
