//! Tollgate Core: domain models, error taxonomy and repository traits
//! shared by every Tollgate crate.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{ErrorCode, TollgateError, TollgateResult};
