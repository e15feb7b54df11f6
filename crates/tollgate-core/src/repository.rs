//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations report a
//! missing record as [`TollgateError::NotFound`], a duplicate username
//! as [`TollgateError::AlreadyExists`] and a field the store refuses as
//! [`TollgateError::InvalidArgument`].
//!
//! [`TollgateError::NotFound`]: crate::error::TollgateError::NotFound
//! [`TollgateError::AlreadyExists`]: crate::error::TollgateError::AlreadyExists
//! [`TollgateError::InvalidArgument`]: crate::error::TollgateError::InvalidArgument

use crate::error::TollgateResult;
use crate::models::user::{CreateUser, UpdateUser, User, UserId};

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = TollgateResult<User>> + Send;
    fn get_by_id(&self, id: UserId) -> impl Future<Output = TollgateResult<User>> + Send;
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = TollgateResult<User>> + Send;
    fn update(
        &self,
        id: UserId,
        input: UpdateUser,
    ) -> impl Future<Output = TollgateResult<User>> + Send;
    /// Hard delete. Tokens minted for the user stay valid until expiry,
    /// but nothing can be refreshed for a deleted account.
    fn delete(&self, id: UserId) -> impl Future<Output = TollgateResult<()>> + Send;
}
