//! SurrealDB implementation of [`UserRepository`].
//!
//! Records live at `user:<n>` with a numeric id. The repository only
//! stores what it is given: password hashing happens in the auth layer.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tollgate_core::error::TollgateResult;
use tollgate_core::models::user::{CreateUser, UpdateUser, User, UserId};
use tollgate_core::repository::UserRepository;
use tracing::debug;

use crate::error::DbError;

const ENTITY: &str = "user";

/// Row for queries where the id is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    username: String,
    password_hash: String,
    role_id: i64,
    first_name: String,
    last_name: String,
    email: String,
    is_admin: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Row that also carries the numeric record id via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: i64,
    username: String,
    password_hash: String,
    role_id: i64,
    first_name: String,
    last_name: String,
    email: String,
    is_admin: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CounterRow {
    value: i64,
}

impl UserRow {
    fn into_user(self, id: UserId) -> Result<User, DbError> {
        let role_id = u64::try_from(self.role_id)
            .map_err(|_| DbError::Corrupt(format!("user:{id} has negative role_id")))?;
        Ok(User {
            id,
            username: self.username,
            password_hash: self.password_hash,
            role_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            is_admin: self.is_admin,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserRowWithId {
    fn into_user(self) -> Result<User, DbError> {
        let id = u64::try_from(self.record_id)
            .map_err(|_| DbError::Corrupt(format!("negative user id {}", self.record_id)))?;
        UserRow {
            username: self.username,
            password_hash: self.password_hash,
            role_id: self.role_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            is_admin: self.is_admin,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_user(id)
    }
}

fn db_int(field: &str, value: u64) -> Result<i64, DbError> {
    i64::try_from(value).map_err(|_| DbError::Rejected(format!("{field} {value} out of range")))
}

/// Record key for a user id. Ids past `i64::MAX` cannot be stored, so
/// they can only ever be missing.
fn record_key(id: UserId) -> Result<i64, DbError> {
    i64::try_from(id).map_err(|_| not_found(id.to_string()))
}

fn not_found(id: impl Into<String>) -> DbError {
    DbError::NotFound {
        entity: ENTITY.into(),
        id: id.into(),
    }
}

/// SurrealDB implementation of the user store.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE username = $username",
            )
            .bind(("username", username.to_string()))
            .await?;

        let rows: Vec<UserRowWithId> = result.take(0)?;
        rows.into_iter().next().map(UserRowWithId::into_user).transpose()
    }

    async fn next_id(&self) -> Result<i64, DbError> {
        let result = self
            .db
            .query("UPSERT counter:user SET value += 1 RETURN AFTER")
            .await?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(format!("user id counter: {e}")))?;

        let rows: Vec<CounterRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(|r| r.value)
            .ok_or_else(|| DbError::Query("user id counter returned nothing".into()))
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> TollgateResult<User> {
        if self.find_by_username(&input.username).await?.is_some() {
            return Err(DbError::Duplicate {
                entity: ENTITY.into(),
                detail: format!("username={}", input.username),
            }
            .into());
        }

        let role_id = db_int("role_id", input.role_id)?;
        let id = self.next_id().await?;

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 username = $username, \
                 password_hash = $password_hash, \
                 role_id = $role_id, \
                 first_name = $first_name, \
                 last_name = $last_name, \
                 email = $email, \
                 is_admin = $is_admin, \
                 is_active = $is_active",
            )
            .bind(("id", id))
            .bind(("username", input.username))
            .bind(("password_hash", input.password_hash))
            .bind(("role_id", role_id))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("email", input.email))
            .bind(("is_admin", input.is_admin))
            .bind(("is_active", input.is_active))
            .await
            .map_err(DbError::from)?;

        // A concurrent insert of the same username trips the unique index here.
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found(id.to_string()))?;

        let user = row.into_user(id as UserId)?;
        debug!(user_id = user.id, "User record created");
        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> TollgateResult<User> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", record_key(id)?))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found(id.to_string()))?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_username(&self, username: &str) -> TollgateResult<User> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| not_found(format!("username={username}")).into())
    }

    async fn update(&self, id: UserId, input: UpdateUser) -> TollgateResult<User> {
        let mut sets = Vec::new();
        if input.role_id.is_some() {
            sets.push("role_id = $role_id");
        }
        if input.first_name.is_some() {
            sets.push("first_name = $first_name");
        }
        if input.last_name.is_some() {
            sets.push("last_name = $last_name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.is_admin.is_some() {
            sets.push("is_admin = $is_admin");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", record_key(id)?));

        if let Some(role_id) = input.role_id {
            builder = builder.bind(("role_id", db_int("role_id", role_id)?));
        }
        if let Some(first_name) = input.first_name {
            builder = builder.bind(("first_name", first_name));
        }
        if let Some(last_name) = input.last_name {
            builder = builder.bind(("last_name", last_name));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(is_admin) = input.is_admin {
            builder = builder.bind(("is_admin", is_admin));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found(id.to_string()))?;

        Ok(row.into_user(id)?)
    }

    async fn delete(&self, id: UserId) -> TollgateResult<()> {
        let mut result = self
            .db
            .query("DELETE type::record('user', $id) RETURN BEFORE")
            .bind(("id", record_key(id)?))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(not_found(id.to_string()).into());
        }
        Ok(())
    }
}
