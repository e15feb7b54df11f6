//! Domain models for Tollgate.

pub mod user;
