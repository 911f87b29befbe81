//! # gatehouse-core
//!
//! Core crate for Gatehouse. Contains configuration schemas, typed numeric
//! identifiers, the cache and invalidation traits, access-change events,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other Gatehouse crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
