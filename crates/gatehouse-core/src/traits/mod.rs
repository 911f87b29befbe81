//! Core traits defined in `gatehouse-core` and implemented by other crates.

pub mod cache;
pub mod invalidation;

pub use cache::CacheProvider;
pub use invalidation::{NoopInvalidator, PermissionInvalidator};
