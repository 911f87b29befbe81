//! Domain events emitted by Gatehouse write operations.
//!
//! Events are delivered synchronously, after commit, to the
//! [`PermissionInvalidator`](crate::traits::PermissionInvalidator).

pub mod access;

pub use access::AccessEvent;
