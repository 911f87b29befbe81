//! Permission grant value types.

pub mod snapshot;

pub use snapshot::{GrantSnapshot, RoleGrant, RolePermissions, dedup};
