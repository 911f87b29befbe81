//! Session lifecycle: login, logout, resolution, and purge.

pub mod cleanup;
pub mod manager;

pub use cleanup::SessionCleanup;
pub use manager::{LoginResult, SessionManager};
