//! # gatehouse-database
//!
//! Storage for Gatehouse entities. Each aggregate is reached through a
//! repository trait in [`repositories`]; two implementations exist:
//!
//! - [`MemoryStore`]: every table behind one `tokio::sync::RwLock`, used by
//!   tests and the `memory` backend.
//! - [`repositories::postgres`]: sqlx repositories over a [`DatabasePool`].

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::memory::MemoryStore;
pub use repositories::{
    AssignmentRepository, MenuRepository, RoleRepository, SessionRepository, UserRepository,
};
