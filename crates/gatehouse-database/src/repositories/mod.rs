//! Repository interfaces and their implementations.
//!
//! Services depend on the traits only. Every multi-row write runs under one
//! write lock (memory) or one transaction (PostgreSQL), so it either lands
//! completely or not at all.

pub mod assignment;
pub mod memory;
pub mod menu;
pub mod postgres;
pub mod role;
pub mod session;
pub mod user;

pub use assignment::AssignmentRepository;
pub use menu::MenuRepository;
pub use role::RoleRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
