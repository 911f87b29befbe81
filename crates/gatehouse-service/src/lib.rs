//! # gatehouse-service
//!
//! Business logic service layer for Gatehouse. Each service orchestrates
//! repositories, the password and session machinery from `gatehouse-auth`,
//! and the permission cache to implement one area of the system.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references. The acting identity is
//! always an explicit parameter; no service looks up a request context.
//!
//! [`ServiceRegistry`] wires every service from an [`AppConfig`].
//!
//! [`AppConfig`]: gatehouse_core::config::AppConfig

pub mod assignment;
pub mod menu;
pub mod permission;
pub mod registry;
pub mod role;
pub mod user;

#[cfg(test)]
mod testing;

pub use assignment::AssignmentService;
pub use menu::MenuService;
pub use permission::{PermissionCache, PermissionResolver};
pub use registry::{Repositories, ServiceRegistry};
pub use role::RoleService;
pub use user::UserDirectory;
