//! Role definitions and their menu/button grants.

pub mod service;

pub use service::RoleService;
