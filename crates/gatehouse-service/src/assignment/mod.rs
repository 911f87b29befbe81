//! User to role assignment.

pub mod service;

pub use service::AssignmentService;
