//! Menu catalogue and buttons.

pub mod service;

pub use service::MenuService;
