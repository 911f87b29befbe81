//! Permission resolution: visible menus and enabled buttons per user.

pub mod cache;
pub mod resolver;
pub mod tree;

pub use cache::PermissionCache;
pub use resolver::PermissionResolver;
pub use tree::build_menu_tree;
