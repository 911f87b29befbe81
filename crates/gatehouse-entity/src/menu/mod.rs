//! Menu, button, and menu-tree entities.

pub mod button;
pub mod model;
pub mod tree;

pub use button::{Button, NewButton};
pub use model::{Menu, NewMenu, UpdateMenu};
pub use tree::MenuNode;
