//! Menu tree structures for navigation display.

use serde::{Deserialize, Serialize};

use gatehouse_core::types::MenuId;

use super::model::Menu;

/// A node in a resolved menu tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    /// Menu ID.
    pub id: MenuId,
    /// Parent as stored; may point outside the resolved tree for promoted roots.
    pub parent_id: Option<MenuId>,
    /// Display name.
    pub name: String,
    /// Route path.
    pub path: String,
    /// Icon identifier.
    pub icon: Option<String>,
    /// Display order among siblings.
    pub sort_order: i32,
    /// Child nodes, ordered by `(sort_order, id)`.
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    /// Create a leaf node from a menu.
    pub fn leaf(menu: &Menu) -> Self {
        Self {
            id: menu.id,
            parent_id: menu.parent_id,
            name: menu.name.clone(),
            path: menu.path.clone(),
            icon: menu.icon.clone(),
            sort_order: menu.sort_order,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(MenuNode::len).sum::<usize>()
    }

    /// Menu IDs of this subtree in depth-first pre-order.
    pub fn ids(&self) -> Vec<MenuId> {
        let mut out = vec![self.id];
        for child in &self.children {
            out.extend(child.ids());
        }
        out
    }
}
