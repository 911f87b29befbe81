//! Builds the visible menu tree from a flat set of granted menus.

use std::collections::{BTreeMap, HashMap, HashSet};

use gatehouse_core::types::MenuId;
use gatehouse_entity::menu::{Menu, MenuNode};

/// Build an ordered forest from `menus`.
///
/// Duplicate ids collapse. A menu whose parent is not in the set becomes a
/// root. Siblings are ordered by `(sort_order, id)`. Menus whose parent
/// chain loops are not dropped: the smallest id on each loop is promoted to
/// a root and the loop is cut above it.
pub fn build_menu_tree(menus: impl IntoIterator<Item = Menu>) -> Vec<MenuNode> {
    let by_id: BTreeMap<MenuId, Menu> = menus.into_iter().map(|m| (m.id, m)).collect();

    let mut children: HashMap<MenuId, Vec<MenuId>> = HashMap::new();
    let mut roots = Vec::new();
    for menu in by_id.values() {
        match parent_in_set(&by_id, menu) {
            Some(parent) => children.entry(parent).or_default().push(menu.id),
            None => roots.push(menu.id),
        }
    }

    let mut visited = HashSet::with_capacity(by_id.len());
    let mut forest: Vec<MenuNode> = roots
        .iter()
        .filter_map(|id| build_node(*id, &by_id, &children, &mut visited))
        .collect();

    // Whatever is still unvisited hangs off a parent loop.
    for id in by_id.keys() {
        if visited.contains(id) {
            continue;
        }
        let entry = loop_entry(*id, &by_id);
        if let Some(node) = build_node(entry, &by_id, &children, &mut visited) {
            forest.push(node);
        }
    }

    sort_nodes(&mut forest);
    forest
}

fn parent_in_set(by_id: &BTreeMap<MenuId, Menu>, menu: &Menu) -> Option<MenuId> {
    menu.parent_id
        .filter(|p| *p != menu.id && by_id.contains_key(p))
}

fn build_node(
    id: MenuId,
    by_id: &BTreeMap<MenuId, Menu>,
    children: &HashMap<MenuId, Vec<MenuId>>,
    visited: &mut HashSet<MenuId>,
) -> Option<MenuNode> {
    if !visited.insert(id) {
        return None;
    }
    let mut node = MenuNode::leaf(by_id.get(&id)?);
    if let Some(kids) = children.get(&id) {
        node.children = kids
            .iter()
            .filter_map(|kid| build_node(*kid, by_id, children, visited))
            .collect();
        sort_nodes(&mut node.children);
    }
    Some(node)
}

/// The smallest id on the parent loop reached from `start`.
fn loop_entry(start: MenuId, by_id: &BTreeMap<MenuId, Menu>) -> MenuId {
    let mut seen = HashSet::new();
    let mut current = start;
    while seen.insert(current) {
        match by_id.get(&current).and_then(|m| parent_in_set(by_id, m)) {
            Some(parent) => current = parent,
            None => return current,
        }
    }

    // `current` is on the loop; walk it once to find its smallest member.
    let mut smallest = current;
    let mut cursor = current;
    while let Some(parent) = by_id.get(&cursor).and_then(|m| parent_in_set(by_id, m)) {
        if parent == current {
            break;
        }
        smallest = smallest.min(parent);
        cursor = parent;
    }
    smallest
}

fn sort_nodes(nodes: &mut [MenuNode]) {
    nodes.sort_by_key(|n| (n.sort_order, n.id));
}
