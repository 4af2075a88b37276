//! Nesting depth of lists and block quotes.
//!
//! Depth is derived purely from the ancestor chain: the number of strict
//! ancestors that match a kind predicate. A root-level list has depth 0, a
//! list nested inside one other list has depth 1.

use crate::tree::{DocumentTree, NodeId, NodeKind};

/// Count strict ancestors of `node` whose kind matches `predicate`.
pub fn depth_of(tree: &DocumentTree, node: NodeId, predicate: impl Fn(&NodeKind) -> bool) -> usize {
    tree.ancestors(node)
        .filter(|&ancestor| predicate(tree.kind(ancestor)))
        .count()
}

/// True when any strict ancestor of `node` matches `predicate`.
pub fn is_contained_in(
    tree: &DocumentTree,
    node: NodeId,
    predicate: impl Fn(&NodeKind) -> bool,
) -> bool {
    tree.ancestors(node)
        .any(|ancestor| predicate(tree.kind(ancestor)))
}

/// Depth of a list item, counted in enclosing lists beyond its own.
///
/// Only list containers count; block quotes or paragraphs between them do not.
pub fn list_item_depth(tree: &DocumentTree, item: NodeId) -> usize {
    match tree.parent(item) {
        Some(list) => depth_of(tree, list, NodeKind::is_list),
        None => 0,
    }
}

/// Depth of a block quote, counted in enclosing block quotes.
pub fn quote_depth(tree: &DocumentTree, quote: NodeId) -> usize {
    depth_of(tree, quote, NodeKind::is_block_quote)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(tree: &DocumentTree) -> Vec<NodeId> {
        tree.descendants(tree.root())
            .filter(|&id| matches!(tree.kind(id), NodeKind::ListItem))
            .collect()
    }

    #[test]
    fn test_root_level_item_is_zero() {
        let tree = DocumentTree::parse("- a\n- b\n");
        for item in items(&tree) {
            assert_eq!(list_item_depth(&tree, item), 0);
        }
    }

    #[test]
    fn test_nested_item_is_one() {
        let tree = DocumentTree::parse("- a\n  - b\n    - c\n");
        let depths: Vec<_> = items(&tree)
            .into_iter()
            .map(|item| list_item_depth(&tree, item))
            .collect();
        assert_eq!(depths, vec![0, 1, 2]);
    }

    #[test]
    fn test_quote_does_not_add_list_depth() {
        let tree = DocumentTree::parse("> - a\n");
        let item = items(&tree)[0];
        assert_eq!(list_item_depth(&tree, item), 0);
        assert!(is_contained_in(&tree, item, NodeKind::is_block_quote));
    }

    #[test]
    fn test_nested_quote_depth() {
        let tree = DocumentTree::parse("> outer\n>\n> > inner\n");
        let quotes: Vec<_> = tree
            .descendants(tree.root())
            .filter(|&id| tree.kind(id).is_block_quote())
            .collect();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quote_depth(&tree, quotes[0]), 0);
        assert_eq!(quote_depth(&tree, quotes[1]), 1);
    }

    #[test]
    fn test_root_has_no_depth() {
        let tree = DocumentTree::parse("text");
        assert_eq!(depth_of(&tree, tree.root(), |_| true), 0);
        assert!(!is_contained_in(&tree, tree.root(), |_| true));
    }
}
