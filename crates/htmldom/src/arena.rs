//! Arena-based DOM tree storage
//!
//! Every node lives in one `Vec<DomNode>` and is addressed by a `NodeId`.
//! The child list is the only owning edge; parent and sibling links are
//! indices, so there is no reference cycle to leak and nothing to free
//! twice.
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```
//!
//! Detached nodes stay in the arena until it is dropped. They are simply
//! unreachable from the root.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeData, NodeId};

/// Arena allocator for DOM nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomArena {
    nodes: Vec<DomNode>,

    /// Root node ID (if set)
    root_id: Option<NodeId>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root_id: None,
        }
    }

    /// Add a detached node to the arena, returns its ID
    pub fn add_node(&mut self, mut node: DomNode) -> NodeId {
        node.unlink();
        node.children.clear();
        let node_id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        node_id
    }

    /// Create a detached element with no attributes and no children
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.add_node(DomNode::element(tag))
    }

    /// Create a detached text node
    pub fn create_text_node(&mut self, text: &str) -> NodeId {
        self.add_node(DomNode::text(text))
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    ///
    /// Only the payload should be edited through this; links are maintained
    /// by the mutation methods.
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    pub(crate) fn node(&self, node_id: NodeId) -> Option<&DomNode> {
        self.nodes.get(node_id as usize)
    }

    pub(crate) fn node_mut(&mut self, node_id: NodeId) -> Option<&mut DomNode> {
        self.nodes.get_mut(node_id as usize)
    }

    pub(crate) fn data(&self, node_id: NodeId) -> Option<&NodeData> {
        self.node(node_id).map(|n| &n.data)
    }

    /// Set root node
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    /// Get root node ID
    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Total number of nodes ever allocated, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator over all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| i as NodeId)
    }

    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.node(node_id)?.parent
    }

    pub fn first_child(&self, node_id: NodeId) -> Option<NodeId> {
        self.node(node_id)?.children.first().copied()
    }

    pub fn last_child(&self, node_id: NodeId) -> Option<NodeId> {
        self.node(node_id)?.children.last().copied()
    }

    pub fn next_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        self.node(node_id)?.next_sibling
    }

    pub fn previous_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        self.node(node_id)?.prev_sibling
    }

    /// True if `ancestor` is `node` itself or lies on its parent chain
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Pre-order, depth-first walk over the descendants of `root`.
    ///
    /// `root` itself is not yielded. Follows sibling links, so it needs no
    /// stack and never recurses.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            arena: self,
            root,
            next: self.first_child(root),
        }
    }

    /// Check tree invariants for everything reachable from the root
    pub fn validate(&self) -> Result<()> {
        match self.root_id {
            Some(root) => self.validate_from(root),
            None => Ok(()),
        }
    }

    /// Check tree invariants for the subtree at `start`:
    /// - every child points back at its parent
    /// - sibling links mirror child-list order exactly
    /// - text nodes have no children
    /// - no node is reachable twice
    pub fn validate_from(&self, start: NodeId) -> Result<()> {
        let mut seen = AHashSet::new();
        let mut stack = vec![start];

        while let Some(node_id) = stack.pop() {
            if !seen.insert(node_id) {
                return Err(DomError::CorruptTree {
                    node: node_id,
                    reason: "node reachable from more than one parent",
                });
            }

            let node = self.get(node_id)?;
            if node.is_text() && !node.children.is_empty() {
                return Err(DomError::CorruptTree {
                    node: node_id,
                    reason: "text node has children",
                });
            }

            let children = &node.children;
            for (i, &child_id) in children.iter().enumerate() {
                let child = self.get(child_id)?;
                if child.parent != Some(node_id) {
                    return Err(DomError::CorruptTree {
                        node: child_id,
                        reason: "parent link does not match owning parent",
                    });
                }

                let expected_prev = i.checked_sub(1).map(|p| children[p]);
                if child.prev_sibling != expected_prev {
                    return Err(DomError::CorruptTree {
                        node: child_id,
                        reason: "previous sibling link out of order",
                    });
                }

                if child.next_sibling != children.get(i + 1).copied() {
                    return Err(DomError::CorruptTree {
                        node: child_id,
                        reason: "next sibling link out of order",
                    });
                }

                stack.push(child_id);
            }
        }

        Ok(())
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`DomArena::descendants`]
pub struct Descendants<'a> {
    arena: &'a DomArena,
    root: NodeId,
    next: Option<NodeId>,
}

impl Descendants<'_> {
    fn advance(&self, current: NodeId) -> Option<NodeId> {
        if let Some(first) = self.arena.first_child(current) {
            return Some(first);
        }

        let mut cursor = current;
        loop {
            if cursor == self.root {
                return None;
            }
            let node = self.arena.node(cursor)?;
            if let Some(next) = node.next_sibling {
                return Some(next);
            }
            cursor = node.parent?;
        }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.advance(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_tree() -> (DomArena, NodeId) {
        // div -> [p -> [span], text, p]
        let mut arena = DomArena::new();
        let div = arena.create_element("div");
        let p1 = arena.create_element("p");
        let span = arena.create_element("span");
        let text = arena.create_text_node("between");
        let p2 = arena.create_element("p");

        arena.append_child(p1, span).unwrap();
        arena.append_child(div, p1).unwrap();
        arena.append_child(div, text).unwrap();
        arena.append_child(div, p2).unwrap();
        arena.set_root(div).unwrap();
        (arena, div)
    }

    #[test]
    fn test_arena_basic() {
        let mut arena = DomArena::new();
        let id = arena.create_element("div");
        assert_eq!(id, 0);

        let retrieved = arena.get(id).unwrap();
        assert_eq!(retrieved.tag_name(), Some("div"));
        assert!(retrieved.children.is_empty());
        assert_eq!(retrieved.parent, None);
    }

    #[test]
    fn test_get_unknown_node() {
        let arena = DomArena::new();
        assert!(matches!(arena.get(42), Err(DomError::NodeNotFound(42))));
        assert_eq!(arena.parent(42), None);
        assert_eq!(arena.first_child(42), None);
    }

    #[test]
    fn test_set_root_requires_existing_node() {
        let mut arena = DomArena::new();
        assert!(arena.set_root(3).is_err());
        assert_eq!(arena.root_id(), None);
    }

    #[test]
    fn test_descendants_pre_order() {
        let (arena, div) = build_tree();

        let visited: Vec<String> = arena
            .descendants(div)
            .map(|id| {
                let node = arena.get(id).unwrap();
                node.tag_name()
                    .map(str::to_string)
                    .or_else(|| node.as_text().map(|t| format!("#{t}")))
                    .unwrap()
            })
            .collect();

        assert_eq!(visited, vec!["p", "span", "#between", "p"]);
    }

    #[test]
    fn test_descendants_of_inner_node_stops_at_subtree() {
        let (arena, div) = build_tree();
        let p1 = arena.first_child(div).unwrap();

        let visited: Vec<NodeId> = arena.descendants(p1).collect();
        assert_eq!(visited.len(), 1);
        assert_eq!(arena.get(visited[0]).unwrap().tag_name(), Some("span"));
    }

    #[test]
    fn test_descendants_of_leaf() {
        let mut arena = DomArena::new();
        let text = arena.create_text_node("leaf");
        assert_eq!(arena.descendants(text).count(), 0);
    }

    #[test]
    fn test_validate_detects_broken_sibling_link() {
        let (mut arena, div) = build_tree();
        arena.validate().unwrap();

        let first = arena.first_child(div).unwrap();
        arena.get_mut(first).unwrap().next_sibling = None;
        assert!(matches!(
            arena.validate(),
            Err(DomError::CorruptTree { node, .. }) if node == first
        ));
    }

    #[test]
    fn test_is_ancestor_or_self() {
        let (arena, div) = build_tree();
        let p1 = arena.first_child(div).unwrap();
        let span = arena.first_child(p1).unwrap();

        assert!(arena.is_ancestor_or_self(div, span));
        assert!(arena.is_ancestor_or_self(span, span));
        assert!(!arena.is_ancestor_or_self(span, div));
    }

    #[test]
    fn test_snapshot_through_json() {
        let (arena, div) = build_tree();
        let json = serde_json::to_string(&arena).unwrap();
        let restored: DomArena = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.root_id(), Some(div));
        assert_eq!(restored.len(), arena.len());
        restored.validate().unwrap();
        assert_eq!(
            restored.descendants(div).collect::<Vec<_>>(),
            arena.descendants(div).collect::<Vec<_>>()
        );
    }
}
