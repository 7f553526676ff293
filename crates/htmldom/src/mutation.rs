//! Mutation Engine
//!
//! Structural edits keep the owning child list and the parent/sibling
//! back-references in lock step. Every insertion first detaches the node
//! from wherever it currently lives, so a node is moved, never duplicated.
//!
//! Structural calls return `Result` and leave the tree untouched on `Err`.
//! Attribute calls are total: on a text node or unknown id they do nothing.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeData, NodeId};

impl DomArena {
    /// Move `child` to the end of `parent`'s child list
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Move `child` to the front of `parent`'s child list
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let first = self.first_child(parent);
        self.insert_before(parent, child, first)
    }

    /// Move `new_child` in front of `reference`, or to the end when
    /// `reference` is `None`.
    ///
    /// `reference` must be a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        self.check_insertion(parent, new_child)?;

        if let Some(reference) = reference {
            self.get(reference)?;
            if self.parent(reference) != Some(parent) {
                tracing::warn!(
                    "[Mutation] insert_before: reference {} is not a child of {}",
                    reference,
                    parent
                );
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
            if reference == new_child {
                return Ok(());
            }
        }

        self.detach(new_child);

        let parent_node = self.get(parent)?;
        let index = match reference {
            Some(reference) => parent_node
                .children
                .iter()
                .position(|&c| c == reference)
                .ok_or(DomError::NotAChild {
                    parent,
                    child: reference,
                })?,
            None => parent_node.children.len(),
        };

        self.link_at(parent, new_child, index);
        Ok(())
    }

    /// Put `new_child` exactly where `old_child` is and detach `old_child`.
    ///
    /// Returns the detached `old_child`. If `old_child` is not a child of
    /// `parent` this fails with [`DomError::NotAChild`] and nothing changes.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> Result<NodeId> {
        self.get(parent)?;
        self.get(old_child)?;

        if self.parent(old_child) != Some(parent) {
            tracing::warn!(
                "[Mutation] replace_child: {} is not a child of {}",
                old_child,
                parent
            );
            return Err(DomError::NotAChild {
                parent,
                child: old_child,
            });
        }

        if new_child == old_child {
            return Ok(old_child);
        }

        self.insert_before(parent, new_child, Some(old_child))?;
        self.detach(old_child);
        Ok(old_child)
    }

    /// Detach `child` from `parent`, failing if it is not one of its children
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get(child)?;
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        Ok(())
    }

    /// Unhook a node (and its whole subtree) from its parent.
    ///
    /// Returns false if the node had no parent or does not exist.
    pub fn detach(&mut self, node_id: NodeId) -> bool {
        let Some(node) = self.node(node_id) else {
            return false;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        let Some(parent) = parent else {
            return false;
        };

        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.retain(|c| *c != node_id);
        }
        if let Some(prev_node) = prev.and_then(|p| self.node_mut(p)) {
            prev_node.next_sibling = next;
        }
        if let Some(next_node) = next.and_then(|n| self.node_mut(n)) {
            next_node.prev_sibling = prev;
        }
        if let Some(node) = self.node_mut(node_id) {
            node.unlink();
        }

        tracing::trace!("[Mutation] detached {} from {}", node_id, parent);
        true
    }

    /// Detach every node in `nodes` that has a parent and passes `filter`.
    ///
    /// A `None` filter removes unconditionally. Nodes are visited from the
    /// end of the list backwards, so a filter that inspects siblings sees
    /// the later ones already gone. Returns how many nodes were detached.
    pub fn remove_nodes(
        &mut self,
        nodes: &[NodeId],
        filter: Option<&dyn Fn(&DomArena, NodeId) -> bool>,
    ) -> usize {
        let mut removed = 0;
        for &node_id in nodes.iter().rev() {
            if self.parent(node_id).is_none() {
                continue;
            }
            let matches = match filter {
                Some(filter) => filter(self, node_id),
                None => true,
            };
            if matches && self.detach(node_id) {
                removed += 1;
            }
        }
        removed
    }

    pub fn get_attribute(&self, node_id: NodeId, name: &str) -> Option<&str> {
        self.node(node_id)?.attr(name)
    }

    /// Update `name` in place if present, otherwise append it
    pub fn set_attribute(&mut self, node_id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.node_mut(node_id).and_then(DomNode::as_element_mut) {
            el.set_attr(name, value);
        }
    }

    pub fn remove_attribute(&mut self, node_id: NodeId, name: &str) {
        if let Some(el) = self.node_mut(node_id).and_then(DomNode::as_element_mut) {
            el.remove_attr(name);
        }
    }

    pub fn has_attribute(&self, node_id: NodeId, name: &str) -> bool {
        self.node(node_id)
            .and_then(DomNode::as_element)
            .is_some_and(|el| el.has_attr(name))
    }

    /// Replace all children of an element with one text node holding `text`.
    ///
    /// On a text node this replaces the payload instead.
    pub fn set_text_content(&mut self, node_id: NodeId, text: &str) -> Result<()> {
        let node = self.get_mut(node_id)?;
        if let NodeData::Text(payload) = &mut node.data {
            *payload = text.to_string();
            return Ok(());
        }

        let old_children = std::mem::take(&mut node.children);
        for child in old_children {
            if let Some(child_node) = self.node_mut(child) {
                child_node.unlink();
            }
        }

        let text_id = self.create_text_node(text);
        self.link_at(node_id, text_id, 0);
        Ok(())
    }

    /// Deep copy of a subtree. The copy is detached and shares nothing
    /// with the source.
    pub fn clone_node(&mut self, node_id: NodeId) -> Result<NodeId> {
        let data = self.get(node_id)?.data.clone();
        let root_copy = self.add_node(DomNode::with_data(data));

        // (source, copy) pairs whose children still need copying
        let mut pending = vec![(node_id, root_copy)];
        while let Some((source, copy)) = pending.pop() {
            let children = self.get(source)?.children.clone();
            for (index, child) in children.into_iter().enumerate() {
                let data = self.get(child)?.data.clone();
                let child_copy = self.add_node(DomNode::with_data(data));
                self.link_at(copy, child_copy, index);
                pending.push((child, child_copy));
            }
        }
        Ok(root_copy)
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self.get(parent)?;
        self.get(child)?;

        if !parent_node.is_element() {
            tracing::warn!("[Mutation] cannot insert {} under text node {}", child, parent);
            return Err(DomError::InvalidNodeType {
                expected: "element",
                actual: parent_node.data.kind(),
            });
        }

        if self.is_ancestor_or_self(child, parent) {
            tracing::warn!(
                "[Mutation] inserting {} under {} would create a cycle",
                child,
                parent
            );
            return Err(DomError::HierarchyRequest { parent, child });
        }

        Ok(())
    }

    /// Splice a detached node into `parent` at `index`, wiring both
    /// neighbours
    fn link_at(&mut self, parent: NodeId, child: NodeId, index: usize) {
        let Some(parent_node) = self.node_mut(parent) else {
            return;
        };
        let prev = index
            .checked_sub(1)
            .and_then(|i| parent_node.children.get(i).copied());
        let next = parent_node.children.get(index).copied();
        parent_node.children.insert(index, child);

        if let Some(child_node) = self.node_mut(child) {
            child_node.parent = Some(parent);
            child_node.prev_sibling = prev;
            child_node.next_sibling = next;
        }
        if let Some(prev_node) = prev.and_then(|p| self.node_mut(p)) {
            prev_node.next_sibling = Some(child);
        }
        if let Some(next_node) = next.and_then(|n| self.node_mut(n)) {
            next_node.prev_sibling = Some(child);
        }

        tracing::trace!("[Mutation] linked {} under {} at {}", child, parent, index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// div -> [p "Lonely word", span "new friend"]
    fn lonely_word() -> (DomArena, NodeId, NodeId, NodeId) {
        let mut arena = DomArena::new();
        let div = arena.create_element("div");
        let p = arena.create_element("p");
        let span = arena.create_element("span");
        let t1 = arena.create_text_node("Lonely word");
        let t2 = arena.create_text_node("new friend");
        arena.append_child(p, t1).unwrap();
        arena.append_child(span, t2).unwrap();
        arena.append_child(div, p).unwrap();
        arena.append_child(div, span).unwrap();
        arena.set_root(div).unwrap();
        (arena, div, p, span)
    }

    #[test]
    fn test_append_moves_existing_node() {
        let (mut arena, div, p, span) = lonely_word();

        arena.append_child(p, span).unwrap();

        assert_eq!(arena.get(div).unwrap().children.as_slice(), &[p]);
        assert_eq!(arena.parent(span), Some(p));
        assert_eq!(arena.last_child(p), Some(span));
        assert_eq!(arena.next_sibling(p), None);
        arena.validate().unwrap();
    }

    #[test]
    fn test_prepend_moves_existing_node() {
        let (mut arena, div, p, span) = lonely_word();

        arena.prepend_child(p, span).unwrap();

        assert_eq!(arena.first_child(p), Some(span));
        assert_eq!(arena.get(div).unwrap().children.len(), 1);
        arena.validate().unwrap();
    }

    #[test]
    fn test_prepend_existing_first_child_is_noop() {
        let (mut arena, div, p, span) = lonely_word();

        arena.prepend_child(div, p).unwrap();

        assert_eq!(arena.get(div).unwrap().children.as_slice(), &[p, span]);
        arena.validate().unwrap();
    }

    #[test]
    fn test_append_within_same_parent_reorders() {
        let (mut arena, div, p, span) = lonely_word();

        arena.append_child(div, p).unwrap();

        assert_eq!(arena.get(div).unwrap().children.as_slice(), &[span, p]);
        assert_eq!(arena.previous_sibling(p), Some(span));
        assert_eq!(arena.previous_sibling(span), None);
        arena.validate().unwrap();
    }

    #[test]
    fn test_append_into_text_node_fails() {
        let (mut arena, _div, p, span) = lonely_word();
        let text = arena.first_child(p).unwrap();

        let err = arena.append_child(text, span).unwrap_err();
        assert!(matches!(err, DomError::InvalidNodeType { .. }));
        assert_eq!(arena.next_sibling(p), Some(span));
        arena.validate().unwrap();
    }

    #[test]
    fn test_append_ancestor_fails() {
        let (mut arena, div, p, _span) = lonely_word();

        let err = arena.append_child(p, div).unwrap_err();
        assert!(matches!(err, DomError::HierarchyRequest { .. }));
        let err = arena.append_child(p, p).unwrap_err();
        assert!(matches!(err, DomError::HierarchyRequest { .. }));
        arena.validate().unwrap();
    }

    #[test]
    fn test_replace_child_keeps_position() {
        let (mut arena, div, p, span) = lonely_word();
        let em = arena.create_element("em");

        let old = arena.replace_child(div, em, p).unwrap();

        assert_eq!(old, p);
        assert_eq!(arena.get(div).unwrap().children.as_slice(), &[em, span]);
        assert_eq!(arena.parent(p), None);
        assert_eq!(arena.next_sibling(p), None);
        arena.validate().unwrap();
    }

    #[test]
    fn test_replace_child_with_sibling() {
        let (mut arena, div, p, span) = lonely_word();

        arena.replace_child(div, span, p).unwrap();

        assert_eq!(arena.get(div).unwrap().children.as_slice(), &[span]);
        assert_eq!(arena.previous_sibling(span), None);
        arena.validate().unwrap();
    }

    #[test]
    fn test_replace_child_not_a_child() {
        let (mut arena, div, p, span) = lonely_word();
        let text = arena.first_child(p).unwrap();
        let em = arena.create_element("em");

        let err = arena.replace_child(div, em, text).unwrap_err();
        assert!(matches!(err, DomError::NotAChild { parent, child } if parent == div && child == text));

        assert_eq!(arena.get(div).unwrap().children.as_slice(), &[p, span]);
        assert_eq!(arena.parent(text), Some(p));
        assert_eq!(arena.parent(em), None);
        arena.validate().unwrap();
    }

    #[test]
    fn test_remove_child() {
        let (mut arena, div, p, span) = lonely_word();

        assert!(arena.remove_child(p, span).is_err());
        arena.remove_child(div, p).unwrap();
        assert_eq!(arena.get(div).unwrap().children.as_slice(), &[span]);
        assert!(!arena.detach(p));
    }

    #[test]
    fn test_remove_nodes_with_filter() {
        let (mut arena, div, p, span) = lonely_word();
        let all = vec![p, span];

        let removed = arena.remove_nodes(&all, Some(&|dom: &DomArena, id: NodeId| {
            dom.tag_name(id) == "span"
        }));

        assert_eq!(removed, 1);
        assert_eq!(arena.get(div).unwrap().children.as_slice(), &[p]);
        arena.validate().unwrap();
    }

    #[test]
    fn test_remove_nodes_keeps_subtree_together() {
        let (mut arena, div, p, _span) = lonely_word();
        let text = arena.first_child(p).unwrap();

        let removed = arena.remove_nodes(&[p], None);

        assert_eq!(removed, 1);
        assert_eq!(arena.get(div).unwrap().children.len(), 1);
        assert_eq!(arena.parent(text), Some(p));
    }

    #[test]
    fn test_attribute_roundtrip() {
        let mut arena = DomArena::new();
        let p = arena.create_element("p");

        assert_eq!(arena.get_attribute(p, "id"), None);
        arena.set_attribute(p, "id", "main");
        arena.set_attribute(p, "class", "title");
        arena.set_attribute(p, "id", "txt-main");
        assert_eq!(arena.get_attribute(p, "id"), Some("txt-main"));
        assert!(arena.has_attribute(p, "class"));
        assert!(!arena.has_attribute(p, "Class"));

        arena.remove_attribute(p, "class");
        assert!(!arena.has_attribute(p, "class"));
    }

    #[test]
    fn test_attributes_on_text_node_are_noops() {
        let mut arena = DomArena::new();
        let text = arena.create_text_node("hello");

        arena.set_attribute(text, "id", "x");
        arena.remove_attribute(text, "id");
        assert_eq!(arena.get_attribute(text, "id"), None);
        assert!(!arena.has_attribute(text, "id"));
        assert_eq!(arena.get(text).unwrap().as_text(), Some("hello"));
    }

    #[test]
    fn test_set_text_content_replaces_children() {
        let (mut arena, div, p, span) = lonely_word();

        arena.set_text_content(div, "XXX").unwrap();

        let children = &arena.get(div).unwrap().children;
        assert_eq!(children.len(), 1);
        assert_eq!(arena.get(children[0]).unwrap().as_text(), Some("XXX"));
        assert_eq!(arena.parent(p), None);
        assert_eq!(arena.next_sibling(p), None);
        assert_eq!(arena.previous_sibling(span), None);
        arena.validate().unwrap();
    }

    #[test]
    fn test_set_text_content_on_text_node() {
        let mut arena = DomArena::new();
        let text = arena.create_text_node("old");

        arena.set_text_content(text, "new").unwrap();

        assert_eq!(arena.get(text).unwrap().as_text(), Some("new"));
        assert!(arena.get(text).unwrap().children.is_empty());
    }

    #[test]
    fn test_clone_node_is_independent() {
        let (mut arena, div, p, _span) = lonely_word();
        arena.set_attribute(p, "class", "x");

        let copy = arena.clone_node(div).unwrap();
        assert_ne!(copy, div);
        assert_eq!(arena.parent(copy), None);
        arena.validate_from(copy).unwrap();

        let copied_p = arena.first_child(copy).unwrap();
        assert_ne!(copied_p, p);
        arena.set_attribute(copied_p, "class", "y");
        assert_eq!(arena.get_attribute(p, "class"), Some("x"));
        assert_eq!(arena.get_attribute(copied_p, "class"), Some("y"));
    }

    #[test]
    fn test_unknown_ids_are_reported() {
        let mut arena = DomArena::new();
        let div = arena.create_element("div");

        assert!(matches!(
            arena.append_child(div, 99),
            Err(DomError::NodeNotFound(99))
        ));
        assert!(matches!(
            arena.set_text_content(99, "x"),
            Err(DomError::NodeNotFound(99))
        ));
        assert!(arena.clone_node(99).is_err());
    }
}
