//! Read-only convenience views over a node
//!
//! All of these are total: an unknown id or the wrong node kind gives an
//! empty string, an empty list or `None`.

use crate::arena::DomArena;
use crate::types::{DomNode, NodeId};

impl DomArena {
    /// Tag name of an element, empty for text nodes
    pub fn tag_name(&self, node_id: NodeId) -> &str {
        self.node(node_id)
            .and_then(DomNode::tag_name)
            .unwrap_or("")
    }

    pub fn is_element(&self, node_id: NodeId) -> bool {
        self.node(node_id).is_some_and(DomNode::is_element)
    }

    pub fn is_text(&self, node_id: NodeId) -> bool {
        self.node(node_id).is_some_and(DomNode::is_text)
    }

    /// Value of the `id` attribute
    pub fn id(&self, node_id: NodeId) -> &str {
        self.get_attribute(node_id, "id").unwrap_or("")
    }

    /// Value of the `class` attribute with surrounding whitespace trimmed
    pub fn class_name(&self, node_id: NodeId) -> &str {
        self.get_attribute(node_id, "class").unwrap_or("").trim()
    }

    /// Element children only
    pub fn children(&self, node_id: NodeId) -> Vec<NodeId> {
        self.node(node_id)
            .map(|node| {
                node.children
                    .iter()
                    .copied()
                    .filter(|&child| self.is_element(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All children, elements and text alike
    pub fn child_nodes(&self, node_id: NodeId) -> Vec<NodeId> {
        self.node(node_id)
            .map(|node| node.children.to_vec())
            .unwrap_or_default()
    }

    pub fn first_element_child(&self, node_id: NodeId) -> Option<NodeId> {
        self.node(node_id)?
            .children
            .iter()
            .copied()
            .find(|&child| self.is_element(child))
    }

    pub fn last_element_child(&self, node_id: NodeId) -> Option<NodeId> {
        self.node(node_id)?
            .children
            .iter()
            .rev()
            .copied()
            .find(|&child| self.is_element(child))
    }

    pub fn next_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let mut current = self.next_sibling(node_id);
        while let Some(id) = current {
            if self.is_element(id) {
                return Some(id);
            }
            current = self.next_sibling(id);
        }
        None
    }

    pub fn previous_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let mut current = self.previous_sibling(node_id);
        while let Some(id) = current {
            if self.is_element(id) {
                return Some(id);
            }
            current = self.previous_sibling(id);
        }
        None
    }

    /// The `html` element: the root itself, or the first `html` below it
    pub fn document_element(&self) -> Option<NodeId> {
        let root = self.root_id()?;
        if self.tag_name(root) == "html" {
            return Some(root);
        }
        self.descendants(root)
            .find(|&id| self.tag_name(id) == "html")
    }
}
