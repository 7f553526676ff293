//! Bridge from the html5ever-based `scraper` parser into a `DomArena`
//!
//! The node model only knows elements and text, so comments, doctypes and
//! processing instructions are dropped on the way in.

use ego_tree::NodeRef;
use scraper::{Html, Node};

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::NodeId;

/// Parse a full document. The root is the `html` element.
pub fn parse_document(markup: &str) -> Result<DomArena> {
    build_arena(&Html::parse_document(markup))
}

/// Parse a fragment in `<body>` context.
///
/// The root is the `html` wrapper the parser creates; the fragment's own
/// nodes are its children.
pub fn parse_fragment(markup: &str) -> Result<DomArena> {
    build_arena(&Html::parse_fragment(markup))
}

fn build_arena(html: &Html) -> Result<DomArena> {
    if !html.errors.is_empty() {
        tracing::debug!("[Parse] recovered from {} parse errors", html.errors.len());
    }

    let mut arena = DomArena::new();
    let root = import_tree(&mut arena, *html.root_element())?
        .ok_or_else(|| DomError::Import("parser produced no root element".to_string()))?;
    arena.set_root(root)?;

    tracing::debug!("[Parse] built arena with {} nodes", arena.len());
    Ok(arena)
}

/// Copy one parser node and its subtree into the arena
fn import_tree(arena: &mut DomArena, top: NodeRef<'_, Node>) -> Result<Option<NodeId>> {
    let Some(top_id) = import_node(arena, top) else {
        return Ok(None);
    };

    let mut pending = vec![(top, top_id)];
    while let Some((source, target)) = pending.pop() {
        for child in source.children() {
            if let Some(child_id) = import_node(arena, child) {
                arena.append_child(target, child_id)?;
                pending.push((child, child_id));
            }
        }
    }

    Ok(Some(top_id))
}

/// Copy a single element or text node, detached. Other kinds are dropped.
fn import_node(arena: &mut DomArena, node: NodeRef<'_, Node>) -> Option<NodeId> {
    match node.value() {
        Node::Element(el) => {
            let id = arena.create_element(el.name());
            for (name, value) in el.attrs() {
                arena.set_attribute(id, name, value);
            }
            Some(id)
        }
        Node::Text(text) => Some(arena.create_text_node(text)),
        _ => None,
    }
}

impl DomArena {
    /// Replace the children of an element with the parsed `markup`
    pub fn set_inner_html(&mut self, node_id: NodeId, markup: &str) -> Result<()> {
        let node = self.get(node_id)?;
        if !node.is_element() {
            return Err(DomError::InvalidNodeType {
                expected: "element",
                actual: node.data.kind(),
            });
        }

        let fragment = Html::parse_fragment(markup);

        for child in self.child_nodes(node_id) {
            self.detach(child);
        }

        for child in fragment.root_element().children() {
            if let Some(child_id) = import_tree(self, child)? {
                self.append_child(node_id, child_id)?;
            }
        }

        Ok(())
    }
}
