//! Import a DevTools `DOM.getDocument` snapshot into a `DomArena`
//!
//! Input format matches the protocol's node shape:
//! ```json
//! {
//!   "root": {
//!     "nodeType": 9,
//!     "nodeName": "#document",
//!     "children": [{ "nodeType": 1, "nodeName": "HTML", "attributes": [], "children": [] }]
//!   }
//! }
//! ```
//!
//! Element, text and CDATA nodes are imported. A document or fragment node
//! resolves to its first element child. Everything else (comments, doctype,
//! processing instructions) is skipped, as are shadow roots and iframe
//! content documents.

use serde_json::Value;

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::NodeId;

const ELEMENT_NODE: u64 = 1;
const TEXT_NODE: u64 = 3;
const CDATA_SECTION_NODE: u64 = 4;
const DOCUMENT_NODE: u64 = 9;
const DOCUMENT_FRAGMENT_NODE: u64 = 11;

/// Configuration for the DevTools importer
#[derive(Debug, Clone, Default)]
pub struct CdpImportConfig {
    /// Drop text nodes made only of whitespace (indentation between tags)
    pub skip_whitespace_text: bool,
}

/// Build an arena from a `DOM.getDocument` response string
pub fn from_cdp_str(response: &str) -> Result<DomArena> {
    let value: Value = serde_json::from_str(response)?;
    from_cdp_json(&value)
}

/// Build an arena from a parsed `DOM.getDocument` response
pub fn from_cdp_json(response: &Value) -> Result<DomArena> {
    CdpImporter::new(CdpImportConfig::default()).import(response)
}

pub struct CdpImporter {
    config: CdpImportConfig,
    arena: DomArena,
    skipped: usize,
}

impl CdpImporter {
    pub fn new(config: CdpImportConfig) -> Self {
        Self {
            config,
            arena: DomArena::new(),
            skipped: 0,
        }
    }

    /// Consume the importer and return the arena rooted at the response's
    /// root node
    pub fn import(mut self, response: &Value) -> Result<DomArena> {
        let root = response
            .get("root")
            .ok_or_else(|| DomError::Import("Missing 'root' in DevTools response".to_string()))?;

        let root_id = self
            .import_tree(root)?
            .ok_or_else(|| DomError::Import("Root has no element to import".to_string()))?;
        self.arena.set_root(root_id)?;

        tracing::debug!(
            "[CdpImport] imported {} nodes, skipped {}",
            self.arena.len(),
            self.skipped
        );
        Ok(self.arena)
    }

    /// Import `top` and everything below it, walking with an explicit stack
    fn import_tree(&mut self, top: &Value) -> Result<Option<NodeId>> {
        let Some((top_id, top_source)) = self.import_node(top)? else {
            return Ok(None);
        };

        let mut pending = vec![(top_source, top_id)];
        while let Some((source, target)) = pending.pop() {
            for child in children_of(source) {
                if let Some((child_id, child_source)) = self.import_node(child)? {
                    self.arena.append_child(target, child_id)?;
                    pending.push((child_source, child_id));
                }
            }
        }

        Ok(Some(top_id))
    }

    /// Create the arena node for one DevTools node, without its children.
    ///
    /// Returns the new id together with the JSON node whose children belong
    /// under it. That is the node itself, except for a document or fragment,
    /// which stands in for its first element child.
    fn import_node<'v>(&mut self, cdp_node: &'v Value) -> Result<Option<(NodeId, &'v Value)>> {
        let node_type = cdp_node["nodeType"]
            .as_u64()
            .ok_or_else(|| DomError::Import("Missing nodeType".to_string()))?;

        match node_type {
            ELEMENT_NODE => Ok(Some((self.import_element(cdp_node)?, cdp_node))),
            TEXT_NODE | CDATA_SECTION_NODE => {
                let value = cdp_node["nodeValue"].as_str().unwrap_or("");
                if self.config.skip_whitespace_text && value.trim().is_empty() {
                    self.skipped += 1;
                    return Ok(None);
                }
                Ok(Some((self.arena.create_text_node(value), cdp_node)))
            }
            DOCUMENT_NODE | DOCUMENT_FRAGMENT_NODE => {
                let element = children_of(cdp_node)
                    .iter()
                    .find(|child| child["nodeType"].as_u64() == Some(ELEMENT_NODE));
                match element {
                    Some(element) => Ok(Some((self.import_element(element)?, element))),
                    None => Ok(None),
                }
            }
            other => {
                tracing::trace!("[CdpImport] skipping node of type {}", other);
                self.skipped += 1;
                Ok(None)
            }
        }
    }

    fn import_element(&mut self, cdp_node: &Value) -> Result<NodeId> {
        let name = cdp_node["nodeName"]
            .as_str()
            .ok_or_else(|| DomError::Import("Missing nodeName on element".to_string()))?;
        // DevTools reports HTML names upper-case; the element lowercases them
        let id = self.arena.create_element(name);

        // Attributes arrive flattened: [name0, value0, name1, value1, ...]
        if let Some(attrs) = cdp_node["attributes"].as_array() {
            for pair in attrs.chunks_exact(2) {
                if let (Some(key), Some(value)) = (pair[0].as_str(), pair[1].as_str()) {
                    self.arena.set_attribute(id, key, value);
                }
            }
        }

        if cdp_node.get("shadowRoots").is_some() || cdp_node.get("contentDocument").is_some() {
            self.skipped += 1;
        }

        Ok(id)
    }
}

fn children_of(cdp_node: &Value) -> &[Value] {
    cdp_node["children"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
