//! Query Engine
//!
//! Every query walks the descendants of a root in document order
//! (pre-order, depth-first). The root itself never matches.

use ahash::AHashSet;

use crate::arena::DomArena;
use crate::types::NodeId;

/// Tag that matches every element
pub const WILDCARD_TAG: &str = "*";

impl DomArena {
    /// All element descendants of `root` whose tag equals `tag`,
    /// ignoring ASCII case. `"*"` matches every element.
    pub fn get_elements_by_tag_name(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let match_all = tag == WILDCARD_TAG;
        self.descendants(root)
            .filter(|&id| {
                self.node(id)
                    .and_then(|node| node.tag_name())
                    .is_some_and(|name| match_all || name.eq_ignore_ascii_case(tag))
            })
            .collect()
    }

    /// All element descendants of `root` whose tag is any of `tags`.
    ///
    /// `tags` may use any case; stored tags are already lower-case.
    ///
    /// Results stay in document order no matter how `tags` is ordered, and
    /// repeated tags do not repeat matches.
    pub fn get_all_nodes_with_tag(&self, root: NodeId, tags: &[&str]) -> Vec<NodeId> {
        let wanted: AHashSet<String> = tags.iter().map(|t| t.to_ascii_lowercase()).collect();
        if wanted.is_empty() {
            return Vec::new();
        }

        self.descendants(root)
            .filter(|&id| {
                self.node(id)
                    .and_then(|node| node.tag_name())
                    .is_some_and(|name| wanted.contains(name))
            })
            .collect()
    }

    /// First element descendant of `root` whose `id` attribute equals `id`
    pub fn get_element_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        self.descendants(root)
            .find(|&node| self.get_attribute(node, "id") == Some(id))
    }
}

/// Identity membership: true iff `candidate` is the very same node as one
/// of `nodes`. Two structurally equal nodes are still different nodes.
pub fn include_node(nodes: &[NodeId], candidate: NodeId) -> bool {
    nodes.iter().any(|&node| node == candidate)
}
