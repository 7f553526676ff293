//! DOM Serializer - render a subtree back to markup
//!
//! This module handles:
//! - Outer and inner markup of any node
//! - Escaping of text and attribute values
//! - Void elements (no children, no closing tag)
//! - Raw-text elements whose text is emitted verbatim
//! - Text content aggregation
//!
//! Output is meant to be fed back to an HTML parser and produce the same
//! tree again.

use crate::arena::DomArena;
use crate::types::{
    ElementData, NodeData, NodeId, NEWLINE_SENSITIVE_ELEMENTS, RAW_TEXT_ELEMENTS,
};

/// How void elements are closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoidStyle {
    /// `<img/>`
    #[default]
    SelfClosing,
    /// `<img>`
    Html,
}

/// Serializer configuration
#[derive(Debug, Clone, Default)]
pub struct SerializerConfig {
    pub void_style: VoidStyle,
}

/// HTML markup serializer
#[derive(Debug, Clone, Default)]
pub struct HtmlSerializer {
    config: SerializerConfig,
}

impl HtmlSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Markup for the node and its whole subtree
    pub fn outer_html(&self, arena: &DomArena, node_id: NodeId) -> String {
        let mut output = String::with_capacity(256);
        self.write_outer_html(arena, node_id, &mut output);
        output
    }

    /// Markup for the node's children only
    pub fn inner_html(&self, arena: &DomArena, node_id: NodeId) -> String {
        let mut output = String::with_capacity(256);
        if let Some(NodeData::Element(el)) = arena.data(node_id) {
            let mut stack = Vec::new();
            push_children(arena, node_id, el, &mut stack, &mut output);
            self.drain(arena, stack, &mut output);
        }
        output
    }

    /// Append the outer markup of `node_id` to `output`
    pub fn write_outer_html(&self, arena: &DomArena, node_id: NodeId, output: &mut String) {
        self.drain(arena, vec![Step::Open { node_id, raw: false }], output);
    }

    /// Work through pending steps until the stack is empty. Uses no
    /// recursion, so nesting depth is bounded only by memory.
    fn drain<'a>(&self, arena: &'a DomArena, mut stack: Vec<Step<'a>>, output: &mut String) {
        while let Some(step) = stack.pop() {
            match step {
                Step::Close(tag) => {
                    output.push_str("</");
                    output.push_str(tag);
                    output.push('>');
                }
                Step::Open { node_id, raw } => match arena.data(node_id) {
                    Some(NodeData::Text(text)) if raw => output.push_str(text),
                    Some(NodeData::Text(text)) => escape_into(output, text),
                    Some(NodeData::Element(el)) => {
                        self.write_start_tag(el, output);
                        if !el.is_void() {
                            stack.push(Step::Close(&el.tag));
                            push_children(arena, node_id, el, &mut stack, output);
                        }
                    }
                    None => {}
                },
            }
        }
    }

    fn write_start_tag(&self, el: &ElementData, output: &mut String) {
        output.push('<');
        output.push_str(&el.tag);

        for attr in &el.attrs {
            output.push(' ');
            output.push_str(&attr.name);
            output.push_str("=\"");
            escape_into(output, &attr.value);
            output.push('"');
        }

        match (el.is_void(), self.config.void_style) {
            (true, VoidStyle::SelfClosing) => output.push_str("/>"),
            _ => output.push('>'),
        }
    }
}

/// One unit of pending serializer work
enum Step<'a> {
    Open { node_id: NodeId, raw: bool },
    Close(&'a str),
}

/// Queue the children of `el` in reverse so they pop in document order
fn push_children<'a>(
    arena: &'a DomArena,
    node_id: NodeId,
    el: &ElementData,
    stack: &mut Vec<Step<'a>>,
    output: &mut String,
) {
    let tag = el.tag.as_str();

    // The parser swallows one newline right after these start tags
    if NEWLINE_SENSITIVE_ELEMENTS.contains(&tag) {
        let first_text = arena
            .first_child(node_id)
            .and_then(|child| arena.data(child));
        if let Some(NodeData::Text(text)) = first_text {
            if text.starts_with('\n') {
                output.push('\n');
            }
        }
    }

    let raw = RAW_TEXT_ELEMENTS.contains(&tag);
    if let Some(node) = arena.node(node_id) {
        stack.extend(
            node.children
                .iter()
                .rev()
                .map(|&child| Step::Open { node_id: child, raw }),
        );
    }
}

/// Escape text for use in element content or a double-quoted attribute
pub fn escape(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    escape_into(&mut output, text);
    output
}

/// Escape `&'<>"` and carriage return, appending to `output`
pub fn escape_into(output: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '\'' => output.push_str("&#39;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&#34;"),
            '\r' => output.push_str("&#13;"),
            _ => output.push(c),
        }
    }
}

impl DomArena {
    /// Outer markup with the default serializer config
    pub fn outer_html(&self, node_id: NodeId) -> String {
        HtmlSerializer::new().outer_html(self, node_id)
    }

    /// Inner markup with the default serializer config
    pub fn inner_html(&self, node_id: NodeId) -> String {
        HtmlSerializer::new().inner_html(self, node_id)
    }

    /// Literal text of a text node, or every descendant text payload of an
    /// element concatenated in document order. Nothing is trimmed.
    pub fn text_content(&self, node_id: NodeId) -> String {
        match self.data(node_id) {
            Some(NodeData::Text(text)) => text.clone(),
            Some(NodeData::Element(_)) => {
                let mut text = String::new();
                for id in self.descendants(node_id) {
                    if let Some(NodeData::Text(payload)) = self.data(id) {
                        text.push_str(payload);
                    }
                }
                text
            }
            None => String::new(),
        }
    }
}
