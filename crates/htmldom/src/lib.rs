//! HTML DOM Manipulation Library
//!
//! Query, rewrite and re-serialize an already-parsed HTML tree.
//!
//! ## Philosophy
//!
//! - **Data structures first**: one arena, `u32` ids, the child list owns
//! - **No special cases**: a node is an element or a text, and every
//!   operation matches on that
//! - **Total reads**: "not found" is normal, so lookups return empty values
//!   instead of errors
//!
//! ## Core Design
//!
//! ```text
//! markup / DevTools JSON → DomArena (owned) → query → mutate → outer_html
//!                              ↓
//!                        NodeId (u32)
//! ```
//!
//! ```
//! use htmldom::parse::parse_fragment;
//!
//! let mut dom = parse_fragment("<div><p>Lonely word</p><span>new friend</span></div>").unwrap();
//! let root = dom.root_id().unwrap();
//! let div = dom.first_child(root).unwrap();
//! let p = dom.get_elements_by_tag_name(div, "p")[0];
//! let span = dom.get_elements_by_tag_name(div, "span")[0];
//!
//! dom.append_child(p, span).unwrap();
//! assert_eq!(
//!     dom.outer_html(div),
//!     "<div><p>Lonely word<span>new friend</span></p></div>"
//! );
//! ```

pub mod accessors;
pub mod arena;
pub mod cdp;
pub mod error;
pub mod mutation;
pub mod parse;
pub mod query;
pub mod serializer;
pub mod types;

pub use arena::{Descendants, DomArena};
pub use error::{DomError, Result};
pub use query::include_node;
pub use serializer::{HtmlSerializer, SerializerConfig, VoidStyle};
pub use types::*;
