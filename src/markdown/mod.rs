//! Markdown syntax tree, CommonMark parser and Markdown writer.
//!
//! The tree ([`Node`]) is the hinge between both pipelines: the import
//! side builds it from HTML and [`serialize`]s it, the block projector
//! [`parse`]s Markdown back into it.

pub mod ast;
pub mod parse;
pub mod serialize;

pub use ast::{flatten_text, Node};
pub use parse::parse;
pub use serialize::{serialize, serialize_with, SerializeOptions};
