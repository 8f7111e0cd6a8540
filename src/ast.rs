//! Format-agnostic document tree
//!
//! Parsers produce a [`Document`], converters consume it. The tree carries no rendering
//! behaviour of its own; [`Node`] gives read-only traversal over every node kind.

pub mod node;
pub mod nodes;
pub mod tag;

pub use node::{Node, NodeKind};
pub use nodes::{
    Alignment, Block, BlockQuote, CodeBlock, Document, Heading, Image, Inline, Link, List,
    ListItem, Paragraph, Table, TableCell, TableRow,
};
pub use tag::to_tag_string;
