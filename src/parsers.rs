//! Source-format parsers
//!
//! A parser turns source text into a [`Document`]. Parsers are registered by name in the
//! [`FormatRegistry`](crate::registry::FormatRegistry) and looked up from there.

use crate::ast::Document;
use crate::error::ParseError;

pub mod markdown;

pub use markdown::MarkdownParser;

/// Trait for source formats
///
/// Implementors must be pure: the same source always yields the same tree, and nothing is
/// kept between calls, so one instance can be shared across threads.
///
/// ```ignore
/// struct Plain;
///
/// impl Parser for Plain {
///     fn name(&self) -> &str {
///         "plain"
///     }
///
///     fn parse(&self, source: &str) -> Result<Document, ParseError> {
///         // One paragraph per line
///         todo!()
///     }
/// }
/// ```
pub trait Parser: Send + Sync {
    /// Primary format name (e.g., "markdown")
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// File extensions this format is usually stored under, without the dot
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Parse source text into a Document
    fn parse(&self, source: &str) -> Result<Document, ParseError>;
}
