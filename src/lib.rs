//! # markconv
//!
//! Convert markdown into LaTeX or Typst through a format-agnostic document tree.
//!
//! ```text
//! source text --Parser--> Document --Converter--> target text
//! ```
//!
//! Parsers and converters are looked up by name in a [`FormatRegistry`](registry::FormatRegistry).
//! The process-wide [`REGISTRY`](registry::REGISTRY) holds the built-ins:
//!
//! | kind      | name       | aliases |
//! |-----------|------------|---------|
//! | parser    | `markdown` | `md`    |
//! | converter | `latex`    | `tex`   |
//! | converter | `typst`    | `typ`   |
//!
//! Names are matched case-insensitively.
//!
//! ## Example
//!
//! ```ignore
//! let latex = markconv::convert("# Title\n\nHello *world*.", "md", "tex")?;
//! assert!(latex.contains("\\section{Title}"));
//! ```
//!
//! The library does no I/O and installs no logging subscriber; both belong to the caller.

pub mod ast;
pub mod config;
pub mod converters;
pub mod error;
pub mod parsers;
pub mod registry;

pub use ast::Document;
pub use crate::config::ConvertConfig;
pub use converters::Converter;
pub use error::{Error, MalformedTableError, ParseError, UnknownFormatError};
pub use parsers::Parser;
pub use registry::{FormatInfo, FormatKind, FormatRegistry, REGISTRY};

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Parser registered under `name` (or an alias) in the global registry.
pub fn resolve_parser(name: &str) -> Result<Arc<dyn Parser>, UnknownFormatError> {
    REGISTRY.resolve_parser(name)
}

/// Converter registered under `name` (or an alias) in the global registry.
pub fn resolve_converter(name: &str) -> Result<Arc<dyn Converter>, UnknownFormatError> {
    REGISTRY.resolve_converter(name)
}

/// Built-in formats, per kind.
pub fn list_formats() -> BTreeMap<FormatKind, Vec<FormatInfo>> {
    REGISTRY.list_formats()
}

/// Parse `source` with the parser registered as `format`.
pub fn parse(source: &str, format: &str) -> Result<Document, Error> {
    let parser = resolve_parser(format)?;
    let doc = parser.parse(source)?;
    debug!(format = format, blocks = doc.children.len(), "parsed source");
    Ok(doc)
}

/// Render `doc` with the converter registered as `format`.
pub fn render(doc: &Document, format: &str) -> Result<String, Error> {
    let converter = resolve_converter(format)?;
    Ok(converter.render(doc))
}

/// Parse `source` as `from` and render it as `to`.
///
/// Both names are resolved before any parsing happens, so an unknown target fails fast.
pub fn convert(source: &str, from: &str, to: &str) -> Result<String, Error> {
    convert_with(&REGISTRY, source, from, to)
}

/// [`convert`] against a caller-supplied registry, e.g. one built with
/// [`FormatRegistry::with_config`].
pub fn convert_with(
    registry: &FormatRegistry,
    source: &str,
    from: &str,
    to: &str,
) -> Result<String, Error> {
    let parser = registry.resolve_parser(from)?;
    let converter = registry.resolve_converter(to)?;
    let doc = parser.parse(source)?;
    let out = converter.render(&doc);
    debug!(
        from = parser.name(),
        to = converter.name(),
        input_bytes = source.len(),
        output_bytes = out.len(),
        "converted document"
    );
    Ok(out)
}
