//! Markdown parser
//!
//!     Parsing happens in two phases. `blocks` splits the source into block-level spans
//!     (fenced code, thematic breaks, ATX headings, pipe tables, lists, blockquotes and
//!     paragraphs, tried in that order) and recurses into list items and quotes. Each span
//!     that carries text hands it to `inlines`, which builds the inline children.
//!
//!     The only error is a pipe table whose rows disagree with its separator line. Any other
//!     construct the parser does not recognise becomes plain text.

mod blocks;
pub mod inlines;
mod table;

use super::Parser;
use crate::ast::Document;
use crate::error::ParseError;
use tracing::debug;

pub use inlines::parse_inlines;

/// Parser for CommonMark-style markdown with GFM tables, strikethrough and task lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownParser;

impl MarkdownParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for MarkdownParser {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark-style markdown with pipe tables, strikethrough and task lists"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn parse(&self, source: &str) -> Result<Document, ParseError> {
        let lines = split_lines(source);
        let children = blocks::parse_blocks(&lines)?;
        debug!(
            lines = lines.len(),
            blocks = children.len(),
            "parsed markdown document"
        );
        Ok(Document::new(children))
    }
}

/// Split into lines with CRLF and lone CR treated as LF.
fn split_lines(source: &str) -> Vec<String> {
    source
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}
