//! Target-format converters
//!
//!     A converter renders a [`Document`] into text. Both built-in converters share the
//!     traversal in [`NodeRenderer`]: each supplies one rule per node kind, and the provided
//!     methods walk the tree, threading a list-nesting depth through the recursion and, for
//!     inlines, whether the output lands inside a command argument.
//!
//!     Converters hold only their options. Rendering reads the tree and nothing else, so
//!     two renders of one document are byte-identical.

use crate::ast::{
    Block, BlockQuote, CodeBlock, Document, Heading, Image, Inline, Link, List, Paragraph, Table,
};

pub mod latex;
pub mod typst;

pub use latex::LatexConverter;
pub use typst::TypstConverter;

/// Trait for target formats
pub trait Converter: Send + Sync {
    /// Primary format name (e.g., "latex")
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Extension for files written in this format, without the dot
    fn file_extension(&self) -> &str;

    /// Render a document. Total over every tree a parser can produce.
    fn render(&self, doc: &Document) -> String;
}

/// One rendering rule per node kind, plus the shared walk over blocks and inlines.
///
/// Composite rules receive their children already rendered where the output is a plain
/// prefix + children + suffix; rules that lay children out themselves (lists, tables,
/// quotes) receive the node and call back into the walk.
///
/// Inline rules see `in_argument` set when their output ends up inside another construct's
/// argument (styled text, heading titles, link text), where some targets restrict what may
/// appear.
pub(crate) trait NodeRenderer {
    fn heading(&self, heading: &Heading) -> String;
    fn paragraph(&self, paragraph: &Paragraph) -> String;
    fn code_block(&self, code: &CodeBlock) -> String;
    fn thematic_break(&self) -> String;
    fn block_quote(&self, quote: &BlockQuote, depth: usize) -> String;
    fn list(&self, list: &List, depth: usize) -> String;
    fn table(&self, table: &Table) -> String;

    fn text(&self, text: &str) -> String;
    fn emphasis(&self, inner: &str) -> String;
    fn strong(&self, inner: &str) -> String;
    fn strikethrough(&self, inner: &str) -> String;
    fn code_span(&self, code: &str, in_argument: bool) -> String;
    fn link(&self, link: &Link) -> String;
    fn image(&self, image: &Image) -> String;
    fn line_break(&self) -> String;

    fn render_block(&self, block: &Block, depth: usize) -> String {
        match block {
            Block::Heading(heading) => self.heading(heading),
            Block::Paragraph(paragraph) => self.paragraph(paragraph),
            Block::CodeBlock(code) => self.code_block(code),
            Block::ThematicBreak => self.thematic_break(),
            Block::BlockQuote(quote) => self.block_quote(quote, depth),
            Block::List(list) => self.list(list, depth),
            Block::Table(table) => self.table(table),
        }
    }

    /// Blocks separated by one blank line.
    fn render_blocks(&self, blocks: &[Block], depth: usize) -> String {
        blocks
            .iter()
            .map(|block| self.render_block(block, depth))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn render_inline(&self, inline: &Inline, in_argument: bool) -> String {
        match inline {
            Inline::Text(text) => self.text(text),
            Inline::Emphasis(children) => self.emphasis(&self.render_inlines_in(children, true)),
            Inline::Strong(children) => self.strong(&self.render_inlines_in(children, true)),
            Inline::Strikethrough(children) => {
                self.strikethrough(&self.render_inlines_in(children, true))
            }
            Inline::CodeSpan(code) => self.code_span(code, in_argument),
            Inline::Link(link) => self.link(link),
            Inline::Image(image) => self.image(image),
            Inline::LineBreak => self.line_break(),
        }
    }

    fn render_inlines_in(&self, inlines: &[Inline], in_argument: bool) -> String {
        inlines
            .iter()
            .map(|inline| self.render_inline(inline, in_argument))
            .collect()
    }

    /// Inlines at paragraph, list item or table cell level.
    fn render_inlines(&self, inlines: &[Inline]) -> String {
        self.render_inlines_in(inlines, false)
    }

    /// Inlines placed inside a command or function argument.
    fn render_argument(&self, inlines: &[Inline]) -> String {
        self.render_inlines_in(inlines, true)
    }
}

/// Prefix every non-empty line with `indent`.
pub(crate) fn indent_lines(text: &str, indent: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Longest run of `ch` in `text`.
pub(crate) fn longest_run(text: &str, ch: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == ch {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
