//! Node types
//!
//!     Block-level content lives in [`Block`], inline content in [`Inline`]. Keeping the two
//!     apart means a Text or Link can only ever sit inside a Paragraph, Heading, TableCell or
//!     Link: the compiler refuses anything else.
//!
//!     Nodes own their children outright. The tree is built once by a parser and only read
//!     afterwards, so no node offers mutation beyond its public fields.

use crate::error::MalformedTableError;
use serde::Serialize;

/// Root of the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub children: Vec<Block>,
}

impl Document {
    pub fn new(children: Vec<Block>) -> Self {
        Self { children }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Block-level content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading(Heading),
    Paragraph(Paragraph),
    CodeBlock(CodeBlock),
    ThematicBreak,
    BlockQuote(BlockQuote),
    List(List),
    Table(Table),
}

/// Inline content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    CodeSpan(String),
    Link(Link),
    Image(Image),
    LineBreak,
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(text.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub children: Vec<Inline>,
}

impl Heading {
    /// Levels outside `1..=6` are clamped.
    pub fn new(level: usize, children: Vec<Inline>) -> Self {
        Self {
            level: level.clamp(1, 6) as u8,
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub children: Vec<Inline>,
}

impl Paragraph {
    pub fn new(children: Vec<Inline>) -> Self {
        Self { children }
    }

    /// The sole image of a paragraph that holds nothing else.
    pub fn lone_image(&self) -> Option<&Image> {
        match self.children.as_slice() {
            [Inline::Image(image)] => Some(image),
            _ => None,
        }
    }
}

/// Fenced code. `language` is `None` when the fence carried no info string, which is
/// distinct from `Some("")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    pub code: String,
    pub language: Option<String>,
}

impl CodeBlock {
    pub fn new(code: impl Into<String>, language: Option<String>) -> Self {
        Self {
            code: code.into(),
            language,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockQuote {
    pub children: Vec<Block>,
}

impl BlockQuote {
    pub fn new(children: Vec<Block>) -> Self {
        Self { children }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

impl List {
    pub fn new(ordered: bool, items: Vec<ListItem>) -> Self {
        Self { ordered, items }
    }
}

/// A list item holds block content, so items can carry several paragraphs or a nested list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    /// Numeral written in the source for ordered items.
    pub number: Option<u64>,
    /// Task-list state: `Some(true)` for `[x]`, `Some(false)` for `[ ]`.
    pub task: Option<bool>,
    pub children: Vec<Block>,
}

impl ListItem {
    pub fn new(children: Vec<Block>) -> Self {
        Self {
            number: None,
            task: None,
            children,
        }
    }

    pub fn numbered(mut self, number: u64) -> Self {
        self.number = Some(number);
        self
    }

    pub fn with_task(mut self, checked: bool) -> Self {
        self.task = Some(checked);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Center,
    Right,
    None,
}

/// A table whose rows all have exactly one cell per alignment. Row 0 is the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    alignments: Vec<Alignment>,
    rows: Vec<TableRow>,
}

impl Table {
    /// Build a table, rejecting the first row whose width differs from the alignment count.
    pub fn new(alignments: Vec<Alignment>, rows: Vec<TableRow>) -> Result<Self, MalformedTableError> {
        let expected = alignments.len();
        if let Some((row, actual)) = rows
            .iter()
            .map(|r| r.cells.len())
            .enumerate()
            .find(|(_, width)| *width != expected)
        {
            return Err(MalformedTableError {
                row,
                expected,
                actual,
            });
        }
        Ok(Self { alignments, rows })
    }

    pub fn alignments(&self) -> &[Alignment] {
        &self.alignments
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn columns(&self) -> usize {
        self.alignments.len()
    }

    pub fn header(&self) -> Option<&TableRow> {
        self.rows.first()
    }

    pub fn body(&self) -> &[TableRow] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCell {
    pub children: Vec<Inline>,
}

impl TableCell {
    pub fn new(children: Vec<Inline>) -> Self {
        Self { children }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub url: String,
    pub children: Vec<Inline>,
}

impl Link {
    pub fn new(url: impl Into<String>, children: Vec<Inline>) -> Self {
        Self {
            url: url.into(),
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub url: String,
    pub alt: String,
}

impl Image {
    pub fn new(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: alt.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str) -> TableCell {
        TableCell::new(vec![Inline::text(text)])
    }

    #[test]
    fn heading_level_is_clamped() {
        assert_eq!(Heading::new(0, vec![]).level, 1);
        assert_eq!(Heading::new(4, vec![]).level, 4);
        assert_eq!(Heading::new(9, vec![]).level, 6);
    }

    #[test]
    fn table_accepts_matching_rows() {
        let table = Table::new(
            vec![Alignment::None, Alignment::Center],
            vec![
                TableRow::new(vec![cell("a"), cell("b")]),
                TableRow::new(vec![cell("1"), cell("2")]),
            ],
        )
        .expect("rows match alignments");
        assert_eq!(table.columns(), 2);
        assert_eq!(table.body().len(), 1);
        assert!(table.header().is_some());
    }

    #[test]
    fn table_rejects_short_row() {
        let err = Table::new(
            vec![Alignment::None, Alignment::None],
            vec![
                TableRow::new(vec![cell("a"), cell("b")]),
                TableRow::new(vec![cell("1")]),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            MalformedTableError {
                row: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn empty_table_has_no_body() {
        let table = Table::new(vec![Alignment::Left], vec![]).unwrap();
        assert!(table.header().is_none());
        assert!(table.body().is_empty());
    }

    #[test]
    fn lone_image_detection() {
        let alone = Paragraph::new(vec![Inline::Image(Image::new("a.png", "A"))]);
        assert_eq!(alone.lone_image().map(|i| i.url.as_str()), Some("a.png"));

        let mixed = Paragraph::new(vec![
            Inline::text("see "),
            Inline::Image(Image::new("a.png", "A")),
        ]);
        assert!(mixed.lone_image().is_none());
    }
}
