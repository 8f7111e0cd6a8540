//! Uniform node access
//!
//!     [`Node`] borrows any node of the tree so generic code (dumps, tree walks, invariant
//!     checks) can traverse a document without matching on each concrete type.

use super::nodes::*;
use serde::Serialize;
use std::fmt;

/// The closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Document,
    Heading,
    Paragraph,
    Text,
    Emphasis,
    StrongEmphasis,
    Strikethrough,
    CodeSpan,
    CodeBlock,
    Link,
    Image,
    LineBreak,
    ThematicBreak,
    BlockQuote,
    List,
    ListItem,
    Table,
    TableRow,
    TableCell,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Document => "Document",
            NodeKind::Heading => "Heading",
            NodeKind::Paragraph => "Paragraph",
            NodeKind::Text => "Text",
            NodeKind::Emphasis => "Emphasis",
            NodeKind::StrongEmphasis => "StrongEmphasis",
            NodeKind::Strikethrough => "Strikethrough",
            NodeKind::CodeSpan => "CodeSpan",
            NodeKind::CodeBlock => "CodeBlock",
            NodeKind::Link => "Link",
            NodeKind::Image => "Image",
            NodeKind::LineBreak => "LineBreak",
            NodeKind::ThematicBreak => "ThematicBreak",
            NodeKind::BlockQuote => "BlockQuote",
            NodeKind::List => "List",
            NodeKind::ListItem => "ListItem",
            NodeKind::Table => "Table",
            NodeKind::TableRow => "TableRow",
            NodeKind::TableCell => "TableCell",
        }
    }

    /// Inline kinds may only appear inside Paragraph, Heading, TableCell or Link.
    pub fn is_inline(self) -> bool {
        matches!(
            self,
            NodeKind::Text
                | NodeKind::Emphasis
                | NodeKind::StrongEmphasis
                | NodeKind::Strikethrough
                | NodeKind::CodeSpan
                | NodeKind::Link
                | NodeKind::Image
                | NodeKind::LineBreak
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A borrowed reference to one node of the tree.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Document(&'a Document),
    Heading(&'a Heading),
    Paragraph(&'a Paragraph),
    Text(&'a str),
    Emphasis(&'a [Inline]),
    StrongEmphasis(&'a [Inline]),
    Strikethrough(&'a [Inline]),
    CodeSpan(&'a str),
    CodeBlock(&'a CodeBlock),
    Link(&'a Link),
    Image(&'a Image),
    LineBreak,
    ThematicBreak,
    BlockQuote(&'a BlockQuote),
    List(&'a List),
    ListItem(&'a ListItem),
    Table(&'a Table),
    TableRow(&'a TableRow),
    TableCell(&'a TableCell),
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Document(_) => NodeKind::Document,
            Node::Heading(_) => NodeKind::Heading,
            Node::Paragraph(_) => NodeKind::Paragraph,
            Node::Text(_) => NodeKind::Text,
            Node::Emphasis(_) => NodeKind::Emphasis,
            Node::StrongEmphasis(_) => NodeKind::StrongEmphasis,
            Node::Strikethrough(_) => NodeKind::Strikethrough,
            Node::CodeSpan(_) => NodeKind::CodeSpan,
            Node::CodeBlock(_) => NodeKind::CodeBlock,
            Node::Link(_) => NodeKind::Link,
            Node::Image(_) => NodeKind::Image,
            Node::LineBreak => NodeKind::LineBreak,
            Node::ThematicBreak => NodeKind::ThematicBreak,
            Node::BlockQuote(_) => NodeKind::BlockQuote,
            Node::List(_) => NodeKind::List,
            Node::ListItem(_) => NodeKind::ListItem,
            Node::Table(_) => NodeKind::Table,
            Node::TableRow(_) => NodeKind::TableRow,
            Node::TableCell(_) => NodeKind::TableCell,
        }
    }

    /// Children in document order. Leaves return an empty vector.
    pub fn children(&self) -> Vec<Node<'a>> {
        match *self {
            Node::Document(doc) => doc.children.iter().map(Node::from).collect(),
            Node::Heading(heading) => inline_nodes(&heading.children),
            Node::Paragraph(paragraph) => inline_nodes(&paragraph.children),
            Node::Emphasis(children)
            | Node::StrongEmphasis(children)
            | Node::Strikethrough(children) => inline_nodes(children),
            Node::Link(link) => inline_nodes(&link.children),
            Node::BlockQuote(quote) => quote.children.iter().map(Node::from).collect(),
            Node::List(list) => list.items.iter().map(Node::ListItem).collect(),
            Node::ListItem(item) => item.children.iter().map(Node::from).collect(),
            Node::Table(table) => table.rows().iter().map(Node::TableRow).collect(),
            Node::TableRow(row) => row.cells.iter().map(Node::TableCell).collect(),
            Node::TableCell(cell) => inline_nodes(&cell.children),
            Node::Text(_)
            | Node::CodeSpan(_)
            | Node::CodeBlock(_)
            | Node::Image(_)
            | Node::LineBreak
            | Node::ThematicBreak => Vec::new(),
        }
    }

    /// Short human-readable payload: text content, URLs, levels.
    pub fn label(&self) -> String {
        match self {
            Node::Heading(heading) => format!("level={}", heading.level),
            Node::Text(text) | Node::CodeSpan(text) => (*text).to_string(),
            Node::CodeBlock(code) => match &code.language {
                Some(language) => format!("language={language}"),
                None => String::new(),
            },
            Node::Link(link) => link.url.clone(),
            Node::Image(image) => format!("{} alt={}", image.url, image.alt),
            Node::List(list) => {
                if list.ordered {
                    "ordered".to_string()
                } else {
                    "bullet".to_string()
                }
            }
            Node::ListItem(item) => match (item.number, item.task) {
                (Some(n), Some(checked)) => format!("{n} task={checked}"),
                (Some(n), None) => n.to_string(),
                (None, Some(checked)) => format!("task={checked}"),
                (None, None) => String::new(),
            },
            Node::Table(table) => format!("columns={}", table.columns()),
            _ => String::new(),
        }
    }

    /// Depth-first pre-order walk over this node and all descendants.
    pub fn walk(&self, visit: &mut dyn FnMut(&Node<'a>, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at(&self, depth: usize, visit: &mut dyn FnMut(&Node<'a>, usize)) {
        visit(self, depth);
        for child in self.children() {
            child.walk_at(depth + 1, visit);
        }
    }
}

fn inline_nodes(inlines: &[Inline]) -> Vec<Node<'_>> {
    inlines.iter().map(Node::from).collect()
}

impl<'a> From<&'a Document> for Node<'a> {
    fn from(doc: &'a Document) -> Self {
        Node::Document(doc)
    }
}

impl<'a> From<&'a Block> for Node<'a> {
    fn from(block: &'a Block) -> Self {
        match block {
            Block::Heading(heading) => Node::Heading(heading),
            Block::Paragraph(paragraph) => Node::Paragraph(paragraph),
            Block::CodeBlock(code) => Node::CodeBlock(code),
            Block::ThematicBreak => Node::ThematicBreak,
            Block::BlockQuote(quote) => Node::BlockQuote(quote),
            Block::List(list) => Node::List(list),
            Block::Table(table) => Node::Table(table),
        }
    }
}

impl<'a> From<&'a Inline> for Node<'a> {
    fn from(inline: &'a Inline) -> Self {
        match inline {
            Inline::Text(text) => Node::Text(text),
            Inline::Emphasis(children) => Node::Emphasis(children),
            Inline::Strong(children) => Node::StrongEmphasis(children),
            Inline::Strikethrough(children) => Node::Strikethrough(children),
            Inline::CodeSpan(code) => Node::CodeSpan(code),
            Inline::Link(link) => Node::Link(link),
            Inline::Image(image) => Node::Image(image),
            Inline::LineBreak => Node::LineBreak,
        }
    }
}
