//! XML-like tag dump of a document
//!
//! Used by `markconv inspect` and in tests to see the tree a parser built.
//!
//! ```text
//! <document>
//!   <heading>level=1
//!     <text>Title</text>
//!   </heading>
//! </document>
//! ```
//!
//! Node kind becomes a kebab-case tag, the node label becomes text content, and children
//! nest one indent level deeper.

use super::node::Node;
use super::nodes::Document;

struct TagSerializer {
    output: String,
    indent_level: usize,
}

impl TagSerializer {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
        }
    }

    fn push_indent(&mut self, s: &str) {
        for _ in 0..self.indent_level {
            self.output.push_str("  ");
        }
        self.output.push_str(s);
    }

    fn serialize_node(&mut self, node: &Node<'_>) {
        let tag = to_tag_name(node.kind().name());
        let children = node.children();

        self.push_indent(&format!("<{tag}>"));
        self.output.push_str(&escape_xml(&node.label()));

        if children.is_empty() {
            self.output.push_str(&format!("</{tag}>\n"));
            return;
        }

        self.output.push('\n');
        self.indent_level += 1;
        for child in &children {
            self.serialize_node(child);
        }
        self.indent_level -= 1;
        self.push_indent(&format!("</{tag}>\n"));
    }
}

/// "StrongEmphasis" -> "strong-emphasis"
fn to_tag_name(kind: &str) -> String {
    let mut tag = String::with_capacity(kind.len() + 2);
    for (i, c) in kind.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            tag.push('-');
        }
        tag.extend(c.to_lowercase());
    }
    tag
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
        .replace('\n', "\\n")
}

/// Dump a document as nested tags, one node per line.
pub fn to_tag_string(doc: &Document) -> String {
    let mut serializer = TagSerializer::new();
    serializer.serialize_node(&Node::from(doc));
    serializer.output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Block, Heading, Inline, Link, Paragraph};

    #[test]
    fn tag_names_are_kebab_case() {
        assert_eq!(to_tag_name("StrongEmphasis"), "strong-emphasis");
        assert_eq!(to_tag_name("Text"), "text");
        assert_eq!(to_tag_name("TableCell"), "table-cell");
    }

    #[test]
    fn empty_document_is_a_single_line() {
        assert_eq!(to_tag_string(&Document::default()), "<document></document>\n");
    }

    #[test]
    fn dump_nests_children() {
        let doc = Document::new(vec![
            Block::Heading(Heading::new(1, vec![Inline::text("Hi")])),
            Block::Paragraph(Paragraph::new(vec![
                Inline::text("A "),
                Inline::Emphasis(vec![Inline::text("b")]),
                Inline::Link(Link::new("https://x.org/?a&b", vec![Inline::text("<x>")])),
            ])),
        ]);

        insta::assert_snapshot!(to_tag_string(&doc), @r"
<document>
  <heading>level=1
    <text>Hi</text>
  </heading>
  <paragraph>
    <text>A </text>
    <emphasis>
      <text>b</text>
    </emphasis>
    <link>https://x.org/?a&amp;b
      <text>&lt;x&gt;</text>
    </link>
  </paragraph>
</document>
");
    }
}
