//! Typst output
//!
//! Headings become `=` runs, emphasis `_x_`, strong `*x*`, strikethrough `#strike[x]`.
//! Emphasis and strong touching a letter or digit use `#emph[x]` and `#strong[x]` instead,
//! since Typst ignores the shorthand delimiters inside a word.
//! Raw text always carries a language tag (`text` when the source had none). Lists use `-`
//! for bullets and the source numeral (or `+`) for ordered items, with nested content
//! indented one unit per level. Tables become a `#table(..)` call with a `table.header(..)`.

use super::{indent_lines, longest_run, Converter, NodeRenderer};
use crate::ast::{
    Alignment, Block, BlockQuote, CodeBlock, Document, Heading, Image, Inline, Link, List,
    ListItem, Paragraph, Table, TableRow,
};
use crate::config::TypstOptions;
use tracing::debug;

/// Language tag used for raw text that declared none.
const DEFAULT_LANGUAGE: &str = "text";

#[derive(Debug, Clone, Default)]
pub struct TypstConverter {
    options: TypstOptions,
}

impl TypstConverter {
    pub fn new(options: TypstOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TypstOptions {
        &self.options
    }

    fn indent(&self, depth: usize) -> String {
        self.options.list_indent.repeat(depth)
    }

    fn list_item(&self, item: &ListItem, ordered: bool, depth: usize) -> String {
        let indent = self.indent(depth);
        let inner = self.indent(depth + 1);
        let marker = match (ordered, item.number) {
            (false, _) => "- ".to_string(),
            (true, Some(number)) => format!("{number}. "),
            (true, None) => "+ ".to_string(),
        };
        let mut out = format!("{indent}{marker}");
        match item.task {
            Some(true) => out.push_str("☒ "),
            Some(false) => out.push_str("☐ "),
            None => {}
        }

        for (index, block) in item.children.iter().enumerate() {
            match block {
                Block::Paragraph(paragraph) if index == 0 => {
                    out.push_str(&continue_lines(&self.paragraph(paragraph), &inner));
                }
                Block::List(nested) => {
                    out.push('\n');
                    out.push_str(&self.list(nested, depth + 1));
                }
                other => {
                    out.push_str(if index == 0 { "\n" } else { "\n\n" });
                    out.push_str(&indent_lines(&self.render_block(other, depth + 1), &inner));
                }
            }
        }

        let kept = out.trim_end().len();
        out.truncate(kept);
        out
    }

    fn table_row(&self, row: &TableRow) -> Vec<String> {
        row.cells
            .iter()
            .map(|cell| format!("[{}]", self.render_inlines(&cell.children)))
            .collect()
    }
}

impl Converter for TypstConverter {
    fn name(&self) -> &str {
        "typst"
    }

    fn description(&self) -> &str {
        "Typst markup"
    }

    fn file_extension(&self) -> &str {
        "typ"
    }

    fn render(&self, doc: &Document) -> String {
        let body = self.render_blocks(&doc.children, 0);
        let out = if body.is_empty() {
            body
        } else {
            format!("{body}\n")
        };
        debug!(format = "typst", bytes = out.len(), "rendered document");
        out
    }
}

impl NodeRenderer for TypstConverter {
    fn heading(&self, heading: &Heading) -> String {
        let marks = "=".repeat(usize::from(heading.level));
        let title = self.render_inlines(&heading.children);
        if title.is_empty() {
            marks
        } else {
            format!("{marks} {title}")
        }
    }

    fn paragraph(&self, paragraph: &Paragraph) -> String {
        match paragraph.lone_image() {
            Some(image) => figure(image),
            None => self.render_inlines(&paragraph.children),
        }
    }

    fn code_block(&self, code: &CodeBlock) -> String {
        let fence = fence_for(&code.code);
        let language = match code.language.as_deref() {
            Some(language) if !language.is_empty() => language,
            _ => DEFAULT_LANGUAGE,
        };
        let mut out = format!("{fence}{language}\n{}", code.code);
        if !code.code.is_empty() && !code.code.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&fence);
        out
    }

    fn thematic_break(&self) -> String {
        "#line(length: 100%)".to_string()
    }

    fn block_quote(&self, quote: &BlockQuote, _depth: usize) -> String {
        format!(
            "#quote(block: true)[\n{}\n]",
            self.render_blocks(&quote.children, 0)
        )
    }

    fn list(&self, list: &List, depth: usize) -> String {
        list.items
            .iter()
            .map(|item| self.list_item(item, list.ordered, depth))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn table(&self, table: &Table) -> String {
        let mut lines = vec!["#table(".to_string(), format!("  columns: {},", table.columns())];
        if table.alignments().iter().any(|a| *a != Alignment::None) {
            let aligns: Vec<&str> = table
                .alignments()
                .iter()
                .map(|alignment| match alignment {
                    Alignment::Left => "left",
                    Alignment::Center => "center",
                    Alignment::Right => "right",
                    Alignment::None => "auto",
                })
                .collect();
            lines.push(format!("  align: ({}),", aligns.join(", ")));
        }
        if let Some(header) = table.header() {
            lines.push(format!(
                "  table.header({}),",
                self.table_row(header).join(", ")
            ));
        }
        for row in table.body() {
            lines.push(format!("  {},", self.table_row(row).join(", ")));
        }
        lines.push(")".to_string());
        lines.join("\n")
    }

    fn text(&self, text: &str) -> String {
        escape_text(text)
    }

    fn emphasis(&self, inner: &str) -> String {
        format!("_{inner}_")
    }

    fn strong(&self, inner: &str) -> String {
        format!("*{inner}*")
    }

    fn strikethrough(&self, inner: &str) -> String {
        format!("#strike[{inner}]")
    }

    fn code_span(&self, code: &str, _in_argument: bool) -> String {
        let fence = fence_for(code);
        format!("{fence}{DEFAULT_LANGUAGE} {code}{fence}")
    }

    fn link(&self, link: &Link) -> String {
        let url = quote_string(&link.url);
        let text = self.render_inlines(&link.children);
        if text.is_empty() {
            format!("#link({url})")
        } else {
            format!("#link({url})[{text}]")
        }
    }

    fn image(&self, image: &Image) -> String {
        format!("#{}", image_call(image))
    }

    fn line_break(&self) -> String {
        "\\\n".to_string()
    }

    fn render_inlines_in(&self, inlines: &[Inline], in_argument: bool) -> String {
        let rendered: Vec<String> = inlines
            .iter()
            .map(|inline| self.render_inline(inline, in_argument))
            .collect();

        let mut out = String::new();
        for (index, (inline, markup)) in inlines.iter().zip(&rendered).enumerate() {
            let next = rendered.get(index + 1).map(String::as_str).unwrap_or("");
            let glued = out.chars().next_back().is_some_and(char::is_alphanumeric)
                || next.chars().next().is_some_and(char::is_alphanumeric);
            let call = match inline {
                Inline::Emphasis(children) if glued => {
                    out.push_str(&format!("#emph[{}]", self.render_inlines_in(children, true)));
                    true
                }
                Inline::Strong(children) if glued => {
                    out.push_str(&format!("#strong[{}]", self.render_inlines_in(children, true)));
                    true
                }
                Inline::Strikethrough(_) | Inline::Link(_) | Inline::Image(_) => {
                    out.push_str(markup);
                    true
                }
                _ => {
                    out.push_str(markup);
                    false
                }
            };
            if call && continues_call(next) {
                out.push(';');
            }
        }
        out
    }
}

/// Whether `next` would be read as part of a preceding `#call[..]` expression.
fn continues_call(next: &str) -> bool {
    let mut chars = next.chars();
    match chars.next() {
        Some('(') | Some('[') => true,
        Some('.') => chars.next().is_some_and(|c| c.is_alphabetic()),
        _ => false,
    }
}

fn image_call(image: &Image) -> String {
    let url = quote_string(&image.url);
    if image.alt.is_empty() {
        format!("image({url})")
    } else {
        format!("image({url}, alt: {})", quote_string(&image.alt))
    }
}

fn figure(image: &Image) -> String {
    if image.alt.is_empty() {
        format!("#figure({})", image_call(image))
    } else {
        format!(
            "#figure({}, caption: [{}])",
            image_call(image),
            escape_text(&image.alt)
        )
    }
}

/// Backtick fence longer than any run inside `code`, and at least three long.
fn fence_for(code: &str) -> String {
    "`".repeat((longest_run(code, '`') + 1).max(3))
}

/// Indent every line after the first.
fn continue_lines(text: &str, indent: &str) -> String {
    match text.split_once('\n') {
        Some((first, rest)) => format!("{first}\n{}", indent_lines(rest, indent)),
        None => text.to_string(),
    }
}

/// A Typst string literal.
fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Escape Typst markup characters in running text.
///
/// Line-leading markers (`=`, `+`, `-`, `1.`, `/ `) are escaped only at the start of a line.
pub fn escape_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        let line_start = i == 0 || chars[i - 1] == '\n';
        let next = chars.get(i + 1).copied();
        let escape = match c {
            '#' | '*' | '_' | '`' | '\\' | '<' | '@' | '$' | '[' | ']' | '~' => true,
            '/' if line_start => matches!(next, Some(' ') | Some('\t') | Some('/') | Some('*')),
            '/' => matches!(next, Some('/') | Some('*')),
            '=' | '+' | '-' => line_start,
            '.' => {
                ends_enum_marker(&chars[..i])
                    && matches!(next, None | Some(' ') | Some('\t') | Some('\n'))
            }
            _ => false,
        };
        if escape {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Whether `before` ends in a line that so far holds only digits, e.g. the `12` of `12.`.
fn ends_enum_marker(before: &[char]) -> bool {
    let line = match before.iter().rposition(|c| *c == '\n') {
        Some(newline) => &before[newline + 1..],
        None => before,
    };
    !line.is_empty() && line.iter().all(char::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Inline, TableCell};

    fn typst() -> TypstConverter {
        TypstConverter::default()
    }

    fn render(blocks: Vec<Block>) -> String {
        typst().render(&Document::new(blocks))
    }

    fn para(inlines: Vec<Inline>) -> Block {
        Block::Paragraph(Paragraph::new(inlines))
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_text("a#b*c_d"), "a\\#b\\*c\\_d");
        assert_eq!(escape_text("<x@y>"), "\\<x\\@y>");
        assert_eq!(escape_text("$5 [n]"), "\\$5 \\[n\\]");
        assert_eq!(escape_text("a // b /* c */ d/e"), "a \\// b \\/\\* c \\*/ d/e");
        assert_eq!(escape_text("- item\n= head"), "\\- item\n\\= head");
        assert_eq!(escape_text("a-b = c"), "a-b = c");
    }

    #[test]
    fn escapes_enum_and_term_markers_at_line_start() {
        assert_eq!(escape_text("1. not a list"), "1\\. not a list");
        assert_eq!(escape_text("a\n12.\n/ Term: b"), "a\n12\\.\n\\/ Term: b");
        assert_eq!(escape_text("1.50 and 3. x"), "1.50 and 3. x");
        assert_eq!(escape_text("a/ b\n/path"), "a/ b\n/path");
    }

    #[test]
    fn styles_inside_words_use_function_form() {
        let out = render(vec![para(vec![
            Inline::Strong(vec![Inline::text("foo")]),
            Inline::text("bar and snake"),
            Inline::Emphasis(vec![Inline::text("case")]),
            Inline::text("word, "),
            Inline::Emphasis(vec![Inline::text("free")]),
            Inline::text("."),
        ])]);
        assert_eq!(out, "#strong[foo]bar and snake#emph[case]word, _free_.\n");
    }

    #[test]
    fn calls_followed_by_parentheses_are_terminated() {
        let out = render(vec![para(vec![
            Inline::Strikethrough(vec![Inline::text("a")]),
            Inline::text("(b) "),
            Inline::Link(Link::new("u", vec![Inline::text("c")])),
            Inline::text(".d "),
            Inline::Link(Link::new("u", vec![Inline::text("e")])),
            Inline::text(". f"),
        ])]);
        assert_eq!(
            out,
            "#strike[a];(b) #link(\"u\")[c];.d #link(\"u\")[e]. f\n"
        );
    }

    #[test]
    fn heading_marks_follow_level() {
        assert_eq!(
            render(vec![Block::Heading(Heading::new(3, vec![Inline::text("Deep")]))]),
            "=== Deep\n"
        );
    }

    #[test]
    fn untagged_code_gets_text_language() {
        let converter = typst();
        assert_eq!(converter.code_span("npm install", false), "```text npm install```");
        assert_eq!(
            converter.code_block(&CodeBlock::new("x\n", None)),
            "```text\nx\n```"
        );
    }

    #[test]
    fn fence_grows_past_inner_backticks() {
        assert_eq!(
            typst().code_block(&CodeBlock::new("```\n", Some("md".to_string()))),
            "````md\n```\n````"
        );
    }

    #[test]
    fn inline_styles() {
        let out = render(vec![para(vec![
            Inline::Emphasis(vec![Inline::text("a")]),
            Inline::text(" "),
            Inline::Strong(vec![Inline::text("b")]),
            Inline::text(" "),
            Inline::Strikethrough(vec![Inline::text("c")]),
        ])]);
        assert_eq!(out, "_a_ *b* #strike[c]\n");
    }

    #[test]
    fn nested_list_with_numbers_and_tasks() {
        let nested = List::new(
            true,
            vec![
                ListItem::new(vec![para(vec![Inline::text("one")])]).numbered(3),
                ListItem::new(vec![para(vec![Inline::text("two")])]),
            ],
        );
        let list = List::new(
            false,
            vec![
                ListItem::new(vec![para(vec![Inline::text("top")]), Block::List(nested)]),
                ListItem::new(vec![para(vec![Inline::text("todo")])]).with_task(false),
            ],
        );
        assert_eq!(
            typst().list(&list, 0),
            "- top\n  3. one\n  + two\n- ☐ todo"
        );
    }

    #[test]
    fn multi_line_item_content_is_indented() {
        let list = List::new(
            false,
            vec![ListItem::new(vec![
                para(vec![Inline::text("first\nsecond")]),
                para(vec![Inline::text("more")]),
            ])],
        );
        assert_eq!(typst().list(&list, 0), "- first\n  second\n\n  more");
    }

    #[test]
    fn links_images_and_figures() {
        let converter = typst();
        assert_eq!(
            converter.link(&Link::new("https://x.org", vec![Inline::text("X")])),
            "#link(\"https://x.org\")[X]"
        );
        assert_eq!(
            converter.link(&Link::new("https://x.org", vec![])),
            "#link(\"https://x.org\")"
        );
        assert_eq!(
            converter.image(&Image::new("a.png", "say \"hi\"")),
            "#image(\"a.png\", alt: \"say \\\"hi\\\"\")"
        );
        assert_eq!(
            render(vec![para(vec![Inline::Image(Image::new("a.png", "Cat"))])]),
            "#figure(image(\"a.png\", alt: \"Cat\"), caption: [Cat])\n"
        );
    }

    #[test]
    fn table_with_alignment() {
        let cell = |s: &str| TableCell::new(vec![Inline::text(s)]);
        let table = Table::new(
            vec![Alignment::None, Alignment::Center, Alignment::Right],
            vec![
                TableRow::new(vec![cell("A"), cell("B"), cell("C")]),
                TableRow::new(vec![cell("1"), cell("2"), cell("3")]),
            ],
        )
        .expect("valid table");
        assert_eq!(
            typst().table(&table),
            "#table(\n  columns: 3,\n  align: (auto, center, right),\n  table.header([A], [B], [C]),\n  [1], [2], [3],\n)"
        );
    }

    #[test]
    fn table_without_alignment_omits_align() {
        let table = Table::new(
            vec![Alignment::None],
            vec![TableRow::new(vec![TableCell::new(vec![Inline::text("A")])])],
        )
        .expect("valid table");
        assert_eq!(
            typst().table(&table),
            "#table(\n  columns: 1,\n  table.header([A]),\n)"
        );
    }

    #[test]
    fn quote_break_and_rule() {
        let out = render(vec![
            Block::BlockQuote(BlockQuote::new(vec![para(vec![
                Inline::text("a"),
                Inline::LineBreak,
                Inline::text("b"),
            ])])),
            Block::ThematicBreak,
        ]);
        assert_eq!(out, "#quote(block: true)[\na\\\nb\n]\n\n#line(length: 100%)\n");
    }

    #[test]
    fn empty_document_renders_nothing() {
        assert_eq!(render(vec![]), "");
    }
}
