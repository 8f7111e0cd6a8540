//! Block segmentation
//!
//! Lines are consumed top to bottom. At each non-blank line the openers are tried in a fixed
//! order; the first that matches consumes as many lines as belong to it. List items and
//! blockquotes strip their markers and recurse on the remaining lines.

use super::inlines::parse_inlines;
use super::table::{parse_table, starts_table};
use crate::ast::{Block, BlockQuote, CodeBlock, Heading, List, ListItem, Node, Paragraph};
use crate::error::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

static FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^( {0,3})(`{3,})[ \t]*(.*)$").expect("fence pattern is valid")
});

static ATX_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ {0,3}(#{1,6})[ \t]+(.*)$").expect("heading pattern is valid")
});

static LIST_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^( *)([-*+]|\d{1,9}[.)])([ \t]+|$)").expect("list marker pattern is valid")
});

static BLOCKQUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}> ?").expect("blockquote pattern is valid"));

/// Segment lines into blocks.
pub(super) fn parse_blocks(lines: &[String]) -> Result<Vec<Block>, ParseError> {
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].as_str();
        if is_blank(line) {
            i += 1;
            continue;
        }

        let start = i;
        if let Some(fence) = Fence::open(line) {
            let (block, next) = fence.collect(lines, i + 1);
            blocks.push(block);
            i = next;
        } else if is_thematic_break(line) {
            blocks.push(Block::ThematicBreak);
            i += 1;
        } else if let Some(heading) = parse_heading(line) {
            blocks.push(heading);
            i += 1;
        } else if starts_table(line, lines.get(i + 1).map(String::as_str)) {
            let end = next_blank(lines, i + 2);
            let table = parse_table(line, &lines[i + 1], &lines[i + 2..end])?;
            blocks.push(Block::Table(table));
            i = end;
        } else if let Some(marker) = ListMarker::parse(line) {
            let (list, next) = parse_list(lines, i, marker)?;
            blocks.push(list);
            i = next;
        } else if BLOCKQUOTE.is_match(line) {
            let (quote, next) = parse_blockquote(lines, i)?;
            blocks.push(quote);
            i = next;
        } else {
            let (paragraph, next) = parse_paragraph(lines, i);
            blocks.push(paragraph);
            i = next;
        }

        if let Some(block) = blocks.last() {
            trace!(line = start, kind = %Node::from(block).kind(), "classified block");
        }
    }

    Ok(blocks)
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn indent(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Remove up to `width` leading spaces.
fn dedent(line: &str, width: usize) -> String {
    line[indent(line).min(width)..].to_string()
}

fn next_blank(lines: &[String], from: usize) -> usize {
    (from..lines.len())
        .find(|&j| is_blank(&lines[j]))
        .unwrap_or(lines.len())
}

fn next_non_blank(lines: &[String], from: usize) -> Option<usize> {
    (from..lines.len()).find(|&j| !is_blank(&lines[j]))
}

/// True when `line` opens any block other than a paragraph.
fn interrupts_paragraph(lines: &[String], index: usize) -> bool {
    let line = lines[index].as_str();
    is_blank(line)
        || Fence::open(line).is_some()
        || is_thematic_break(line)
        || ATX_HEADING.is_match(line)
        || starts_table(line, lines.get(index + 1).map(String::as_str))
        || ListMarker::parse(line).is_some()
        || BLOCKQUOTE.is_match(line)
}

/// Three or more of the same `-`, `*` or `_`, optionally separated by spaces.
fn is_thematic_break(line: &str) -> bool {
    if indent(line) > 3 {
        return false;
    }
    let mut marks = line.chars().filter(|c| !c.is_whitespace());
    let Some(first) = marks.next() else {
        return false;
    };
    if !matches!(first, '-' | '*' | '_') {
        return false;
    }
    let mut count = 1;
    for c in marks {
        if c != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

fn parse_heading(line: &str) -> Option<Block> {
    let caps = ATX_HEADING.captures(line)?;
    let level = caps.get(1).map_or(1, |m| m.as_str().len());
    let content = caps.get(2).map_or("", |m| m.as_str());
    let title = strip_closing_hashes(content);
    Some(Block::Heading(Heading::new(level, parse_inlines(title))))
}

/// `## Title ##` -> `Title`. Hashes glued to the text (`C#`) are kept.
fn strip_closing_hashes(content: &str) -> &str {
    let content = content.trim();
    let without = content.trim_end_matches('#');
    if without.len() == content.len() {
        return content;
    }
    if without.is_empty() {
        ""
    } else if without.ends_with([' ', '\t']) {
        without.trim_end()
    } else {
        content
    }
}

struct Fence {
    indent: usize,
    width: usize,
    language: Option<String>,
}

impl Fence {
    fn open(line: &str) -> Option<Self> {
        let caps = FENCE.captures(line)?;
        let info = caps.get(3).map_or("", |m| m.as_str()).trim();
        Some(Self {
            indent: caps.get(1).map_or(0, |m| m.as_str().len()),
            width: caps.get(2).map_or(3, |m| m.as_str().len()),
            language: info.split_whitespace().next().map(str::to_string),
        })
    }

    fn closes(&self, line: &str) -> bool {
        let trimmed = line.trim();
        indent(line) <= 3
            && trimmed.len() >= self.width
            && trimmed.chars().all(|c| c == '`')
    }

    /// Gather content lines up to the closing fence, or to end of input when none follows.
    fn collect(self, lines: &[String], start: usize) -> (Block, usize) {
        let mut code = String::new();
        let mut i = start;
        while i < lines.len() {
            if self.closes(&lines[i]) {
                i += 1;
                break;
            }
            code.push_str(&dedent(&lines[i], self.indent));
            code.push('\n');
            i += 1;
        }
        (Block::CodeBlock(CodeBlock::new(code, self.language)), i)
    }
}

fn parse_paragraph(lines: &[String], start: usize) -> (Block, usize) {
    let mut text = lines[start].trim_start().to_string();
    let mut i = start + 1;
    while i < lines.len() && !interrupts_paragraph(lines, i) {
        text.push('\n');
        text.push_str(lines[i].trim_start());
        i += 1;
    }
    let text = text.trim_end();
    (Block::Paragraph(Paragraph::new(parse_inlines(text))), i)
}

fn parse_blockquote(lines: &[String], start: usize) -> Result<(Block, usize), ParseError> {
    let mut inner: Vec<String> = Vec::new();
    let mut i = start;
    while i < lines.len() {
        let line = lines[i].as_str();
        if let Some(m) = BLOCKQUOTE.find(line) {
            inner.push(line[m.end()..].to_string());
        } else if lazy_continuation(&inner, lines, i) {
            inner.push(line.to_string());
        } else {
            break;
        }
        i += 1;
    }
    let children = parse_blocks(&inner)?;
    Ok((Block::BlockQuote(BlockQuote::new(children)), i))
}

/// A plain line right after paragraph text continues that paragraph even without its marker.
fn lazy_continuation(collected: &[String], lines: &[String], index: usize) -> bool {
    let after_text = collected
        .last()
        .map_or(false, |last| !is_blank(last) && Fence::open(last).is_none());
    after_text && !interrupts_paragraph(lines, index)
}

#[derive(Debug, Clone, Copy)]
struct ListMarker {
    indent: usize,
    ordered: bool,
    number: Option<u64>,
    /// Column where item content starts.
    content_offset: usize,
}

impl ListMarker {
    fn parse(line: &str) -> Option<Self> {
        let caps = LIST_MARKER.captures(line)?;
        let indent = caps.get(1).map_or(0, |m| m.as_str().len());
        let marker = caps.get(2).map_or("", |m| m.as_str());
        let spacing = caps.get(3).map_or(0, |m| m.as_str().len());
        let ordered = marker.ends_with(['.', ')']);
        let number = if ordered {
            marker[..marker.len() - 1].parse().ok()
        } else {
            None
        };
        Some(Self {
            indent,
            ordered,
            number,
            content_offset: indent + marker.len() + spacing.max(1),
        })
    }

    fn continues(&self, other: &ListMarker) -> bool {
        other.indent == self.indent && other.ordered == self.ordered
    }
}

/// Consume one list: consecutive items of the same kind at the same indentation.
fn parse_list(
    lines: &[String],
    start: usize,
    first: ListMarker,
) -> Result<(Block, usize), ParseError> {
    let mut items = Vec::new();
    let mut i = start;

    while i < lines.len() {
        let Some(marker) = ListMarker::parse(&lines[i]) else {
            break;
        };
        if !first.continues(&marker) || is_thematic_break(&lines[i]) {
            break;
        }

        let (item, next) = parse_list_item(lines, i, marker)?;
        items.push(item);
        i = next;

        // Blank lines between siblings keep the list open.
        if i < lines.len() && is_blank(&lines[i]) {
            match next_non_blank(lines, i) {
                Some(j) if ListMarker::parse(&lines[j]).is_some_and(|m| first.continues(&m)) => {
                    i = j
                }
                _ => break,
            }
        }
    }

    Ok((Block::List(List::new(first.ordered, items)), i))
}

fn parse_list_item(
    lines: &[String],
    start: usize,
    marker: ListMarker,
) -> Result<(ListItem, usize), ParseError> {
    let first_line = lines[start].get(marker.content_offset..).unwrap_or("");
    let (task, first_line) = split_task(first_line);
    let mut body = vec![first_line.to_string()];
    let mut i = start + 1;

    while i < lines.len() {
        let line = lines[i].as_str();
        if is_blank(line) {
            // Blanks belong to the item only when indented content follows.
            match next_non_blank(lines, i) {
                Some(j) if indent(&lines[j]) > marker.indent => {
                    body.extend((i..j).map(|_| String::new()));
                    i = j;
                }
                _ => break,
            }
        } else if indent(line) > marker.indent {
            body.push(dedent(line, marker.content_offset));
            i += 1;
        } else if lazy_continuation(&body, lines, i) {
            body.push(line.trim_start().to_string());
            i += 1;
        } else {
            break;
        }
    }

    let mut item = ListItem::new(parse_blocks(&body)?);
    if let Some(number) = marker.number {
        item = item.numbered(number);
    }
    if let Some(checked) = task {
        item = item.with_task(checked);
    }
    Ok((item, i))
}

/// `[ ] rest` / `[x] rest` -> task state and the rest of the line.
fn split_task(line: &str) -> (Option<bool>, &str) {
    let state = match line.get(..3) {
        Some("[ ]") => false,
        Some("[x]") | Some("[X]") => true,
        _ => return (None, line),
    };
    match &line[3..] {
        "" => (Some(state), ""),
        rest if rest.starts_with([' ', '\t']) => (Some(state), rest.trim_start()),
        _ => (None, line),
    }
}
