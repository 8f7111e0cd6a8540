//! Inline scanner
//!
//!     Text inside a paragraph, heading, table cell or link label is scanned left to right.
//!     At each position the scanner tries, in order: backslash escape, code span, image,
//!     link, a `*`/`_`/`~` delimiter run, a newline. Anything else is accumulated as text.
//!     Link labels are scanned with link recognition off, so a link never contains another.
//!
//!     Emphasis, strong and strikethrough use a frame stack. An opening delimiter pushes a
//!     frame; a closing delimiter pops the nearest open frame opened with the same character
//!     ("greedy-nearest"). Frames opened above it that never closed fall back to literal text.
//!     A frame of a kind already open is refused, so `*a *b* c*` keeps the inner stars as
//!     text. Frames still open at end of input unwind to literal text as well.

use crate::ast::{Image, Inline, Link};
use std::collections::HashMap;

/// Parse inline content from a raw string.
pub fn parse_inlines(text: &str) -> Vec<Inline> {
    InlineParser::new(text).run()
}

/// Flatten inline content to its visible characters (used for image alt text).
pub(crate) fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    collect_plain(inlines, &mut out);
    out
}

fn collect_plain(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(text) | Inline::CodeSpan(text) => out.push_str(text),
            Inline::Emphasis(children)
            | Inline::Strong(children)
            | Inline::Strikethrough(children) => collect_plain(children, out),
            Inline::Link(link) => collect_plain(&link.children, out),
            Inline::Image(image) => out.push_str(&image.alt),
            Inline::LineBreak => out.push(' '),
        }
    }
}

struct InlineParser {
    chars: Vec<char>,
    pos: usize,
    root: InlineFrame,
    open: Vec<InlineFrame>,
    blocked: BlockedClosings,
    links: bool,
}

impl InlineParser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            root: InlineFrame::new(FrameKind::Root, ' '),
            open: Vec::new(),
            blocked: BlockedClosings::default(),
            links: true,
        }
    }

    /// Treat `[` as literal text. Images are still recognised.
    fn without_links(mut self) -> Self {
        self.links = false;
        self
    }

    fn run(mut self) -> Vec<Inline> {
        while self.pos < self.chars.len() {
            let ch = self.chars[self.pos];
            let consumed = match ch {
                '\\' => self.escape(),
                '`' => self.code_span(),
                '!' if self.peek(1) == Some('[') => self.image(),
                '[' if self.links => self.link(),
                '*' | '_' | '~' => self.delimiter_run(ch),
                '\n' => self.newline(),
                _ => false,
            };
            if !consumed {
                self.top().push_char(ch);
                self.pos += 1;
            }
        }

        self.unwind_to(0);
        self.root.flush_buffer();
        self.root.children
    }

    fn top(&mut self) -> &mut InlineFrame {
        match self.open.last_mut() {
            Some(frame) => frame,
            None => &mut self.root,
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn run_length(&self, start: usize, ch: char) -> usize {
        self.chars[start..].iter().take_while(|c| **c == ch).count()
    }

    fn escape(&mut self) -> bool {
        match self.peek(1) {
            Some('\n') => {
                self.top().push_line_break();
                self.pos += 2;
                true
            }
            Some(next) if next.is_ascii_punctuation() => {
                self.top().push_char(next);
                self.pos += 2;
                true
            }
            _ => false,
        }
    }

    /// Two or more trailing spaces make a hard break; otherwise the newline stays in the text.
    fn newline(&mut self) -> bool {
        let frame = self.top();
        let kept = frame.buffer.trim_end_matches(' ').len();
        let trailing = frame.buffer.len() - kept;
        frame.buffer.truncate(kept);
        if trailing >= 2 {
            frame.push_node(Inline::LineBreak);
        } else {
            frame.push_char('\n');
        }
        self.pos += 1;
        true
    }

    /// A run of n backticks closes at the next run of exactly n backticks.
    fn code_span(&mut self) -> bool {
        let run = self.run_length(self.pos, '`');
        let start = self.pos + run;
        let mut j = start;
        while j < self.chars.len() {
            if self.chars[j] != '`' {
                j += 1;
                continue;
            }
            let closing = self.run_length(j, '`');
            if closing == run {
                let raw: String = self.chars[start..j]
                    .iter()
                    .map(|c| if *c == '\n' { ' ' } else { *c })
                    .collect();
                self.top().push_node(Inline::CodeSpan(strip_code_padding(raw)));
                self.pos = j + closing;
                return true;
            }
            j += closing;
        }

        let frame = self.top();
        for _ in 0..run {
            frame.push_char('`');
        }
        self.pos += run;
        true
    }

    fn link(&mut self) -> bool {
        let label_start = self.pos + 1;
        let Some((label_end, url, after)) = self.link_parts(label_start) else {
            return false;
        };
        let label: String = self.chars[label_start..label_end].iter().collect();
        let children = InlineParser::new(&label).without_links().run();
        self.top().push_node(Inline::Link(Link::new(url, children)));
        self.pos = after;
        true
    }

    fn image(&mut self) -> bool {
        let alt_start = self.pos + 2;
        let Some((alt_end, url, after)) = self.link_parts(alt_start) else {
            return false;
        };
        let alt: String = self.chars[alt_start..alt_end].iter().collect();
        let alt = plain_text(&parse_inlines(&alt));
        self.top().push_node(Inline::Image(Image::new(url, alt)));
        self.pos = after;
        true
    }

    /// Scan `label](destination)` starting just after the opening bracket. Returns the label
    /// end index, the destination and the index after the closing parenthesis.
    fn link_parts(&self, label_start: usize) -> Option<(usize, String, usize)> {
        let label_end = matching_close(&self.chars, label_start, '[', ']')?;
        if self.chars.get(label_end + 1) != Some(&'(') {
            return None;
        }
        let dest_start = label_end + 2;
        let dest_end = matching_close(&self.chars, dest_start, '(', ')')?;
        let inner: String = self.chars[dest_start..dest_end].iter().collect();
        Some((label_end, link_destination(&inner), dest_end + 1))
    }

    fn delimiter_run(&mut self, ch: char) -> bool {
        let run = self.run_length(self.pos, ch);
        let prev = self.pos.checked_sub(1).map(|p| self.chars[p]);
        let next = self.chars.get(self.pos + run).copied();
        let mut remaining = run;

        if can_close(prev, next, ch) {
            while remaining > 0 {
                let Some(index) = self.closable_frame(ch, remaining) else {
                    break;
                };
                let kind = self.open[index].kind;
                let width = kind.width();
                if self.blocked.consume(kind, ch) {
                    // Pairs with an opener that was refused as same-kind nesting.
                    self.top().push_delimiter(ch, width);
                } else {
                    self.unwind_to(index + 1);
                    self.close_top();
                }
                remaining -= width;
            }
        }

        if remaining > 0 && can_open(prev, next, ch) {
            while let Some(kind) = FrameKind::opened_by(ch, remaining) {
                let width = kind.width();
                if self.open.iter().any(|frame| frame.kind == kind) {
                    self.blocked.increment(kind, ch);
                    self.top().push_delimiter(ch, width);
                } else {
                    self.top().flush_buffer();
                    self.open.push(InlineFrame::new(kind, ch));
                }
                remaining -= width;
            }
        }

        self.top().push_delimiter(ch, remaining);
        self.pos += run;
        true
    }

    /// Nearest open frame that `ch` can close with at most `available` delimiter characters.
    fn closable_frame(&self, ch: char, available: usize) -> Option<usize> {
        self.open
            .iter()
            .rposition(|frame| frame.delimiter == ch && frame.kind.width() <= available)
    }

    fn close_top(&mut self) {
        let Some(mut frame) = self.open.pop() else {
            return;
        };
        frame.flush_buffer();
        if frame.has_content() {
            let node = frame.into_node();
            self.top().push_node(node);
        } else {
            // No content: both delimiters stay literal.
            let width = frame.kind.width();
            self.top().push_delimiter(frame.delimiter, width * 2);
        }
    }

    /// Pop frames until `depth` remain, turning each back into its literal delimiter and text.
    fn unwind_to(&mut self, depth: usize) {
        while self.open.len() > depth {
            let Some(mut frame) = self.open.pop() else {
                break;
            };
            frame.flush_buffer();
            let parent = self.top();
            parent.push_delimiter(frame.delimiter, frame.kind.width());
            for child in frame.children {
                parent.push_node(child);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FrameKind {
    Root,
    Emphasis,
    Strong,
    Strikethrough,
}

impl FrameKind {
    /// Widest frame a run of `available` copies of `ch` can open.
    fn opened_by(ch: char, available: usize) -> Option<Self> {
        match (ch, available) {
            (_, 0) => None,
            ('~', 1) => None,
            ('~', _) => Some(FrameKind::Strikethrough),
            ('*' | '_', 1) => Some(FrameKind::Emphasis),
            ('*' | '_', _) => Some(FrameKind::Strong),
            _ => None,
        }
    }

    fn width(self) -> usize {
        match self {
            FrameKind::Root => 0,
            FrameKind::Emphasis => 1,
            FrameKind::Strong | FrameKind::Strikethrough => 2,
        }
    }
}

struct InlineFrame {
    kind: FrameKind,
    delimiter: char,
    buffer: String,
    children: Vec<Inline>,
}

impl InlineFrame {
    fn new(kind: FrameKind, delimiter: char) -> Self {
        Self {
            kind,
            delimiter,
            buffer: String::new(),
            children: Vec::new(),
        }
    }

    fn has_content(&self) -> bool {
        !self.buffer.is_empty() || !self.children.is_empty()
    }

    fn push_char(&mut self, ch: char) {
        self.buffer.push(ch);
    }

    fn push_delimiter(&mut self, ch: char, count: usize) {
        for _ in 0..count {
            self.buffer.push(ch);
        }
    }

    fn push_line_break(&mut self) {
        let kept = self.buffer.trim_end_matches(' ').len();
        self.buffer.truncate(kept);
        self.push_node(Inline::LineBreak);
    }

    fn flush_buffer(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.buffer);
        if let Some(Inline::Text(existing)) = self.children.last_mut() {
            existing.push_str(&text);
        } else {
            self.children.push(Inline::Text(text));
        }
    }

    fn push_node(&mut self, node: Inline) {
        self.flush_buffer();
        match node {
            Inline::Text(text) => {
                if text.is_empty() {
                    return;
                }
                if let Some(Inline::Text(existing)) = self.children.last_mut() {
                    existing.push_str(&text);
                } else {
                    self.children.push(Inline::Text(text));
                }
            }
            other => self.children.push(other),
        }
    }

    fn into_node(self) -> Inline {
        match self.kind {
            FrameKind::Emphasis => Inline::Emphasis(self.children),
            FrameKind::Strong => Inline::Strong(self.children),
            FrameKind::Strikethrough => Inline::Strikethrough(self.children),
            // The root frame is never pushed onto the open stack.
            FrameKind::Root => Inline::Text(plain_text(&self.children)),
        }
    }
}

/// Closing delimiters that pair with an opener refused as same-kind nesting.
#[derive(Default)]
struct BlockedClosings {
    counts: HashMap<(FrameKind, char), usize>,
}

impl BlockedClosings {
    fn increment(&mut self, kind: FrameKind, ch: char) {
        *self.counts.entry((kind, ch)).or_insert(0) += 1;
    }

    fn consume(&mut self, kind: FrameKind, ch: char) -> bool {
        match self.counts.get_mut(&(kind, ch)) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}

fn can_open(prev: Option<char>, next: Option<char>, ch: char) -> bool {
    let followed = matches!(next, Some(c) if !c.is_whitespace());
    followed && (ch != '_' || !is_word(prev))
}

fn can_close(prev: Option<char>, next: Option<char>, ch: char) -> bool {
    let preceded = matches!(prev, Some(c) if !c.is_whitespace());
    preceded && (ch != '_' || !is_word(next))
}

fn is_word(ch: Option<char>) -> bool {
    ch.map(|c| c.is_alphanumeric()).unwrap_or(false)
}

/// Index of the bracket closing the one just before `start`, honouring nesting and escapes.
fn matching_close(chars: &[char], start: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 1usize;
    let mut j = start;
    while j < chars.len() {
        let c = chars[j];
        if c == '\\' {
            j += 2;
            continue;
        }
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(j);
            }
        }
        j += 1;
    }
    None
}

/// `<url>` keeps everything between the angle brackets; otherwise the first token is the URL
/// and any title after it is dropped.
fn link_destination(inner: &str) -> String {
    let trimmed = inner.trim();
    if let Some(rest) = trimmed.strip_prefix('<') {
        if let Some(end) = rest.find('>') {
            return rest[..end].to_string();
        }
    }
    trimmed.split_whitespace().next().unwrap_or("").to_string()
}

fn strip_code_padding(raw: String) -> String {
    let padded = raw.len() >= 2 && raw.starts_with(' ') && raw.ends_with(' ');
    if padded && !raw.trim().is_empty() {
        raw[1..raw.len() - 1].to_string()
    } else {
        raw
    }
}
