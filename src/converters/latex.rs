//! LaTeX output
//!
//! Mapping:
//!
//! | node            | LaTeX                                               |
//! |-----------------|-----------------------------------------------------|
//! | Heading 1..3    | `\section` / `\subsection` / `\subsubsection`       |
//! | Heading 4, 5..6 | `\paragraph`, `\subparagraph`                       |
//! | Emphasis        | `\emph{}`                                           |
//! | Strong          | `\textbf{}`                                         |
//! | Strikethrough   | `\sout{}` (ulem)                                    |
//! | CodeSpan        | `\verb`, or `\texttt{}` inside a command argument   |
//! | CodeBlock       | `lstlisting`, `[language=..]` only when tagged      |
//! | BlockQuote      | `quote` environment                                 |
//! | List            | `itemize` / `enumerate`                             |
//! | Table           | `tabular` with booktabs rules                       |
//! | Link            | `\href{url}{text}`, `\url{url}` for empty text      |
//! | Image           | `\includegraphics`, or a `figure` when alone        |
//!
//! Standalone output wraps the body in a preamble loading every package the mapping uses.

use super::{Converter, NodeRenderer};
use crate::ast::{
    Alignment, Block, BlockQuote, CodeBlock, Document, Heading, Image, Link, List, ListItem,
    Paragraph, Table, TableRow,
};
use crate::config::LatexOptions;
use tracing::debug;

const PACKAGES: &[&str] = &[
    "\\usepackage[utf8]{inputenc}",
    "\\usepackage[T1]{fontenc}",
    "\\usepackage{hyperref}",
    "\\usepackage{graphicx}",
    "\\usepackage[normalem]{ulem}",
    "\\usepackage{listings}",
    "\\usepackage{booktabs}",
    "\\usepackage{amssymb}",
];

/// Candidate `\verb` delimiters, in order of preference.
const VERB_DELIMITERS: &[char] = &['|', '!', '+', '@', '=', ':', ';', '/', '"', '\''];

#[derive(Debug, Clone, Default)]
pub struct LatexConverter {
    options: LatexOptions,
}

impl LatexConverter {
    pub fn new(options: LatexOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LatexOptions {
        &self.options
    }

    fn wrap_document(&self, body: &str) -> String {
        let mut out = format!("\\documentclass{{{}}}\n", self.options.document_class);
        for package in PACKAGES {
            out.push_str(package);
            out.push('\n');
        }
        out.push_str("\\begin{document}\n\n");
        if !body.is_empty() {
            out.push_str(body);
            out.push_str("\n\n");
        }
        out.push_str("\\end{document}\n");
        out
    }

    fn list_item(&self, item: &ListItem, depth: usize) -> String {
        let mut out = match item.task {
            Some(true) => "\\item[$\\boxtimes$]",
            Some(false) => "\\item[$\\square$]",
            None => "\\item",
        }
        .to_string();

        for (index, block) in item.children.iter().enumerate() {
            match block {
                Block::Paragraph(paragraph) if index == 0 => {
                    out.push(' ');
                    out.push_str(&self.paragraph(paragraph));
                }
                Block::List(nested) => {
                    out.push('\n');
                    out.push_str(&self.list(nested, depth + 1));
                }
                other => {
                    out.push_str(if index == 0 { "\n" } else { "\n\n" });
                    out.push_str(&self.render_block(other, depth + 1));
                }
            }
        }
        out
    }

    fn table_row(&self, row: &TableRow, header: bool) -> String {
        let cells: Vec<String> = row
            .cells
            .iter()
            .map(|cell| {
                if header {
                    format!("\\textbf{{{}}}", self.render_argument(&cell.children))
                } else {
                    self.render_inlines(&cell.children)
                }
            })
            .collect();
        format!("{} \\\\", cells.join(" & "))
    }
}

impl Converter for LatexConverter {
    fn name(&self) -> &str {
        "latex"
    }

    fn description(&self) -> &str {
        "LaTeX article source"
    }

    fn file_extension(&self) -> &str {
        "tex"
    }

    fn render(&self, doc: &Document) -> String {
        let body = self.render_blocks(&doc.children, 0);
        let out = if self.options.standalone {
            self.wrap_document(&body)
        } else if body.is_empty() {
            String::new()
        } else {
            format!("{body}\n")
        };
        debug!(
            format = "latex",
            standalone = self.options.standalone,
            bytes = out.len(),
            "rendered document"
        );
        out
    }
}

impl NodeRenderer for LatexConverter {
    fn heading(&self, heading: &Heading) -> String {
        let command = match heading.level {
            1 => "section",
            2 => "subsection",
            3 => "subsubsection",
            4 => "paragraph",
            _ => "subparagraph",
        };
        format!("\\{command}{{{}}}", self.render_argument(&heading.children))
    }

    fn paragraph(&self, paragraph: &Paragraph) -> String {
        match paragraph.lone_image() {
            Some(image) => figure(image),
            None => self.render_inlines(&paragraph.children),
        }
    }

    fn code_block(&self, code: &CodeBlock) -> String {
        let mut out = match code.language.as_deref() {
            Some(language) if !language.is_empty() => {
                format!("\\begin{{lstlisting}}[language={language}]\n")
            }
            _ => "\\begin{lstlisting}\n".to_string(),
        };
        out.push_str(&code.code);
        if !code.code.is_empty() && !code.code.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("\\end{lstlisting}");
        out
    }

    fn thematic_break(&self) -> String {
        "\\noindent\\rule{\\linewidth}{0.4pt}".to_string()
    }

    fn block_quote(&self, quote: &BlockQuote, depth: usize) -> String {
        format!(
            "\\begin{{quote}}\n{}\n\\end{{quote}}",
            self.render_blocks(&quote.children, depth)
        )
    }

    fn list(&self, list: &List, depth: usize) -> String {
        let pad = "  ".repeat(depth);
        let environment = if list.ordered { "enumerate" } else { "itemize" };
        let mut lines = vec![format!("{pad}\\begin{{{environment}}}")];
        for item in &list.items {
            lines.push(format!("{pad}  {}", self.list_item(item, depth)));
        }
        lines.push(format!("{pad}\\end{{{environment}}}"));
        lines.join("\n")
    }

    fn table(&self, table: &Table) -> String {
        let columns: String = table
            .alignments()
            .iter()
            .map(|alignment| match alignment {
                Alignment::Center => 'c',
                Alignment::Right => 'r',
                Alignment::Left | Alignment::None => 'l',
            })
            .collect();

        let mut lines = vec![format!("\\begin{{tabular}}{{{columns}}}"), "\\toprule".to_string()];
        if let Some(header) = table.header() {
            lines.push(self.table_row(header, true));
            lines.push("\\midrule".to_string());
        }
        for row in table.body() {
            lines.push(self.table_row(row, false));
        }
        lines.push("\\bottomrule".to_string());
        lines.push("\\end{tabular}".to_string());
        lines.join("\n")
    }

    fn text(&self, text: &str) -> String {
        escape_text(text)
    }

    fn emphasis(&self, inner: &str) -> String {
        format!("\\emph{{{inner}}}")
    }

    fn strong(&self, inner: &str) -> String {
        format!("\\textbf{{{inner}}}")
    }

    fn strikethrough(&self, inner: &str) -> String {
        format!("\\sout{{{inner}}}")
    }

    /// `\verb` cannot appear in another command's argument.
    fn code_span(&self, code: &str, in_argument: bool) -> String {
        let delimiter = VERB_DELIMITERS.iter().find(|d| !code.contains(**d));
        match delimiter {
            Some(delimiter) if !in_argument => format!("\\verb{delimiter}{code}{delimiter}"),
            _ => format!("\\texttt{{{}}}", escape_text(code)),
        }
    }

    fn link(&self, link: &Link) -> String {
        let url = escape_url(&link.url);
        let text = self.render_argument(&link.children);
        if text.is_empty() {
            format!("\\url{{{url}}}")
        } else {
            format!("\\href{{{url}}}{{{text}}}")
        }
    }

    fn image(&self, image: &Image) -> String {
        format!(
            "\\includegraphics[alt={{{}}}]{{{}}}",
            escape_text(&image.alt),
            escape_url(&image.url)
        )
    }

    fn line_break(&self) -> String {
        "\\\\\n".to_string()
    }
}

fn figure(image: &Image) -> String {
    let mut lines = vec![
        "\\begin{figure}[h]".to_string(),
        "  \\centering".to_string(),
        format!(
            "  \\includegraphics[width=\\linewidth]{{{}}}",
            escape_url(&image.url)
        ),
    ];
    if !image.alt.is_empty() {
        lines.push(format!("  \\caption{{{}}}", escape_text(&image.alt)));
    }
    lines.push("\\end{figure}".to_string());
    lines.join("\n")
}

/// Escape LaTeX's reserved characters in running text.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' | '}' | '#' | '$' | '%' | '&' | '_' => {
                out.push('\\');
                out.push(c);
            }
            '^' => out.push_str("\\textasciicircum{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            _ => out.push(c),
        }
    }
    out
}

/// `%` and `#` still need escaping inside `\href`, `\url` and `\includegraphics` arguments.
fn escape_url(url: &str) -> String {
    url.replace('%', "\\%").replace('#', "\\#")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Inline, TableCell};

    fn fragment() -> LatexConverter {
        LatexConverter::new(LatexOptions {
            standalone: false,
            document_class: "article".to_string(),
        })
    }

    fn render(blocks: Vec<Block>) -> String {
        fragment().render(&Document::new(blocks))
    }

    fn para(inlines: Vec<Inline>) -> Block {
        Block::Paragraph(Paragraph::new(inlines))
    }

    #[test]
    fn escapes_every_reserved_character() {
        assert_eq!(
            escape_text("\\{}#$%&_^~"),
            "\\textbackslash{}\\{\\}\\#\\$\\%\\&\\_\\textasciicircum{}\\textasciitilde{}"
        );
        assert_eq!(escape_text("plain text"), "plain text");
    }

    #[test]
    fn heading_levels_map_to_sectioning_commands() {
        let out = render(
            (1..=6)
                .map(|level| Block::Heading(Heading::new(level, vec![Inline::text("T")])))
                .collect(),
        );
        assert_eq!(
            out,
            "\\section{T}\n\n\\subsection{T}\n\n\\subsubsection{T}\n\n\\paragraph{T}\n\n\\subparagraph{T}\n\n\\subparagraph{T}\n"
        );
    }

    #[test]
    fn inline_styles_nest() {
        let out = render(vec![para(vec![Inline::Strong(vec![
            Inline::text("a "),
            Inline::Emphasis(vec![Inline::text("b")]),
            Inline::Strikethrough(vec![Inline::text("c")]),
        ])])]);
        assert_eq!(out, "\\textbf{a \\emph{b}\\sout{c}}\n");
    }

    #[test]
    fn code_span_picks_free_delimiter() {
        let latex = fragment();
        assert_eq!(latex.code_span("a_b", false), "\\verb|a_b|");
        assert_eq!(latex.code_span("a|b", false), "\\verb!a|b!");
    }

    #[test]
    fn code_span_inside_arguments_uses_texttt() {
        let latex = fragment();
        assert_eq!(latex.code_span("a_b", true), "\\texttt{a\\_b}");

        let out = render(vec![
            Block::Heading(Heading::new(1, vec![
                Inline::text("Install "),
                Inline::CodeSpan("npm".to_string()),
            ])),
            para(vec![
                Inline::Strong(vec![
                    Inline::text("run "),
                    Inline::CodeSpan("make".to_string()),
                ]),
                Inline::text(" and "),
                Inline::Link(Link::new("u", vec![Inline::CodeSpan("docs".to_string())])),
                Inline::text(" or "),
                Inline::CodeSpan("ls".to_string()),
            ]),
        ]);
        assert_eq!(
            out,
            "\\section{Install \\texttt{npm}}\n\n\\textbf{run \\texttt{make}} and \\href{u}{\\texttt{docs}} or \\verb|ls|\n"
        );
    }

    #[test]
    fn code_block_is_verbatim() {
        let code = CodeBlock::new("x = {'a': 1}  # 100%\n", Some("python".to_string()));
        assert_eq!(
            fragment().code_block(&code),
            "\\begin{lstlisting}[language=python]\nx = {'a': 1}  # 100%\n\\end{lstlisting}"
        );
        let untagged = CodeBlock::new("plain", None);
        assert_eq!(
            fragment().code_block(&untagged),
            "\\begin{lstlisting}\nplain\n\\end{lstlisting}"
        );
    }

    #[test]
    fn nested_lists_indent_by_depth() {
        let nested = List::new(
            true,
            vec![ListItem::new(vec![para(vec![Inline::text("inner")])]).numbered(1)],
        );
        let list = List::new(
            false,
            vec![
                ListItem::new(vec![para(vec![Inline::text("outer")]), Block::List(nested)]),
                ListItem::new(vec![para(vec![Inline::text("done")])]).with_task(true),
            ],
        );
        assert_eq!(
            fragment().list(&list, 0),
            "\\begin{itemize}\n  \\item outer\n  \\begin{enumerate}\n    \\item inner\n  \\end{enumerate}\n  \\item[$\\boxtimes$] done\n\\end{itemize}"
        );
    }

    #[test]
    fn links_and_images() {
        let latex = fragment();
        assert_eq!(
            latex.link(&Link::new("https://x.org/#a", vec![Inline::text("X")])),
            "\\href{https://x.org/\\#a}{X}"
        );
        assert_eq!(
            latex.link(&Link::new("https://x.org", vec![])),
            "\\url{https://x.org}"
        );
        assert_eq!(
            latex.image(&Image::new("a.png", "A & B")),
            "\\includegraphics[alt={A \\& B}]{a.png}"
        );
    }

    #[test]
    fn image_paths_escape_percent_and_hash() {
        let image = Image::new("img/50%#2.png", "x");
        assert_eq!(
            fragment().image(&image),
            "\\includegraphics[alt={x}]{img/50\\%\\#2.png}"
        );
        assert_eq!(
            figure(&image),
            "\\begin{figure}[h]\n  \\centering\n  \\includegraphics[width=\\linewidth]{img/50\\%\\#2.png}\n  \\caption{x}\n\\end{figure}"
        );
    }

    #[test]
    fn lone_image_becomes_figure() {
        let out = render(vec![para(vec![Inline::Image(Image::new("a.png", "Cat"))])]);
        assert_eq!(
            out,
            "\\begin{figure}[h]\n  \\centering\n  \\includegraphics[width=\\linewidth]{a.png}\n  \\caption{Cat}\n\\end{figure}\n"
        );
    }

    #[test]
    fn table_uses_alignment_spec_and_bold_header() {
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
            fragment().table(&table),
            "\\begin{tabular}{lcr}\n\\toprule\n\\textbf{A} & \\textbf{B} & \\textbf{C} \\\\\n\\midrule\n1 & 2 & 3 \\\\\n\\bottomrule\n\\end{tabular}"
        );
    }

    #[test]
    fn standalone_wraps_body() {
        let out = LatexConverter::default().render(&Document::new(vec![para(vec![
            Inline::text("Hi"),
        ])]));
        assert!(out.starts_with("\\documentclass{article}\n\\usepackage[utf8]{inputenc}\n"));
        assert!(out.ends_with("\\begin{document}\n\nHi\n\n\\end{document}\n"));
    }

    #[test]
    fn empty_documents() {
        assert_eq!(render(vec![]), "");
        assert!(LatexConverter::default()
            .render(&Document::default())
            .ends_with("\\begin{document}\n\n\\end{document}\n"));
    }

    #[test]
    fn line_break_and_quote() {
        let out = render(vec![Block::BlockQuote(BlockQuote::new(vec![para(vec![
            Inline::text("a"),
            Inline::LineBreak,
            Inline::text("b"),
        ])]))]);
        assert_eq!(out, "\\begin{quote}\na\\\\\nb\n\\end{quote}\n");
    }
}
