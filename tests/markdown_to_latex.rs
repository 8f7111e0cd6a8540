//! End-to-end tests (Markdown → LaTeX)

use markconv::config::LatexOptions;
use markconv::converters::LatexConverter;
use markconv::{convert, parse, Converter};
use rstest::rstest;
use std::path::PathBuf;

fn fixture(relative: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(relative);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {e}", path.display()))
}

fn fragment(source: &str) -> String {
    let doc = parse(source, "markdown").expect("source should parse");
    LatexConverter::new(LatexOptions {
        standalone: false,
        document_class: "article".to_string(),
    })
    .render(&doc)
}

#[rstest]
#[case("basic")]
#[case("table")]
#[case("code")]
#[case("lists")]
#[case("quote_links")]
#[case("escaping")]
fn test_fixture_matches_expected(#[case] name: &str) {
    let source = fixture(&format!("source/{name}.md"));
    let expected = fixture(&format!("expected/latex/{name}.tex"));

    let latex = convert(&source, "markdown", "latex").expect("conversion should succeed");
    assert_eq!(latex, expected, "LaTeX output for {name}.md drifted");
}

#[test]
fn test_heading_and_emphasis() {
    let latex = convert("# Title\n\nHello *world*.", "markdown", "latex").unwrap();

    assert!(latex.contains("\\section{Title}"));
    assert!(latex.contains("Hello \\emph{world}."));
    let section = latex.find("\\section{Title}").unwrap();
    let paragraph = latex.find("Hello \\emph{world}.").unwrap();
    assert!(section < paragraph);
}

#[test]
fn test_python_block_is_verbatim() {
    let body = "def f(x):\n    return x ** 2  # {50%} & $_\n";
    let source = format!("```python\n{body}```\n");

    let latex = fragment(&source);

    assert_eq!(
        latex,
        format!("\\begin{{lstlisting}}[language=python]\n{body}\\end{{lstlisting}}\n")
    );
}

#[test]
fn test_untagged_block_uses_plain_listing() {
    let latex = fragment("```\nraw\n```");
    assert_eq!(latex, "\\begin{lstlisting}\nraw\n\\end{lstlisting}\n");
}

#[test]
fn test_table_header_is_bold() {
    let latex = fragment("| A | B | C |\n|---|:---:|---:|\n| 1 | 2 | 3 |\n| 4 | 5 | 6 |");

    assert!(latex.starts_with("\\begin{tabular}{lcr}\n"));
    assert!(latex.contains("\\textbf{A} & \\textbf{B} & \\textbf{C} \\\\"));
    assert!(latex.contains("4 & 5 & 6 \\\\"));
}

#[test]
fn test_strikethrough_and_nested_styles() {
    let latex = fragment("**bold ~~gone~~** and ***both***");
    assert_eq!(
        latex,
        "\\textbf{bold \\sout{gone}} and \\textbf{\\emph{both}}\n"
    );
}

#[test]
fn test_inline_image_keeps_alt_text() {
    let latex = fragment("See ![a & b](pic.png) here");
    assert_eq!(latex, "See \\includegraphics[alt={a \\& b}]{pic.png} here\n");
}

#[test]
fn test_image_path_escapes_percent_and_hash() {
    let latex = fragment("Chart ![q](plots/50%#1.png)");
    assert_eq!(latex, "Chart \\includegraphics[alt={q}]{plots/50\\%\\#1.png}\n");
}

#[rstest]
#[case("# Install `npm`", "\\section{Install \\texttt{npm}}\n")]
#[case(
    "**run `make`** and [`docs`](u)",
    "\\textbf{run \\texttt{make}} and \\href{u}{\\texttt{docs}}\n"
)]
#[case(
    "| `a_b` |\n|---|\n| `c` |",
    "\\begin{tabular}{l}\n\\toprule\n\\textbf{\\texttt{a\\_b}} \\\\\n\\midrule\n\\verb|c| \\\\\n\\bottomrule\n\\end{tabular}\n"
)]
fn test_code_span_inside_command_argument_avoids_verb(
    #[case] source: &str,
    #[case] expected: &str,
) {
    assert_eq!(fragment(source), expected);
}

#[test]
fn test_nested_link_stays_text() {
    assert_eq!(fragment("[a [b](c) d](e)"), "\\href{e}{a [b](c) d}\n");
}

#[test]
fn test_fragment_of_empty_source_is_empty() {
    assert_eq!(fragment(""), "");
    assert_eq!(fragment("\n\n   \n"), "");
}

#[test]
fn test_standalone_wraps_in_document() {
    let latex = convert("text", "md", "TEX").unwrap();

    assert!(latex.starts_with("\\documentclass{article}\n"));
    assert!(latex.contains("\\begin{document}\n\ntext\n\n\\end{document}\n"));
}
