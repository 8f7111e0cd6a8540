//! Pipe tables

use super::inlines::parse_inlines;
use crate::ast::{Alignment, Table, TableCell, TableRow};
use crate::error::MalformedTableError;

/// A header line followed by a separator line opens a table.
pub(super) fn starts_table(line: &str, next: Option<&str>) -> bool {
    line.contains('|') && next.and_then(parse_separator).is_some()
}

/// Column alignments of a separator line such as `|---|:---:|---:|`.
///
/// Every cell must consist of `-` and `:` only, with at least one `-`.
pub(super) fn parse_separator(line: &str) -> Option<Vec<Alignment>> {
    if !line.contains('|') {
        return None;
    }
    let cells = split_row(line);
    if cells.is_empty() {
        return None;
    }
    cells.iter().map(|cell| column_alignment(cell)).collect()
}

fn column_alignment(cell: &str) -> Option<Alignment> {
    let valid = !cell.is_empty()
        && cell.contains('-')
        && cell.chars().all(|c| c == '-' || c == ':');
    if !valid {
        return None;
    }
    let alignment = match (cell.starts_with(':'), cell.ends_with(':')) {
        (true, true) => Alignment::Center,
        (true, false) => Alignment::Left,
        (false, true) => Alignment::Right,
        (false, false) => Alignment::None,
    };
    Some(alignment)
}

/// Split a row into trimmed cell strings. One leading and one trailing pipe are optional;
/// `\|` is a literal pipe inside a cell.
pub(super) fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = match inner.strip_suffix('|') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => inner,
    };

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);
    cells.into_iter().map(|cell| cell.trim().to_string()).collect()
}

/// Build a table from its header line, separator line and data rows.
pub(super) fn parse_table(
    header: &str,
    separator: &str,
    rows: &[String],
) -> Result<Table, MalformedTableError> {
    let alignments = parse_separator(separator).unwrap_or_default();
    let rows = std::iter::once(header)
        .chain(rows.iter().map(String::as_str))
        .map(|line| {
            TableRow::new(
                split_row(line)
                    .iter()
                    .map(|cell| TableCell::new(parse_inlines(cell)))
                    .collect(),
            )
        })
        .collect();
    Table::new(alignments, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Inline;
    use rstest::rstest;

    #[rstest]
    #[case("---", Some(Alignment::None))]
    #[case(":---", Some(Alignment::Left))]
    #[case("---:", Some(Alignment::Right))]
    #[case(":---:", Some(Alignment::Center))]
    #[case(":", None)]
    #[case("-x-", None)]
    #[case("", None)]
    fn alignment_from_colons(#[case] cell: &str, #[case] expected: Option<Alignment>) {
        assert_eq!(column_alignment(cell), expected);
    }

    #[test]
    fn separator_needs_a_pipe() {
        assert!(parse_separator("---").is_none());
        assert_eq!(
            parse_separator("---|---"),
            Some(vec![Alignment::None, Alignment::None])
        );
    }

    #[test]
    fn split_row_strips_outer_pipes_and_trims() {
        assert_eq!(split_row("| a | b |"), vec!["a", "b"]);
        assert_eq!(split_row("a | b"), vec!["a", "b"]);
        assert_eq!(split_row("| a | |"), vec!["a", ""]);
    }

    #[test]
    fn escaped_pipe_stays_in_cell() {
        assert_eq!(split_row("| a \\| b | c |"), vec!["a | b", "c"]);
    }

    #[test]
    fn cells_hold_inline_content() {
        let table = parse_table("| *a* |", "|---|", &[]).expect("single column table");
        let header = table.header().expect("header row");
        assert_eq!(
            header.cells[0].children,
            vec![Inline::Emphasis(vec![Inline::text("a")])]
        );
    }

    #[test]
    fn header_width_mismatch_reports_row_zero() {
        let err = parse_table("| a | b | c |", "|---|---|", &[]).unwrap_err();
        assert_eq!(
            err,
            MalformedTableError {
                row: 0,
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn overflowing_data_row_is_rejected() {
        let rows = vec!["| 1 | 2 | 3 |".to_string()];
        let err = parse_table("| a | b |", "|---|---|", &rows).unwrap_err();
        assert_eq!(err.row, 1);
        assert_eq!(err.actual, 3);
    }
}
