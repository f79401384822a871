//! CSV export of a comparison table.
//!
//! Cells are quoted only when they contain a comma, a double quote, or a line
//! break; embedded quotes are doubled. [`parse_csv`] reads the same grammar
//! back, so every generated file round-trips.

use chrono::NaiveDate;
use coverlens_compare::{ComparisonTableData, GapWarning};
use tracing::debug;

pub const GAPS_HEADER: &str = "GAPS IDENTIFIED";
pub const CONFLICTS_HEADER: &str = "CONFLICTS IDENTIFIED";

fn needs_quoting(value: &str) -> bool {
    value.contains([',', '"', '\n', '\r'])
}

pub fn escape_csv(value: &str) -> String {
    if needs_quoting(value) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Inverse of [`escape_csv`] for a single cell.
pub fn unescape_csv(cell: &str) -> String {
    match cell.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => inner.replace("\"\"", "\""),
        None => cell.to_string(),
    }
}

fn write_record<'a>(out: &mut String, cells: impl IntoIterator<Item = &'a str>) {
    let line: Vec<String> = cells.into_iter().map(escape_csv).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

fn gap_line(gap: &GapWarning, headers: &[String]) -> String {
    let names: Vec<&str> = gap
        .documents_missing
        .iter()
        .filter_map(|&i| headers.get(i).map(String::as_str))
        .collect();
    format!(
        "{}: Missing in {} ({} severity)",
        gap.field,
        names.join(", "),
        gap.severity.as_str()
    )
}

pub fn generate_csv_content(table: &ComparisonTableData) -> String {
    let mut out = String::new();

    write_record(
        &mut out,
        std::iter::once("Field").chain(table.headers.iter().map(String::as_str)),
    );
    for row in &table.rows {
        write_record(
            &mut out,
            std::iter::once(row.field.as_str()).chain(row.values.iter().map(|v| v.display.as_str())),
        );
    }

    if !table.gaps.is_empty() {
        out.push('\n');
        write_record(&mut out, [GAPS_HEADER]);
        for gap in &table.gaps {
            write_record(&mut out, [gap_line(gap, &table.headers).as_str()]);
        }
    }

    if !table.conflicts.is_empty() {
        out.push('\n');
        write_record(&mut out, [CONFLICTS_HEADER]);
        for conflict in &table.conflicts {
            write_record(&mut out, [conflict.description.as_str()]);
        }
    }

    debug!(
        rows = table.rows.len(),
        gaps = table.gaps.len(),
        conflicts = table.conflicts.len(),
        bytes = out.len(),
        "generated csv"
    );
    out
}

/// Split CSV text into records of unescaped cells.
///
/// Blank lines come back as a record with one empty cell. A trailing newline
/// does not produce an extra record.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    cell.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => cell.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut cell)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut cell));
                records.push(std::mem::take(&mut record));
            }
            _ => cell.push(c),
        }
    }
    if !cell.is_empty() || !record.is_empty() {
        record.push(cell);
        records.push(record);
    }
    records
}

/// `<product>-comparison-YYYY-MM-DD.csv`
pub fn csv_filename(product: &str, date: NaiveDate) -> String {
    format!("{product}-comparison-{}.csv", date.format("%Y-%m-%d"))
}
