//! CSV rendering and parsing for tables (RFC 4180 quoting).
//!
//! Parsing only types a cell when rendering the typed value gives back the
//! same text, so a table read from CSV writes back out unchanged.

use std::borrow::Cow;

use anyhow::{Result, bail};

use crate::core::table::{Row, Table, Value, field};

/// Preferred header of the source-index column. See [`index_header`].
pub const INDEX_COLUMN: &str = "index";

/// Header for the source-index column of `table`.
///
/// [`INDEX_COLUMN`], prefixed with underscores until it names no column of
/// the table.
pub fn index_header(table: &Table) -> String {
    let mut header = INDEX_COLUMN.to_string();
    while table.columns().contains(&header) {
        header.insert(0, '_');
    }
    header
}

/// Render `table` as CSV with a header line.
///
/// With `include_index`, the first column holds each row's source index.
pub fn render_table(table: &Table, include_index: bool) -> String {
    let mut out = String::new();

    let mut header: Vec<Cow<'_, str>> = Vec::with_capacity(table.columns().len() + 1);
    if include_index {
        header.push(Cow::Owned(index_header(table)));
    }
    header.extend(table.columns().iter().map(|c| Cow::Borrowed(c.as_str())));
    push_record(&mut out, &header);

    for (position, row) in table.iter() {
        let mut record: Vec<Cow<'_, str>> = Vec::with_capacity(header.len());
        if include_index {
            record.push(Cow::Owned(position.to_string()));
        }
        record.extend(
            table
                .columns()
                .iter()
                .map(|c| Cow::Owned(field(row, c).to_string())),
        );
        push_record(&mut out, &record);
    }
    out
}

fn push_record(out: &mut String, fields: &[Cow<'_, str>]) {
    // A lone empty field would read back as a blank line.
    if fields.len() == 1 && fields[0].is_empty() {
        out.push_str("\"\"\n");
        return;
    }
    for (i, value) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape(value));
    }
    out.push('\n');
}

fn escape(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Parse CSV text whose first record is the header.
///
/// Cells are typed with [`infer_value`]. Short records are padded with
/// nulls; records with more fields than the header are rejected.
pub fn parse_table(input: &str) -> Result<Table> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut records = parse_records(input)?.into_iter();
    let Some(header) = records.next() else {
        return Ok(Table::default());
    };

    let columns: Vec<String> = header.into_iter().map(|c| c.trim().to_string()).collect();
    for (i, column) in columns.iter().enumerate() {
        if columns[..i].contains(column) {
            bail!("duplicate column '{column}' in header");
        }
    }

    let mut rows = Vec::new();
    for (number, record) in records.enumerate() {
        if record.len() > columns.len() {
            bail!(
                "record {} has {} fields but the header has {}",
                number + 1,
                record.len(),
                columns.len()
            );
        }
        let mut row: Row = columns
            .iter()
            .cloned()
            .zip(record.iter().map(|raw| infer_value(raw)))
            .collect();
        for column in &columns[record.len()..] {
            row.insert(column.clone(), Value::Null);
        }
        rows.push(row);
    }
    Ok(Table::new(columns, rows))
}

/// Type a raw cell: empty is null, then integer, float, bool, else text.
///
/// A spelling that would not render back verbatim (`01234`, `+5`, `1.50`,
/// `True`) stays text.
pub fn infer_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Some(value) = raw.parse::<i64>().ok().filter(|v| v.to_string() == raw) {
        return Value::Int(value);
    }
    // Reject spellings such as "NaN" or "inf" that f64 would accept.
    let numeric = raw
        .parse::<f64>()
        .ok()
        .filter(|v| raw.bytes().any(|b| b.is_ascii_digit()) && v.to_string() == raw);
    if let Some(value) = numeric {
        return Value::Float(value);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Text(raw.to_string()),
    }
}

fn parse_records(input: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut quote_line = 0;
    let mut line = 1;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    current.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    current.push(c);
                }
                _ => current.push(c),
            }
            continue;
        }
        match c {
            '"' if current.is_empty() => {
                in_quotes = true;
                quoted = true;
                quote_line = line;
            }
            ',' => record.push(std::mem::take(&mut current)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut current));
                push_non_blank(&mut records, std::mem::take(&mut record), quoted);
                quoted = false;
                line += 1;
            }
            _ => current.push(c),
        }
    }

    if in_quotes {
        bail!("unterminated quoted field starting on line {quote_line}");
    }
    if !current.is_empty() || !record.is_empty() || quoted {
        record.push(current);
        push_non_blank(&mut records, record, quoted);
    }
    Ok(records)
}

/// Skip blank lines; `""` on its own line is a record with one empty field.
fn push_non_blank(records: &mut Vec<Vec<String>>, record: Vec<String>, quoted: bool) {
    if !quoted && record.len() == 1 && record[0].is_empty() {
        return;
    }
    records.push(record);
}
