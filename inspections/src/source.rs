//! Source table loading.
//!
//! The raw archive is extracted outside this tool; here a CSV (or a JSON
//! array of row objects, as written by the JSON artifact format) becomes a
//! [`Table`].

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chain::io::csv::parse_table;
use chain::{Row, Table};
use tracing::debug;

/// Load a table, choosing the decoder from the file extension.
pub fn load_table(path: &Path) -> Result<Table> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let decode: fn(&str) -> Result<Table> = match extension.as_deref() {
        Some("csv") | None => parse_table,
        Some("json") => parse_json_rows,
        Some(other) => bail!("unsupported input format '.{other}' for {}", path.display()),
    };
    let contents =
        fs::read_to_string(path).with_context(|| format!("read input {}", path.display()))?;
    let table = decode(&contents).with_context(|| format!("parse input {}", path.display()))?;
    debug!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns().len(),
        "input loaded"
    );
    Ok(table)
}

/// Decode a JSON array of row objects; columns are the union of keys.
fn parse_json_rows(contents: &str) -> Result<Table> {
    let rows: Vec<Row> = serde_json::from_str(contents)?;
    let mut columns: Vec<String> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    Ok(Table::new(columns, rows))
}
