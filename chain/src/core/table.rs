//! In-memory tabular data threaded through an assertion chain.
//!
//! A [`Table`] is treated as a value: filtering and repairing rows produce a
//! new table and leave the input untouched. Every row keeps the index it had
//! in the source table so artifacts can point back at the original records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

static NULL: Value = Value::Null;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view of the cell; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// One record: column name to cell.
pub type Row = BTreeMap<String, Value>;

/// One entry per row; `true` means the row satisfies a predicate.
pub type Mask = Vec<bool>;

/// Read a cell, treating a missing column as null.
pub fn field<'a>(row: &'a Row, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&NULL)
}

/// Ordered rows sharing one column set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    index: Vec<usize>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table whose row index is the row position.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let index = (0..rows.len()).collect();
        Self {
            columns,
            index,
            rows,
        }
    }

    /// Build a table from positional records, one value per column.
    pub fn from_records<C, R, V>(columns: C, records: R) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator,
        R::Item: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let rows = records
            .into_iter()
            .map(|record| {
                columns
                    .iter()
                    .cloned()
                    .zip(record.into_iter().map(Into::into))
                    .collect::<Row>()
            })
            .collect();
        Self::new(columns, rows)
    }

    pub(crate) fn from_parts(columns: Vec<String>, index: Vec<usize>, rows: Vec<Row>) -> Self {
        debug_assert_eq!(index.len(), rows.len());
        Self {
            columns,
            index,
            rows,
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<usize>, Vec<Row>) {
        (self.columns, self.index, self.rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Source positions of the rows, parallel to [`Table::rows`].
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate `(source index, row)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Row)> {
        self.index.iter().copied().zip(self.rows.iter())
    }

    /// Cells of one column in row order; missing cells read as null.
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows.iter().map(move |row| field(row, name))
    }

    /// Copy the rows whose mask entry equals `keep`, preserving order and index.
    ///
    /// `mask` must have one entry per row; the engine checks predicate masks
    /// before filtering.
    pub(crate) fn filter(&self, mask: &[bool], keep: bool) -> Table {
        debug_assert_eq!(mask.len(), self.len(), "mask length must match row count");
        let mut index = Vec::new();
        let mut rows = Vec::new();
        for ((position, row), valid) in self.iter().zip(mask) {
            if *valid == keep {
                index.push(position);
                rows.push(row.clone());
            }
        }
        Table::from_parts(self.columns.clone(), index, rows)
    }

    /// Rewrite every row, keeping its index.
    pub fn map_rows<F: FnMut(Row) -> Row>(self, f: F) -> Table {
        let rows = self.rows.into_iter().map(f).collect();
        Table::from_parts(self.columns, self.index, rows)
    }
}
