//! Core data model for the conversion pipeline.
//!
//! The pipeline reads supported formats into an in-memory [`Table`], whose shape is described by a
//! [`Schema`] (an ordered list of named, typed [`Column`]s). Every row holds exactly one
//! [`Value`] per column.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult};

/// Date formats accepted when parsing textual cells into [`Value::Date`].
pub(crate) const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y"];

/// Logical data type of a [`Column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// UTF-8 text.
    Text,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit floating point number.
    Float,
    /// Boolean.
    Bool,
    /// Calendar date (no time component).
    Date,
}

/// A single named, typed column in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within its schema.
    pub name: String,
    /// Declared or inferred data type.
    pub data_type: DataType,
}

impl Column {
    /// Create a new column.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of columns describing the shape of a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Ordered list of columns.
    pub columns: Vec<Column>,
}

impl Schema {
    /// Create a new schema from columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Iterate column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A single typed cell value in a [`Table`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// UTF-8 text.
    Text(String),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Calendar date.
    Date(NaiveDate),
}

impl Value {
    /// The [`DataType`] this value belongs to, or `None` for [`Value::Null`].
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Text(_) => Some(DataType::Text),
            Value::Integer(_) => Some(DataType::Integer),
            Value::Float(_) => Some(DataType::Float),
            Value::Bool(_) => Some(DataType::Bool),
            Value::Date(_) => Some(DataType::Date),
        }
    }

    /// True for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Canonical display form, used for CSV output and key normalization.
    ///
    /// Nulls render as the empty string, dates as `%Y-%m-%d`, floats in Rust's shortest form.
    pub fn display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    /// Numeric view of a value, used by numeric filters and reductions.
    ///
    /// Text is trimmed and parsed; non-numeric values yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Parse a raw textual cell into a typed value.
    ///
    /// The cell is trimmed first; an empty cell is [`Value::Null`] for every target type.
    /// `row` and `column` are used only for error context (`row` is 1-based, header included).
    pub fn parse(
        file: &str,
        row: usize,
        column: &str,
        data_type: DataType,
        raw: &str,
    ) -> ConvertResult<Value> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }

        let parse_err = |message: String| ConvertError::Parse {
            file: file.to_owned(),
            row,
            column: column.to_owned(),
            raw: raw.to_owned(),
            message,
        };

        match data_type {
            DataType::Text => Ok(Value::Text(trimmed.to_owned())),
            DataType::Integer => trimmed
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|e| parse_err(e.to_string())),
            DataType::Float => trimmed
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| parse_err(e.to_string())),
            DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(parse_err),
            DataType::Date => parse_date(trimmed).map(Value::Date).map_err(parse_err),
        }
    }
}

pub(crate) fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!("expected date ({})", DATE_FORMATS.join(" | ")))
}

/// In-memory tabular dataset, the pipeline's working representation.
///
/// Rows are stored row-major in the same order as the [`Schema`] columns. Every row has exactly
/// `schema.len()` cells; constructors and mutators uphold this.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major cell storage.
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table from schema and rows.
    ///
    /// # Panics
    ///
    /// Panics if any row's length differs from the schema column count.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        let width = schema.len();
        for (i, row) in rows.iter().enumerate() {
            assert!(
                row.len() == width,
                "row {} has {} cells but schema has {} columns",
                i,
                row.len(),
                width
            );
        }
        Self { schema, rows }
    }

    /// Create an empty table with the given schema.
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    /// Append a row, enforcing the row-width invariant.
    pub fn push_row(&mut self, row: Vec<Value>) -> ConvertResult<()> {
        if row.len() != self.schema.len() {
            return Err(ConvertError::Validation {
                message: format!(
                    "row has {} cells but schema has {} columns",
                    row.len(),
                    self.schema.len()
                ),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Create a new table containing only rows that match `predicate`.
    ///
    /// The returned table preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Create a new table by applying `mapper` to every row.
    ///
    /// The returned table preserves the original schema.
    ///
    /// # Panics
    ///
    /// Panics if `mapper` returns a row with a different length than the schema column count.
    pub fn map_rows<F>(&self, mut mapper: F) -> Self
    where
        F: FnMut(&[Value]) -> Vec<Value>,
    {
        let expected_len = self.schema.len();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let out = mapper(row.as_slice());
                assert!(
                    out.len() == expected_len,
                    "mapped row length {} does not match schema length {}",
                    out.len(),
                    expected_len
                );
                out
            })
            .collect();

        Self {
            schema: self.schema.clone(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let schema = Schema::new(vec![
            Column::new("id", DataType::Integer),
            Column::new("name", DataType::Text),
        ]);
        Table::new(
            schema,
            vec![
                vec![Value::Integer(1), Value::Text("a".to_string())],
                vec![Value::Integer(2), Value::Text("b".to_string())],
            ],
        )
    }

    #[test]
    fn schema_index_of_works() {
        let t = sample_table();
        assert_eq!(t.schema.index_of("id"), Some(0));
        assert_eq!(t.schema.index_of("name"), Some(1));
        assert_eq!(t.schema.index_of("missing"), None);
    }

    #[test]
    fn push_row_rejects_wrong_width() {
        let mut t = sample_table();
        let err = t.push_row(vec![Value::Integer(3)]).unwrap_err();
        assert!(err.to_string().contains("1 cells"));
        assert_eq!(t.row_count(), 2);
    }

    #[test]
    fn parse_typed_values() {
        assert_eq!(
            Value::parse("f.csv", 2, "id", DataType::Integer, " 7 ").unwrap(),
            Value::Integer(7)
        );
        assert_eq!(
            Value::parse("f.csv", 2, "active", DataType::Bool, "YES").unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            Value::parse("f.csv", 2, "when", DataType::Date, "31.12.2023").unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap())
        );
        assert_eq!(
            Value::parse("f.csv", 2, "anything", DataType::Float, "").unwrap(),
            Value::Null
        );
    }

    #[test]
    fn parse_error_carries_context() {
        let err = Value::parse("people.csv", 3, "id", DataType::Integer, "abc").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("people.csv"));
        assert!(msg.contains("row 3"));
        assert!(msg.contains("column 'id'"));
        assert!(msg.contains("raw='abc'"));
    }

    #[test]
    fn value_display_is_canonical() {
        assert_eq!(Value::Null.display(), "");
        assert_eq!(Value::Float(20.0).display(), "20");
        assert_eq!(Value::Float(98.5).display(), "98.5");
        assert_eq!(
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()).display(),
            "2024-01-02"
        );
    }

    #[test]
    fn filter_rows_preserves_schema() {
        let t = sample_table();
        let out = t.filter_rows(|row| matches!(row[0], Value::Integer(v) if v > 1));
        assert_eq!(out.schema, t.schema);
        assert_eq!(out.row_count(), 1);
        assert_eq!(t.row_count(), 2);
    }
}
