//! Simple column summaries: value frequencies and unique values.
//!
//! Both summaries normalize cells to their trimmed, uppercased display form and skip empties, so
//! `" acme "` and `"ACME"` count as one value. Results come back as ordinary [`Table`]s and can
//! be fed straight to the writer.

use std::collections::HashMap;

use crate::error::{ConvertError, ConvertResult};
use crate::table::{Column, DataType, Schema, Table, Value};

/// Count occurrences of each normalized value in `column`.
///
/// The result has two columns, the source column name and `count`, sorted by descending count
/// and then by value.
pub fn frequency(table: &Table, column: &str) -> ConvertResult<Table> {
    let idx = require_column(table, column)?;

    let mut counts: HashMap<String, i64> = HashMap::new();
    for row in &table.rows {
        if let Some(key) = normalized_cell(&row[idx]) {
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    let mut entries: Vec<(String, i64)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let schema = Schema::new(vec![
        Column::new(column, DataType::Text),
        Column::new("count", DataType::Integer),
    ]);
    let rows = entries
        .into_iter()
        .map(|(value, count)| vec![Value::Text(value), Value::Integer(count)])
        .collect();
    Ok(Table::new(schema, rows))
}

/// Collect the distinct normalized values in `column`, sorted.
pub fn unique_values(table: &Table, column: &str) -> ConvertResult<Table> {
    let idx = require_column(table, column)?;

    let mut values: Vec<String> = table
        .rows
        .iter()
        .filter_map(|row| normalized_cell(&row[idx]))
        .collect();
    values.sort();
    values.dedup();

    let schema = Schema::new(vec![Column::new(column, DataType::Text)]);
    let rows = values.into_iter().map(|v| vec![Value::Text(v)]).collect();
    Ok(Table::new(schema, rows))
}

fn require_column(table: &Table, column: &str) -> ConvertResult<usize> {
    table
        .schema
        .index_of(column)
        .ok_or_else(|| ConvertError::Validation {
            message: format!(
                "analysis references unknown column '{column}' (available: {:?})",
                table.schema.column_names().collect::<Vec<_>>()
            ),
        })
}

fn normalized_cell(value: &Value) -> Option<String> {
    let normalized = value.display().trim().to_uppercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
