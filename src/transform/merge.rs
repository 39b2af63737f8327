//! Union-schema merging of multiple tables (multi-file and multi-sheet jobs).

use crate::table::{Column, DataType, Schema, Table, Value};

/// Normalized form of a column name, used to match columns across sources.
///
/// Lowercased and trimmed, with whitespace/hyphen runs folded to `_` and other punctuation
/// stripped, so `"Order ID"`, `order-id` and `order_id` all land on the same column.
pub fn normalize_column_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.trim().chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_sep = !out.is_empty();
        } else if ch.is_alphanumeric() {
            if pending_sep {
                out.push('_');
                pending_sep = false;
            }
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        }
        // other punctuation is dropped
    }
    out
}

/// Concatenate tables under a union schema.
///
/// Columns are matched by [`normalize_column_name`]; the union keeps first-seen order and the
/// first-seen display name. Rows from tables missing a column are null-filled. Column types are
/// unified per column (Integer+Float becomes Float, other mixtures fall back to Text with a
/// warning).
pub fn align_union(tables: Vec<Table>) -> (Table, Vec<String>) {
    let mut union_norm: Vec<String> = Vec::new();
    let mut union_columns: Vec<Column> = Vec::new();

    for table in &tables {
        for column in &table.schema.columns {
            let norm = normalize_column_name(&column.name);
            if !union_norm.contains(&norm) {
                union_norm.push(norm);
                union_columns.push(column.clone());
            }
        }
    }

    // Unify each union column's type across the sources that carry it.
    let mut warnings = Vec::new();
    for (union_idx, norm) in union_norm.iter().enumerate() {
        let mut types: Vec<DataType> = Vec::new();
        for table in &tables {
            for column in &table.schema.columns {
                if &normalize_column_name(&column.name) == norm
                    && !types.contains(&column.data_type)
                {
                    types.push(column.data_type);
                }
            }
        }
        union_columns[union_idx].data_type = match types.as_slice() {
            [single] => *single,
            [_, _]
                if types.contains(&DataType::Integer) && types.contains(&DataType::Float) =>
            {
                DataType::Float
            }
            _ => {
                if types.len() > 1 {
                    warnings.push(format!(
                        "merge: column '{}' has conflicting types across sources, using text",
                        union_columns[union_idx].name
                    ));
                }
                DataType::Text
            }
        };
    }

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for table in tables {
        // Map union position -> source column index, per table.
        let source_idx: Vec<Option<usize>> = union_norm
            .iter()
            .map(|norm| {
                table
                    .schema
                    .columns
                    .iter()
                    .position(|c| &normalize_column_name(&c.name) == norm)
            })
            .collect();

        for row in &table.rows {
            let out_row: Vec<Value> = source_idx
                .iter()
                .enumerate()
                .map(|(union_idx, idx)| match idx {
                    Some(i) => coerce_for_union(&row[*i], union_columns[union_idx].data_type),
                    None => Value::Null,
                })
                .collect();
            rows.push(out_row);
        }
    }

    (Table::new(Schema::new(union_columns), rows), warnings)
}

fn coerce_for_union(value: &Value, target: DataType) -> Value {
    match (value, target) {
        (Value::Null, _) => Value::Null,
        (Value::Integer(i), DataType::Float) => Value::Float(*i as f64),
        (v, DataType::Text) if v.data_type() != Some(DataType::Text) => Value::Text(v.display()),
        (v, _) => v.clone(),
    }
}
