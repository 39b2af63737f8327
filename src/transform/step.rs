//! Ordered transformation steps with fail-fast validation.
//!
//! [`validate_steps`] simulates the schema through every step before a single row is touched, so
//! a bad parameter in step 5 never leaves a half-transformed table behind.

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult};
use crate::progress::CancellationToken;
use crate::table::{Column, DataType, Schema, Table};

use super::coerce::cast_column;
use super::dedup::deduplicate;
use super::filter::RowPredicate;

/// One transformation applied to a [`Table`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransformStep {
    /// Keep only the listed columns, in the listed order.
    SelectColumns { columns: Vec<String> },
    /// Remove the listed columns.
    DropColumns { columns: Vec<String> },
    /// Rename a column. Renaming onto an existing name is a collision error.
    RenameColumn { from: String, to: String },
    /// Cast a column to another type; unconvertible cells become null (warned).
    CastColumn { column: String, to: DataType },
    /// Keep only rows matching the predicate.
    FilterRows { predicate: RowPredicate },
    /// Remove duplicate rows by key columns, keeping the first occurrence.
    Deduplicate {
        key_columns: Vec<String>,
        #[serde(default = "default_true")]
        normalize_keys: bool,
    },
}

fn default_true() -> bool {
    true
}

/// Validate `steps` against `schema` without executing anything.
///
/// Simulates the schema through each step in order and returns the final schema. Any unknown
/// column, empty column list, duplicate selection, invalid regex, inverted range, or rename
/// collision fails here, before [`apply_steps`] touches a row.
pub fn validate_steps(schema: &Schema, steps: &[TransformStep]) -> ConvertResult<Schema> {
    let mut current = schema.clone();
    for (step_no, step) in steps.iter().enumerate() {
        current = simulate_step(&current, step).map_err(|e| match e {
            ConvertError::Validation { message } => ConvertError::Validation {
                message: format!("step {}: {message}", step_no + 1),
            },
            other => other,
        })?;
    }
    Ok(current)
}

fn simulate_step(schema: &Schema, step: &TransformStep) -> ConvertResult<Schema> {
    match step {
        TransformStep::SelectColumns { columns } => {
            require_columns(schema, columns, "select")?;
            require_distinct(columns, "select")?;
            let selected = columns
                .iter()
                .map(|name| {
                    let idx = schema.index_of(name).expect("checked above");
                    schema.columns[idx].clone()
                })
                .collect();
            Ok(Schema::new(selected))
        }
        TransformStep::DropColumns { columns } => {
            require_columns(schema, columns, "drop")?;
            let kept = schema
                .columns
                .iter()
                .filter(|c| !columns.contains(&c.name))
                .cloned()
                .collect::<Vec<_>>();
            if kept.is_empty() {
                return Err(ConvertError::Validation {
                    message: "drop would remove every column".to_string(),
                });
            }
            Ok(Schema::new(kept))
        }
        TransformStep::RenameColumn { from, to } => {
            let idx = schema.index_of(from).ok_or_else(|| ConvertError::Validation {
                message: format!("rename references unknown column '{from}'"),
            })?;
            if to != from && schema.index_of(to).is_some() {
                return Err(ConvertError::NameCollision { name: to.clone() });
            }
            let mut columns = schema.columns.clone();
            columns[idx].name = to.clone();
            Ok(Schema::new(columns))
        }
        TransformStep::CastColumn { column, to } => {
            let idx = schema.index_of(column).ok_or_else(|| ConvertError::Validation {
                message: format!("cast references unknown column '{column}'"),
            })?;
            let mut columns = schema.columns.clone();
            columns[idx].data_type = *to;
            Ok(Schema::new(columns))
        }
        TransformStep::FilterRows { predicate } => {
            predicate.validate(schema)?;
            Ok(schema.clone())
        }
        TransformStep::Deduplicate { key_columns, .. } => {
            require_columns(schema, key_columns, "deduplicate")?;
            Ok(schema.clone())
        }
    }
}

fn require_columns(schema: &Schema, columns: &[String], what: &str) -> ConvertResult<()> {
    if columns.is_empty() {
        return Err(ConvertError::Validation {
            message: format!("{what} requires at least one column"),
        });
    }
    for name in columns {
        if schema.index_of(name).is_none() {
            return Err(ConvertError::Validation {
                message: format!(
                    "{what} references unknown column '{name}' (available: {:?})",
                    schema.column_names().collect::<Vec<_>>()
                ),
            });
        }
    }
    Ok(())
}

fn require_distinct(columns: &[String], what: &str) -> ConvertResult<()> {
    for (i, name) in columns.iter().enumerate() {
        if columns[..i].contains(name) {
            return Err(ConvertError::Validation {
                message: format!("{what} lists column '{name}' twice"),
            });
        }
    }
    Ok(())
}

/// Apply `steps` to `table` in order, after a fail-fast validation pass.
///
/// Returns the transformed table and warnings (e.g. cast fallback counts). The cancellation
/// token, if any, is checked between steps.
pub fn apply_steps(
    table: Table,
    steps: &[TransformStep],
    cancel: Option<&CancellationToken>,
) -> ConvertResult<(Table, Vec<String>)> {
    validate_steps(&table.schema, steps)?;

    let mut current = table;
    let mut warnings = Vec::new();
    for step in steps {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Err(ConvertError::Cancelled);
            }
        }
        current = apply_step(current, step, &mut warnings)?;
    }
    Ok((current, warnings))
}

fn apply_step(
    table: Table,
    step: &TransformStep,
    warnings: &mut Vec<String>,
) -> ConvertResult<Table> {
    match step {
        TransformStep::SelectColumns { columns } => {
            let idxs: Vec<usize> = columns
                .iter()
                .map(|name| table.schema.index_of(name).expect("validated"))
                .collect();
            let schema = Schema::new(
                idxs.iter()
                    .map(|&i| table.schema.columns[i].clone())
                    .collect::<Vec<Column>>(),
            );
            let rows = table
                .rows
                .iter()
                .map(|row| idxs.iter().map(|&i| row[i].clone()).collect())
                .collect();
            Ok(Table::new(schema, rows))
        }
        TransformStep::DropColumns { columns } => {
            let kept: Vec<String> = table
                .schema
                .columns
                .iter()
                .filter(|c| !columns.contains(&c.name))
                .map(|c| c.name.clone())
                .collect();
            apply_step(table, &TransformStep::SelectColumns { columns: kept }, warnings)
        }
        TransformStep::RenameColumn { from, to } => {
            let mut table = table;
            // Collisions are re-checked here so a rename can never drop a column.
            if to != from && table.schema.index_of(to).is_some() {
                return Err(ConvertError::NameCollision { name: to.clone() });
            }
            let idx = table.schema.index_of(from).expect("validated");
            table.schema.columns[idx].name = to.clone();
            Ok(table)
        }
        TransformStep::CastColumn { column, to } => {
            let mut table = table;
            let idx = table.schema.index_of(column).expect("validated");
            let fallbacks = cast_column(&mut table, idx, *to);
            if fallbacks > 0 {
                warnings.push(format!(
                    "cast: {fallbacks} cell(s) in column '{column}' could not be converted to {to:?} and became null"
                ));
            }
            Ok(table)
        }
        TransformStep::FilterRows { predicate } => {
            let compiled = predicate.compile(&table.schema)?;
            Ok(table.filter_rows(|row| compiled.matches(row)))
        }
        TransformStep::Deduplicate {
            key_columns,
            normalize_keys,
        } => {
            let idxs: Vec<usize> = key_columns
                .iter()
                .map(|name| table.schema.index_of(name).expect("validated"))
                .collect();
            Ok(deduplicate(&table, &idxs, *normalize_keys))
        }
    }
}
