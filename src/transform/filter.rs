//! Row filtering predicates.
//!
//! The six predicate kinds mirror the conversion tool's filter modes: exact text match,
//! substring, membership, numeric equality, numeric range, and regex. Text predicates compare
//! trimmed, uppercased values (nulls compare as the empty string); numeric predicates coerce the
//! cell through [`Value::as_f64`] and fail closed on non-numeric cells.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult};
use crate::table::{Schema, Value};

/// A single row predicate, applied to one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowPredicate {
    /// Keep rows whose cell equals `value` (trimmed, case-insensitive).
    TextEquals { column: String, value: String },
    /// Keep rows whose cell contains `substring` (trimmed, case-insensitive).
    TextContains { column: String, substring: String },
    /// Keep rows whose cell is one of `values` (trimmed, case-insensitive).
    TextInSet { column: String, values: Vec<String> },
    /// Keep rows whose cell equals `value` numerically.
    NumberEquals { column: String, value: f64 },
    /// Keep rows whose cell lies in `[min, max]` (either bound may be open).
    NumberInRange {
        column: String,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Keep rows whose cell matches `pattern` (regex, applied to the display form).
    Matches { column: String, pattern: String },
}

/// Parse a comparison number from user input, accepting comma decimals (`"10,5"`).
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().replace(',', ".").parse::<f64>().ok()
}

fn normalize(value: &Value) -> String {
    value.display().trim().to_uppercase()
}

impl RowPredicate {
    /// The column this predicate reads.
    pub fn column(&self) -> &str {
        match self {
            RowPredicate::TextEquals { column, .. }
            | RowPredicate::TextContains { column, .. }
            | RowPredicate::TextInSet { column, .. }
            | RowPredicate::NumberEquals { column, .. }
            | RowPredicate::NumberInRange { column, .. }
            | RowPredicate::Matches { column, .. } => column,
        }
    }

    /// Validate parameters against a schema without touching any rows.
    pub fn validate(&self, schema: &Schema) -> ConvertResult<()> {
        if schema.index_of(self.column()).is_none() {
            return Err(ConvertError::Validation {
                message: format!(
                    "filter references unknown column '{}' (available: {:?})",
                    self.column(),
                    schema.column_names().collect::<Vec<_>>()
                ),
            });
        }

        match self {
            RowPredicate::TextInSet { values, .. } if values.is_empty() => {
                Err(ConvertError::Validation {
                    message: "filter value set is empty".to_string(),
                })
            }
            RowPredicate::NumberInRange {
                min: Some(lo),
                max: Some(hi),
                ..
            } if lo > hi => Err(ConvertError::Validation {
                message: format!("filter range is inverted: min {lo} > max {hi}"),
            }),
            RowPredicate::Matches { pattern, .. } => {
                Regex::new(pattern).map_err(|e| ConvertError::Validation {
                    message: format!("invalid filter regex '{pattern}': {e}"),
                })?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Resolve the column index and pre-compile the predicate for row evaluation.
    pub(crate) fn compile(&self, schema: &Schema) -> ConvertResult<CompiledPredicate> {
        self.validate(schema)?;
        let idx = schema
            .index_of(self.column())
            .expect("validated column exists");

        let kind = match self {
            RowPredicate::TextEquals { value, .. } => {
                CompiledKind::TextEquals(value.trim().to_uppercase())
            }
            RowPredicate::TextContains { substring, .. } => {
                CompiledKind::TextContains(substring.trim().to_uppercase())
            }
            RowPredicate::TextInSet { values, .. } => CompiledKind::TextInSet(
                values.iter().map(|v| v.trim().to_uppercase()).collect(),
            ),
            RowPredicate::NumberEquals { value, .. } => CompiledKind::NumberEquals(*value),
            RowPredicate::NumberInRange { min, max, .. } => CompiledKind::NumberInRange {
                min: min.unwrap_or(f64::NEG_INFINITY),
                max: max.unwrap_or(f64::INFINITY),
            },
            RowPredicate::Matches { pattern, .. } => {
                CompiledKind::Matches(Regex::new(pattern).expect("validated regex compiles"))
            }
        };

        Ok(CompiledPredicate { idx, kind })
    }
}

pub(crate) struct CompiledPredicate {
    idx: usize,
    kind: CompiledKind,
}

enum CompiledKind {
    TextEquals(String),
    TextContains(String),
    TextInSet(Vec<String>),
    NumberEquals(f64),
    NumberInRange { min: f64, max: f64 },
    Matches(Regex),
}

impl CompiledPredicate {
    pub(crate) fn matches(&self, row: &[Value]) -> bool {
        let cell = &row[self.idx];
        match &self.kind {
            CompiledKind::TextEquals(want) => normalize(cell) == *want,
            CompiledKind::TextContains(sub) => normalize(cell).contains(sub.as_str()),
            CompiledKind::TextInSet(set) => set.contains(&normalize(cell)),
            CompiledKind::NumberEquals(want) => cell.as_f64().is_some_and(|v| v == *want),
            CompiledKind::NumberInRange { min, max } => {
                cell.as_f64().is_some_and(|v| v >= *min && v <= *max)
            }
            CompiledKind::Matches(rx) => rx.is_match(cell.display().trim()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, DataType, Table};

    fn sample_table() -> Table {
        let schema = Schema::new(vec![
            Column::new("brand", DataType::Text),
            Column::new("price", DataType::Float),
        ]);
        Table::new(
            schema,
            vec![
                vec![Value::Text("  Acme ".to_string()), Value::Float(10.0)],
                vec![Value::Text("acme".to_string()), Value::Float(20.0)],
                vec![Value::Text("Globex".to_string()), Value::Null],
            ],
        )
    }

    fn apply(table: &Table, predicate: RowPredicate) -> Table {
        let compiled = predicate.compile(&table.schema).unwrap();
        table.filter_rows(|row| compiled.matches(row))
    }

    #[test]
    fn text_equals_trims_and_ignores_case() {
        let out = apply(
            &sample_table(),
            RowPredicate::TextEquals {
                column: "brand".to_string(),
                value: "ACME".to_string(),
            },
        );
        assert_eq!(out.row_count(), 2);
    }

    #[test]
    fn text_contains_and_in_set() {
        let table = sample_table();
        let out = apply(
            &table,
            RowPredicate::TextContains {
                column: "brand".to_string(),
                substring: "lob".to_string(),
            },
        );
        assert_eq!(out.row_count(), 1);

        let out = apply(
            &table,
            RowPredicate::TextInSet {
                column: "brand".to_string(),
                values: vec!["globex".to_string(), "initech".to_string()],
            },
        );
        assert_eq!(out.row_count(), 1);
    }

    #[test]
    fn numeric_predicates_skip_nulls() {
        let table = sample_table();
        let out = apply(
            &table,
            RowPredicate::NumberEquals {
                column: "price".to_string(),
                value: 10.0,
            },
        );
        assert_eq!(out.row_count(), 1);

        let out = apply(
            &table,
            RowPredicate::NumberInRange {
                column: "price".to_string(),
                min: Some(5.0),
                max: None,
            },
        );
        assert_eq!(out.row_count(), 2);
    }

    #[test]
    fn regex_matches_display_form() {
        let out = apply(
            &sample_table(),
            RowPredicate::Matches {
                column: "brand".to_string(),
                pattern: "^G.*x$".to_string(),
            },
        );
        assert_eq!(out.row_count(), 1);
    }

    #[test]
    fn validation_rejects_bad_parameters() {
        let schema = sample_table().schema;

        let err = RowPredicate::TextEquals {
            column: "missing".to_string(),
            value: "x".to_string(),
        }
        .validate(&schema)
        .unwrap_err();
        assert!(err.to_string().contains("unknown column"));

        let err = RowPredicate::Matches {
            column: "brand".to_string(),
            pattern: "[unclosed".to_string(),
        }
        .validate(&schema)
        .unwrap_err();
        assert!(err.to_string().contains("invalid filter regex"));

        let err = RowPredicate::NumberInRange {
            column: "price".to_string(),
            min: Some(5.0),
            max: Some(1.0),
        }
        .validate(&schema)
        .unwrap_err();
        assert!(err.to_string().contains("inverted"));
    }

    #[test]
    fn parse_number_accepts_comma_decimals() {
        assert_eq!(parse_number(" 10,5 "), Some(10.5));
        assert_eq!(parse_number("10.5"), Some(10.5));
        assert_eq!(parse_number("abc"), None);
    }
}
