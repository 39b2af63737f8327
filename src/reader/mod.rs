//! Reading CSV and workbook files into an in-memory [`Table`].
//!
//! Most callers should use [`read_table`], which:
//!
//! - auto-detects the input format by file extension (or you can override via
//!   [`ReadOptions::format`])
//! - auto-detects CSV encoding and delimiter (see [`detect`])
//! - infers column types unless [`ReadOptions::infer_types`] is disabled
//!
//! Format-specific functions are also available under [`csv`] and [`excel`].

pub mod csv;
pub mod detect;
pub mod excel;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult};
use crate::progress::CancellationToken;
use crate::table::{DataType, Table, Value};

pub use detect::TextEncoding;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Delimiter-separated text.
    Csv,
    /// Spreadsheet/workbook formats.
    Excel,
}

impl InputFormat {
    /// Parse an input format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// How to choose sheet(s) when reading a workbook.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetSelection {
    /// Read the first sheet (default).
    #[default]
    First,
    /// Read a single named sheet.
    Sheet(String),
    /// Read all sheets and concatenate rows under a union schema.
    All,
    /// Read only the listed sheets (in order) and concatenate rows.
    Sheets(Vec<String>),
}

/// Options controlling how a source file is read.
///
/// Use [`Default`] for common cases (auto-detect everything, infer types).
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// If `None`, auto-detect format from the file extension.
    pub format: Option<InputFormat>,
    /// CSV text encoding; `Auto` tries UTF-8, windows-1251, windows-1252 in order.
    pub encoding: TextEncoding,
    /// CSV field delimiter; `None` infers it from the header line.
    pub delimiter: Option<u8>,
    /// Workbook sheet selection.
    pub sheet: SheetSelection,
    /// Infer per-column types after reading. When `false`, every column stays
    /// [`DataType::Text`], which guarantees exact CSV round-trips.
    pub infer_types: bool,
    /// Optional cooperative cancellation flag, checked between row batches.
    pub cancel: Option<CancellationToken>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            format: None,
            encoding: TextEncoding::Auto,
            delimiter: None,
            sheet: SheetSelection::First,
            infer_types: true,
            cancel: None,
        }
    }
}

/// Read one source file into a [`Table`], applying type inference per `options`.
///
/// Returns the table and any non-fatal warnings collected along the way.
pub fn read_table(
    path: impl AsRef<Path>,
    options: &ReadOptions,
) -> ConvertResult<(Table, Vec<String>)> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    let (mut table, mut warnings) = match format {
        InputFormat::Csv => csv::read_csv_from_path(path, options)?,
        InputFormat::Excel => excel::read_excel_from_path(path, options)?,
    };

    if options.infer_types {
        warnings.append(&mut infer_column_types(&mut table));
    }

    Ok((table, warnings))
}

pub(crate) fn infer_format_from_path(path: &Path) -> ConvertResult<InputFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ConvertError::Validation {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        })?;

    InputFormat::from_extension(ext).ok_or_else(|| ConvertError::Validation {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}

/// Make header names unique by suffixing repeats (`a`, `a_2`, `a_3`, ...).
///
/// Schemas require unique column names; without this, a repeated header would shadow the later
/// column's data in every name-based lookup. Returns the adjusted names and how many were
/// renamed.
pub(crate) fn disambiguate_headers(names: Vec<String>) -> (Vec<String>, usize) {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    let mut renamed = 0usize;
    for name in names {
        if !out.contains(&name) {
            out.push(name);
            continue;
        }
        let mut k = 2usize;
        let mut candidate = format!("{name}_{k}");
        while out.contains(&candidate) {
            k += 1;
            candidate = format!("{name}_{k}");
        }
        out.push(candidate);
        renamed += 1;
    }
    (out, renamed)
}

/// Infer and apply a [`DataType`] for every column of `table`, in place.
///
/// Text columns are promoted when every non-null cell parses as a single richer type, tried in
/// the order Integer, Float, Bool, Date. Columns holding mixed native types are unified:
/// Integer+Float becomes Float; any other mixture falls back to Text (with a warning), keeping
/// the canonical display form of each cell.
pub fn infer_column_types(table: &mut Table) -> Vec<String> {
    let mut warnings = Vec::new();

    for j in 0..table.schema.len() {
        let mut types: Vec<DataType> = Vec::new();
        for row in &table.rows {
            if let Some(dt) = row[j].data_type() {
                if !types.contains(&dt) {
                    types.push(dt);
                }
            }
        }

        let inferred = match types.as_slice() {
            [] => DataType::Text, // all-null column
            [DataType::Text] => infer_text_column(table, j),
            [single] => *single,
            _ if types.len() == 2
                && types.contains(&DataType::Integer)
                && types.contains(&DataType::Float) =>
            {
                promote_column(table, j, |v| match v {
                    Value::Integer(i) => Value::Float(*i as f64),
                    other => other.clone(),
                });
                DataType::Float
            }
            _ => {
                warnings.push(format!(
                    "column '{}': mixed cell types coerced to text",
                    table.schema.columns[j].name
                ));
                promote_column(table, j, |v| {
                    if v.is_null() {
                        Value::Null
                    } else {
                        Value::Text(v.display())
                    }
                });
                DataType::Text
            }
        };

        table.schema.columns[j].data_type = inferred;
    }

    warnings
}

/// Try to promote a text column to a richer type; converts cells on success.
fn infer_text_column(table: &mut Table, j: usize) -> DataType {
    for candidate in [
        DataType::Integer,
        DataType::Float,
        DataType::Bool,
        DataType::Date,
    ] {
        if let Some(converted) = try_parse_column(table, j, candidate) {
            for (row, value) in table.rows.iter_mut().zip(converted) {
                row[j] = value;
            }
            return candidate;
        }
    }
    DataType::Text
}

fn try_parse_column(table: &Table, j: usize, data_type: DataType) -> Option<Vec<Value>> {
    let mut out = Vec::with_capacity(table.row_count());
    for row in &table.rows {
        match &row[j] {
            Value::Null => out.push(Value::Null),
            Value::Text(s) => match Value::parse("", 0, "", data_type, s) {
                Ok(v) => out.push(v),
                Err(_) => return None,
            },
            _ => return None,
        }
    }
    Some(out)
}

fn promote_column<F>(table: &mut Table, j: usize, convert: F)
where
    F: Fn(&Value) -> Value,
{
    for row in &mut table.rows {
        row[j] = convert(&row[j]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, Schema};
    use chrono::NaiveDate;

    fn text_table(cells: Vec<Vec<&str>>) -> Table {
        let columns = (0..cells[0].len())
            .map(|i| Column::new(format!("c{i}"), DataType::Text))
            .collect();
        let rows = cells
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|s| {
                        if s.is_empty() {
                            Value::Null
                        } else {
                            Value::Text(s.to_string())
                        }
                    })
                    .collect()
            })
            .collect();
        Table::new(Schema::new(columns), rows)
    }

    #[test]
    fn infers_integer_float_bool_date_text() {
        let mut table = text_table(vec![
            vec!["1", "1.5", "yes", "2024-01-02", "abc"],
            vec!["2", "7", "no", "2024-02-03", "3x"],
        ]);
        let warnings = infer_column_types(&mut table);
        assert!(warnings.is_empty());

        let types: Vec<DataType> = table.schema.columns.iter().map(|c| c.data_type).collect();
        assert_eq!(
            types,
            vec![
                DataType::Integer,
                DataType::Float,
                DataType::Bool,
                DataType::Date,
                DataType::Text,
            ]
        );
        assert_eq!(table.rows[0][0], Value::Integer(1));
        assert_eq!(table.rows[1][1], Value::Float(7.0));
        assert_eq!(table.rows[0][2], Value::Bool(true));
        assert_eq!(
            table.rows[0][3],
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
    }

    #[test]
    fn nulls_do_not_block_inference() {
        let mut table = text_table(vec![vec!["1"], vec![""], vec!["3"]]);
        infer_column_types(&mut table);
        assert_eq!(table.schema.columns[0].data_type, DataType::Integer);
        assert_eq!(table.rows[1][0], Value::Null);
    }

    #[test]
    fn all_null_column_stays_text() {
        let mut table = text_table(vec![vec![""], vec![""]]);
        infer_column_types(&mut table);
        assert_eq!(table.schema.columns[0].data_type, DataType::Text);
    }

    #[test]
    fn integer_float_mix_unifies_to_float() {
        let schema = Schema::new(vec![Column::new("n", DataType::Text)]);
        let mut table = Table::new(
            schema,
            vec![vec![Value::Integer(1)], vec![Value::Float(2.5)]],
        );
        let warnings = infer_column_types(&mut table);
        assert!(warnings.is_empty());
        assert_eq!(table.schema.columns[0].data_type, DataType::Float);
        assert_eq!(table.rows[0][0], Value::Float(1.0));
    }

    #[test]
    fn incompatible_mix_falls_back_to_text_with_warning() {
        let schema = Schema::new(vec![Column::new("m", DataType::Text)]);
        let mut table = Table::new(
            schema,
            vec![vec![Value::Integer(1)], vec![Value::Bool(true)]],
        );
        let warnings = infer_column_types(&mut table);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("mixed cell types"));
        assert_eq!(table.schema.columns[0].data_type, DataType::Text);
        assert_eq!(table.rows[1][0], Value::Text("true".to_string()));
    }

    #[test]
    fn header_disambiguation_avoids_existing_names() {
        let names = vec!["a".to_string(), "a".to_string(), "a_2".to_string()];
        let (out, renamed) = disambiguate_headers(names);
        assert_eq!(out, vec!["a", "a_2", "a_2_2"]);
        assert_eq!(renamed, 2);

        let (out, renamed) = disambiguate_headers(vec!["x".to_string(), "y".to_string()]);
        assert_eq!(out, vec!["x", "y"]);
        assert_eq!(renamed, 0);
    }

    #[test]
    fn format_inference_rejects_unknown_extension() {
        let err = infer_format_from_path(Path::new("data.bin")).unwrap_err();
        assert!(err.to_string().contains("cannot infer format"));
        assert_eq!(
            infer_format_from_path(Path::new("data.XLSX")).unwrap(),
            InputFormat::Excel
        );
    }
}
