//! Workbook (`.xlsx`, `.xls`, `.ods`, ...) reading implementation.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use crate::error::{ConvertError, ConvertResult};
use crate::progress::ROW_BATCH;
use crate::table::{Column, DataType, Schema, Table, Value};
use crate::transform::merge::align_union;

use super::{ReadOptions, SheetSelection};

/// Read a workbook into a [`Table`].
///
/// Behavior:
/// - Resolves sheets from [`ReadOptions::sheet`]; the default is the first sheet.
/// - Detects the first non-empty row of each sheet as its header row.
/// - Multi-sheet selections are concatenated under a union schema.
/// - Cells map to native [`Value`]s; whole floats become integers, empty cells become nulls.
pub fn read_excel_from_path(
    path: impl AsRef<Path>,
    options: &ReadOptions,
) -> ConvertResult<(Table, Vec<String>)> {
    let path = path.as_ref();
    let file_label = path.display().to_string();
    let mut workbook = open_workbook_auto(path)?;

    let available = workbook.sheet_names().to_vec();
    if available.is_empty() {
        return Err(ConvertError::Parse {
            file: file_label,
            row: 1,
            column: String::new(),
            raw: String::new(),
            message: "workbook has no sheets".to_string(),
        });
    }

    let selected: Vec<String> = match &options.sheet {
        SheetSelection::First => vec![available[0].clone()],
        SheetSelection::Sheet(name) => vec![name.clone()],
        SheetSelection::All => available.clone(),
        SheetSelection::Sheets(names) => {
            if names.is_empty() {
                return Err(ConvertError::Validation {
                    message: format!("sheet selection for '{file_label}' lists no sheets"),
                });
            }
            names.clone()
        }
    };

    for name in &selected {
        if !available.contains(name) {
            return Err(ConvertError::Validation {
                message: format!(
                    "sheet '{name}' not found in '{file_label}' (available: {available:?})"
                ),
            });
        }
    }

    let mut warnings = Vec::new();
    let mut tables = Vec::with_capacity(selected.len());
    for name in &selected {
        let range = workbook.worksheet_range(name)?;
        let label = format!("{file_label}#{name}");
        tables.push(read_sheet_range(&label, &range, options, &mut warnings)?);
    }

    if tables.len() == 1 {
        Ok((tables.pop().expect("one table"), warnings))
    } else {
        let (merged, mut merge_warnings) = align_union(tables);
        warnings.append(&mut merge_warnings);
        Ok((merged, warnings))
    }
}

fn read_sheet_range(
    label: &str,
    range: &calamine::Range<Data>,
    options: &ReadOptions,
    warnings: &mut Vec<String>,
) -> ConvertResult<Table> {
    let header_row_idx = range
        .rows()
        .position(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .ok_or_else(|| ConvertError::Parse {
            file: label.to_owned(),
            row: 1,
            column: String::new(),
            raw: String::new(),
            message: "sheet has no non-empty rows (no header row found)".to_string(),
        })?;

    let header_cells: Vec<String> = range
        .rows()
        .nth(header_row_idx)
        .expect("header row exists")
        .iter()
        .map(header_cell_to_string)
        .collect();

    // Blank header cells still need a name for the schema.
    let names: Vec<String> = header_cells
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if h.trim().is_empty() {
                format!("column_{}", i + 1)
            } else {
                h.trim().to_owned()
            }
        })
        .collect();
    let (names, renamed) = super::disambiguate_headers(names);
    if renamed > 0 {
        warnings.push(format!(
            "{label}: {renamed} duplicate header name(s) renamed"
        ));
    }

    let columns: Vec<Column> = names
        .into_iter()
        .map(|n| Column::new(n, DataType::Text))
        .collect();
    let width = columns.len();

    let mut errors = 0usize;
    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (idx0, row) in range.rows().enumerate().skip(header_row_idx + 1) {
        if idx0 % ROW_BATCH == 0 {
            if let Some(token) = options.cancel.as_ref() {
                if token.is_cancelled() {
                    return Err(ConvertError::Cancelled);
                }
            }
        }

        let mut out_row: Vec<Value> = Vec::with_capacity(width);
        for i in 0..width {
            let cell = row.get(i).unwrap_or(&Data::Empty);
            out_row.push(convert_cell(cell, &mut errors));
        }
        rows.push(out_row);
    }

    if errors > 0 {
        warnings.push(format!("{label}: {errors} error cell(s) read as null"));
    }

    Ok(Table::new(Schema::new(columns), rows))
}

fn header_cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

fn convert_cell(c: &Data, errors: &mut usize) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Null
            } else {
                Value::Text(trimmed.to_owned())
            }
        }
        Data::Int(i) => Value::Integer(*i),
        Data::Float(f) => {
            // Workbooks store most numbers as floats; keep whole values integral.
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Value::Integer(*f as i64)
            } else {
                Value::Float(*f)
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => Value::Date(ndt.date()),
            None => {
                *errors += 1;
                Value::Null
            }
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(_) => {
            *errors += 1;
            Value::Null
        }
    }
}
