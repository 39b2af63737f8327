//! CSV reading implementation.
//!
//! CSV cells are ingested as text; column types are inferred afterwards by
//! [`super::infer_column_types`]. Ragged rows are padded/truncated against the header row rather
//! than rejected, matching the file-in/file-out contract.

use std::path::Path;

use crate::error::{ConvertError, ConvertResult};
use crate::progress::{CancellationToken, ROW_BATCH};
use crate::table::{Column, DataType, Schema, Table, Value};

use super::ReadOptions;
use super::detect::{decode_bytes, detect_delimiter};

/// Read a CSV file into a text-typed [`Table`].
///
/// Encoding and delimiter come from `options` or are auto-detected. Returns the table plus
/// non-fatal warnings (ragged rows, lossy decoding).
pub fn read_csv_from_path(
    path: impl AsRef<Path>,
    options: &ReadOptions,
) -> ConvertResult<(Table, Vec<String>)> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;

    let mut warnings = Vec::new();
    let (text, encoding_name) = decode_bytes(&bytes, options.encoding);
    if encoding_name.contains("lossy") {
        warnings.push(format!(
            "{}: undecodable bytes replaced while reading as UTF-8",
            path.display()
        ));
    }

    let delimiter = options.delimiter.unwrap_or_else(|| detect_delimiter(&text));
    let file_label = path.display().to_string();

    let (table, mut row_warnings) =
        read_csv_from_str(&file_label, &text, delimiter, options.cancel.as_ref())?;
    warnings.append(&mut row_warnings);
    Ok((table, warnings))
}

/// Read CSV text into a text-typed [`Table`].
///
/// `file_label` is used only for warning/error context.
pub fn read_csv_from_str(
    file_label: &str,
    text: &str,
    delimiter: u8,
    cancel: Option<&CancellationToken>,
) -> ConvertResult<(Table, Vec<String>)> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ConvertError::Parse {
            file: file_label.to_owned(),
            row: 1,
            column: String::new(),
            raw: String::new(),
            message: "no header row found".to_string(),
        });
    }

    let mut warnings = Vec::new();
    let names: Vec<String> = headers.iter().map(|h| h.trim().to_owned()).collect();
    let (names, renamed) = super::disambiguate_headers(names);
    if renamed > 0 {
        warnings.push(format!(
            "{file_label}: {renamed} duplicate header name(s) renamed"
        ));
    }

    let columns: Vec<Column> = names
        .into_iter()
        .map(|n| Column::new(n, DataType::Text))
        .collect();
    let width = columns.len();

    let mut rows: Vec<Vec<Value>> = Vec::new();
    let mut ragged = 0usize;
    for (row_idx0, result) in rdr.records().enumerate() {
        if row_idx0 % ROW_BATCH == 0 {
            if let Some(token) = cancel {
                if token.is_cancelled() {
                    return Err(ConvertError::Cancelled);
                }
            }
        }

        let record = result?;
        if record.len() != width {
            ragged += 1;
        }

        // Pad missing trailing cells with nulls, drop surplus cells.
        let mut row: Vec<Value> = Vec::with_capacity(width);
        for i in 0..width {
            let raw = record.get(i).unwrap_or("");
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                row.push(Value::Null);
            } else {
                row.push(Value::Text(trimmed.to_owned()));
            }
        }
        rows.push(row);
    }

    if ragged > 0 {
        warnings.push(format!(
            "{file_label}: {ragged} ragged row(s) padded/truncated to {width} columns"
        ));
    }

    Ok((Table::new(Schema::new(columns), rows), warnings))
}
