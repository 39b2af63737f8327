//! Writing a [`Table`] to CSV or XLSX, deterministically and atomically.
//!
//! [`write_table`] serializes the whole output in memory, writes it to a temporary file in the
//! destination directory, and atomically renames it into place. A failed or cancelled write never
//! leaves a partial file at the destination. For a fixed [`WriteOptions`], identical tables
//! produce byte-identical output files.

pub mod csv;
pub mod excel;

use std::fmt;
use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult};
use crate::progress::{CancellationToken, ConvertObserver, ROW_BATCH};
use crate::table::Table;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Delimiter-separated text.
    Csv,
    /// Excel workbook.
    Xlsx,
}

impl OutputFormat {
    /// Parse an output format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }
}

/// Options controlling how a table is written.
#[derive(Clone)]
pub struct WriteOptions {
    /// If `None`, the format is inferred from the output extension.
    pub format: Option<OutputFormat>,
    /// CSV field delimiter.
    pub delimiter: u8,
    /// XLSX sheet name.
    pub sheet_name: String,
    /// Freeze the header row (XLSX).
    pub freeze_header: bool,
    /// Add an autofilter over the data range (XLSX).
    pub autofilter: bool,
    /// Optional cooperative cancellation flag, checked between row batches.
    pub cancel: Option<CancellationToken>,
    /// Optional observer for row-count progress milestones.
    pub observer: Option<Arc<dyn ConvertObserver>>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            format: None,
            delimiter: b',',
            sheet_name: "Data".to_string(),
            freeze_header: true,
            autofilter: true,
            cancel: None,
            observer: None,
        }
    }
}

impl fmt::Debug for WriteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteOptions")
            .field("format", &self.format)
            .field("delimiter", &(self.delimiter as char))
            .field("sheet_name", &self.sheet_name)
            .field("freeze_header", &self.freeze_header)
            .field("autofilter", &self.autofilter)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

/// Per-write progress/cancellation hooks, consulted every [`ROW_BATCH`] rows.
pub(crate) struct WriteHooks<'a> {
    cancel: Option<&'a CancellationToken>,
    observer: Option<&'a Arc<dyn ConvertObserver>>,
    total: usize,
}

impl<'a> WriteHooks<'a> {
    fn new(options: &'a WriteOptions, total: usize) -> Self {
        Self {
            cancel: options.cancel.as_ref(),
            observer: options.observer.as_ref(),
            total,
        }
    }

    /// Called with the number of rows written so far.
    pub(crate) fn checkpoint(&self, rows_done: usize) -> ConvertResult<()> {
        if rows_done % ROW_BATCH != 0 && rows_done != self.total {
            return Ok(());
        }
        if let Some(token) = self.cancel {
            if token.is_cancelled() {
                return Err(ConvertError::Cancelled);
            }
        }
        if let Some(obs) = self.observer {
            obs.on_progress(rows_done, self.total);
        }
        Ok(())
    }
}

/// Write `table` to `path` in the requested format.
///
/// The output is fully serialized before anything touches the destination: a temporary file in
/// the destination directory receives the bytes and is atomically renamed over `path` on success.
pub fn write_table(table: &Table, path: impl AsRef<Path>, options: &WriteOptions) -> ConvertResult<()> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => infer_output_format(path)?,
    };

    let hooks = WriteHooks::new(options, table.row_count());
    let bytes = match format {
        OutputFormat::Csv => csv::write_csv_bytes(table, options.delimiter, &hooks)?,
        OutputFormat::Xlsx => excel::write_xlsx_bytes(table, options, &hooks)?,
    };

    persist_atomically(&bytes, path)
}

pub(crate) fn infer_output_format(path: &Path) -> ConvertResult<OutputFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ConvertError::Validation {
            message: format!(
                "cannot infer output format: path has no extension ({})",
                path.display()
            ),
        })?;

    OutputFormat::from_extension(ext).ok_or_else(|| ConvertError::Validation {
        message: format!(
            "cannot infer output format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}

fn persist_atomically(bytes: &[u8], path: &Path) -> ConvertResult<()> {
    let write_err = |source: std::io::Error| ConvertError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".tabular-convert-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(write_err)?;

    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file_mut().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
