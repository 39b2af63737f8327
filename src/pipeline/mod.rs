//! Job model and end-to-end execution.
//!
//! A [`Job`] describes one conversion: source files (glob patterns), how to read them, the
//! ordered [`TransformStep`]s to apply, and where to write the result. [`run_job`] executes a
//! single job; [`run_jobs`] runs a batch in parallel on the rayon thread pool. Jobs serialize
//! with serde, so batch definitions can live in configuration files.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult};
use crate::progress::{CancellationToken, ConvertObserver};
use crate::reader::{ReadOptions, SheetSelection, TextEncoding, read_table};
use crate::table::Table;
use crate::transform::{TransformStep, align_union, apply_steps};
use crate::writer::{OutputFormat, WriteOptions, write_table};

/// One conversion: sources in, transform steps, output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Source files as glob patterns (a plain path is a pattern that matches itself).
    pub sources: Vec<String>,
    /// Sheet selection for workbook sources.
    #[serde(default)]
    pub sheet: SheetSelection,
    /// CSV text encoding.
    #[serde(default)]
    pub encoding: TextEncoding,
    /// CSV field delimiter; `None` auto-detects per file. Must be ASCII.
    #[serde(default)]
    pub delimiter: Option<char>,
    /// Infer per-column types after reading.
    #[serde(default = "default_true")]
    pub infer_types: bool,
    /// Transformations applied in order, after sources are merged.
    #[serde(default)]
    pub steps: Vec<TransformStep>,
    /// Destination file; the extension selects the format unless `output_format` is set.
    pub output: PathBuf,
    /// Output format override.
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
    /// Sheet name for XLSX output.
    #[serde(default = "default_sheet_name")]
    pub output_sheet: String,
    /// Delimiter for CSV output. Must be ASCII.
    #[serde(default)]
    pub output_delimiter: Option<char>,
}

fn default_true() -> bool {
    true
}

fn default_sheet_name() -> String {
    "Data".to_string()
}

impl Job {
    /// A single-source job with default read/write behavior and no transform steps.
    pub fn convert(input: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            sources: vec![input.into()],
            sheet: SheetSelection::default(),
            encoding: TextEncoding::default(),
            delimiter: None,
            infer_types: true,
            steps: Vec::new(),
            output: output.into(),
            output_format: None,
            output_sheet: default_sheet_name(),
            output_delimiter: None,
        }
    }
}

/// Outcome of a successful [`run_job`] call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    /// Path of the written output file.
    pub output: PathBuf,
    /// Data rows written (excluding the header).
    pub rows: usize,
    /// Columns written.
    pub columns: usize,
    /// Non-fatal warnings collected across read, transform, and write.
    pub warnings: Vec<String>,
}

/// Execution-time knobs shared by every job in a batch.
#[derive(Clone, Default)]
pub struct RunOptions {
    /// Observer notified of stage events, progress milestones, and warnings.
    pub observer: Option<Arc<dyn ConvertObserver>>,
    /// Cancellation flag checked between row batches and transform steps.
    pub cancel: CancellationToken,
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("observer_set", &self.observer.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

/// Run one conversion job to completion.
///
/// Reads every matched source, merges multiple sources under a union schema, applies the
/// transform steps (fail-fast validation first), and writes the output atomically. Warnings from
/// all stages are forwarded to the observer and returned in the [`ConversionResult`].
pub fn run_job(job: &Job, options: &RunOptions) -> ConvertResult<ConversionResult> {
    let sources = expand_sources(&job.sources)?;
    let read_options = ReadOptions {
        format: None,
        encoding: job.encoding,
        delimiter: ascii_delimiter(job.delimiter, "delimiter")?,
        sheet: job.sheet.clone(),
        infer_types: job.infer_types,
        cancel: Some(options.cancel.clone()),
    };

    let mut warnings = Vec::new();
    let mut tables = Vec::with_capacity(sources.len());
    for path in &sources {
        if let Some(obs) = &options.observer {
            obs.on_read_started(path);
        }
        let (table, mut read_warnings) = read_table(path, &read_options)?;
        if let Some(obs) = &options.observer {
            obs.on_read_finished(path, table.row_count());
        }
        warnings.append(&mut read_warnings);
        tables.push(table);
    }

    let merged = merge_tables(tables, &mut warnings);
    let (transformed, mut step_warnings) =
        apply_steps(merged, &job.steps, Some(&options.cancel))?;
    warnings.append(&mut step_warnings);

    let write_options = WriteOptions {
        format: job.output_format,
        delimiter: ascii_delimiter(job.output_delimiter, "output_delimiter")?.unwrap_or(b','),
        sheet_name: job.output_sheet.clone(),
        cancel: Some(options.cancel.clone()),
        observer: options.observer.clone(),
        ..WriteOptions::default()
    };
    write_table(&transformed, &job.output, &write_options)?;

    let result = ConversionResult {
        output: job.output.clone(),
        rows: transformed.row_count(),
        columns: transformed.column_count(),
        warnings,
    };
    if let Some(obs) = &options.observer {
        for w in &result.warnings {
            obs.on_warning(w);
        }
        obs.on_job_finished(&result);
    }
    Ok(result)
}

/// Run a batch of jobs in parallel; each job gets its own result slot, in input order.
pub fn run_jobs(jobs: &[Job], options: &RunOptions) -> Vec<ConvertResult<ConversionResult>> {
    jobs.par_iter().map(|job| run_job(job, options)).collect()
}

fn merge_tables(mut tables: Vec<Table>, warnings: &mut Vec<String>) -> Table {
    if tables.len() == 1 {
        return tables.remove(0);
    }
    let (merged, mut merge_warnings) = align_union(tables);
    warnings.append(&mut merge_warnings);
    merged
}

/// Expand glob patterns into a deduplicated, ordered file list.
fn expand_sources(patterns: &[String]) -> ConvertResult<Vec<PathBuf>> {
    if patterns.is_empty() {
        return Err(ConvertError::Validation {
            message: "job has no source patterns".to_string(),
        });
    }

    let mut paths = Vec::new();
    for pattern in patterns {
        let entries = glob::glob(pattern).map_err(|e| ConvertError::Validation {
            message: format!("invalid source pattern '{pattern}': {e}"),
        })?;

        let before = paths.len();
        for entry in entries {
            let path = entry.map_err(|e| {
                ConvertError::Io(std::io::Error::new(e.error().kind(), e.to_string()))
            })?;
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        if paths.len() == before {
            return Err(ConvertError::Validation {
                message: format!("source pattern '{pattern}' matched no files"),
            });
        }
    }
    Ok(paths)
}

fn ascii_delimiter(delimiter: Option<char>, what: &str) -> ConvertResult<Option<u8>> {
    match delimiter {
        None => Ok(None),
        Some(c) if c.is_ascii() => Ok(Some(c as u8)),
        Some(c) => Err(ConvertError::Validation {
            message: format!("{what} '{c}' is not an ASCII character"),
        }),
    }
}
