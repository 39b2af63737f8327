//! `tabular-convert` is a small library for converting tabular files between CSV and Excel,
//! with optional cleanup transformations applied along the way.
//!
//! The primary entrypoint is [`pipeline::run_job`]: describe a conversion as a [`pipeline::Job`]
//! (sources in, transform steps, output file) and run it. Lower-level pieces are available
//! directly: [`reader::read_table`] loads a file into an in-memory [`table::Table`],
//! [`transform::apply_steps`] reshapes it, and [`writer::write_table`] writes it back out.
//!
//! ## What a job can do
//!
//! **Reading (auto-detected by extension):**
//!
//! - **CSV**: `.csv` — encoding auto-detection (UTF-8, windows-1251, windows-1252), delimiter
//!   sniffing (`,` `;` tab), ragged rows padded to the header width
//! - **Excel/workbooks**: `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods` — first sheet, a named
//!   sheet, a sheet list, or all sheets merged under a union schema
//!
//! **Transforming (ordered steps, validated up front):**
//!
//! - select / drop / rename columns, explicit type casts
//! - row filters (text equality, substring, set membership, numeric equality, range, regex)
//! - keep-first deduplication by key columns
//!
//! **Writing:**
//!
//! - **CSV** or **XLSX**, chosen by output extension
//! - output is byte-deterministic and written atomically: a temp file in the destination
//!   directory is renamed into place, so a failed job never leaves a partial file
//!
//! ## Quick example: run a job
//!
//! ```no_run
//! use tabular_convert::pipeline::{run_job, Job, RunOptions};
//! use tabular_convert::transform::TransformStep;
//!
//! # fn main() -> Result<(), tabular_convert::ConvertError> {
//! let mut job = Job::convert("reports/*.csv", "out/merged.xlsx");
//! job.steps = vec![TransformStep::Deduplicate {
//!     key_columns: vec!["id".to_string()],
//!     normalize_keys: true,
//! }];
//! let result = run_job(&job, &RunOptions::default())?;
//! println!("wrote {} rows to {}", result.rows, result.output.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Quick example: work on a table directly
//!
//! ```rust
//! use tabular_convert::table::{Column, DataType, Schema, Table, Value};
//! use tabular_convert::transform::{apply_steps, RowPredicate, TransformStep};
//!
//! let schema = Schema::new(vec![
//!     Column::new("id", DataType::Integer),
//!     Column::new("city", DataType::Text),
//! ]);
//! let table = Table::new(
//!     schema,
//!     vec![
//!         vec![Value::Integer(1), Value::Text("Lae".to_string())],
//!         vec![Value::Integer(2), Value::Text("Madang".to_string())],
//!     ],
//! );
//!
//! let (out, warnings) = apply_steps(
//!     table,
//!     &[TransformStep::FilterRows {
//!         predicate: RowPredicate::TextEquals {
//!             column: "city".to_string(),
//!             value: "lae".to_string(),
//!         },
//!     }],
//!     None,
//! )
//! .unwrap();
//! assert!(warnings.is_empty());
//! assert_eq!(out.row_count(), 1);
//! assert_eq!(out.rows[0][0], Value::Integer(1));
//! ```
//!
//! ## Modules
//!
//! - [`pipeline`]: job model, batch execution, glob source expansion
//! - [`reader`]: CSV/workbook loading, encoding/delimiter detection, type inference
//! - [`transform`]: ordered steps, row predicates, deduplication, union-schema merges
//! - [`writer`]: deterministic, atomic CSV/XLSX output
//! - [`table`]: the in-memory table, schema, and cell value types
//! - [`analyze`]: value frequency and unique-value summaries
//! - [`progress`]: observer trait and cooperative cancellation
//! - [`error`]: error types used across the pipeline
//!
//! ## Progress and cancellation
//!
//! Long-running jobs report progress every few thousand rows and check a shared
//! [`progress::CancellationToken`] at the same cadence; cancelling fails the job with
//! [`ConvertError::Cancelled`] before the output file is replaced.

pub mod analyze;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod reader;
pub mod table;
pub mod transform;
pub mod writer;

pub use error::{ConvertError, ConvertResult};
