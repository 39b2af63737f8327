use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Error type shared across the read/transform/write pipeline.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook reading error.
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// Workbook writing error.
    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// A cell could not be parsed into the required [`crate::table::DataType`], or the input
    /// is structurally malformed (e.g. no header row).
    #[error("failed to parse '{file}' at row {row} column '{column}': {message} (raw='{raw}')")]
    Parse {
        file: String,
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// Invalid job or transformation parameters, detected before any rows are touched.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A rename would collide with an existing column name.
    #[error("column name collision: '{name}' already exists")]
    NameCollision { name: String },

    /// The output destination could not be written. The partially-written temporary file is
    /// discarded; the destination path is left untouched.
    #[error("cannot write output '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The job was cancelled cooperatively between row batches.
    #[error("job cancelled")]
    Cancelled,
}
