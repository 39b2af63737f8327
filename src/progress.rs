//! Progress reporting and cooperative cancellation.
//!
//! The pipeline is observable through [`ConvertObserver`], a trait with no-op defaults: attach one
//! via [`crate::pipeline::RunOptions`] (or per-stage options) to receive stage events, row-count
//! milestones, and warnings. [`CancellationToken`] is a shared flag checked between row batches;
//! a cancelled job fails with [`crate::error::ConvertError::Cancelled`].

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::pipeline::ConversionResult;

/// Number of rows processed between cancellation checks / progress callbacks.
pub const ROW_BATCH: usize = 4_096;

/// Shared cancellation flag for one or more jobs.
///
/// Cloning yields a handle to the same flag. The pipeline checks it between row batches, never
/// mid-row.
#[derive(Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once [`CancellationToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Observer interface for conversion outcomes.
///
/// Implementors can record metrics, drive progress bars, or log warnings. All methods default to
/// no-ops so implementors only override what they need.
pub trait ConvertObserver: Send + Sync {
    /// Called when a source file starts being read.
    fn on_read_started(&self, _path: &Path) {}

    /// Called when a source file has been fully read.
    fn on_read_finished(&self, _path: &Path, _rows: usize) {}

    /// Called periodically with (rows processed, rows total) during transform/write.
    fn on_progress(&self, _rows_done: usize, _rows_total: usize) {}

    /// Called for each non-fatal warning (coercion fallbacks, ragged rows, ...).
    fn on_warning(&self, _message: &str) {}

    /// Called once a job has produced its output file.
    fn on_job_finished(&self, _result: &ConversionResult) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ConvertObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn ConvertObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ConvertObserver for CompositeObserver {
    fn on_read_started(&self, path: &Path) {
        for o in &self.observers {
            o.on_read_started(path);
        }
    }

    fn on_read_finished(&self, path: &Path, rows: usize) {
        for o in &self.observers {
            o.on_read_finished(path, rows);
        }
    }

    fn on_progress(&self, rows_done: usize, rows_total: usize) {
        for o in &self.observers {
            o.on_progress(rows_done, rows_total);
        }
    }

    fn on_warning(&self, message: &str) {
        for o in &self.observers {
            o.on_warning(message);
        }
    }

    fn on_job_finished(&self, result: &ConversionResult) {
        for o in &self.observers {
            o.on_job_finished(result);
        }
    }
}

/// Logs conversion events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl ConvertObserver for StdErrObserver {
    fn on_read_started(&self, path: &Path) {
        eprintln!("[convert][read] {}", path.display());
    }

    fn on_read_finished(&self, path: &Path, rows: usize) {
        eprintln!("[convert][read][ok] {} rows={rows}", path.display());
    }

    fn on_progress(&self, rows_done: usize, rows_total: usize) {
        eprintln!("[convert][progress] {rows_done}/{rows_total}");
    }

    fn on_warning(&self, message: &str) {
        eprintln!("[convert][warn] {message}");
    }

    fn on_job_finished(&self, result: &ConversionResult) {
        eprintln!(
            "[convert][ok] {} rows={} cols={} warnings={}",
            result.output.display(),
            result.rows,
            result.columns,
            result.warnings.len()
        );
    }
}
