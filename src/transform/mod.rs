//! In-memory table transformations.
//!
//! The transform layer operates on [`crate::table::Table`] values produced by the reader. A job
//! carries an ordered list of [`TransformStep`]s; [`apply_steps`] validates the whole list
//! against the schema first (fail-fast) and then runs it.
//!
//! Currently implemented:
//!
//! - [`step`]: the step enum, validation pass, and execution
//! - [`filter`]: the six row predicates
//! - [`dedup`]: keep-first deduplication by key columns
//! - [`coerce`]: explicit column casts
//! - [`merge`]: union-schema concatenation of multiple tables

pub mod coerce;
pub mod dedup;
pub mod filter;
pub mod merge;
pub mod step;

pub use dedup::deduplicate;
pub use filter::{RowPredicate, parse_number};
pub use merge::{align_union, normalize_column_name};
pub use step::{TransformStep, apply_steps, validate_steps};
