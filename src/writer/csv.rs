//! CSV serialization.

use crate::error::{ConvertError, ConvertResult};
use crate::table::Table;

use super::WriteHooks;

/// Serialize `table` as CSV into a byte buffer.
///
/// Cells are written in their canonical display form, so a table read without type inference
/// round-trips byte-for-byte. Quoting is applied only where the delimiter, quotes, or newlines
/// require it.
pub(crate) fn write_csv_bytes(
    table: &Table,
    delimiter: u8,
    hooks: &WriteHooks<'_>,
) -> ConvertResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(table.schema.column_names())?;

    for (row_no, row) in table.rows.iter().enumerate() {
        writer.write_record(row.iter().map(|v| v.display()))?;
        hooks.checkpoint(row_no + 1)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ConvertError::Io(e.into_error()))?;
    Ok(bytes)
}
