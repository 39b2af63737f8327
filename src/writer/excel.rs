//! XLSX serialization via `rust_xlsxwriter`.

use chrono::Datelike;
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook};

use crate::error::ConvertResult;
use crate::table::{Table, Value};

use super::{WriteHooks, WriteOptions};

/// Column widths are derived from cell content but kept within this range.
const MIN_COLUMN_WIDTH: f64 = 10.0;
const MAX_COLUMN_WIDTH: f64 = 60.0;

/// Serialize `table` as an XLSX workbook into a byte buffer.
///
/// The workbook gets a bold header row, optional frozen header and autofilter, and column widths
/// sized to the longest cell. Document properties are pinned to a fixed creation timestamp so the
/// same table always produces the same bytes.
pub(crate) fn write_xlsx_bytes(
    table: &Table,
    options: &WriteOptions,
    hooks: &WriteHooks<'_>,
) -> ConvertResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&options.sheet_name)?;

    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    for (col, name) in table.schema.column_names().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header_format)?;
    }

    for (row_no, row) in table.rows.iter().enumerate() {
        let r = (row_no + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            let c = col as u16;
            match value {
                Value::Null => {}
                Value::Text(s) => {
                    worksheet.write_string(r, c, s)?;
                }
                Value::Integer(i) => {
                    worksheet.write_number(r, c, *i as f64)?;
                }
                Value::Float(f) => {
                    worksheet.write_number(r, c, *f)?;
                }
                Value::Bool(b) => {
                    worksheet.write_boolean(r, c, *b)?;
                }
                Value::Date(d) => {
                    // Out-of-range years fold to 0 so ExcelDateTime reports the range error.
                    let year = u16::try_from(d.year()).unwrap_or(0);
                    let dt = ExcelDateTime::from_ymd(year, d.month() as u8, d.day() as u8)?;
                    worksheet.write_datetime_with_format(r, c, &dt, &date_format)?;
                }
            }
        }
        hooks.checkpoint(row_no + 1)?;
    }

    for (col, width) in column_widths(table).into_iter().enumerate() {
        worksheet.set_column_width(col as u16, width)?;
    }

    if options.freeze_header {
        worksheet.set_freeze_panes(1, 0)?;
    }
    if options.autofilter && !table.rows.is_empty() && table.column_count() > 0 {
        worksheet.autofilter(0, 0, table.row_count() as u32, (table.column_count() - 1) as u16)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn column_widths(table: &Table) -> Vec<f64> {
    table
        .schema
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let mut longest = column.name.chars().count();
            for row in &table.rows {
                longest = longest.max(row[idx].display().chars().count());
            }
            (longest as f64 + 2.0).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, DataType, Schema};
    use crate::writer::WriteOptions;

    fn sample_table() -> Table {
        let schema = Schema::new(vec![
            Column::new("id", DataType::Integer),
            Column::new("name", DataType::Text),
        ]);
        Table::new(
            schema,
            vec![
                vec![Value::Integer(1), Value::Text("Ada".to_string())],
                vec![Value::Integer(2), Value::Null],
            ],
        )
    }

    #[test]
    fn workbook_bytes_are_deterministic() {
        let table = sample_table();
        let options = WriteOptions::default();
        let hooks = WriteHooks::new(&options, table.row_count());
        let first = write_xlsx_bytes(&table, &options, &hooks).unwrap();
        let second = write_xlsx_bytes(&table, &options, &hooks).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn zero_column_table_with_rows_writes_without_panicking() {
        let table = Table::new(Schema::new(Vec::new()), vec![Vec::new(), Vec::new()]);
        let options = WriteOptions::default();
        let hooks = WriteHooks::new(&options, table.row_count());
        write_xlsx_bytes(&table, &options, &hooks).unwrap();
    }

    #[test]
    fn out_of_range_date_year_is_an_error() {
        use crate::error::ConvertError;
        use chrono::NaiveDate;

        let schema = Schema::new(vec![Column::new("when", DataType::Date)]);
        let table = Table::new(
            schema,
            vec![vec![Value::Date(NaiveDate::from_ymd_opt(-44, 3, 15).unwrap())]],
        );
        let options = WriteOptions::default();
        let hooks = WriteHooks::new(&options, table.row_count());
        let err = write_xlsx_bytes(&table, &options, &hooks).unwrap_err();
        assert!(matches!(err, ConvertError::Xlsx(_)));
    }

    #[test]
    fn column_widths_track_content_within_bounds() {
        let schema = Schema::new(vec![
            Column::new("x", DataType::Text),
            Column::new("y", DataType::Text),
        ]);
        let table = Table::new(
            schema,
            vec![vec![
                Value::Text("a".repeat(100)),
                Value::Text("ab".to_string()),
            ]],
        );
        let widths = column_widths(&table);
        assert_eq!(widths, vec![MAX_COLUMN_WIDTH, MIN_COLUMN_WIDTH]);
    }
}
