use std::io::Write;

use tabular_convert::reader::{ReadOptions, TextEncoding, read_table};
use tabular_convert::table::{DataType, Value};

fn default_options() -> ReadOptions {
    ReadOptions::default()
}

#[test]
fn read_csv_from_path_happy_path() {
    let (table, warnings) =
        read_table("tests/fixtures/people.csv", &default_options()).unwrap();

    assert!(warnings.is_empty());
    assert_eq!(
        table.schema.column_names().collect::<Vec<_>>(),
        vec!["id", "name", "score", "active"]
    );
    assert_eq!(table.row_count(), 2);
    assert_eq!(
        table.rows[0],
        vec![
            Value::Integer(1),
            Value::Text("Ada".to_string()),
            Value::Float(98.5),
            Value::Bool(true),
        ]
    );
}

#[test]
fn read_csv_without_inference_keeps_text() {
    let options = ReadOptions {
        infer_types: false,
        ..default_options()
    };
    let (table, _) = read_table("tests/fixtures/people.csv", &options).unwrap();
    assert!(
        table
            .schema
            .columns
            .iter()
            .all(|c| c.data_type == DataType::Text)
    );
    assert_eq!(table.rows[0][0], Value::Text("1".to_string()));
}

#[test]
fn read_csv_detects_semicolon_delimiter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("semi.csv");
    std::fs::write(&path, "id;name\n1;Ada\n").unwrap();

    let (table, _) = read_table(&path, &default_options()).unwrap();
    assert_eq!(
        table.schema.column_names().collect::<Vec<_>>(),
        vec!["id", "name"]
    );
    assert_eq!(table.rows[0][1], Value::Text("Ada".to_string()));
}

#[test]
fn read_csv_detects_windows_1251_encoding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cyr.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    // "город\nКиев\n" in windows-1251.
    file.write_all(b"\xE3\xEE\xF0\xEE\xE4\n\xCA\xE8\xE5\xE2\n")
        .unwrap();
    drop(file);

    let (table, warnings) = read_table(&path, &default_options()).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(
        table.schema.column_names().collect::<Vec<_>>(),
        vec!["город"]
    );
    assert_eq!(table.rows[0][0], Value::Text("Киев".to_string()));
}

#[test]
fn explicit_encoding_overrides_detection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latin.csv");
    // "café" in windows-1252; also happens to decode under windows-1251, so
    // the explicit option is what keeps the accent.
    std::fs::write(&path, b"name\ncaf\xE9\n").unwrap();

    let options = ReadOptions {
        encoding: TextEncoding::Windows1252,
        ..default_options()
    };
    let (table, _) = read_table(&path, &options).unwrap();
    assert_eq!(table.rows[0][0], Value::Text("café".to_string()));
}

#[test]
fn ragged_rows_are_padded_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ragged.csv");
    std::fs::write(&path, "a,b\n1\n").unwrap();

    let (table, warnings) = read_table(&path, &default_options()).unwrap();
    assert_eq!(table.rows[0], vec![Value::Integer(1), Value::Null]);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("ragged"));
}

#[test]
fn duplicate_headers_are_renamed_and_stay_addressable() {
    use tabular_convert::transform::{TransformStep, apply_steps};

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dup.csv");
    std::fs::write(&path, "a,a\n1,2\n").unwrap();

    let (table, warnings) = read_table(&path, &default_options()).unwrap();
    assert_eq!(
        table.schema.column_names().collect::<Vec<_>>(),
        vec!["a", "a_2"]
    );
    assert!(warnings.iter().any(|w| w.contains("duplicate header")));

    // The second column's data is reachable under its new name.
    let (out, _) = apply_steps(
        table,
        &[TransformStep::SelectColumns {
            columns: vec!["a_2".to_string()],
        }],
        None,
    )
    .unwrap();
    assert_eq!(out.rows, vec![vec![Value::Integer(2)]]);
}

#[test]
fn unknown_extension_is_rejected() {
    let err = read_table("data.unknown", &default_options()).unwrap_err();
    assert!(err.to_string().contains("cannot infer format"));
}
