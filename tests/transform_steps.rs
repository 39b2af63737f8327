use tabular_convert::ConvertError;
use tabular_convert::reader::{ReadOptions, read_table};
use tabular_convert::table::{DataType, Value};
use tabular_convert::transform::{TransformStep, apply_steps};

fn people() -> tabular_convert::table::Table {
    let (table, _) = read_table("tests/fixtures/people.csv", &ReadOptions::default()).unwrap();
    table
}

#[test]
fn steps_can_be_defined_in_json() {
    // The same shape a batch configuration file would carry.
    let steps: Vec<TransformStep> = serde_json::from_str(
        r#"[
            { "op": "filter_rows",
              "predicate": { "kind": "number_in_range", "column": "score", "min": 90.0 } },
            { "op": "rename_column", "from": "name", "to": "person" },
            { "op": "select_columns", "columns": ["person", "score"] }
        ]"#,
    )
    .unwrap();

    let (out, warnings) = apply_steps(people(), &steps, None).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(
        out.schema.column_names().collect::<Vec<_>>(),
        vec!["person", "score"]
    );
    assert_eq!(out.rows, vec![vec![
        Value::Text("Ada".to_string()),
        Value::Float(98.5),
    ]]);
}

#[test]
fn text_filters_normalize_case_and_whitespace() {
    let steps = vec![TransformStep::FilterRows {
        predicate: tabular_convert::transform::RowPredicate::TextEquals {
            column: "name".to_string(),
            value: "  grace ".to_string(),
        },
    }];
    let (out, _) = apply_steps(people(), &steps, None).unwrap();
    assert_eq!(out.row_count(), 1);
    assert_eq!(out.rows[0][0], Value::Integer(2));
}

#[test]
fn regex_filter_applies_to_display_form() {
    let steps = vec![TransformStep::FilterRows {
        predicate: tabular_convert::transform::RowPredicate::Matches {
            column: "score".to_string(),
            pattern: r"\.5$".to_string(),
        },
    }];
    let (out, _) = apply_steps(people(), &steps, None).unwrap();
    assert_eq!(out.row_count(), 1);
    assert_eq!(out.rows[0][1], Value::Text("Ada".to_string()));
}

#[test]
fn cast_then_filter_uses_the_new_type() {
    let steps = vec![
        TransformStep::CastColumn {
            column: "id".to_string(),
            to: DataType::Text,
        },
        TransformStep::FilterRows {
            predicate: tabular_convert::transform::RowPredicate::TextInSet {
                column: "id".to_string(),
                values: vec!["2".to_string()],
            },
        },
    ];
    let (out, _) = apply_steps(people(), &steps, None).unwrap();
    assert_eq!(out.schema.columns[0].data_type, DataType::Text);
    assert_eq!(out.row_count(), 1);
}

#[test]
fn invalid_regex_fails_validation_with_step_number() {
    let steps = vec![
        TransformStep::DropColumns {
            columns: vec!["active".to_string()],
        },
        TransformStep::FilterRows {
            predicate: tabular_convert::transform::RowPredicate::Matches {
                column: "name".to_string(),
                pattern: "(".to_string(),
            },
        },
    ];
    let err = apply_steps(people(), &steps, None).unwrap_err();
    assert!(matches!(err, ConvertError::Validation { .. }));
    assert!(err.to_string().contains("step 2"));
}

#[test]
fn rename_collision_is_its_own_error() {
    let steps = vec![TransformStep::RenameColumn {
        from: "id".to_string(),
        to: "name".to_string(),
    }];
    let err = apply_steps(people(), &steps, None).unwrap_err();
    assert!(matches!(err, ConvertError::NameCollision { ref name } if name == "name"));
}
