//! Explicit column type coercion.

use crate::table::{DataType, Table, Value, parse_bool, parse_date};

/// Cast one column to `target`, in place.
///
/// Cells that cannot be converted fall back to [`Value::Null`]; the number of such fallbacks is
/// returned so the caller can surface a warning. Nulls stay null.
pub fn cast_column(table: &mut Table, idx: usize, target: DataType) -> usize {
    let mut fallbacks = 0usize;
    for row in &mut table.rows {
        row[idx] = match convert_value(&row[idx], target) {
            Some(v) => v,
            None => {
                fallbacks += 1;
                Value::Null
            }
        };
    }
    table.schema.columns[idx].data_type = target;
    fallbacks
}

/// Convert a single value to `target`, or `None` if it does not fit.
fn convert_value(value: &Value, target: DataType) -> Option<Value> {
    if value.is_null() {
        return Some(Value::Null);
    }
    if value.data_type() == Some(target) {
        return Some(value.clone());
    }

    match target {
        DataType::Text => Some(Value::Text(value.display())),
        DataType::Integer => match value {
            Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Some(Value::Integer(*f as i64))
            }
            Value::Bool(b) => Some(Value::Integer(i64::from(*b))),
            Value::Text(s) => s.trim().parse::<i64>().ok().map(Value::Integer),
            _ => None,
        },
        DataType::Float => match value {
            Value::Integer(i) => Some(Value::Float(*i as f64)),
            Value::Text(s) => s.trim().parse::<f64>().ok().map(Value::Float),
            _ => None,
        },
        DataType::Bool => match value {
            Value::Integer(i) => Some(Value::Bool(*i != 0)),
            Value::Float(f) => Some(Value::Bool(*f != 0.0)),
            Value::Text(s) => parse_bool(s.trim()).ok().map(Value::Bool),
            _ => None,
        },
        DataType::Date => match value {
            Value::Text(s) => parse_date(s.trim()).ok().map(Value::Date),
            _ => None,
        },
    }
}
