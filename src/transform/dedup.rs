//! Row deduplication by key columns.

use std::collections::HashSet;

use crate::table::{Table, Value};

/// Remove duplicate rows, keeping the first occurrence of each key tuple.
///
/// `key_idxs` are column indexes forming the key. With `normalize_keys`, key cells are compared
/// on their trimmed, uppercased display form, so `" Acme "` and `"ACME"` collide; nulls compare
/// as the empty string. Applying the same deduplication twice yields the same table.
pub fn deduplicate(table: &Table, key_idxs: &[usize], normalize_keys: bool) -> Table {
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(table.row_count());

    table.filter_rows(|row| {
        let key: Vec<String> = key_idxs
            .iter()
            .map(|&i| key_part(&row[i], normalize_keys))
            .collect();
        seen.insert(key)
    })
}

fn key_part(value: &Value, normalize: bool) -> String {
    let s = value.display();
    if normalize {
        s.trim().to_uppercase()
    } else {
        s
    }
}
