//! Table column selection.

use shared::metadata::{EntityMetadata, FieldMetadata};

/// Fields that can be shown as table columns, in metadata order.
pub fn available_columns(meta: &EntityMetadata) -> Vec<&'static FieldMetadata> {
    meta.fields
        .iter()
        .filter(|field| field.is_column_candidate())
        .collect()
}

/// The first `count` column candidates.
pub fn default_columns(meta: &EntityMetadata, count: usize) -> Vec<&'static FieldMetadata> {
    available_columns(meta).into_iter().take(count).collect()
}

/// Columns named in `requested`, kept in metadata order. Names that are
/// unknown or not column candidates are dropped; nothing left means the
/// defaults.
pub fn resolve_columns(
    meta: &EntityMetadata,
    requested: &[String],
    default_count: usize,
) -> Vec<&'static FieldMetadata> {
    let chosen: Vec<_> = available_columns(meta)
        .into_iter()
        .filter(|field| requested.iter().any(|name| name == field.name))
        .collect();
    if chosen.is_empty() {
        default_columns(meta, default_count)
    } else {
        chosen
    }
}

/// Flips `name` in the visible set: removed if shown, appended otherwise.
pub fn toggle_column(visible: &[String], name: &str) -> Vec<String> {
    if visible.iter().any(|shown| shown == name) {
        visible
            .iter()
            .filter(|shown| *shown != name)
            .cloned()
            .collect()
    } else {
        let mut next = visible.to_vec();
        next.push(name.to_string());
        next
    }
}

/// Splits a comma separated `columns` query value.
pub fn parse_column_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "tests/columns_tests.rs"]
mod tests;
