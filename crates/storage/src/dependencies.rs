//! Referential check run before a record is deleted.

use shared::{
    metadata::catalog,
    protocol::{DependencyGroup, DependencyRecord},
};

use crate::Tables;

/// Scans every entity, in catalog order, for records whose fields hold `id`.
///
/// Matches are grouped by referencing entity and field in order of first
/// appearance. The checked record itself is skipped, so a self-stamped
/// creator id does not block its own deletion. An unknown `entity` has no
/// dependencies.
pub fn find_dependencies_in(tables: &Tables, entity: &str, id: &str) -> Vec<DependencyGroup> {
    let mut groups: Vec<DependencyGroup> = Vec::new();
    if !tables.contains_key(entity) {
        return groups;
    }

    for meta in catalog() {
        let Some(rows) = tables.get(meta.name) else {
            continue;
        };
        for record in rows {
            if meta.name == entity && record.id.as_str() == id {
                continue;
            }
            for field in record.references(id) {
                let index = match groups
                    .iter()
                    .position(|group| group.entity_name == meta.name && group.field_name == field)
                {
                    Some(index) => index,
                    None => {
                        groups.push(DependencyGroup {
                            entity_name: meta.name.to_string(),
                            field_name: field.to_string(),
                            records: Vec::new(),
                        });
                        groups.len() - 1
                    }
                };
                groups[index].records.push(DependencyRecord {
                    id: record.id.clone(),
                    name: record.display_name().to_string(),
                });
            }
        }
    }

    groups
}
