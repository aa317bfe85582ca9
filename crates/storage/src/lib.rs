use std::{collections::BTreeMap, collections::HashMap, sync::Arc};

use anyhow::{bail, Result};
use shared::{
    domain::RecordId,
    error::{ApiException, ErrorCode},
    metadata::{catalog, entity_metadata},
    protocol::DependencyGroup,
    record::Record,
};
use tokio::sync::RwLock;
use tracing::debug;

mod dependencies;
mod seed;

pub use dependencies::find_dependencies_in;

/// Records of every catalog entity, keyed by entity name.
pub type Tables = HashMap<&'static str, Vec<Record>>;

/// In-memory record store shared by every handler. Nothing is written to
/// disk; a restart brings back whatever the store was built from.
#[derive(Clone)]
pub struct Storage {
    tables: Arc<RwLock<Tables>>,
}

/// Result of an atomic check-then-remove.
#[derive(Debug, Clone, PartialEq)]
pub enum Removal {
    Removed(Record),
    Referenced(Vec<DependencyGroup>),
    Missing,
}

impl Storage {
    /// Store with a table for every catalog entity and no records.
    pub fn empty() -> Self {
        let tables = catalog()
            .iter()
            .map(|meta| (meta.name, Vec::new()))
            .collect();
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    /// Store preloaded with the demo pipeline dataset.
    pub fn seeded() -> Self {
        let mut tables: Tables = catalog()
            .iter()
            .map(|meta| (meta.name, Vec::new()))
            .collect();
        for (entity, record) in seed::records() {
            if let Some(rows) = tables.get_mut(entity) {
                rows.push(record);
            }
        }
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    pub async fn health_check(&self) -> Result<()> {
        let tables = self.tables.read().await;
        for meta in catalog() {
            if !tables.contains_key(meta.name) {
                bail!("table for entity '{}' is missing", meta.name);
            }
        }
        Ok(())
    }

    pub async fn list(&self, entity: &str) -> Result<Vec<Record>> {
        let tables = self.tables.read().await;
        Ok(table(&tables, entity)?.to_vec())
    }

    pub async fn get(&self, entity: &str, id: &str) -> Result<Option<Record>> {
        let tables = self.tables.read().await;
        Ok(table(&tables, entity)?
            .iter()
            .find(|record| record.id.as_str() == id)
            .cloned())
    }

    pub async fn contains(&self, entity: &str, id: &str) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(table(&tables, entity)?
            .iter()
            .any(|record| record.id.as_str() == id))
    }

    pub async fn count(&self, entity: &str) -> Result<usize> {
        let tables = self.tables.read().await;
        Ok(table(&tables, entity)?.len())
    }

    /// Record counts for every entity, keyed by entity name.
    pub async fn counts(&self) -> BTreeMap<&'static str, usize> {
        let tables = self.tables.read().await;
        tables.iter().map(|(name, rows)| (*name, rows.len())).collect()
    }

    pub async fn insert(&self, entity: &str, record: Record) -> Result<()> {
        self.insert_checked(entity, record, &[]).await
    }

    /// Inserts `record` after confirming, under the same write lock, that
    /// every `(entity, id)` in `references` still exists.
    pub async fn insert_checked(
        &self,
        entity: &str,
        record: Record,
        references: &[(&str, &str)],
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        ensure_references(&tables, references)?;
        let rows = table_mut(&mut tables, entity)?;
        if rows.iter().any(|existing| existing.id == record.id) {
            return Err(ApiException::new(
                ErrorCode::Conflict,
                format!("{entity} record '{}' already exists", record.id),
            )
            .into());
        }
        debug!(entity, id = %record.id, "record inserted");
        rows.push(record);
        Ok(())
    }

    /// Replaces the record with the same id. Returns false when there is none.
    pub async fn replace(&self, entity: &str, record: Record) -> Result<bool> {
        self.replace_checked(entity, record, &[]).await
    }

    /// [`Storage::replace`] with the reference check of
    /// [`Storage::insert_checked`].
    pub async fn replace_checked(
        &self,
        entity: &str,
        record: Record,
        references: &[(&str, &str)],
    ) -> Result<bool> {
        let mut tables = self.tables.write().await;
        ensure_references(&tables, references)?;
        let rows = table_mut(&mut tables, entity)?;
        match rows.iter_mut().find(|existing| existing.id == record.id) {
            Some(slot) => {
                debug!(entity, id = %record.id, "record replaced");
                *slot = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Removes a record without looking at who references it.
    pub async fn remove(&self, entity: &str, id: &str) -> Result<Option<Record>> {
        let mut tables = self.tables.write().await;
        let rows = table_mut(&mut tables, entity)?;
        let removed = rows
            .iter()
            .position(|record| record.id.as_str() == id)
            .map(|index| rows.remove(index));
        if removed.is_some() {
            debug!(entity, id, "record removed");
        }
        Ok(removed)
    }

    /// Removes a record only if nothing references it, under one write lock.
    pub async fn remove_unreferenced(&self, entity: &str, id: &str) -> Result<Removal> {
        let mut tables = self.tables.write().await;
        table(&tables, entity)?;
        let dependencies = find_dependencies_in(&tables, entity, id);
        if !dependencies.is_empty() {
            debug!(entity, id, groups = dependencies.len(), "removal blocked");
            return Ok(Removal::Referenced(dependencies));
        }
        let rows = table_mut(&mut tables, entity)?;
        match rows.iter().position(|record| record.id.as_str() == id) {
            Some(index) => {
                debug!(entity, id, "record removed");
                Ok(Removal::Removed(rows.remove(index)))
            }
            None => Ok(Removal::Missing),
        }
    }

    /// Every record, of any entity, whose fields hold `id`.
    pub async fn find_dependencies(&self, entity: &str, id: &RecordId) -> Vec<DependencyGroup> {
        let tables = self.tables.read().await;
        find_dependencies_in(&tables, entity, id.as_str())
    }
}

fn ensure_references(tables: &Tables, references: &[(&str, &str)]) -> Result<()> {
    for (entity, id) in references {
        if !table(tables, entity)?.iter().any(|record| record.id.as_str() == *id) {
            return Err(ApiException::new(
                ErrorCode::Conflict,
                format!("{entity} record '{id}' was removed"),
            )
            .into());
        }
    }
    Ok(())
}

fn table<'a>(tables: &'a Tables, entity: &str) -> Result<&'a [Record]> {
    match tables.get(entity) {
        Some(rows) => Ok(rows),
        None => bail!("unknown entity '{entity}'"),
    }
}

fn table_mut<'a>(tables: &'a mut Tables, entity: &str) -> Result<&'a mut Vec<Record>> {
    if entity_metadata(entity).is_none() {
        bail!("unknown entity '{entity}'");
    }
    match tables.get_mut(entity) {
        Some(rows) => Ok(rows),
        None => bail!("table for entity '{entity}' is missing"),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
