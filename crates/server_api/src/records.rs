use chrono::Utc;
use shared::{
    domain::RecordId,
    error::ApiError,
    protocol::RecordPage,
    record::{FieldMap, Record, RESERVED_FIELDS},
};
use tracing::info;

use crate::{
    columns::resolve_columns, internal, lookup_entity, record_not_found,
    validation::{foreign_references, validate_record},
    ApiContext,
};

/// Records of `entity` with any string value containing `search`, ignoring
/// case. The term is matched as given, surrounding spaces included; only an
/// empty search matches everything.
pub async fn list_records(
    ctx: &ApiContext,
    entity: &str,
    search: &str,
) -> Result<Vec<Record>, ApiError> {
    let meta = lookup_entity(entity)?;
    let records = ctx.storage.list(meta.name).await.map_err(internal)?;
    let needle = search.to_lowercase();
    if needle.is_empty() {
        return Ok(records);
    }
    Ok(records
        .into_iter()
        .filter(|record| matches_search(record, &needle))
        .collect())
}

/// `needle` must already be lowercased.
pub fn matches_search(record: &Record, needle: &str) -> bool {
    record
        .string_values()
        .any(|value| value.to_lowercase().contains(needle))
}

/// One list page: the matching records plus the columns to show.
pub async fn record_page(
    ctx: &ApiContext,
    entity: &str,
    search: &str,
    columns: &[String],
) -> Result<RecordPage, ApiError> {
    let meta = lookup_entity(entity)?;
    let total = ctx.storage.count(meta.name).await.map_err(internal)?;
    let records = list_records(ctx, entity, search).await?;
    let columns = resolve_columns(meta, columns, ctx.settings.default_visible_columns);
    Ok(RecordPage {
        entity: meta.name.to_string(),
        label: meta.label.to_string(),
        total,
        matched: records.len(),
        columns: columns.into_iter().copied().collect(),
        records,
    })
}

pub async fn get_record(ctx: &ApiContext, entity: &str, id: &str) -> Result<Record, ApiError> {
    let meta = lookup_entity(entity)?;
    ctx.storage
        .get(meta.name, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| record_not_found(meta, id))
}

/// Validates `input` and stores it under a fresh id, stamped with the
/// configured creator and the current time.
pub async fn create_record(
    ctx: &ApiContext,
    entity: &str,
    input: FieldMap,
) -> Result<Record, ApiError> {
    let meta = lookup_entity(entity)?;
    let mut fields = without_reserved(input);
    fields.retain(|_, value| !value.is_null());
    validate_record(ctx, meta, &fields, None).await?;

    let mut record = Record::stamped(
        RecordId::generate(meta.name),
        ctx.settings.creation_user_id.clone(),
        Utc::now(),
    );
    let references = foreign_references(meta, &fields, None);
    ctx.storage
        .insert_checked(meta.name, record_with(&record, &fields), &references)
        .await
        .map_err(internal)?;
    record.fields = fields;
    info!(entity = meta.name, id = %record.id, "record created");
    Ok(record)
}

/// Merges `patch` over the stored record. A null value clears the field.
/// The id and creation stamp never change.
pub async fn update_record(
    ctx: &ApiContext,
    entity: &str,
    id: &str,
    patch: FieldMap,
) -> Result<Record, ApiError> {
    let mut record = get_record(ctx, entity, id).await?;
    let meta = lookup_entity(entity)?;
    let patch = without_reserved(patch);

    let mut fields = record.fields.clone();
    for (name, value) in &patch {
        if value.is_null() {
            fields.remove(name);
        } else {
            fields.insert(name.clone(), value.clone());
        }
    }
    validate_record(ctx, meta, &fields, Some(&patch)).await?;

    let references = foreign_references(meta, &fields, Some(&patch));
    let replaced = ctx
        .storage
        .replace_checked(meta.name, record_with(&record, &fields), &references)
        .await
        .map_err(internal)?;
    record.fields = fields;
    if !replaced {
        return Err(record_not_found(meta, id));
    }
    info!(entity = meta.name, id, "record updated");
    Ok(record)
}

fn record_with(record: &Record, fields: &FieldMap) -> Record {
    Record {
        fields: fields.clone(),
        ..record.clone()
    }
}

fn without_reserved(mut fields: FieldMap) -> FieldMap {
    for reserved in RESERVED_FIELDS {
        fields.remove(*reserved);
    }
    fields
}

#[cfg(test)]
#[path = "tests/records_tests.rs"]
mod tests;
