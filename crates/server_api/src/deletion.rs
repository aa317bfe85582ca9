//! Delete guarded by the dependency check.

use shared::{
    domain::RecordId,
    error::ApiError,
    protocol::{BulkDeleteOutcome, DeleteCheck, DeleteOutcome},
};
use storage::Removal;
use tracing::{info, warn};

use crate::{internal, lookup_entity, record_not_found, records::get_record, ApiContext};

/// Who would stop `id` from being deleted, without deleting anything.
pub async fn check_delete(
    ctx: &ApiContext,
    entity: &str,
    id: &str,
) -> Result<DeleteCheck, ApiError> {
    let record = get_record(ctx, entity, id).await?;
    let meta = lookup_entity(entity)?;
    let dependencies = ctx.storage.find_dependencies(meta.name, &record.id).await;
    Ok(DeleteCheck {
        entity_name: meta.name.to_string(),
        record_name: record.display_name().to_string(),
        record_id: record.id,
        dependencies,
    })
}

/// Deletes `id` unless another record still references it. A blocked delete
/// leaves the store untouched and reports the dependents.
pub async fn delete_record(
    ctx: &ApiContext,
    entity: &str,
    id: &str,
) -> Result<DeleteOutcome, ApiError> {
    let record = get_record(ctx, entity, id).await?;
    let meta = lookup_entity(entity)?;
    match ctx
        .storage
        .remove_unreferenced(meta.name, id)
        .await
        .map_err(internal)?
    {
        Removal::Removed(removed) => {
            info!(entity = meta.name, id, "record deleted");
            Ok(DeleteOutcome::Deleted {
                name: removed.display_name().to_string(),
                id: removed.id,
            })
        }
        Removal::Referenced(dependencies) => {
            warn!(entity = meta.name, id, groups = dependencies.len(), "delete blocked");
            Ok(DeleteOutcome::Blocked {
                check: DeleteCheck {
                    entity_name: meta.name.to_string(),
                    record_name: record.display_name().to_string(),
                    record_id: record.id,
                    dependencies,
                },
            })
        }
        Removal::Missing => Err(record_not_found(meta, id)),
    }
}

/// Deletes every selected record that nothing references. Passes repeat
/// until one deletes nothing, so dependents picked in the same selection
/// are cleared out first whatever the order of `ids`. Unknown ids fail the
/// whole request before anything is deleted.
pub async fn bulk_delete(
    ctx: &ApiContext,
    entity: &str,
    ids: &[RecordId],
) -> Result<BulkDeleteOutcome, ApiError> {
    let meta = lookup_entity(entity)?;
    let mut pending: Vec<&RecordId> = Vec::with_capacity(ids.len());
    for id in ids {
        if pending.contains(&id) {
            continue;
        }
        if !ctx
            .storage
            .contains(meta.name, id.as_str())
            .await
            .map_err(internal)?
        {
            return Err(record_not_found(meta, id.as_str()));
        }
        pending.push(id);
    }

    let mut outcome = BulkDeleteOutcome::default();
    loop {
        let mut remaining = Vec::new();
        for id in &pending {
            match ctx
                .storage
                .remove_unreferenced(meta.name, id.as_str())
                .await
                .map_err(internal)?
            {
                Removal::Removed(record) => outcome.deleted.push(record.id),
                Removal::Referenced(_) => remaining.push(*id),
                Removal::Missing => {}
            }
        }
        let progressed = remaining.len() < pending.len();
        pending = remaining;
        if pending.is_empty() || !progressed {
            break;
        }
    }

    for id in pending {
        outcome
            .blocked
            .push(check_delete(ctx, meta.name, id.as_str()).await?);
    }
    info!(
        entity = meta.name,
        deleted = outcome.deleted.len(),
        blocked = outcome.blocked.len(),
        "bulk delete finished"
    );
    Ok(outcome)
}

#[cfg(test)]
#[path = "tests/deletion_tests.rs"]
mod tests;
