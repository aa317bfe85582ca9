use shared::{
    domain::UserRef,
    error::{ApiError, ApiException, ErrorCode},
    metadata::{entity_metadata, EntityMetadata},
};
use storage::Storage;

pub mod columns;
pub mod deletion;
pub mod export;
pub mod records;
pub mod render;
pub mod stats;
pub mod validation;
pub mod workflow;

pub use columns::{available_columns, default_columns, resolve_columns, toggle_column};
pub use deletion::{bulk_delete, check_delete, delete_record};
pub use export::{export_records, Export};
pub use records::{create_record, get_record, list_records, record_page, update_record};
pub use stats::{dashboard_summary, entity_stats};
pub use workflow::{launch_quick_action, quick_actions};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
    pub settings: ApiSettings,
}

impl ApiContext {
    pub fn new(storage: Storage, settings: ApiSettings) -> Self {
        Self { storage, settings }
    }
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Stamped as `creation_user_id` on every record created through the API.
    pub creation_user_id: UserRef,
    pub default_visible_columns: usize,
    pub cell_truncate_at: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            creation_user_id: UserRef::from("u1"),
            default_visible_columns: 6,
            cell_truncate_at: 50,
        }
    }
}

/// Metadata for `entity`, or a `not_found` error naming it.
pub fn lookup_entity(entity: &str) -> Result<&'static EntityMetadata, ApiError> {
    entity_metadata(entity).ok_or_else(|| ApiError::not_found(format!("unknown entity '{entity}'")))
}

fn record_not_found(meta: &EntityMetadata, id: &str) -> ApiError {
    ApiError::not_found(format!("{} record '{id}' not found", meta.name))
}

/// Storage errors carrying an [`ApiException`] keep their code; anything
/// else is internal.
fn internal(err: anyhow::Error) -> ApiError {
    match err.downcast::<ApiException>() {
        Ok(exception) => exception.into(),
        Err(err) => ApiError::new(ErrorCode::Internal, err.to_string()),
    }
}

#[cfg(test)]
mod test_support {
    use super::*;

    pub(crate) fn seeded_context() -> ApiContext {
        ApiContext::new(Storage::seeded(), ApiSettings::default())
    }

    pub(crate) fn empty_context() -> ApiContext {
        ApiContext::new(Storage::empty(), ApiSettings::default())
    }
}
