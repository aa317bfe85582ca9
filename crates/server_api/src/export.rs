//! CSV and JSON export of selected records.

use serde_json::{Map, Value};
use shared::{
    domain::{ExportFormat, RecordId},
    error::{ApiError, ErrorCode},
    metadata::{EntityMetadata, FieldMetadata},
    record::Record,
};
use thiserror::Error;
use tracing::info;

use crate::{columns::default_columns, internal, lookup_entity, record_not_found, ApiContext};

/// Rendered export, ready to be sent as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub format: ExportFormat,
    pub file_name: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer flush failed: {0}")]
    Flush(String),
    #[error("csv output is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ExportError> for ApiError {
    fn from(value: ExportError) -> Self {
        ApiError::new(ErrorCode::Internal, value.to_string())
    }
}

/// Exports the records named in `ids` (all records when empty) with the
/// requested columns (the default table columns when empty).
pub async fn export_records(
    ctx: &ApiContext,
    entity: &str,
    ids: &[RecordId],
    columns: &[String],
    format: ExportFormat,
) -> Result<Export, ApiError> {
    let meta = lookup_entity(entity)?;
    let records = ctx.storage.list(meta.name).await.map_err(internal)?;
    let records = if ids.is_empty() {
        records
    } else {
        if let Some(missing) = ids
            .iter()
            .find(|id| !records.iter().any(|record| &record.id == *id))
        {
            return Err(record_not_found(meta, missing.as_str()));
        }
        records
            .into_iter()
            .filter(|record| ids.contains(&record.id))
            .collect()
    };
    let columns = export_columns(meta, columns, ctx.settings.default_visible_columns);

    let body = match format {
        ExportFormat::Csv => to_csv(&records, &columns)?,
        ExportFormat::Json => to_json(&records, &columns)?,
    };
    info!(entity = meta.name, records = records.len(), ?format, "records exported");
    Ok(Export {
        format,
        file_name: format!("{}-export.{}", meta.name, format.extension()),
        body,
    })
}

/// Any metadata field except the password may be exported.
fn export_columns(
    meta: &EntityMetadata,
    requested: &[String],
    default_count: usize,
) -> Vec<&'static FieldMetadata> {
    let chosen: Vec<_> = meta
        .fields
        .iter()
        .filter(|field| field.name != "password")
        .filter(|field| requested.iter().any(|name| name == field.name))
        .collect();
    if chosen.is_empty() {
        default_columns(meta, default_count)
    } else {
        chosen
    }
}

fn to_csv(records: &[Record], columns: &[&FieldMetadata]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header = vec!["ID"];
    header.extend(columns.iter().map(|field| field.label));
    writer.write_record(&header)?;

    for record in records {
        let mut row = vec![record.id.to_string()];
        row.extend(
            columns
                .iter()
                .map(|field| record.get(field.name).map(cell_text).unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.error().to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

fn to_json(records: &[Record], columns: &[&FieldMetadata]) -> Result<String, ExportError> {
    let rows: Vec<Value> = records
        .iter()
        .map(|record| {
            let mut row = Map::new();
            row.insert("id".into(), Value::String(record.id.to_string()));
            for field in columns {
                let value = record.get(field.name).cloned().unwrap_or(Value::Null);
                row.insert(field.name.to_string(), value);
            }
            Value::Object(row)
        })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

/// Flat text of one value: arrays are joined with `; `.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(cell_text)
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/export_tests.rs"]
mod tests;
