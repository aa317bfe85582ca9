//! Field-level validation of record input against entity metadata.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use shared::{
    error::ApiError,
    metadata::{EntityMetadata, FieldMetadata, FieldType},
    record::FieldMap,
};

use crate::{internal, ApiContext};

/// Checks `fields` against `meta`. Required fields are checked on the whole
/// map; value shapes are checked for every key of `touched` (all of `fields`
/// when `None`). Foreign keys must name existing records.
pub async fn validate_record(
    ctx: &ApiContext,
    meta: &EntityMetadata,
    fields: &FieldMap,
    touched: Option<&FieldMap>,
) -> Result<(), ApiError> {
    let mut problems = BTreeMap::new();

    for field in meta.fields {
        let value = fields.get(field.name);
        if field.required && value.map_or(true, is_blank) {
            problems.insert(field.name.to_string(), format!("{} is required", field.label));
            continue;
        }
        let checked = touched.map_or(true, |patch| patch.contains_key(field.name));
        let Some(value) = value.filter(|value| checked && !value.is_null()) else {
            continue;
        };
        if let Err(problem) = check_value(field, value) {
            problems.insert(field.name.to_string(), problem);
            continue;
        }
        if let Some(missing) = missing_reference(ctx, field, value).await? {
            problems.insert(
                field.name.to_string(),
                format!("{} refers to missing record '{missing}'", field.label),
            );
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(problems))
    }
}

/// Shape check of one non-null value.
pub fn check_value(field: &FieldMetadata, value: &Value) -> Result<(), String> {
    let label = field.label;
    match field.field_type {
        FieldType::Text | FieldType::Textarea | FieldType::File | FieldType::Foreignkey => {
            if value.is_string() {
                Ok(())
            } else {
                Err(format!("{label} must be text"))
            }
        }
        FieldType::Email => match value.as_str() {
            Some(text) if looks_like_email(text) => Ok(()),
            _ => Err(format!("{label} must be an email address")),
        },
        FieldType::Number => match value {
            Value::Number(_) => Ok(()),
            Value::String(text) if text.trim().parse::<f64>().is_ok_and(f64::is_finite) => Ok(()),
            _ => Err(format!("{label} must be a number")),
        },
        FieldType::Date => match value.as_str() {
            Some(text) if is_date(text) => Ok(()),
            _ => Err(format!("{label} must be a date")),
        },
        FieldType::Boolean => {
            if value.is_boolean() {
                Ok(())
            } else {
                Err(format!("{label} must be true or false"))
            }
        }
        FieldType::Select => match value.as_str() {
            Some(choice) if field.options.contains(&choice) => Ok(()),
            _ => Err(format!(
                "{label} must be one of: {}",
                field.options.join(", ")
            )),
        },
        FieldType::Multiselect => {
            let items = string_items(value).ok_or_else(|| format!("{label} must be a list"))?;
            match items.iter().find(|item| !field.options.contains(item)) {
                Some(item) => Err(format!("{label} has an unknown option '{item}'")),
                None => Ok(()),
            }
        }
        FieldType::Multifile | FieldType::Multiforeignkey => string_items(value)
            .map(|_| ())
            .ok_or_else(|| format!("{label} must be a list")),
    }
}

/// First referenced id that has no record in the foreign entity.
async fn missing_reference(
    ctx: &ApiContext,
    field: &FieldMetadata,
    value: &Value,
) -> Result<Option<String>, ApiError> {
    let Some(foreign) = field.foreign_entity.filter(|_| field.is_foreign_key()) else {
        return Ok(None);
    };
    let ids = match value {
        Value::String(id) if !id.is_empty() => vec![id.as_str()],
        Value::Array(_) => string_items(value).unwrap_or_default(),
        _ => Vec::new(),
    };
    for id in ids {
        if !ctx.storage.contains(foreign, id).await.map_err(internal)? {
            return Ok(Some(id.to_string()));
        }
    }
    Ok(None)
}

/// `(entity, id)` of every foreign key value among the checked fields, for
/// the storage write to confirm again under its lock.
pub fn foreign_references<'a>(
    meta: &EntityMetadata,
    fields: &'a FieldMap,
    touched: Option<&FieldMap>,
) -> Vec<(&'static str, &'a str)> {
    let mut references = Vec::new();
    for field in meta.foreign_keys() {
        if touched.is_some_and(|patch| !patch.contains_key(field.name)) {
            continue;
        }
        let (Some(foreign), Some(value)) = (field.foreign_entity, fields.get(field.name)) else {
            continue;
        };
        let ids = match value {
            Value::String(id) if !id.is_empty() => vec![id.as_str()],
            Value::Array(_) => string_items(value).unwrap_or_default(),
            _ => Vec::new(),
        };
        references.extend(ids.into_iter().map(|id| (foreign, id)));
    }
    references
}

pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn string_items(value: &Value) -> Option<Vec<&str>> {
    value.as_array()?.iter().map(Value::as_str).collect()
}

fn looks_like_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    match text.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

/// `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn is_date(text: &str) -> bool {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(text).is_ok()
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
