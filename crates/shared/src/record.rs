use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{RecordId, UserRef};

/// Field values keyed by field name.
pub type FieldMap = BTreeMap<String, Value>;

/// Field names every record carries outside of its metadata-declared fields.
pub const RESERVED_FIELDS: &[&str] = &["id", "creation_user_id", "creation_timestamp"];

/// One row of any entity. Only the identity and creation stamp are typed;
/// everything else is kept as JSON so the metadata decides how to read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub creation_user_id: UserRef,
    pub creation_timestamp: String,
    #[serde(flatten)]
    pub fields: FieldMap,
}

impl Record {
    pub fn new(
        id: impl Into<RecordId>,
        creation_user_id: impl Into<UserRef>,
        creation_timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            creation_user_id: creation_user_id.into(),
            creation_timestamp: creation_timestamp.into(),
            fields: FieldMap::new(),
        }
    }

    pub fn stamped(id: RecordId, creation_user_id: UserRef, at: DateTime<Utc>) -> Self {
        Self::new(
            id,
            creation_user_id,
            at.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// String value of any field, including the reserved ones.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match name {
            "id" => Some(self.id.as_str()),
            "creation_user_id" => Some(self.creation_user_id.as_str()),
            "creation_timestamp" => Some(&self.creation_timestamp),
            _ => self.fields.get(name).and_then(Value::as_str),
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.get_str("status")
    }

    /// Human readable name: `name`, then `title`, then the id.
    pub fn display_name(&self) -> &str {
        ["name", "title"]
            .iter()
            .filter_map(|key| self.fields.get(*key).and_then(Value::as_str))
            .find(|value| !value.is_empty())
            .unwrap_or(self.id.as_str())
    }

    /// Every string-typed value of the record, reserved fields first.
    pub fn string_values(&self) -> impl Iterator<Item = &str> {
        [
            self.id.as_str(),
            self.creation_user_id.as_str(),
            self.creation_timestamp.as_str(),
        ]
        .into_iter()
        .chain(self.fields.values().filter_map(Value::as_str))
    }

    /// Names of the fields holding `id`, either as the whole value or as an
    /// element of an array value. The record's own `id` is never a reference.
    pub fn references(&self, id: &str) -> Vec<&str> {
        let mut fields = Vec::new();
        if self.creation_user_id.as_str() == id {
            fields.push("creation_user_id");
        }
        for (name, value) in &self.fields {
            if value_references(value, id) {
                fields.push(name.as_str());
            }
        }
        fields
    }
}

fn value_references(value: &Value, id: &str) -> bool {
    match value {
        Value::String(text) => text == id,
        Value::Array(items) => items.iter().any(|item| item.as_str() == Some(id)),
        _ => false,
    }
}

#[cfg(test)]
#[path = "tests/record_tests.rs"]
mod tests;
