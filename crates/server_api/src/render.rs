//! Field renderer and page view models.
//!
//! Every page is produced from metadata alone: a field's type picks its
//! input widget on forms and its read-only [`Display`] in tables and
//! detail views. The view models are plain serializable data so the server
//! can hand them straight to its templates.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use serde_json::{Number, Value};
use shared::{
    error::ApiError,
    metadata::{entity_label, EntityMetadata, FieldMetadata, FieldType},
    protocol::{DeleteCheck, DependencyRecord, EntityStats, QuickAction},
    record::{FieldMap, Record, RESERVED_FIELDS},
};

use crate::{
    columns::available_columns, export::cell_text, internal, lookup_entity,
    records::{get_record, record_page},
    stats::entity_stats,
    validation::is_blank,
    workflow::quick_actions,
    ApiContext,
};

/// Dependents listed per group on the delete confirmation.
pub const MAX_LISTED_DEPENDENTS: usize = 5;

const TEXTAREA_ROWS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Table cell: terse, long text cut at `truncate_at` characters.
    Cell { truncate_at: usize },
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeVariant {
    Default,
    Secondary,
    Outline,
}

/// Read-only rendering of one field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Display {
    Empty { text: &'static str },
    Text { text: String },
    Badge { text: String, variant: BadgeVariant },
    Reference { entity: String, id: String, text: String },
    Badges { items: Vec<String> },
    Files { items: Vec<String> },
    Preformatted { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Input widget of one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Widget {
    Input {
        input_type: &'static str,
        value: String,
        placeholder: String,
    },
    DateInput {
        value: String,
    },
    TextArea {
        rows: u8,
        value: String,
        placeholder: String,
    },
    Checkbox {
        checked: bool,
        caption: String,
    },
    Select {
        placeholder: String,
        options: Vec<Choice>,
    },
    ForeignSelect {
        entity: String,
        placeholder: String,
        options: Vec<Choice>,
    },
    Checklist {
        options: Vec<Choice>,
    },
    FileInput {
        multiple: bool,
        current: Vec<String>,
    },
}

/// Display names of the records foreign keys can point at, per entity.
#[derive(Debug, Clone, Default)]
pub struct ForeignNames {
    by_entity: HashMap<&'static str, Vec<(String, String)>>,
}

impl ForeignNames {
    /// Loads every entity referenced by a foreign key of `meta`.
    pub async fn load(ctx: &ApiContext, meta: &EntityMetadata) -> Result<Self, ApiError> {
        let mut names = Self::default();
        for entity in meta.foreign_keys().filter_map(|field| field.foreign_entity) {
            if names.by_entity.contains_key(entity) {
                continue;
            }
            let records = ctx.storage.list(entity).await.map_err(internal)?;
            names.insert(entity, &records);
        }
        Ok(names)
    }

    pub fn insert(&mut self, entity: &'static str, records: &[Record]) {
        let entries = records
            .iter()
            .map(|record| (record.id.to_string(), record.display_name().to_string()))
            .collect();
        self.by_entity.insert(entity, entries);
    }

    pub fn name_of(&self, entity: &str, id: &str) -> Option<&str> {
        self.by_entity
            .get(entity)?
            .iter()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, name)| name.as_str())
    }

    fn records_of(&self, entity: &str) -> &[(String, String)] {
        self.by_entity.get(entity).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Input placeholder: the declared one, else `Enter <label>`.
pub fn placeholder_for(field: &FieldMetadata) -> String {
    match field.placeholder {
        Some(placeholder) => placeholder.to_string(),
        None => format!("Enter {}", field.label.to_lowercase()),
    }
}

fn select_placeholder(field: &FieldMetadata) -> String {
    format!("Select {}", field.label.to_lowercase())
}

/// Widget for `field`, showing `value` when there is one.
pub fn widget_for(field: &FieldMetadata, value: Option<&Value>, names: &ForeignNames) -> Widget {
    let text = value.map(input_text).unwrap_or_default();
    let selected = string_list(value);
    match field.field_type {
        FieldType::Text | FieldType::Email | FieldType::Number => Widget::Input {
            input_type: match field.field_type {
                FieldType::Email => "email",
                FieldType::Number => "number",
                _ => "text",
            },
            value: text,
            placeholder: placeholder_for(field),
        },
        FieldType::Date => Widget::DateInput {
            value: iso_date(&text).unwrap_or(text),
        },
        FieldType::Textarea => Widget::TextArea {
            rows: TEXTAREA_ROWS,
            value: text,
            placeholder: placeholder_for(field),
        },
        FieldType::Boolean => Widget::Checkbox {
            checked: value.and_then(Value::as_bool).unwrap_or(false),
            caption: field.description.unwrap_or("Enable this option").to_string(),
        },
        FieldType::Select => Widget::Select {
            placeholder: select_placeholder(field),
            options: field
                .options
                .iter()
                .map(|option| Choice {
                    value: option.to_string(),
                    label: option.to_string(),
                    selected: *option == text,
                })
                .collect(),
        },
        FieldType::Multiselect => Widget::Checklist {
            options: field
                .options
                .iter()
                .map(|option| Choice {
                    value: option.to_string(),
                    label: option.to_string(),
                    selected: selected.iter().any(|item| item == option),
                })
                .collect(),
        },
        FieldType::Foreignkey => Widget::ForeignSelect {
            entity: field.foreign_entity.unwrap_or_default().to_string(),
            placeholder: select_placeholder(field),
            options: foreign_choices(field, names, |id| id == text),
        },
        FieldType::Multiforeignkey => Widget::Checklist {
            options: foreign_choices(field, names, |id| selected.iter().any(|item| item == id)),
        },
        FieldType::File => Widget::FileInput {
            multiple: false,
            current: value
                .and_then(Value::as_str)
                .map(|name| vec![name.to_string()])
                .unwrap_or_default(),
        },
        FieldType::Multifile => Widget::FileInput {
            multiple: true,
            current: selected,
        },
    }
}

fn foreign_choices(
    field: &FieldMetadata,
    names: &ForeignNames,
    is_selected: impl Fn(&str) -> bool,
) -> Vec<Choice> {
    let entity = field.foreign_entity.unwrap_or_default();
    names
        .records_of(entity)
        .iter()
        .map(|(id, name)| Choice {
            value: id.clone(),
            label: name.clone(),
            selected: is_selected(id),
        })
        .collect()
}

/// Read-only rendering of `value` as `field` declares it.
pub fn display_value(
    field: &FieldMetadata,
    value: Option<&Value>,
    mode: DisplayMode,
    names: &ForeignNames,
) -> Display {
    let Some(value) = value.filter(|value| !value.is_null()) else {
        return Display::Empty {
            text: match mode {
                DisplayMode::Cell { .. } => "—",
                DisplayMode::Detail => "Not set",
            },
        };
    };

    match (field.field_type, mode) {
        (FieldType::Boolean, _) => {
            let yes = value.as_bool().unwrap_or(false);
            Display::Badge {
                text: (if yes { "Yes" } else { "No" }).to_string(),
                variant: if yes {
                    BadgeVariant::Default
                } else {
                    BadgeVariant::Secondary
                },
            }
        }
        (FieldType::Select, _) => Display::Badge {
            text: cell_text(value),
            variant: BadgeVariant::Outline,
        },
        (FieldType::Date, _) => Display::Text {
            text: display_date(&cell_text(value)),
        },
        (FieldType::Foreignkey, _) => {
            let id = cell_text(value);
            let entity = field.foreign_entity.unwrap_or_default();
            let text = match mode {
                DisplayMode::Cell { .. } => id.clone(),
                DisplayMode::Detail => names.name_of(entity, &id).unwrap_or(id.as_str()).to_string(),
            };
            Display::Reference {
                entity: entity.to_string(),
                id,
                text,
            }
        }
        (FieldType::Multiforeignkey, DisplayMode::Detail) => match value.as_array() {
            Some(ids) => {
                let entity = field.foreign_entity.unwrap_or_default();
                Display::Badges {
                    items: ids
                        .iter()
                        .map(|id| {
                            let id = cell_text(id);
                            names.name_of(entity, &id).map(str::to_string).unwrap_or(id)
                        })
                        .collect(),
                }
            }
            None => Display::Empty { text: "None" },
        },
        (FieldType::Multifile, DisplayMode::Detail) => match value.as_array() {
            Some(files) => Display::Files {
                items: files.iter().map(cell_text).collect(),
            },
            None => Display::Text {
                text: cell_text(value),
            },
        },
        (FieldType::Textarea, DisplayMode::Detail) => Display::Preformatted {
            text: cell_text(value),
        },
        (_, DisplayMode::Detail) => Display::Text {
            text: cell_text(value),
        },
        (_, DisplayMode::Cell { truncate_at }) => Display::Text {
            text: truncate(&cell_text(value), truncate_at),
        },
    }
}

/// `YYYY-MM-DD` or RFC 3339 input shown as `MM/DD/YYYY`. Anything else is
/// shown as given.
pub fn display_date(text: &str) -> String {
    match parse_date(text) {
        Some(date) => date.format("%m/%d/%Y").to_string(),
        None => text.to_string(),
    }
}

fn display_timestamp(text: &str) -> String {
    match DateTime::parse_from_rfc3339(text) {
        Ok(at) => at.format("%m/%d/%Y, %H:%M:%S").to_string(),
        Err(_) => text.to_string(),
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|at| at.date_naive()))
}

fn iso_date(text: &str) -> Option<String> {
    parse_date(text).map(|date| date.format("%Y-%m-%d").to_string())
}

pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let head: String = text.chars().take(limit).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

fn input_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    Create,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub description: Option<&'static str>,
    pub full_width: bool,
    pub widget: Widget,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub entity: &'static str,
    pub label: &'static str,
    pub mode: FormMode,
    pub title: String,
    pub intro: &'static str,
    pub record_id: Option<String>,
    pub fields: Vec<FormField>,
    /// Prefilled values with no field of their own, carried as hidden inputs.
    pub hidden: Vec<(String, String)>,
    pub submit_label: &'static str,
    pub message: Option<String>,
}

impl FormView {
    /// Attaches the problems of a rejected submission to their fields.
    pub fn with_error(mut self, error: &ApiError) -> Self {
        for field in &mut self.fields {
            field.error = error.fields.get(field.name).cloned();
        }
        self.message = Some(error.message.clone());
        self
    }
}

/// Create or edit form for `meta`, filled from `initial`. The password field
/// is left out when editing.
pub fn form_view(
    meta: &'static EntityMetadata,
    initial: &FieldMap,
    mode: FormMode,
    record_id: Option<String>,
    names: &ForeignNames,
) -> FormView {
    let fields = meta
        .fields
        .iter()
        .filter(|field| mode == FormMode::Create || field.name != "password")
        .map(|field| FormField {
            name: field.name,
            label: field.label,
            required: field.required,
            description: field.description,
            full_width: field.field_type == FieldType::Textarea,
            widget: widget_for(field, initial.get(field.name), names),
            error: None,
        })
        .collect();
    let hidden = match mode {
        FormMode::Create => initial
            .iter()
            .filter(|(name, _)| meta.field(name).is_none())
            .filter(|(name, _)| !RESERVED_FIELDS.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), cell_text(value)))
            .collect(),
        FormMode::Edit => Vec::new(),
    };
    let (title, intro, submit_label) = match mode {
        FormMode::Create => (
            format!("Create {}", meta.label),
            "Fill in the information below to create a new record.",
            "Create",
        ),
        FormMode::Edit => (
            format!("Edit {}", meta.label),
            "Update the information below to modify this record.",
            "Update",
        ),
    };
    FormView {
        entity: meta.name,
        label: meta.label,
        mode,
        title,
        intro,
        record_id,
        fields,
        hidden,
        submit_label,
        message: None,
    }
}

/// Builds a form for `entity`, loading the records its foreign keys offer.
pub async fn load_form(
    ctx: &ApiContext,
    entity: &str,
    initial: &FieldMap,
    mode: FormMode,
    record_id: Option<String>,
) -> Result<FormView, ApiError> {
    let meta = lookup_entity(entity)?;
    let names = ForeignNames::load(ctx, meta).await?;
    Ok(form_view(meta, initial, mode, record_id, &names))
}

/// Field values from an urlencoded form post, coerced per field type.
/// Unchecked boxes and empty checklists are sent as `false` and `[]`; an
/// empty input becomes null so an edit clears it. File inputs left empty
/// keep what was stored. Names outside the metadata pass through as text.
pub fn parse_form(meta: &EntityMetadata, pairs: &[(String, String)]) -> FieldMap {
    let values_of = |name: &str| -> Vec<&str> {
        pairs
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    };

    let mut fields = FieldMap::new();
    for field in meta.fields {
        let values = values_of(field.name);
        let first = values.first().copied();
        let value = match field.field_type {
            FieldType::Boolean => Some(Value::Bool(
                values
                    .iter()
                    .any(|value| matches!(*value, "on" | "true" | "1" | "yes")),
            )),
            FieldType::Multiselect | FieldType::Multiforeignkey => Some(non_empty_list(&values)),
            FieldType::Multifile => {
                Some(non_empty_list(&values)).filter(|list| !is_blank(list))
            }
            FieldType::File => first
                .filter(|name| !name.is_empty())
                .map(|name| Value::String(name.to_string())),
            FieldType::Number => first.map(|raw| parse_number(raw.trim())),
            _ => first.map(|raw| {
                if raw.trim().is_empty() {
                    Value::Null
                } else {
                    Value::String(raw.to_string())
                }
            }),
        };
        if let Some(value) = value {
            fields.insert(field.name.to_string(), value);
        }
    }

    for (name, value) in pairs {
        if meta.field(name).is_none()
            && !RESERVED_FIELDS.contains(&name.as_str())
            && !fields.contains_key(name)
        {
            fields.insert(name.clone(), Value::String(value.clone()));
        }
    }
    fields
}

fn non_empty_list(values: &[&str]) -> Value {
    Value::Array(
        values
            .iter()
            .filter(|value| !value.is_empty())
            .map(|value| Value::String(value.to_string()))
            .collect(),
    )
}

fn parse_number(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(whole) = raw.parse::<i64>() {
        return Value::Number(whole.into());
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnToggle {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub id: String,
    pub name: String,
    pub cells: Vec<Display>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub entity: &'static str,
    pub label: &'static str,
    pub search: String,
    pub columns: Vec<ColumnToggle>,
    /// Every column candidate, for the column toggle menu.
    pub toggles: Vec<ColumnToggle>,
    pub rows: Vec<TableRow>,
    pub total: usize,
    pub matched: usize,
    pub count_label: String,
    pub empty_message: &'static str,
    pub stats: EntityStats,
    pub quick_actions: Vec<QuickAction>,
    /// Record quick actions launched from the page header start from.
    pub quick_action_source: Option<String>,
}

/// List page of `entity`: searched rows, chosen columns, stats and quick
/// actions.
pub async fn table_view(
    ctx: &ApiContext,
    entity: &str,
    search: &str,
    columns: &[String],
) -> Result<TableView, ApiError> {
    let meta = lookup_entity(entity)?;
    let page = record_page(ctx, entity, search, columns).await?;
    let stats = entity_stats(ctx, entity).await?;
    let mode = DisplayMode::Cell {
        truncate_at: ctx.settings.cell_truncate_at,
    };
    let names = ForeignNames::default();

    let visible: Vec<&str> = page.columns.iter().map(|field| field.name).collect();
    let toggles: Vec<ColumnToggle> = available_columns(meta)
        .into_iter()
        .map(|field| ColumnToggle {
            name: field.name,
            label: field.label,
            required: field.required,
            visible: visible.contains(&field.name),
        })
        .collect();
    let rows = page
        .records
        .iter()
        .map(|record| TableRow {
            id: record.id.to_string(),
            name: record.display_name().to_string(),
            cells: page
                .columns
                .iter()
                .map(|field| display_value(field, record.get(field.name), mode, &names))
                .collect(),
        })
        .collect();
    let all = ctx.storage.list(meta.name).await.map_err(internal)?;

    Ok(TableView {
        entity: meta.name,
        label: meta.label,
        search: search.to_string(),
        columns: toggles.iter().filter(|toggle| toggle.visible).cloned().collect(),
        toggles,
        rows,
        total: page.total,
        matched: page.matched,
        count_label: count_label(page.matched),
        empty_message: if search.is_empty() {
            "No records yet."
        } else {
            "No records found matching your search."
        },
        stats,
        quick_actions: quick_actions(meta.name).to_vec(),
        quick_action_source: all.first().map(|record| record.id.to_string()),
    })
}

pub fn count_label(count: usize) -> String {
    match count {
        1 => "1 record".to_string(),
        n => format!("{n} records"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailField {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub display: Display,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub entity: &'static str,
    pub label: &'static str,
    pub title: String,
    pub record_id: String,
    pub record_name: String,
    pub fields: Vec<DetailField>,
    pub created_by: String,
    pub created_at: String,
    pub quick_actions: Vec<QuickAction>,
}

/// Read-only view of one record. The password is never shown.
pub fn detail_view(meta: &'static EntityMetadata, record: &Record, names: &ForeignNames) -> DetailView {
    let fields = meta
        .fields
        .iter()
        .filter(|field| field.name != "password")
        .map(|field| DetailField {
            name: field.name,
            label: field.label,
            required: field.required,
            display: display_value(field, record.get(field.name), DisplayMode::Detail, names),
        })
        .collect();
    DetailView {
        entity: meta.name,
        label: meta.label,
        title: format!("View {}", meta.label),
        record_id: record.id.to_string(),
        record_name: record.display_name().to_string(),
        fields,
        created_by: record.creation_user_id.to_string(),
        created_at: display_timestamp(&record.creation_timestamp),
        quick_actions: quick_actions(meta.name).to_vec(),
    }
}

pub async fn view_record(ctx: &ApiContext, entity: &str, id: &str) -> Result<DetailView, ApiError> {
    let record = get_record(ctx, entity, id).await?;
    let meta = lookup_entity(entity)?;
    let names = ForeignNames::load(ctx, meta).await?;
    Ok(detail_view(meta, &record, &names))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyGroupView {
    pub entity_label: String,
    pub field_name: String,
    pub count_label: String,
    pub shown: Vec<DependencyRecord>,
    pub more: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteView {
    pub entity: String,
    pub label: String,
    pub record_id: String,
    pub record_name: String,
    pub blocked: bool,
    pub title: String,
    pub message: String,
    pub groups: Vec<DependencyGroupView>,
}

/// Delete confirmation for a checked record. Each dependency group lists
/// its first few records and counts the rest.
pub fn delete_view(check: &DeleteCheck) -> DeleteView {
    let label = entity_label(&check.entity_name).to_string();
    let blocked = check.is_blocked();
    let groups = check
        .dependencies
        .iter()
        .map(|group| DependencyGroupView {
            entity_label: entity_label(&group.entity_name).to_string(),
            field_name: group.field_name.clone(),
            count_label: count_label(group.records.len()),
            shown: group
                .records
                .iter()
                .take(MAX_LISTED_DEPENDENTS)
                .cloned()
                .collect(),
            more: group.records.len().saturating_sub(MAX_LISTED_DEPENDENTS),
        })
        .collect();
    let (title, message) = if blocked {
        (
            format!("Cannot Delete {label}"),
            "This record cannot be deleted because it has dependent records.".to_string(),
        )
    } else {
        (
            "Confirm Deletion".to_string(),
            "This action cannot be undone. Please confirm that you want to delete this record."
                .to_string(),
        )
    };
    DeleteView {
        entity: check.entity_name.clone(),
        record_id: check.record_id.to_string(),
        record_name: check.record_name.clone(),
        label,
        blocked,
        title,
        message,
        groups,
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
