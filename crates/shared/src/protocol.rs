use serde::{Deserialize, Serialize};

use crate::{
    domain::{ExportFormat, RecordId},
    metadata::FieldMetadata,
    record::{FieldMap, Record},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub id: RecordId,
    pub name: String,
}

/// Records of one entity that reference the checked record through one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGroup {
    pub entity_name: String,
    pub field_name: String,
    pub records: Vec<DependencyRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteCheck {
    pub entity_name: String,
    pub record_id: RecordId,
    pub record_name: String,
    pub dependencies: Vec<DependencyGroup>,
}

impl DeleteCheck {
    pub fn is_blocked(&self) -> bool {
        !self.dependencies.is_empty()
    }

    pub fn dependent_count(&self) -> usize {
        self.dependencies.iter().map(|group| group.records.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted { id: RecordId, name: String },
    Blocked { check: DeleteCheck },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteOutcome {
    pub deleted: Vec<RecordId>,
    pub blocked: Vec<DeleteCheck>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<RecordId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub ids: Vec<RecordId>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionIcon {
    FileText,
    Lightbulb,
    BarChart,
    Wrench,
}

/// Workflow shortcut from one entity's page to a create form of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuickAction {
    pub label: &'static str,
    pub target_entity: &'static str,
    pub description: &'static str,
    pub icon: ActionIcon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickActionLaunch {
    pub source_entity: String,
    pub source_record_id: RecordId,
    pub target_entity: String,
    pub prefill: FieldMap,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStats {
    pub total: usize,
    pub active: usize,
    pub pending: usize,
    pub inactive: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCard {
    pub title: String,
    pub entity: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub name: String,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavSection {
    pub title: String,
    pub entities: Vec<EntitySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub cards: Vec<StatCard>,
    pub sections: Vec<NavSection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordPage {
    pub entity: String,
    pub label: String,
    pub total: usize,
    pub matched: usize,
    pub columns: Vec<FieldMetadata>,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    RecordCreated {
        entity: String,
        record: Record,
    },
    RecordUpdated {
        entity: String,
        record: Record,
    },
    RecordDeleted {
        entity: String,
        id: RecordId,
    },
    RecordsDeleted {
        entity: String,
        ids: Vec<RecordId>,
    },
}
