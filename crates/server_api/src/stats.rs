use shared::{
    error::ApiError,
    metadata::{entity_label, NAV_GROUPS},
    protocol::{DashboardSummary, EntityStats, EntitySummary, NavSection, StatCard},
    record::Record,
};

use crate::{internal, lookup_entity, ApiContext};

const ACTIVE: &[&str] = &["Active", "Approved"];
const PENDING: &[&str] = &["Pending", "In Progress"];
const INACTIVE: &[&str] = &["Inactive", "Rejected"];

/// Dashboard cards: title and the entity whose record count they show.
const CARDS: &[(&str, &str)] = &[
    ("Active Research", "research"),
    ("Patents", "patent-utility"),
    ("Active Licenses", "license"),
    ("Total Users", "user"),
];

pub fn tally(records: &[Record]) -> EntityStats {
    let with_status = |statuses: &[&str]| {
        records
            .iter()
            .filter(|record| record.status().is_some_and(|status| statuses.contains(&status)))
            .count()
    };
    EntityStats {
        total: records.len(),
        active: with_status(ACTIVE),
        pending: with_status(PENDING),
        inactive: with_status(INACTIVE),
    }
}

pub async fn entity_stats(ctx: &ApiContext, entity: &str) -> Result<EntityStats, ApiError> {
    let meta = lookup_entity(entity)?;
    let records = ctx.storage.list(meta.name).await.map_err(internal)?;
    Ok(tally(&records))
}

pub async fn dashboard_summary(ctx: &ApiContext) -> Result<DashboardSummary, ApiError> {
    let counts = ctx.storage.counts().await;
    let count_of = |entity: &str| counts.get(entity).copied().unwrap_or_default();

    let cards = CARDS
        .iter()
        .map(|(title, entity)| StatCard {
            title: title.to_string(),
            entity: entity.to_string(),
            value: count_of(*entity),
        })
        .collect();
    let sections = NAV_GROUPS
        .iter()
        .map(|group| NavSection {
            title: group.title.to_string(),
            entities: group
                .entities
                .iter()
                .map(|entity| EntitySummary {
                    name: entity.to_string(),
                    label: entity_label(entity).to_string(),
                    count: count_of(*entity),
                })
                .collect(),
        })
        .collect();
    Ok(DashboardSummary { cards, sections })
}

#[cfg(test)]
#[path = "tests/stats_tests.rs"]
mod tests;
