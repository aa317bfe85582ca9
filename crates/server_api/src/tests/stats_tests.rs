use shared::record::Record;

use super::*;
use crate::test_support::seeded_context;

#[test]
fn statuses_fall_into_buckets() {
    let records: Vec<Record> = ["Active", "Approved", "Pending", "In Progress", "Rejected", "Draft"]
        .iter()
        .enumerate()
        .map(|(index, status)| {
            Record::new(format!("p{index}"), "u1", "2024-01-01T00:00:00Z").with("status", *status)
        })
        .chain(std::iter::once(Record::new("p9", "u1", "2024-01-01T00:00:00Z")))
        .collect();
    assert_eq!(
        tally(&records),
        EntityStats {
            total: 7,
            active: 2,
            pending: 2,
            inactive: 1,
        }
    );
}

#[tokio::test]
async fn seeded_research_is_active() {
    let ctx = seeded_context();
    let stats = entity_stats(&ctx, "research").await.expect("stats");
    assert_eq!(stats.total, 2);
    assert_eq!(stats.active, 2);
    assert!(entity_stats(&ctx, "nope").await.is_err());
}

#[tokio::test]
async fn dashboard_cards_and_sections() {
    let ctx = seeded_context();
    let summary = dashboard_summary(&ctx).await.expect("summary");
    let cards: Vec<(&str, usize)> = summary
        .cards
        .iter()
        .map(|card| (card.title.as_str(), card.value))
        .collect();
    assert_eq!(
        cards,
        vec![
            ("Active Research", 2),
            ("Patents", 1),
            ("Active Licenses", 0),
            ("Total Users", 3),
        ]
    );
    assert_eq!(summary.sections.len(), 7);
    let funding = &summary.sections[4];
    assert_eq!(funding.title, "Funding");
    assert_eq!(funding.entities[0].label, "Fund Types");
    assert_eq!(funding.entities[0].count, 2);
}
