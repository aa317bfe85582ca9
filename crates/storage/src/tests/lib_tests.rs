use serde_json::json;
use shared::{domain::RecordId, record::Record};

use super::*;

#[tokio::test]
async fn seeded_store_has_demo_rows() {
    let storage = Storage::seeded();
    storage.health_check().await.unwrap();

    assert_eq!(storage.count("user").await.unwrap(), 3);
    assert_eq!(storage.count("research").await.unwrap(), 2);
    assert_eq!(storage.count("license").await.unwrap(), 0);

    let counts = storage.counts().await;
    assert_eq!(counts.len(), 21);
    assert_eq!(counts["entity"], 3);

    let r1 = storage.get("research", "r1").await.unwrap().unwrap();
    assert_eq!(
        r1.display_name(),
        "Advanced Machine Learning for Medical Diagnostics"
    );
    assert_eq!(r1.get("research_team_ids"), Some(&json!(["u1", "u2"])));
}

#[tokio::test]
async fn empty_store_still_has_every_table() {
    let storage = Storage::empty();
    storage.health_check().await.unwrap();
    assert!(storage.list("fund").await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_entity_is_an_error() {
    let storage = Storage::empty();
    assert!(storage.list("spaceship").await.is_err());
    assert!(storage
        .insert("spaceship", Record::new("x", "u1", "2024-01-01T00:00:00Z"))
        .await
        .is_err());
    assert!(storage
        .find_dependencies("spaceship", &RecordId::from("x"))
        .await
        .is_empty());
}

#[tokio::test]
async fn insert_rejects_duplicate_ids() {
    let storage = Storage::empty();
    let record = Record::new("ra9", "u1", "2024-01-01T00:00:00Z").with("name", "Optics");
    storage.insert("research-area", record.clone()).await.unwrap();
    let err = storage
        .insert("research-area", record)
        .await
        .expect_err("duplicate");
    let exception = err.downcast::<ApiException>().expect("coded error");
    assert_eq!(exception.code, ErrorCode::Conflict);
    assert!(storage.contains("research-area", "ra9").await.unwrap());
}

#[tokio::test]
async fn checked_writes_refuse_references_removed_in_between() {
    let storage = Storage::seeded();
    assert!(matches!(
        storage.remove_unreferenced("research-area", "ra2").await.unwrap(),
        Removal::Removed(_)
    ));

    let research = Record::new("r9", "u1", "2024-06-01T00:00:00Z")
        .with("title", "Enzymes")
        .with("research_area_ids", json!(["ra2"]));
    let err = storage
        .insert_checked("research", research.clone(), &[("research-area", "ra2")])
        .await
        .expect_err("dangling reference");
    let exception = err.downcast::<ApiException>().expect("coded error");
    assert_eq!(exception.code, ErrorCode::Conflict);
    assert!(!storage.contains("research", "r9").await.unwrap());

    storage
        .insert_checked("research", research.clone(), &[("research-area", "ra1")])
        .await
        .expect("insert");
    let err = storage
        .replace_checked("research", research, &[("user", "u9")])
        .await
        .expect_err("dangling reference");
    assert!(err.downcast_ref::<ApiException>().is_some());
}

#[tokio::test]
async fn replace_and_remove() {
    let storage = Storage::seeded();
    let mut fund = storage.get("fund", "f1").await.unwrap().unwrap();
    fund.fields.insert("amount".into(), json!("$600,000"));
    assert!(storage.replace("fund", fund).await.unwrap());

    let missing = Record::new("f404", "u1", "2024-01-01T00:00:00Z");
    assert!(!storage.replace("fund", missing).await.unwrap());

    let stored = storage.get("fund", "f1").await.unwrap().unwrap();
    assert_eq!(stored.get_str("amount"), Some("$600,000"));

    let removed = storage.remove("fund", "f1").await.unwrap();
    assert_eq!(removed.map(|record| record.id), Some(RecordId::from("f1")));
    assert_eq!(storage.remove("fund", "f1").await.unwrap(), None);
}

#[tokio::test]
async fn dependencies_group_by_entity_and_field() {
    let storage = Storage::seeded();
    let groups = storage
        .find_dependencies("research", &RecordId::from("r1"))
        .await;

    let summary: Vec<(&str, &str, usize)> = groups
        .iter()
        .map(|group| {
            (
                group.entity_name.as_str(),
                group.field_name.as_str(),
                group.records.len(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("research-outputs", "research_id", 1),
            ("invention-disclosure", "research_id", 1),
            ("tech-assessment", "research_id", 1),
            ("market-assessment", "research_id", 1),
        ]
    );
    assert_eq!(groups[0].records[0].name, "AI Diagnostic Algorithm v1.0");
}

#[tokio::test]
async fn array_fields_count_as_references() {
    let storage = Storage::seeded();
    let groups = storage.find_dependencies("user", &RecordId::from("u3")).await;
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].entity_name, "research");
    assert_eq!(groups[0].field_name, "research_team_ids");
    assert_eq!(groups[0].records[0].id, RecordId::from("r2"));
}

#[tokio::test]
async fn creator_stamp_counts_but_not_on_itself() {
    let storage = Storage::seeded();
    let groups = storage.find_dependencies("user", &RecordId::from("u1")).await;

    let user_group = groups
        .iter()
        .find(|group| group.entity_name == "user" && group.field_name == "creation_user_id")
        .unwrap();
    let ids: Vec<&str> = user_group
        .records
        .iter()
        .map(|record| record.id.as_str())
        .collect();
    assert_eq!(ids, vec!["u2", "u3"]);
}

#[tokio::test]
async fn object_values_are_not_scanned() {
    let storage = Storage::seeded();
    let groups = storage.find_dependencies("entity", &RecordId::from("e2")).await;
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].entity_name, "industry-challenge");
    assert_eq!(groups[0].field_name, "entity_ids");
}

#[tokio::test]
async fn remove_unreferenced_checks_first() {
    let storage = Storage::seeded();

    match storage.remove_unreferenced("research-area", "ra1").await.unwrap() {
        Removal::Referenced(groups) => assert_eq!(groups[0].field_name, "research_area_ids"),
        other => panic!("expected a blocked removal, got {other:?}"),
    }
    assert!(storage.contains("research-area", "ra1").await.unwrap());

    match storage.remove_unreferenced("research-area", "ra2").await.unwrap() {
        Removal::Removed(record) => assert_eq!(record.display_name(), "Biotechnology"),
        other => panic!("expected a removal, got {other:?}"),
    }
    assert_eq!(
        storage.remove_unreferenced("research-area", "ra2").await.unwrap(),
        Removal::Missing
    );
}
