use super::*;
use serde_json::json;

fn research() -> Record {
    Record::new("r1", "u1", "2024-01-10T10:00:00Z")
        .with("title", "Advanced Machine Learning")
        .with("research_team_pi_id", "u2")
        .with("research_team_ids", json!(["u1", "u2"]))
        .with("amount", 1200)
}

#[test]
fn display_name_prefers_name_then_title_then_id() {
    let record = research();
    assert_eq!(record.display_name(), "Advanced Machine Learning");

    let named = record.clone().with("name", "Short name");
    assert_eq!(named.display_name(), "Short name");

    let blank = Record::new("ta1", "u1", "2024-05-01T10:00:00Z").with("name", "");
    assert_eq!(blank.display_name(), "ta1");
}

#[test]
fn references_cover_scalars_arrays_and_creator() {
    let record = research();
    assert_eq!(
        record.references("u2"),
        vec!["research_team_ids", "research_team_pi_id"]
    );
    assert_eq!(
        record.references("u1"),
        vec!["creation_user_id", "research_team_ids"]
    );
    assert!(record.references("r1").is_empty());
    assert!(record.references("1200").is_empty());
}

#[test]
fn serializes_flat_with_reserved_fields() {
    let record = research();
    let value = serde_json::to_value(&record).expect("json");
    assert_eq!(value["id"], "r1");
    assert_eq!(value["creation_user_id"], "u1");
    assert_eq!(value["research_team_ids"], json!(["u1", "u2"]));

    let back: Record = serde_json::from_value(value).expect("record");
    assert_eq!(back, record);
}

#[test]
fn string_values_include_identity_and_skip_non_strings() {
    let record = research();
    let values: Vec<&str> = record.string_values().collect();
    assert!(values.contains(&"r1"));
    assert!(values.contains(&"u2"));
    assert!(!values.iter().any(|value| *value == "1200"));
}
