use serde_json::json;
use shared::error::ErrorCode;

use super::*;
use crate::test_support::seeded_context;

#[tokio::test]
async fn csv_uses_labels_and_default_columns() {
    let ctx = seeded_context();
    let export = export_records(&ctx, "user", &[], &[], ExportFormat::Csv)
        .await
        .expect("export");
    assert_eq!(export.file_name, "user-export.csv");

    let lines: Vec<&str> = export.body.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "ID,Name,Title,Phone,Work Phone,Mobile,Email");
    assert_eq!(
        lines[1],
        "u1,Dr. Sarah Johnson,Senior Research Scientist,+1-555-0101,,,sarah.johnson@university.edu"
    );
}

#[tokio::test]
async fn csv_joins_arrays_and_quotes_commas() {
    let ctx = seeded_context();
    let export = export_records(
        &ctx,
        "research",
        &[RecordId::from("r2")],
        &["research_team_ids".to_string(), "is_funded".to_string()],
        ExportFormat::Csv,
    )
    .await
    .expect("export");
    let lines: Vec<&str> = export.body.lines().collect();
    assert_eq!(lines, vec!["ID,Is Funded,Research Team", "r2,true,u2; u3"]);

    let export = export_records(
        &ctx,
        "entity",
        &[RecordId::from("e1")],
        &["address".to_string()],
        ExportFormat::Csv,
    )
    .await
    .expect("export");
    assert!(export
        .body
        .contains("e1,\"123 Research Park, Tech City, TC 12345\""));
}

#[tokio::test]
async fn json_export_holds_id_and_selected_columns() {
    let ctx = seeded_context();
    let export = export_records(
        &ctx,
        "fund",
        &[],
        &["name".to_string(), "amount".to_string()],
        ExportFormat::Json,
    )
    .await
    .expect("export");
    let rows: serde_json::Value = serde_json::from_str(&export.body).expect("json");
    assert_eq!(
        rows,
        json!([{ "id": "f1", "name": "AI Research Grant 2024", "amount": "$500,000" }])
    );
}

#[tokio::test]
async fn unknown_ids_are_rejected() {
    let ctx = seeded_context();
    let err = export_records(
        &ctx,
        "fund",
        &[RecordId::from("f9")],
        &[],
        ExportFormat::Json,
    )
    .await
    .expect_err("unknown id");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[test]
fn cell_text_flattens_values() {
    assert_eq!(cell_text(&json!(null)), "");
    assert_eq!(cell_text(&json!(6)), "6");
    assert_eq!(cell_text(&json!(["a.pdf", "b.pdf"])), "a.pdf; b.pdf");
}
