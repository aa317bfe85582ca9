use serde_json::json;
use shared::error::{ApiException, ErrorCode};

use super::*;
use crate::test_support::{empty_context, seeded_context};

fn fields(value: serde_json::Value) -> FieldMap {
    serde_json::from_value(value).expect("field map")
}

#[tokio::test]
async fn search_is_case_insensitive_over_string_values() {
    let ctx = seeded_context();
    let hits = list_records(&ctx, "user", "CHEN").await.expect("list");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id.as_str(), "u2");

    let all = list_records(&ctx, "user", "").await.expect("list");
    assert_eq!(all.len(), 3);

    // the term is not trimmed
    let leading = list_records(&ctx, "user", " chen").await.expect("list");
    assert_eq!(leading.len(), 1);
    let trailing = list_records(&ctx, "user", "chen ").await.expect("list");
    assert!(trailing.is_empty());
    let blank = list_records(&ctx, "user", "   ").await.expect("list");
    assert!(blank.is_empty());

    // ids and creation stamps are searched too
    let by_id = list_records(&ctx, "research", "r2").await.expect("list");
    assert_eq!(by_id.len(), 1);

    // array values are not
    let none = list_records(&ctx, "research", "ra3").await.expect("list");
    assert!(none.is_empty());
}

#[tokio::test]
async fn unknown_entity_is_not_found() {
    let ctx = seeded_context();
    let err = list_records(&ctx, "spaceship", "").await.expect_err("unknown");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn record_page_counts_and_columns() {
    let ctx = seeded_context();
    let page = record_page(&ctx, "user", "dr.", &[]).await.expect("page");
    assert_eq!(page.total, 3);
    assert_eq!(page.matched, 2);
    let names: Vec<&str> = page.columns.iter().map(|field| field.name).collect();
    assert_eq!(
        names,
        vec!["name", "title", "phone", "work_phone", "mobile", "email"]
    );

    let page = record_page(&ctx, "user", "", &["username".into(), "name".into()])
        .await
        .expect("page");
    let names: Vec<&str> = page.columns.iter().map(|field| field.name).collect();
    assert_eq!(names, vec!["name", "username"]);
}

#[tokio::test]
async fn create_assigns_identity_and_ignores_reserved_input() {
    let ctx = empty_context();
    let record = create_record(
        &ctx,
        "research-area",
        fields(json!({
            "id": "forged",
            "creation_user_id": "u9",
            "name": "Photonics",
            "description": "Light based computing",
            "notes": { "internal": true },
        })),
    )
    .await
    .expect("create");

    assert!(record.id.as_str().starts_with("research-area_"));
    assert_eq!(record.creation_user_id.as_str(), "u1");
    assert!(record.creation_timestamp.ends_with('Z'));
    assert_eq!(record.get("notes"), Some(&json!({ "internal": true })));

    let stored = get_record(&ctx, "research-area", record.id.as_str())
        .await
        .expect("stored");
    assert_eq!(stored, record);
}

#[tokio::test]
async fn create_rejects_invalid_input() {
    let ctx = empty_context();
    let err = create_record(&ctx, "research-area", fields(json!({ "name": "" })))
        .await
        .expect_err("invalid");
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(err.fields.len(), 2);
    assert_eq!(ctx.storage.count("research-area").await.expect("count"), 0);
}

#[tokio::test]
async fn update_merges_and_keeps_identity() {
    let ctx = seeded_context();
    let updated = update_record(
        &ctx,
        "fund",
        "f1",
        fields(json!({
            "id": "f2",
            "creation_timestamp": "1999-01-01T00:00:00Z",
            "amount": "$750,000",
            "terms_files": null,
        })),
    )
    .await
    .expect("update");

    assert_eq!(updated.id.as_str(), "f1");
    assert_eq!(updated.creation_timestamp, "2024-01-15T10:00:00Z");
    assert_eq!(updated.get_str("amount"), Some("$750,000"));
    assert_eq!(updated.get_str("name"), Some("AI Research Grant 2024"));
    assert!(updated.get("terms_files").is_none());
}

#[tokio::test]
async fn update_cannot_clear_required_fields() {
    let ctx = seeded_context();
    let err = update_record(&ctx, "fund", "f1", fields(json!({ "name": null })))
        .await
        .expect_err("name is required");
    assert_eq!(err.fields["name"], "Name is required");

    let missing = update_record(&ctx, "fund", "f404", FieldMap::new())
        .await
        .expect_err("missing");
    assert_eq!(missing.code, ErrorCode::NotFound);
}

#[test]
fn coded_storage_errors_keep_their_code() {
    let err = internal(ApiException::new(ErrorCode::Conflict, "taken").into());
    assert_eq!(err.code, ErrorCode::Conflict);
    assert_eq!(err.message, "taken");

    let err = internal(anyhow::anyhow!("lock poisoned"));
    assert_eq!(err.code, ErrorCode::Internal);
}
