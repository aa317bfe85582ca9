use shared::error::ErrorCode;

use super::*;
use crate::test_support::seeded_context;

fn ids(raw: &[&str]) -> Vec<RecordId> {
    raw.iter().map(|id| RecordId::from(*id)).collect()
}

#[tokio::test]
async fn check_reports_dependents_without_deleting() {
    let ctx = seeded_context();
    let check = check_delete(&ctx, "fund", "f1").await.expect("check");
    assert!(check.is_blocked());
    assert_eq!(check.record_name, "AI Research Grant 2024");
    assert_eq!(check.dependencies.len(), 1);
    assert_eq!(check.dependencies[0].entity_name, "proposal");
    assert_eq!(check.dependencies[0].field_name, "fund_id");
    assert!(ctx.storage.contains("fund", "f1").await.expect("contains"));
}

#[tokio::test]
async fn blocked_delete_leaves_record_in_place() {
    let ctx = seeded_context();
    match delete_record(&ctx, "invention-disclosure", "id1")
        .await
        .expect("delete")
    {
        DeleteOutcome::Blocked { check } => {
            assert_eq!(check.dependent_count(), 1);
            assert_eq!(check.dependencies[0].records[0].id.as_str(), "pas1");
        }
        other => panic!("expected blocked, got {other:?}"),
    }
    assert!(ctx
        .storage
        .contains("invention-disclosure", "id1")
        .await
        .expect("contains"));
}

#[tokio::test]
async fn unreferenced_record_is_deleted() {
    let ctx = seeded_context();
    let outcome = delete_record(&ctx, "prior-art-search", "pas1")
        .await
        .expect("delete");
    assert_eq!(
        outcome,
        DeleteOutcome::Deleted {
            id: RecordId::from("pas1"),
            name: "pas1".to_string(),
        }
    );
    let err = delete_record(&ctx, "prior-art-search", "pas1")
        .await
        .expect_err("gone");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn bulk_delete_clears_dependents_selected_together() {
    let ctx = seeded_context();
    let outcome = bulk_delete(&ctx, "research", &ids(&["r1", "r2"]))
        .await
        .expect("bulk");
    // r1 still has research outputs and assessments pointing at it
    assert_eq!(outcome.deleted, ids(&["r2"]));
    assert_eq!(outcome.blocked.len(), 1);
    assert_eq!(outcome.blocked[0].record_id.as_str(), "r1");

    let ctx = seeded_context();
    let outcome = bulk_delete(&ctx, "user", &ids(&["u1", "u2", "u3"]))
        .await
        .expect("bulk");
    assert!(outcome.deleted.is_empty());
    assert_eq!(outcome.blocked.len(), 3);
}

#[tokio::test]
async fn bulk_delete_orders_itself_within_one_entity() {
    let ctx = seeded_context();
    let related = shared::record::Record::new("ra4", "u1", "2024-04-01T10:00:00Z")
        .with("name", "Bioinformatics")
        .with("description", "Computational biology")
        .with("related_area", "ra2");
    ctx.storage
        .insert("research-area", related)
        .await
        .expect("insert");

    let outcome = bulk_delete(&ctx, "research-area", &ids(&["ra2", "ra4", "ra2"]))
        .await
        .expect("bulk");
    assert_eq!(outcome.deleted, ids(&["ra4", "ra2"]));
    assert!(outcome.blocked.is_empty());
}

#[tokio::test]
async fn bulk_delete_with_unknown_id_deletes_nothing() {
    let ctx = seeded_context();
    let err = bulk_delete(&ctx, "research-area", &ids(&["ra2", "ra404"]))
        .await
        .expect_err("unknown id");
    assert_eq!(err.code, ErrorCode::NotFound);
    assert!(ctx
        .storage
        .contains("research-area", "ra2")
        .await
        .expect("contains"));
}
