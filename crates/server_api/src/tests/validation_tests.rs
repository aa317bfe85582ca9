use serde_json::json;
use shared::{error::ErrorCode, metadata::entity_metadata};

use super::*;
use crate::test_support::seeded_context;

fn fields(value: serde_json::Value) -> FieldMap {
    serde_json::from_value(value).expect("field map")
}

#[test]
fn value_shapes_follow_field_type() {
    let user = entity_metadata("user").expect("user");
    let email = user.field("email").expect("email");
    assert!(check_value(email, &json!("a@b.org")).is_ok());
    assert!(check_value(email, &json!("not an email")).is_err());
    assert!(check_value(email, &json!("@b.org")).is_err());

    let status = user.field("affiliation_status").expect("status");
    assert!(check_value(status, &json!("On Leave")).is_ok());
    assert_eq!(
        check_value(status, &json!("Fired")).unwrap_err(),
        "Affiliation Status must be one of: Active, On Leave, Retired"
    );

    let trl = entity_metadata("tech-assessment")
        .and_then(|meta| meta.field("trl"))
        .expect("trl");
    assert!(check_value(trl, &json!(6)).is_ok());
    assert!(check_value(trl, &json!("7.5")).is_ok());
    assert!(check_value(trl, &json!("seven")).is_err());
    for not_finite in ["inf", "-Infinity", "NaN"] {
        assert_eq!(
            check_value(trl, &json!(not_finite)).unwrap_err(),
            "TRL must be a number"
        );
    }

    let joining = user.field("joining_date").expect("joining date");
    assert!(check_value(joining, &json!("2024-02-29")).is_ok());
    assert!(check_value(joining, &json!("2024-06-20T10:00:00Z")).is_ok());
    assert!(check_value(joining, &json!("yesterday")).is_err());
}

#[test]
fn blank_values() {
    assert!(is_blank(&json!(null)));
    assert!(is_blank(&json!("   ")));
    assert!(is_blank(&json!([])));
    assert!(!is_blank(&json!(false)));
    assert!(!is_blank(&json!(0)));
}

#[tokio::test]
async fn required_fields_and_foreign_keys_are_checked() {
    let ctx = seeded_context();
    let meta = entity_metadata("proposal").expect("proposal");

    let err = validate_record(&ctx, meta, &fields(json!({ "status": "Draft" })), None)
        .await
        .expect_err("fund is required");
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(err.fields["fund_id"], "Fund is required");

    let err = validate_record(
        &ctx,
        meta,
        &fields(json!({ "fund_id": "f1", "user_id": "u404" })),
        None,
    )
    .await
    .expect_err("unknown user");
    assert_eq!(err.fields["user_id"], "User refers to missing record 'u404'");

    validate_record(&ctx, meta, &fields(json!({ "fund_id": "f1", "user_id": "u2" })), None)
        .await
        .expect("valid proposal");
}

#[tokio::test]
async fn multi_foreign_keys_check_every_id() {
    let ctx = seeded_context();
    let meta = entity_metadata("industry-challenge").expect("challenge");
    let err = validate_record(
        &ctx,
        meta,
        &fields(json!({ "title": "Cold chain", "entity_ids": ["e1", "e9"] })),
        None,
    )
    .await
    .expect_err("e9 is unknown");
    assert_eq!(err.fields["entity_ids"], "Entities refers to missing record 'e9'");
    assert_eq!(err.message, "1 field is invalid");
}

#[tokio::test]
async fn only_touched_fields_are_shape_checked() {
    let ctx = seeded_context();
    let meta = entity_metadata("user").expect("user");
    let merged = fields(json!({
        "name": "Ada",
        "email": "broken",
        "username": "ada",
        "title": "Engineer",
    }));
    let patch = fields(json!({ "title": "Engineer" }));
    validate_record(&ctx, meta, &merged, Some(&patch))
        .await
        .expect("stale email is not rechecked");

    let patch = fields(json!({ "email": "broken" }));
    let err = validate_record(&ctx, meta, &merged, Some(&patch))
        .await
        .expect_err("patched email is checked");
    assert!(err.fields.contains_key("email"));
}

#[test]
fn foreign_references_cover_checked_fields_only() {
    let research = entity_metadata("research").expect("research");
    let record = fields(json!({
        "title": "Catalysis",
        "research_team_pi_id": "u1",
        "research_area_ids": ["ra1", "ra2"],
        "fund_id": "",
    }));
    assert_eq!(
        foreign_references(research, &record, None),
        vec![("research-area", "ra1"), ("research-area", "ra2"), ("user", "u1")]
    );

    let patch = fields(json!({ "research_team_pi_id": "u1" }));
    assert_eq!(
        foreign_references(research, &record, Some(&patch)),
        vec![("user", "u1")]
    );
}
