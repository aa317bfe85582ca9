use shared::error::ErrorCode;

use super::*;
use crate::test_support::seeded_context;

fn targets(entity: &str) -> Vec<&'static str> {
    quick_actions(entity)
        .iter()
        .map(|action| action.target_entity)
        .collect()
}

#[test]
fn workflow_table() {
    assert_eq!(
        targets("research"),
        vec![
            "research-outputs",
            "invention-disclosure",
            "tech-assessment",
            "market-assessment",
            "equipment",
        ]
    );
    assert_eq!(targets("research-outputs"), vec!["invention-disclosure"]);
    assert_eq!(targets("invention-disclosure"), vec!["prior-art-search"]);
    assert_eq!(
        targets("prior-art-search"),
        vec![
            "patent-utility",
            "design-right",
            "know-how",
            "tech-assessment",
            "market-assessment",
        ]
    );
    for ip in ["patent-utility", "design-right", "know-how"] {
        assert_eq!(
            targets(ip),
            vec!["license", "tech-assessment", "market-assessment"]
        );
    }
    assert_eq!(targets("industry-challenge"), vec!["challenge-solution"]);
    assert_eq!(targets("fund"), vec!["proposal"]);
    assert_eq!(targets("proposal"), vec!["research"]);
    assert!(targets("user").is_empty());

    let equipment = quick_actions("research")[4];
    assert_eq!(equipment.label, "Add Equipment");
    assert_eq!(equipment.icon, ActionIcon::Wrench);
}

#[tokio::test]
async fn research_prefills_its_own_id() {
    let ctx = seeded_context();
    let launch = launch_quick_action(&ctx, "research", "r1", "tech-assessment")
        .await
        .expect("launch");
    assert_eq!(launch.target_entity, "tech-assessment");
    assert_eq!(
        launch.prefill.get("research_id"),
        Some(&Value::String("r1".into()))
    );
}

#[tokio::test]
async fn research_output_passes_its_research_along() {
    let ctx = seeded_context();
    let launch = launch_quick_action(&ctx, "research-outputs", "ro1", "invention-disclosure")
        .await
        .expect("launch");
    assert_eq!(
        launch.prefill.get("research_id"),
        Some(&Value::String("r1".into()))
    );
    assert_eq!(launch.prefill.len(), 1);
}

#[test]
fn sources_without_a_prefill_rule_prefill_nothing() {
    let record = Record::new("dr1", "u1", "2024-01-01T00:00:00Z");
    assert!(prefill_for("design-right", &record).is_empty());
    assert_eq!(
        prefill_for("fund", &record).get("fund_id"),
        Some(&Value::String("dr1".into()))
    );
}

#[tokio::test]
async fn target_must_be_offered() {
    let ctx = seeded_context();
    let err = launch_quick_action(&ctx, "fund", "f1", "license")
        .await
        .expect_err("not offered");
    assert_eq!(err.code, ErrorCode::Validation);

    let err = launch_quick_action(&ctx, "fund", "f404", "proposal")
        .await
        .expect_err("missing record");
    assert_eq!(err.code, ErrorCode::NotFound);
}
