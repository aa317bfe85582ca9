use shared::metadata::entity_metadata;

use super::*;

fn names(fields: &[&FieldMetadata]) -> Vec<&'static str> {
    fields.iter().map(|field| field.name).collect()
}

#[test]
fn candidates_skip_long_form_and_multi_reference_fields() {
    let research = entity_metadata("research").expect("research");
    assert_eq!(
        names(&available_columns(research)),
        vec![
            "title",
            "is_funded",
            "proposal_id",
            "start_date",
            "end_date",
            "amount",
            "status",
            "research_team_pi_id",
            "fund_id",
        ]
    );
    assert_eq!(
        names(&default_columns(research, 6)),
        vec!["title", "is_funded", "proposal_id", "start_date", "end_date", "amount"]
    );
}

#[test]
fn resolve_keeps_metadata_order_and_drops_ineligible_names() {
    let research = entity_metadata("research").expect("research");
    let requested = vec![
        "status".to_string(),
        "detailed_description".to_string(),
        "title".to_string(),
        "nonsense".to_string(),
    ];
    assert_eq!(
        names(&resolve_columns(research, &requested, 6)),
        vec!["title", "status"]
    );
    assert_eq!(
        names(&resolve_columns(research, &["nonsense".to_string()], 2)),
        vec!["title", "is_funded"]
    );
}

#[test]
fn toggling_adds_and_removes() {
    let visible = vec!["title".to_string(), "status".to_string()];
    assert_eq!(toggle_column(&visible, "status"), vec!["title".to_string()]);
    assert_eq!(
        toggle_column(&visible, "amount"),
        vec!["title".to_string(), "status".to_string(), "amount".to_string()]
    );
}

#[test]
fn column_list_parsing() {
    assert_eq!(
        parse_column_list("name, email,,title "),
        vec!["name".to_string(), "email".to_string(), "title".to_string()]
    );
    assert!(parse_column_list("").is_empty());
}
