//! Workflow quick actions: shortcuts from one entity to the create form of
//! the next step in the pipeline, with a foreign key filled in.

use serde_json::Value;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{ActionIcon, QuickAction, QuickActionLaunch},
    record::{FieldMap, Record},
};
use tracing::debug;

use crate::{lookup_entity, records::get_record, ApiContext};

const fn action(
    label: &'static str,
    target_entity: &'static str,
    description: &'static str,
    icon: ActionIcon,
) -> QuickAction {
    QuickAction {
        label,
        target_entity,
        description,
        icon,
    }
}

const TECH_ASSESSMENT: QuickAction = action(
    "Create Tech Assessment",
    "tech-assessment",
    "Technical evaluation",
    ActionIcon::BarChart,
);
const MARKET_ASSESSMENT: QuickAction = action(
    "Create Market Assessment",
    "market-assessment",
    "Market analysis",
    ActionIcon::BarChart,
);
const CREATE_LICENSE: QuickAction = action(
    "Create License",
    "license",
    "Commercialize IP",
    ActionIcon::FileText,
);

const RESEARCH: &[QuickAction] = &[
    action(
        "Create Research Output",
        "research-outputs",
        "Document research results",
        ActionIcon::FileText,
    ),
    action(
        "Create Invention Disclosure",
        "invention-disclosure",
        "Disclose potential invention",
        ActionIcon::Lightbulb,
    ),
    action(
        "Create Tech Assessment",
        "tech-assessment",
        "Assess technology readiness",
        ActionIcon::BarChart,
    ),
    action(
        "Create Market Assessment",
        "market-assessment",
        "Evaluate market potential",
        ActionIcon::BarChart,
    ),
    action(
        "Add Equipment",
        "equipment",
        "Register equipment used",
        ActionIcon::Wrench,
    ),
];

const RESEARCH_OUTPUTS: &[QuickAction] = &[action(
    "Create Invention Disclosure",
    "invention-disclosure",
    "From this output",
    ActionIcon::Lightbulb,
)];

const INVENTION_DISCLOSURE: &[QuickAction] = &[action(
    "Conduct Prior Art Search",
    "prior-art-search",
    "Verify novelty",
    ActionIcon::FileText,
)];

const PRIOR_ART_SEARCH: &[QuickAction] = &[
    action("File Patent", "patent-utility", "If novel", ActionIcon::FileText),
    action(
        "Register Design Right",
        "design-right",
        "If novel",
        ActionIcon::FileText,
    ),
    action("Register Know-How", "know-how", "If novel", ActionIcon::FileText),
    TECH_ASSESSMENT,
    MARKET_ASSESSMENT,
];

const INTELLECTUAL_PROPERTY: &[QuickAction] = &[CREATE_LICENSE, TECH_ASSESSMENT, MARKET_ASSESSMENT];

const INDUSTRY_CHALLENGE: &[QuickAction] = &[action(
    "Propose Solution",
    "challenge-solution",
    "Submit solution",
    ActionIcon::Lightbulb,
)];

const FUND: &[QuickAction] = &[action(
    "Create Proposal",
    "proposal",
    "Apply for funding",
    ActionIcon::FileText,
)];

const PROPOSAL: &[QuickAction] = &[action(
    "Create Research",
    "research",
    "Start funded research",
    ActionIcon::FileText,
)];

/// Quick actions offered on `entity`'s pages. Most entities have none.
pub fn quick_actions(entity: &str) -> &'static [QuickAction] {
    match entity {
        "research" => RESEARCH,
        "research-outputs" => RESEARCH_OUTPUTS,
        "invention-disclosure" => INVENTION_DISCLOSURE,
        "prior-art-search" => PRIOR_ART_SEARCH,
        "patent-utility" | "design-right" | "know-how" => INTELLECTUAL_PROPERTY,
        "industry-challenge" => INDUSTRY_CHALLENGE,
        "fund" => FUND,
        "proposal" => PROPOSAL,
        _ => &[],
    }
}

/// Fields filled in on the target form, keyed by the source entity only.
pub fn prefill_for(entity: &str, record: &Record) -> FieldMap {
    let mut prefill = FieldMap::new();
    let own_id = |field: &str| (field.to_string(), Value::String(record.id.to_string()));
    let entry = match entity {
        "research" => Some(own_id("research_id")),
        "research-outputs" => record
            .get("research_id")
            .cloned()
            .map(|value| ("research_id".to_string(), value)),
        "invention-disclosure" => Some(own_id("invention_disclosure_id")),
        "prior-art-search" => Some(own_id("prior_art_search_id")),
        "patent-utility" => Some(own_id("patent_utility_id")),
        "industry-challenge" => Some(own_id("industry_challenge_id")),
        "fund" => Some(own_id("fund_id")),
        "proposal" => Some(own_id("proposal_id")),
        _ => None,
    };
    if let Some((name, value)) = entry {
        prefill.insert(name, value);
    }
    prefill
}

/// Resolves a quick action from `record_id` of `entity` to `target`. Nothing
/// is created; the launch carries the prefill for the target's create form.
pub async fn launch_quick_action(
    ctx: &ApiContext,
    entity: &str,
    record_id: &str,
    target: &str,
) -> Result<QuickActionLaunch, ApiError> {
    let meta = lookup_entity(entity)?;
    lookup_entity(target)?;
    if !quick_actions(meta.name)
        .iter()
        .any(|action| action.target_entity == target)
    {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!("{} has no quick action to '{target}'", meta.name),
        ));
    }
    let record = get_record(ctx, meta.name, record_id).await?;
    let prefill = prefill_for(meta.name, &record);
    debug!(entity = meta.name, record_id, target, "quick action launched");
    Ok(QuickActionLaunch {
        source_entity: meta.name.to_string(),
        source_record_id: record.id,
        target_entity: target.to_string(),
        prefill,
    })
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
