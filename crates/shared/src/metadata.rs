//! Static entity metadata catalog.
//!
//! Every entity the dashboard manages is described here once: its fields,
//! their input types, which fields point at other entities, and the
//! parent/child relationships shown in navigation. Forms, tables, the
//! dependency check and the CLI all work from this table alone.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Number,
    Date,
    Boolean,
    Select,
    Multiselect,
    Textarea,
    File,
    Multifile,
    Foreignkey,
    Multiforeignkey,
}

impl FieldType {
    /// Types whose values are JSON arrays of strings.
    pub fn is_multi_valued(self) -> bool {
        matches!(
            self,
            FieldType::Multiselect | FieldType::Multifile | FieldType::Multiforeignkey
        )
    }

    pub fn is_foreign_key(self) -> bool {
        matches!(self, FieldType::Foreignkey | FieldType::Multiforeignkey)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldMetadata {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    #[serde(skip_serializing_if = "no_options")]
    pub options: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_entity: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

fn no_options(options: &&'static [&'static str]) -> bool {
    options.is_empty()
}

impl FieldMetadata {
    pub const fn new(name: &'static str, label: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            label,
            field_type,
            required: false,
            options: &[],
            foreign_entity: None,
            placeholder: None,
            description: None,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn options(mut self, options: &'static [&'static str]) -> Self {
        self.options = options;
        self
    }

    pub const fn references(mut self, entity: &'static str) -> Self {
        self.foreign_entity = Some(entity);
        self
    }

    pub fn is_foreign_key(&self) -> bool {
        self.field_type.is_foreign_key()
    }

    pub fn is_multi_valued(&self) -> bool {
        self.field_type.is_multi_valued()
    }

    /// Whether the field may be shown as a list column. Long-form, file and
    /// multi-reference fields never are, and neither is a password.
    pub fn is_column_candidate(&self) -> bool {
        !matches!(
            self.field_type,
            FieldType::Multifile
                | FieldType::File
                | FieldType::Textarea
                | FieldType::Multiforeignkey
        ) && self.name != "password"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Relationships {
    pub parents: &'static [&'static str],
    pub children: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityMetadata {
    pub name: &'static str,
    pub label: &'static str,
    pub fields: &'static [FieldMetadata],
    pub relationships: Relationships,
}

impl EntityMetadata {
    pub fn field(&self, name: &str) -> Option<&'static FieldMetadata> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = &'static FieldMetadata> {
        self.fields.iter().filter(|field| field.is_foreign_key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavGroup {
    pub title: &'static str,
    pub entities: &'static [&'static str],
}

/// Navigation order of the entity pages.
pub const ENTITY_NAMES: &[&str] = &[
    "research",
    "research-area",
    "research-outputs",
    "invention-disclosure",
    "prior-art-search",
    "patent-utility",
    "design-right",
    "know-how",
    "license",
    "tech-assessment",
    "market-assessment",
    "consultation",
    "equipment",
    "events",
    "fund-type",
    "fund",
    "proposal",
    "industry-challenge",
    "challenge-solution",
    "user",
    "entity",
];

pub const NAV_GROUPS: &[NavGroup] = &[
    NavGroup {
        title: "Research & Innovation",
        entities: &["research", "research-outputs"],
    },
    NavGroup {
        title: "Intellectual Property",
        entities: &[
            "invention-disclosure",
            "prior-art-search",
            "patent-utility",
            "design-right",
            "know-how",
            "license",
        ],
    },
    NavGroup {
        title: "Assessments",
        entities: &["tech-assessment", "market-assessment"],
    },
    NavGroup {
        title: "Support Services",
        entities: &["consultation", "equipment", "events"],
    },
    NavGroup {
        title: "Funding",
        entities: &["fund-type", "fund", "proposal"],
    },
    NavGroup {
        title: "Industry Collaboration",
        entities: &["industry-challenge", "challenge-solution"],
    },
    NavGroup {
        title: "System",
        entities: &["user", "entity"],
    },
];

pub fn catalog() -> &'static [EntityMetadata] {
    CATALOG
}

pub fn entity_metadata(name: &str) -> Option<&'static EntityMetadata> {
    CATALOG.iter().find(|meta| meta.name == name)
}

pub fn entity_label(name: &str) -> &str {
    match entity_metadata(name) {
        Some(meta) => meta.label,
        None => name,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogIssue {
    #[error("{entity}.{field}: references unknown entity '{target}'")]
    UnknownForeignEntity {
        entity: &'static str,
        field: &'static str,
        target: &'static str,
    },
    #[error("{entity}.{field}: foreign key without a foreign entity")]
    MissingForeignEntity {
        entity: &'static str,
        field: &'static str,
    },
    #[error("{entity}.{field}: select field without options")]
    MissingOptions {
        entity: &'static str,
        field: &'static str,
    },
    #[error("{entity}.{field}: declared more than once")]
    DuplicateField {
        entity: &'static str,
        field: &'static str,
    },
    #[error("{entity}: relationship to unknown entity '{target}'")]
    UnknownRelationship {
        entity: &'static str,
        target: &'static str,
    },
    #[error("{entity}: declared more than once")]
    DuplicateEntity { entity: &'static str },
}

/// Checks the internal consistency of a catalog. An empty result means every
/// reference resolves.
pub fn validate_catalog(entities: &[EntityMetadata]) -> Vec<CatalogIssue> {
    let known: HashSet<&str> = entities.iter().map(|meta| meta.name).collect();
    let mut issues = Vec::new();
    let mut seen_entities = HashSet::new();

    for meta in entities {
        if !seen_entities.insert(meta.name) {
            issues.push(CatalogIssue::DuplicateEntity { entity: meta.name });
        }

        let mut seen_fields = HashSet::new();
        for field in meta.fields {
            if !seen_fields.insert(field.name) {
                issues.push(CatalogIssue::DuplicateField {
                    entity: meta.name,
                    field: field.name,
                });
            }
            match (field.is_foreign_key(), field.foreign_entity) {
                (true, None) => issues.push(CatalogIssue::MissingForeignEntity {
                    entity: meta.name,
                    field: field.name,
                }),
                (true, Some(target)) if !known.contains(target) => {
                    issues.push(CatalogIssue::UnknownForeignEntity {
                        entity: meta.name,
                        field: field.name,
                        target,
                    })
                }
                _ => {}
            }
            if matches!(field.field_type, FieldType::Select | FieldType::Multiselect)
                && field.options.is_empty()
            {
                issues.push(CatalogIssue::MissingOptions {
                    entity: meta.name,
                    field: field.name,
                });
            }
        }

        for target in meta
            .relationships
            .parents
            .iter()
            .chain(meta.relationships.children)
        {
            if !known.contains(target) {
                issues.push(CatalogIssue::UnknownRelationship {
                    entity: meta.name,
                    target: *target,
                });
            }
        }
    }

    issues
}

use FieldType::{
    Boolean, Date, Email, Foreignkey, Multifile, Multiforeignkey, Number, Select, Text, Textarea,
};

type F = FieldMetadata;

static CATALOG: &[EntityMetadata] = &[
    EntityMetadata {
        name: "user",
        label: "Users",
        fields: &[
            F::new("name", "Name", Text).required(),
            F::new("title", "Title", Text),
            F::new("phone", "Phone", Text),
            F::new("work_phone", "Work Phone", Text),
            F::new("mobile", "Mobile", Text),
            F::new("email", "Email", Email).required(),
            F::new("work_email", "Work Email", Email),
            F::new("entity_id", "Entity", Foreignkey).references("entity"),
            F::new("department", "Department", Text),
            F::new("sub_department_1", "Sub Department 1", Text),
            F::new("sub_department_2", "Sub Department 2", Text),
            F::new("sub_department_3", "Sub Department 3", Text),
            F::new("sub_department_4", "Sub Department 4", Text),
            F::new("affiliation_status", "Affiliation Status", Select)
                .options(&["Active", "On Leave", "Retired"]),
            F::new("joining_date", "Joining Date", Date),
            F::new("leave_date", "Leave Date", Date),
            F::new("username", "Username", Text).required(),
        ],
        relationships: Relationships {
            parents: &["entity"],
            children: &["research", "proposal", "consultation"],
        },
    },
    EntityMetadata {
        name: "entity",
        label: "Entities",
        fields: &[
            F::new("name", "Name", Text).required(),
            F::new("address", "Address", Textarea),
            F::new("phone", "Phone", Text),
            F::new("email", "Email", Email),
            F::new("type", "Type", Select).options(&[
                "University",
                "Research Institute",
                "Company",
                "Government",
                "NGO",
                "Startup",
            ]),
            F::new("policies", "Policies", Multifile),
            F::new("parent_entity", "Parent Entity", Foreignkey).references("entity"),
        ],
        relationships: Relationships {
            parents: &[],
            children: &["user", "fund", "industry-challenge"],
        },
    },
    EntityMetadata {
        name: "research-area",
        label: "Research Areas",
        fields: &[
            F::new("name", "Name", Text).required(),
            F::new("description", "Description", Textarea).required(),
        ],
        relationships: Relationships {
            parents: &[],
            children: &["research", "research-outputs"],
        },
    },
    EntityMetadata {
        name: "research",
        label: "Research",
        fields: &[
            F::new("title", "Title", Text).required(),
            F::new("detailed_description", "Detailed Description", Textarea),
            F::new("is_funded", "Is Funded", Boolean),
            F::new("proposal_id", "Proposal", Foreignkey).references("proposal"),
            F::new("start_date", "Start Date", Date),
            F::new("end_date", "End Date", Date),
            F::new("amount", "Amount", Number),
            F::new("status", "Status", Select).options(&[
                "Active",
                "Completed",
                "On Hold",
                "Cancelled",
            ]),
            F::new("research_area_ids", "Research Areas", Multiforeignkey)
                .references("research-area"),
            F::new("research_team_pi_id", "Principal Investigator", Foreignkey)
                .references("user"),
            F::new("research_team_ids", "Research Team", Multiforeignkey).references("user"),
            F::new("fund_id", "Fund", Foreignkey).references("fund"),
        ],
        relationships: Relationships {
            parents: &["proposal", "fund", "research-area", "user"],
            children: &[
                "research-outputs",
                "invention-disclosure",
                "tech-assessment",
                "market-assessment",
                "equipment",
                "events",
                "consultation",
            ],
        },
    },
    EntityMetadata {
        name: "research-outputs",
        label: "Research Outputs",
        fields: &[
            F::new("research_id", "Research", Foreignkey)
                .required()
                .references("research"),
            F::new("name", "Name", Text).required(),
            F::new("submission_date", "Submission Date", Date).required(),
            F::new("reports", "Reports", Multifile).required(),
            F::new("development_status", "Development Status", Select).options(&[
                "Concept",
                "Prototype",
                "Testing",
                "Production",
                "Market Ready",
            ]),
            F::new("applied_for_ip", "Applied for IP", Boolean).required(),
            F::new(
                "potential_commercialization_form",
                "Potential Commercialization Form",
                Select,
            )
            .options(&[
                "Licensing",
                "Startup",
                "Joint Venture",
                "Technology Transfer",
                "Consultancy",
            ]),
            F::new("research_area_ids", "Research Areas", Multiforeignkey)
                .references("research-area"),
            F::new("lead_inventor_id", "Lead Inventor", Foreignkey).references("user"),
            F::new("inventors_ids", "Inventors", Multiforeignkey).references("user"),
            F::new("applicants_ids", "Applicants", Multiforeignkey).references("user"),
        ],
        relationships: Relationships {
            parents: &["research", "user", "research-area"],
            children: &["invention-disclosure"],
        },
    },
    EntityMetadata {
        name: "invention-disclosure",
        label: "Invention Disclosures",
        fields: &[
            F::new("research_id", "Research", Foreignkey)
                .required()
                .references("research"),
            F::new("title", "Title", Text).required(),
            F::new("disclosure_date", "Disclosure Date", Date).required(),
            F::new("short_description", "Short Description", Text).required(),
            F::new("long_description", "Long Description", Textarea).required(),
            F::new("previous_disclosures", "Previous Disclosures", Textarea).required(),
            F::new("applied_for_ip", "Applied for IP", Boolean).required(),
        ],
        relationships: Relationships {
            parents: &["research"],
            children: &["prior-art-search"],
        },
    },
    EntityMetadata {
        name: "prior-art-search",
        label: "Prior Art Searches",
        fields: &[
            F::new("invention_disclosure_id", "Invention Disclosure", Foreignkey)
                .required()
                .references("invention-disclosure"),
            F::new("is_novel", "Is Novel", Boolean).required(),
        ],
        relationships: Relationships {
            parents: &["invention-disclosure"],
            children: &[
                "patent-utility",
                "design-right",
                "know-how",
                "tech-assessment",
                "market-assessment",
            ],
        },
    },
    EntityMetadata {
        name: "patent-utility",
        label: "Patent Utilities",
        fields: &[
            F::new("title", "Title", Text).required(),
            F::new("type", "Type", Select)
                .required()
                .options(&["Utility", "Provisional", "PCT"]),
            F::new("status", "Status", Select).required().options(&[
                "Filed",
                "Published",
                "Granted",
                "Rejected",
                "Abandoned",
            ]),
            F::new("publication_number", "Publication Number", Text).required(),
            F::new("application_number", "Application Number", Text).required(),
            F::new("priority_number", "Priority Number", Text).required(),
            F::new("publication_date", "Publication Date", Date).required(),
            F::new("abstract", "Abstract", Textarea).required(),
            F::new("description", "Description", Textarea).required(),
            F::new("claims", "Claims", Textarea).required(),
            F::new("inventors_ids", "Inventors", Multiforeignkey).references("user"),
            F::new("applicants_ids", "Applicants", Multiforeignkey).references("user"),
        ],
        relationships: Relationships {
            parents: &["prior-art-search", "research"],
            children: &["license", "consultation", "design-right", "know-how"],
        },
    },
    EntityMetadata {
        name: "design-right",
        label: "Design Rights",
        fields: &[
            F::new("user_id", "User", Foreignkey)
                .required()
                .references("user"),
            F::new("prior_art_search_id", "Prior Art Search", Foreignkey)
                .references("prior-art-search"),
            F::new("inventors_ids", "Inventors", Multiforeignkey).references("user"),
            F::new("applicants_ids", "Applicants", Multiforeignkey).references("user"),
        ],
        relationships: Relationships {
            parents: &["prior-art-search", "patent-utility", "user"],
            children: &["license"],
        },
    },
    EntityMetadata {
        name: "know-how",
        label: "Know-How",
        fields: &[
            F::new("user_id", "User", Foreignkey)
                .required()
                .references("user"),
            F::new("prior_art_search_id", "Prior Art Search", Foreignkey)
                .references("prior-art-search"),
            F::new("inventors_ids", "Inventors", Multiforeignkey).references("user"),
            F::new("applicants_ids", "Applicants", Multiforeignkey).references("user"),
        ],
        relationships: Relationships {
            parents: &["prior-art-search", "patent-utility", "user"],
            children: &["license"],
        },
    },
    EntityMetadata {
        name: "license",
        label: "Licenses",
        fields: &[
            F::new("title", "Title", Text).required(),
            F::new("description", "Description", Textarea),
            F::new("patent_utility_id", "Patent Utility", Foreignkey)
                .references("patent-utility"),
            F::new("licensee", "Licensee", Foreignkey)
                .required()
                .references("entity"),
            F::new("start_date", "Start Date", Date),
            F::new("end_date", "End Date", Date),
            F::new("fees", "Fees", Text),
        ],
        relationships: Relationships {
            parents: &["patent-utility", "design-right", "know-how", "entity"],
            children: &[],
        },
    },
    EntityMetadata {
        name: "tech-assessment",
        label: "Tech Assessments",
        fields: &[
            F::new("research_id", "Research", Foreignkey).references("research"),
            F::new("trl", "TRL", Number).required(),
        ],
        relationships: Relationships {
            parents: &["research", "prior-art-search", "patent-utility"],
            children: &[],
        },
    },
    EntityMetadata {
        name: "market-assessment",
        label: "Market Assessments",
        fields: &[
            F::new("research_id", "Research", Foreignkey).references("research"),
            F::new("market_potential", "Market Potential", Boolean).required(),
            F::new(
                "potential_commercialization_type",
                "Commercialization Type",
                Select,
            )
            .options(&["Licensing", "Startup", "Joint Venture", "Direct Sales"]),
        ],
        relationships: Relationships {
            parents: &["research", "prior-art-search", "patent-utility"],
            children: &[],
        },
    },
    EntityMetadata {
        name: "consultation",
        label: "Consultations",
        fields: &[
            F::new("title", "Title", Text).required(),
            F::new("description", "Description", Textarea),
            F::new("consultant", "Consultant", Foreignkey)
                .required()
                .references("user"),
            F::new("company", "Company", Foreignkey).references("entity"),
            F::new("research_id", "Research", Foreignkey).references("research"),
            F::new("start_date", "Start Date", Date),
            F::new("end_date", "End Date", Date),
            F::new("fees", "Fees", Text),
        ],
        relationships: Relationships {
            parents: &["user", "entity", "research", "patent-utility"],
            children: &[],
        },
    },
    EntityMetadata {
        name: "equipment",
        label: "Equipment",
        fields: &[
            F::new("name", "Name", Text),
            F::new("description", "Description", Textarea),
            F::new("specifications", "Specifications", Textarea),
            F::new("research_id", "Research", Foreignkey).references("research"),
            F::new("hosting_entity", "Hosting Entities", Multiforeignkey).references("entity"),
            F::new("price", "Price", Text),
            F::new("purchase_date", "Purchase Date", Date),
        ],
        relationships: Relationships {
            parents: &["research", "entity"],
            children: &[],
        },
    },
    EntityMetadata {
        name: "events",
        label: "Events",
        fields: &[
            F::new("title", "Title", Text).required(),
            F::new("description", "Description", Textarea),
            F::new("research_id", "Research", Foreignkey).references("research"),
            F::new("individual_organizer", "Individual Organizer", Foreignkey)
                .references("user"),
            F::new("entity_organizer", "Entity Organizer", Foreignkey).references("entity"),
            F::new("attendees", "Attendees", Multiforeignkey).references("user"),
            F::new("location", "Location", Text),
            F::new("timestamp", "Date & Time", Date),
        ],
        relationships: Relationships {
            parents: &["research", "user", "entity"],
            children: &[],
        },
    },
    EntityMetadata {
        name: "fund-type",
        label: "Fund Types",
        fields: &[
            F::new("name", "Name", Text).required(),
            F::new("description", "Description", Textarea).required(),
        ],
        relationships: Relationships {
            parents: &[],
            children: &["fund"],
        },
    },
    EntityMetadata {
        name: "fund",
        label: "Funds",
        fields: &[
            F::new("name", "Name", Text).required(),
            F::new("description", "Description", Textarea).required(),
            F::new("fund_type_id", "Fund Type", Foreignkey)
                .required()
                .references("fund-type"),
            F::new("entity_id", "Entity", Foreignkey)
                .required()
                .references("entity"),
            F::new("amount", "Amount", Text),
            F::new("terms", "Terms", Textarea).required(),
        ],
        relationships: Relationships {
            parents: &["fund-type", "entity"],
            children: &["proposal", "research"],
        },
    },
    EntityMetadata {
        name: "proposal",
        label: "Proposals",
        fields: &[
            F::new("fund_id", "Fund", Foreignkey)
                .required()
                .references("fund"),
            F::new("user_id", "User", Foreignkey).references("user"),
            F::new("entity_id", "Entity", Foreignkey).references("entity"),
            F::new("status", "Status", Select).options(&[
                "Draft",
                "Submitted",
                "Under Review",
                "Approved",
                "Rejected",
            ]),
            F::new("amount", "Amount", Text),
            F::new("start_date", "Start Date", Date),
            F::new("end_date", "End Date", Date),
        ],
        relationships: Relationships {
            parents: &["fund", "user", "entity"],
            children: &["research"],
        },
    },
    EntityMetadata {
        name: "industry-challenge",
        label: "Industry Challenges",
        fields: &[
            F::new("title", "Title", Text).required(),
            F::new("entity_ids", "Entities", Multiforeignkey)
                .required()
                .references("entity"),
        ],
        relationships: Relationships {
            parents: &["entity"],
            children: &["challenge-solution"],
        },
    },
    EntityMetadata {
        name: "challenge-solution",
        label: "Challenge Solutions",
        fields: &[
            F::new("title", "Title", Text).required(),
            F::new("industry_challenge_id", "Industry Challenge", Foreignkey)
                .required()
                .references("industry-challenge"),
            F::new("user_id", "Solution Provider (User)", Foreignkey).references("user"),
            F::new("entity_id", "Solution Provider (Entity)", Foreignkey).references("entity"),
            F::new("solution_description", "Solution Description", Textarea),
            F::new("consultation_id", "Consultation", Foreignkey).references("consultation"),
            F::new("research_id", "Research", Foreignkey).references("research"),
        ],
        relationships: Relationships {
            parents: &[
                "industry-challenge",
                "user",
                "entity",
                "consultation",
                "research",
            ],
            children: &[],
        },
    },
];

#[cfg(test)]
#[path = "tests/metadata_tests.rs"]
mod tests;
