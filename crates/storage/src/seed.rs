//! Demo dataset loaded by [`Storage::seeded`](crate::Storage::seeded).

use serde_json::{json, Value};
use shared::record::Record;

fn row(id: &str, creator: &str, created_at: &str, fields: Value) -> Record {
    let mut record = Record::new(id, creator, created_at);
    if let Value::Object(map) = fields {
        record.fields.extend(map);
    }
    record
}

pub(crate) fn records() -> Vec<(&'static str, Record)> {
    vec![
        (
            "user",
            row(
                "u1",
                "u1",
                "2024-01-15T10:00:00Z",
                json!({
                    "name": "Dr. Sarah Johnson",
                    "title": "Senior Research Scientist",
                    "email": "sarah.johnson@university.edu",
                    "phone": "+1-555-0101",
                    "entity_id": "e1",
                    "department": "Engineering",
                    "affiliation_status": "Active",
                    "username": "sjohnson",
                    "password": "hashed_password",
                }),
            ),
        ),
        (
            "user",
            row(
                "u2",
                "u1",
                "2024-01-16T10:00:00Z",
                json!({
                    "name": "Prof. Michael Chen",
                    "title": "Professor",
                    "email": "m.chen@university.edu",
                    "phone": "+1-555-0102",
                    "entity_id": "e1",
                    "department": "Computer Science",
                    "affiliation_status": "Active",
                    "username": "mchen",
                    "password": "hashed_password",
                }),
            ),
        ),
        (
            "user",
            row(
                "u3",
                "u1",
                "2024-01-17T10:00:00Z",
                json!({
                    "name": "Dr. Emily Rodriguez",
                    "title": "Research Associate",
                    "email": "e.rodriguez@university.edu",
                    "phone": "+1-555-0103",
                    "entity_id": "e1",
                    "department": "Biotechnology",
                    "affiliation_status": "Active",
                    "username": "erodriguez",
                    "password": "hashed_password",
                }),
            ),
        ),
        (
            "entity",
            row(
                "e1",
                "u1",
                "2024-01-01T10:00:00Z",
                json!({
                    "name": "Innovation University",
                    "address": "123 Research Park, Tech City, TC 12345",
                    "phone": "+1-555-1000",
                    "email": "info@innovationuni.edu",
                    "type": "University",
                }),
            ),
        ),
        (
            "entity",
            row(
                "e2",
                "u1",
                "2024-01-02T10:00:00Z",
                json!({
                    "name": "TechCorp Industries",
                    "address": "456 Innovation Drive, Silicon Valley, CA 94025",
                    "phone": "+1-555-2000",
                    "email": "contact@techcorp.com",
                    "type": "Company",
                }),
            ),
        ),
        (
            "entity",
            row(
                "e3",
                "u1",
                "2024-01-03T10:00:00Z",
                json!({
                    "name": "National Research Institute",
                    "address": "789 Science Boulevard, Research City, RC 54321",
                    "phone": "+1-555-3000",
                    "email": "info@nri.gov",
                    "type": "Research Institute",
                }),
            ),
        ),
        (
            "research-area",
            row(
                "ra1",
                "u1",
                "2024-01-01T10:00:00Z",
                json!({
                    "name": "Artificial Intelligence",
                    "description": "Research in machine learning, deep learning, and AI applications",
                }),
            ),
        ),
        (
            "research-area",
            row(
                "ra2",
                "u1",
                "2024-01-02T10:00:00Z",
                json!({
                    "name": "Biotechnology",
                    "description": "Research in genetic engineering, bioprocessing, and medical applications",
                }),
            ),
        ),
        (
            "research-area",
            row(
                "ra3",
                "u1",
                "2024-01-03T10:00:00Z",
                json!({
                    "name": "Renewable Energy",
                    "description": "Research in solar, wind, and sustainable energy technologies",
                }),
            ),
        ),
        (
            "research",
            row(
                "r1",
                "u1",
                "2024-01-10T10:00:00Z",
                json!({
                    "title": "Advanced Machine Learning for Medical Diagnostics",
                    "detailed_description": "Developing AI algorithms for early disease detection using medical imaging",
                    "is_funded": true,
                    "status": "Active",
                    "start_date": "2024-01-01",
                    "end_date": "2025-12-31",
                    "research_team_pi_id": "u1",
                    "research_team_ids": ["u1", "u2"],
                    "research_area_ids": ["ra1"],
                }),
            ),
        ),
        (
            "research",
            row(
                "r2",
                "u2",
                "2024-02-01T10:00:00Z",
                json!({
                    "title": "Sustainable Energy Storage Solutions",
                    "detailed_description": "Novel battery technologies for renewable energy applications",
                    "is_funded": true,
                    "status": "Active",
                    "start_date": "2024-02-01",
                    "end_date": "2026-01-31",
                    "research_team_pi_id": "u2",
                    "research_team_ids": ["u2", "u3"],
                    "research_area_ids": ["ra3"],
                }),
            ),
        ),
        (
            "research-outputs",
            row(
                "ro1",
                "u1",
                "2024-06-15T10:00:00Z",
                json!({
                    "research_id": "r1",
                    "name": "AI Diagnostic Algorithm v1.0",
                    "submission_date": "2024-06-15",
                    "reports": ["report1.pdf"],
                    "development_status": "Testing",
                    "applied_for_ip": true,
                    "lead_inventor_id": "u1",
                    "inventors_ids": ["u1", "u2"],
                }),
            ),
        ),
        (
            "invention-disclosure",
            row(
                "id1",
                "u1",
                "2024-06-20T10:00:00Z",
                json!({
                    "research_id": "r1",
                    "title": "Novel AI-based Medical Diagnostic System",
                    "disclosure_date": "2024-06-20",
                    "short_description": "AI system for automated disease detection",
                    "long_description": "A comprehensive AI-based system that uses deep learning to analyze medical images and provide diagnostic recommendations with high accuracy.",
                    "previous_disclosures": "None",
                    "applied_for_ip": true,
                }),
            ),
        ),
        (
            "prior-art-search",
            row(
                "pas1",
                "u1",
                "2024-07-01T10:00:00Z",
                json!({
                    "invention_disclosure_id": "id1",
                    "is_novel": true,
                    "prior_art_report": "pas_report1.pdf",
                }),
            ),
        ),
        (
            "patent-utility",
            row(
                "pu1",
                "u1",
                "2024-07-15T10:00:00Z",
                json!({
                    "title": "AI-based Medical Diagnostic System",
                    "type": "Utility",
                    "status": "Filed",
                    "publication_number": "US20240123456",
                    "application_number": "US2024/001234",
                    "priority_number": "US63/001234",
                    "publication_date": "2024-08-15",
                    "abstract": "A method and system for automated medical diagnostics using artificial intelligence",
                    "description": "Detailed technical description of the AI diagnostic system",
                    "claims": "1. A method comprising... 2. The system of claim 1...",
                    "inventors_ids": ["u1", "u2"],
                    "applicants_ids": ["u1"],
                }),
            ),
        ),
        (
            "tech-assessment",
            row(
                "ta1",
                "u1",
                "2024-05-01T10:00:00Z",
                json!({
                    "research_id": "r1",
                    "trl": 6,
                    "trl_report": "trl_report1.pdf",
                }),
            ),
        ),
        (
            "market-assessment",
            row(
                "ma1",
                "u1",
                "2024-05-15T10:00:00Z",
                json!({
                    "research_id": "r1",
                    "market_potential": true,
                    "potential_commercialization_type": "Licensing",
                    "market_assessment_report": "market_report1.pdf",
                }),
            ),
        ),
        (
            "fund-type",
            row(
                "ft1",
                "u1",
                "2024-01-01T10:00:00Z",
                json!({
                    "name": "Public Research Fund",
                    "description": "Government-funded research grants for basic and applied research",
                }),
            ),
        ),
        (
            "fund-type",
            row(
                "ft2",
                "u1",
                "2024-01-02T10:00:00Z",
                json!({
                    "name": "Corporate Innovation Fund",
                    "description": "Private sector funding for industry-relevant research",
                }),
            ),
        ),
        (
            "fund",
            row(
                "f1",
                "u1",
                "2024-01-15T10:00:00Z",
                json!({
                    "name": "AI Research Grant 2024",
                    "description": "Funding for artificial intelligence research projects",
                    "fund_type_id": "ft1",
                    "entity_id": "e3",
                    "amount": "$500,000",
                    "terms": "2-year grant with annual reporting requirements",
                    "terms_files": ["terms1.pdf"],
                }),
            ),
        ),
        (
            "proposal",
            row(
                "p1",
                "u1",
                "2023-12-01T10:00:00Z",
                json!({
                    "fund_id": "f1",
                    "user_id": "u1",
                    "entity_id": "e1",
                    "status": "Approved",
                    "amount": "$450,000",
                    "start_date": "2024-01-01",
                    "end_date": "2025-12-31",
                }),
            ),
        ),
        (
            "industry-challenge",
            row(
                "ic1",
                "u1",
                "2024-03-01T10:00:00Z",
                json!({
                    "title": "Improving Manufacturing Efficiency",
                    "entity_ids": ["e2"],
                    "description": { "e2": "Need for automated quality control systems" },
                }),
            ),
        ),
    ]
}
