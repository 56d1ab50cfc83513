/// Parsing and normalization into the canonical document shape.
///
/// Two paths produce a `PsstDocument`:
/// - `parse_generated`: the generation service's raw text, parsed strictly —
///   all four sections must be present or the whole parse fails. Never a
///   partially-populated document.
/// - `upgrade_canned`: the flat legacy draft lifted into the canonical shape.
///   This is a lossy structural upgrade, not an enrichment: fields with no
///   flat analogue stay empty.
use chrono::{DateTime, Utc};

use crate::ksic::{CannedPsst, IndustryRecord};
use crate::model::{
    PlanSections, ProblemSection, PsstDocument, PsstMetadata, ScaleUpSection, SolutionSection,
    TeamMember, TeamSection, SCHEMA_VERSION,
};

pub const PROBLEM_TITLE: &str = "Problem (문제 인식)";
pub const SOLUTION_TITLE: &str = "Solution (해결 방안)";
pub const SCALE_UP_TITLE: &str = "Scale-up (성장 전략)";
pub const TEAM_TITLE: &str = "Team (팀 구성)";

/// Parse failure carrying the original raw text for server-side diagnosis.
/// The raw text must never reach a client-visible body.
#[derive(Debug, thiserror::Error)]
#[error("generation output did not match the document schema: {message}")]
pub struct ParseError {
    pub message: String,
    pub raw: String,
}

/// Parse raw generation output into a canonical document and attach the
/// metadata block (provenance flag set, fresh timestamp).
pub fn parse_generated(
    raw: &str,
    record: &IndustryRecord,
    user_input: &str,
    now: DateTime<Utc>,
) -> Result<PsstDocument, ParseError> {
    let json = extract_json_object(raw).ok_or_else(|| ParseError {
        message: "no JSON object in output".to_string(),
        raw: raw.to_string(),
    })?;

    let sections: PlanSections = serde_json::from_str(json).map_err(|e| ParseError {
        message: e.to_string(),
        raw: raw.to_string(),
    })?;

    Ok(PsstDocument {
        problem: sections.problem,
        solution: sections.solution,
        scale_up: sections.scale_up,
        team: sections.team,
        metadata: document_metadata(record, user_input, true, now),
    })
}

/// Models wrap JSON in code fences or lead-in prose despite the JSON-only
/// directive. Cut to the outermost object before parsing; anything further
/// malformed is a real parse failure.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Lift a flat canned draft into the canonical shape.
///
/// Documented lossy mapping:
/// - each flat narrative becomes both the line-split primary list field and
///   the matching narrative field;
/// - social/economic reasons, differentiation, milestones, core team and
///   advisors have no flat analogue and stay empty;
/// - the CEO record keeps only the generic 대표자 identity with the team
///   narrative as experience.
pub fn upgrade_canned(
    canned: &CannedPsst,
    record: &IndustryRecord,
    now: DateTime<Utc>,
) -> PsstDocument {
    PsstDocument {
        problem: ProblemSection {
            title: PROBLEM_TITLE.to_string(),
            market_issues: split_lines(&canned.p),
            social_reasons: Vec::new(),
            economic_reasons: Vec::new(),
            urgency: canned.p.clone(),
        },
        solution: SolutionSection {
            title: SOLUTION_TITLE.to_string(),
            core_technology: canned.s.clone(),
            key_features: split_lines(&canned.s),
            differentiation: Vec::new(),
            competitive_advantage: canned.s.clone(),
        },
        scale_up: ScaleUpSection {
            title: SCALE_UP_TITLE.to_string(),
            revenue_model: canned.s_scale.clone(),
            revenue_streams: split_lines(&canned.s_scale),
            market_entry_strategy: canned.s_scale.clone(),
            expansion_plan: canned.s_scale.clone(),
            market_share_goal: canned.s_scale.clone(),
            milestones: Vec::new(),
        },
        team: TeamSection {
            title: TEAM_TITLE.to_string(),
            ceo: TeamMember {
                name: "대표자".to_string(),
                role: "CEO".to_string(),
                expertise: Vec::new(),
                experience: canned.t.clone(),
                education: None,
            },
            core_team: Vec::new(),
            advisors: Vec::new(),
            network: Vec::new(),
            capabilities: Vec::new(),
        },
        metadata: document_metadata(record, "", true, now),
    }
}

pub fn document_metadata(
    record: &IndustryRecord,
    user_input: &str,
    ai_generated: bool,
    now: DateTime<Utc>,
) -> PsstMetadata {
    PsstMetadata {
        industry_code: record.code.clone(),
        industry_name: record.name.clone(),
        user_input: user_input.to_string(),
        expert_solution: record.solution.clone(),
        created_at: now,
        ai_generated,
        version: SCHEMA_VERSION.to_string(),
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ksic::ReferenceData;
    use crate::model::Grade;

    fn record() -> IndustryRecord {
        IndustryRecord {
            code: "58221".to_string(),
            name: "시스템 소프트웨어 개발".to_string(),
            grade: Grade::S,
            max_amount: "최대 1.5억".to_string(),
            solution: "R&D 가점 높음".to_string(),
            psst: None,
        }
    }

    const VALID_OUTPUT: &str = r#"{
        "problem": {
            "title": "Problem (문제 인식)",
            "marketIssues": ["수작업 비효율"],
            "socialReasons": ["고령화"],
            "economicReasons": ["인건비 상승"],
            "urgency": "즉시 해결 필요"
        },
        "solution": {
            "title": "Solution (해결 방안)",
            "coreTechnology": "AI 자동화",
            "keyFeatures": ["자동 보고"],
            "differentiation": ["업종 특화"],
            "competitiveAdvantage": "데이터 우위"
        },
        "scaleUp": {
            "title": "Scale-up (성장 전략)",
            "revenueModel": "구독",
            "revenueStreams": ["SaaS 구독"],
            "marketEntryStrategy": "직판",
            "expansionPlan": "해외 진출",
            "marketShareGoal": "15%",
            "milestones": [{"year": 2026, "quarter": 1, "goal": "출시", "metric": "고객 10개사"}]
        },
        "team": {
            "title": "Team (팀 구성)",
            "ceo": {"name": "김대표", "role": "CEO", "expertise": ["SW"], "experience": "12년"},
            "coreTeam": [],
            "network": ["대학 산학협력"],
            "capabilities": ["풀스택 개발"]
        }
    }"#;

    #[test]
    fn test_parse_valid_output() {
        let doc = parse_generated(VALID_OUTPUT, &record(), "현장 안전 SaaS", Utc::now()).unwrap();
        assert_eq!(doc.problem.market_issues, vec!["수작업 비효율"]);
        assert_eq!(doc.scale_up.milestones.len(), 1);
        assert_eq!(doc.scale_up.milestones[0].quarter, 1);
        assert_eq!(doc.metadata.industry_code, "58221");
        assert_eq!(doc.metadata.user_input, "현장 안전 SaaS");
        assert_eq!(doc.metadata.expert_solution, "R&D 가점 높음");
        assert!(doc.metadata.ai_generated);
        assert_eq!(doc.metadata.version, SCHEMA_VERSION);
    }

    #[test]
    fn test_parse_tolerates_code_fences() {
        let fenced = format!("설명 텍스트\n```json\n{VALID_OUTPUT}\n```\n끝");
        let doc = parse_generated(&fenced, &record(), "", Utc::now()).unwrap();
        assert_eq!(doc.solution.core_technology, "AI 자동화");
    }

    #[test]
    fn test_parse_failure_retains_raw_text() {
        let err = parse_generated("not json", &record(), "", Utc::now()).unwrap_err();
        assert_eq!(err.raw, "not json");

        let err = parse_generated("{\"problem\": {}}", &record(), "", Utc::now()).unwrap_err();
        assert_eq!(err.raw, "{\"problem\": {}}");
        assert!(err.message.contains("solution") || err.message.contains("missing field"));
    }

    #[test]
    fn test_parse_never_yields_partial_document() {
        // Three of four sections present: reject, don't fill in.
        let partial = r#"{
            "problem": {"title": "P"},
            "solution": {"title": "S"},
            "team": {"title": "T"}
        }"#;
        assert!(parse_generated(partial, &record(), "", Utc::now()).is_err());
    }

    #[test]
    fn test_upgrade_is_total_over_bundled_records() {
        let data = ReferenceData::bundled();
        let now = Utc::now();
        let upgraded = data.with_canned();
        assert!(!upgraded.is_empty());
        for rec in upgraded {
            let canned = rec.psst.as_ref().unwrap();
            let doc = upgrade_canned(canned, rec, now);
            assert!(!doc.problem.market_issues.is_empty());
            assert!(!doc.problem.urgency.is_empty());
            assert!(!doc.solution.core_technology.is_empty());
            assert!(!doc.scale_up.revenue_model.is_empty());
            assert!(!doc.team.ceo.experience.is_empty());
            assert_eq!(doc.metadata.industry_code, rec.code);
        }
    }

    #[test]
    fn test_upgrade_lossy_mapping_is_as_documented() {
        let data = ReferenceData::bundled();
        let rec = data.get("58221").unwrap();
        let canned = rec.psst.as_ref().unwrap();
        let doc = upgrade_canned(canned, rec, Utc::now());

        // Narrative doubles as the single-item-ish list source.
        assert_eq!(doc.problem.urgency, canned.p);
        assert_eq!(doc.solution.competitive_advantage, canned.s);
        // No flat analogue → empty, not invented.
        assert!(doc.problem.social_reasons.is_empty());
        assert!(doc.solution.differentiation.is_empty());
        assert!(doc.scale_up.milestones.is_empty());
        assert!(doc.team.core_team.is_empty());
        assert_eq!(doc.team.ceo.name, "대표자");
    }

    #[test]
    fn test_split_lines_drops_blank_lines() {
        let text = "첫 줄\n\n  둘째 줄  \n";
        assert_eq!(split_lines(text), vec!["첫 줄", "둘째 줄"]);
    }
}
