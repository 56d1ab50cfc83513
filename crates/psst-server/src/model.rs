use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version stamped into every document's metadata block.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Subsidy-eligibility grade, best to worst.
///
/// Declaration order gives the derived `Ord` "lower is better": `Grade::S`
/// sorts before `Grade::A`, and so on down to `Grade::D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete PSST business-plan document: the four canonical sections plus
/// the metadata block. This is the generation target shape and the wire shape
/// of every renderer/export payload.
///
/// Every list and narrative field inside a section carries `#[serde(default)]`
/// so a rendered document never contains an absent required field. The four
/// sections and the metadata block themselves are required: a payload missing
/// one does not deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsstDocument {
    pub problem: ProblemSection,
    pub solution: SolutionSection,
    pub scale_up: ScaleUpSection,
    pub team: TeamSection,
    pub metadata: PsstMetadata,
}

/// The four sections as produced by the generation service, before the
/// metadata block is attached.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSections {
    pub problem: ProblemSection,
    pub solution: SolutionSection,
    pub scale_up: ScaleUpSection,
    pub team: TeamSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSection {
    #[serde(default)]
    pub title: String,
    /// 시장의 불편함
    #[serde(default)]
    pub market_issues: Vec<String>,
    /// 사회적 이유
    #[serde(default)]
    pub social_reasons: Vec<String>,
    /// 경제적 이유
    #[serde(default)]
    pub economic_reasons: Vec<String>,
    /// 해결의 시급성
    #[serde(default)]
    pub urgency: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionSection {
    #[serde(default)]
    pub title: String,
    /// 핵심 기술
    #[serde(default)]
    pub core_technology: String,
    /// 주요 기능
    #[serde(default)]
    pub key_features: Vec<String>,
    /// 경쟁사 대비 차별화 포인트
    #[serde(default)]
    pub differentiation: Vec<String>,
    /// 경쟁 우위
    #[serde(default)]
    pub competitive_advantage: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleUpSection {
    #[serde(default)]
    pub title: String,
    /// 수익 창출 방안
    #[serde(default)]
    pub revenue_model: String,
    /// 수익원
    #[serde(default)]
    pub revenue_streams: Vec<String>,
    /// 시장 진입 전략
    #[serde(default)]
    pub market_entry_strategy: String,
    /// 확장 계획
    #[serde(default)]
    pub expansion_plan: String,
    /// 3년 내 시장 점유율 목표
    #[serde(default)]
    pub market_share_goal: String,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub quarter: u8,
    #[serde(default)]
    pub goal: String,
    /// 측정 지표
    #[serde(default)]
    pub metric: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSection {
    #[serde(default)]
    pub title: String,
    /// 대표자
    #[serde(default)]
    pub ceo: TeamMember,
    /// 핵심 팀원
    #[serde(default)]
    pub core_team: Vec<TeamMember>,
    /// 자문위원
    #[serde(default)]
    pub advisors: Vec<TeamMember>,
    /// 네트워크 및 파트너십
    #[serde(default)]
    pub network: Vec<String>,
    /// 팀 역량
    #[serde(default)]
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    /// 전문 분야
    #[serde(default)]
    pub expertise: Vec<String>,
    /// 경력
    #[serde(default)]
    pub experience: String,
    /// 학력 (있을 때만 노출)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
}

/// Provenance block attached to every canonical document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsstMetadata {
    /// 업종코드 (KSIC, 5자리)
    pub industry_code: String,
    pub industry_name: String,
    /// 사용자 원본 아이디어
    #[serde(default)]
    pub user_input: String,
    /// 전문가 시크릿 솔루션
    #[serde(default)]
    pub expert_solution: String,
    pub created_at: DateTime<Utc>,
    pub ai_generated: bool,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_orders_best_first() {
        assert!(Grade::S < Grade::A);
        assert!(Grade::A < Grade::B);
        assert!(Grade::C < Grade::D);
        let mut grades = vec![Grade::D, Grade::S, Grade::B];
        grades.sort();
        assert_eq!(grades, vec![Grade::S, Grade::B, Grade::D]);
    }

    #[test]
    fn test_grade_wire_form_is_bare_letter() {
        assert_eq!(serde_json::to_string(&Grade::S).unwrap(), "\"S\"");
        let g: Grade = serde_json::from_str("\"B\"").unwrap();
        assert_eq!(g, Grade::B);
    }

    #[test]
    fn test_sections_fill_missing_fields_with_defaults() {
        // A section object carrying only a title must still deserialize with
        // empty lists and empty narratives, never absent fields.
        let raw = r#"{
            "problem": {"title": "Problem"},
            "solution": {"title": "Solution"},
            "scaleUp": {"title": "Scale-up"},
            "team": {"title": "Team"}
        }"#;
        let sections: PlanSections = serde_json::from_str(raw).unwrap();
        assert!(sections.problem.market_issues.is_empty());
        assert_eq!(sections.problem.urgency, "");
        assert!(sections.solution.differentiation.is_empty());
        assert!(sections.scale_up.milestones.is_empty());
        assert_eq!(sections.team.ceo.name, "");
        assert!(sections.team.core_team.is_empty());
    }

    #[test]
    fn test_missing_section_is_rejected() {
        let raw = r#"{
            "problem": {"title": "Problem"},
            "solution": {"title": "Solution"},
            "team": {"title": "Team"}
        }"#;
        assert!(serde_json::from_str::<PlanSections>(raw).is_err());
    }

    #[test]
    fn test_document_wire_names_are_camel_case() {
        let doc = PsstDocument {
            problem: ProblemSection::default(),
            solution: SolutionSection::default(),
            scale_up: ScaleUpSection::default(),
            team: TeamSection::default(),
            metadata: PsstMetadata {
                industry_code: "58221".to_string(),
                industry_name: "시스템 소프트웨어 개발".to_string(),
                user_input: String::new(),
                expert_solution: String::new(),
                created_at: Utc::now(),
                ai_generated: true,
                version: SCHEMA_VERSION.to_string(),
            },
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("scaleUp").is_some());
        assert!(json["problem"].get("marketIssues").is_some());
        assert!(json["metadata"].get("industryCode").is_some());
        assert!(json["metadata"].get("aiGenerated").is_some());
    }
}
