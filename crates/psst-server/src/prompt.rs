/// Prompt assembly for PSST business-plan generation.
///
/// Pure string construction: the fixed system instruction (persona, tone,
/// structure and disclosure constraints, JSON-only output) and the user
/// instruction interpolating the diagnosis data and the user's idea.
/// Input validation is the request boundary's job, not this module's.
use crate::ksic::IndustryRecord;
use crate::model::Grade;

/// System instruction: who the model is and which rules it must obey.
pub const SYSTEM_PROMPT: &str = r#"Persona: 당신은 대한민국 정부 지원사업(예비창업패키지, 초기창업패키지, R&D 디딤돌 등) 전문 컨설턴트입니다.

Style: 신뢰감 있고 전문적인 관공서/행정 어투를 사용합니다. 감성적인 호소보다는 통계, 수치, 논리적 근거를 바탕으로 문장을 구성합니다.

Constraint:
1. 반드시 PSST(Problem, Solution, Scale-up, Team) 구조를 유지할 것.
2. 사용자가 제공한 '업종별 전문가 솔루션'을 핵심 키워드로 활용할 것.
3. 2026년 경제 트렌드와 정부 정책 방향(디지털 전환, AI 고도화 등)을 반영할 것.
4. 중요: 2026년 1월 23일부터 시행되는 규정에 따라, 출력물 하단에 "본 초안은 나랏돈네비 AI 기술을 활용하여 작성되었습니다"라는 문구를 반드시 포함할 것.

Output Format: JSON 형식으로 PSST 구조에 맞춰 출력하되, 각 섹션은 명확하고 구체적인 내용으로 작성할 것."#;

/// AI 표기법 준수 문구 (2026년 1월 23일 시행 규정)
pub const AI_DISCLOSURE_SENTENCE: &str =
    "본 초안은 나랏돈네비 AI 기술을 활용하여 작성되었습니다.";
pub const AI_DISCLOSURE_REGULATION: &str =
    "(2026년 1월 23일부터 시행되는 AI 생성 콘텐츠 표기 의무화 규정 준수)";

// Fallbacks for the three optional tunables. Applied whenever the request
// omits the field or sends only whitespace.
pub const DEFAULT_ADDITIONAL_KEYWORDS: &str = "디지털 전환, AI 고도화, ESG 경영";
pub const DEFAULT_SCORE_FACTORS: &str = "디지털 전환, 지역경제 활성화, ESG 경영";
pub const DEFAULT_DIFFERENTIATION_POINT: &str = "기술·운영·BM 중 핵심 차별 포인트";

/// Everything the user instruction interpolates.
pub struct PromptInput<'a> {
    pub ksic_code: &'a str,
    pub industry_name: &'a str,
    pub user_idea: &'a str,
    pub expert_solution: &'a str,
    pub max_amount: &'a str,
    pub grade: Grade,
    pub additional_keywords: Option<&'a str>,
    pub score_factors: Option<&'a str>,
    pub differentiation_point: Option<&'a str>,
}

impl<'a> PromptInput<'a> {
    pub fn from_record(
        record: &'a IndustryRecord,
        user_idea: &'a str,
        additional_keywords: Option<&'a str>,
        score_factors: Option<&'a str>,
        differentiation_point: Option<&'a str>,
    ) -> Self {
        Self {
            ksic_code: &record.code,
            industry_name: &record.name,
            user_idea,
            expert_solution: &record.solution,
            max_amount: &record.max_amount,
            grade: record.grade,
            additional_keywords,
            score_factors,
            differentiation_point,
        }
    }
}

fn or_default<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => fallback,
    }
}

/// Build the user instruction: directive, interpolated data, and the exact
/// output shape expected back, including the milestone sub-objects.
pub fn build_user_prompt(input: &PromptInput<'_>) -> String {
    let additional_keywords = or_default(input.additional_keywords, DEFAULT_ADDITIONAL_KEYWORDS);
    let score_factors = or_default(input.score_factors, DEFAULT_SCORE_FACTORS);
    let differentiation_point =
        or_default(input.differentiation_point, DEFAULT_DIFFERENTIATION_POINT);

    format!(
        r#"# [지시사항]

아래 제공된 '사용자 아이디어'와 '전문가 시크릿 데이터'를 결합하여, {max_amount} 규모의 정부 지원사업 합격을 위한 PSST 사업계획서 초안을 작성하라.

# [데이터]

1. 사용자 아이디어: {user_idea}

2. 업종코드: {ksic_code}

3. 업종명: {industry_name}

4. 진단 등급: {grade}

5. 예상 지원금액: {max_amount}

6. 전문가 시크릿 솔루션 (Excel 데이터): {expert_solution}

7. 반영할 트렌드 키워드: {additional_keywords}

8. 심사 가점 요소: {score_factors}

9. 차별화 포인트: {differentiation_point}

# [출력 양식]

다음 JSON 형식으로 출력하라:

{{
  "problem": {{
    "title": "Problem (문제 인식)",
    "marketIssues": ["현재 시장의 불편함 1", "현재 시장의 불편함 2"],
    "socialReasons": ["사회적 이유 1", "사회적 이유 2"],
    "economicReasons": ["경제적 이유 1", "경제적 이유 2"],
    "urgency": "해결의 시급성에 대한 설명"
  }},
  "solution": {{
    "title": "Solution (해결 방안)",
    "coreTechnology": "본 서비스의 핵심 기술",
    "keyFeatures": ["주요 기능 1", "주요 기능 2"],
    "differentiation": ["경쟁사 대비 차별화 포인트 1", "차별화 포인트 2"],
    "competitiveAdvantage": "경쟁 우위 요약"
  }},
  "scaleUp": {{
    "title": "Scale-up (성장 전략)",
    "revenueModel": "구체적인 수익 창출 방안",
    "revenueStreams": ["수익원 1", "수익원 2"],
    "marketEntryStrategy": "시장 진입 전략",
    "expansionPlan": "확장 계획",
    "marketShareGoal": "3년 내 시장 점유율 확보 계획",
    "milestones": [
      {{
        "year": 2026,
        "quarter": 1,
        "goal": "목표",
        "metric": "측정 지표"
      }}
    ]
  }},
  "team": {{
    "title": "Team (팀 구성)",
    "ceo": {{
      "name": "대표자 이름",
      "role": "역할",
      "expertise": ["전문 분야 1", "전문 분야 2"],
      "experience": "경력 설명"
    }},
    "coreTeam": [
      {{
        "name": "팀원 이름",
        "role": "역할",
        "expertise": ["전문 분야"],
        "experience": "경력 설명"
      }}
    ],
    "network": ["네트워크 1", "네트워크 2"],
    "capabilities": ["팀 역량 1", "팀 역량 2"]
  }}
}}

# [중요 사항]

1. 각 섹션은 통계, 수치, 논리적 근거를 바탕으로 작성할 것.
2. 2026년 경제 트렌드(디지털 전환, AI 고도화, ESG 등)를 반영할 것.
3. 정부 정책 방향과의 연계성을 명확히 할 것.
4. 심사 가점 요소({score_factors})를 Problem과 Scale-up 서술에 녹여낼 것.
5. JSON 형식 외에 추가 텍스트는 출력하지 말 것.
6. 반드시 JSON 형식으로만 응답할 것."#,
        max_amount = input.max_amount,
        user_idea = input.user_idea,
        ksic_code = input.ksic_code,
        industry_name = input.industry_name,
        grade = input.grade,
        expert_solution = input.expert_solution,
        additional_keywords = additional_keywords,
        score_factors = score_factors,
        differentiation_point = differentiation_point,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>() -> PromptInput<'a> {
        PromptInput {
            ksic_code: "58221",
            industry_name: "시스템 소프트웨어 개발",
            user_idea: "건설 현장 안전관리 자동화 SaaS",
            expert_solution: "R&D 가점 높음",
            max_amount: "최대 1.5억",
            grade: Grade::S,
            additional_keywords: None,
            score_factors: None,
            differentiation_point: None,
        }
    }

    #[test]
    fn test_system_prompt_demands_structure_and_disclosure() {
        assert!(SYSTEM_PROMPT.contains("PSST(Problem, Solution, Scale-up, Team)"));
        assert!(SYSTEM_PROMPT.contains("본 초안은 나랏돈네비 AI 기술을 활용하여 작성되었습니다"));
        assert!(SYSTEM_PROMPT.contains("JSON 형식"));
    }

    #[test]
    fn test_user_prompt_interpolates_all_inputs() {
        let prompt = build_user_prompt(&input());
        assert!(prompt.contains("58221"));
        assert!(prompt.contains("시스템 소프트웨어 개발"));
        assert!(prompt.contains("건설 현장 안전관리 자동화 SaaS"));
        assert!(prompt.contains("R&D 가점 높음"));
        assert!(prompt.contains("최대 1.5억"));
        assert!(prompt.contains("진단 등급: S"));
    }

    #[test]
    fn test_user_prompt_carries_example_shape_with_milestones() {
        let prompt = build_user_prompt(&input());
        for key in [
            "\"marketIssues\"",
            "\"coreTechnology\"",
            "\"scaleUp\"",
            "\"milestones\"",
            "\"quarter\"",
            "\"coreTeam\"",
        ] {
            assert!(prompt.contains(key), "missing {key} in user prompt");
        }
    }

    #[test]
    fn test_tunables_fall_back_when_blank_or_absent() {
        let prompt = build_user_prompt(&input());
        assert!(prompt.contains(DEFAULT_ADDITIONAL_KEYWORDS));
        assert!(prompt.contains(DEFAULT_SCORE_FACTORS));
        assert!(prompt.contains(DEFAULT_DIFFERENTIATION_POINT));

        let mut custom = input();
        custom.additional_keywords = Some("   ");
        custom.score_factors = Some("수출 실적");
        let prompt = build_user_prompt(&custom);
        assert!(prompt.contains(DEFAULT_ADDITIONAL_KEYWORDS));
        assert!(prompt.contains("수출 실적"));
        assert!(!prompt.contains(DEFAULT_SCORE_FACTORS));
    }
}
