/// KSIC industry reference data.
///
/// The dataset is bundled at build time and never mutated at runtime. Each
/// record pairs a 5-digit industry code with its diagnosis result (grade,
/// subsidy ceiling, expert solution) and, for the higher grades, a canned
/// four-section PSST draft shown after payment. Lower grades carry no draft —
/// that is the "not eligible" signal, not an omission.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::Grade;

/// Canned PSST draft in the flat legacy form: one narrative string per
/// section. `upgrade_canned` in `parse` lifts this into the canonical
/// document shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CannedPsst {
    /// Problem: 문제 인식
    pub p: String,
    /// Solution: 해결 방안
    pub s: String,
    /// Scale-up: 성장 전략
    pub s_scale: String,
    /// Team: 팀 구성
    pub t: String,
}

/// One diagnosed industry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryRecord {
    /// 업종코드 (5자리)
    pub code: String,
    /// 업종명
    pub name: String,
    pub grade: Grade,
    /// 예상 지원금액 (free text, e.g. "최대 1.5억")
    pub max_amount: String,
    /// 전문가 시크릿 솔루션
    pub solution: String,
    /// 유료 결제 시 노출될 PSST 초안
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psst: Option<CannedPsst>,
}

/// Immutable in-memory industry database, keyed by code.
pub struct ReferenceData {
    records: HashMap<String, IndustryRecord>,
}

impl ReferenceData {
    pub fn bundled() -> Self {
        let mut records = HashMap::new();
        for record in bundled_records() {
            records.insert(record.code.clone(), record);
        }
        Self { records }
    }

    pub fn get(&self, code: &str) -> Option<&IndustryRecord> {
        self.records.get(code)
    }

    pub fn by_grade(&self, grade: Grade) -> Vec<&IndustryRecord> {
        let mut found: Vec<&IndustryRecord> =
            self.records.values().filter(|r| r.grade == grade).collect();
        found.sort_by(|a, b| a.code.cmp(&b.code));
        found
    }

    pub fn with_canned(&self) -> Vec<&IndustryRecord> {
        let mut found: Vec<&IndustryRecord> =
            self.records.values().filter(|r| r.psst.is_some()).collect();
        found.sort_by(|a, b| a.code.cmp(&b.code));
        found
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn bundled_records() -> Vec<IndustryRecord> {
    vec![
        IndustryRecord {
            code: "58221".to_string(),
            name: "시스템 소프트웨어 개발".to_string(),
            grade: Grade::S,
            max_amount: "최대 1.5억".to_string(),
            solution: "R&D 가점 높음".to_string(),
            psst: Some(CannedPsst {
                p: "기존 수작업 비효율로 인한 생산성 저하 문제가 지속되고 있습니다. 디지털 전환의 필요성이 높아지고 있으며, 2026년 AI 고도화 정책과 연계하여 시급한 해결이 요구됩니다.".to_string(),
                s: "AI 기반 자동화 시스템을 도입하여 업무 프로세스를 혁신합니다. 기존 대비 80% 이상의 생산성 향상을 목표로 하며, 머신러닝 알고리즘을 활용한 지능형 솔루션을 제공합니다.".to_string(),
                s_scale: "3년 내 매출 50억 원 달성 및 시장 점유율 15% 확보를 목표로 합니다. 1년차: 시장 진입 및 초기 고객 확보, 2년차: 제품 고도화 및 시장 확대, 3년차: 해외 진출 및 IPO 준비를 진행합니다.".to_string(),
                t: "AI/ML 전문가 3명, 소프트웨어 엔지니어 5명, 비즈니스 개발 전문가 2명으로 구성된 핵심 팀을 보유하고 있습니다. 대표자는 10년 이상의 IT 업계 경력과 3건의 성공적인 스타트업 경험이 있습니다.".to_string(),
            }),
        },
        IndustryRecord {
            code: "62010".to_string(),
            name: "컴퓨터 프로그래밍 서비스업".to_string(),
            grade: Grade::S,
            max_amount: "최대 1억".to_string(),
            solution: "디지털 전환 바우처 연계".to_string(),
            psst: Some(CannedPsst {
                p: "중소기업의 IT 외주 의존도가 높아 개발 품질 편차와 비용 부담이 커지고 있습니다. 2026년 디지털 전환 정책 기조에 따라 표준화된 개발 서비스 수요가 급증하고 있습니다.".to_string(),
                s: "업종별 템플릿 기반의 구독형 개발 서비스를 제공합니다. 요구사항 분석부터 배포까지의 과정을 자동화 도구로 단축하여 기존 외주 대비 40% 낮은 비용 구조를 실현합니다.".to_string(),
                s_scale: "1년차: 수도권 중소기업 100개사 확보, 2년차: 구독 모델 전환율 30% 달성, 3년차: 연매출 30억 원 및 동남아 시장 진출을 목표로 합니다.".to_string(),
                t: "풀스택 개발자 4명과 PM 1명으로 구성된 팀입니다. 대표자는 SI 업계 12년 경력으로 공공·금융 프로젝트 수행 경험이 풍부합니다.".to_string(),
            }),
        },
        IndustryRecord {
            code: "55101".to_string(),
            name: "일반 숙박업".to_string(),
            grade: Grade::A,
            max_amount: "최대 5천만원".to_string(),
            solution: "관광 특화 지역 우대".to_string(),
            psst: Some(CannedPsst {
                p: "전통적인 숙박업의 디지털 전환 필요성이 증가하고 있습니다. 특히 2026년 그린 뉴딜 정책과 연계하여 친환경 숙박 시설에 대한 정부 지원이 확대되고 있습니다.".to_string(),
                s: "스마트 호텔 시스템을 도입하여 무인 체크인/아웃, IoT 기반 에너지 관리, AI 맞춤형 서비스를 제공합니다. 친환경 인증을 획득하여 ESG 경영을 실현합니다.".to_string(),
                s_scale: "3년 내 객실 점유율 70% 달성 및 연매출 20억 원을 목표로 합니다. 1년차: 시스템 구축 및 초기 마케팅, 2년차: 브랜드 확장 및 프랜차이즈 모델 개발, 3년차: 지역 대표 숙박 브랜드로 성장합니다.".to_string(),
                t: "호텔 경영 전문가 2명, IT 시스템 개발자 2명, 마케팅 전문가 1명으로 구성된 팀입니다. 대표자는 15년 이상의 호텔 경영 경력과 2건의 성공적인 리모델링 프로젝트 경험이 있습니다.".to_string(),
            }),
        },
        IndustryRecord {
            code: "47912".to_string(),
            name: "전자상거래 소매업".to_string(),
            grade: Grade::B,
            max_amount: "최대 3천만원".to_string(),
            solution: "온라인 판로 지원사업 연계".to_string(),
            psst: None,
        },
        IndustryRecord {
            code: "56101".to_string(),
            name: "한식 일반 음식점업".to_string(),
            grade: Grade::C,
            max_amount: "최대 1천만원".to_string(),
            solution: "소상공인 정책자금 위주 검토".to_string(),
            psst: None,
        },
        IndustryRecord {
            code: "47110".to_string(),
            name: "슈퍼마켓 소매업".to_string(),
            grade: Grade::D,
            max_amount: "0원".to_string(),
            solution: "업종코드 변경 필수".to_string(),
            psst: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_five_digits_and_unique() {
        let data = ReferenceData::bundled();
        assert!(!data.is_empty());
        for record in bundled_records() {
            assert_eq!(record.code.len(), 5, "code {} is not 5 chars", record.code);
            assert!(record.code.chars().all(|c| c.is_ascii_digit()));
        }
        assert_eq!(data.len(), bundled_records().len(), "duplicate codes in dataset");
    }

    #[test]
    fn test_lookup_known_and_unknown() {
        let data = ReferenceData::bundled();
        let record = data.get("58221").expect("58221 bundled");
        assert_eq!(record.grade, Grade::S);
        assert_eq!(record.max_amount, "최대 1.5억");
        assert!(record.psst.is_some());
        assert!(data.get("99999").is_none());
    }

    #[test]
    fn test_lower_grades_carry_no_canned_draft() {
        let data = ReferenceData::bundled();
        for record in data.with_canned() {
            assert!(
                record.grade <= Grade::A,
                "canned draft on grade {} record {}",
                record.grade,
                record.code
            );
        }
        for grade in [Grade::B, Grade::C, Grade::D] {
            for record in data.by_grade(grade) {
                assert!(record.psst.is_none());
            }
        }
    }

    #[test]
    fn test_by_grade_filters() {
        let data = ReferenceData::bundled();
        let s = data.by_grade(Grade::S);
        assert!(s.iter().any(|r| r.code == "58221"));
        assert!(s.iter().all(|r| r.grade == Grade::S));
        let d = data.by_grade(Grade::D);
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].code, "47110");
    }
}
