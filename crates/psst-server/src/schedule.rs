/// Scheduled subsidy announcements and tax deadlines, 2026 onward.
///
/// Static reference data like `ksic`: bundled at build time, sorted by
/// (year, month, id). An entry applies to an industry iff the industry's
/// grade appears in the entry's target set.
use serde::{Deserialize, Serialize};

use crate::model::Grade;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScheduleCategory {
    /// 지원금 공고
    Grant,
    /// 세무 일정
    Tax,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// 고유 ID (연도-월-순번)
    pub id: String,
    pub year: i32,
    /// 공고 예정 월
    pub month: u32,
    /// 사업명
    pub title: String,
    /// 지원 가능 등급
    pub target_grade: Vec<Grade>,
    pub description: String,
    pub category: ScheduleCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl ScheduleEntry {
    pub fn applies_to(&self, grade: Grade) -> bool {
        self.target_grade.contains(&grade)
    }
}

pub struct ScheduleBook {
    entries: Vec<ScheduleEntry>,
}

impl ScheduleBook {
    pub fn bundled() -> Self {
        let mut entries = bundled_entries();
        entries.sort_by(|a, b| (a.year, a.month, &a.id).cmp(&(b.year, b.month, &b.id)));
        Self { entries }
    }

    pub fn all(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Entries announced in `year`, optionally narrowed to those applicable
    /// to `grade`.
    pub fn query(&self, year: i32, grade: Option<Grade>) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.year == year)
            .filter(|e| grade.map_or(true, |g| e.applies_to(g)))
            .collect()
    }
}

const ALL_GRADES: [Grade; 5] = [Grade::S, Grade::A, Grade::B, Grade::C, Grade::D];

fn bundled_entries() -> Vec<ScheduleEntry> {
    vec![
        ScheduleEntry {
            id: "2026-01-1".to_string(),
            year: 2026,
            month: 1,
            title: "연말정산 및 원천징수 신고".to_string(),
            target_grade: ALL_GRADES.to_vec(),
            description: "2026년 1월 연말정산 및 원천징수 신고 일정입니다. 사업자는 1월 31일까지 원천징수 영수증을 발급해야 합니다.\n\n본 요약은 나랏돈네비 AI 기술로 작성되었습니다.".to_string(),
            category: ScheduleCategory::Tax,
            start_date: Some("2026-01-01".to_string()),
            end_date: Some("2026-01-31".to_string()),
            amount: None,
            link: None,
        },
        ScheduleEntry {
            id: "2026-01-2".to_string(),
            year: 2026,
            month: 1,
            title: "예비창업패키지".to_string(),
            target_grade: vec![Grade::S, Grade::A],
            description: "IT/소프트웨어, 바이오, 제조업 등 혁신 창업자를 대상으로 최대 1억원을 지원합니다. 기술 기반 창업 아이디어와 사업계획서가 필요합니다.\n\n본 요약은 나랏돈네비 AI 기술로 작성되었습니다.".to_string(),
            category: ScheduleCategory::Grant,
            start_date: Some("2026-01-15".to_string()),
            end_date: Some("2026-02-28".to_string()),
            amount: Some("최대 1억원".to_string()),
            link: Some("https://example.com/pre-startup".to_string()),
        },
        ScheduleEntry {
            id: "2026-02-1".to_string(),
            year: 2026,
            month: 2,
            title: "부가가치세 신고".to_string(),
            target_grade: ALL_GRADES.to_vec(),
            description: "2026년 2월 부가가치세 신고 일정입니다. 과세표준 신고 및 납부를 2월 25일까지 완료해야 합니다.\n\n본 요약은 나랏돈네비 AI 기술로 작성되었습니다.".to_string(),
            category: ScheduleCategory::Tax,
            start_date: Some("2026-02-01".to_string()),
            end_date: Some("2026-02-25".to_string()),
            amount: None,
            link: None,
        },
        ScheduleEntry {
            id: "2026-02-2".to_string(),
            year: 2026,
            month: 2,
            title: "창업 지원금".to_string(),
            target_grade: vec![Grade::S, Grade::A, Grade::B],
            description: "신규 창업자를 대상으로 창업 자금을 지원합니다. 업종별 차등 지원하며, IT/소프트웨어 업종은 우대합니다.\n\n본 요약은 나랏돈네비 AI 기술로 작성되었습니다.".to_string(),
            category: ScheduleCategory::Grant,
            start_date: Some("2026-02-01".to_string()),
            end_date: Some("2026-02-28".to_string()),
            amount: Some("최대 5천만원".to_string()),
            link: None,
        },
        ScheduleEntry {
            id: "2026-03-1".to_string(),
            year: 2026,
            month: 3,
            title: "소상공인 경영개선 지원".to_string(),
            target_grade: vec![Grade::B, Grade::C],
            description: "소상공인의 시설 개선과 온라인 판로 개척 비용을 지원합니다. 매출 규모 기준 심사가 적용됩니다.\n\n본 요약은 나랏돈네비 AI 기술로 작성되었습니다.".to_string(),
            category: ScheduleCategory::Grant,
            start_date: Some("2026-03-02".to_string()),
            end_date: Some("2026-03-31".to_string()),
            amount: Some("최대 2천만원".to_string()),
            link: None,
        },
        ScheduleEntry {
            id: "2026-07-1".to_string(),
            year: 2026,
            month: 7,
            title: "부가가치세 확정 신고".to_string(),
            target_grade: ALL_GRADES.to_vec(),
            description: "2026년 1기 부가가치세 확정 신고 및 납부를 7월 25일까지 완료해야 합니다.\n\n본 요약은 나랏돈네비 AI 기술로 작성되었습니다.".to_string(),
            category: ScheduleCategory::Tax,
            start_date: Some("2026-07-01".to_string()),
            end_date: Some("2026-07-25".to_string()),
            amount: None,
            link: None,
        },
        ScheduleEntry {
            id: "2027-01-1".to_string(),
            year: 2027,
            month: 1,
            title: "초기창업패키지".to_string(),
            target_grade: vec![Grade::S, Grade::A],
            description: "창업 3년 이내 기업을 대상으로 사업화 자금을 지원합니다.\n\n본 요약은 나랏돈네비 AI 기술로 작성되었습니다.".to_string(),
            category: ScheduleCategory::Grant,
            start_date: Some("2027-01-10".to_string()),
            end_date: Some("2027-02-10".to_string()),
            amount: Some("최대 1억원".to_string()),
            link: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_sorted_and_ids_match_year_month() {
        let book = ScheduleBook::bundled();
        let entries = book.all();
        assert!(!entries.is_empty());
        for pair in entries.windows(2) {
            assert!((pair[0].year, pair[0].month) <= (pair[1].year, pair[1].month));
        }
        for entry in entries {
            let prefix = format!("{}-{:02}-", entry.year, entry.month);
            assert!(
                entry.id.starts_with(&prefix),
                "id {} does not match {}",
                entry.id,
                prefix
            );
            assert!((1..=12).contains(&entry.month));
            assert!(!entry.target_grade.is_empty());
        }
    }

    #[test]
    fn test_grade_filter_keeps_only_applicable_entries() {
        // One entry targets [S, A], another [B, C]; a grade-B query must
        // return only the latter.
        let book = ScheduleBook {
            entries: vec![
                ScheduleEntry {
                    id: "2026-01-1".to_string(),
                    year: 2026,
                    month: 1,
                    title: "혁신 창업 공고".to_string(),
                    target_grade: vec![Grade::S, Grade::A],
                    description: String::new(),
                    category: ScheduleCategory::Grant,
                    start_date: None,
                    end_date: None,
                    amount: None,
                    link: None,
                },
                ScheduleEntry {
                    id: "2026-01-2".to_string(),
                    year: 2026,
                    month: 1,
                    title: "소상공인 공고".to_string(),
                    target_grade: vec![Grade::B, Grade::C],
                    description: String::new(),
                    category: ScheduleCategory::Grant,
                    start_date: None,
                    end_date: None,
                    amount: None,
                    link: None,
                },
            ],
        };
        let hits = book.query(2026, Some(Grade::B));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "2026-01-2");
    }

    #[test]
    fn test_year_filter_without_grade() {
        let book = ScheduleBook::bundled();
        let hits = book.query(2027, None);
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|e| e.year == 2027));
        assert!(book.query(2031, None).is_empty());
    }

    #[test]
    fn test_tax_entries_apply_to_every_grade() {
        let book = ScheduleBook::bundled();
        for entry in book.all().iter().filter(|e| e.category == ScheduleCategory::Tax) {
            for grade in ALL_GRADES {
                assert!(entry.applies_to(grade), "{} skips grade {}", entry.id, grade);
            }
        }
    }
}
