/// Document export: markdown rendering and the HWP conversion backend proxy.
///
/// The conversion backend is an opaque collaborator — we forward the
/// canonical document (snake_case top-level keys, camelCase inside each
/// section, matching its request model) and stream the binary result back
/// as an attachment.
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;

use crate::error::AppError;
use crate::model::PsstDocument;
use crate::prompt::{AI_DISCLOSURE_REGULATION, AI_DISCLOSURE_SENTENCE};

pub const HWP_CONTENT_TYPE: &str = "application/x-hwp";

const MAX_ERROR_BODY_BYTES: usize = 8 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum HwpError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("conversion backend returned error: status={status} body={body}")]
    Upstream { status: StatusCode, body: String },
}

impl From<HwpError> for AppError {
    fn from(e: HwpError) -> Self {
        let status = match &e {
            HwpError::Upstream { status, .. } => Some(*status),
            HwpError::Request(_) => None,
        };
        AppError::Service {
            status,
            message: e.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct HwpClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HwpClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, HwpError> {
        let http = reqwest::Client::builder()
            .user_agent("naradon-navi/psst-server")
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Convert a document to HWP bytes via the external backend. One attempt,
    /// bounded deadline; failures surface as a typed service error.
    pub async fn generate(&self, document: &PsstDocument) -> Result<Vec<u8>, HwpError> {
        let url = format!("{}/api/generate-hwp", self.base_url);
        let payload = serde_json::json!({
            "problem": document.problem,
            "solution": document.solution,
            "scale_up": document.scale_up,
            "team": document.team,
            "metadata": document.metadata,
        });

        let resp = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let mut body = resp.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            body.truncate(MAX_ERROR_BODY_BYTES);
            return Err(HwpError::Upstream {
                status,
                body: String::from_utf8_lossy(&body).to_string(),
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

/// `PSST_<업종명>_<timestamp>.hwp`, timestamp RFC3339-derived with `:`/`.`
/// replaced by `-` and truncated to seconds.
pub fn attachment_filename(industry_name: &str, now: DateTime<Utc>) -> String {
    let name = if industry_name.trim().is_empty() {
        "사업계획서"
    } else {
        industry_name
    };
    format!("PSST_{}_{}.hwp", name, now.format("%Y-%m-%dT%H-%M-%S"))
}

/// Content-Disposition value with the filename percent-encoded the way the
/// browser side expects (encodeURIComponent rules).
pub fn content_disposition(filename: &str) -> String {
    format!("attachment; filename=\"{}\"", percent_encode(filename))
}

/// encodeURIComponent-compatible escaping, used for header filenames and
/// redirect query values.
pub fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => out.push(byte as char),
            b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Render a canonical document as markdown, AI-disclosure footer included.
pub fn render_markdown(document: &PsstDocument) -> String {
    let problem = &document.problem;
    let solution = &document.solution;
    let scale_up = &document.scale_up;
    let team = &document.team;
    let metadata = &document.metadata;

    let mut out = String::new();
    out.push_str("# PSST 사업계획서\n\n");
    out.push_str(&format!(
        "**업종**: {} ({})\n",
        metadata.industry_name, metadata.industry_code
    ));
    out.push_str(&format!(
        "**생성일**: {}\n\n---\n\n",
        metadata.created_at.format("%Y년 %-m월 %-d일")
    ));

    out.push_str(&format!("## 1. {}\n\n", problem.title));
    out.push_str("### 시장의 문제점\n");
    push_numbered(&mut out, &problem.market_issues);
    out.push_str("\n### 사회적 이유\n");
    push_numbered(&mut out, &problem.social_reasons);
    out.push_str("\n### 경제적 이유\n");
    push_numbered(&mut out, &problem.economic_reasons);
    out.push_str(&format!("\n### 해결의 시급성\n{}\n\n---\n\n", problem.urgency));

    out.push_str(&format!("## 2. {}\n\n", solution.title));
    out.push_str(&format!("### 핵심 기술\n{}\n", solution.core_technology));
    out.push_str("\n### 주요 기능\n");
    push_numbered(&mut out, &solution.key_features);
    out.push_str("\n### 경쟁사 대비 차별화 포인트\n");
    push_numbered(&mut out, &solution.differentiation);
    out.push_str(&format!(
        "\n### 경쟁 우위\n{}\n\n---\n\n",
        solution.competitive_advantage
    ));

    out.push_str(&format!("## 3. {}\n\n", scale_up.title));
    out.push_str(&format!("### 수익 창출 방안\n{}\n", scale_up.revenue_model));
    out.push_str("\n### 수익원\n");
    push_numbered(&mut out, &scale_up.revenue_streams);
    out.push_str(&format!(
        "\n### 시장 진입 전략\n{}\n",
        scale_up.market_entry_strategy
    ));
    out.push_str(&format!("\n### 확장 계획\n{}\n", scale_up.expansion_plan));
    out.push_str(&format!(
        "\n### 3년 내 시장 점유율 목표\n{}\n",
        scale_up.market_share_goal
    ));
    out.push_str("\n### 주요 마일스톤\n");
    for m in &scale_up.milestones {
        out.push_str(&format!(
            "**{}년 {}분기**: {} ({})\n",
            m.year, m.quarter, m.goal, m.metric
        ));
    }
    out.push_str("\n---\n\n");

    out.push_str(&format!("## 4. {}\n\n", team.title));
    out.push_str("### 대표자 (CEO)\n");
    out.push_str(&format!("- **이름**: {}\n", team.ceo.name));
    out.push_str(&format!("- **역할**: {}\n", team.ceo.role));
    out.push_str(&format!("- **전문 분야**: {}\n", team.ceo.expertise.join(", ")));
    out.push_str(&format!("- **경력**: {}\n", team.ceo.experience));
    if let Some(education) = &team.ceo.education {
        out.push_str(&format!("- **학력**: {education}\n"));
    }
    out.push_str("\n### 핵심 팀원\n");
    for member in &team.core_team {
        out.push_str(&format!("#### {} ({})\n", member.name, member.role));
        out.push_str(&format!("- **전문 분야**: {}\n", member.expertise.join(", ")));
        out.push_str(&format!("- **경력**: {}\n", member.experience));
        if let Some(education) = &member.education {
            out.push_str(&format!("- **학력**: {education}\n"));
        }
        out.push('\n');
    }
    out.push_str("\n### 네트워크 및 파트너십\n");
    push_numbered(&mut out, &team.network);
    out.push_str("\n### 팀 역량\n");
    push_numbered(&mut out, &team.capabilities);

    out.push_str(&format!(
        "\n---\n\n**{AI_DISCLOSURE_SENTENCE}**\n\n{AI_DISCLOSURE_REGULATION}\n"
    ));
    out
}

fn push_numbered(out: &mut String, items: &[String]) {
    for (idx, item) in items.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", idx + 1, item));
    }
}
