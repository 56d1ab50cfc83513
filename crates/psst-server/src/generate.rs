/// The generation pipeline: assemble → invoke → parse.
///
/// One sequential chain per request, one completion attempt, no shared state
/// between concurrent requests. Every failure is a value (`AppError`); a
/// failed request restarts from the beginning, nothing is resumable.
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use navi_common::openai::{ChatCompletionRequest, Message, OpenAiClient};

use crate::error::AppError;
use crate::ksic::IndustryRecord;
use crate::model::PsstDocument;
use crate::parse;
use crate::prompt::{self, PromptInput};

/// Fixed decoding parameters. Generation quality is tuned here, not per
/// request.
pub const GENERATION_MODEL: &str = "gpt-4o";
pub const GENERATION_TEMPERATURE: f32 = 0.7;
pub const GENERATION_MAX_TOKENS: u32 = 4000;

/// States of one generation request. Terminal: `Succeeded` / `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateStage {
    Requested,
    Assembling,
    Invoking,
    Parsing,
    Succeeded,
    Failed,
}

impl GenerateStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerateStage::Requested => "requested",
            GenerateStage::Assembling => "assembling",
            GenerateStage::Invoking => "invoking",
            GenerateStage::Parsing => "parsing",
            GenerateStage::Succeeded => "succeeded",
            GenerateStage::Failed => "failed",
        }
    }
}

/// The three optional prompt tunables; blanks fall back inside the
/// assembler.
#[derive(Debug, Clone, Default)]
pub struct Tunables {
    pub additional_keywords: Option<String>,
    pub score_factors: Option<String>,
    pub differentiation_point: Option<String>,
}

pub struct Generator {
    openai: Arc<OpenAiClient>,
}

impl Generator {
    pub fn new(openai: Arc<OpenAiClient>) -> Self {
        Self { openai }
    }

    pub fn model(&self) -> &'static str {
        GENERATION_MODEL
    }

    /// Run one generation. The caller has already validated the request and
    /// resolved `record`; by the time we are here the only remaining failure
    /// modes are credential, service, and parse.
    pub async fn generate(
        &self,
        record: &IndustryRecord,
        user_idea: &str,
        tunables: &Tunables,
    ) -> Result<PsstDocument, AppError> {
        info!(
            stage = GenerateStage::Requested.as_str(),
            code = %record.code,
            "generation requested"
        );

        let result = self.run(record, user_idea, tunables).await;
        match &result {
            Ok(_) => info!(
                stage = GenerateStage::Succeeded.as_str(),
                code = %record.code,
                "generation complete"
            ),
            Err(e) => warn!(
                stage = GenerateStage::Failed.as_str(),
                code = %record.code,
                reason = e.error_code(),
                "generation failed"
            ),
        }
        result
    }

    async fn run(
        &self,
        record: &IndustryRecord,
        user_idea: &str,
        tunables: &Tunables,
    ) -> Result<PsstDocument, AppError> {
        info!(stage = GenerateStage::Assembling.as_str(), code = %record.code, "assembling prompts");
        let input = PromptInput::from_record(
            record,
            user_idea,
            tunables.additional_keywords.as_deref(),
            tunables.score_factors.as_deref(),
            tunables.differentiation_point.as_deref(),
        );
        let user_prompt = prompt::build_user_prompt(&input);

        info!(
            stage = GenerateStage::Invoking.as_str(),
            code = %record.code,
            model = GENERATION_MODEL,
            "invoking generation service"
        );
        let request = ChatCompletionRequest {
            model: GENERATION_MODEL.to_string(),
            messages: vec![
                Message::system(prompt::SYSTEM_PROMPT),
                Message::user(user_prompt),
            ],
            temperature: Some(GENERATION_TEMPERATURE),
            max_tokens: Some(GENERATION_MAX_TOKENS),
        };
        let response = self.openai.chat_completions(request, None).await?;

        let raw = response.first_content().ok_or_else(|| AppError::Service {
            status: None,
            message: "completion had no content".to_string(),
        })?;

        info!(stage = GenerateStage::Parsing.as_str(), code = %record.code, "parsing generation output");
        let document = parse::parse_generated(raw, record, user_idea, Utc::now())?;
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_code;
    use crate::model::Grade;
    use navi_common::openai::{OpenAiClient, OpenAiClientConfig};
    use std::time::Duration;

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

    #[tokio::test]
    async fn test_missing_credential_is_a_config_failure() {
        // No credential configured: the pipeline must fail before any
        // network call, and distinctly from a service error.
        let client = OpenAiClient::new(OpenAiClientConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: None,
            default_timeout: Duration::from_secs(1),
            max_error_body_bytes: 1024,
        })
        .unwrap();
        let generator = Generator::new(Arc::new(client));

        let err = generator
            .generate(&record(), "아이디어", &Tunables::default())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), error_code::CONFIG_ERROR);
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(GenerateStage::Requested.as_str(), "requested");
        assert_eq!(GenerateStage::Failed.as_str(), "failed");
    }
}
