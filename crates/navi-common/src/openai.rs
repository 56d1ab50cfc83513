use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Clone, Debug)]
pub struct OpenAiClientConfig {
    pub base_url: String,
    /// Server-side credential. `None` means generation is unavailable and
    /// every call fails with [`OpenAiClientError::MissingApiKey`] before any
    /// network I/O.
    pub api_key: Option<String>,
    pub default_timeout: Duration,
    pub max_error_body_bytes: usize,
}

impl OpenAiClientConfig {
    /// Load client configuration from environment variables.
    ///
    /// - `OPENAI_API_KEY`: credential (optional here; absence is reported as a
    ///   configuration error at call time, never to the client)
    /// - `OPENAI_BASE_URL`: API root (default `https://api.openai.com/v1`)
    /// - `OPENAI_TIMEOUT_SECS`: per-request deadline (default 60)
    /// - `OPENAI_MAX_ERROR_BODY_BYTES`: upstream error body capture cap
    pub fn from_env() -> Self {
        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        // The credential must never travel through a client-exposed channel.
        // A PUBLIC_-prefixed copy is a deployment mistake worth flagging, but
        // not blocking on.
        if std::env::var("PUBLIC_OPENAI_API_KEY").is_ok() {
            warn!("PUBLIC_OPENAI_API_KEY is set; the generation credential must stay server-side");
        }

        let default_timeout = std::env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let max_error_body_bytes = std::env::var("OPENAI_MAX_ERROR_BODY_BYTES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(8 * 1024);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            default_timeout,
            max_error_body_bytes,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OpenAiClientError {
    #[error("generation credential is not configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("upstream returned error: status={status} message={message}")]
    Upstream { status: StatusCode, message: String },

    #[error("upstream returned non-JSON error: status={status} body={body}")]
    UpstreamBody { status: StatusCode, body: String },
}

impl OpenAiClientError {
    /// True when the failure is a local configuration problem rather than a
    /// service/transport one. Callers map the two differently (the former
    /// must not leak its cause to clients).
    pub fn is_configuration(&self) -> bool {
        matches!(self, OpenAiClientError::MissingApiKey)
    }

    /// Provider-assigned status code, when the provider answered at all.
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            OpenAiClientError::Upstream { status, .. }
            | OpenAiClientError::UpstreamBody { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct OpenAiClient {
    config: OpenAiClientConfig,
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiClientConfig) -> Result<Self, OpenAiClientError> {
        let http = reqwest::Client::builder()
            .user_agent("naradon-navi/psst-server")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &OpenAiClientConfig {
        &self.config
    }

    pub fn has_credential(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Run a single chat completion. One attempt per call — retrying a paid
    /// generation is the caller's decision, never this client's.
    pub async fn chat_completions(
        &self,
        request: ChatCompletionRequest,
        timeout_override: Option<Duration>,
    ) -> Result<ChatCompletionResponse, OpenAiClientError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(OpenAiClientError::MissingApiKey)?;

        let url = format!("{}/chat/completions", self.config.base_url);
        let timeout = timeout_override.unwrap_or(self.config.default_timeout);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .timeout(timeout)
            .json(&request)
            .send()
            .await?;

        Self::parse_json_response(resp, self.config.max_error_body_bytes).await
    }

    async fn parse_json_response<T: for<'de> Deserialize<'de>>(
        resp: reqwest::Response,
        max_error_body_bytes: usize,
    ) -> Result<T, OpenAiClientError> {
        if resp.status().is_success() {
            let json = resp.json::<T>().await?;
            return Ok(json);
        }
        Err(Self::to_upstream_error(resp, max_error_body_bytes).await)
    }

    async fn to_upstream_error(
        resp: reqwest::Response,
        max_error_body_bytes: usize,
    ) -> OpenAiClientError {
        let status = resp.status();
        let body = read_limited_text(resp, max_error_body_bytes).await;
        if let Ok(parsed) = serde_json::from_str::<OpenAiErrorEnvelope>(&body) {
            let message = parsed
                .error
                .message
                .unwrap_or_else(|| "unknown upstream error".to_string());
            return OpenAiClientError::Upstream { status, message };
        }
        OpenAiClientError::UpstreamBody { status, body }
    }
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > max_bytes {
                b.truncate(max_bytes);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read upstream error body");
            "<failed to read error body>".to_string()
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorEnvelope {
    error: OpenAiErrorObject,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorObject {
    message: Option<String>,
    #[allow(dead_code)]
    r#type: Option<String>,
    #[allow(dead_code)]
    code: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    pub object: Option<String>,
    pub choices: Vec<ChatCompletionChoice>,
    pub usage: Option<ChatCompletionUsage>,
}

impl ChatCompletionResponse {
    /// Text of the first completion, if the provider returned one.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChoice {
    pub index: Option<u32>,
    pub message: ChatCompletionMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionMessage {
    pub role: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionUsage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_unset_sampling_fields() {
        let req = ChatCompletionRequest {
            model: "gpt-4o".to_string(),
            messages: vec![Message::user("hello")],
            temperature: None,
            max_tokens: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("temperature").is_none());
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_error_envelope_parsing() {
        let body = r#"{"error":{"message":"quota exceeded","type":"insufficient_quota","code":null}}"#;
        let parsed: OpenAiErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message.as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn test_first_content() {
        let body = r#"{
            "id": "cmpl-1",
            "object": "chat.completion",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "ok"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 1, "total_tokens": 11}
        }"#;
        let resp: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.first_content(), Some("ok"));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let client = OpenAiClient::new(OpenAiClientConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: None,
            default_timeout: Duration::from_secs(1),
            max_error_body_bytes: 1024,
        })
        .unwrap();

        let err = client
            .chat_completions(
                ChatCompletionRequest {
                    model: "gpt-4o".to_string(),
                    messages: vec![Message::user("hi")],
                    temperature: Some(0.7),
                    max_tokens: Some(4000),
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OpenAiClientError::MissingApiKey));
        assert!(err.is_configuration());
    }
}
