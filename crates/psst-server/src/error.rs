use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::parse::ParseError;
use navi_common::openai::OpenAiClientError;

/// Stable, machine-readable error codes.
///
/// Clients match on `code` from `{"code": "...", "error": "..."}`; messages
/// may be reworded, codes never change.
pub mod error_code {
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const SERVICE_ERROR: &str = "SERVICE_ERROR";
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
}

/// Application error taxonomy.
///
/// 4xx variants carry user-actionable messages that go to the client as-is.
/// 5xx variants keep their detail server-side: the response body is a fixed
/// generic message per category, and the cause is logged here. Debug builds
/// additionally attach a `details` field for local development.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing/blank required request fields. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// Unknown industry code (or other absent resource). HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Missing service credential or broken deployment config. HTTP 500,
    /// generic client message.
    #[error("config error: {0}")]
    Config(String),

    /// External generation/conversion service rejected or failed. Provider
    /// status is passed through when present, 500 otherwise.
    #[error("service error: {message}")]
    Service {
        status: Option<StatusCode>,
        message: String,
    },

    /// Generation output did not match the document schema. HTTP 500; the
    /// raw output stays in server logs only.
    #[error("parse error: {message}")]
    Parse { message: String, raw: String },

    /// Local state store unreadable. Callers normally degrade (the access
    /// gate fails closed) instead of raising this; it exists for paths where
    /// a write failure must abort.
    #[error("storage error: {0}")]
    Storage(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => error_code::VALIDATION_FAILED,
            AppError::NotFound(_) => error_code::NOT_FOUND,
            AppError::Config(_) => error_code::CONFIG_ERROR,
            AppError::Service { .. } => error_code::SERVICE_ERROR,
            AppError::Parse { .. } => error_code::PARSE_ERROR,
            AppError::Storage(_) => error_code::STORAGE_ERROR,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Service { status, .. } => status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AppError::Parse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message the client sees. 4xx messages pass through; every 5xx
    /// category collapses to one fixed sentence.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Config(_) => "AI 서비스 설정 오류입니다.".to_string(),
            AppError::Service { .. } => "AI 서비스 오류가 발생했습니다.".to_string(),
            AppError::Parse { .. } => "리포트 생성에 실패했습니다.".to_string(),
            AppError::Storage(_) => "일시적인 오류가 발생했습니다.".to_string(),
        }
    }
}

impl From<ParseError> for AppError {
    fn from(e: ParseError) -> Self {
        AppError::Parse {
            message: e.message,
            raw: e.raw,
        }
    }
}

impl From<OpenAiClientError> for AppError {
    fn from(e: OpenAiClientError) -> Self {
        if e.is_configuration() {
            return AppError::Config(e.to_string());
        }
        AppError::Service {
            status: e.upstream_status(),
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            match &self {
                // Raw generation output is diagnostic-only: log a bounded
                // preview, never ship it to the client.
                AppError::Parse { message, raw } => {
                    tracing::error!(
                        code = self.error_code(),
                        detail = %message,
                        raw_preview = truncate(raw, 2048),
                        "request failed"
                    );
                }
                other => {
                    tracing::error!(code = other.error_code(), error = %other, "request failed");
                }
            }
        } else {
            tracing::warn!(code = self.error_code(), error = %self, "request rejected");
        }

        let mut body = serde_json::json!({
            "success": false,
            "code": self.error_code(),
            "error": self.client_message(),
        });
        // Detailed causes are a development-build affordance only.
        if cfg!(debug_assertions) && status.is_server_error() {
            body["details"] = serde_json::Value::String(self.to_string());
        }

        (status, axum::Json(body)).into_response()
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Config("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Service {
                status: Some(StatusCode::TOO_MANY_REQUESTS),
                message: "x".into()
            }
            .status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Service {
                status: None,
                message: "x".into()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Parse {
                message: "x".into(),
                raw: "y".into()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_collapse_to_generic_client_messages() {
        let err = AppError::Parse {
            message: "expected value at line 1".into(),
            raw: "not json".into(),
        };
        let msg = err.client_message();
        assert!(!msg.contains("not json"));
        assert!(!msg.contains("line 1"));

        let err = AppError::Config("OPENAI_API_KEY is unset".into());
        assert!(!err.client_message().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_client_facing_messages_pass_through() {
        let err = AppError::Validation("업종코드와 사용자 아이디어가 필요합니다.".into());
        assert_eq!(err.client_message(), "업종코드와 사용자 아이디어가 필요합니다.");
    }

    #[test]
    fn test_missing_credential_maps_to_config_error() {
        let err: AppError = OpenAiClientError::MissingApiKey.into();
        assert_eq!(err.error_code(), error_code::CONFIG_ERROR);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let s = "가나다라마";
        let t = truncate(s, 4);
        assert!(t.len() <= 4);
        assert!(s.starts_with(t));
    }
}
