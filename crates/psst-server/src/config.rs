use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

/// Application configuration loaded explicitly from environment variables.
///
/// Everything has a development-friendly default; production deployments set
/// the variables explicitly. The generation client carries its own config
/// (`navi_common::openai::OpenAiClientConfig`).
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address (`BIND_ADDR`, default `0.0.0.0:8080`).
    pub bind_addr: SocketAddr,
    /// Origin used to build payment redirect URLs
    /// (`PUBLIC_BASE_URL`, default `http://localhost:8080`).
    pub public_base_url: String,
    /// Payment-state file (`NAVI_STATE_PATH`, default
    /// `data/payment-state.json`). The gate fails closed if it is unusable.
    pub state_path: PathBuf,
    /// Document-conversion backend origin (`HWP_BACKEND_URL`, default
    /// `http://localhost:8000`).
    pub hwp_backend_url: String,
    /// Conversion deadline (`HWP_TIMEOUT_SECS`, default 30).
    pub hwp_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("invalid BIND_ADDR: {e}")))?;

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        let state_path = std::env::var("NAVI_STATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/payment-state.json"));

        let hwp_backend_url = std::env::var("HWP_BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();

        let hwp_timeout = std::env::var("HWP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(30));

        Ok(Self {
            bind_addr,
            public_base_url,
            state_path,
            hwp_backend_url,
            hwp_timeout,
        })
    }
}
