mod config;
mod error;
mod export;
mod gate;
mod generate;
mod ksic;
mod model;
mod parse;
mod prompt;
mod schedule;
mod server;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use navi_common::openai::{OpenAiClient, OpenAiClientConfig};
use navi_common::store::StateStore;

use config::Config;
use export::HwpClient;
use gate::AccessGate;
use generate::Generator;
use ksic::ReferenceData;
use schedule::ScheduleBook;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting psst-server");

    let config = Config::from_env()?;
    info!(
        bind = %config.bind_addr,
        hwp_backend = %config.hwp_backend_url,
        "configuration loaded"
    );

    let openai_config = OpenAiClientConfig::from_env();
    info!(
        base_url = %openai_config.base_url,
        timeout_ms = openai_config.default_timeout.as_millis(),
        credential = openai_config.api_key.is_some(),
        "generation client configured"
    );
    if openai_config.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; generation requests will fail with a configuration error");
    }
    let openai = Arc::new(OpenAiClient::new(openai_config)?);

    let store = StateStore::new(Some(&config.state_path));
    if store.is_available() {
        info!(path = %config.state_path.display(), "payment state store ready");
    } else {
        warn!("payment state store unavailable, gate treats every code as unpaid");
    }

    let reference = ReferenceData::bundled();
    let schedule = ScheduleBook::bundled();
    info!(
        industries = reference.len(),
        schedule_entries = schedule.all().len(),
        "reference data loaded"
    );

    let hwp = HwpClient::new(&config.hwp_backend_url, config.hwp_timeout)?;

    let bind_addr = config.bind_addr;
    let state = Arc::new(AppState {
        gate: AccessGate::new(store),
        generator: Generator::new(openai),
        hwp,
        reference,
        schedule,
        config,
    });

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(addr = %bind_addr, "HTTP server ready");
    axum::serve(listener, server::build_router(state)).await?;

    info!("server shut down");
    Ok(())
}
