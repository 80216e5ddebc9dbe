use std::path::PathBuf;

use anyhow::{bail, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use parser::config::LlmConfig;
use parser::document::DEFAULT_MAX_CHARS;
use parser::llm_client::LlmGateway;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (reads .env if present)
    let config = LlmConfig::from_env();

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}=info", env!("CARGO_PKG_NAME")))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = match std::env::args().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => bail!("usage: parser <resume.pdf | resume.docx>"),
    };

    let gateway = LlmGateway::new(config);
    match gateway.provider() {
        Some(provider) => info!(
            "LLM gateway ready (provider: {}, model: {})",
            provider.name(),
            provider.model()
        ),
        None => info!("no LLM provider configured, deterministic extraction only"),
    }

    let outcome = parser::parse_resume(&gateway, &path, DEFAULT_MAX_CHARS).await?;
    let report = serde_json::json!({
        "record": outcome.record,
        "confidence": outcome.confidence,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
