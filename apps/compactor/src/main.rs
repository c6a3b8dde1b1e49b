use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{error, info, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use compactor::config::Config;
use compactor::errors::AppError;
use compactor::layout::CompactLayoutEngine;
use compactor::pipeline::{self, GenerationReport};
use compactor::xref::CrossReferenceSystem;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let config = Config::from_env()?;

    // stdout carries the report, logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting compactor v{}", env!("CARGO_PKG_VERSION"));

    let path = config.document_path(std::env::args_os().nth(1).map(PathBuf::from))?;
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("run", %run_id, document = %path.display());

    match generate(&config, path).instrument(span).await {
        Ok(report) => {
            let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(code = e.code(), "{e}");
            println!("{}", e.to_json());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn generate(config: &Config, path: PathBuf) -> Result<GenerationReport, AppError> {
    let document = pipeline::load_document(&path).await?;
    let engine = CompactLayoutEngine::new(config.layout_config())?
        .with_split_strategy(config.split_strategy);
    let system = CrossReferenceSystem::new(config.cross_reference_config());
    info!(
        paper = %config.paper_size,
        columns = config.columns,
        confidence_threshold = config.confidence_threshold,
        "Components configured"
    );

    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || {
        let _guard = span.enter();
        pipeline::run(&document, &engine, &system)
    })
    .await
    .context("Generation task panicked")?
}
