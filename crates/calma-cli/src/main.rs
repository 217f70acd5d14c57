//! Calma command-line front end
//!
//! Runs single classifications against the configured inference backend and
//! prints the canonical result as JSON.

mod cli;

use anyhow::{Context, Result};
use calma_classifiers::{CalmaConfig, ClassificationPipeline, HttpInferenceGateway};
use calma_core::{DiaryEntrySummary, SentimentStats};
use calma_telemetry::describe_metrics;
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_json);

    let config = CalmaConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    config.validate()?;

    debug!(config = %cli.config.display(), "Configuration loaded");

    let output = match cli.command {
        Commands::Stats { entries, days } => {
            let content = std::fs::read_to_string(&entries)
                .with_context(|| format!("Failed to read {}", entries.display()))?;
            let entries: Vec<DiaryEntrySummary> =
                serde_json::from_str(&content).context("Invalid entries file")?;

            serde_json::to_value(SentimentStats::compute(&entries, chrono::Utc::now(), days))?
        }

        Commands::Sentiment { text } => {
            serde_json::to_value(build_pipeline(&config)?.classify_sentiment(&text).await)?
        }

        Commands::Moderate { text } => {
            serde_json::to_value(build_pipeline(&config)?.classify_moderation(&text).await)?
        }

        Commands::Post { title, content } => serde_json::to_value(
            build_pipeline(&config)?
                .moderate_post(&title, &content)
                .await,
        )?,

        Commands::Suggest { mood } => {
            serde_json::to_value(build_pipeline(&config)?.suggest_category(&mood).await)?
        }

        Commands::Analyze { text } => {
            let pipeline = build_pipeline(&config)?;
            let (sentiment, moderation) = tokio::join!(
                pipeline.classify_sentiment(&text),
                pipeline.classify_moderation(&text)
            );

            let snapshot = pipeline.metrics().snapshot();
            debug!(
                total = snapshot.total(),
                fallback_rate = snapshot.fallback_rate(),
                "Classification summary"
            );

            serde_json::json!({
                "sentiment": sentiment,
                "moderation": moderation,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn build_pipeline(config: &CalmaConfig) -> Result<ClassificationPipeline> {
    describe_metrics();

    let gateway = HttpInferenceGateway::from_env(&config.inference)
        .context("Failed to create inference gateway")?;

    info!(
        base_url = %config.inference.base_url,
        timeout_ms = config.inference.timeout_ms,
        moderation_policy = ?config.moderation.failure_policy,
        "Inference gateway ready"
    );

    Ok(ClassificationPipeline::from_config(config, Arc::new(gateway))?)
}

/// Initialize tracing; logs go to stderr so stdout stays valid JSON
fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("calma=debug,calma_classifiers=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("calma=info,calma_classifiers=warn"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
