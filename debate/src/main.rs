//! CLI entry point — run a debate over a corpus file.
//!
//! ```bash
//! DEBATE_API_KEY=sk-... debate --corpus papers.json --max-rounds 4
//! ```
//!
//! The corpus file is a JSON array of document records. The transcript
//! streams to stdout as turns arrive; the final outcome (including the
//! full conversation) can be written to a file with `--out`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use debate::{
    Corpus, DebateConfig, DebateObserver, HttpAgentGateway, HttpGatewayConfig, Orchestrator,
    ParserConfig, Turn,
};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the corpus JSON file (array of document records)
    #[arg(long)]
    corpus: PathBuf,

    /// Chat-completions endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,

    /// Maximum critique rounds
    #[arg(long, default_value_t = 4)]
    max_rounds: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// Write the full outcome JSON to this path
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Prints each turn as it lands.
struct ConsoleObserver;

impl DebateObserver for ConsoleObserver {
    fn on_turn(&mut self, conversation: &[Turn]) {
        if let Some(turn) = conversation.last() {
            println!(
                "\n=== Turn {} — {} ===\n{}",
                turn.turn_index,
                turn.role.display_name(),
                turn.raw_text
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("debate=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let raw = std::fs::read_to_string(&args.corpus)
        .with_context(|| format!("failed to read corpus file {}", args.corpus.display()))?;
    let corpus: Corpus = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse corpus file {}", args.corpus.display()))?;
    info!(documents = corpus.len(), "corpus loaded");

    let mut gateway_config = HttpGatewayConfig {
        api_key: std::env::var("DEBATE_API_KEY").unwrap_or_default(),
        timeout: Duration::from_secs(args.timeout_secs),
        ..Default::default()
    };
    if let Some(endpoint) = args.endpoint {
        gateway_config.endpoint = endpoint;
    }
    if let Some(model) = args.model {
        gateway_config.model = model;
    }

    let config = DebateConfig {
        max_rounds: args.max_rounds,
        parser: ParserConfig::default(),
        ..Default::default()
    };

    let orchestrator = Orchestrator::with_config(
        Box::new(HttpAgentGateway::new(gateway_config)),
        config,
    );

    let mut observer = ConsoleObserver;
    let outcome = orchestrator.run(&corpus, Some(&mut observer)).await;

    println!("\n{}", outcome.summary_line());
    if let Some(decision) = &outcome.final_decision {
        println!("final directive: {} ({})", decision.status, decision.reason);
    }

    if let Some(out) = &args.out {
        let json = serde_json::to_string_pretty(&outcome)?;
        std::fs::write(out, json)
            .with_context(|| format!("failed to write outcome to {}", out.display()))?;
        info!(path = %out.display(), "outcome written");
    }

    if !outcome.success {
        anyhow::bail!(
            "debate failed: {}",
            outcome.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    Ok(())
}
