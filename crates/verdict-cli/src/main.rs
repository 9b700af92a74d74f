//! `verdict` — analyse and compare marketplace products from their reviews.
//!
//! # Usage
//!
//! ```
//! verdict https://www.wildberries.ru/catalog/7654321/detail.aspx
//! verdict 7654321 1234567 --concurrency 2
//! verdict 7654321 --json --config ~/.config/verdict/verdict.toml
//! ```

mod render;
mod settings;

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use clap::Parser;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;
use verdict_catalog::CatalogClient;
use verdict_core::message::RunMessage;
use verdict_llm::ChatClient;
use verdict_pipeline::{spawn_multiple, spawn_single};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "verdict", version, about = "Analyse and compare products from their reviews")]
struct Args {
  /// Product links or article numbers. Two or more are compared.
  #[arg(required = true, value_name = "PRODUCT")]
  products: Vec<String>,

  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "verdict.toml")]
  config: PathBuf,

  /// Analyse reviews of every size and colour, not just the requested one.
  #[arg(long)]
  all_variations: bool,

  /// Print every run message as a JSON line instead of text.
  #[arg(long)]
  json: bool,

  /// Products processed at once when comparing.
  #[arg(long, env = "VERDICT_CONCURRENCY")]
  concurrency: Option<usize>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  // Logs go to stderr; stdout carries results only.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let mut app = settings::load(&args.config)?;
  if args.all_variations {
    app.pipeline.strict_variation = false;
  }
  if let Some(n) = args.concurrency {
    app.pipeline.concurrency = n.max(1);
  }

  let catalog = CatalogClient::new(app.catalog).context("failed to build catalog client")?;
  let client = ChatClient::new(app.analysis).context("failed to build analysis client")?;

  let mut products = args.products;
  let mut handle = if products.len() == 1 {
    spawn_single(catalog, client, app.pipeline, products.remove(0))
  } else {
    spawn_multiple(catalog, client, app.pipeline, products)
  };
  info!(run_id = %handle.id, "run started");

  let mut failed = false;
  while let Some(message) = handle.next().await {
    failed |= matches!(message, RunMessage::Error { .. });
    if args.json {
      println!("{}", serde_json::to_string(&message).context("failed to encode message")?);
    } else {
      render::render(&message).emit();
    }
  }
  handle.worker.await.context("run worker panicked")?;

  Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
