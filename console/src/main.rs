// console/src/main.rs

mod cli;
mod commands;
mod render;
mod state;

use clap::Parser;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool, json: bool) {
  // Terminal output stays clean unless asked otherwise; RUST_LOG always wins.
  let default_level = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  let span_events = if verbose { FmtSpan::CLOSE } else { FmtSpan::NONE };

  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(span_events)
    .with_writer(std::io::stderr);
  if json {
    builder.json().init();
  } else {
    builder.init();
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Loaded before parsing so `.env` values reach clap's env fallbacks.
  dotenvy::dotenv().ok();
  let cli = cli::Cli::parse();
  init_tracing(cli.verbose, cli.log_json);
  tracing::debug!("Starting ChatPayKit console.");
  cli.run().await
}
