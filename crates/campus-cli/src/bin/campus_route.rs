use anyhow::{Context, Result};
use campus_cli::{run, Command};
use campus_core::{load_campus_dir, SearchLimits, DEFAULT_MAX_SETTLED_NODES};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Query campus routes from a data directory", long_about = None)]
struct Args {
    /// Campus data directory
    #[arg(long, default_value = "data")]
    data: PathBuf,

    /// Cap on nodes settled per search
    #[arg(long, default_value_t = DEFAULT_MAX_SETTLED_NODES)]
    max_settled: usize,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let graph = load_campus_dir(&args.data)
        .with_context(|| format!("loading campus data from {}", args.data.display()))?;

    let limits = SearchLimits {
        max_settled_nodes: args.max_settled,
    };
    let output = run(Arc::new(graph), limits, args.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
