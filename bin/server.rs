// M52 Aggregation - Web Server

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use m52_aggregation::server::{serve, AppState};
use m52_aggregation::{init_tracing, RuleTable};

#[derive(Debug, Parser)]
#[command(name = "m52-server", version, about = "Serve M52 aggregation over HTTP")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "M52_BIND", default_value = "127.0.0.1:3000")]
    bind: String,

    /// Log level when RUST_LOG is not set
    #[arg(long, env = "M52_LOG", default_value = "info")]
    log_level: String,

    /// Alternate rule table (JSON)
    #[arg(long, env = "M52_RULES")]
    rules: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let table = match &args.rules {
        Some(path) => RuleTable::from_file(path)?,
        None => RuleTable::standard()
            .context("Standard rule table is invalid")?
            .clone(),
    };
    tracing::info!(rules = table.len(), "🌐 M52 aggregation server starting");

    serve(AppState::new(Arc::new(table)), &args.bind).await
}
