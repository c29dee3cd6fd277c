//! Main entry point for the Clipper CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipper::cli::commands::{self, Commands};

/// Clipper - translate clipboard text through pluggable providers
#[derive(Parser, Debug)]
#[command(name = "clipper", version, about, long_about = None)]
struct Args {
    /// Config file (TOML, YAML or JSON)
    #[arg(short, long, env = "CLIPPER_CONFIG", default_value = "clipper.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}={}", env!("CARGO_PKG_NAME"), log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match args.command {
        Commands::Translate {
            text,
            file,
            from,
            to,
            raw,
        } => {
            commands::handle_translate(&args.config, text, file, from, to, raw).await?;
        }
        Commands::CheckConfig => {
            commands::handle_check_config(&args.config).await?;
        }
        Commands::Backends => commands::handle_backends(),
    }

    Ok(())
}
