//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::info;

use crate::core::backends::BackendRegistry;
use crate::core::config::{resolve_config, ConfigSource};
use crate::processors::clipboard::ClipboardProcessor;

/// Commands for Clipper
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate text (argument, file or stdin)
    Translate {
        /// Text to translate; read from stdin when neither this nor --file is given
        text: Option<String>,

        /// Read the text from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Source language (defaults to the configured one)
        #[arg(long)]
        from: Option<String>,

        /// Target language (defaults to the configured one)
        #[arg(short, long)]
        to: Option<String>,

        /// Skip trimming and input rules
        #[arg(long)]
        raw: bool,
    },

    /// Validate the config file and print a summary
    CheckConfig,

    /// List available translation backends
    Backends,
}

/// Handle translate command
pub async fn handle_translate(
    config: &Path,
    text: Option<String>,
    file: Option<PathBuf>,
    from: Option<String>,
    to: Option<String>,
    raw: bool,
) -> anyhow::Result<()> {
    let input = match (text, file) {
        (Some(text), _) => text,
        (None, Some(file)) => tokio::fs::read_to_string(&file).await.map_err(|e| {
            anyhow::anyhow!("Failed to read {}: {}", file.display(), e)
        })?,
        (None, None) => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    let processor = ClipboardProcessor::from_file(config).await?;

    let translation = if raw {
        let snapshot = processor.config().snapshot().await?;
        let languages = snapshot
            .languages()
            .overridden(from.as_deref(), to.as_deref());
        processor
            .translate_with(&input, &languages.source, &languages.target)
            .await?
    } else {
        processor
            .load_and_translate(&input, from.as_deref(), to.as_deref())
            .await?
    };

    println!("{}", translation.trim_end_matches('\n'));
    Ok(())
}

/// Handle check-config command
pub async fn handle_check_config(config: &Path) -> anyhow::Result<()> {
    info!("Checking configuration: {}", config.display());

    let source = ConfigSource::from_file(config)?;
    let resolved = resolve_config(&source)?;

    println!("✅ Configuration OK: {}", config.display());
    println!("   Backend: {}", resolved.backend_name());
    println!("   Languages: {}", resolved.languages());
    println!("   Input rules: {}", resolved.input_rules().len());
    for rule in resolved.input_rules().iter() {
        println!("     {} => {}", rule.pattern(), rule.replacement());
    }
    println!("   Output rules: {}", resolved.output_rules().len());
    for rule in resolved.output_rules().iter() {
        println!("     {} => {}", rule.pattern(), rule.replacement());
    }

    Ok(())
}

/// Handle backends command
pub fn handle_backends() {
    for name in BackendRegistry::builtin().names() {
        println!("{}", name);
    }
}
