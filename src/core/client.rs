//! Translation orchestrator: chunking, sequential dispatch and pacing

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::core::chunker::{self, DEFAULT_MAX_CHUNK_SIZE};
use crate::core::config::Config;
use crate::core::errors::{Result, TranslationError};

/// Pause after this many chunks
pub const DEFAULT_PACE_EVERY: usize = 10;

/// Length of the pause between chunk batches
pub const DEFAULT_PACE_DELAY_MS: u64 = 200;

/// Tuning knobs for [`Translator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorOptions {
    /// Character budget per chunk
    pub max_chunk_size: usize,
    /// Pause after every `pace_every` chunks
    pub pace_every: usize,
    /// Length of each pause
    pub pace_delay: Duration,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            pace_every: DEFAULT_PACE_EVERY,
            pace_delay: Duration::from_millis(DEFAULT_PACE_DELAY_MS),
        }
    }
}

impl TranslatorOptions {
    /// Whether to pause after the chunk at `index` out of `total`
    pub fn pauses_after(&self, index: usize, total: usize) -> bool {
        self.pace_every > 0 && index + 1 < total && index % self.pace_every == self.pace_every - 1
    }
}

/// Translates whole texts against a [`Config`] snapshot
///
/// Chunks are sent one at a time, in order. The first failing chunk aborts
/// the call; nothing is retried.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    options: TranslatorOptions,
}

impl Translator {
    /// Translator with default chunk size and pacing
    pub fn new() -> Self {
        Self::default()
    }

    /// Translator with custom options; a zero chunk size is raised to 1
    pub fn with_options(options: TranslatorOptions) -> Self {
        let options = TranslatorOptions {
            max_chunk_size: options.max_chunk_size.max(1),
            ..options
        };
        Self { options }
    }

    /// Effective options
    pub fn options(&self) -> &TranslatorOptions {
        &self.options
    }

    /// Translate `text` and run the output rules over the result.
    ///
    /// `text` is expected to be normalized already; input rules are the
    /// caller's job.
    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        config: &Config,
    ) -> Result<String> {
        if text.trim().is_empty() {
            return Err(TranslationError::EmptyInput);
        }

        let chunks = chunker::split(text, self.options.max_chunk_size);
        let total = chunks.len();
        info!(
            "Translating {} chars in {} chunk(s) via {} ({} -> {})",
            text.chars().count(),
            total,
            config.backend_name(),
            source_lang,
            target_lang
        );

        let mut result = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            debug!("Chunk {}/{}: {} chars", i + 1, total, chunk.chars().count());

            let translated = config
                .backend()
                .translate_chunk(chunk, source_lang, target_lang)
                .await
                .map_err(|e| {
                    warn!("Chunk {}/{} failed: {}", i + 1, total, e);
                    e
                })?;
            result.push_str(&translated);

            if self.options.pauses_after(i, total) {
                debug!("Pausing {:?} after chunk {}", self.options.pace_delay, i + 1);
                sleep(self.options.pace_delay).await;
            }
        }

        Ok(config.output_rules().apply(&result))
    }

    /// Translate with the config's own language pair
    pub async fn translate_configured(&self, text: &str, config: &Config) -> Result<String> {
        let languages = config.languages();
        self.translate(text, &languages.source, &languages.target, config)
            .await
    }
}
