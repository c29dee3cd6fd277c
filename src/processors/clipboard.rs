//! Clipboard processor: the entry point for UIs and the CLI
//!
//! Wraps a [`Translator`] and a [`ConfigHandle`]. Each operation takes one
//! config snapshot and uses it throughout, so a reload in between is never
//! observed halfway.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::client::Translator;
use crate::core::config::{Config, ConfigHandle, ConfigSource};
use crate::core::errors::{ClipperError, ConfigError, TranslationError};

/// Load, normalize and translate clipboard text
#[derive(Debug, Clone)]
pub struct ClipboardProcessor {
    translator: Translator,
    config: ConfigHandle,
}

impl ClipboardProcessor {
    /// Create a new clipboard processor
    pub fn new(translator: Translator, config: ConfigHandle) -> Self {
        Self { translator, config }
    }

    /// Processor with default translator settings around `config`
    pub fn with_config(config: Config) -> Self {
        Self::new(Translator::new(), ConfigHandle::new(config))
    }

    /// Create from a config file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClipperError> {
        let handle = ConfigHandle::empty();
        handle.reload_from_file(path).await?;
        Ok(Self::new(Translator::new(), handle))
    }

    /// The handle this processor reads from
    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    /// Trim raw clipboard text and run the input rules over it
    pub async fn load(&self, raw: &str) -> Result<String, ClipperError> {
        let config = self.config.snapshot().await?;
        Ok(normalize(raw, &config)?)
    }

    /// Translate already loaded text with the configured language pair
    pub async fn translate(&self, text: &str) -> Result<String, ClipperError> {
        let config = self.config.snapshot().await?;
        Ok(self.translator.translate_configured(text, &config).await?)
    }

    /// Translate already loaded text with an explicit language pair
    pub async fn translate_with(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ClipperError> {
        let config = self.config.snapshot().await?;
        Ok(self
            .translator
            .translate(text, source_lang, target_lang, &config)
            .await?)
    }

    /// Load then translate under a single config snapshot.
    ///
    /// `source_lang` / `target_lang` override the configured pair when set.
    pub async fn load_and_translate(
        &self,
        raw: &str,
        source_lang: Option<&str>,
        target_lang: Option<&str>,
    ) -> Result<String, ClipperError> {
        let config = self.config.snapshot().await?;
        let text = normalize(raw, &config)?;
        let languages = config.languages().overridden(source_lang, target_lang);

        let translation = self
            .translator
            .translate(&text, &languages.source, &languages.target, &config)
            .await?;
        info!("Translation complete: {} chars", translation.chars().count());
        Ok(translation)
    }

    /// Hook for an external watcher: the config source changed
    pub async fn on_source_changed(&self, source: &ConfigSource) -> Result<Arc<Config>, ConfigError> {
        self.config.on_source_changed(source).await
    }
}

fn normalize(raw: &str, config: &Config) -> Result<String, TranslationError> {
    let text = config.input_rules().apply(raw.trim());
    if text.is_empty() {
        return Err(TranslationError::EmptyInput);
    }
    debug!("Loaded {} chars of clipboard text", text.chars().count());
    Ok(text)
}
