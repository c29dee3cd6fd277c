//! Configuration management
//!
//! A [`ConfigSource`] is the declarative document as read from disk. It is
//! resolved into an immutable [`Config`] holding a live backend and compiled
//! rules. [`ConfigHandle`] owns the active `Config` and swaps it atomically
//! when the source changes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::core::backends::{BackendRegistry, BackendSpec, TranslationBackend};
use crate::core::errors::ConfigError;
use crate::core::models::LanguagePair;
use crate::core::rules::{RuleSet, RuleSpec};

/// Prefix for environment overrides, e.g. `CLIPPER_BACKEND__APPKEY`
pub const ENV_PREFIX: &str = "CLIPPER";

/// Input and output rule lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorSpec {
    /// Applied to clipboard text before translation
    #[serde(default)]
    pub input: Vec<RuleSpec>,
    /// Applied to the assembled translation
    #[serde(default)]
    pub output: Vec<RuleSpec>,
}

/// Declarative configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSource {
    /// `[backend]` table: provider type and its secrets
    #[serde(default)]
    pub backend: BackendSpec,
    /// `[language]` table
    #[serde(default)]
    pub language: LanguagePair,
    /// `[processor]` rule lists
    #[serde(default)]
    pub processor: ProcessorSpec,
}

impl ConfigSource {
    /// Load from a TOML, YAML or JSON file, layered with `CLIPPER_*`
    /// environment variables
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let source: Self = settings.try_deserialize()?;
        info!("Loaded configuration from {}", path.display());
        Ok(source)
    }

    /// Parse an in-memory TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

/// Resolved, immutable configuration
pub struct Config {
    backend: Arc<dyn TranslationBackend>,
    backend_name: String,
    languages: LanguagePair,
    input_rules: RuleSet,
    output_rules: RuleSet,
}

impl Config {
    /// Configuration around an already built backend, with no rules
    pub fn new(backend: Arc<dyn TranslationBackend>, languages: LanguagePair) -> Self {
        Self {
            backend,
            backend_name: "custom".to_string(),
            languages,
            input_rules: RuleSet::default(),
            output_rules: RuleSet::default(),
        }
    }

    /// Override the name reported for the backend
    pub fn with_backend_name(mut self, name: impl Into<String>) -> Self {
        self.backend_name = name.into();
        self
    }

    /// Rules applied to clipboard text
    pub fn with_input_rules(mut self, rules: RuleSet) -> Self {
        self.input_rules = rules;
        self
    }

    /// Rules applied to the assembled translation
    pub fn with_output_rules(mut self, rules: RuleSet) -> Self {
        self.output_rules = rules;
        self
    }

    /// Translation provider
    pub fn backend(&self) -> &dyn TranslationBackend {
        self.backend.as_ref()
    }

    /// Identifier the backend was resolved from
    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// Configured language pair
    pub fn languages(&self) -> &LanguagePair {
        &self.languages
    }

    /// Input rule list
    pub fn input_rules(&self) -> &RuleSet {
        &self.input_rules
    }

    /// Output rule list
    pub fn output_rules(&self) -> &RuleSet {
        &self.output_rules
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("backend", &self.backend_name)
            .field("languages", &self.languages)
            .field("input_rules", &self.input_rules.len())
            .field("output_rules", &self.output_rules.len())
            .finish()
    }
}

/// Build a [`Config`] from `source` using providers from `registry`.
///
/// Fails on the first problem found: unknown backend, missing secret, then
/// the first rule that does not compile (input rules before output rules).
pub fn resolve(source: &ConfigSource, registry: &BackendRegistry) -> Result<Config, ConfigError> {
    let backend = registry.create(&source.backend)?;
    let input_rules = RuleSet::compile(&source.processor.input)?;
    let output_rules = RuleSet::compile(&source.processor.output)?;

    let config = Config {
        backend,
        backend_name: source.backend.kind.trim().to_ascii_lowercase(),
        languages: source.language.clone(),
        input_rules,
        output_rules,
    };

    info!(
        "Resolved configuration: backend={}, {}, {} input / {} output rules",
        config.backend_name,
        config.languages,
        config.input_rules.len(),
        config.output_rules.len()
    );

    Ok(config)
}

/// [`resolve`] against the built-in providers
pub fn resolve_config(source: &ConfigSource) -> Result<Config, ConfigError> {
    resolve(source, &BackendRegistry::builtin())
}

/// Shared, atomically swappable reference to the active [`Config`]
///
/// Readers take an `Arc` snapshot and keep it for the whole call, so a
/// reload never changes the config under a running translation.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    current: Arc<RwLock<Option<Arc<Config>>>>,
    registry: Arc<BackendRegistry>,
}

impl ConfigHandle {
    /// Handle with an active config
    pub fn new(config: Config) -> Self {
        Self {
            current: Arc::new(RwLock::new(Some(Arc::new(config)))),
            registry: Arc::new(BackendRegistry::builtin()),
        }
    }

    /// Handle with nothing loaded yet
    pub fn empty() -> Self {
        Self::default()
    }

    /// Use `registry` for later re-resolution
    pub fn with_registry(mut self, registry: BackendRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Current config, or [`ConfigError::NotLoaded`]
    pub async fn snapshot(&self) -> Result<Arc<Config>, ConfigError> {
        self.current.read().await.clone().ok_or(ConfigError::NotLoaded)
    }

    /// Whether a config has been loaded
    pub async fn is_loaded(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Swap in `config`, returning the new snapshot
    pub async fn replace(&self, config: Config) -> Arc<Config> {
        let config = Arc::new(config);
        *self.current.write().await = Some(Arc::clone(&config));
        config
    }

    /// Re-resolve after the config source changed.
    ///
    /// The active config is replaced only if resolution succeeds; on error
    /// the previous one stays in effect.
    pub async fn on_source_changed(&self, source: &ConfigSource) -> Result<Arc<Config>, ConfigError> {
        match resolve(source, &self.registry) {
            Ok(config) => Ok(self.replace(config).await),
            Err(e) => {
                warn!("Configuration rejected, keeping previous: {}", e);
                Err(e)
            }
        }
    }

    /// Load `path` and apply it through [`on_source_changed`](Self::on_source_changed)
    pub async fn reload_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Arc<Config>, ConfigError> {
        let source = ConfigSource::from_file(path).map_err(|e| {
            warn!("Configuration unreadable, keeping previous: {}", e);
            e
        })?;
        self.on_source_changed(&source).await
    }
}
