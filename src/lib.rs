//! Clipper - clipboard translation pipeline
//!
//! Clipboard text is trimmed and normalized by ordered regex rules, cut into
//! sentence-preserving chunks, translated chunk by chunk through a pluggable
//! backend and reformatted by a second rule list.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;
pub mod processors;

// Re-export key types for convenience
pub use crate::core::{
    backends::{BackendRegistry, BackendSpec, TranslationBackend},
    chunker::{split, DEFAULT_MAX_CHUNK_SIZE},
    client::{Translator, TranslatorOptions},
    config::{resolve, resolve_config, Config, ConfigHandle, ConfigSource},
    errors::{ClipperError, ConfigError, TranslationError},
    models::LanguagePair,
    rules::{RegexRule, RuleSet, RuleSpec},
};

pub use crate::processors::clipboard::ClipboardProcessor;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
