//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language code that lets the provider detect the source language
pub const AUTO_DETECT: &str = "auto";

/// Source and target language codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    /// Language to translate from, `auto` to detect
    #[serde(default = "default_source", alias = "original")]
    pub source: String,
    /// Language to translate to
    #[serde(default = "default_target")]
    pub target: String,
}

fn default_source() -> String {
    AUTO_DETECT.to_string()
}

fn default_target() -> String {
    "zh".to_string()
}

impl LanguagePair {
    /// Pair from explicit source and target codes
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Whether the provider should detect the source language
    pub fn detects_source(&self) -> bool {
        self.source == AUTO_DETECT
    }

    /// Replace either side with an override when one is given
    pub fn overridden(&self, source: Option<&str>, target: Option<&str>) -> Self {
        Self {
            source: source.unwrap_or(&self.source).to_string(),
            target: target.unwrap_or(&self.target).to_string(),
        }
    }
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self {
            source: default_source(),
            target: default_target(),
        }
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}
