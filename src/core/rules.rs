//! Ordered regex substitution pipeline
//!
//! Rules run first to last over the same string; each rule sees the output
//! of the ones before it. Used on clipboard text before chunking and on the
//! assembled translation afterwards.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::core::errors::ConfigError;

/// A rule as written in the config source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Regular expression, `regex` crate dialect
    pub pattern: String,
    /// Replacement; `$1`, `${name}` and `\1` style references are accepted
    #[serde(default)]
    pub replacement: String,
}

impl RuleSpec {
    /// Rule spec from a pattern and its replacement
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// A compiled pattern and its replacement
#[derive(Debug, Clone)]
pub struct RegexRule {
    pattern: Regex,
    replacement: String,
}

impl RegexRule {
    /// Compile a rule, failing if the pattern is not a valid regex
    pub fn new(pattern: &str, replacement: &str) -> Result<Self, ConfigError> {
        let compiled = Regex::new(pattern).map_err(|e| ConfigError::InvalidRule {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            pattern: compiled,
            replacement: normalize_backrefs(replacement),
        })
    }

    /// Source text of the pattern
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Replacement in `regex` crate syntax
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Replace every non-overlapping match in `text`
    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement.as_str())
            .into_owned()
    }
}

impl TryFrom<&RuleSpec> for RegexRule {
    type Error = ConfigError;

    fn try_from(spec: &RuleSpec) -> Result<Self, Self::Error> {
        RegexRule::new(&spec.pattern, &spec.replacement)
    }
}

/// Rewrite `\1` style backreferences into `${1}`.
///
/// A replacement written with backslash references treats `$` as plain
/// text, so every `$` in it is escaped to `$$` first. Replacements without
/// backslash references are already in `regex` syntax and pass through.
fn normalize_backrefs(replacement: &str) -> String {
    static BACKREF: OnceLock<Regex> = OnceLock::new();
    let backref = BACKREF.get_or_init(|| {
        Regex::new(r"\\([0-9]{1,2})").unwrap_or_else(|e| unreachable!("static regex: {}", e))
    });

    if !backref.is_match(replacement) {
        return replacement.to_string();
    }

    let escaped = replacement.replace('$', "$$");
    backref
        .replace_all(&escaped, |caps: &Captures| format!("${{{}}}", &caps[1]))
        .into_owned()
}

/// An ordered list of rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<RegexRule>,
}

impl RuleSet {
    /// Rule set from already compiled rules
    pub fn new(rules: Vec<RegexRule>) -> Self {
        Self { rules }
    }

    /// Compile every spec in order, stopping at the first invalid pattern
    pub fn compile(specs: &[RuleSpec]) -> Result<Self, ConfigError> {
        let rules = specs
            .iter()
            .map(RegexRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when there are no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in application order
    pub fn iter(&self) -> impl Iterator<Item = &RegexRule> {
        self.rules.iter()
    }

    /// Run every rule over `text`, in order
    pub fn apply(&self, text: &str) -> String {
        apply(&self.rules, text)
    }
}

/// Apply `rules` in order to `text`. An empty list returns `text` unchanged.
pub fn apply(rules: &[RegexRule], text: &str) -> String {
    rules
        .iter()
        .fold(text.to_string(), |current, rule| rule.apply(&current))
}
