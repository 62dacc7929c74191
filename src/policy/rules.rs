//! Boundary rule definitions and glob compilation

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CycleBreakerError;
use crate::fixer::StrategyKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warn => write!(f, "warn"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// An architectural constraint forbidding imports from one set of paths to
/// another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub name: String,
    #[serde(rename = "from")]
    pub from_pattern: String,
    #[serde(rename = "to")]
    pub to_pattern: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub recommended_strategies: Option<Vec<StrategyKind>>,
}

impl PolicyRule {
    pub fn new(name: &str, from_pattern: &str, to_pattern: &str, severity: Severity) -> Self {
        Self {
            name: name.to_string(),
            from_pattern: from_pattern.to_string(),
            to_pattern: to_pattern.to_string(),
            severity,
            description: None,
            recommended_strategies: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_recommended_strategies(mut self, strategies: Vec<StrategyKind>) -> Self {
        self.recommended_strategies = Some(strategies);
        self
    }
}

/// A rule whose patterns have been turned into anchored regexes
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: PolicyRule,
    from: Regex,
    to: Regex,
}

impl CompiledRule {
    pub fn compile(rule: PolicyRule) -> Result<Self, CycleBreakerError> {
        if rule.name.trim().is_empty() {
            return Err(CycleBreakerError::ConfigurationError {
                message: "Policy rule is missing a name".to_string(),
            });
        }

        let from = compile_pattern(&rule.name, &rule.from_pattern)?;
        let to = compile_pattern(&rule.name, &rule.to_pattern)?;
        Ok(Self { rule, from, to })
    }

    /// Both endpoints are relative, `/`-separated paths
    pub fn matches(&self, from: &str, to: &str) -> bool {
        self.from.is_match(from) && self.to.is_match(to)
    }
}

/// Translate a glob into an anchored regex
///
/// `**` matches across separators, `*` stays within one path segment and
/// every other character is matched literally.
pub fn compile_pattern(rule: &str, pattern: &str) -> Result<Regex, CycleBreakerError> {
    let invalid = |message: &str| CycleBreakerError::InvalidPattern {
        rule: rule.to_string(),
        pattern: pattern.to_string(),
        message: message.to_string(),
    };

    if pattern.trim().is_empty() {
        return Err(invalid("pattern is empty"));
    }
    if pattern.contains("***") {
        return Err(invalid("'***' is not a valid wildcard"));
    }

    let mut regex = String::from("^");
    let mut rest = pattern;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("**") {
            regex.push_str(".*");
            rest = after;
        } else if let Some(after) = rest.strip_prefix('*') {
            regex.push_str("[^/]*");
            rest = after;
        } else {
            let literal_end = rest.find('*').unwrap_or(rest.len());
            regex.push_str(&regex::escape(&rest[..literal_end]));
            rest = &rest[literal_end..];
        }
    }
    regex.push('$');

    Regex::new(&regex).map_err(|e| invalid(&e.to_string()))
}
