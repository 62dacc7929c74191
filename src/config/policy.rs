//! Boundary rule files

use std::path::Path;

use miette::{NamedSource, SourceSpan};
use serde::Deserialize;

use crate::error::{CycleBreakerError, TomlParseError};
use crate::policy::{CompiledRule, PolicyRule};

/// Contents of a TOML policy file
///
/// ```toml
/// [[rules]]
/// name = "domain-is-pure"
/// from = "src/domain/**"
/// to = "src/infrastructure/**"
/// severity = "error"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyFile {
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

impl PolicyFile {
    pub fn parse_file(path: &Path) -> Result<Self, CycleBreakerError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| CycleBreakerError::FileReadError {
                path: path.to_path_buf(),
                source,
            })?;

        Self::parse_str(&path.display().to_string(), &content)
    }

    /// Parse and validate policy text; `name` labels diagnostics
    pub fn parse_str(name: &str, content: &str) -> Result<Self, CycleBreakerError> {
        let file: PolicyFile = toml::from_str(content).map_err(|e| {
            let span = e
                .span()
                .map(|span| SourceSpan::new(span.start.into(), span.end - span.start));

            CycleBreakerError::TomlParseError(Box::new(TomlParseError {
                file: name.to_string(),
                source_code: NamedSource::new(name, content.to_string()),
                span,
                source: e,
            }))
        })?;

        for rule in &file.rules {
            CompiledRule::compile(rule.clone())?;
        }

        Ok(file)
    }
}
