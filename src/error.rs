use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
#[error("Invalid TOML syntax in '{file}'")]
#[diagnostic(
    code(cycle_breaker::toml_parse_error),
    help("Check the TOML syntax near the highlighted position")
)]
pub struct TomlParseError {
    pub file: String,
    #[source_code]
    pub source_code: NamedSource<String>,
    #[label("syntax error here")]
    pub span: Option<SourceSpan>,
    #[source]
    pub source: toml::de::Error,
}

#[derive(Error, Debug, Diagnostic)]
pub enum CycleBreakerError {
    #[error("Failed to read file '{path}'")]
    #[diagnostic(
        code(cycle_breaker::io_error),
        help("Check if the file exists and you have read permissions")
    )]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}'")]
    #[diagnostic(
        code(cycle_breaker::write_error),
        help("Check file permissions and disk space")
    )]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    TomlParseError(Box<TomlParseError>),

    #[error("JSON serialization error")]
    #[diagnostic(
        code(cycle_breaker::json_error),
        help("This is likely an internal error - please report it")
    )]
    Json(#[from] serde_json::Error),

    #[error("IO error")]
    #[diagnostic(
        code(cycle_breaker::io_error),
        help("Check file permissions and disk space")
    )]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(cycle_breaker::config_error),
        help("Check your configuration values")
    )]
    ConfigurationError { message: String },

    #[error("Invalid pattern '{pattern}' in rule '{rule}': {message}")]
    #[diagnostic(
        code(cycle_breaker::invalid_pattern),
        help("Patterns support '*' (one path segment) and '**' (any number of segments)")
    )]
    InvalidPattern {
        rule: String,
        pattern: String,
        message: String,
    },

    #[error("Failed to parse '{path}': {message}")]
    #[diagnostic(
        code(cycle_breaker::parse_error),
        help("The file is excluded from the graph; fix the syntax error and re-run")
    )]
    ParseError { path: String, message: String },

    #[error("Strategy '{strategy}' failed: {message}")]
    #[diagnostic(
        code(cycle_breaker::strategy_error),
        help("The next candidate strategy is tried; see the manual steps in the fix result")
    )]
    StrategyError { strategy: String, message: String },

    #[error("Refusing to modify '{path}' a second time in the same run")]
    #[diagnostic(
        code(cycle_breaker::write_conflict),
        help("Re-run the fix after reviewing the changes already made to this file")
    )]
    WriteConflict { path: String },

    #[error("Writing '{path}' failed ({message}) and {} could not be restored", .unrestored.join(", "))]
    #[diagnostic(
        code(cycle_breaker::partial_write),
        help("Restore the listed files from their .bak copies before re-running")
    )]
    PartialWrite {
        path: String,
        message: String,
        unrestored: Vec<String>,
    },

    #[error("Attempted to write '{path}' during a dry run")]
    #[diagnostic(
        code(cycle_breaker::dry_run_violation),
        help("This is likely an internal error - please report it")
    )]
    DryRunViolation { path: String },
}

#[cfg(test)]
mod tests {
    use std::io;

    use miette::NamedSource;

    use super::*;

    #[test]
    fn test_toml_parse_error_display() {
        let source_code = "invalid = toml content";
        let toml_err = toml::from_str::<toml::Value>(source_code).unwrap_err();

        let error = TomlParseError {
            file: "policy.toml".to_string(),
            source_code: NamedSource::new("policy.toml", source_code.to_string()),
            span: Some((10, 4).into()),
            source: toml_err,
        };

        assert_eq!(error.to_string(), "Invalid TOML syntax in 'policy.toml'");
    }

    #[test]
    fn test_file_read_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error = CycleBreakerError::FileReadError {
            path: PathBuf::from("/tmp/missing.ts"),
            source: io_err,
        };

        assert_eq!(error.to_string(), "Failed to read file '/tmp/missing.ts'");
    }

    #[test]
    fn test_invalid_pattern_error() {
        let error = CycleBreakerError::InvalidPattern {
            rule: "layers".to_string(),
            pattern: "src/***".to_string(),
            message: "'***' is not a valid wildcard".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Invalid pattern 'src/***' in rule 'layers': '***' is not a valid wildcard"
        );
    }

    #[test]
    fn test_write_conflict_error() {
        let error = CycleBreakerError::WriteConflict {
            path: "/repo/src/a.ts".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Refusing to modify '/repo/src/a.ts' a second time in the same run"
        );
    }

    #[test]
    fn test_error_codes() {
        use miette::Diagnostic;

        let error = CycleBreakerError::StrategyError {
            strategy: "import-type".to_string(),
            message: "boom".to_string(),
        };

        assert!(error.code().is_some());
        assert!(error.help().is_some());
    }

    #[test]
    fn test_error_conversion_from_io() {
        let io_err = io::Error::other("some io error");
        let err: CycleBreakerError = io_err.into();

        match err {
            CycleBreakerError::Io(_) => {}
            _ => panic!("Expected Io variant"),
        }
    }

    #[test]
    fn test_error_conversion_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let err: CycleBreakerError = json_err.into();

        match err {
            CycleBreakerError::Json(_) => {}
            _ => panic!("Expected Json variant"),
        }
    }
}
