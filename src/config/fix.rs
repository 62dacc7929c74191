//! Fix run configuration

use super::detect::DetectConfig;
use crate::common::{ConfigBuilder, required};
use crate::error::CycleBreakerError;
use crate::fixer::StrategyKind;

/// Configuration for a fix run
#[derive(Debug, Clone)]
pub struct FixConfig {
    /// How cycles are found before fixing
    pub detect: DetectConfig,
    /// Report what would change without writing anything
    pub dry_run: bool,
    /// Copy files aside before modifying them
    pub backup: bool,
    /// Only use these strategies (None = all registered)
    pub allowed_strategies: Option<Vec<StrategyKind>>,
    /// Stop after this many cycles (None = all)
    pub stop_after: Option<usize>,
}

impl FixConfig {
    pub fn builder() -> FixConfigBuilder {
        FixConfigBuilder::new()
    }
}

#[derive(Default)]
pub struct FixConfigBuilder {
    detect: Option<DetectConfig>,
    dry_run: Option<bool>,
    backup: Option<bool>,
    allowed_strategies: Option<Vec<StrategyKind>>,
    stop_after: Option<usize>,
}

impl FixConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detect(mut self, detect: DetectConfig) -> Self {
        self.detect = Some(detect);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = Some(dry_run);
        self
    }

    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = Some(backup);
        self
    }

    pub fn with_allowed_strategies(mut self, allowed: Option<Vec<StrategyKind>>) -> Self {
        self.allowed_strategies = allowed;
        self
    }

    pub fn with_stop_after(mut self, stop_after: Option<usize>) -> Self {
        self.stop_after = stop_after;
        self
    }
}

impl ConfigBuilder for FixConfigBuilder {
    type Config = FixConfig;

    fn build(self) -> Result<Self::Config, CycleBreakerError> {
        if self
            .allowed_strategies
            .as_ref()
            .is_some_and(|allowed| allowed.is_empty())
        {
            return Err(CycleBreakerError::ConfigurationError {
                message: "allowed_strategies must name at least one strategy".to_string(),
            });
        }

        Ok(FixConfig {
            detect: required(self.detect, "detect")?,
            dry_run: self.dry_run.unwrap_or(false),
            backup: self.backup.unwrap_or(true),
            allowed_strategies: self.allowed_strategies,
            stop_after: self.stop_after,
        })
    }
}
