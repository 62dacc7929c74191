//! Fix use case executor

use std::sync::atomic::{AtomicBool, Ordering};

use miette::Result;
use serde::Serialize;

use super::detect::DetectExecutor;
use crate::analysis::AnalysisResult;
use crate::config::FixConfig;
use crate::fixer::{FixContext, FixOrchestrator, FixResult, FixStrategy, default_strategies};
use crate::fs::FileSystem;
use crate::parser::Parser;
use crate::progress::ProgressReporter;

/// Outcome of a fix run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixReport {
    pub analysis: AnalysisResult,
    pub results: Vec<FixResult>,
    pub fixed: usize,
    /// Cycles left with manual steps only
    pub manual: usize,
    pub failed: usize,
    /// Set when the run stopped early on the cancel flag
    pub cancelled: bool,
    pub dry_run: bool,
}

impl FixReport {
    fn new(analysis: AnalysisResult, dry_run: bool) -> Self {
        Self {
            analysis,
            results: Vec::new(),
            fixed: 0,
            manual: 0,
            failed: 0,
            cancelled: false,
            dry_run,
        }
    }

    fn record(&mut self, result: FixResult) {
        if result.success {
            self.fixed += 1;
        } else if result.error.is_some() {
            self.failed += 1;
        } else {
            self.manual += 1;
        }
        self.results.push(result);
    }

    /// Files written (or, in a dry run, planned) across all cycles
    pub fn touched_files(&self) -> impl Iterator<Item = &str> {
        self.results.iter().flat_map(|result| {
            result
                .modified_files
                .iter()
                .chain(&result.created_files)
                .chain(&result.planned_files)
                .map(String::as_str)
        })
    }
}

/// Detects cycles and hands each one to the strategy orchestrator
pub struct FixExecutor<'a> {
    fs: &'a dyn FileSystem,
    parser: &'a dyn Parser,
    strategies: Vec<Box<dyn FixStrategy>>,
}

impl<'a> FixExecutor<'a> {
    /// An executor with the built-in strategies registered
    pub fn new(fs: &'a dyn FileSystem, parser: &'a dyn Parser) -> Self {
        Self {
            fs,
            parser,
            strategies: default_strategies(),
        }
    }

    /// Replace the registered strategies; order breaks score ties
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn FixStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn execute(
        &self,
        config: &FixConfig,
        cancel: Option<&AtomicBool>,
        progress: Option<&ProgressReporter>,
    ) -> Result<FixReport> {
        let analysis = DetectExecutor::new(self.fs, self.parser).analyze(&config.detect, progress)?;
        let graph = analysis.graph;
        let mut report = FixReport::new(analysis.result, config.dry_run);

        let limit = config
            .stop_after
            .unwrap_or(usize::MAX)
            .min(report.analysis.cycles.len());
        let cycles = report.analysis.cycles[..limit].to_vec();

        let orchestrator = FixOrchestrator::new(&self.strategies)
            .with_allowed(config.allowed_strategies.as_deref());
        let mut ctx = FixContext::new(self.fs, config.dry_run).with_backup(config.backup);

        if let Some(p) = progress {
            p.start_fixing(cycles.len(), config.dry_run);
        }

        for cycle in &cycles {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                tracing::info!(
                    processed = report.results.len(),
                    remaining = cycles.len() - report.results.len(),
                    "fix run cancelled"
                );
                report.cancelled = true;
                break;
            }

            let result = orchestrator.fix_cycle(cycle, &graph, &mut ctx);
            tracing::debug!(
                cycle = %cycle.id,
                strategy = ?result.strategy,
                success = result.success,
                "cycle processed"
            );
            if let Some(p) = progress {
                p.cycle_fixed(&result);
            }
            report.record(result);
        }

        if let Some(p) = progress {
            p.finish_fixing(report.fixed, report.manual, report.failed);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::common::ConfigBuilder;
    use crate::config::DetectConfig;
    use crate::core::{ImportEdge, ImportKind, Module};
    use crate::error::CycleBreakerError;
    use crate::fixer::StrategyKind;
    use crate::fs::testing::MemoryFileSystem;

    /// Reads `import { A, B } from './x';` and `import './x';` lines
    struct LineParser;

    impl Parser for LineParser {
        fn parse(&self, path: &str, content: &str) -> Result<Module, CycleBreakerError> {
            let mut imports = Vec::new();
            for (index, line) in content.lines().enumerate() {
                if !line.starts_with("import") {
                    continue;
                }
                let Some(specifier) = line.split('\'').nth(1) else {
                    return Err(CycleBreakerError::ParseError {
                        path: path.to_string(),
                        message: format!("line {}: missing specifier", index + 1),
                    });
                };
                let identifiers = line
                    .split_once('{')
                    .and_then(|(_, rest)| rest.split_once('}'))
                    .map(|(names, _)| {
                        names
                            .split(',')
                            .map(str::trim)
                            .filter(|name| !name.is_empty())
                            .map(str::to_string)
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();
                imports.push(
                    ImportEdge::new(specifier, None, index + 1, ImportKind::Static)
                        .with_identifiers(identifiers),
                );
            }
            Ok(Module::new(path, imports))
        }

        fn supports(&self, extension: &str) -> bool {
            matches!(extension, "ts" | "js")
        }
    }

    fn config(dry_run: bool) -> FixConfig {
        let detect = DetectConfig::builder()
            .with_root("/repo")
            .with_use_cache(false)
            .build()
            .unwrap();
        FixConfig::builder()
            .with_detect(detect)
            .with_dry_run(dry_run)
            .build()
            .unwrap()
    }

    fn type_cycle() -> MemoryFileSystem {
        MemoryFileSystem::with_files([
            ("/repo/src/a.ts", "import { User } from './b';\nexport class Account {}\n"),
            ("/repo/src/b.ts", "import { Account } from './a';\nexport class User {}\n"),
        ])
    }

    #[test]
    fn test_fixes_type_only_cycle() {
        let fs = type_cycle();
        let report = FixExecutor::new(&fs, &LineParser)
            .execute(&config(false), None, None)
            .unwrap();

        assert_eq!(report.analysis.cycles.len(), 1);
        assert_eq!(report.fixed, 1);
        assert_eq!(report.results[0].strategy, Some(StrategyKind::ImportType));
        assert_eq!(fs.write_count(), 1);
        assert_eq!(fs.backups().len(), 1);

        let touched: Vec<&str> = report.touched_files().collect();
        assert_eq!(touched.len(), 1);
        assert!(fs.contents(touched[0]).unwrap().starts_with("import type {"));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let fs = type_cycle();
        let report = FixExecutor::new(&fs, &LineParser)
            .execute(&config(true), None, None)
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.fixed, 1);
        assert_eq!(fs.write_count(), 0);
        assert!(fs.backups().is_empty());
        assert!(report.results[0].modified_files.is_empty());
        assert_eq!(report.results[0].planned_files.len(), 1);
    }

    #[test]
    fn test_value_cycle_falls_back_to_dynamic_import() {
        let fs = MemoryFileSystem::with_files([
            ("/repo/src/a.ts", "import { run } from './b';\n"),
            ("/repo/src/b.ts", "import { start } from './a';\n"),
        ]);
        let report = FixExecutor::new(&fs, &LineParser)
            .execute(&config(false), None, None)
            .unwrap();

        assert_eq!(report.results[0].strategy, Some(StrategyKind::DynamicImport));
        assert!(!report.results[0].manual_steps.is_empty());
    }

    #[test]
    fn test_no_cycles_gives_empty_report() {
        let fs = MemoryFileSystem::with_files([
            ("/repo/src/a.ts", "import { User } from './b';\n"),
            ("/repo/src/b.ts", "export class User {}\n"),
        ]);
        let report = FixExecutor::new(&fs, &LineParser)
            .execute(&config(false), None, None)
            .unwrap();

        assert!(report.results.is_empty());
        assert_eq!((report.fixed, report.manual, report.failed), (0, 0, 0));
        assert!(!report.cancelled);
    }

    #[test]
    fn test_allow_list_without_applicable_strategy() {
        let fs = type_cycle();
        let mut config = config(false);
        config.allowed_strategies = Some(vec![StrategyKind::ExtractShared]);

        let report = FixExecutor::new(&fs, &LineParser)
            .execute(&config, None, None)
            .unwrap();

        assert_eq!(report.manual, 1);
        assert_eq!(report.results[0].strategy, Some(StrategyKind::ExtractShared));
        assert_eq!(fs.write_count(), 0);
    }

    #[test]
    fn test_stop_after_limits_cycles() {
        let fs = MemoryFileSystem::with_files([
            ("/repo/src/a.ts", "import { B } from './b';\n"),
            ("/repo/src/b.ts", "import { A } from './a';\n"),
            ("/repo/src/c.ts", "import { D } from './d';\n"),
            ("/repo/src/d.ts", "import { C } from './c';\n"),
        ]);
        let mut config = config(true);
        config.stop_after = Some(1);

        let report = FixExecutor::new(&fs, &LineParser)
            .execute(&config, None, None)
            .unwrap();

        assert_eq!(report.analysis.cycles.len(), 2);
        assert_eq!(report.results.len(), 1);
    }

    #[test]
    fn test_cancel_flag_stops_before_next_cycle() {
        let fs = type_cycle();
        let cancel = AtomicBool::new(true);

        let report = FixExecutor::new(&fs, &LineParser)
            .execute(&config(false), Some(&cancel), None)
            .unwrap();

        assert!(report.cancelled);
        assert!(report.results.is_empty());
        assert_eq!(report.analysis.cycles.len(), 1);
        assert_eq!(fs.write_count(), 0);
    }

    #[test]
    fn test_custom_strategies_replace_defaults() {
        let fs = type_cycle();
        let report = FixExecutor::new(&fs, &LineParser)
            .with_strategies(Vec::new())
            .execute(&config(false), None, None)
            .unwrap();

        assert_eq!(report.manual, 1);
        assert_eq!(report.results[0].strategy, None);
    }
}
