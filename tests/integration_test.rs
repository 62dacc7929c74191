//! Integration tests for cycle-breaker using the library interface

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use cycle_breaker::common::ConfigBuilder;
use cycle_breaker::config::{DetectConfig, FixConfig, PolicyFile};
use cycle_breaker::core::{ImportEdge, ImportKind, Module};
use cycle_breaker::error::CycleBreakerError;
use cycle_breaker::executors::{DetectExecutor, FixExecutor};
use cycle_breaker::fixer::StrategyKind;
use cycle_breaker::fs::LocalFileSystem;
use cycle_breaker::parser::Parser;
use cycle_breaker::policy::{PolicyRule, Severity};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Understands one statement per line: `import '<specifier>'`
///
/// A file containing `@@syntax-error` fails to parse.
#[derive(Default)]
struct LineParser {
    calls: AtomicUsize,
}

impl LineParser {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Parser for LineParser {
    fn parse(&self, path: &str, content: &str) -> Result<Module, CycleBreakerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if content.contains("@@syntax-error") {
            return Err(CycleBreakerError::ParseError {
                path: path.to_string(),
                message: "unexpected token".to_string(),
            });
        }

        let imports = content
            .lines()
            .enumerate()
            .filter_map(|(index, line)| {
                let specifier = line.strip_prefix("import ")?.trim().trim_matches('\'');
                Some(ImportEdge::new(specifier, None, index + 1, ImportKind::Static))
            })
            .collect();
        Ok(Module::new(path, imports))
    }

    fn supports(&self, extension: &str) -> bool {
        matches!(extension, "ts" | "js")
    }
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn detect_config(root: &Path) -> DetectConfig {
    DetectConfig::builder()
        .with_root(root)
        .build()
        .unwrap()
}

fn fix_config(root: &Path, dry_run: bool) -> FixConfig {
    FixConfig::builder()
        .with_detect(detect_config(root))
        .with_dry_run(dry_run)
        .build()
        .unwrap()
}

fn file_name(path: &str) -> &str {
    Path::new(path).file_name().unwrap().to_str().unwrap()
}

#[test]
fn test_detects_two_module_cycle() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/a.ts", "import './b'\n");
    write(temp.path(), "src/b.ts", "import './a'\n");

    let result = DetectExecutor::new(&LocalFileSystem, &LineParser::default())
        .execute(&detect_config(temp.path()), None)
        .unwrap();

    assert_eq!(result.total_modules, 2);
    assert_eq!(result.cycles.len(), 1);
    assert_eq!(result.affected_modules, 2);
    assert!(!result.is_partial);

    let cycle = &result.cycles[0];
    assert_eq!(cycle.id.len(), 8);
    assert_eq!(cycle.paths.len(), 3);
    assert_eq!(cycle.paths.first(), cycle.paths.last());
    assert_eq!(cycle.edges.len(), 2);
    assert_eq!(file_name(&cycle.paths[0]), "a.ts");
}

#[test]
fn test_cycle_id_is_stable_across_runs() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/a.ts", "import './b'\n");
    write(temp.path(), "src/b.ts", "import './c'\n");
    write(temp.path(), "src/c.ts", "import './a'\n");

    let parser = LineParser::default();
    let executor = DetectExecutor::new(&LocalFileSystem, &parser);
    let first = executor.execute(&detect_config(temp.path()), None).unwrap();
    let second = executor.execute(&detect_config(temp.path()), None).unwrap();

    assert_eq!(first.cycles.len(), 1);
    assert_eq!(first.cycles[0].id, second.cycles[0].id);
    assert_eq!(first.cycles[0].paths, second.cycles[0].paths);
}

#[test]
fn test_acyclic_tree_has_no_cycles() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/a.ts", "import './b'\nimport 'react'\n");
    write(temp.path(), "src/b.ts", "import './c'\n");
    write(temp.path(), "src/c.ts", "");
    write(temp.path(), "README.md", "import './src/a'\n");

    let result = DetectExecutor::new(&LocalFileSystem, &LineParser::default())
        .execute(&detect_config(temp.path()), None)
        .unwrap();

    assert_eq!(result.total_modules, 3);
    assert!(!result.has_cycles());
    assert_eq!(result.affected_modules, 0);
    assert_eq!(result.metrics.edges, 2);
}

#[test]
fn test_self_import_is_a_cycle() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/a.ts", "import './a'\n");

    let result = DetectExecutor::new(&LocalFileSystem, &LineParser::default())
        .execute(&detect_config(temp.path()), None)
        .unwrap();

    assert_eq!(result.cycles.len(), 1);
    let cycle = &result.cycles[0];
    assert_eq!(cycle.paths.len(), 2);
    assert_eq!(cycle.paths[0], cycle.paths[1]);
    assert!(cycle.is_self_loop());
}

#[test]
fn test_disjoint_cycles_are_reported_separately() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/a.ts", "import './b'\n");
    write(temp.path(), "src/b.ts", "import './a'\n");
    write(temp.path(), "lib/c.ts", "import './d'\n");
    write(temp.path(), "lib/d.ts", "import './c'\n");

    let result = DetectExecutor::new(&LocalFileSystem, &LineParser::default())
        .execute(&detect_config(temp.path()), None)
        .unwrap();

    assert_eq!(result.cycles.len(), 2);
    assert_eq!(result.affected_modules, 4);
    assert_ne!(result.cycles[0].id, result.cycles[1].id);
}

#[test]
fn test_unparsable_file_gives_partial_result() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/a.ts", "import './b'\n");
    write(temp.path(), "src/b.ts", "import './a'\n");
    write(temp.path(), "src/broken.ts", "@@syntax-error\n");

    let result = DetectExecutor::new(&LocalFileSystem, &LineParser::default())
        .execute(&detect_config(temp.path()), None)
        .unwrap();

    assert!(result.is_partial);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("broken.ts"));
    assert_eq!(result.metrics.parse_failures, 1);
    assert_eq!(result.total_modules, 2);
    assert_eq!(result.cycles.len(), 1);
}

#[test]
fn test_cache_skips_unchanged_files() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/a.ts", "import './b'\n");
    write(temp.path(), "src/b.ts", "import './a'\n");
    let config = detect_config(temp.path());

    let parser = LineParser::default();
    let executor = DetectExecutor::new(&LocalFileSystem, &parser);

    let cold = executor.execute(&config, None).unwrap();
    assert_eq!(parser.calls(), 2);
    assert_eq!(cold.metrics.cache_hits, 0);
    assert_eq!(cold.metrics.files_parsed, 2);
    assert!(config.cache_file().exists());

    let warm = executor.execute(&config, None).unwrap();
    assert_eq!(parser.calls(), 2);
    assert_eq!(warm.metrics.cache_hits, 2);
    assert_eq!(warm.metrics.files_parsed, 0);
    assert_eq!(warm.total_modules, 2);
    assert_eq!(warm.cycles, cold.cycles);

    // Changing one file only reparses that file
    write(temp.path(), "src/b.ts", "export const b = 1;\n");
    let changed = executor.execute(&config, None).unwrap();
    assert_eq!(parser.calls(), 3);
    assert_eq!(changed.metrics.cache_hits, 1);
    assert_eq!(changed.metrics.files_parsed, 1);
    assert!(!changed.has_cycles());
}

#[test]
fn test_corrupt_cache_gives_cold_run() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/a.ts", "import './b'\n");
    write(temp.path(), "src/b.ts", "import './a'\n");
    let config = detect_config(temp.path());

    fs::create_dir_all(&config.cache_dir).unwrap();
    fs::write(config.cache_file(), "{ this is not json").unwrap();

    let parser = LineParser::default();
    let result = DetectExecutor::new(&LocalFileSystem, &parser)
        .execute(&config, None)
        .unwrap();

    assert_eq!(parser.calls(), 2);
    assert_eq!(result.metrics.cache_hits, 0);
    assert_eq!(result.cycles.len(), 1);

    let rewritten = fs::read_to_string(config.cache_file()).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&rewritten).is_ok());
}

#[test]
fn test_disabled_cache_writes_nothing() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/a.ts", "import './b'\n");
    write(temp.path(), "src/b.ts", "\n");
    let config = DetectConfig::builder()
        .with_root(temp.path())
        .with_use_cache(false)
        .build()
        .unwrap();

    DetectExecutor::new(&LocalFileSystem, &LineParser::default())
        .execute(&config, None)
        .unwrap();

    assert!(!config.cache_dir.exists());
}

#[test]
fn test_boundary_rules_flag_cycle_edges() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/domain/order.ts", "import '../infra/db'\n");
    write(temp.path(), "src/infra/db.ts", "import '../domain/order'\n");

    let config = DetectConfig::builder()
        .with_root(temp.path())
        .with_rules(vec![
            PolicyRule::new("domain-is-pure", "src/domain/**", "src/infra/**", Severity::Error)
                .with_recommended_strategies(vec![StrategyKind::DynamicImport]),
            PolicyRule::new("ui-leaf", "src/ui/**", "src/**", Severity::Warn),
        ])
        .build()
        .unwrap();

    let result = DetectExecutor::new(&LocalFileSystem, &LineParser::default())
        .execute(&config, None)
        .unwrap();

    assert_eq!(result.cycles.len(), 1);
    assert_eq!(result.violations.len(), 1);
    let violation = &result.violations[0];
    assert_eq!(violation.rule, "domain-is-pure");
    assert_eq!(violation.severity, Severity::Error);
    assert_eq!(violation.from, "src/domain/order.ts");
    assert_eq!(violation.to, "src/infra/db.ts");
    assert_eq!(violation.cycle_id.as_deref(), Some(result.cycles[0].id.as_str()));
}

#[test]
fn test_rules_loaded_from_policy_file() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "policy.toml",
        "[[rules]]\nname = \"no-cycles-into-shared\"\nfrom = \"**\"\nto = \"shared/*.ts\"\n",
    );
    write(temp.path(), "shared/util.ts", "import '../app'\n");
    write(temp.path(), "app.ts", "import './shared/util'\n");

    let policy = PolicyFile::parse_file(&temp.path().join("policy.toml")).unwrap();
    let config = DetectConfig::builder()
        .with_root(temp.path())
        .with_rules(policy.rules)
        .build()
        .unwrap();

    let result = DetectExecutor::new(&LocalFileSystem, &LineParser::default())
        .execute(&config, None)
        .unwrap();

    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].from, "app.ts");
    assert_eq!(result.violations[0].severity, Severity::Warn);
}

#[test]
fn test_invalid_rule_pattern_is_rejected_at_configuration() {
    let result = DetectConfig::builder()
        .with_root("/repo")
        .with_rules(vec![PolicyRule::new(
            "broken",
            "src/***",
            "lib/**",
            Severity::Error,
        )])
        .build();

    assert!(matches!(result, Err(CycleBreakerError::InvalidPattern { .. })));
}

#[test]
fn test_invalid_rule_fails_before_any_parsing() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/a.ts", "import './b'\n");
    write(temp.path(), "src/b.ts", "import './a'\n");

    let mut config = detect_config(temp.path());
    config
        .rules
        .push(PolicyRule::new("broken", "src/***", "lib/**", Severity::Error));

    let parser = LineParser::default();
    let result = DetectExecutor::new(&LocalFileSystem, &parser).execute(&config, None);

    assert!(result.is_err());
    assert_eq!(parser.calls(), 0);
    assert!(!config.cache_file().exists());
}

#[test]
fn test_fix_dry_run_leaves_files_untouched() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/a.ts", "import './b'\n");
    write(temp.path(), "src/b.ts", "import './a'\n");

    let report = FixExecutor::new(&LocalFileSystem, &LineParser::default())
        .execute(&fix_config(temp.path(), true), None, None)
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.results.len(), 1);
    let result = &report.results[0];
    assert_eq!(result.strategy, Some(StrategyKind::DynamicImport));
    assert!(result.modified_files.is_empty());
    assert!(result.created_files.is_empty());
    assert_eq!(result.planned_files.len(), 1);

    assert_eq!(fs::read_to_string(temp.path().join("src/a.ts")).unwrap(), "import './b'\n");
    assert_eq!(fs::read_to_string(temp.path().join("src/b.ts")).unwrap(), "import './a'\n");
    assert!(!temp.path().join("src/a.ts.bak").exists());
    assert!(!temp.path().join("src/b.ts.bak").exists());
}

#[test]
fn test_fix_breaks_cycle_on_disk() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/a.ts", "import './b'\n");
    write(temp.path(), "src/b.ts", "import './a'\n");

    let parser = LineParser::default();
    let report = FixExecutor::new(&LocalFileSystem, &parser)
        .execute(&fix_config(temp.path(), false), None, None)
        .unwrap();

    assert_eq!(report.fixed, 1);
    let result = &report.results[0];
    assert!(result.success);
    assert_eq!(result.modified_files.len(), 1);
    assert!(!result.manual_steps.is_empty());

    let modified = &result.modified_files[0];
    let contents = fs::read_to_string(modified).unwrap();
    assert!(contents.starts_with("// import "));
    assert!(contents.contains("return import('"));
    assert!(Path::new(&format!("{modified}.bak")).exists());

    let after = DetectExecutor::new(&LocalFileSystem, &parser)
        .execute(&detect_config(temp.path()), None)
        .unwrap();
    assert!(!after.has_cycles());
}

#[test]
fn test_fix_without_backups() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/a.ts", "import './a'\n");

    let config = FixConfig::builder()
        .with_detect(detect_config(temp.path()))
        .with_backup(false)
        .build()
        .unwrap();
    let report = FixExecutor::new(&LocalFileSystem, &LineParser::default())
        .execute(&config, None, None)
        .unwrap();

    assert_eq!(report.fixed, 1);
    assert!(!temp.path().join("src/a.ts.bak").exists());
}

#[test]
fn test_fix_stops_when_cancelled() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/a.ts", "import './b'\n");
    write(temp.path(), "src/b.ts", "import './a'\n");
    let cancel = AtomicBool::new(true);

    let report = FixExecutor::new(&LocalFileSystem, &LineParser::default())
        .execute(&fix_config(temp.path(), false), Some(&cancel), None)
        .unwrap();

    assert!(report.cancelled);
    assert!(report.results.is_empty());
    assert_eq!(report.analysis.cycles.len(), 1);
    assert_eq!(fs::read_to_string(temp.path().join("src/a.ts")).unwrap(), "import './b'\n");
}

#[test]
fn test_fix_report_serializes_camel_case() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/a.ts", "import './b'\n");
    write(temp.path(), "src/b.ts", "import './a'\n");

    let report = FixExecutor::new(&LocalFileSystem, &LineParser::default())
        .execute(&fix_config(temp.path(), true), None, None)
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["dryRun"], serde_json::json!(true));
    assert_eq!(json["results"][0]["strategy"], serde_json::json!("dynamic-import"));
    assert!(json["analysis"]["cycles"][0]["id"].is_string());
    assert!(json["results"][0]["plannedFiles"].is_array());
}
