//! Detect use case executor

use std::path::{Path, PathBuf};
use std::time::Instant;

use miette::{IntoDiagnostic, Result, WrapErr};
use rayon::prelude::*;

use crate::analysis::{AnalysisMetrics, AnalysisResult};
use crate::cache::{AnalysisCache, FileCacheStore, hash_content};
use crate::config::DetectConfig;
use crate::constants::cache::FILE_NAME;
use crate::core::Module;
use crate::detector::CycleDetector;
use crate::fs::{FileSystem, normalize};
use crate::graph::{ModuleGraph, ModuleGraphBuilder};
use crate::parser::Parser;
use crate::policy::PolicyEnforcer;
use crate::progress::ProgressReporter;

/// Analysis output together with the graph it was computed on
pub struct Analysis {
    pub result: AnalysisResult,
    pub graph: ModuleGraph,
    pub root: PathBuf,
}

/// A source file read from disk
struct SourceFile {
    path: String,
    content: String,
    hash: String,
}

/// Outcome of parsing one file
enum Parsed {
    Module(Module),
    Failed(String),
}

/// Runs discovery, parsing, graph assembly, cycle detection and policy
/// evaluation over a source tree
pub struct DetectExecutor<'a> {
    fs: &'a dyn FileSystem,
    parser: &'a dyn Parser,
}

impl<'a> DetectExecutor<'a> {
    pub fn new(fs: &'a dyn FileSystem, parser: &'a dyn Parser) -> Self {
        Self { fs, parser }
    }

    pub fn execute(
        &self,
        config: &DetectConfig,
        progress: Option<&ProgressReporter>,
    ) -> Result<AnalysisResult> {
        Ok(self.analyze(config, progress)?.result)
    }

    /// Like [`execute`](Self::execute), keeping the module graph for callers
    /// that act on the cycles
    pub fn analyze(
        &self,
        config: &DetectConfig,
        progress: Option<&ProgressReporter>,
    ) -> Result<Analysis> {
        let started = Instant::now();
        let root = normalize(
            &std::path::absolute(&config.root)
                .into_diagnostic()
                .wrap_err("Failed to resolve the analysis root")?,
        );
        let enforcer = PolicyEnforcer::new(&root, config.rules.clone())
            .wrap_err("Failed to compile boundary rules")?;
        let mut metrics = AnalysisMetrics::default();
        let mut warnings = Vec::new();

        // Discover source files
        if let Some(p) = progress {
            p.start_discovery(&root);
        }
        let files = self.discover(&root, config)?;
        metrics.files_discovered = files.len();
        if let Some(p) = progress {
            p.finish_discovery(files.len());
        }

        // Read and hash in parallel, each worker owning its outcome
        let read: Vec<(String, std::result::Result<SourceFile, String>)> = files
            .par_iter()
            .map(|path| {
                let key = path.to_string_lossy().to_string();
                let outcome = self
                    .fs
                    .read_file(path)
                    .map(|content| SourceFile {
                        hash: hash_content(&content),
                        path: key.clone(),
                        content,
                    })
                    .map_err(|e| e.to_string());
                (key, outcome)
            })
            .collect();

        let mut cache = config.use_cache.then(|| {
            AnalysisCache::open(Box::new(FileCacheStore::in_dir(&config.cache_dir, FILE_NAME)))
        });

        let mut modules = Vec::with_capacity(read.len());
        let mut to_parse = Vec::new();
        for (path, outcome) in read {
            match outcome {
                Ok(file) => match cache.as_mut().and_then(|c| c.lookup(&file.path, &file.hash)) {
                    Some(module) => modules.push(module),
                    None => to_parse.push(file),
                },
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "failed to read source file");
                    warnings.push(format!("Failed to read {path}: {e}"));
                    metrics.parse_failures += 1;
                }
            }
        }

        // Parse cache misses in parallel, then merge sequentially
        if let Some(p) = progress {
            p.start_parsing(to_parse.len());
        }
        let parsed: Vec<(SourceFile, Parsed)> = to_parse
            .into_par_iter()
            .map(|file| {
                let outcome = match self.parser.parse(&file.path, &file.content) {
                    Ok(mut module) => {
                        module.path = file.path.clone();
                        Parsed::Module(module)
                    }
                    Err(e) => Parsed::Failed(e.to_string()),
                };
                if let Some(p) = progress {
                    p.file_parsed(&file.path);
                }
                (file, outcome)
            })
            .collect();

        for (file, outcome) in parsed {
            match outcome {
                Parsed::Module(module) => {
                    metrics.files_parsed += 1;
                    if let Some(c) = cache.as_mut() {
                        c.insert(&file.path, &file.hash, module.clone());
                    }
                    modules.push(module);
                }
                Parsed::Failed(e) => {
                    tracing::warn!(path = %file.path, error = %e, "failed to parse source file");
                    warnings.push(format!("Failed to parse {}: {e}", file.path));
                    metrics.parse_failures += 1;
                }
            }
        }
        if let Some(p) = progress {
            p.finish_parsing(metrics.files_parsed, metrics.parse_failures);
        }

        // Resolve specifiers the parser left open, then assemble the graph
        let modules: Vec<Module> = modules
            .into_par_iter()
            .map(|module| self.resolve_imports(module))
            .collect();
        let graph = ModuleGraphBuilder::new().with_modules(modules).build(progress);
        metrics.edges = graph.edge_count();

        // Detect cycles
        if let Some(p) = progress {
            p.start_cycle_detection();
        }
        let detection_started = Instant::now();
        let mut detector = CycleDetector::new();
        detector.detect_cycles(&graph, config.max_depth);
        metrics.detection_ms = detection_started.elapsed().as_millis();
        if let Some(p) = progress {
            p.finish_cycle_detection(detector.cycle_count());
        }

        if let Some(mut cache) = cache {
            cache.retain_paths(graph.paths());
            let stats = cache.stats();
            metrics.cache_hits = stats.hits;
            metrics.cache_misses = stats.misses;
            tracing::debug!(
                entries = stats.entries,
                hits = stats.hits,
                misses = stats.misses,
                "analysis cache statistics"
            );
            if let Err(e) = cache.save() {
                tracing::warn!(error = %e, "failed to save analysis cache");
            }
        }

        let affected_modules = detector.affected_modules();
        let cycles = detector.into_cycles();
        let violations = enforcer.evaluate_cycles(&cycles);
        let result = AnalysisResult {
            total_modules: graph.len(),
            affected_modules,
            duration: started.elapsed(),
            is_partial: metrics.parse_failures > 0,
            warnings,
            metrics,
            violations,
            cycles,
        };

        tracing::debug!(
            modules = result.total_modules,
            cycles = result.cycles.len(),
            violations = result.violations.len(),
            elapsed_ms = result.duration.as_millis() as u64,
            "analysis finished"
        );

        Ok(Analysis {
            result,
            graph,
            root,
        })
    }

    /// Files matching the configured globs that the parser supports
    fn discover(&self, root: &Path, config: &DetectConfig) -> Result<Vec<PathBuf>> {
        let files = self
            .fs
            .glob(root, &config.include, &config.exclude)
            .wrap_err_with(|| format!("Failed to discover source files in {}", root.display()))?;

        Ok(files
            .into_iter()
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| self.parser.supports(ext))
            })
            .map(|path| normalize(&path))
            .collect())
    }

    fn resolve_imports(&self, mut module: Module) -> Module {
        let from = PathBuf::from(&module.path);
        for edge in module
            .imports
            .iter_mut()
            .filter(|edge| edge.resolved_path.is_none())
        {
            edge.resolved_path = self
                .fs
                .resolve_module(&from, &edge.source)
                .map(|path| normalize(&path).to_string_lossy().to_string());
        }
        module
    }
}
