use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use console::{Term, style};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::constants::progress::{SPINNER_FRAMES, TICK_INTERVAL};
use crate::fixer::FixResult;
use crate::utils::string::{pluralize, truncate_middle};

// Progress bar style templates as constants
const PROGRESS_BAR_TEMPLATE: &str =
    "{msg} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {per_sec}";
const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const MAX_PATH_WIDTH: usize = 60;

/// Human progress output on stderr
///
/// Every method takes `&self` so a single reporter can be shared with the
/// parallel parsing stage.
pub struct ProgressReporter {
    term: Term,
    spinner_position: AtomicUsize,
    multi_progress: MultiProgress,
    current_bar: Mutex<Option<ProgressBar>>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
            spinner_position: AtomicUsize::new(0),
            multi_progress: MultiProgress::new(),
            current_bar: Mutex::new(None),
        }
    }

    /// A reporter when stderr is a terminal, `None` otherwise
    pub fn for_terminal() -> Option<Self> {
        Term::stderr().is_term().then(Self::new)
    }

    fn create_progress_bar(&self, len: u64, message: &str) -> ProgressBar {
        let pb = self.multi_progress.add(ProgressBar::new(len));
        pb.set_style(
            ProgressStyle::default_bar()
                .template(PROGRESS_BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏ "),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(TICK_INTERVAL);
        pb
    }

    fn create_spinner(&self, message: &str) -> ProgressBar {
        let pb = self.multi_progress.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template(SPINNER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["◐", "◓", "◑", "◒", "✓"]),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(TICK_INTERVAL);
        pb
    }

    fn next_frame(&self) -> &'static str {
        let pos = self.spinner_position.fetch_add(1, Ordering::Relaxed) % SPINNER_FRAMES.len();
        SPINNER_FRAMES[pos]
    }

    fn set_bar(&self, bar: Option<ProgressBar>) -> Option<ProgressBar> {
        let mut current = self
            .current_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, bar)
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let current = self
            .current_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(pb) = current.as_ref() {
            f(pb);
        }
    }

    pub fn start_discovery(&self, root: &Path) {
        let _ = self.term.clear_line();
        eprintln!(
            "{} Discovering source files in {}...",
            style("🔍").cyan(),
            style(root.display()).dim()
        );
        let spinner = self.create_spinner("Scanning source tree...");
        self.set_bar(Some(spinner));
    }

    pub fn finish_discovery(&self, count: usize) {
        if let Some(pb) = self.set_bar(None) {
            pb.finish_and_clear();
        }
        let _ = self.term.clear_line();
        if count == 0 {
            eprintln!("\r{} No source files found", style("✗").red());
        } else {
            eprintln!(
                "\r{} Discovery complete: found {} {}",
                style("✓").green(),
                style(count).yellow().bold(),
                pluralize("file", count)
            );
        }
    }

    pub fn start_parsing(&self, total: usize) {
        let pb = self.create_progress_bar(total as u64, "Parsing modules");
        self.set_bar(Some(pb));
    }

    pub fn file_parsed(&self, path: &str) {
        self.with_bar(|pb| {
            pb.set_message(format!("Parsing {}", truncate_middle(path, MAX_PATH_WIDTH)));
            pb.inc(1);
        });
    }

    pub fn finish_parsing(&self, parsed: usize, failures: usize) {
        if let Some(pb) = self.set_bar(None) {
            pb.finish_and_clear();
        }
        if failures == 0 {
            eprintln!(
                "{} Parsed {} {}",
                style("✓").green(),
                style(parsed).yellow().bold(),
                pluralize("module", parsed)
            );
        } else {
            eprintln!(
                "{} Parsed {} {}, {} could not be parsed",
                style("⚠").yellow(),
                style(parsed).yellow().bold(),
                pluralize("module", parsed),
                style(failures).red().bold()
            );
        }
    }

    pub fn assembling_module(&self, path: &str) {
        let _ = self.term.clear_line();
        eprint!(
            "\r{} Assembling graph: {}... ",
            style(self.next_frame()).cyan(),
            style(truncate_middle(path, MAX_PATH_WIDTH)).dim()
        );
    }

    pub fn start_cycle_detection(&self) {
        let _ = self.term.clear_line();
        eprintln!("\r{} Detecting import cycles...", style("🔄").yellow());
    }

    pub fn finish_cycle_detection(&self, cycles_found: usize) {
        if cycles_found == 0 {
            eprintln!("{} No cycles detected!", style("✓").green().bold());
        } else {
            eprintln!(
                "{} Found {} {}",
                style("⚠").yellow().bold(),
                style(cycles_found).red().bold(),
                pluralize("cycle", cycles_found)
            );
        }
    }

    pub fn start_fixing(&self, total: usize, dry_run: bool) {
        let label = if dry_run {
            "Planning fixes (dry run)"
        } else {
            "Fixing cycles"
        };
        let pb = self.create_progress_bar(total as u64, label);
        self.set_bar(Some(pb));
    }

    pub fn cycle_fixed(&self, result: &FixResult) {
        let strategy = result
            .strategy
            .map(|kind| kind.to_string())
            .unwrap_or_else(|| "none".to_string());
        let line = if result.success {
            format!("{} {} ({strategy})", style("✓").green(), result.cycle.id)
        } else if result.error.is_some() {
            format!("{} {} could not be fixed ({strategy})", style("✗").red(), result.cycle.id)
        } else {
            format!("{} {} needs manual work ({strategy})", style("✎").yellow(), result.cycle.id)
        };

        self.with_bar(|pb| {
            pb.println(&line);
            pb.inc(1);
        });
    }

    pub fn finish_fixing(&self, fixed: usize, manual: usize, failed: usize) {
        if let Some(pb) = self.set_bar(None) {
            pb.finish_and_clear();
        }
        eprintln!(
            "{} {} fixed, {} need manual work, {} failed",
            style("■").cyan(),
            style(fixed).green().bold(),
            style(manual).yellow().bold(),
            style(failed).red().bold()
        );
    }
}
