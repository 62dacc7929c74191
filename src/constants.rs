//! Configuration constants for cycle-breaker
//!
//! This module contains the defaults used throughout the library. Every value
//! can be overridden through the run configuration builders.

use std::time::Duration;

/// Progress bar configuration
pub mod progress {
    use super::*;

    /// Duration between progress bar updates
    pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

    /// Spinner frames shown while discovering files
    pub const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];
}

/// File discovery defaults
pub mod discovery {
    /// Source files considered for analysis
    pub const DEFAULT_INCLUDE: &[&str] = &[
        "**/*.ts", "**/*.tsx", "**/*.js", "**/*.jsx", "**/*.mjs", "**/*.cjs",
    ];

    /// Directories never worth walking into
    pub const DEFAULT_EXCLUDE: &[&str] = &[
        "**/node_modules/**",
        "**/dist/**",
        "**/build/**",
        "**/.git/**",
        "**/coverage/**",
    ];

    /// Extensions probed when resolving an extensionless relative specifier
    pub const RESOLVE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];

    /// Extensions treated as TypeScript-flavored
    pub const TYPESCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts"];
}

/// Analysis cache defaults
pub mod cache {
    /// Directory (relative to the analysis root) holding the cache file
    pub const DEFAULT_DIR: &str = ".cycle-breaker-cache";

    /// Name of the cache file inside the cache directory
    pub const FILE_NAME: &str = "analysis-cache.json";

    /// Bumped whenever the serialized layout changes; older states are dropped
    pub const FORMAT_VERSION: u32 = 1;
}

/// Cycle identity
pub mod cycle {
    /// Number of hex characters kept from the node-set digest
    pub const ID_LENGTH: usize = 8;
}

/// Fix orchestration messages
pub mod fix {
    /// Manual step used when no strategy can act on a cycle
    pub const MANUAL_REVIEW_STEP: &str =
        "Review the modules in this cycle and refactor manually to remove the circular import";

    /// Manual step used when every candidate strategy declined or failed
    pub const MANUAL_INTERVENTION_STEP: &str = "manual intervention required";

    /// Suffix appended to backup copies
    pub const BACKUP_SUFFIX: &str = "bak";
}
