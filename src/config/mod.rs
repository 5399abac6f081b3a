//! Configuration types
//!
//! CLI arguments are parsed in [`cli`] and converted into the typed
//! configuration structs here, one per execution mode.

pub mod cli;

use std::path::PathBuf;
use std::time::Duration;

/// Naming pattern a file must match to be queued as a work item
///
/// A name matches when it contains `contains` and ends with `suffix`.
/// Either part may be empty, in which case it constrains nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPattern {
    pub contains: String,
    pub suffix: String,
}

impl ScanPattern {
    pub fn new(contains: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            contains: contains.into(),
            suffix: suffix.into(),
        }
    }

    /// Whether a file name matches this pattern
    pub fn matches(&self, name: &str) -> bool {
        name.contains(&self.contains) && name.ends_with(&self.suffix)
    }
}

/// Dispatcher-mode configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Directory scanned once at startup
    pub tests_dir: PathBuf,

    /// Filter applied to file names during the scan
    pub pattern: ScanPattern,

    /// Address advertised to workers; machine hostname when `None`
    pub host: Option<String>,

    /// Listen port
    pub port: u16,

    /// Where the discovery record is written
    pub discovery_file: PathBuf,
}

/// Worker-mode configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Where the discovery record is read from
    pub discovery_file: PathBuf,

    /// Sleep between requests while the queue is empty
    pub wait_interval: Duration,
}

impl DispatcherConfig {
    /// Build from parsed CLI arguments
    pub fn from_cli(cli: &cli::Cli) -> Self {
        Self {
            tests_dir: cli.tests_dir.clone(),
            pattern: ScanPattern::new(cli.name_contains.clone(), cli.name_suffix.clone()),
            host: cli.host.clone(),
            port: cli.port,
            discovery_file: cli.discovery_file.clone(),
        }
    }
}

impl WorkerConfig {
    /// Build from parsed CLI arguments
    pub fn from_cli(cli: &cli::Cli) -> Self {
        Self {
            discovery_file: cli.discovery_file.clone(),
            wait_interval: Duration::from_secs(cli.wait_interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_matches() {
        let pattern = ScanPattern::new("Run", ".py");
        assert!(pattern.matches("Run_1_-5_1_1_5.py"));
        assert!(pattern.matches("sweepRun.py"));
        assert!(!pattern.matches("Run_1.sh"));
        assert!(!pattern.matches("Template.py"));
        assert!(!pattern.matches("run_1.py"));
    }

    #[test]
    fn test_empty_parts_constrain_nothing() {
        let any = ScanPattern::new("", "");
        assert!(any.matches("anything-at-all"));

        let suffix_only = ScanPattern::new("", ".py");
        assert!(suffix_only.matches("Template.py"));
        assert!(!suffix_only.matches("Template.pyc"));
    }
}
