//! Command-line argument parsing.
//!
//! This module defines the command-line interface of the `wylmo` binary
//! using the `clap` crate.

use clap::{Parser, ValueEnum};
use wylmo_core::probe::TestKind;

/// Test types selectable on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestType {
    /// Fixed pause between requests
    Hard,
    /// Growing pause between requests
    Inactivity,
}

impl From<TestType> for TestKind {
    fn from(test_type: TestType) -> Self {
        match test_type {
            TestType::Hard => TestKind::HardTimeout,
            TestType::Inactivity => TestKind::InactivityTimeout,
        }
    }
}

/// Command-line arguments for the wylmo CLI tool.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use wylmo_cli::cli_args::Args;
///
/// let args = Args::parse_from(["wylmo", "--test-type", "hard"]);
/// assert!(args.test_type.is_some());
/// ```
#[derive(Parser, Debug)] // requires `derive` feature
#[command(term_width = 0)] // Just to make testing across clap features easier
pub struct Args {
    /// Path to the settings file YAML.
    ///
    /// If not provided, defaults to `~/.wylmo/config.yml`.
    #[arg(long, short = 'c')]
    pub config_path: Option<String>,

    /// The test to perform. If not provided, it is chosen interactively.
    #[arg(long, short = 't', value_enum)]
    pub test_type: Option<TestType>,

    /// Directory under which the log directories are created.
    ///
    /// Overrides `log_root` from the settings file.
    #[arg(long, short = 'o')]
    pub log_root: Option<String>,

    /// Do not page through the output of the test request before starting.
    #[arg(long, short = 's', action)]
    pub skip_review: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_values() {
        let args = Args::parse_from(["wylmo"]);

        assert!(args.config_path.is_none());
        assert!(args.test_type.is_none());
        assert!(args.log_root.is_none());
        assert!(!args.skip_review);
    }

    #[test]
    fn test_args_short_flags() {
        let args = Args::parse_from([
            "wylmo",
            "-c",
            "/custom/config.yml",
            "-t",
            "inactivity",
            "-o",
            "/tmp/logs",
            "-s",
        ]);

        assert_eq!(args.config_path, Some("/custom/config.yml".to_string()));
        assert_eq!(args.test_type, Some(TestType::Inactivity));
        assert_eq!(args.log_root, Some("/tmp/logs".to_string()));
        assert!(args.skip_review);
    }

    #[test]
    fn test_args_long_flags() {
        let args = Args::parse_from([
            "wylmo",
            "--config-path",
            "/custom/config.yml",
            "--test-type",
            "hard",
            "--log-root",
            "/tmp/logs",
            "--skip-review",
        ]);

        assert_eq!(args.config_path, Some("/custom/config.yml".to_string()));
        assert_eq!(args.test_type, Some(TestType::Hard));
        assert_eq!(args.log_root, Some("/tmp/logs".to_string()));
        assert!(args.skip_review);
    }

    #[test]
    fn test_unknown_test_type_is_rejected() {
        let result = Args::try_parse_from(["wylmo", "--test-type", "soft"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_test_type_maps_to_kind() {
        assert_eq!(TestKind::from(TestType::Hard), TestKind::HardTimeout);
        assert_eq!(
            TestKind::from(TestType::Inactivity),
            TestKind::InactivityTimeout
        );
    }
}
