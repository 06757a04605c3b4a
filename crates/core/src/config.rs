//! Configuration for wylmo.
//!
//! This module resolves the settings file path and defines the [`Settings`]
//! read from it. Every field has a default, so a missing file or a partial
//! file is fine.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default path for the settings file
const DEFAULT_CONFIG_PATH: &str = "~/.wylmo/config.yml";

/// Default shell used to run the curl command
pub const DEFAULT_SHELL: &str = "bash";

/// Default pager used to review the output of the test request
pub const DEFAULT_PAGER: &str = "more";

/// Number of option rows the selector shows at once
pub const DEFAULT_VIEWPORT_HEIGHT: usize = 5;

const DEFAULT_HARD_TIMEOUT_INTERVAL_SECS: u64 = 5 * 60;
const DEFAULT_INACTIVITY_STEP_SECS: u64 = 15 * 60;
const DEFAULT_LOG_ROOT: &str = ".";

/// Resolves the settings file path.
///
/// If a custom path is provided, uses that path. Otherwise, uses the default
/// settings path. Shell expansions like `~` are resolved.
///
/// # Examples
///
/// ```
/// use wylmo_core::config::get_config_path;
///
/// let custom_path = get_config_path(&Some("/path/to/config.yml".to_string()));
/// assert_eq!(custom_path, "/path/to/config.yml");
/// ```
pub fn get_config_path(config_path_arg: &Option<String>) -> String {
    let config_path = match config_path_arg {
        Some(config_path) => config_path,
        None => DEFAULT_CONFIG_PATH,
    };

    shellexpand::tilde(config_path).to_string()
}

/// Settings controlling how probes are run and displayed.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Shell invoked as `<shell> -c <curl command>`
    pub shell: String,
    /// Program the test output is piped into for review
    pub pager: String,
    /// Pause between two attempts of the hard timeout test
    pub hard_timeout_interval_secs: u64,
    /// Amount the wait grows by after each inactivity timeout attempt
    pub inactivity_step_secs: u64,
    /// Directory under which the per-test log directories are created
    pub log_root: String,
    /// Number of option rows the selector shows at once
    pub viewport_height: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
            pager: DEFAULT_PAGER.to_string(),
            hard_timeout_interval_secs: DEFAULT_HARD_TIMEOUT_INTERVAL_SECS,
            inactivity_step_secs: DEFAULT_INACTIVITY_STEP_SECS,
            log_root: DEFAULT_LOG_ROOT.to_string(),
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl Settings {
    /// Checks the values that would make the selector or the schedule meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSetting`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.shell.trim().is_empty() {
            return Err(Error::invalid_setting("shell", "may not be empty"));
        }

        if self.viewport_height == 0 {
            return Err(Error::invalid_setting("viewport_height", "must be at least 1"));
        }

        if self.hard_timeout_interval_secs == 0 {
            return Err(Error::invalid_setting(
                "hard_timeout_interval_secs",
                "must be greater than zero",
            ));
        }

        if self.inactivity_step_secs == 0 {
            return Err(Error::invalid_setting(
                "inactivity_step_secs",
                "must be greater than zero",
            ));
        }

        Ok(())
    }

    #[must_use]
    pub fn hard_timeout_interval(&self) -> Duration {
        Duration::from_secs(self.hard_timeout_interval_secs)
    }

    #[must_use]
    pub fn inactivity_step(&self) -> Duration {
        Duration::from_secs(self.inactivity_step_secs)
    }

    /// The log root with `~` expanded.
    #[must_use]
    pub fn expanded_log_root(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.log_root).to_string())
    }
}
