//! Timeout probes.
//!
//! A probe repeatedly runs the confirmed curl command, keeps a log file of
//! every attempt and stops at the first response that is not a 2xx. The
//! [`TestKind`] decides how long to wait between two attempts.

use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use log::{debug, info, warn};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::execution::{execute_captured, CommandOutput};
use crate::file_handling::{ensure_log_directory, write_probe_log};
use crate::response::{is_success, parse_status_code};

/// The kinds of timeout test wylmo can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TestKind {
    /// Fixed pause between attempts, for limits on total connection age
    HardTimeout,
    /// Growing pause between attempts, for limits on idle time
    InactivityTimeout,
}

impl TestKind {
    pub const ALL: [TestKind; 2] = [TestKind::HardTimeout, TestKind::InactivityTimeout];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            TestKind::HardTimeout => "Hard timeout",
            TestKind::InactivityTimeout => "Inactivity timeout",
        }
    }

    /// Name of the directory (below the log root) holding this test's logs.
    #[must_use]
    pub fn log_directory_name(&self) -> &'static str {
        match self {
            TestKind::HardTimeout => "hard_timeout",
            TestKind::InactivityTimeout => "inactivity_timeout",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }
}

impl Display for TestKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts `input` as the probe command if it is a curl invocation.
///
/// # Errors
///
/// Returns [`Error::NotCurlCommand`] for anything not starting with `curl `.
pub fn validate_curl_command(input: &str) -> Result<&str> {
    let command_line = input.trim();
    if command_line.starts_with("curl ") {
        Ok(command_line)
    } else {
        Err(Error::NotCurlCommand(command_line.to_string()))
    }
}

/// Wait times between attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
    kind: TestKind,
    interval: Duration,
}

impl Schedule {
    #[must_use]
    pub fn new(kind: TestKind, interval: Duration) -> Self {
        Self { kind, interval }
    }

    #[must_use]
    pub fn for_kind(kind: TestKind, settings: &Settings) -> Self {
        let interval = match kind {
            TestKind::HardTimeout => settings.hard_timeout_interval(),
            TestKind::InactivityTimeout => settings.inactivity_step(),
        };
        Self::new(kind, interval)
    }

    /// How long to wait before the zero-based `attempt`.
    ///
    /// `None` means the attempt follows without a pause. An inactivity probe
    /// always announces its wait, even the zero wait before the first attempt.
    #[must_use]
    pub fn wait_before(&self, attempt: u32) -> Option<Duration> {
        match self.kind {
            TestKind::HardTimeout if attempt == 0 => None,
            TestKind::HardTimeout => Some(self.interval),
            TestKind::InactivityTimeout => Some(self.interval.saturating_mul(attempt)),
        }
    }
}

/// Side effects a probe needs: running the command, sleeping and the clock.
pub trait ProbeEnvironment {
    /// Runs the command line and captures its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the command could not be started.
    fn execute(&mut self, command_line: &str) -> Result<CommandOutput>;

    fn sleep(&mut self, duration: Duration);

    fn now(&self) -> DateTime<Local>;
}

/// Runs commands through the configured shell and sleeps for real.
pub struct SystemEnvironment {
    shell: String,
}

impl SystemEnvironment {
    #[must_use]
    pub fn new(shell: &str) -> Self {
        Self {
            shell: shell.to_string(),
        }
    }
}

impl ProbeEnvironment for SystemEnvironment {
    fn execute(&mut self, command_line: &str) -> Result<CommandOutput> {
        execute_captured(&self.shell, command_line)
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Progress notifications; every method defaults to doing nothing.
pub trait ProbeObserver {
    fn waiting(&mut self, _duration: Duration) {}

    fn attempt_started(&mut self, _attempt: u32, _time: &DateTime<Local>) {}

    fn attempt_succeeded(&mut self, _attempt: u32, _status: u16) {}
}

impl ProbeObserver for () {}

/// Why a probe stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The server answered with a status outside 200–299
    Status(u16),
    /// The output did not start with an HTTP status line
    NotHttp(String),
    /// The shell could not be started
    Spawn(String),
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Status(status) => write!(f, "HTTP status {status}"),
            FailureReason::NotHttp(message) | FailureReason::Spawn(message) => f.write_str(message),
        }
    }
}

/// Outcome of a finished probe.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub kind: TestKind,
    /// Number of attempts made, including the failing one
    pub attempts: u32,
    /// Time from the start of the probe until the failing attempt finished
    pub elapsed: Duration,
    /// Output of the failing attempt
    pub output: Vec<u8>,
    pub reason: FailureReason,
    pub log_directory: PathBuf,
}

fn check_attempt(
    result: Result<CommandOutput>,
) -> (Vec<u8>, std::result::Result<u16, FailureReason>) {
    match result {
        Err(e) => (Vec::new(), Err(FailureReason::Spawn(e.to_string()))),
        Ok(output) => {
            let status = match parse_status_code(&output.combined) {
                Ok(status) if is_success(status) => Ok(status),
                Ok(status) => Err(FailureReason::Status(status)),
                Err(e) => Err(FailureReason::NotHttp(e.to_string())),
            };
            (output.combined, status)
        }
    }
}

/// Runs `command_line` until the server stops answering with a 2xx.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created. Failing to write
/// a single log file is only logged.
pub fn run_probe<E: ProbeEnvironment, O: ProbeObserver>(
    kind: TestKind,
    command_line: &str,
    settings: &Settings,
    environment: &mut E,
    observer: &mut O,
) -> Result<ProbeReport> {
    let log_directory =
        ensure_log_directory(&settings.expanded_log_root(), kind.log_directory_name())?;
    debug!("Writing {kind} logs to `{}`", log_directory.display());

    let schedule = Schedule::for_kind(kind, settings);
    let start = environment.now();
    let mut attempt: u32 = 0;

    loop {
        if let Some(wait) = schedule.wait_before(attempt) {
            observer.waiting(wait);
            if !wait.is_zero() {
                environment.sleep(wait);
            }
        }

        let now = environment.now();
        observer.attempt_started(attempt, &now);

        let (output, status) = check_attempt(environment.execute(command_line));

        if let Err(e) = write_probe_log(&log_directory, &now, &output) {
            warn!("{e}");
        }

        match status {
            Ok(status) => {
                info!("Attempt {} answered with {status}", attempt + 1);
                observer.attempt_succeeded(attempt, status);
                attempt += 1;
            }
            Err(reason) => {
                info!("Attempt {} failed: {reason}", attempt + 1);
                let elapsed = (environment.now() - start).to_std().unwrap_or_default();
                return Ok(ProbeReport {
                    kind,
                    attempts: attempt + 1,
                    elapsed,
                    output,
                    reason,
                    log_directory,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for kind in TestKind::ALL {
            assert_eq!(TestKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(TestKind::from_label("Soft timeout"), None);
    }

    #[test]
    fn test_validate_curl_command() {
        assert_eq!(
            validate_curl_command("  curl -i https://example.com\n").unwrap(),
            "curl -i https://example.com"
        );
        assert!(matches!(
            validate_curl_command("wget https://example.com"),
            Err(Error::NotCurlCommand(_))
        ));
        assert!(validate_curl_command("curl").is_err());
    }

    #[test]
    fn test_hard_timeout_schedule() {
        let schedule = Schedule::new(TestKind::HardTimeout, Duration::from_secs(300));
        assert_eq!(schedule.wait_before(0), None);
        assert_eq!(schedule.wait_before(1), Some(Duration::from_secs(300)));
        assert_eq!(schedule.wait_before(7), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_inactivity_schedule_grows() {
        let schedule = Schedule::new(TestKind::InactivityTimeout, Duration::from_secs(900));
        assert_eq!(schedule.wait_before(0), Some(Duration::ZERO));
        assert_eq!(schedule.wait_before(1), Some(Duration::from_secs(900)));
        assert_eq!(schedule.wait_before(3), Some(Duration::from_secs(2700)));
    }

    #[test]
    fn test_failure_reason_display() {
        assert_eq!(FailureReason::Status(504).to_string(), "HTTP status 504");
        assert_eq!(FailureReason::Spawn("boom".to_string()).to_string(), "boom");
    }
}
