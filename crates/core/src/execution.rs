use std::process::{Command, Stdio};

use log::{debug, info};

use crate::error::{Error, Result};

/// What a finished shell command left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with a success status
    pub success: bool,
    /// Exit code, absent when the process was killed by a signal
    pub code: Option<i32>,
    /// Captured stdout followed by captured stderr
    pub combined: Vec<u8>,
}

impl CommandOutput {
    /// The combined output as trimmed, lossily decoded text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.combined).trim().to_string()
    }
}

/// Runs `command_line` through `<shell> -c` and captures its output.
///
/// # Errors
///
/// Returns an error if the shell cannot be spawned. A non-zero exit is not an
/// error here; it is reported through [`CommandOutput::success`].
pub fn execute_captured(shell: &str, command_line: &str) -> Result<CommandOutput> {
    info!("Executing with {shell}: {command_line}");

    let output = Command::new(shell)
        .args(["-c", command_line])
        .stdin(Stdio::null())
        .output()
        .map_err(|e| Error::spawn_error(shell.to_string(), e))?;

    let mut combined = output.stdout;
    combined.extend_from_slice(&output.stderr);

    debug!(
        "Command finished with {:?}, {} bytes of output",
        output.status.code(),
        combined.len()
    );

    Ok(CommandOutput {
        success: output.status.success(),
        code: output.status.code(),
        combined,
    })
}

/// Pipes `content` into `pager`, which inherits the terminal.
///
/// # Errors
///
/// Returns an error if the pager cannot be spawned or waited on.
pub fn page_output(pager: &str, content: &[u8]) -> Result<()> {
    use std::io::Write;

    let mut child = Command::new(pager)
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| Error::spawn_error(pager.to_string(), e))?;

    if let Some(mut stdin) = child.stdin.take() {
        // The pager may quit before reading everything
        if let Err(e) = stdin.write_all(content) {
            debug!("Pager stopped reading early: {e}");
        }
    }

    child.wait()?;
    Ok(())
}
