//! Terminal access for the selector.
//!
//! The selector only needs to switch raw mode, read bytes, write control
//! sequences and forward an interrupt. [`CrosstermTerminal`] does this on the
//! real terminal; [`ScriptedTerminal`] replays canned input and records
//! everything for tests.

use std::collections::VecDeque;
use std::io::{stdin, stdout, Read, Stdin, Stdout, Write};
use std::ops::{Deref, DerefMut};

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use log::{debug, warn};
use wylmo_core::error::{Error, Result};

/// Capabilities the selector needs from a terminal.
pub trait Terminal: Write {
    /// Switches input to unbuffered, unechoed mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TerminalMode`] if the mode cannot be changed.
    fn enable_raw_mode(&mut self) -> Result<()>;

    /// Restores the mode that was active before [`Terminal::enable_raw_mode`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TerminalMode`] if the mode cannot be changed.
    fn disable_raw_mode(&mut self) -> Result<()>;

    /// Blocks until at least one byte is available. Zero means end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    fn read_input(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Hands an interrupt (Ctrl-C) on to the host process.
    ///
    /// # Errors
    ///
    /// Returns an error if the signal cannot be raised.
    fn interrupt(&mut self) -> Result<()>;
}

/// Keeps raw mode on for as long as it lives.
///
/// Dropping the guard restores the terminal on a best-effort basis; use
/// [`RawModeGuard::restore`] to see whether restoring worked.
pub struct RawModeGuard<'a, T: Terminal> {
    terminal: &'a mut T,
    active: bool,
}

impl<'a, T: Terminal> RawModeGuard<'a, T> {
    /// Enables raw mode on `terminal`.
    ///
    /// # Errors
    ///
    /// Returns the error of the mode switch, after trying to undo it.
    pub fn enter(terminal: &'a mut T) -> Result<Self> {
        if let Err(e) = terminal.enable_raw_mode() {
            let _ = terminal.disable_raw_mode();
            return Err(e);
        }

        Ok(Self {
            terminal,
            active: true,
        })
    }

    /// Leaves raw mode and reports the outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal could not be restored.
    pub fn restore(mut self) -> Result<()> {
        self.active = false;
        self.terminal.disable_raw_mode()
    }
}

impl<T: Terminal> Deref for RawModeGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.terminal
    }
}

impl<T: Terminal> DerefMut for RawModeGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.terminal
    }
}

impl<T: Terminal> Drop for RawModeGuard<'_, T> {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = self.terminal.disable_raw_mode() {
                warn!("Could not restore terminal mode: {e}");
            }
        }
    }
}

/// The process's own terminal: stdin for keys, stdout for drawing.
pub struct CrosstermTerminal {
    stdin: Stdin,
    stdout: Stdout,
}

impl CrosstermTerminal {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdin: stdin(),
            stdout: stdout(),
        }
    }
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for CrosstermTerminal {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.stdout.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.stdout.flush()
    }
}

impl Terminal for CrosstermTerminal {
    fn enable_raw_mode(&mut self) -> Result<()> {
        enable_raw_mode().map_err(Error::TerminalMode)
    }

    fn disable_raw_mode(&mut self) -> Result<()> {
        disable_raw_mode().map_err(Error::TerminalMode)
    }

    fn read_input(&mut self, buffer: &mut [u8]) -> Result<usize> {
        self.stdin.lock().read(buffer).map_err(Error::Stdio)
    }

    #[cfg(unix)]
    fn interrupt(&mut self) -> Result<()> {
        use nix::sys::signal::{raise, Signal};

        debug!("Re-raising SIGINT");
        raise(Signal::SIGINT).map_err(|errno| Error::Io(errno.into()))
    }

    #[cfg(not(unix))]
    fn interrupt(&mut self) -> Result<()> {
        debug!("No signal to re-raise on this platform");
        Ok(())
    }
}

/// In-memory terminal replaying scripted input.
///
/// Every scripted chunk is returned by one read, split only when it is
/// longer than the buffer. A chunk may hold several keys, as typeahead or a
/// paste would, or part of one. Reading
/// past the script fails with [`Error::InputClosed`].
#[derive(Debug, Default)]
pub struct ScriptedTerminal {
    input: VecDeque<Vec<u8>>,
    output: Vec<u8>,
    raw_mode: bool,
    saved_mode: Option<bool>,
    mode_changes: Vec<bool>,
    interrupts: usize,
    fail_raw_mode: bool,
}

impl ScriptedTerminal {
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        Self {
            input: chunks.into_iter().map(|c| c.as_ref().to_vec()).collect(),
            ..Self::default()
        }
    }

    /// A terminal whose raw-mode switch always fails.
    #[must_use]
    pub fn failing_raw_mode() -> Self {
        Self {
            fail_raw_mode: true,
            ..Self::default()
        }
    }

    /// Starts the terminal in the given mode instead of cooked mode.
    #[must_use]
    pub fn with_raw_mode(mut self, raw_mode: bool) -> Self {
        self.raw_mode = raw_mode;
        self
    }

    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    #[must_use]
    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output).to_string()
    }

    #[must_use]
    pub fn is_raw_mode(&self) -> bool {
        self.raw_mode
    }

    /// Every mode the terminal was switched to, in order.
    #[must_use]
    pub fn mode_changes(&self) -> &[bool] {
        &self.mode_changes
    }

    #[must_use]
    pub fn interrupts(&self) -> usize {
        self.interrupts
    }

    #[must_use]
    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }
}

impl Write for ScriptedTerminal {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Terminal for ScriptedTerminal {
    fn enable_raw_mode(&mut self) -> Result<()> {
        if self.fail_raw_mode {
            return Err(Error::TerminalMode(std::io::Error::other(
                "scripted raw mode failure",
            )));
        }
        self.saved_mode = Some(self.raw_mode);
        self.raw_mode = true;
        self.mode_changes.push(true);
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> Result<()> {
        // Like crossterm, restoring without a saved mode does nothing
        if let Some(saved_mode) = self.saved_mode.take() {
            self.raw_mode = saved_mode;
            self.mode_changes.push(saved_mode);
        }
        Ok(())
    }

    fn read_input(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let Some(mut chunk) = self.input.pop_front() else {
            return Err(Error::InputClosed);
        };

        let count = chunk.len().min(buffer.len());
        buffer[..count].copy_from_slice(&chunk[..count]);

        if count < chunk.len() {
            self.input.push_front(chunk.split_off(count));
        }

        Ok(count)
    }

    fn interrupt(&mut self) -> Result<()> {
        self.interrupts += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_reads_one_chunk_per_read() {
        let mut terminal = ScriptedTerminal::new(["ab", "\x1b[B"]);
        let mut buffer = [0u8; 8];

        assert_eq!(terminal.read_input(&mut buffer).unwrap(), 2);
        assert_eq!(&buffer[..2], b"ab");
        assert_eq!(terminal.read_input(&mut buffer).unwrap(), 3);
        assert_eq!(&buffer[..3], b"\x1b[B");
        assert!(matches!(
            terminal.read_input(&mut buffer),
            Err(Error::InputClosed)
        ));
    }

    #[test]
    fn test_scripted_splits_chunks_longer_than_buffer() {
        let mut terminal = ScriptedTerminal::new(["abcde"]);
        let mut buffer = [0u8; 3];

        assert_eq!(terminal.read_input(&mut buffer).unwrap(), 3);
        assert_eq!(&buffer, b"abc");
        assert_eq!(terminal.read_input(&mut buffer).unwrap(), 2);
        assert_eq!(&buffer[..2], b"de");
        assert_eq!(terminal.remaining_input(), 0);
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let mut terminal = ScriptedTerminal::new(Vec::<&str>::new());
        {
            let guard = RawModeGuard::enter(&mut terminal).unwrap();
            assert!(guard.is_raw_mode());
        }
        assert!(!terminal.is_raw_mode());
        assert_eq!(terminal.mode_changes(), &[true, false]);
    }

    #[test]
    fn test_guard_restore_is_not_repeated_by_drop() {
        let mut terminal = ScriptedTerminal::new(Vec::<&str>::new());
        let guard = RawModeGuard::enter(&mut terminal).unwrap();
        guard.restore().unwrap();
        assert_eq!(terminal.mode_changes(), &[true, false]);
    }

    #[test]
    fn test_guard_restores_previous_raw_mode() {
        let mut terminal = ScriptedTerminal::new(Vec::<&str>::new()).with_raw_mode(true);
        let guard = RawModeGuard::enter(&mut terminal).unwrap();
        guard.restore().unwrap();
        assert!(terminal.is_raw_mode());
    }

    #[test]
    fn test_guard_enter_failure_leaves_mode_untouched() {
        let mut terminal = ScriptedTerminal::failing_raw_mode();
        assert!(matches!(
            RawModeGuard::enter(&mut terminal),
            Err(Error::TerminalMode(_))
        ));
        assert!(!terminal.is_raw_mode());
        assert!(terminal.mode_changes().is_empty());
    }
}
