use std::io::Write;

use crossterm::style::{Attribute, Color, Print, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, queue};
use log::debug;
use wylmo_core::error::{Error, Result};

use super::input::InputDecoder;
use super::terminal::{CrosstermTerminal, RawModeGuard, Terminal};
use super::types::{Choice, InputEvent, SelectorState};

/// Bytes taken per read; keys split across reads are joined by the decoder
const READ_BUFFER_SIZE: usize = 64;

const BELL: &[u8] = b"\x07";

/// Draws the selector block at the cursor and returns the number of lines drawn.
///
/// The block is the prompt, the visible options, the `n/m` status line and
/// the search input. The cursor is left at the end of the search input.
fn draw<W: Write>(out: &mut W, prompt: &str, state: &SelectorState) -> Result<usize> {
    queue!(out, Print(prompt), Print("\r\n"))?;

    let visible = state.visible_range();
    let rows = visible.len();

    for position in visible {
        let option = state.filtered_option(position).unwrap_or_default();
        if position == state.selected_index() {
            queue!(
                out,
                SetForegroundColor(Color::Yellow),
                SetAttribute(Attribute::Bold),
                Print(format!("▌ {option}")),
                SetAttribute(Attribute::Reset),
                Print("\r\n")
            )?;
        } else {
            queue!(out, Print(format!("  {option}\r\n")))?;
        }
    }

    queue!(
        out,
        SetForegroundColor(Color::Blue),
        Print(format!("  {}/{}", state.position(), state.filtered().len())),
        SetAttribute(Attribute::Reset),
        Print("\r\n"),
        SetForegroundColor(Color::Blue),
        SetAttribute(Attribute::Bold),
        Print(">"),
        SetAttribute(Attribute::Reset),
        Print(format!(" {}", state.search_text()))
    )?;

    out.flush()?;
    Ok(rows + 3)
}

/// Erases `lines` lines ending at the cursor line, leaving the cursor at
/// column 0 of the topmost erased line.
fn erase<W: Write>(out: &mut W, lines: usize) -> Result<()> {
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    for _ in 1..lines {
        queue!(out, cursor::MoveUp(1), Clear(ClearType::CurrentLine))?;
    }
    out.flush()?;
    Ok(())
}

/// Lets the user pick one of `options` on the real terminal.
///
/// See [`choose_one_with`].
///
/// # Errors
///
/// Returns an error if the terminal cannot be switched to raw mode or input
/// cannot be read.
pub fn choose_one(prompt: &str, options: &[String], viewport_height: usize) -> Result<Choice> {
    let mut terminal = CrosstermTerminal::new();
    choose_one_with(&mut terminal, prompt, options, viewport_height)
}

/// Lets the user pick one of `options`, narrowing the list by typing.
///
/// Raw mode is on for the duration of the call and is restored on every
/// exit path. On Ctrl-C the terminal is restored first and the interrupt is
/// then handed to the host process through [`Terminal::interrupt`]; the call
/// itself returns as cancelled.
///
/// # Errors
///
/// Returns [`Error::NoOptions`] for an empty list, and an error if the
/// terminal mode cannot be switched or input cannot be read (including end
/// of input).
pub fn choose_one_with<T: Terminal>(
    terminal: &mut T,
    prompt: &str,
    options: &[String],
    viewport_height: usize,
) -> Result<Choice> {
    if options.is_empty() {
        return Err(Error::NoOptions);
    }

    let mut guard = RawModeGuard::enter(terminal)?;
    let mut state = SelectorState::new(options, viewport_height);
    let mut interrupted = false;
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    let mut decoder = InputDecoder::new();

    let mut drawn_lines = draw(&mut *guard, prompt, &state)?;

    while !state.is_finished() {
        let read = guard.read_input(&mut buffer)?;
        if read == 0 {
            return Err(Error::InputClosed);
        }

        let events = decoder.decode(&buffer[..read]);
        debug!("Selector input {:?} -> {events:?}", &buffer[..read]);

        let mut changed = false;
        for event in events {
            match event {
                InputEvent::Confirm if state.filtered().is_empty() => {
                    guard.write_all(BELL)?;
                    guard.flush()?;
                    continue;
                }
                InputEvent::Interrupt => interrupted = true,
                _ => {}
            }

            state = state.apply_event(&event);
            changed = true;
            if state.is_finished() {
                break;
            }
        }

        if !changed {
            continue;
        }

        erase(&mut *guard, drawn_lines)?;
        if state.is_finished() {
            drawn_lines = 0;
        } else {
            drawn_lines = draw(&mut *guard, prompt, &state)?;
        }
    }

    debug!("Selector finished with {:?}", state.termination());
    guard.restore()?;

    if interrupted {
        terminal.interrupt()?;
    }

    Ok(state.choice())
}
