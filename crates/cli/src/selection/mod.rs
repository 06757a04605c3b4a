//! Interactive single-choice selection.
//!
//! This module provides the terminal selector wylmo uses to ask for the kind
//! of test to run. It draws a short list of options below the cursor and
//! narrows it as the user types.
//!
//! # Key Features
//!
//! - **Incremental Filtering**: Case-insensitive substring search over the options
//! - **Scrolling Viewport**: Only a fixed number of rows is drawn at once
//! - **Wrapping Navigation**: Arrow keys and Tab/Shift-Tab cycle through matches
//! - **Raw Mode Guard**: The terminal mode is restored on every exit path
//!
//! # User Interface
//!
//! The interface supports:
//! - Up/Down arrows or Shift-Tab/Tab to move
//! - Typing to filter, Backspace to undo
//! - Enter to confirm, Escape to cancel
//! - Ctrl-C to cancel and interrupt the program

pub mod input;
pub mod terminal;
pub mod types;
pub mod ui;

// Re-exports for convenience
pub use terminal::{CrosstermTerminal, ScriptedTerminal, Terminal};
pub use types::{Choice, InputEvent, SelectorState, Termination};
pub use ui::{choose_one, choose_one_with};
