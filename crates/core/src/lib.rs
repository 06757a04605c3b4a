//! Wylmo Core Library
//!
//! This crate provides the non-interactive parts of wylmo, a tool that keeps
//! issuing the same curl request on a timer to find out when a server starts
//! timing it out.
//!
//! # Key Features
//!
//! - **Settings**: Optional YAML settings file with defaults for every field
//! - **Execution**: Run the curl command through a shell and capture its output
//! - **Response Checking**: Read the HTTP status line from the captured output
//! - **Probes**: Hard timeout and inactivity timeout schedules with per-attempt logs
//! - **Error Handling**: One error type for all failure modes
//!
//! # Examples
//!
//! Loading the settings:
//!
//! ```no_run
//! use wylmo_core::config::get_config_path;
//! use wylmo_core::file_handling::get_settings;
//!
//! let settings = get_settings(&get_config_path(&None))?;
//! println!("Logging to {}", settings.log_root);
//! # Ok::<(), wylmo_core::error::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod execution;
pub mod file_handling;
pub mod probe;
pub mod response;
