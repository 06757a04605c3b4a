//! Wylmo CLI Library
//!
//! This crate provides the command-line interface for wylmo, a tool that
//! keeps issuing the same curl request on a timer to find out when a server
//! times it out. It handles user interaction: choosing the kind of test,
//! entering and reviewing the curl command, and reporting progress.
//!
//! # Architecture
//!
//! - [`cli_args`]: Command-line argument parsing
//! - [`selection`]: Interactive single-choice selector with filtering
//! - [`prompts`]: Line, multi-line and yes/no prompts
//! - [`display`]: Human-readable durations and times
//!
//! # Examples
//!
//! ```bash
//! # Interactive mode - choose the test type from a list
//! wylmo
//!
//! # Skip the chooser
//! wylmo --test-type inactivity
//!
//! # Write logs somewhere else and skip reviewing the test output
//! wylmo -t hard -o /tmp/probes -s
//! ```

pub mod cli_args;
pub mod display;
pub mod prompts;
pub mod selection;
