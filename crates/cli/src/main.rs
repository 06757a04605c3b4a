use std::io::{stdin, stdout, Write};
use std::process::ExitCode;
use std::time::Duration;

use chrono::{DateTime, Local};
use clap::Parser;
use crossterm::execute;
use crossterm::style::{style, Color, ResetColor, SetForegroundColor, Stylize};
use log::{debug, info, warn};
use wylmo_cli::cli_args::Args;
use wylmo_cli::display::{format_duration, format_time};
use wylmo_cli::prompts::{read_line, read_until_eof, yes_no, YesNoDefault};
use wylmo_cli::selection::choose_one;
use wylmo_core::config::{get_config_path, Settings};
use wylmo_core::error::{Error, Result};
use wylmo_core::execution::{execute_captured, page_output};
use wylmo_core::file_handling::get_settings;
use wylmo_core::probe::{
    run_probe, validate_curl_command, ProbeObserver, SystemEnvironment, TestKind,
};

const TEST_TYPE_PROMPT: &str = "Please choose the type of test to perform";

/// Prints progress of a running probe to stdout.
struct ConsoleObserver;

impl ProbeObserver for ConsoleObserver {
    fn waiting(&mut self, duration: Duration) {
        println!(
            "Waiting for {}",
            style(format!("'{}'", format_duration(duration))).blue()
        );
    }

    fn attempt_started(&mut self, _attempt: u32, time: &DateTime<Local>) {
        println!("It is now {}", style(format!("'{}'", format_time(time))).blue());
    }
}

fn print_error(message: &str) {
    println!("{}", style(message).red());
}

/// Load settings and apply command-line overrides
fn initialize_settings(args: &Args) -> Result<Settings> {
    let config_path = get_config_path(&args.config_path);
    debug!("Config path: `{config_path}`");

    let mut settings = get_settings(&config_path)?;
    if let Some(log_root) = &args.log_root {
        settings.log_root.clone_from(log_root);
    }

    Ok(settings)
}

/// Take the test type from the arguments, or let the user choose one
fn determine_test_kind(args: &Args, settings: &Settings) -> Result<Option<TestKind>> {
    if let Some(test_type) = args.test_type {
        return Ok(Some(test_type.into()));
    }

    let labels: Vec<String> = TestKind::ALL
        .iter()
        .map(|kind| kind.label().to_string())
        .collect();

    let choice = choose_one(TEST_TYPE_PROMPT, &labels, settings.viewport_height)?;

    Ok(choice
        .confirmed_value()
        .and_then(|label| TestKind::from_label(&label)))
}

fn read_curl_command() -> Result<String> {
    println!("Please enter the curl command and accept with Ctrl-D.");

    let mut stdout = stdout();
    execute!(stdout, SetForegroundColor(Color::Blue))?;
    let input = read_until_eof(&mut stdin().lock());
    execute!(stdout, ResetColor)?;

    let input = input?;
    if input.is_empty() {
        return Err(Error::InputClosed);
    }
    Ok(input)
}

/// Run the command once and let the user judge its output.
///
/// Returns `None` when the command should be asked for again.
fn try_curl_command(input: &str, args: &Args, settings: &Settings) -> Result<Option<String>> {
    let command_line = match validate_curl_command(input) {
        Ok(command_line) => command_line.to_string(),
        Err(e) => {
            print_error(&e.to_string());
            return Ok(None);
        }
    };

    println!("Testing curl command...");

    let output = match execute_captured(&settings.shell, &command_line) {
        Ok(output) => output,
        Err(e) => {
            print_error("Curl command failed");
            print_error(&e.to_string());
            return Ok(None);
        }
    };

    if !output.success {
        print_error("Curl command failed");
        print_error(&match output.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        });
        let text = output.text();
        if !text.is_empty() {
            print_error(&text);
        }
        return Ok(None);
    }

    println!("Curl command was successful.");

    if args.skip_review {
        info!("Skipping review of the test output");
    } else {
        print!("Please hit enter to review the curl command's output before continuing");
        stdout().flush()?;
        read_line(&mut stdin().lock())?;

        if let Err(e) = page_output(&settings.pager, &output.combined) {
            warn!("{e}");
            println!("{}", output.text());
        }
    }

    let is_ok = yes_no(
        &mut stdin().lock(),
        &mut stdout(),
        "Is the curl command's output ok?",
        YesNoDefault::Yes,
    )?;

    Ok(is_ok.then_some(command_line))
}

/// Ask for a curl command until one works and the user accepts its output
fn request_curl_command(args: &Args, settings: &Settings) -> Result<String> {
    loop {
        let input = read_curl_command()?;
        if let Some(command_line) = try_curl_command(&input, args, settings)? {
            return Ok(command_line);
        }
    }
}

fn perform_test(kind: TestKind, command_line: &str, settings: &Settings) -> Result<()> {
    println!("Performing {} test...", style(format!("'{kind}'")).blue());

    let mut environment = SystemEnvironment::new(&settings.shell);
    let report = run_probe(
        kind,
        command_line,
        settings,
        &mut environment,
        &mut ConsoleObserver,
    )?;

    let output = String::from_utf8_lossy(&report.output);
    if !output.trim().is_empty() {
        print_error(output.trim());
    }
    print_error(&format!(
        "Stopped after {} attempt(s): {}",
        report.attempts, report.reason
    ));
    print_error(&format!("Time elapsed: {}", format_duration(report.elapsed)));
    println!("Logs were written to `{}`", report.log_directory.display());

    Ok(())
}

fn execute() -> Result<()> {
    let args = Args::parse();
    let settings = initialize_settings(&args)?;

    println!("Welcome to wylmo!");

    let Some(kind) = determine_test_kind(&args, &settings)? else {
        info!("No test type was chosen, exiting.");
        return Ok(());
    };
    println!("Thank you for choosing {}", style(format!("'{kind}'")).blue());

    let command_line = request_curl_command(&args, &settings)?;

    perform_test(kind, &command_line, &settings)
}

fn main() -> ExitCode {
    env_logger::init();

    match execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
