//! Status-line parsing for raw HTTP responses as printed by `curl -i`.

use crate::error::{Error, Result};

/// Longest prefix of the output echoed back in a [`Error::MalformedResponse`].
const PREVIEW_LENGTH: usize = 60;

fn preview(line: &str) -> String {
    if line.is_empty() {
        return "<empty output>".to_string();
    }
    line.chars().take(PREVIEW_LENGTH).collect()
}

/// Extracts the status code from the first line of `output`.
///
/// The first line must look like `HTTP/<version> <code> [reason]`.
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] when the output does not start with a
/// status line.
///
/// # Examples
///
/// ```
/// use wylmo_core::response::parse_status_code;
///
/// let status = parse_status_code(b"HTTP/1.1 204 No Content\r\n\r\n").unwrap();
/// assert_eq!(status, 204);
/// ```
pub fn parse_status_code(output: &[u8]) -> Result<u16> {
    let text = String::from_utf8_lossy(output);
    let first_line = text.lines().next().unwrap_or_default().trim_end_matches('\r');

    let mut parts = first_line.split_whitespace();

    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/") {
        return Err(Error::MalformedResponse(preview(first_line)));
    }

    let code = parts.next().unwrap_or_default();
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::MalformedResponse(preview(first_line)));
    }

    code.parse::<u16>()
        .map_err(|_| Error::MalformedResponse(preview(first_line)))
}

#[must_use]
pub fn is_success(status: u16) -> bool {
    (200..=299).contains(&status)
}
