//! Line-based prompts: single lines, text until end of input, and yes/no questions.

use std::io::{BufRead, Read, Write};

use wylmo_core::error::{Error, Result};

/// Which answer an empty reply to [`yes_no`] stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum YesNoDefault {
    /// An empty reply asks again
    None,
    No,
    Yes,
}

fn yes_no_question(question: &str, default: YesNoDefault) -> String {
    let (yes, no) = match default {
        YesNoDefault::None => ('y', 'n'),
        YesNoDefault::No => ('y', 'N'),
        YesNoDefault::Yes => ('Y', 'n'),
    };
    format!("{question} ({yes}/{no}) ")
}

/// Reads one line and trims it.
///
/// # Errors
///
/// Returns [`Error::InputClosed`] at end of input, or the read error.
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut input = String::new();
    if reader.read_line(&mut input).map_err(Error::Stdio)? == 0 {
        return Err(Error::InputClosed);
    }
    Ok(input.trim().to_string())
}

/// Reads everything up to end of input (Ctrl-D on a terminal) and trims it.
///
/// # Errors
///
/// Returns the read error.
pub fn read_until_eof<R: Read>(reader: &mut R) -> Result<String> {
    let mut input = String::new();
    reader.read_to_string(&mut input).map_err(Error::Stdio)?;
    Ok(input.trim().to_string())
}

/// Asks `question` until the answer is yes or no.
///
/// # Errors
///
/// Returns an error if writing the question fails or input ends.
pub fn yes_no<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    question: &str,
    default: YesNoDefault,
) -> Result<bool> {
    let question = yes_no_question(question, default);

    loop {
        write!(writer, "{question}").map_err(Error::Stdio)?;
        writer.flush().map_err(Error::Stdio)?;

        match read_line(reader)?.as_str() {
            "y" | "Y" => return Ok(true),
            "n" | "N" => return Ok(false),
            "" if default == YesNoDefault::Yes => return Ok(true),
            "" if default == YesNoDefault::No => return Ok(false),
            _ => {}
        }
    }
}
