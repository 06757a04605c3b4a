use super::types::InputEvent;

const CTRL_C: u8 = 0x03;
const BACKSPACE: u8 = 0x08;
const TAB: u8 = b'\t';
const LINE_FEED: u8 = b'\n';
const CARRIAGE_RETURN: u8 = b'\r';
const ESCAPE: u8 = 0x1b;
const DELETE: u8 = 0x7f;

/// Introduces a control sequence (`ESC [`)
const CSI: u8 = b'[';
/// Introduces a single-shift sequence (`ESC O`), sent by arrows in application mode
const SS3: u8 = b'O';

/// Splits raw terminal bytes into key events.
///
/// A single read may hold several keys (typeahead, auto-repeat, a paste) or
/// end in the middle of one. Complete keys are returned in order; an
/// unfinished escape sequence or UTF-8 character is kept and completed by
/// the next call to [`InputDecoder::decode`].
#[derive(Debug, Default)]
pub struct InputDecoder {
    pending: Vec<u8>,
}

/// Result of looking at the bytes at the start of the input.
enum Token {
    Event(InputEvent, usize),
    Char(char, usize),
    Incomplete,
}

impl InputDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes held back from the previous read.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Decodes `bytes`, prefixed by whatever the previous call held back.
    ///
    /// Consecutive printable characters are merged into one
    /// [`InputEvent::Text`]. Unrecognised sequences and stray control bytes
    /// are dropped rather than reported.
    pub fn decode(&mut self, bytes: &[u8]) -> Vec<InputEvent> {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(bytes);

        let mut events = Vec::new();
        let mut text = String::new();
        let mut rest = &input[..];

        while !rest.is_empty() {
            // An ESC ending a read that held other keys may start a split sequence
            let token = if rest == [ESCAPE] && rest.len() < input.len() {
                Token::Incomplete
            } else {
                next_token(rest)
            };
            let consumed = match token {
                Token::Char(c, length) => {
                    text.push(c);
                    length
                }
                Token::Event(event, length) => {
                    if !text.is_empty() {
                        events.push(InputEvent::Text(std::mem::take(&mut text)));
                    }
                    if event != InputEvent::Ignored {
                        events.push(event);
                    }
                    length
                }
                Token::Incomplete => {
                    self.pending = rest.to_vec();
                    break;
                }
            };
            rest = &rest[consumed..];
        }

        if !text.is_empty() {
            events.push(InputEvent::Text(text));
        }
        events
    }
}

fn next_token(bytes: &[u8]) -> Token {
    match bytes {
        [ESCAPE, rest @ ..] => escape_sequence(rest),
        [CARRIAGE_RETURN, LINE_FEED, ..] | [LINE_FEED, CARRIAGE_RETURN, ..] => {
            Token::Event(InputEvent::Confirm, 2)
        }
        [CARRIAGE_RETURN | LINE_FEED, ..] => Token::Event(InputEvent::Confirm, 1),
        [TAB, ..] => Token::Event(InputEvent::Down, 1),
        [CTRL_C, ..] => Token::Event(InputEvent::Interrupt, 1),
        [BACKSPACE | DELETE, ..] => Token::Event(InputEvent::Backspace, 1),
        [byte, ..] if byte.is_ascii_control() => Token::Event(InputEvent::Ignored, 1),
        _ => utf8_char(bytes),
    }
}

/// Decodes what follows an `ESC` byte. Lengths include the `ESC`.
fn escape_sequence(rest: &[u8]) -> Token {
    match rest {
        // A read holding only ESC is the Escape key itself
        [] => Token::Event(InputEvent::Escape, 1),
        [CSI, tail @ ..] => control_sequence(tail),
        [SS3] => Token::Incomplete,
        [SS3, b'A', ..] => Token::Event(InputEvent::Up, 3),
        [SS3, b'B', ..] => Token::Event(InputEvent::Down, 3),
        [SS3, _, ..] => Token::Event(InputEvent::Ignored, 3),
        // ESC followed by an unrelated key: the ESC stands on its own
        _ => Token::Event(InputEvent::Escape, 1),
    }
}

/// Decodes the bytes after `ESC [`: parameters, intermediates, one final byte.
fn control_sequence(tail: &[u8]) -> Token {
    let Some(end) = tail.iter().position(|byte| (0x40..=0x7e).contains(byte)) else {
        return if tail.iter().all(|byte| (0x20..=0x3f).contains(byte)) {
            Token::Incomplete
        } else {
            // Malformed; drop the introducer and decode the rest normally
            Token::Event(InputEvent::Ignored, 2)
        };
    };

    let event = match &tail[..=end] {
        b"A" => InputEvent::Up,
        b"B" => InputEvent::Down,
        b"Z" => InputEvent::Up,
        _ => InputEvent::Ignored,
    };
    Token::Event(event, end + 3)
}

fn utf8_char(bytes: &[u8]) -> Token {
    let width = match bytes[0] {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => return Token::Event(InputEvent::Ignored, 1),
    };

    if bytes.len() < width {
        // Only wait for the rest if what arrived so far can still be valid
        return match std::str::from_utf8(bytes) {
            Err(e) if e.error_len().is_none() => Token::Incomplete,
            _ => Token::Event(InputEvent::Ignored, 1),
        };
    }

    let decoded = std::str::from_utf8(&bytes[..width]).ok();
    match decoded.and_then(|s| s.chars().next()) {
        Some(c) if !c.is_control() => Token::Char(c, width),
        _ => Token::Event(InputEvent::Ignored, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Vec<InputEvent> {
        InputDecoder::new().decode(bytes)
    }

    fn text(value: &str) -> InputEvent {
        InputEvent::Text(value.to_string())
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(decode(b"\x1b[B"), vec![InputEvent::Down]);
        assert_eq!(decode(b"\t"), vec![InputEvent::Down]);
        assert_eq!(decode(b"\x1b[A"), vec![InputEvent::Up]);
        assert_eq!(decode(b"\x1b[Z"), vec![InputEvent::Up]);
        assert_eq!(decode(b"\x1bOB"), vec![InputEvent::Down]);
        assert_eq!(decode(b"\x1bOA"), vec![InputEvent::Up]);
    }

    #[test]
    fn test_confirm_keys() {
        for bytes in [&b"\r"[..], b"\n", b"\r\n", b"\n\r"] {
            assert_eq!(decode(bytes), vec![InputEvent::Confirm]);
        }
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(decode(b"\x1b"), vec![InputEvent::Escape]);
        assert_eq!(decode(b"\x03"), vec![InputEvent::Interrupt]);
        assert_eq!(decode(b"\x08"), vec![InputEvent::Backspace]);
        assert_eq!(decode(b"\x7f"), vec![InputEvent::Backspace]);
    }

    #[test]
    fn test_printable_text_is_merged() {
        assert_eq!(decode(b"a"), vec![text("a")]);
        assert_eq!(decode(b"ab "), vec![text("ab ")]);
        assert_eq!(decode("é".as_bytes()), vec![text("é")]);
    }

    #[test]
    fn test_several_keys_in_one_read() {
        assert_eq!(
            decode(b"\x1b[B\x1b[B\x1b[B"),
            vec![InputEvent::Down, InputEvent::Down, InputEvent::Down]
        );
        assert_eq!(decode(b"ap\r"), vec![text("ap"), InputEvent::Confirm]);
        assert_eq!(
            decode(b"a\x7fb\x1b[Ac"),
            vec![
                text("a"),
                InputEvent::Backspace,
                text("b"),
                InputEvent::Up,
                text("c"),
            ]
        );
    }

    #[test]
    fn test_unknown_sequences_are_dropped() {
        assert_eq!(decode(b"\x1b[C"), Vec::<InputEvent>::new());
        assert_eq!(decode(b"\x1b[1;5D"), Vec::<InputEvent>::new());
        assert_eq!(decode(b"\x01"), Vec::<InputEvent>::new());
        assert_eq!(decode(b""), Vec::<InputEvent>::new());
        assert_eq!(decode(b"x\x1b[Dy"), vec![text("x"), text("y")]);
    }

    #[test]
    fn test_escape_before_other_key_stands_alone() {
        assert_eq!(decode(b"\x1bq"), vec![InputEvent::Escape, text("q")]);
    }

    #[test]
    fn test_split_escape_sequence_is_completed_by_next_read() {
        let mut decoder = InputDecoder::new();

        assert_eq!(decoder.decode(b"\x1b[B\x1b["), vec![InputEvent::Down]);
        assert_eq!(decoder.pending(), b"\x1b[");
        assert_eq!(decoder.decode(b"B\r"), vec![InputEvent::Down, InputEvent::Confirm]);
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn test_trailing_escape_waits_for_next_read() {
        let mut decoder = InputDecoder::new();

        assert_eq!(decoder.decode(b"\x1b[B\x1b"), vec![InputEvent::Down]);
        assert_eq!(decoder.pending(), b"\x1b");
        assert_eq!(decoder.decode(b"[A"), vec![InputEvent::Up]);

        assert_eq!(decoder.decode(b"a\x1b"), vec![text("a")]);
        assert_eq!(decoder.decode(b"b"), vec![InputEvent::Escape, text("b")]);
    }

    #[test]
    fn test_split_character_is_completed_by_next_read() {
        let bytes = "né".as_bytes();
        let mut decoder = InputDecoder::new();

        assert_eq!(decoder.decode(&bytes[..2]), vec![text("n")]);
        assert_eq!(decoder.pending(), &bytes[1..2]);
        assert_eq!(decoder.decode(&bytes[2..]), vec![text("é")]);
    }

    #[test]
    fn test_invalid_bytes_are_dropped() {
        assert_eq!(decode(b"\xffa"), vec![text("a")]);
        // A lead byte followed by something that cannot continue it
        assert_eq!(decode(b"\xc3a"), vec![text("a")]);
    }
}
