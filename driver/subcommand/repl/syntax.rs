use skein_syntax::error::{Error, ErrorKind, ExpectedContent};
use skein_syntax::span::Span;

/// Maximum line length we'll provide parser hints and error highlighting for
///
/// This requires parsing the whole input on every keystroke as we don't support incremental
/// reparsing. Past this length the input is most likely pasted rather than typed.
pub const MAXIMUM_PARSED_LINE_LEN: usize = 512;

pub fn error_for_line(line: &str) -> Option<Error> {
    use skein_syntax::parser::data_from_str;

    // Is this a command?
    if line.trim_start().starts_with('/') ||
    // Or empty?
    line.chars().all(char::is_whitespace) ||
    // Or is too large to parse interactively?
    line.len() > MAXIMUM_PARSED_LINE_LEN
    {
        return None;
    }

    data_from_str(line).err()
}

/// Returns the construct left open at the end of the input, if any
pub fn expected_content_for_eol(line: &str) -> Option<ExpectedContent> {
    error_for_line(line).and_then(|error| {
        if let ErrorKind::Eof(expected_content) = error.kind() {
            Some(*expected_content)
        } else {
            None
        }
    })
}

/// Returns the part of the line to mark as erroneous
///
/// Unterminated input marks its opening delimiter; the missing close is hinted at the end of the
/// line instead.
pub fn error_span_for_line(line: &str) -> Option<Span> {
    let error = error_for_line(line)?;

    match error.kind() {
        ErrorKind::Eof(expected_content) => expected_content.open_char_span(),
        _ => Some(error.span()),
    }
}
