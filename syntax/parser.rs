use crate::datum::Datum;
use crate::error::{Error, ErrorKind, ExpectedContent, Result};
use crate::span::{Position, Span};

/// Reads one datum at a time from an in-memory byte stream
///
/// The parser only ever looks one byte past its cursor except when deciding if a leading `-` or
/// `+` starts a number or a symbol.
pub struct Parser<'src> {
    input: &'src [u8],
    offset: usize,
    position: Position,
}

fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c')
}

/// Returns true if `c` terminates an atom
///
/// `None` represents the end of the input.
pub fn is_delimiter(c: Option<u8>) -> bool {
    match c {
        None => true,
        Some(c) => is_whitespace(c) || matches!(c, b'(' | b')' | b';' | b'"'),
    }
}

fn is_initial(c: u8) -> bool {
    c.is_ascii_alphabetic() || matches!(c, b'*' | b'/' | b'>' | b'<' | b'=' | b'?' | b'!')
}

fn is_subsequent(c: u8) -> bool {
    is_initial(c) || c.is_ascii_digit() || c == b'+' || c == b'-'
}

/// Returns true if the character can appear after the first character of a symbol
pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii() && is_subsequent(c as u8)
}

fn is_digit(c: Option<u8>) -> bool {
    matches!(c, Some(b'0'..=b'9'))
}

impl<'src> Parser<'src> {
    pub fn new(input: &'src [u8]) -> Self {
        Parser {
            input,
            offset: 0,
            position: Position::START,
        }
    }

    pub fn from_str(input: &'src str) -> Self {
        Self::new(input.as_bytes())
    }

    /// Line and column of the next unread byte
    pub fn position(&self) -> Position {
        self.position
    }

    /// Byte offset of the next unread byte
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.offset).copied()
    }

    fn peek_nth(&self, i: usize) -> Option<u8> {
        self.input.get(self.offset + i).copied()
    }

    fn consume(&mut self) -> Option<u8> {
        let c = self.peek()?;

        self.offset += 1;
        self.position = self.position.advance(c);
        Some(c)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.offset as u32)
    }

    fn capture_span<F, R>(&mut self, block: F) -> (Span, R)
    where
        F: FnOnce(&mut Parser<'src>) -> R,
    {
        let start = self.offset;
        let result = block(self);

        (self.span_from(start), result)
    }

    fn eof_err(&self, ec: ExpectedContent) -> Error {
        let eof_pos = self.offset as u32;
        Error::new(Span::new(eof_pos, eof_pos), self.position, ErrorKind::Eof(ec))
    }

    /// Consumes the next byte and reports it as the cause of an error
    fn err_at_next(&mut self, kind: ErrorKind) -> Error {
        let position = self.position;
        let (span, _) = self.capture_span(|s| s.consume());

        Error::new(span, position, kind)
    }

    /// Skips whitespace and comments, returning the next byte without consuming it
    fn skip_whitespace(&mut self) -> Option<u8> {
        loop {
            match self.peek()? {
                c if is_whitespace(c) => {
                    self.consume();
                }
                b';' => {
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.consume();
                    }
                }
                other => {
                    return Some(other);
                }
            }
        }
    }

    fn expect_delimiter(&mut self, what: &'static str) -> Result<()> {
        if is_delimiter(self.peek()) {
            Ok(())
        } else {
            Err(self.err_at_next(ErrorKind::ExpectedDelimiter(what)))
        }
    }

    fn parse_int(&mut self) -> Result<Datum> {
        let start = self.offset;

        let negative = self.peek() == Some(b'-');
        if negative {
            self.consume();
        }

        // Out of range literals wrap the same as runtime arithmetic
        let mut value: i32 = 0;
        while let Some(digit @ b'0'..=b'9') = self.peek() {
            self.consume();
            value = value
                .wrapping_mul(10)
                .wrapping_add(i32::from(digit - b'0'));
        }

        if negative {
            value = value.wrapping_neg();
        }

        self.expect_delimiter("integer")?;
        Ok(Datum::Int(self.span_from(start), value))
    }

    fn parse_dispatch(&mut self) -> Result<Datum> {
        let start = self.offset;
        let position = self.position;

        // Consume the #
        self.consume();

        match self.consume() {
            Some(b't') => {
                self.expect_delimiter("boolean")?;
                Ok(Datum::Bool(self.span_from(start), true))
            }
            Some(b'f') => {
                self.expect_delimiter("boolean")?;
                Ok(Datum::Bool(self.span_from(start), false))
            }
            Some(b'\\') => self.parse_char(start, position),
            Some(_) => Err(Error::new(
                self.span_from(start),
                position,
                ErrorKind::UnsupportedDispatch,
            )),
            None => Err(self.eof_err(ExpectedContent::Dispatch)),
        }
    }

    fn parse_char(&mut self, start: usize, position: Position) -> Result<Datum> {
        let first = self
            .consume()
            .ok_or_else(|| self.eof_err(ExpectedContent::Character))?;

        // Named characters are only attempted when the second byte matches the name
        let named: Option<(&'static [u8], u8)> = match (first, self.peek()) {
            (b's', Some(b'p')) => Some((&b"pace"[..], b' ')),
            (b'n', Some(b'e')) => Some((&b"ewline"[..], b'\n')),
            (b't', Some(b'a')) => Some((&b"ab"[..], b'\t')),
            _ => None,
        };

        let value = match named {
            Some((remaining_name, value)) => {
                for expected in remaining_name {
                    match self.consume() {
                        Some(actual) if actual == *expected => {}
                        Some(_) => {
                            return Err(Error::new(
                                self.span_from(start),
                                position,
                                ErrorKind::UnsupportedChar,
                            ));
                        }
                        None => return Err(self.eof_err(ExpectedContent::Character)),
                    }
                }

                value
            }
            None => first,
        };

        self.expect_delimiter("character")?;
        Ok(Datum::Char(self.span_from(start), value))
    }

    fn parse_quote_escape(&mut self, position: Position, open_quote_span: Span) -> Result<u8> {
        // The backslash has already been consumed
        let escape_start = self.offset - 1;

        match self.consume() {
            Some(b'n') => Ok(b'\n'),
            Some(b't') => Ok(b'\t'),
            Some(b'"') => Ok(b'"'),
            Some(b'\\') => Ok(b'\\'),
            Some(_) => Err(Error::new(
                self.span_from(escape_start),
                position,
                ErrorKind::UnsupportedStringEscape,
            )),
            None => Err(self.eof_err(ExpectedContent::QuoteEscape(open_quote_span))),
        }
    }

    fn parse_string(&mut self) -> Result<Datum> {
        let start = self.offset;
        let (open_quote_span, _) = self.capture_span(|s| s.consume());

        let mut contents = Vec::new();
        loop {
            let position = self.position;

            match self.consume() {
                Some(b'"') => break,
                Some(b'\\') => contents.push(self.parse_quote_escape(position, open_quote_span)?),
                Some(other) => contents.push(other),
                None => return Err(self.eof_err(ExpectedContent::String(open_quote_span))),
            }
        }

        self.expect_delimiter("string literal")?;
        Ok(Datum::Str(self.span_from(start), contents.into_boxed_slice()))
    }

    fn parse_list(&mut self) -> Result<Datum> {
        let start = self.offset;
        let (open_paren_span, _) = self.capture_span(|s| s.consume());
        let ec = ExpectedContent::List(open_paren_span);

        let mut content = Vec::new();

        // Keep eating datums until we hit the closing paren or a dotted tail
        loop {
            match self.skip_whitespace() {
                None => return Err(self.eof_err(ec)),
                Some(b')') => {
                    self.consume();
                    return Ok(Datum::List(
                        self.span_from(start),
                        content.into_boxed_slice(),
                    ));
                }
                Some(b'.') if !content.is_empty() => {
                    self.consume();
                    let tail = self.parse_datum(ec)?;

                    return match self.skip_whitespace() {
                        Some(b')') => {
                            self.consume();
                            Ok(Datum::DottedList(
                                self.span_from(start),
                                content.into_boxed_slice(),
                                Box::new(tail),
                            ))
                        }
                        Some(_) => Err(self.err_at_next(ErrorKind::ExpectedListEnd)),
                        None => Err(self.eof_err(ec)),
                    };
                }
                Some(next) => {
                    content.push(self.parse_datum_starting_with(next)?);
                }
            }
        }
    }

    fn parse_symbol(&mut self) -> Result<Datum> {
        let start = self.offset;

        // The caller has checked the first byte
        self.consume();
        while self.peek().map(is_subsequent) == Some(true) {
            self.consume();
        }

        self.expect_delimiter("symbol")?;

        let span = self.span_from(start);
        let name = String::from_utf8_lossy(&self.input[span.byte_range()]);
        Ok(Datum::Sym(span, name.as_ref().into()))
    }

    fn parse_symbol_shorthand(&mut self, expansion: &str) -> Result<Datum> {
        let start = self.offset;
        let (shorthand_span, _) = self.capture_span(|s| s.consume());

        let quoted_datum = self.parse_datum(ExpectedContent::Datum)?;

        Ok(Datum::List(
            self.span_from(start),
            Box::new([Datum::Sym(shorthand_span, expansion.into()), quoted_datum]),
        ))
    }

    fn parse_datum_starting_with(&mut self, c: u8) -> Result<Datum> {
        match c {
            b'0'..=b'9' => self.parse_int(),
            b'-' if is_digit(self.peek_nth(1)) => self.parse_int(),
            b'+' | b'-' if is_delimiter(self.peek_nth(1)) => self.parse_symbol(),
            b'#' => self.parse_dispatch(),
            b'"' => self.parse_string(),
            b'(' => self.parse_list(),
            b'\'' => self.parse_symbol_shorthand("quote"),
            b'`' => self.parse_symbol_shorthand("quasiquote"),
            b',' => self.parse_symbol_shorthand("unquote"),
            c if is_initial(c) => self.parse_symbol(),
            other => Err(self.err_at_next(ErrorKind::UnexpectedChar(other))),
        }
    }

    fn parse_datum(&mut self, ec: ExpectedContent) -> Result<Datum> {
        match self.skip_whitespace() {
            Some(c) => self.parse_datum_starting_with(c),
            None => Err(self.eof_err(ec)),
        }
    }

    /// Reads the next complete datum
    ///
    /// This returns `Ok(None)` if only whitespace and comments remain.
    pub fn read_datum(&mut self) -> Result<Option<Datum>> {
        match self.skip_whitespace() {
            Some(c) => self.parse_datum_starting_with(c).map(Some),
            None => Ok(None),
        }
    }

    fn parse_data(&mut self) -> Result<Vec<Datum>> {
        let mut datum_vec = Vec::new();

        while let Some(datum) = self.read_datum()? {
            datum_vec.push(datum);
        }

        Ok(datum_vec)
    }
}

/////////

pub fn datum_from_str(s: &str) -> Result<Datum> {
    let mut parser = Parser::from_str(s);
    parser.parse_datum(ExpectedContent::Datum)
}

pub fn data_from_str(s: &str) -> Result<Vec<Datum>> {
    data_from_bytes(s.as_bytes())
}

pub fn data_from_bytes(input: &[u8]) -> Result<Vec<Datum>> {
    let mut parser = Parser::new(input);
    parser.parse_data()
}
