use std::error;
use std::fmt;
use std::fmt::Display;
use std::result;

use crate::span::{Position, Span};

/// (Spanned)[`Span`] syntax error
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    span: Span,
    position: Position,
    pub(crate) kind: ErrorKind,
}

impl Error {
    pub fn new(span: Span, position: Position, kind: ErrorKind) -> Error {
        Error {
            span,
            position,
            kind,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Line and column where the reader detected the error
    pub fn position(&self) -> Position {
        self.position
    }

    /// Returns true if more input could have completed the datum
    pub fn is_incomplete(&self) -> bool {
        matches!(self.kind, ErrorKind::Eof(_))
    }
}

impl error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind.message(), self.position)
    }
}

/// Syntax error without (span)[`Span`] information
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    Eof(ExpectedContent),
    UnsupportedDispatch,
    UnsupportedChar,
    UnsupportedStringEscape,
    ExpectedDelimiter(&'static str),
    ExpectedListEnd,
    UnexpectedChar(u8),
}

impl ErrorKind {
    /// Returns a string describing the error
    pub fn message(&self) -> String {
        match self {
            ErrorKind::Eof(ref ec) => {
                format!("unexpected end of input while reading {}", ec.description())
            }
            ErrorKind::UnsupportedDispatch => "expected `#t`, `#f` or `#\\`".to_owned(),
            ErrorKind::UnsupportedChar => "unsupported character name".to_owned(),
            ErrorKind::UnsupportedStringEscape => "unsupported string escape".to_owned(),
            ErrorKind::ExpectedDelimiter(what) => format!("{} not followed by delimiter", what),
            ErrorKind::ExpectedListEnd => "expected `)` after dotted tail".to_owned(),
            ErrorKind::UnexpectedChar(c) => {
                if c.is_ascii_graphic() {
                    format!("unexpected `{}`", *c as char)
                } else {
                    format!("unexpected byte 0x{:02x}", c)
                }
            }
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ExpectedContent {
    List(Span),
    String(Span),
    Character,
    Dispatch,
    QuoteEscape(Span),
    Datum,
}

impl ExpectedContent {
    pub fn description(&self) -> &'static str {
        match self {
            ExpectedContent::List(_) => "list",
            ExpectedContent::String(_) => "string literal",
            ExpectedContent::Character => "character literal",
            ExpectedContent::Dispatch => "dispatch",
            ExpectedContent::QuoteEscape(_) => "string escape",
            ExpectedContent::Datum => "datum",
        }
    }

    pub fn open_char_span(&self) -> Option<Span> {
        match self {
            ExpectedContent::List(span)
            | ExpectedContent::String(span)
            | ExpectedContent::QuoteEscape(span) => Some(*span),
            _ => None,
        }
    }

    /// Character that would close the construct being read
    pub fn close_char(&self) -> Option<char> {
        match self {
            ExpectedContent::List(_) => Some(')'),
            ExpectedContent::String(_) | ExpectedContent::QuoteEscape(_) => Some('"'),
            _ => None,
        }
    }
}
