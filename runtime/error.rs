use std::error;
use std::fmt;
use std::io;
use std::result;

use skein_syntax::error::Error as SyntaxError;

/// Fatal runtime error
///
/// Errors are never caught inside the evaluator; the first one unwinds the whole evaluation.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

#[derive(Debug)]
pub enum ErrorKind {
    /// Syntax error while reading source text
    Syntax {
        /// Name of the source the text came from
        origin: String,
        /// The full source text, retained for diagnostics
        source: String,
        error: SyntaxError,
    },
    Unbound(String),
    NotApplicable(&'static str),
    CannotDefine(&'static str),
    BadParameters(&'static str),
    UnresolvedForwardRef(String),
    MalformedSpecialForm(&'static str),
    ImproperApplication,
    MalformedEnvironment,
    WrongArity {
        name: &'static str,
        expected: Arity,
        have: usize,
    },
    WrongType {
        name: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    IndexOutOfBounds {
        name: &'static str,
        index: i32,
        len: usize,
    },
    DivideByZero(&'static str),
    Io {
        path: String,
        error: io::Error,
    },
    User(String),
}

/// Number of arguments a native procedure accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    Between(usize, usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(expected) => count == expected,
            Arity::Between(min, max) => count >= min && count <= max,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(expected) => write!(f, "{}", expected),
            Arity::Between(min, max) => write!(f, "{} to {}", min, max),
        }
    }
}

impl Error {
    pub fn new(kind: ErrorKind) -> Error {
        Error { kind }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error::new(kind)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Syntax { origin, error, .. } => write!(f, "{}: {}", origin, error),
            ErrorKind::Unbound(name) => write!(f, "unbound symbol `{}`", name),
            ErrorKind::NotApplicable(found) => write!(f, "cannot apply {}", found),
            ErrorKind::CannotDefine(found) => write!(f, "cannot define {}", found),
            ErrorKind::BadParameters(found) => {
                write!(f, "invalid lambda parameters: unexpected {}", found)
            }
            ErrorKind::UnresolvedForwardRef(name) => {
                write!(f, "`{}` used before its definition completed", name)
            }
            ErrorKind::MalformedSpecialForm(form) => write!(f, "malformed `{}` form", form),
            ErrorKind::ImproperApplication => write!(f, "application with improper operand list"),
            ErrorKind::MalformedEnvironment => write!(f, "value is not an environment"),
            ErrorKind::WrongArity {
                name,
                expected,
                have,
            } => write!(
                f,
                "`{}` expects {} arguments, received {}",
                name, expected, have
            ),
            ErrorKind::WrongType {
                name,
                expected,
                found,
            } => write!(f, "`{}` expected {}, found {}", name, expected, found),
            ErrorKind::IndexOutOfBounds { name, index, len } => write!(
                f,
                "`{}` index {} out of bounds for length {}",
                name, index, len
            ),
            ErrorKind::DivideByZero(name) => write!(f, "`{}` division by zero", name),
            ErrorKind::Io { path, error } => write!(f, "{}: {}", path, error),
            ErrorKind::User(message) => f.write_str(message),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Syntax { error, .. } => Some(error),
            ErrorKind::Io { error, .. } => Some(error),
            _ => None,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages() {
        let err = Error::new(ErrorKind::Unbound("frob".to_owned()));
        assert_eq!("unbound symbol `frob`", err.to_string());

        let err: Error = ErrorKind::WrongArity {
            name: "cons",
            expected: Arity::Exactly(2),
            have: 3,
        }
        .into();
        assert_eq!("`cons` expects 2 arguments, received 3", err.to_string());

        assert!(Arity::Between(0, 1).accepts(1));
        assert!(!Arity::Between(0, 1).accepts(2));
        assert_eq!("0 to 1", Arity::Between(0, 1).to_string());
    }

    #[test]
    fn error_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Error>();
    }
}
