use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use termcolor::{ColorChoice, StandardStream, WriteColor};

use skein_runtime::error::ErrorKind;
use skein_runtime::Error;
use skein_syntax::error::{Error as SyntaxError, ErrorKind as SyntaxErrorKind};
use skein_syntax::span::Span;

pub type FileId = usize;

pub fn new_primary_label(file_id: FileId, span: Span, message: impl Into<String>) -> Label<FileId> {
    Label::primary(file_id, span.byte_range()).with_message(message)
}

pub fn new_secondary_label(
    file_id: FileId,
    span: Span,
    message: impl Into<String>,
) -> Label<FileId> {
    Label::secondary(file_id, span.byte_range()).with_message(message)
}

pub fn diagnostic_for_syntax_error(file_id: FileId, error: &SyntaxError) -> Diagnostic<FileId> {
    let diagnostic = Diagnostic::error().with_message(error.kind().message());

    match error.kind() {
        SyntaxErrorKind::Eof(ec) => {
            let mut labels = vec![new_primary_label(
                file_id,
                error.span(),
                format!("expected {} to continue", ec.description()),
            )];

            if let Some(open_char_span) = ec.open_char_span() {
                labels.push(new_secondary_label(
                    file_id,
                    open_char_span,
                    format!("{} starts here", ec.description()),
                ));
            }

            diagnostic.with_labels(labels)
        }
        _ => diagnostic.with_labels(vec![new_primary_label(
            file_id,
            error.span(),
            format!("at {}", error.position()),
        )]),
    }
}

/// Converts a runtime error in to a diagnostic, registering any source text it carries
pub fn diagnostic_for_error(
    files: &mut SimpleFiles<String, String>,
    error: &Error,
) -> Diagnostic<FileId> {
    match error.kind() {
        ErrorKind::Syntax {
            origin,
            source,
            error,
        } => {
            let file_id = files.add(origin.clone(), source.clone());
            diagnostic_for_syntax_error(file_id, error)
        }
        ErrorKind::User(message) => Diagnostic::error()
            .with_message(message.clone())
            .with_notes(vec!["raised by `error`".to_owned()]),
        other => Diagnostic::error().with_message(other.to_string()),
    }
}

/// Emits the diagnostic for an error to the passed writer
pub fn emit_error(writer: &mut dyn WriteColor, error: &Error) {
    let mut files = SimpleFiles::new();
    let diagnostic = diagnostic_for_error(&mut files, error);

    let config = term::Config::default();
    let _ = term::emit(writer, &config, &files, &diagnostic);
}

pub fn emit_error_to_stderr(colour: bool, error: &Error) {
    let color_choice = if colour {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };

    let stderr = StandardStream::stderr(color_choice);
    let mut stderr_lock = stderr.lock();

    emit_error(&mut stderr_lock, error);
}
