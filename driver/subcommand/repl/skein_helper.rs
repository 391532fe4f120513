use std::borrow::Cow;
use std::collections::BTreeSet;
use std::ops::Bound;

use ansi_term::{Colour, Style};

use rustyline::completion::Completer;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};

use skein_syntax::error::ExpectedContent;
use skein_syntax::parser::is_identifier_char;

use super::command::{HELP_COMMAND, QUIT_COMMAND};
use super::syntax::{error_span_for_line, expected_content_for_eol, MAXIMUM_PARSED_LINE_LEN};

const COMMANDS: &[&str] = &[QUIT_COMMAND, HELP_COMMAND];

/// Special forms are evaluated directly and never appear in the environment
const SPECIAL_FORMS: &[&str] = &["define", "lambda", "if", "quote"];

/// Identifier the cursor is in or touching
struct Word<'l> {
    /// Byte offset of the identifier in the line
    start: usize,
    before_cursor: &'l str,
    after_cursor: &'l str,
}

impl<'l> Word<'l> {
    fn at_cursor(line: &'l str, pos: usize) -> Word<'l> {
        let (head, tail) = line.split_at(pos);

        let start = head
            .char_indices()
            .rev()
            .find(|(_, c)| !is_identifier_char(*c))
            .map_or(0, |(i, c)| i + c.len_utf8());

        let end = tail
            .find(|c| !is_identifier_char(c))
            .unwrap_or_else(|| tail.len());

        Word {
            start,
            before_cursor: &head[start..],
            after_cursor: &tail[..end],
        }
    }

    fn len(&self) -> usize {
        self.before_cursor.len() + self.after_cursor.len()
    }

    /// Commands are only recognised as the first word of the line
    fn allows_commands(&self, line: &str) -> bool {
        line[..self.start].trim_start().is_empty()
    }
}

/// Implementation of Rustyline's `Helper` trait
pub struct SkeinHelper {
    names: BTreeSet<String>,
    colour: bool,
}

impl SkeinHelper {
    pub fn new(bound_names: Vec<String>, colour: bool) -> SkeinHelper {
        let names = bound_names
            .into_iter()
            .chain(
                COMMANDS
                    .iter()
                    .chain(SPECIAL_FORMS)
                    .map(|name| (*name).to_owned()),
            )
            .collect();

        SkeinHelper { names, colour }
    }

    /// Known names starting with `prefix` in lexical order
    fn names_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
        allow_commands: bool,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.names
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .map(String::as_str)
            .take_while(move |name| name.starts_with(prefix))
            .filter(move |name| allow_commands || !COMMANDS.contains(name))
    }

    /// Returns the start of the replaced text and the replacements for the word at the cursor
    ///
    /// Text after the cursor is kept so candidates must already end with it.
    fn completions(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let word = Word::at_cursor(line, pos);

        let candidates = self
            .names_with_prefix(word.before_cursor, word.allows_commands(line))
            .filter(|name| name.len() >= word.len())
            .filter_map(|name| name.strip_suffix(word.after_cursor))
            .map(str::to_owned)
            .collect();

        (word.start, candidates)
    }

    fn hint_for(&self, line: &str, pos: usize) -> Option<String> {
        if pos < line.len() {
            return None;
        }

        let expected_content = expected_content_for_eol(line);

        if let Some(ExpectedContent::String(_)) | Some(ExpectedContent::QuoteEscape(_)) =
            expected_content
        {
            return Some("\"".to_owned());
        }

        let word = Word::at_cursor(line, pos);
        if !word.before_cursor.is_empty() {
            let typed_len = word.before_cursor.len();

            let completion = self
                .names_with_prefix(word.before_cursor, word.allows_commands(line))
                .find(|name| name.len() > typed_len);

            if let Some(name) = completion {
                return Some(name[typed_len..].to_owned());
            }
        }

        expected_content
            .and_then(|ec| ec.close_char())
            .map(String::from)
    }

    fn paint<'a>(&self, style: Style, text: &'a str) -> Cow<'a, str> {
        if self.colour {
            style.paint(text).to_string().into()
        } else {
            text.into()
        }
    }
}

impl Completer for SkeinHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        Ok(self.completions(line, pos))
    }
}

impl Hinter for SkeinHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _: &rustyline::Context<'_>) -> Option<String> {
        self.hint_for(line, pos)
    }
}

impl Highlighter for SkeinHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !self.colour {
            return line.into();
        }

        let range = match error_span_for_line(line) {
            Some(span) => span.byte_range(),
            None => return line.into(),
        };

        // Spans are byte based and may split a multibyte character
        match line.get(range.clone()) {
            Some(bad) => format!(
                "{}{}{}",
                &line[..range.start],
                Colour::Red.bold().paint(bad),
                &line[range.end..]
            )
            .into(),
            None => line.into(),
        }
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        self.paint(Colour::Cyan.normal(), prompt)
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        match hint {
            ")" | "\"" => self.paint(Colour::Red.bold(), hint),
            _ => self.paint(Style::new().dimmed(), hint),
        }
    }

    fn highlight_char(&self, line: &str, _pos: usize) -> bool {
        self.colour && line.len() <= MAXIMUM_PARSED_LINE_LEN
    }
}

impl Validator for SkeinHelper {
    fn validate(
        &self,
        ctx: &mut ValidationContext<'_>,
    ) -> Result<ValidationResult, rustyline::error::ReadlineError> {
        Ok(if expected_content_for_eol(ctx.input()).is_some() {
            ValidationResult::Incomplete
        } else {
            ValidationResult::Valid(None)
        })
    }
}

impl rustyline::Helper for SkeinHelper {}

#[cfg(test)]
mod test {
    use super::*;

    fn list_helper() -> SkeinHelper {
        let bound_names = ["car", "cdr", "cons", "string-ref", "string-set!", "/"]
            .iter()
            .map(|name| (*name).to_owned())
            .collect();

        SkeinHelper::new(bound_names, false)
    }

    #[test]
    fn word_at_cursor() {
        let word = Word::at_cursor("(string-ref s 0)", 8);
        assert_eq!(1, word.start);
        assert_eq!("string-", word.before_cursor);
        assert_eq!("ref", word.after_cursor);

        let word = Word::at_cursor("(car ", 5);
        assert_eq!(5, word.start);
        assert_eq!("", word.before_cursor);
        assert_eq!("", word.after_cursor);

        let word = Word::at_cursor("\"é\"x", 5);
        assert_eq!(4, word.start);
        assert_eq!("x", word.before_cursor);
    }

    #[test]
    fn completes_names() {
        let helper = list_helper();

        assert_eq!((1, vec!["car".to_owned()]), helper.completions("(ca", 3));
        assert_eq!(
            (1, vec!["string-ref".to_owned(), "string-set!".to_owned()]),
            helper.completions("(string-", 8)
        );
        assert_eq!((1, vec![]), helper.completions("(frob", 5));

        // Special forms complete even though they're unbound
        assert_eq!((1, vec!["lambda".to_owned()]), helper.completions("(lam", 4));
    }

    #[test]
    fn completes_before_existing_suffix() {
        let helper = list_helper();

        // Only the text before the cursor is replaced
        assert_eq!(
            (1, vec!["string-".to_owned()]),
            helper.completions("(sref s 0)", 2)
        );
        assert_eq!((1, vec![]), helper.completions("(sget s 0)", 2));

        // `cdr` starts with `cd` and ends with `dr` but is shorter than `cddr`
        assert_eq!((1, vec![]), helper.completions("(cddr", 3));
    }

    #[test]
    fn commands_only_complete_at_line_start() {
        let helper = list_helper();

        assert_eq!((0, vec!["/quit".to_owned()]), helper.completions("/q", 2));
        assert_eq!((2, vec!["/quit".to_owned()]), helper.completions("  /q", 4));
        assert_eq!((5, vec![]), helper.completions("(car /q", 7));

        // Division is a bound name so it can appear anywhere
        assert_eq!((3, vec!["/".to_owned()]), helper.completions("(+ /", 4));
    }

    #[test]
    fn hints() {
        let helper = list_helper();

        assert_eq!(Some("ns".to_owned()), helper.hint_for("(co", 3));
        assert_eq!(Some("ar".to_owned()), helper.hint_for("(c", 2));
        assert_eq!(Some(")".to_owned()), helper.hint_for("(car", 4));
        assert_eq!(Some("\"".to_owned()), helper.hint_for("(write \"ca", 10));
        assert_eq!(Some("uit".to_owned()), helper.hint_for("/q", 2));
        assert_eq!(None, helper.hint_for("(car x)", 7));

        // Nothing is hinted with the cursor mid-line
        assert_eq!(None, helper.hint_for("(co", 2));
    }

    #[test]
    fn plain_output_without_colour() {
        let helper = list_helper();

        assert_eq!("(car))", helper.highlight("(car))", 0));
        assert_eq!("skein> ", helper.highlight_prompt("skein> ", true));
        assert_eq!(")", helper.highlight_hint(")"));
        assert!(!helper.highlight_char("(car", 4));
    }

    #[test]
    fn highlights_errors_with_colour() {
        let helper = SkeinHelper::new(vec![], true);

        let highlighted = helper.highlight("(car))", 0);
        assert!(highlighted.starts_with("(car)"));
        assert!(highlighted.contains(&Colour::Red.bold().paint(")").to_string()));

        assert_eq!("(car)", helper.highlight("(car)", 0));
    }
}
