use skein_syntax::datum::Datum;
use skein_syntax::parser::Parser;
use skein_syntax::span::Position;

use skein_runtime::error::{Error, ErrorKind, Result};
use skein_runtime::{Context, Value};

/// Places a syntax datum on the runtime heap
pub fn box_syntax_datum(ctx: &mut Context, datum: &Datum) -> Value {
    match datum {
        Datum::Bool(_, value) => Value::Bool(*value),
        Datum::Int(_, val) => Value::Int(*val),
        Datum::Char(_, val) => Value::Char(*val),
        Datum::Str(_, val) => Value::string(val.to_vec()),
        Datum::Sym(_, val) => Value::Sym(ctx.intern(val)),
        Datum::List(_, vs) => {
            let boxed_elems = vs
                .iter()
                .map(|elem| box_syntax_datum(ctx, elem))
                .collect::<Vec<Value>>();

            Value::list(boxed_elems)
        }
        Datum::DottedList(_, vs, tail) => {
            let boxed_elems = vs
                .iter()
                .map(|elem| box_syntax_datum(ctx, elem))
                .collect::<Vec<Value>>();
            let boxed_tail = box_syntax_datum(ctx, tail);

            Value::list_with_tail(boxed_elems, boxed_tail)
        }
    }
}

/// Reads runtime values one at a time from a source buffer
pub struct Reader<'src> {
    origin: &'src str,
    source: &'src [u8],
    parser: Parser<'src>,
}

impl<'src> Reader<'src> {
    /// Creates a reader over `source`
    ///
    /// `origin` names the source in syntax errors, e.g. a file path.
    pub fn new(origin: &'src str, source: &'src [u8]) -> Reader<'src> {
        Reader {
            origin,
            source,
            parser: Parser::new(source),
        }
    }

    /// Line and column of the next unread byte
    pub fn position(&self) -> Position {
        self.parser.position()
    }

    /// Reads the next value, returning `None` once only whitespace and comments remain
    pub fn read_value(&mut self, ctx: &mut Context) -> Result<Option<Value>> {
        match self.parser.read_datum() {
            Ok(Some(datum)) => Ok(Some(box_syntax_datum(ctx, &datum))),
            Ok(None) => Ok(None),
            Err(error) => Err(Error::new(ErrorKind::Syntax {
                origin: self.origin.to_owned(),
                source: String::from_utf8_lossy(self.source).into_owned(),
                error,
            })),
        }
    }

    /// Reads the next value, returning `(quote EOF)` at the end of input
    pub fn read(&mut self, ctx: &mut Context) -> Result<Value> {
        Ok(self
            .read_value(ctx)?
            .unwrap_or_else(|| ctx.eof_sentinel()))
    }
}

/// Reads and evaluates every form in `source` through the top-level protocol
///
/// Forms are evaluated as they're read; a syntax error part way through leaves the effects of the
/// earlier forms in place. Returns the value of the last form or `Nil` for empty input.
pub fn eval_source(ctx: &mut Context, origin: &str, source: &[u8]) -> Result<Value> {
    let mut reader = Reader::new(origin, source);
    let mut last_value = Value::Nil;

    while let Some(form) = reader.read_value(ctx)? {
        last_value = ctx.eval_toplevel(&form)?;
    }

    Ok(last_value)
}
