use std::io::{Result, Write};
use std::rc::Rc;

use skein_runtime::intern::Interner;
use skein_runtime::value::Value;

macro_rules! process_escaped_bytes {
    ($w:ident, $source:ident, $( $pattern:pat => $escape:expr ),*) => {
        // Try to write sequential unescaped bytes in chunks
        // This is especially important if $w isn't buffered
        let mut last_escape_end = 0;
        for (index, b) in $source.iter().enumerate() {
            match b {
                $(
                    $pattern => {
                        $w.write_all(&$source[last_escape_end..index])?;
                        last_escape_end = index + 1;
                        ($escape)?;
                    }
                ),* ,
                _ => {}
            };
        }

        $w.write_all(&$source[last_escape_end..])?;
    }
}

fn write_escaped_bytes(w: &mut dyn Write, source: &[u8]) -> Result<()> {
    process_escaped_bytes!(w, source,
        b'\t' => write!(w, "\\t"),
        b'\n' => write!(w, "\\n"),
        b'\\' => write!(w, "\\\\"),
        b'"' => write!(w, "\\\"")
    );

    Ok(())
}

fn write_char(w: &mut dyn Write, c: u8) -> Result<()> {
    match c {
        b'\n' => write!(w, "#\\newline"),
        b' ' => write!(w, "#\\space"),
        b'\t' => write!(w, "#\\tab"),
        other => {
            write!(w, "#\\")?;
            w.write_all(&[other])
        }
    }
}

/// Writes the elements of a list after its opening `(`
///
/// Only the `first` of each pair recurses; the `rest` chain is walked iteratively.
fn write_list_elems(w: &mut dyn Write, interner: &Interner, list: &Value) -> Result<()> {
    let mut elems = list.list_iter();

    let mut has_prev = false;
    for elem in elems.by_ref() {
        if has_prev {
            write!(w, " ")?;
        } else {
            has_prev = true;
        }

        write_value(w, interner, &elem)?;
    }

    let tail = elems.tail();
    if !tail.is_nil() {
        write!(w, " . ")?;
        write_value(w, interner, tail)?;
    }

    Ok(())
}

/// Writes the canonical representation of a value
///
/// Everything other than closures and native procedures can be read back to an equal value. This
/// doesn't terminate for cyclic lists.
pub fn write_value(w: &mut dyn Write, interner: &Interner, value: &Value) -> Result<()> {
    match value {
        Value::Int(i) => write!(w, "{}", i),
        Value::Bool(true) => write!(w, "#t"),
        Value::Bool(false) => write!(w, "#f"),
        Value::Nil => write!(w, "()"),
        Value::Char(c) => write_char(w, *c),
        Value::Str(s) => {
            write!(w, "\"")?;
            write_escaped_bytes(w, &s.bytes())?;
            write!(w, "\"")
        }
        Value::Sym(sym) => write!(w, "{}", interner.unintern(*sym)),
        Value::Pair(_) => {
            write!(w, "(")?;
            write_list_elems(w, interner, value)?;
            write!(w, ")")
        }
        Value::Closure(closure) => write!(w, "#<closure {:p}>", Rc::as_ptr(closure)),
        Value::Native(native) => write!(
            w,
            "#<procedure {} {:p}>",
            interner.unintern(native.name()),
            Rc::as_ptr(native)
        ),
        Value::ForwardRef(fwd) => match fwd.target() {
            Some(target) => write_value(w, interner, target),
            None => write!(w, "#<knot {}>", interner.unintern(fwd.name())),
        },
    }
}

/// Writes a value for human consumption
///
/// Strings and characters are written as their raw bytes; everything else is written as
/// `write_value` would.
pub fn display_value(w: &mut dyn Write, interner: &Interner, value: &Value) -> Result<()> {
    match value {
        Value::Str(s) => w.write_all(&s.bytes()),
        Value::Char(c) => w.write_all(&[*c]),
        other => write_value(w, interner, other),
    }
}

/// Returns the canonical representation of a value as a string
pub fn value_to_string(interner: &Interner, value: &Value) -> String {
    let mut output_buf: Vec<u8> = vec![];

    // Writing to a `Vec` can't fail
    let _ = write_value(&mut output_buf, interner, value);
    String::from_utf8_lossy(&output_buf).into_owned()
}

#[cfg(test)]
mod test {
    use super::*;

    use skein_runtime::{Context, Env};
    use skein_syntax::parser::datum_from_str;

    use crate::reader::box_syntax_datum;

    fn string_for_value(ctx: &Context, value: &Value) -> String {
        value_to_string(ctx.interner(), value)
    }

    fn assert_write(ctx: &mut Context, expected: &'static str, value: Value) {
        let first_output = string_for_value(ctx, &value);
        assert_eq!(expected, first_output);

        // Try to round trip this to make sure our output and tests are sane
        let reparsed_syntax = datum_from_str(&first_output).unwrap();
        let reboxed = box_syntax_datum(ctx, &reparsed_syntax);
        assert!(reboxed.equal(&value));

        let second_output = string_for_value(ctx, &reboxed);
        assert_eq!(expected, second_output);
    }

    fn assert_read_write(ctx: &mut Context, input: &str, expected: &'static str) {
        let datum = datum_from_str(input).unwrap();
        let value = box_syntax_datum(ctx, &datum);
        assert_write(ctx, expected, value);
    }

    #[test]
    fn bools() {
        let mut ctx = Context::new();
        assert_write(&mut ctx, "#f", Value::Bool(false));
        assert_write(&mut ctx, "#t", Value::Bool(true));
    }

    #[test]
    fn ints() {
        let mut ctx = Context::new();

        assert_write(&mut ctx, "0", Value::Int(0));
        assert_write(&mut ctx, "120", Value::Int(120));
        assert_write(&mut ctx, "-120", Value::Int(-120));
        assert_write(&mut ctx, "-2147483648", Value::Int(i32::MIN));
    }

    #[test]
    fn sym() {
        let mut ctx = Context::new();

        let foo = ctx.intern("foo");
        assert_write(&mut ctx, "foo", Value::Sym(foo));

        let pred = ctx.intern("null?");
        assert_write(&mut ctx, "null?", Value::Sym(pred));
    }

    #[test]
    fn lists() {
        let mut ctx = Context::new();

        assert_write(&mut ctx, "()", Value::Nil);
        assert_write(&mut ctx, "(1)", Value::list(vec![Value::Int(1)]));
        assert_write(
            &mut ctx,
            "(1 2 3)",
            Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
        );
        assert_write(
            &mut ctx,
            "((1) ())",
            Value::list(vec![Value::list(vec![Value::Int(1)]), Value::Nil]),
        );
    }

    #[test]
    fn improper_lists() {
        let mut ctx = Context::new();

        assert_write(&mut ctx, "(1 . 2)", Value::cons(Value::Int(1), Value::Int(2)));
        assert_read_write(&mut ctx, "(1 2 . 3)", "(1 2 . 3)");
        assert_read_write(&mut ctx, "(1 . (2 3))", "(1 2 3)");
    }

    #[test]
    fn quote_shorthand() {
        let mut ctx = Context::new();

        assert_read_write(&mut ctx, "'x", "(quote x)");
        assert_read_write(&mut ctx, "`(a ,b)", "(quasiquote (a (unquote b)))");
    }

    #[test]
    fn chars() {
        let mut ctx = Context::new();

        let test_chars = [
            ("#\\newline", b'\n'),
            ("#\\space", b' '),
            ("#\\tab", b'\t'),
            ("#\\a", b'a'),
            ("#\\A", b'A'),
            ("#\\(", b'('),
        ];

        for (expected, c) in test_chars.iter() {
            assert_write(&mut ctx, expected, Value::Char(*c));
        }
    }

    #[test]
    fn strings() {
        let mut ctx = Context::new();

        let test_strings = [
            (r#""""#, ""),
            (r#""Hello, world!""#, "Hello, world!"),
            (r#""Hello\"World""#, "Hello\"World"),
            (r#""Hello\\World""#, "Hello\\World"),
            (r#""Tab\t""#, "Tab\t"),
            (r#""\n\nnewline""#, "\n\nnewline"),
            (
                r#""The word \"recursion\" has many meanings.""#,
                r#"The word "recursion" has many meanings."#,
            ),
        ];

        for (expected, s) in test_strings.iter() {
            assert_write(&mut ctx, expected, Value::string(s.as_bytes()));
        }
    }

    #[test]
    fn display() {
        let ctx = Context::new();
        let mut output_buf: Vec<u8> = vec![];

        display_value(&mut output_buf, ctx.interner(), &Value::string("a\"b")).unwrap();
        display_value(&mut output_buf, ctx.interner(), &Value::Char(b'\n')).unwrap();
        display_value(&mut output_buf, ctx.interner(), &Value::Int(3)).unwrap();

        assert_eq!(b"a\"b\n3".to_vec(), output_buf);
    }

    #[test]
    fn procedures_are_opaque() {
        let mut ctx = Context::new();
        let lambda = datum_from_str("(lambda (x) x)").unwrap();
        let lambda = box_syntax_datum(&mut ctx, &lambda);

        let closure1 = ctx.eval(&lambda, &mut Env::empty()).unwrap();
        let closure2 = ctx.eval(&lambda, &mut Env::empty()).unwrap();

        let output1 = string_for_value(&ctx, &closure1);
        let output2 = string_for_value(&ctx, &closure2);

        assert!(output1.starts_with("#<closure "));
        assert_ne!(output1, output2);

        // The reader rejects the output
        assert!(datum_from_str(&output1).is_err());
    }
}
