//! Helpers shared by the unit tests of each primitive module

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use skein_runtime::port::Ports;
use skein_runtime::{Context, Result, Value};
use skein_runtime_syntax::reader::eval_source;
use skein_runtime_syntax::writer::value_to_string;

/// In-memory output stream that can be inspected after it's been handed to a `Ports` table
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Creates a context with every primitive registered, reading `stdin` and capturing stdout
pub fn test_ctx_with_stdin(stdin: &[u8]) -> (Context, SharedBuf) {
    let stdout = SharedBuf::default();
    let ports = Ports::with_streams(
        Box::new(io::Cursor::new(stdin.to_vec())),
        Box::new(stdout.clone()),
        Box::new(io::sink()),
    );

    let mut ctx = Context::with_ports(ports);
    crate::register_all(&mut ctx);

    (ctx, stdout)
}

pub fn test_ctx() -> (Context, SharedBuf) {
    test_ctx_with_stdin(b"")
}

pub fn eval_str(ctx: &mut Context, source: &str) -> Result<Value> {
    eval_source(ctx, "test", source.as_bytes())
}

/// Evaluates `source` in a fresh context and returns the printed value of the last form
pub fn eval_to_string(source: &str) -> String {
    let (mut ctx, _) = test_ctx();
    let value = eval_str(&mut ctx, source).unwrap();

    value_to_string(ctx.interner(), &value)
}

pub fn assert_evals_to(expected: &str, source: &str) {
    assert_eq!(expected, eval_to_string(source), "evaluating {}", source);
}

pub fn assert_eval_fails(source: &str) {
    let (mut ctx, _) = test_ctx();
    assert!(
        eval_str(&mut ctx, source).is_err(),
        "expected error evaluating {}",
        source
    );
}
