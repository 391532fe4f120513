use std::path::PathBuf;
use std::{fs, io, thread};

use tracing::{debug, trace};

use skein_runtime::error::ErrorKind;
use skein_runtime::{Context, Error};
use skein_runtime_syntax::reader::Reader;
use skein_runtime_syntax::writer::value_to_string;

/// Stack size of the engine thread
///
/// Only tail calls run in constant stack; everything else recurses on the host stack.
const ENGINE_STACK_SIZE: usize = 256 * 1024 * 1024;

pub enum Request {
    /// Evaluates source text that didn't come from a file
    Eval { origin: String, source: String },

    /// Reads and evaluates every form in a file
    LoadFile(PathBuf),
}

#[derive(Debug)]
pub struct Evaled {
    /// Printed value of each form that evaluated successfully
    pub values: Vec<String>,

    /// Error that stopped evaluation of the request
    ///
    /// Forms following the failed one aren't read.
    pub error: Option<Error>,

    /// All names bound in the global environment after the request
    pub bound_names: Vec<String>,
}

struct Engine {
    ctx: Context,
}

impl Engine {
    fn new() -> Engine {
        let mut ctx = Context::new();
        skein_stdlib::register_all(&mut ctx);

        debug!(globals = ctx.bound_names().len(), "engine started");
        Engine { ctx }
    }

    fn eval_source(&mut self, origin: &str, source: &[u8]) -> Evaled {
        let mut reader = Reader::new(origin, source);
        let mut values = vec![];

        let error = loop {
            let form = match reader.read_value(&mut self.ctx) {
                Ok(Some(form)) => form,
                Ok(None) => break None,
                Err(err) => break Some(err),
            };

            match self.ctx.eval_toplevel(&form) {
                Ok(value) => values.push(value_to_string(self.ctx.interner(), &value)),
                Err(err) => break Some(err),
            }
        };

        trace!(origin, forms = values.len(), failed = error.is_some(), "evaluated source");

        Evaled {
            values,
            error,
            bound_names: self.ctx.bound_names(),
        }
    }

    fn handle(&mut self, request: Request) -> Evaled {
        match request {
            Request::Eval { origin, source } => self.eval_source(&origin, source.as_bytes()),
            Request::LoadFile(path) => {
                let origin = path.to_string_lossy().into_owned();
                debug!(path = %origin, "loading file");

                match fs::read(&path) {
                    Ok(source) => self.eval_source(&origin, &source),
                    Err(error) => Evaled {
                        values: vec![],
                        error: Some(ErrorKind::Io { path: origin, error }.into()),
                        bound_names: self.ctx.bound_names(),
                    },
                }
            }
        }
    }
}

pub struct EngineCtx {
    send_request: crossbeam_channel::Sender<Request>,
    receive_evaled: crossbeam_channel::Receiver<Evaled>,
}

#[derive(Debug)]
pub struct EngineDisconnected;

impl EngineCtx {
    /// Creates a new `EngineCtx`
    ///
    /// This will launch an engine thread owning the interpreter context. Requests are evaluated
    /// in the order they're sent.
    pub fn new() -> io::Result<Self> {
        let (send_request, receive_request) = crossbeam_channel::unbounded::<Request>();
        let (send_evaled, receive_evaled) = crossbeam_channel::unbounded();

        thread::Builder::new()
            .name("skein-engine".to_owned())
            .stack_size(ENGINE_STACK_SIZE)
            .spawn(move || {
                let mut engine = Engine::new();

                for request in receive_request.iter() {
                    let evaled = engine.handle(request);

                    if send_evaled.send(evaled).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            send_request,
            receive_evaled,
        })
    }

    /// Sends a request to be evaluated by the engine
    ///
    /// This is asynchronous; an unlimited number of requests can be sent before reading their
    /// results.
    pub fn send(&self, request: Request) -> Result<(), EngineDisconnected> {
        self.send_request
            .send(request)
            .map_err(|_| EngineDisconnected)
    }

    /// Receives the result of the oldest outstanding request
    pub fn receive(&self) -> Result<Evaled, EngineDisconnected> {
        self.receive_evaled.recv().map_err(|_| EngineDisconnected)
    }

    /// Sends a request and waits for its result
    pub fn eval_sync(&self, request: Request) -> Result<Evaled, EngineDisconnected> {
        self.send(request)?;
        self.receive()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn eval_line(ectx: &EngineCtx, line: &str) -> Evaled {
        ectx.eval_sync(Request::Eval {
            origin: "test".to_owned(),
            source: line.to_owned(),
        })
        .unwrap()
    }

    fn assert_values(ectx: &EngineCtx, expected: &[&str], line: &str) {
        let evaled = eval_line(ectx, line);

        if let Some(err) = evaled.error {
            panic!("unexpected error evaluating `{}`: {}", line, err);
        }

        assert_eq!(expected.to_vec(), evaled.values);
    }

    #[test]
    fn basic_session() {
        let ectx = EngineCtx::new().unwrap();

        assert_values(&ectx, &[], "   ");
        assert_values(&ectx, &[], "; COMMENT!");
        assert_values(&ectx, &["1"], "1");
        assert_values(&ectx, &["2", "(1 . 2)"], "(define x 2) (cons 1 x)");

        // Definitions persist between requests
        assert_values(&ectx, &["first"], "(define x 'first)");
        assert_values(&ectx, &["second"], "(define x 'second)");
        assert_values(&ectx, &["second"], "x");

        let evaled = eval_line(&ectx, "(define (double n) (* n 2))");
        assert!(evaled.bound_names.iter().any(|name| name == "double"));
        assert!(evaled.bound_names.iter().any(|name| name == "cons"));
    }

    #[test]
    fn errors_stop_the_request_only() {
        let ectx = EngineCtx::new().unwrap();

        let evaled = eval_line(&ectx, "1 (car '()) 3");
        assert_eq!(vec!["1"], evaled.values);
        assert!(evaled.error.is_some());

        let evaled = eval_line(&ectx, "(define y (car '()))");
        assert!(evaled.error.is_some());

        // The failed definition didn't bind anything
        let evaled = eval_line(&ectx, "y");
        assert!(matches!(
            evaled.error.map(Error::into_kind),
            Some(ErrorKind::Unbound(_))
        ));

        assert_values(&ectx, &["ok"], "'ok");
    }

    #[test]
    fn incomplete_input() {
        let ectx = EngineCtx::new().unwrap();

        let evaled = eval_line(&ectx, "'done (+ 1");
        assert_eq!(vec!["done"], evaled.values);
        assert!(matches!(
            evaled.error.as_ref().map(Error::kind),
            Some(ErrorKind::Syntax { .. })
        ));
    }

    #[test]
    fn deep_recursion() {
        let ectx = EngineCtx::new().unwrap();

        let evaled = eval_line(&ectx, "(define (count n) (if (< n 1) 0 (+ 1 (count (- n 1)))))");
        assert!(evaled.error.is_none());

        assert_values(&ectx, &["10000"], "(count 10000)");
    }

    #[test]
    fn load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.scm");
        fs::write(&path, "(define loaded 'yes)\n").unwrap();

        let ectx = EngineCtx::new().unwrap();
        let evaled = ectx.eval_sync(Request::LoadFile(path)).unwrap();
        assert!(evaled.error.is_none());
        assert_values(&ectx, &["yes"], "loaded");

        let evaled = ectx
            .eval_sync(Request::LoadFile(dir.path().join("missing.scm")))
            .unwrap();
        assert!(matches!(
            evaled.error.map(Error::into_kind),
            Some(ErrorKind::Io { .. })
        ));
    }
}
