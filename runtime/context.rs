use std::rc::Rc;

use tracing::trace;

use crate::env::Env;
use crate::error::Result;
use crate::intern::{InternedSym, Interner};
use crate::port::Ports;
use crate::value::{NativeFn, NativeProc, Value};

/// Symbols the evaluator and reader treat specially
pub struct WellKnownSyms {
    pub quote: InternedSym,
    pub define: InternedSym,
    pub lambda: InternedSym,
    pub if_: InternedSym,
    pub expand: InternedSym,
    pub eof: InternedSym,
    pub quasiquote: InternedSym,
    pub unquote: InternedSym,
}

impl WellKnownSyms {
    fn new(interner: &mut Interner) -> WellKnownSyms {
        WellKnownSyms {
            quote: interner.intern("quote"),
            define: interner.intern("define"),
            lambda: interner.intern("lambda"),
            if_: interner.intern("if"),
            expand: interner.intern("expand"),
            eof: interner.intern("EOF"),
            quasiquote: interner.intern("quasiquote"),
            unquote: interner.intern("unquote"),
        }
    }
}

/// Process-wide interpreter state
///
/// This owns everything that would otherwise be global: the symbol table, the global
/// environment and the open ports. A `Context` starts with no procedures bound; the standard
/// library registers its procedures through `register`.
pub struct Context {
    interner: Interner,
    globals: Env,
    syms: WellKnownSyms,
    gensym_counter: u32,
    ports: Ports,
}

impl Context {
    pub fn new() -> Context {
        Self::with_ports(Ports::new())
    }

    pub fn with_ports(ports: Ports) -> Context {
        let mut interner = Interner::new();
        let syms = WellKnownSyms::new(&mut interner);

        Context {
            interner,
            globals: Env::empty(),
            syms,
            gensym_counter: 0,
            ports,
        }
    }

    pub fn intern(&mut self, name: &str) -> InternedSym {
        self.interner.intern(name)
    }

    pub fn sym_name(&self, sym: InternedSym) -> &str {
        self.interner.unintern(sym)
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn syms(&self) -> &WellKnownSyms {
        &self.syms
    }

    pub fn globals(&self) -> &Env {
        &self.globals
    }

    pub fn ports_mut(&mut self) -> &mut Ports {
        &mut self.ports
    }

    /// Binds a native procedure in the global environment
    pub fn register(&mut self, name: &str, fun: NativeFn) {
        let sym = self.interner.intern(name);
        let native = Value::Native(Rc::new(NativeProc::new(sym, fun)));

        self.globals = self.globals.extend(sym, native);
    }

    /// Returns a fresh symbol that can't be produced by the reader
    pub fn gensym(&mut self) -> InternedSym {
        loop {
            let name = format!("#{}", self.gensym_counter);
            self.gensym_counter += 1;

            if self.interner.get(&name).is_none() {
                return self.interner.intern(&name);
            }
        }
    }

    /// Returns the `(quote EOF)` form read at the end of input
    pub fn eof_sentinel(&self) -> Value {
        Value::list(vec![Value::Sym(self.syms.quote), Value::Sym(self.syms.eof)])
    }

    pub fn is_eof_sentinel(&self, value: &Value) -> bool {
        let mut elems = value.list_iter();

        matches!(
            (elems.next(), elems.next(), elems.next()),
            (Some(Value::Sym(quote)), Some(Value::Sym(eof)), None)
                if quote == self.syms.quote && eof == self.syms.eof
        ) && elems.tail().is_nil()
    }

    /// Names bound in the global environment, newest first
    pub fn bound_names(&self) -> Vec<String> {
        self.globals
            .bound_syms()
            .into_iter()
            .map(|sym| self.sym_name(sym).to_owned())
            .collect()
    }

    /// Evaluates a form read at top level against the global environment
    ///
    /// The form is first passed through the procedure bound to `expand`. If evaluation fails the
    /// global environment is left as it was before the form.
    pub fn eval_toplevel(&mut self, form: &Value) -> Result<Value> {
        let mut globals = self.globals.clone();
        let value = self.eval_toplevel_in(form, &mut globals)?;

        self.globals = globals;
        Ok(value)
    }

    /// Evaluates a top-level form against an arbitrary environment
    pub fn eval_toplevel_in(&mut self, form: &Value, env: &mut Env) -> Result<Value> {
        trace!(form = ?form, "evaluating top-level form");

        // An unbound `expand` behaves as the identity
        let expanded = if env.lookup(self.syms.expand)?.is_some() {
            let quoted = Value::list(vec![Value::Sym(self.syms.quote), form.clone()]);
            let expand_call = Value::list(vec![Value::Sym(self.syms.expand), quoted]);

            self.eval(&expand_call, env)?
        } else {
            form.clone()
        };

        self.eval(&expanded, env)
    }
}

impl Default for Context {
    fn default() -> Context {
        Context::new()
    }
}
