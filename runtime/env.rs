use crate::error::{ErrorKind, Result};
use crate::intern::InternedSym;
use crate::value::Value;

/// Chain of binding frames
///
/// An environment is an association list of `(symbol . value)` pairs ending in `Nil`, newest
/// binding first. Extending an environment prepends a frame and never touches the existing chain,
/// so every holder of an older `Env` keeps seeing exactly the bindings it captured.
///
/// Because the chain is an ordinary list it can be handed to Scheme code as a value and passed
/// back to `eval`.
#[derive(Clone, Debug)]
pub struct Env {
    bindings: Value,
}

impl Env {
    pub fn empty() -> Env {
        Env {
            bindings: Value::Nil,
        }
    }

    /// Wraps a value previously returned by `as_value`
    ///
    /// The shape of the chain is only checked as it's walked by `lookup`.
    pub fn from_value(bindings: Value) -> Env {
        Env { bindings }
    }

    pub fn as_value(&self) -> &Value {
        &self.bindings
    }

    pub fn into_value(self) -> Value {
        self.bindings
    }

    /// Finds the most recent binding for `sym`
    pub fn lookup(&self, sym: InternedSym) -> Result<Option<Value>> {
        let mut frames = self.bindings.list_iter();

        for frame in frames.by_ref() {
            let binding = frame.as_pair().ok_or(ErrorKind::MalformedEnvironment)?;

            match binding.first() {
                Value::Sym(bound_sym) if bound_sym == sym => return Ok(Some(binding.rest())),
                Value::Sym(_) => {}
                _ => return Err(ErrorKind::MalformedEnvironment.into()),
            }
        }

        if frames.tail().is_nil() {
            Ok(None)
        } else {
            Err(ErrorKind::MalformedEnvironment.into())
        }
    }

    /// Returns a new environment with `sym` bound ahead of the existing bindings
    #[must_use]
    pub fn extend(&self, sym: InternedSym, value: Value) -> Env {
        Env {
            bindings: Value::cons(Value::cons(Value::Sym(sym), value), self.bindings.clone()),
        }
    }

    /// Extends the environment with several bindings
    ///
    /// Later bindings shadow earlier ones with the same symbol.
    #[must_use]
    pub fn extend_all(&self, bindings: impl IntoIterator<Item = (InternedSym, Value)>) -> Env {
        bindings
            .into_iter()
            .fold(self.clone(), |env, (sym, value)| env.extend(sym, value))
    }

    /// Returns every bound symbol, newest first, with shadowed duplicates removed
    pub fn bound_syms(&self) -> Vec<InternedSym> {
        let mut syms = vec![];

        for frame in self.bindings.list_iter() {
            if let Some(Value::Sym(sym)) = frame.as_pair().map(|binding| binding.first()) {
                if !syms.contains(&sym) {
                    syms.push(sym);
                }
            }
        }

        syms
    }
}

impl Default for Env {
    fn default() -> Env {
        Env::empty()
    }
}
