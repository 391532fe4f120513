use std::cell::{OnceCell, Ref, RefCell};
use std::fmt;
use std::mem;
use std::rc::Rc;

use crate::context::Context;
use crate::env::Env;
use crate::error::Result;
use crate::intern::InternedSym;

/// Signature of a host-supplied procedure
///
/// Arguments arrive as a proper list of already-evaluated values. The environment is the caller's
/// and may be replaced by the procedure.
pub type NativeFn = fn(&mut Context, Value, &mut Env) -> Result<Value>;

/// Runtime value
///
/// Heap variants are reference counted and never traced. Pairs can be mutated into cycles and
/// closures can capture environments that refer back to themselves; these cycles are never
/// reclaimed.
#[derive(Clone)]
pub enum Value {
    Int(i32),
    Bool(bool),
    Nil,
    Char(u8),
    Str(Rc<Str>),
    Sym(InternedSym),
    Pair(Rc<Pair>),
    Closure(Rc<Closure>),
    Native(Rc<NativeProc>),
    ForwardRef(Rc<ForwardRef>),
}

pub const TRUE: Value = Value::Bool(true);
pub const FALSE: Value = Value::Bool(false);
pub const NIL: Value = Value::Nil;

/// Mutable byte string
pub struct Str {
    bytes: RefCell<Vec<u8>>,
}

impl Str {
    pub fn new(bytes: Vec<u8>) -> Str {
        Str {
            bytes: RefCell::new(bytes),
        }
    }

    pub fn bytes(&self) -> Ref<'_, Vec<u8>> {
        self.bytes.borrow()
    }

    pub fn len(&self) -> usize {
        self.bytes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.bytes.borrow().get(index).copied()
    }

    /// Replaces the byte at `index`, returning false if it's out of bounds
    pub fn set(&self, index: usize, byte: u8) -> bool {
        match self.bytes.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = byte;
                true
            }
            None => false,
        }
    }
}

pub struct Pair {
    first: RefCell<Value>,
    rest: RefCell<Value>,
}

impl Pair {
    pub fn new(first: Value, rest: Value) -> Pair {
        Pair {
            first: RefCell::new(first),
            rest: RefCell::new(rest),
        }
    }

    pub fn first(&self) -> Value {
        self.first.borrow().clone()
    }

    pub fn rest(&self) -> Value {
        self.rest.borrow().clone()
    }

    pub fn set_first(&self, value: Value) {
        *self.first.borrow_mut() = value;
    }

    pub fn set_rest(&self, value: Value) {
        *self.rest.borrow_mut() = value;
    }
}

impl Drop for Pair {
    fn drop(&mut self) {
        // Unlink uniquely owned tails one at a time so long lists don't recurse per element
        let mut rest = mem::replace(self.rest.get_mut(), Value::Nil);

        while let Value::Pair(pair) = rest {
            match Rc::try_unwrap(pair) {
                Ok(mut pair) => rest = mem::replace(pair.rest.get_mut(), Value::Nil),
                Err(_) => break,
            }
        }
    }
}

/// Lambda expression paired with the environment it was evaluated in
///
/// The expression is shared with the source it was read from, not copied.
pub struct Closure {
    env: Env,
    lambda: Rc<Pair>,
}

impl Closure {
    pub fn new(env: Env, lambda: Rc<Pair>) -> Closure {
        Closure { env, lambda }
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// The complete `(lambda params body...)` form
    pub fn lambda(&self) -> Value {
        Value::Pair(self.lambda.clone())
    }

    /// Parameter list or rest symbol; `Nil` if the form has been mutated to drop it
    pub fn params(&self) -> Value {
        match self.lambda.rest() {
            Value::Pair(rest) => rest.first(),
            _ => Value::Nil,
        }
    }

    /// Body expression sequence; `Nil` if empty
    pub fn body(&self) -> Value {
        match self.lambda.rest() {
            Value::Pair(rest) => rest.rest(),
            _ => Value::Nil,
        }
    }
}

pub struct NativeProc {
    name: InternedSym,
    fun: NativeFn,
}

impl NativeProc {
    pub fn new(name: InternedSym, fun: NativeFn) -> NativeProc {
        NativeProc { name, fun }
    }

    pub fn name(&self) -> InternedSym {
        self.name
    }

    pub fn fun(&self) -> NativeFn {
        self.fun
    }
}

/// Placeholder bound while a definition's initialiser is being evaluated
pub struct ForwardRef {
    name: InternedSym,
    target: OnceCell<Value>,
}

impl ForwardRef {
    pub fn new(name: InternedSym) -> ForwardRef {
        ForwardRef {
            name,
            target: OnceCell::new(),
        }
    }

    /// Name of the definition this stands in for
    pub fn name(&self) -> InternedSym {
        self.name
    }

    pub fn target(&self) -> Option<&Value> {
        self.target.get()
    }

    /// Points the placeholder at its final value
    ///
    /// A forward reference can only be resolved once; later calls are ignored and return false.
    pub fn resolve(&self, value: Value) -> bool {
        self.target.set(value).is_ok()
    }
}

impl Value {
    pub fn cons(first: Value, rest: Value) -> Value {
        Value::Pair(Rc::new(Pair::new(first, rest)))
    }

    pub fn string(bytes: impl Into<Vec<u8>>) -> Value {
        Value::Str(Rc::new(Str::new(bytes.into())))
    }

    /// Builds a proper list from the passed elements
    pub fn list(elems: impl IntoIterator<Item = Value>) -> Value {
        Self::list_with_tail(elems, Value::Nil)
    }

    /// Builds a list ending in `tail` instead of `Nil`
    pub fn list_with_tail(elems: impl IntoIterator<Item = Value>, tail: Value) -> Value {
        let elems: Vec<Value> = elems.into_iter().collect();

        elems
            .into_iter()
            .rev()
            .fold(tail, |rest, first| Value::cons(first, rest))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Value::Bool(false))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_pair(&self) -> Option<&Rc<Pair>> {
        match self {
            Value::Pair(pair) => Some(pair),
            _ => None,
        }
    }

    /// Iterates over the elements of a list
    ///
    /// Iteration stops at the first non-pair `rest`; use `ListIter::tail` to tell a proper list
    /// from an improper one. This assumes the list is acyclic.
    pub fn list_iter(&self) -> ListIter {
        ListIter { next: self.clone() }
    }

    /// Returns the length of a proper list or `None` for any other value
    pub fn list_len(&self) -> Option<usize> {
        let mut iter = self.list_iter();
        let len = iter.by_ref().count();

        if iter.tail().is_nil() {
            Some(len)
        } else {
            None
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Bool(true) => "true",
            Value::Bool(false) => "false",
            Value::Nil => "nil",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::Sym(_) => "symbol",
            Value::Pair(_) => "pair",
            Value::Closure(_) => "closure",
            Value::Native(_) => "procedure",
            Value::ForwardRef(_) => "forward reference",
        }
    }

    /// Compares two values by identity
    ///
    /// Integers and characters have no identity of their own so they compare by value.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Sym(a), Value::Sym(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b),
            (Value::Pair(a), Value::Pair(b)) => Rc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::ForwardRef(a), Value::ForwardRef(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Compares two values structurally
    ///
    /// Strings compare by content and pairs element-wise; everything else falls back to
    /// identity. This does not terminate for cyclic pairs.
    pub fn equal(&self, other: &Value) -> bool {
        let (mut left, mut right) = (self.clone(), other.clone());

        loop {
            match (&left, &right) {
                (Value::Str(a), Value::Str(b)) => return *a.bytes() == *b.bytes(),
                (Value::Pair(a), Value::Pair(b)) => {
                    if !a.first().equal(&b.first()) {
                        return false;
                    }

                    let (next_left, next_right) = (a.rest(), b.rest());
                    left = next_left;
                    right = next_right;
                }
                _ => return left.is_identical(&right),
            }
        }
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Value {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<InternedSym> for Value {
    fn from(sym: InternedSym) -> Value {
        Value::Sym(sym)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(formatter, "{}", i),
            Value::Bool(true) => write!(formatter, "#t"),
            Value::Bool(false) => write!(formatter, "#f"),
            Value::Nil => write!(formatter, "()"),
            Value::Char(c) => write!(formatter, "#\\{}", c.escape_ascii()),
            Value::Str(s) => write!(formatter, "\"{}\"", s.bytes().escape_ascii()),
            Value::Sym(sym) => sym.fmt(formatter),
            Value::Pair(pair) => write!(formatter, "({:?} . {:?})", pair.first(), pair.rest()),
            Value::Closure(closure) => write!(formatter, "#<closure {:p}>", Rc::as_ptr(closure)),
            Value::Native(native) => write!(formatter, "#<procedure {:?}>", native.name()),
            Value::ForwardRef(fwd) => write!(formatter, "#<forward-ref {:?}>", fwd.name()),
        }
    }
}

pub struct ListIter {
    next: Value,
}

impl ListIter {
    /// Value that terminated iteration
    ///
    /// This is `Nil` for a proper list.
    pub fn tail(&self) -> &Value {
        &self.next
    }
}

impl Iterator for ListIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let (first, rest) = match &self.next {
            Value::Pair(pair) => (pair.first(), pair.rest()),
            _ => return None,
        };

        self.next = rest;
        Some(first)
    }
}
