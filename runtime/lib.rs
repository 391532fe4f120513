//! Value model, environments and the evaluator

#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

pub mod context;
pub mod env;
pub mod error;
pub mod eval;
pub mod intern;
pub mod port;
pub mod value;

pub use crate::context::Context;
pub use crate::env::Env;
pub use crate::error::{Arity, Error, ErrorKind, Result};
pub use crate::value::Value;
