#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

pub mod datum;
pub mod error;
pub mod parser;
pub mod span;
