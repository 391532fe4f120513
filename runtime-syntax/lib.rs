//! This crate converts between source text and runtime values

#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

pub mod reader;
pub mod writer;
