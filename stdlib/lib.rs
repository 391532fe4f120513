//! Primitive procedures registered in to every interpreter context

#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

mod args;
#[cfg(test)]
mod testing;

pub mod list;
pub mod number;
pub mod port;
pub mod predicate;
pub mod reflect;
pub mod string;
pub mod write;

use skein_runtime::value::NativeFn;
use skein_runtime::Context;

const EXPORT_TABLES: &[&[(&str, NativeFn)]] = &[
    list::EXPORTS,
    predicate::EXPORTS,
    number::EXPORTS,
    string::EXPORTS,
    port::EXPORTS,
    reflect::EXPORTS,
    write::EXPORTS,
];

/// Registers every primitive procedure in the context's global environment
pub fn register_all(ctx: &mut Context) {
    for exports in EXPORT_TABLES {
        for (name, fun) in exports.iter() {
            ctx.register(name, *fun);
        }
    }
}
