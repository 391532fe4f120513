use std::convert::TryFrom;

use skein_runtime::error::ErrorKind;
use skein_runtime::value::{NativeFn, Str, TRUE};
use skein_runtime::{Context, Env, Result, Value};

use crate::args::{expect_char, expect_int, expect_str, fixed};

/// Converts a Scheme index into a byte offset within `s`
fn checked_index(name: &'static str, s: &Str, index: i32) -> Result<usize> {
    let len = s.len();

    match usize::try_from(index) {
        Ok(offset) if offset < len => Ok(offset),
        _ => Err(ErrorKind::IndexOutOfBounds { name, index, len }.into()),
    }
}

pub fn stdlib_string_ref(_: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let [s, index] = fixed::<2>("string-ref", &args)?;
    let s = expect_str("string-ref", &s)?;
    let index = expect_int("string-ref", &index)?;

    let offset = checked_index("string-ref", &s, index)?;
    Ok(s.get(offset).map(Value::Char).unwrap_or(Value::Nil))
}

/// Replaces a byte of a string in place
pub fn stdlib_string_set(_: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let [s, index, c] = fixed::<3>("string-set!", &args)?;
    let s = expect_str("string-set!", &s)?;
    let index = expect_int("string-set!", &index)?;
    let c = expect_char("string-set!", &c)?;

    let offset = checked_index("string-set!", &s, index)?;
    s.set(offset, c);

    Ok(TRUE)
}

pub fn stdlib_string_len(_: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let [s] = fixed::<1>("string-len", &args)?;
    let s = expect_str("string-len", &s)?;

    Ok(Value::Int(s.len() as i32))
}

pub const EXPORTS: &[(&str, NativeFn)] = &[
    ("string-ref", stdlib_string_ref),
    ("string-set!", stdlib_string_set),
    ("string-len", stdlib_string_len),
];
