//! Argument list destructuring for native procedures

use std::convert::TryFrom;
use std::rc::Rc;

use skein_runtime::error::{Arity, ErrorKind, Result};
use skein_runtime::value::{Pair, Str};
use skein_runtime::Value;

/// Splits an argument list into exactly `N` values
pub fn fixed<const N: usize>(name: &'static str, args: &Value) -> Result<[Value; N]> {
    let values: Vec<Value> = args.list_iter().collect();
    let have = values.len();

    <[Value; N]>::try_from(values).map_err(|_| {
        ErrorKind::WrongArity {
            name,
            expected: Arity::Exactly(N),
            have,
        }
        .into()
    })
}

/// Splits an argument list into `N` required values followed by one optional value
pub fn with_optional<const N: usize>(
    name: &'static str,
    args: &Value,
) -> Result<([Value; N], Option<Value>)> {
    let mut values: Vec<Value> = args.list_iter().collect();
    let have = values.len();

    let optional = if have == N + 1 { values.pop() } else { None };

    let required = <[Value; N]>::try_from(values).map_err(|_| ErrorKind::WrongArity {
        name,
        expected: Arity::Between(N, N + 1),
        have,
    })?;

    Ok((required, optional))
}

fn wrong_type(name: &'static str, expected: &'static str, found: &Value) -> ErrorKind {
    ErrorKind::WrongType {
        name,
        expected,
        found: found.type_name(),
    }
}

pub fn expect_int(name: &'static str, value: &Value) -> Result<i32> {
    match value {
        Value::Int(i) => Ok(*i),
        other => Err(wrong_type(name, "integer", other).into()),
    }
}

pub fn expect_char(name: &'static str, value: &Value) -> Result<u8> {
    match value {
        Value::Char(c) => Ok(*c),
        other => Err(wrong_type(name, "char", other).into()),
    }
}

pub fn expect_str(name: &'static str, value: &Value) -> Result<Rc<Str>> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        other => Err(wrong_type(name, "string", other).into()),
    }
}

pub fn expect_pair(name: &'static str, value: &Value) -> Result<Rc<Pair>> {
    match value {
        Value::Pair(pair) => Ok(pair.clone()),
        other => Err(wrong_type(name, "pair", other).into()),
    }
}
