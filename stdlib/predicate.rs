use skein_runtime::value::NativeFn;
use skein_runtime::{Context, Env, Result, Value};

use crate::args::fixed;

/// Compares two values structurally
///
/// This backs both `eq?` and `equal?`: integers and characters compare by value, strings by
/// content and pairs element-wise.
pub fn stdlib_equal(_: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let [a, b] = fixed::<2>("eq?", &args)?;
    Ok(Value::Bool(a.equal(&b)))
}

macro_rules! define_type_predicate {
    ($fn_name:ident, $name:expr, $pattern:pat) => {
        pub fn $fn_name(_: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
            let [value] = fixed::<1>($name, &args)?;
            Ok(Value::Bool(matches!(value, $pattern)))
        }
    };
}

define_type_predicate!(stdlib_is_pair, "pair?", Value::Pair(_));
define_type_predicate!(stdlib_is_null, "null?", Value::Nil);
define_type_predicate!(stdlib_is_bool, "bool?", Value::Bool(_));
define_type_predicate!(stdlib_is_string, "string?", Value::Str(_));
define_type_predicate!(stdlib_is_char, "char?", Value::Char(_));
define_type_predicate!(stdlib_is_procedure, "procedure?", Value::Native(_));
define_type_predicate!(stdlib_is_function, "function?", Value::Closure(_));
define_type_predicate!(stdlib_is_integer, "integer?", Value::Int(_));
define_type_predicate!(stdlib_is_symbol, "symbol?", Value::Sym(_));

pub const EXPORTS: &[(&str, NativeFn)] = &[
    ("eq?", stdlib_equal),
    ("equal?", stdlib_equal),
    ("pair?", stdlib_is_pair),
    ("null?", stdlib_is_null),
    ("bool?", stdlib_is_bool),
    ("string?", stdlib_is_string),
    ("char?", stdlib_is_char),
    ("procedure?", stdlib_is_procedure),
    ("function?", stdlib_is_function),
    ("integer?", stdlib_is_integer),
    ("symbol?", stdlib_is_symbol),
];
