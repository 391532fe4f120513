use skein_runtime::error::ErrorKind;
use skein_runtime::value::NativeFn;
use skein_runtime::{Context, Env, Result, Value};

use crate::args::{expect_int, fixed};

fn int_operands(name: &'static str, args: &Value) -> Result<(i32, i32)> {
    let [lhs, rhs] = fixed::<2>(name, args)?;
    Ok((expect_int(name, &lhs)?, expect_int(name, &rhs)?))
}

macro_rules! define_wrapping_op {
    ($fn_name:ident, $name:expr, $method:ident) => {
        pub fn $fn_name(_: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
            let (lhs, rhs) = int_operands($name, &args)?;
            Ok(Value::Int(lhs.$method(rhs)))
        }
    };
}

macro_rules! define_dividing_op {
    ($fn_name:ident, $name:expr, $method:ident) => {
        pub fn $fn_name(_: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
            let (lhs, rhs) = int_operands($name, &args)?;

            if rhs == 0 {
                return Err(ErrorKind::DivideByZero($name).into());
            }

            Ok(Value::Int(lhs.$method(rhs)))
        }
    };
}

define_wrapping_op!(stdlib_add, "+", wrapping_add);
define_wrapping_op!(stdlib_sub, "-", wrapping_sub);
define_wrapping_op!(stdlib_mul, "*", wrapping_mul);
define_dividing_op!(stdlib_div, "/", wrapping_div);
define_dividing_op!(stdlib_rem, "%", wrapping_rem);

/// Compares two integers or two characters
///
/// Characters compare by their byte value.
macro_rules! define_comparison {
    ($fn_name:ident, $name:expr, $op:tt) => {
        pub fn $fn_name(_: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
            let [lhs, rhs] = fixed::<2>($name, &args)?;

            let result = match (&lhs, &rhs) {
                (Value::Int(lhs), Value::Int(rhs)) => lhs $op rhs,
                (Value::Char(lhs), Value::Char(rhs)) => lhs $op rhs,
                (Value::Int(_), other) | (Value::Char(_), other) | (other, _) => {
                    return Err(ErrorKind::WrongType {
                        name: $name,
                        expected: "two integers or two characters",
                        found: other.type_name(),
                    }
                    .into());
                }
            };

            Ok(Value::Bool(result))
        }
    };
}

define_comparison!(stdlib_lt, "<", <);
define_comparison!(stdlib_gt, ">", >);
define_comparison!(stdlib_lte, "<=", <=);
define_comparison!(stdlib_gte, ">=", >=);

pub const EXPORTS: &[(&str, NativeFn)] = &[
    ("+", stdlib_add),
    ("-", stdlib_sub),
    ("*", stdlib_mul),
    ("/", stdlib_div),
    ("%", stdlib_rem),
    ("remainder", stdlib_rem),
    ("<", stdlib_lt),
    (">", stdlib_gt),
    ("<=", stdlib_lte),
    (">=", stdlib_gte),
];

#[cfg(test)]
mod test {
    use crate::testing::*;

    #[test]
    fn arithmetic() {
        assert_evals_to("3", "(+ 1 2)");
        assert_evals_to("-1", "(- 1 2)");
        assert_evals_to("-6", "(* 2 -3)");
        assert_evals_to("3", "(/ 7 2)");
        assert_evals_to("-3", "(/ -7 2)");
        assert_evals_to("1", "(% 7 2)");
        assert_evals_to("-1", "(remainder -7 2)");
    }

    #[test]
    fn arithmetic_wraps() {
        assert_evals_to("-2147483648", "(+ 2147483647 1)");
        assert_evals_to("2147483647", "(- -2147483648 1)");
        assert_evals_to("-2147483648", "(/ -2147483648 -1)");
    }

    #[test]
    fn arithmetic_errors() {
        assert_eval_fails("(/ 1 0)");
        assert_eval_fails("(% 1 0)");
        assert_eval_fails("(+ 1)");
        assert_eval_fails("(+ 1 2 3)");
        assert_eval_fails("(+ 1 #\\a)");
        assert_eval_fails("(* \"2\" 2)");
    }

    #[test]
    fn comparisons() {
        assert_evals_to("#t", "(< 1 2)");
        assert_evals_to("#f", "(> 1 2)");
        assert_evals_to("#t", "(<= 2 2)");
        assert_evals_to("#t", "(>= 3 2)");
        assert_evals_to("#t", "(< #\\a #\\b)");
        assert_evals_to("#f", "(>= #\\a #\\b)");

        assert_eval_fails("(< 1 #\\a)");
        assert_eval_fails("(< 'a 'b)");
    }
}
