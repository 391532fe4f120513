use skein_runtime::value::{NativeFn, FALSE, TRUE};
use skein_runtime::{Context, Env, Result, Value};

use crate::args::{expect_pair, fixed};

pub fn stdlib_cons(_: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let [first, rest] = fixed::<2>("cons", &args)?;
    Ok(Value::cons(first, rest))
}

pub fn stdlib_car(_: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let [pair] = fixed::<1>("car", &args)?;
    Ok(expect_pair("car", &pair)?.first())
}

pub fn stdlib_cdr(_: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let [pair] = fixed::<1>("cdr", &args)?;
    Ok(expect_pair("cdr", &pair)?.rest())
}

/// Replaces the `first` of a pair, returning `#f` if the target isn't a pair
pub fn stdlib_set_car(_: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let [target, value] = fixed::<2>("set-car!", &args)?;

    match target {
        Value::Pair(pair) => {
            pair.set_first(value);
            Ok(TRUE)
        }
        _ => Ok(FALSE),
    }
}

/// Replaces the `rest` of a pair, returning `#f` if the target isn't a pair
pub fn stdlib_set_cdr(_: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let [target, value] = fixed::<2>("set-cdr!", &args)?;

    match target {
        Value::Pair(pair) => {
            pair.set_rest(value);
            Ok(TRUE)
        }
        _ => Ok(FALSE),
    }
}

pub fn stdlib_list(_: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    // The evaluator always passes a freshly built list
    Ok(args)
}

pub const EXPORTS: &[(&str, NativeFn)] = &[
    ("cons", stdlib_cons),
    ("car", stdlib_car),
    ("cdr", stdlib_cdr),
    ("set-car!", stdlib_set_car),
    ("set-cdr!", stdlib_set_cdr),
    ("list", stdlib_list),
];

#[cfg(test)]
mod test {
    use crate::testing::*;

    #[test]
    fn construction() {
        assert_evals_to("(1 . 2)", "(cons 1 2)");
        assert_evals_to("(1 2 3)", "(list 1 2 3)");
        assert_evals_to("()", "(list)");
        assert_evals_to("(1 2)", "(cons 1 (cons 2 '()))");
    }

    #[test]
    fn accessors() {
        assert_evals_to("1", "(car '(1 2))");
        assert_evals_to("(2)", "(cdr '(1 2))");
        assert_evals_to("3", "(cdr '(1 2 . 3))");

        assert_eval_fails("(car '())");
        assert_eval_fails("(cdr 5)");
        assert_eval_fails("(car '(1) '(2))");
    }

    #[test]
    fn mutation_is_visible_through_every_binding() {
        assert_evals_to("9", "(define p (cons 1 2)) (set-car! p 9) (car p)");
        assert_evals_to(
            "(1 . 7)",
            "(define p (cons 1 2)) (define q p) (set-cdr! p 7) q",
        );
    }

    #[test]
    fn mutating_non_pairs() {
        assert_evals_to("#f", "(set-car! 1 2)");
        assert_evals_to("#f", "(set-cdr! '() 2)");
        assert_evals_to("#t", "(set-cdr! (cons 1 2) 3)");
    }

    #[test]
    fn cyclic_structure() {
        // Printing would never terminate but the structure itself is fine
        assert_evals_to(
            "1",
            "(define p (list 1 2)) (set-cdr! (cdr p) p) (car (cdr (cdr p)))",
        );
    }
}
