use std::fs;

use tracing::debug;

use skein_runtime::error::ErrorKind;
use skein_runtime::value::{NativeFn, TRUE};
use skein_runtime::{Context, Env, Result, Value};
use skein_runtime_syntax::reader::Reader;

use crate::args::{expect_str, fixed};

pub fn stdlib_gensym(ctx: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let [] = fixed::<0>("gensym", &args)?;
    Ok(Value::Sym(ctx.gensym()))
}

/// Default expansion hook applied to every top-level form
pub fn stdlib_expand(_: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let [form] = fixed::<1>("expand", &args)?;
    Ok(form)
}

/// Evaluates an expression in an explicitly passed environment
pub fn stdlib_eval(ctx: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let [expr, env] = fixed::<2>("eval", &args)?;

    // Definitions made by `expr` only extend this temporary environment
    let mut env = Env::from_value(env);
    ctx.eval(&expr, &mut env)
}

/// Returns the caller's environment as a value
pub fn stdlib_environment(_: &mut Context, args: Value, env: &mut Env) -> Result<Value> {
    let [] = fixed::<0>("environment", &args)?;
    Ok(env.as_value().clone())
}

/// Runs every form in a file through the top-level protocol in the caller's environment
pub fn stdlib_load(ctx: &mut Context, args: Value, env: &mut Env) -> Result<Value> {
    let [path] = fixed::<1>("load", &args)?;
    let path = expect_str("load", &path)?;
    let path = String::from_utf8_lossy(&path.bytes()).into_owned();

    debug!(path = %path, "loading file");

    let source = fs::read(&path).map_err(|error| ErrorKind::Io {
        path: path.clone(),
        error,
    })?;

    let mut reader = Reader::new(&path, &source);
    let mut form_count = 0usize;

    while let Some(form) = reader.read_value(ctx)? {
        ctx.eval_toplevel_in(&form, env)?;
        form_count += 1;
    }

    debug!(path = %path, form_count, "loaded file");
    Ok(TRUE)
}

/// Aborts evaluation with a user-supplied message
pub fn stdlib_error(_: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let [message] = fixed::<1>("error", &args)?;
    let message = expect_str("error", &message)?;

    let message = String::from_utf8_lossy(&message.bytes()).into_owned();
    Err(ErrorKind::User(message).into())
}

pub const EXPORTS: &[(&str, NativeFn)] = &[
    ("gensym", stdlib_gensym),
    ("expand", stdlib_expand),
    ("eval", stdlib_eval),
    ("environment", stdlib_environment),
    ("load", stdlib_load),
    ("error", stdlib_error),
];

#[cfg(test)]
mod test {
    use std::fs;

    use skein_runtime::ErrorKind;

    use crate::testing::*;

    #[test]
    fn gensym_is_distinct() {
        assert_evals_to("#f", "(eq? (gensym) (gensym))");
        assert_evals_to("#t", "(symbol? (gensym))");
        assert_evals_to("#t", "(define g (gensym)) (eq? g g)");
    }

    #[test]
    fn eval_in_explicit_environment() {
        assert_evals_to("3", "(eval '(+ 1 2) (environment))");
        assert_evals_to("7", "((lambda (x) (eval 'x (environment))) 7)");
        assert_eval_fails("(eval 'x 5)");
    }

    #[test]
    fn environment_captured_during_define() {
        // The newest binding of `e` is its own knot, which resolves to `e` itself
        assert_evals_to(
            "(#t #t)",
            "(define e (environment)) (list (pair? (cdr (car e))) (equal? (cdr (car e)) e))",
        );

        // Pulling the knot out before the definition completes can't resolve it
        assert_eval_fails("(define e (cdr (car (environment))))");
        assert_eval_fails("(define e (pair? (cdr (car (environment)))))");
    }

    #[test]
    fn eval_define_does_not_escape() {
        let (mut ctx, _) = test_ctx();

        eval_str(&mut ctx, "(eval '(define hidden 1) (environment))").unwrap();
        assert!(eval_str(&mut ctx, "hidden").is_err());
    }

    #[test]
    fn redefining_expand() {
        // Every later top-level form is replaced with its own `cdr`
        assert_evals_to(
            "3",
            "(define (expand form) (if (pair? form) (cdr form) form)) (ignored + 1 2)",
        );

        // The hook sees the unevaluated form
        assert_evals_to(
            "(quote x)",
            "(define (expand form) (list 'quote form)) 'x",
        );
    }

    #[test]
    fn user_error() {
        let (mut ctx, _) = test_ctx();

        let err = eval_str(&mut ctx, r#"(error "went wrong")"#).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::User(message) if message == "went wrong"));

        assert_eval_fails("(error 'not-a-string)");
    }

    #[test]
    fn load_in_calling_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.scm");
        fs::write(&path, "(define (double n) (* n 2))\n(define loaded 1)\n").unwrap();

        let (mut ctx, _) = test_ctx();
        let source = format!(r#"(load "{}") (double loaded)"#, path.to_str().unwrap());
        let value = eval_str(&mut ctx, &source).unwrap();
        assert!(matches!(value, skein_runtime::Value::Int(2)));

        // Loading inside a closure only binds within that closure's environment
        let source = format!(
            r#"((lambda () (load "{}") loaded))"#,
            path.to_str().unwrap()
        );
        assert!(eval_str(&mut ctx, &source).is_ok());
    }

    #[test]
    fn load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.scm");
        let (mut ctx, _) = test_ctx();
        let err = eval_str(&mut ctx, &format!(r#"(load "{}")"#, missing.to_str().unwrap()))
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Io { .. }));

        let broken = dir.path().join("broken.scm");
        fs::write(&broken, "(define ok 1)\n(define broken").unwrap();
        let err = eval_str(&mut ctx, &format!(r#"(load "{}")"#, broken.to_str().unwrap()))
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Syntax { .. }));
    }
}
