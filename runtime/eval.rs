use std::rc::Rc;

use crate::context::Context;
use crate::env::Env;
use crate::error::{ErrorKind, Result};
use crate::intern::InternedSym;
use crate::value::{Closure, ForwardRef, Pair, Value};

/// Follows a forward reference to the value it was resolved to
fn deref_forward_ref(ctx: &Context, fwd: &ForwardRef) -> Result<Value> {
    match fwd.target() {
        Some(Value::ForwardRef(inner)) => deref_forward_ref(ctx, inner),
        Some(target) => Ok(target.clone()),
        None => Err(ErrorKind::UnresolvedForwardRef(ctx.sym_name(fwd.name()).to_owned()).into()),
    }
}

/// Splits a special form's operand list into its first element and the remainder
fn first_operand(operands: &Value, form: &'static str) -> Result<(Value, Value)> {
    match operands {
        Value::Pair(pair) => Ok((pair.first(), pair.rest())),
        _ => Err(ErrorKind::MalformedSpecialForm(form).into()),
    }
}

impl Context {
    fn lookup_raw(&self, sym: InternedSym, env: &Env) -> Result<Value> {
        env.lookup(sym)?
            .ok_or_else(|| ErrorKind::Unbound(self.sym_name(sym).to_owned()).into())
    }

    /// Evaluates `expr` in `caller_env`
    ///
    /// Tail positions loop instead of recursing: the branches of `if`, the final expression of a
    /// closure body and the target of a forward reference in operator position. `define` at this
    /// level replaces `caller_env` with an extended environment.
    pub fn eval(&mut self, expr: &Value, caller_env: &mut Env) -> Result<Value> {
        let mut expr = expr.clone();
        // Environment of the closure body we've tail called in to, if any
        let mut tail_env: Option<Env> = None;

        'trampoline: loop {
            let env: &mut Env = match tail_env {
                Some(ref mut body_env) => body_env,
                None => &mut *caller_env,
            };

            let form = match &expr {
                Value::Sym(sym) => {
                    return match self.lookup_raw(*sym, env)? {
                        Value::ForwardRef(fwd) => deref_forward_ref(self, &fwd),
                        value => Ok(value),
                    };
                }
                Value::ForwardRef(fwd) => return deref_forward_ref(self, fwd),
                Value::Pair(pair) => pair.clone(),
                _ => return Ok(expr.clone()),
            };

            let head = form.first();
            let operands = form.rest();

            if let Value::Sym(head_sym) = head {
                if head_sym == self.syms().quote {
                    return first_operand(&operands, "quote").map(|(quoted, _)| quoted);
                } else if head_sym == self.syms().define {
                    return self.eval_define(&operands, env);
                } else if head_sym == self.syms().lambda {
                    return self.eval_lambda(form, env);
                } else if head_sym == self.syms().if_ {
                    expr = self.eval_if(&operands, env)?;
                    continue 'trampoline;
                }
            }

            // Forward references are re-dispatched below instead of being followed here
            let mut applied = match head {
                Value::Sym(sym) => self.lookup_raw(sym, env)?,
                other => self.eval(&other, env)?,
            };

            loop {
                match applied {
                    Value::Closure(closure) => {
                        let mut body_env = self.bind_params(&closure, &operands, env)?;
                        let mut body = closure.body().list_iter().peekable();

                        while let Some(body_expr) = body.next() {
                            if body.peek().is_none() {
                                expr = body_expr;
                                tail_env = Some(body_env);
                                continue 'trampoline;
                            }

                            self.eval(&body_expr, &mut body_env)?;
                        }

                        return Ok(Value::Nil);
                    }
                    Value::Native(native) => {
                        let args = self.eval_operands(&operands, env)?;
                        return (native.fun())(self, args, env);
                    }
                    Value::ForwardRef(fwd) => {
                        applied = deref_forward_ref(self, &fwd)?;
                    }
                    other => return Err(ErrorKind::NotApplicable(other.type_name()).into()),
                }
            }
        }
    }

    /// Evaluates each operand left to right into a new proper list
    ///
    /// Forward references pulled out of data structures are followed so native procedures only
    /// ever see resolved values.
    fn eval_operands(&mut self, operands: &Value, env: &mut Env) -> Result<Value> {
        let mut operand_iter = operands.list_iter();
        let mut values = vec![];

        for operand in operand_iter.by_ref() {
            let value = match self.eval(&operand, env)? {
                Value::ForwardRef(fwd) => deref_forward_ref(self, &fwd)?,
                value => value,
            };

            values.push(value);
        }

        if !operand_iter.tail().is_nil() {
            return Err(ErrorKind::ImproperApplication.into());
        }

        Ok(Value::list(values))
    }

    /// Builds the environment a closure's body is evaluated in
    ///
    /// Fixed parameters are paired with operands up to the shorter of the two lists. Surplus
    /// operands are never evaluated and surplus parameters are left unbound.
    fn bind_params(&mut self, closure: &Closure, operands: &Value, env: &mut Env) -> Result<Env> {
        let params = closure.params();

        if let Value::Sym(rest_sym) = params {
            let args = self.eval_operands(operands, env)?;
            return Ok(closure.env().extend(rest_sym, args));
        }

        let mut bindings = vec![];
        for (param, operand) in params.list_iter().zip(operands.list_iter()) {
            let param_sym = match param {
                Value::Sym(sym) => sym,
                other => return Err(ErrorKind::BadParameters(other.type_name()).into()),
            };

            bindings.push((param_sym, self.eval(&operand, env)?));
        }

        // The first parameter ends up in the newest frame
        Ok(closure.env().extend_all(bindings.into_iter().rev()))
    }

    fn eval_define(&mut self, operands: &Value, env: &mut Env) -> Result<Value> {
        let (target, rest) = first_operand(operands, "define")?;

        let (name, init) = match target {
            Value::Sym(name) => (name, first_operand(&rest, "define")?.0),
            Value::Pair(signature) => {
                let name = match signature.first() {
                    Value::Sym(name) => name,
                    other => return Err(ErrorKind::CannotDefine(other.type_name()).into()),
                };

                // (define (name . params) body...) is (define name (lambda params body...))
                let lambda = Value::cons(
                    Value::Sym(self.syms().lambda),
                    Value::cons(signature.rest(), rest),
                );

                (name, lambda)
            }
            other => return Err(ErrorKind::CannotDefine(other.type_name()).into()),
        };

        let knot = Rc::new(ForwardRef::new(name));
        let mut knot_env = env.extend(name, Value::ForwardRef(knot.clone()));

        // A knot can only come back unevaluated through data, e.g. an environment alist
        let value = match self.eval(&init, &mut knot_env)? {
            Value::ForwardRef(fwd) => deref_forward_ref(self, &fwd)?,
            value => value,
        };
        knot.resolve(value.clone());

        *env = env.extend(name, value.clone());
        Ok(value)
    }

    fn eval_lambda(&mut self, form: Rc<Pair>, env: &Env) -> Result<Value> {
        let (params, _) = first_operand(&form.rest(), "lambda")?;

        match params {
            Value::Nil | Value::Sym(_) => {}
            Value::Pair(_) => {
                let mut param_iter = params.list_iter();
                for param in param_iter.by_ref() {
                    if !matches!(param, Value::Sym(_)) {
                        return Err(ErrorKind::BadParameters(param.type_name()).into());
                    }
                }

                if !param_iter.tail().is_nil() {
                    return Err(ErrorKind::BadParameters(param_iter.tail().type_name()).into());
                }
            }
            other => return Err(ErrorKind::BadParameters(other.type_name()).into()),
        }

        Ok(Value::Closure(Rc::new(Closure::new(env.clone(), form))))
    }

    /// Evaluates the condition of an `if` and returns the branch to continue with
    fn eval_if(&mut self, operands: &Value, env: &mut Env) -> Result<Value> {
        let (cond, rest) = first_operand(operands, "if")?;
        let (then_branch, rest) = first_operand(&rest, "if")?;
        let else_branch = match rest {
            Value::Pair(pair) => pair.first(),
            _ => Value::Nil,
        };

        if self.eval(&cond, env)?.is_false() {
            Ok(else_branch)
        } else {
            Ok(then_branch)
        }
    }
}
