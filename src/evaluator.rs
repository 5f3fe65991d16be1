//! Core expression evaluator.
//!
//! A single recursive dispatch over the expression forms of `ast`, threading
//! an environment and a [`Forcing`] mode. The forcing mode is what carries
//! the mixed eager/lazy protocol through the tree: strict positions
//! (conditional tests, application operators, primitive arguments, eager
//! parameters) evaluate under [`Forcing::Required`], which collapses any
//! thunk to a ground value; everything else evaluates under
//! [`Forcing::Deferred`], letting thunks flow through unforced so laziness
//! propagates along chains of variable references.
//!
//! ## Application protocol
//!
//! - Primitive operator: every argument is forced, no matter how the
//!   enclosing parameters were declared. Primitives never see thunks.
//! - Closure operator: an argument bound to a lazy parameter is suspended as
//!   a thunk capturing the *caller's* environment - unless the argument is a
//!   literal, which is evaluated directly since suspending it buys nothing.
//!   Eager parameters are evaluated under `Required`. The call frame is
//!   parented to the closure's *captured* environment, not the caller's.
//! - Anything else in operator position is a `NotAProcedure` error.
//!
//! Evaluation is single-threaded, synchronous recursion; a thunk is a data
//! representation, not a control-flow yield. An explicit depth counter turns
//! runaway eager recursion into a typed error before the host stack dies.

use std::rc::Rc;

use crate::Error;
use crate::MAX_EVAL_DEPTH;
use crate::ast::{Expr, Form, Param, Program};
use crate::env::Env;
use crate::primitives::apply_primitive;
use crate::value::{Closure, Thunk, Value};

/// Whether the current position demands a fully forced value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forcing {
    /// The value participates in a strict computation; force thunks.
    Required,
    /// The value may remain suspended; pass thunks through unforced.
    Deferred,
}

/// Evaluate a single expression (public API).
///
/// The result may itself be a suspended computation when laziness propagates
/// out of the expression; strict consumers force it on demand.
pub fn eval(expr: &Expr, env: &Env) -> Result<Value, Error> {
    eval_depth(expr, env, Forcing::Deferred, 0)
}

/// Evaluate a program: a sequence of top-level forms, left to right.
///
/// A `define` form evaluates its right-hand side against the global
/// environment and threads the updated globals to the remaining forms. A
/// non-final form must succeed before its successors run; the value of the
/// final form is the value of the program. An empty sequence is an error.
///
/// Parse errors from a front end never reach this function - they are
/// ordinary `Err` values that callers propagate unchanged.
pub fn evaluate_program(program: &Program, env: &Env) -> Result<Value, Error> {
    eval_forms(&program.forms, env)
}

fn eval_forms(forms: &[Form], env: &Env) -> Result<Value, Error> {
    match forms {
        [] => Err(Error::EmptyProgram),
        [Form::Define { name, value }, rest @ ..] => {
            let globals = env.global_frame();
            let global_env = Env::Global(globals.clone());
            let rhs = eval_depth(value, &global_env, Forcing::Deferred, 0)?;
            globals.define(name, rhs);
            if rest.is_empty() {
                Ok(Value::Void)
            } else {
                eval_forms(rest, &global_env)
            }
        }
        [Form::Expr(expr)] => eval_depth(expr, env, Forcing::Deferred, 0),
        [Form::Expr(expr), rest @ ..] => {
            // Evaluated for effect; an error aborts the whole sequence
            eval_depth(expr, env, Forcing::Deferred, 0)?;
            eval_forms(rest, env)
        }
    }
}

/// Any value other than `#f` counts as true in a test position
fn is_true(value: &Value) -> bool {
    !matches!(value, Value::Bool(false))
}

fn eval_depth(expr: &Expr, env: &Env, forcing: Forcing, depth: usize) -> Result<Value, Error> {
    if depth >= MAX_EVAL_DEPTH {
        return Err(Error::EvalError(format!(
            "evaluation depth limit exceeded (max: {MAX_EVAL_DEPTH})"
        )));
    }
    match expr {
        // Literals evaluate to themselves
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::String(s) => Ok(Value::String(s.clone())),
        Expr::Quoted(datum) => Ok(datum.clone()),
        Expr::Prim(name) => Ok(Value::Prim(name.clone())),

        Expr::Var(name) => {
            let value = env.lookup(name)?;
            match forcing {
                Forcing::Required => force(value, depth),
                Forcing::Deferred => Ok(value),
            }
        }

        Expr::If { test, then, alt } => {
            let tested = eval_depth(test, env, Forcing::Required, depth + 1)?;
            if is_true(&tested) {
                eval_depth(then, env, Forcing::Required, depth + 1)
            } else {
                eval_depth(alt, env, Forcing::Required, depth + 1)
            }
        }

        // Capture the current environment; the body is not evaluated
        Expr::Lambda { params, body } => Ok(Value::Closure(Rc::new(Closure {
            params: params.clone(),
            body: body.clone(),
            env: env.clone(),
        }))),

        Expr::Let { bindings, body } => eval_let(bindings, body, env, depth),
        Expr::Letrec { bindings, body } => eval_letrec(bindings, body, env, depth),
        Expr::Set { name, value } => eval_set(name, value, env, depth),

        Expr::Apply { rator, rands } => {
            let operator = eval_depth(rator, env, Forcing::Required, depth + 1)?;
            apply_procedure(&operator, rands, env, depth)
        }
    }
}

/// Collapse a chain of suspended computations to a ground value.
///
/// Each force re-evaluates the thunk's expression in its captured
/// environment; nothing is cached, so repeated forcing repeats the
/// computation (and any side effects).
fn force(value: Value, depth: usize) -> Result<Value, Error> {
    let mut current = value;
    while let Value::Thunk(thunk) = current {
        current = eval_depth(&thunk.expr, &thunk.env, Forcing::Required, depth + 1)?;
    }
    Ok(current)
}

/// Evaluate a body sequence: earlier expressions for effect, the last for
/// its value. Bodies are never empty in trees built by the reader; an empty
/// one from a hand-built tree is a malformed-AST error.
fn eval_body(body: &[Expr], env: &Env, depth: usize) -> Result<Value, Error> {
    match body {
        [] => Err(Error::MalformedAst("empty body sequence".to_owned())),
        [last] => eval_depth(last, env, Forcing::Deferred, depth + 1),
        [first, rest @ ..] => {
            eval_depth(first, env, Forcing::Deferred, depth + 1)?;
            eval_body(rest, env, depth)
        }
    }
}

fn apply_procedure(
    operator: &Value,
    rands: &[Expr],
    env: &Env,
    depth: usize,
) -> Result<Value, Error> {
    match operator {
        Value::Prim(name) => {
            // Primitives are strict: every argument is forced, regardless of
            // any laziness annotation upstream
            let mut args = Vec::with_capacity(rands.len());
            for rand in rands {
                args.push(eval_depth(rand, env, Forcing::Required, depth + 1)?);
            }
            apply_primitive(name, &args)
        }
        Value::Closure(closure) => {
            if closure.params.len() != rands.len() {
                return Err(Error::arity_error(closure.params.len(), rands.len()));
            }

            let mut args = Vec::with_capacity(rands.len());
            for (param, rand) in closure.params.iter().zip(rands) {
                args.push(pass_argument(param, rand, env, depth)?);
            }

            let names = closure.params.iter().map(|p| p.name.clone()).collect();
            // One new frame parented to the closure's captured environment,
            // not the caller's
            let call_env = closure.env.extend(names, args);
            eval_body(&closure.body, &call_env, depth)
        }
        other => Err(Error::NotAProcedure(format!("{other}"))),
    }
}

/// Decide the passing strategy for one (formal, argument) pair.
///
/// A lazy formal suspends its argument as a thunk over the caller's
/// environment - unless the argument is a literal, which is already ground
/// and gains nothing from the indirection.
fn pass_argument(param: &Param, rand: &Expr, env: &Env, depth: usize) -> Result<Value, Error> {
    if param.is_lazy() && !rand.is_literal() {
        Ok(Value::Thunk(Rc::new(Thunk {
            expr: rand.clone(),
            env: env.clone(),
        })))
    } else if param.is_lazy() {
        eval_depth(rand, env, Forcing::Deferred, depth + 1)
    } else {
        eval_depth(rand, env, Forcing::Required, depth + 1)
    }
}

/// `let`: all right-hand sides in the *current* environment, then one frame
/// with every binding at once - simultaneous, non-recursive scoping.
fn eval_let(
    bindings: &[(String, Expr)],
    body: &[Expr],
    env: &Env,
    depth: usize,
) -> Result<Value, Error> {
    let mut values = Vec::with_capacity(bindings.len());
    for (_, rhs) in bindings {
        values.push(eval_depth(rhs, env, Forcing::Deferred, depth + 1)?);
    }
    let names = bindings.iter().map(|(name, _)| name.clone()).collect();
    eval_body(body, &env.extend(names, values), depth)
}

/// `letrec`: two-phase. Extend with placeholder cells first, evaluate every
/// right-hand side in the already-extended environment (closures created
/// there capture it, enabling mutual recursion), then fill each cell in
/// before touching the body.
fn eval_letrec(
    bindings: &[(String, Expr)],
    body: &[Expr],
    env: &Env,
    depth: usize,
) -> Result<Value, Error> {
    let names: Vec<String> = bindings.iter().map(|(name, _)| name.clone()).collect();
    let placeholders = vec![Value::Void; bindings.len()];
    let extended = env.extend(names.clone(), placeholders);

    let mut values = Vec::with_capacity(bindings.len());
    for (_, rhs) in bindings {
        values.push(eval_depth(rhs, &extended, Forcing::Deferred, depth + 1)?);
    }

    for (name, value) in names.iter().zip(values) {
        extended.lookup_binding(name)?.set(value);
    }

    eval_body(body, &extended, depth)
}

/// `set!`: evaluate the value, then mutate the binding wherever it lives in
/// the chain. Mutation through a shared frame is visible to every closure
/// aliasing it.
fn eval_set(name: &str, value: &Expr, env: &Env, depth: usize) -> Result<Value, Error> {
    let new_value = eval_depth(value, env, Forcing::Deferred, depth + 1)?;
    let binding = env.lookup_binding(name)?;
    binding.set(new_value);
    Ok(Value::Void)
}
