//! Primitive operation registry.
//!
//! The fixed set of built-in strict operations: arithmetic, comparison,
//! equality, list operations, and type predicates. Operations are defined
//! once in a single contiguous registry for ease of auditing, with a lazily
//! built name index for lookup.
//!
//! ## Contract
//!
//! Every operation receives fully forced values - never unevaluated thunks,
//! never expressions. The evaluator forces all arguments of a primitive
//! application regardless of any laziness annotation on the enclosing
//! parameters. Wrong operand types produce a typed [`Error`], never a panic.
//!
//! ## Adding an operation
//!
//! 1. Implement the function with the signature `fn(&[Value]) -> Result<Value, Error>`
//! 2. Add a `Primitive` entry to `PRIMITIVES` with its name and arity
//! 3. Add tests covering edge cases and error conditions

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::Error;
use crate::ast::NumberType;
use crate::value::Value;

/// Canonical signature of a primitive implementation
pub type PrimitiveFn = fn(&[Value]) -> Result<Value, Error>;

/// Expected number of arguments for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    /// Check if the given number of arguments is valid
    pub fn validate(&self, got: usize) -> Result<(), Error> {
        match *self {
            Arity::Exact(expected) if got == expected => Ok(()),
            Arity::Exact(expected) => Err(Error::arity_error(expected, got)),
            Arity::AtLeast(min) if got >= min => Ok(()),
            Arity::AtLeast(min) => Err(Error::arity_error(min, got)),
        }
    }
}

/// Definition of one built-in operation
pub struct Primitive {
    /// The surface name of this operation
    pub name: &'static str,
    /// Expected number of arguments, validated before dispatch
    pub arity: Arity,
    run: PrimitiveFn,
}

//
// Implementations
//

fn expect_number(op: &'static str, value: &Value) -> Result<NumberType, Error> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(Error::TypeError(format!(
            "{op} expects numbers, got {} {other}",
            other.type_name()
        ))),
    }
}

fn prim_add(args: &[Value]) -> Result<Value, Error> {
    let mut sum = 0.0;
    for arg in args {
        sum += expect_number("+", arg)?;
    }
    Ok(Value::Number(sum))
}

fn prim_mul(args: &[Value]) -> Result<Value, Error> {
    let mut product = 1.0;
    for arg in args {
        product *= expect_number("*", arg)?;
    }
    Ok(Value::Number(product))
}

fn prim_sub(args: &[Value]) -> Result<Value, Error> {
    let a = expect_number("-", &args[0])?;
    let b = expect_number("-", &args[1])?;
    Ok(Value::Number(a - b))
}

// Real division; dividing by zero yields an infinity, as the surface
// language defines it, rather than an error.
fn prim_div(args: &[Value]) -> Result<Value, Error> {
    let a = expect_number("/", &args[0])?;
    let b = expect_number("/", &args[1])?;
    Ok(Value::Number(a / b))
}

macro_rules! numeric_comparison {
    ($name:ident, $op:tt, $op_str:expr) => {
        fn $name(args: &[Value]) -> Result<Value, Error> {
            let a = expect_number($op_str, &args[0])?;
            let b = expect_number($op_str, &args[1])?;
            Ok(Value::Bool(a $op b))
        }
    };
}

numeric_comparison!(prim_lt, <, "<");
numeric_comparison!(prim_gt, >, ">");
numeric_comparison!(prim_num_eq, ==, "=");

// Only `#f` is falsy; every other value negates to `#f`.
fn prim_not(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::Bool(matches!(args[0], Value::Bool(false))))
}

// Identity-like equality over ground data. Mismatched or non-ground operand
// types compare unequal rather than erroring.
fn prim_eq(args: &[Value]) -> Result<Value, Error> {
    let equal = match (&args[0], &args[1]) {
        (Value::Symbol(a), Value::Symbol(b)) => a == b,
        (Value::EmptyList, Value::EmptyList) => true,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => false,
    };
    Ok(Value::Bool(equal))
}

fn prim_string_eq(args: &[Value]) -> Result<Value, Error> {
    let equal = match (&args[0], &args[1]) {
        (Value::String(a), Value::String(b)) => a == b,
        _ => false,
    };
    Ok(Value::Bool(equal))
}

fn prim_cons(args: &[Value]) -> Result<Value, Error> {
    match &args[1] {
        Value::EmptyList => Ok(Value::compound(vec![args[0].clone()])),
        Value::Compound(items) => {
            let mut list = Vec::with_capacity(items.len() + 1);
            list.push(args[0].clone());
            list.extend_from_slice(items);
            Ok(Value::compound(list))
        }
        other => Err(Error::TypeError(format!(
            "cons expects a list as its second argument, got {} {other}",
            other.type_name()
        ))),
    }
}

fn prim_car(args: &[Value]) -> Result<Value, Error> {
    match &args[0] {
        Value::Compound(items) => Ok(items[0].clone()),
        other => Err(Error::TypeError(format!(
            "car expects a non-empty list, got {} {other}",
            other.type_name()
        ))),
    }
}

fn prim_cdr(args: &[Value]) -> Result<Value, Error> {
    match &args[0] {
        Value::Compound(items) => Ok(Value::compound(items[1..].to_vec())),
        other => Err(Error::TypeError(format!(
            "cdr expects a non-empty list, got {} {other}",
            other.type_name()
        ))),
    }
}

macro_rules! type_predicate {
    ($name:ident, $pattern:pat) => {
        fn $name(args: &[Value]) -> Result<Value, Error> {
            Ok(Value::Bool(matches!(args[0], $pattern)))
        }
    };
}

type_predicate!(prim_is_list, Value::EmptyList | Value::Compound(_));
type_predicate!(prim_is_number, Value::Number(_));
type_predicate!(prim_is_boolean, Value::Bool(_));
type_predicate!(prim_is_symbol, Value::Symbol(_));
type_predicate!(prim_is_string, Value::String(_));

/// Global registry of all primitive operations
static PRIMITIVES: LazyLock<Vec<Primitive>> = LazyLock::new(|| {
    vec![
        // Arithmetic operations
        Primitive {
            name: "+",
            arity: Arity::AtLeast(0),
            run: prim_add,
        },
        Primitive {
            name: "*",
            arity: Arity::AtLeast(0),
            run: prim_mul,
        },
        Primitive {
            name: "-",
            arity: Arity::Exact(2),
            run: prim_sub,
        },
        Primitive {
            name: "/",
            arity: Arity::Exact(2),
            run: prim_div,
        },
        // Comparison operations
        Primitive {
            name: "<",
            arity: Arity::Exact(2),
            run: prim_lt,
        },
        Primitive {
            name: ">",
            arity: Arity::Exact(2),
            run: prim_gt,
        },
        Primitive {
            name: "=",
            arity: Arity::Exact(2),
            run: prim_num_eq,
        },
        // Logical and equality operations
        Primitive {
            name: "not",
            arity: Arity::Exact(1),
            run: prim_not,
        },
        Primitive {
            name: "eq?",
            arity: Arity::Exact(2),
            run: prim_eq,
        },
        Primitive {
            name: "string=?",
            arity: Arity::Exact(2),
            run: prim_string_eq,
        },
        // List operations
        Primitive {
            name: "cons",
            arity: Arity::Exact(2),
            run: prim_cons,
        },
        Primitive {
            name: "car",
            arity: Arity::Exact(1),
            run: prim_car,
        },
        Primitive {
            name: "cdr",
            arity: Arity::Exact(1),
            run: prim_cdr,
        },
        // Type predicates
        Primitive {
            name: "list?",
            arity: Arity::Exact(1),
            run: prim_is_list,
        },
        Primitive {
            name: "number?",
            arity: Arity::Exact(1),
            run: prim_is_number,
        },
        Primitive {
            name: "boolean?",
            arity: Arity::Exact(1),
            run: prim_is_boolean,
        },
        Primitive {
            name: "symbol?",
            arity: Arity::Exact(1),
            run: prim_is_symbol,
        },
        Primitive {
            name: "string?",
            arity: Arity::Exact(1),
            run: prim_is_string,
        },
    ]
});

/// Lazy static map from name to Primitive
static BY_NAME: LazyLock<HashMap<&'static str, &'static Primitive>> = LazyLock::new(|| {
    let ops: &'static [Primitive] = PRIMITIVES.as_slice();
    ops.iter().map(|op| (op.name, op)).collect()
});

/// All registered primitive operations
pub fn all_primitives() -> &'static [Primitive] {
    PRIMITIVES.as_slice()
}

/// Find a primitive operation by its surface name
pub fn find_primitive(name: &str) -> Option<&'static Primitive> {
    BY_NAME.get(name).copied()
}

/// Apply a primitive operation by name to fully forced argument values.
///
/// Arity is validated against the registry entry before dispatch; an
/// unregistered name is an [`Error::UnknownPrimitive`].
pub fn apply_primitive(name: &str, args: &[Value]) -> Result<Value, Error> {
    let op = find_primitive(name).ok_or_else(|| Error::UnknownPrimitive(name.to_owned()))?;
    op.arity.validate(args.len())?;
    (op.run)(args)
}
