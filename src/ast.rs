//! Expression model consumed by the evaluator.
//!
//! The reader (or any other front end) produces a [`Program`] - a sequence of
//! top-level [`Form`]s - or a single [`Expr`]. Expressions are immutable once
//! built. Top-level `define` is deliberately *not* an `Expr` variant: it only
//! exists at the [`Form`] level, which makes the "define never nested"
//! invariant structural rather than something the evaluator must police.
//!
//! Every parameter of a procedure literal carries a [`Laziness`] flag. An
//! argument bound to a lazy parameter is suspended as a thunk instead of
//! being evaluated at the call site; see the `evaluator` module for the full
//! argument-passing protocol.

use std::fmt;

use crate::value::{Value, write_escaped_string, write_number};

/// Type alias for number values in the interpreter
pub type NumberType = f64;

/// Allowed non-alphanumeric characters in symbol names.
/// Most represent operators or predicate/mutator suffixes ("?", "!").
pub(crate) const SYMBOL_SPECIAL_CHARS: &str = "+-*/<>=!?_";

/// Check if a string is a valid symbol name
/// Valid: non-empty, no leading digit, no "-digit" prefix, alphanumeric + SYMBOL_SPECIAL_CHARS
pub(crate) fn is_valid_symbol(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        None => false, // name is empty
        Some(first_char) => {
            if first_char.is_ascii_digit() {
                return false;
            }

            if first_char == '-'
                && let Some(second_char) = chars.next()
                && second_char.is_ascii_digit()
            {
                return false;
            }

            name.chars()
                .all(|c| c.is_alphanumeric() || SYMBOL_SPECIAL_CHARS.contains(c))
        }
    }
}

/// Argument-passing strategy for one formal parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Laziness {
    Eager,
    Lazy,
}

/// One formal parameter of a procedure literal
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub laziness: Laziness,
}

impl Param {
    pub fn eager(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            laziness: Laziness::Eager,
        }
    }

    pub fn lazy(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            laziness: Laziness::Lazy,
        }
    }

    pub fn is_lazy(&self) -> bool {
        self.laziness == Laziness::Lazy
    }
}

/// Core expression type
///
/// `Prim` is a reference to a built-in operation; the reader resolves known
/// primitive names to it, so primitives are usable as first-class values
/// without ever being seeded into an environment.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Number literal
    Number(NumberType),
    /// Boolean literal
    Bool(bool),
    /// String literal
    String(String),
    /// Quoted datum, e.g. `'(1 2 3)`
    Quoted(Value),
    /// Variable reference
    Var(String),
    /// Primitive-operator reference
    Prim(String),
    /// Conditional; any non-`#f` test value selects the consequent
    If {
        test: Box<Expr>,
        then: Box<Expr>,
        alt: Box<Expr>,
    },
    /// Procedure literal with per-parameter laziness and a body sequence
    Lambda { params: Vec<Param>, body: Vec<Expr> },
    /// Simultaneous, non-recursive binding form
    Let {
        bindings: Vec<(String, Expr)>,
        body: Vec<Expr>,
    },
    /// Recursive binding form (two-phase initialization)
    Letrec {
        bindings: Vec<(String, Expr)>,
        body: Vec<Expr>,
    },
    /// Assignment to an existing binding
    Set { name: String, value: Box<Expr> },
    /// Procedure application
    Apply { rator: Box<Expr>, rands: Vec<Expr> },
}

impl Expr {
    /// Literal expressions evaluate to a ground value without touching the
    /// environment. They are evaluated eagerly even for lazy parameters,
    /// since suspending them would buy nothing.
    pub(crate) fn is_literal(&self) -> bool {
        matches!(
            self,
            Expr::Number(_) | Expr::Bool(_) | Expr::String(_) | Expr::Quoted(_) | Expr::Prim(_)
        )
    }
}

/// One top-level form of a program
#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    /// Top-level definition; adds or overwrites a global binding
    Define { name: String, value: Expr },
    Expr(Expr),
}

/// A sequence of top-level forms, evaluated left to right
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub forms: Vec<Form>,
}

impl Program {
    pub fn new(forms: Vec<Form>) -> Self {
        Program { forms }
    }
}

fn write_body(f: &mut fmt::Formatter, body: &[Expr]) -> fmt::Result {
    for expr in body {
        write!(f, " {expr}")?;
    }
    Ok(())
}

fn write_bindings(f: &mut fmt::Formatter, bindings: &[(String, Expr)]) -> fmt::Result {
    write!(f, "(")?;
    for (i, (name, rhs)) in bindings.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "({name} {rhs})")?;
    }
    write!(f, ")")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Number(n) => write_number(f, *n),
            Expr::Bool(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Expr::String(s) => write_escaped_string(f, s),
            Expr::Quoted(datum) => write!(f, "'{datum}"),
            Expr::Var(name) | Expr::Prim(name) => write!(f, "{name}"),
            Expr::If { test, then, alt } => write!(f, "(if {test} {then} {alt})"),
            Expr::Lambda { params, body } => {
                write!(f, "(lambda (")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    if param.is_lazy() {
                        write!(f, "({} lazy)", param.name)?;
                    } else {
                        write!(f, "{}", param.name)?;
                    }
                }
                write!(f, ")")?;
                write_body(f, body)?;
                write!(f, ")")
            }
            Expr::Let { bindings, body } => {
                write!(f, "(let ")?;
                write_bindings(f, bindings)?;
                write_body(f, body)?;
                write!(f, ")")
            }
            Expr::Letrec { bindings, body } => {
                write!(f, "(letrec ")?;
                write_bindings(f, bindings)?;
                write_body(f, body)?;
                write!(f, ")")
            }
            Expr::Set { name, value } => write!(f, "(set! {name} {value})"),
            Expr::Apply { rator, rands } => {
                write!(f, "({rator}")?;
                for rand in rands {
                    write!(f, " {rand}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Form::Define { name, value } => write!(f, "(define {name} {value})"),
            Form::Expr(expr) => write!(f, "{expr}"),
        }
    }
}
