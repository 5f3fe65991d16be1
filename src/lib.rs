//! Lazuli - a Scheme-like interpreter with selective laziness
//!
//! This crate implements a small tree-walking interpreter for a Scheme-like
//! language with closures, mutable variable bindings (`set!`), and a
//! per-parameter laziness annotation:
//!
//! ```scheme
//! (define loop (lambda (x) (loop x)))
//! ((lambda ((f lazy)) 1) (loop 0))   ; => 1, the argument is never evaluated
//! ```
//!
//! Most arguments are passed eagerly. An argument bound to a parameter
//! declared `(name lazy)` is instead suspended as a thunk capturing the
//! caller's environment, and is forced only when its value is actually
//! demanded - by a primitive application, a conditional test, or any other
//! strict position. Thunks are not memoized: forcing one re-evaluates its
//! expression every time, so a lazy argument with side effects runs once per
//! force.
//!
//! ## Evaluation model
//!
//! Environments are chains of frames holding named mutable cells. Closures
//! and thunks capture their defining environment by reference, so mutation
//! through `set!` is visible to every closure sharing a frame. Top-level
//! `define` grows a distinguished global frame; all other frames are fixed
//! in membership once created.
//!
//! ## Modules
//!
//! - `ast`: the expression tree consumed by the evaluator
//! - `value`: runtime values (including closures and thunks)
//! - `env`: environment frames and mutable binding cells
//! - `primitives`: the fixed table of built-in strict operations
//! - `evaluator`: the recursive dispatch and application protocol
//! - `reader`: S-expression parsing from text (feature `reader`)

use std::fmt;

/// Maximum parsing depth to prevent stack overflow from deeply nested input
pub const MAX_PARSE_DEPTH: usize = 32;

/// Maximum evaluation depth. Runaway eager recursion surfaces as a typed
/// error well before the host call stack is exhausted; recursion the guard
/// cannot see (host stack exhaustion) remains fatal and is not representable
/// as an error value.
pub const MAX_EVAL_DEPTH: usize = 512;

/// Categorizes the different kinds of parsing errors.
#[derive(Debug, PartialEq, Clone)]
pub enum ParseErrorKind {
    /// Invalid or unexpected syntax (bad tokens, malformed expressions)
    InvalidSyntax,
    /// Input ended before the expression was complete (EOF, unterminated string, unclosed parens)
    Incomplete,
    /// Expression nesting exceeded the maximum parse depth
    TooDeeplyNested,
    /// Extra input found after a complete, valid expression
    TrailingContent,
    /// Valid Scheme syntax that is intentionally not supported in this implementation
    Unsupported,
}

/// A structured error providing detailed information about a parsing failure.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Context snippet from the input showing where the error occurred (max 100 chars)
    pub context: Option<String>,
    /// The problematic token or datum encountered, if identifiable
    pub found: Option<String>,
}

impl ParseError {
    /// Create a ParseError with all fields
    pub fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        context: Option<String>,
        found: Option<String>,
    ) -> Self {
        ParseError {
            kind,
            message: message.into(),
            context,
            found,
        }
    }

    /// Create a simple ParseError with a kind and message but no context
    pub fn from_message(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message, None, None)
    }

    /// Create a ParseError with the offending datum recorded in `found`
    pub fn with_found(
        kind: ParseErrorKind,
        message: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::new(kind, message, None, Some(found.into()))
    }

    /// Create a ParseError with context extracted from input at a given offset
    pub fn with_context(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        error_offset: usize,
    ) -> Self {
        const MAX_CONTEXT: usize = 100;

        // Try to show some context before the error position
        let context_start = error_offset.saturating_sub(20);

        let context_str: String = input
            .chars()
            .skip(context_start)
            .take(MAX_CONTEXT)
            .collect();

        let mut display_context = String::new();
        if context_start > 0 {
            display_context.push_str("[...]");
        }
        display_context.push_str(&context_str);
        if context_start + context_str.len() < input.len() {
            display_context.push_str("[...]");
        }

        // Replace newlines with visible markers for better error display
        let display_context = display_context.replace('\n', "\\n").replace('\r', "");

        Self::new(kind, message, Some(display_context), None)
    }
}

/// Error types for the interpreter.
///
/// Every evaluation operation returns either a value or one of these; no
/// error is raised as a panic or aborts the host process. A sub-evaluation
/// error short-circuits its containing form: conditionals do not evaluate
/// branches after an erroring test, applications do not apply after an
/// erroring operator or argument, and binding forms do not evaluate their
/// body after an erroring right-hand side.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    ParseError(ParseError),
    /// Variable reference or `set!` target not found in any enclosing frame
    UnboundVariable(String),
    /// Application operator is neither a primitive nor a closure
    NotAProcedure(String),
    /// Type mismatch for a primitive operation
    TypeError(String),
    /// Primitive-operator reference naming no registered operation
    UnknownPrimitive(String),
    ArityError {
        expected: usize,
        got: usize,
        expression: Option<String>, // Optional expression context
    },
    /// A program sequence with no forms
    EmptyProgram,
    /// Defensive case for expression trees the evaluator does not recognize
    MalformedAst(String),
    /// Implementation limits exceeded (evaluation depth)
    EvalError(String),
}

impl Error {
    /// Create an ArityError without expression context
    pub fn arity_error(expected: usize, got: usize) -> Self {
        Error::ArityError {
            expected,
            got,
            expression: None,
        }
    }

    /// Create an ArityError with expression context
    pub fn arity_error_with_expr(expected: usize, got: usize, expression: String) -> Self {
        Error::ArityError {
            expected,
            got,
            expression: Some(expression),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ParseError(e) => {
                write!(f, "ParseError: {}", e.message)?;
                if let Some(found) = &e.found {
                    write!(f, "\nFound: {found}")?;
                }
                if let Some(context) = &e.context {
                    write!(f, "\nContext: {context}")?;
                }
                Ok(())
            }
            Error::UnboundVariable(var) => write!(f, "Unbound variable: {var}"),
            Error::NotAProcedure(what) => write!(f, "Not a procedure: {what}"),
            Error::TypeError(msg) => write!(f, "Type error: {msg}"),
            Error::UnknownPrimitive(op) => write!(f, "Unknown primitive operator: {op}"),
            Error::ArityError {
                expected,
                got,
                expression,
            } => match expression {
                Some(expr) => write!(
                    f,
                    "ArityError: expression {expr}: expected {expected} arguments, got {got}"
                ),
                None => write!(
                    f,
                    "ArityError: procedure expected {expected} arguments but got {got}"
                ),
            },
            Error::EmptyProgram => write!(f, "Empty program"),
            Error::MalformedAst(msg) => write!(f, "Malformed expression: {msg}"),
            Error::EvalError(msg) => write!(f, "EvaluationError: {msg}"),
        }
    }
}

pub mod ast;
pub mod env;
pub mod evaluator;
pub mod primitives;
pub mod value;

#[cfg(feature = "reader")]
pub mod reader;
