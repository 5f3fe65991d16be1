//! S-expression reader: source text to expression trees.
//!
//! Parsing happens in two stages. A `nom`-based reader first turns the input
//! into plain data ([`Value`] ground variants only), then a lowering pass
//! produces the tagged expression tree, recognizing the special forms (`if`,
//! `lambda`, `let`, `letrec`, `set!`, `quote`) and resolving known primitive
//! names to primitive references. Top-level `define` is handled only by
//! [`parse_program`]; anywhere else it is a parse error.
//!
//! The reader is the only producer of [`ParseError`] values; the evaluator
//! propagates them unchanged.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{cut, opt, recognize, value},
    error::ErrorKind,
    multi::separated_list0,
    sequence::{pair, preceded, terminated},
};

use crate::ast::{
    Expr, Form, NumberType, Param, Program, SYMBOL_SPECIAL_CHARS, is_valid_symbol,
};
use crate::primitives::find_primitive;
use crate::value::Value;
use crate::{Error, MAX_PARSE_DEPTH, ParseError, ParseErrorKind};

//
// Stage 1: datum reading
//

fn read_number(input: &str) -> IResult<&str, Value> {
    let (rest, number_str) = recognize(pair(
        opt(char('-')),
        pair(
            take_while1(|c: char| c.is_ascii_digit()),
            opt(pair(char('.'), take_while1(|c: char| c.is_ascii_digit()))),
        ),
    ))
    .parse(input)?;

    match number_str.parse::<NumberType>() {
        Ok(n) => Ok((rest, Value::Number(n))),
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Digit,
        ))),
    }
}

fn read_bool(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Bool(true), tag("#t")),
        value(Value::Bool(false), tag("#f")),
    ))
    .parse(input)
}

fn read_symbol(input: &str) -> IResult<&str, Value> {
    let mut symbol_chars =
        take_while1(|c: char| c.is_alphanumeric() || SYMBOL_SPECIAL_CHARS.contains(c));

    let (remaining, candidate) = symbol_chars.parse(input)?;

    if is_valid_symbol(candidate) {
        Ok((remaining, Value::Symbol(candidate.into())))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Alpha,
        )))
    }
}

fn read_string(input: &str) -> IResult<&str, Value> {
    let (mut remaining, _) = char('"').parse(input)?;
    let mut chars = Vec::new();

    loop {
        let mut char_iter = remaining.chars();
        match char_iter.next() {
            Some('"') => {
                return Ok((
                    char_iter.as_str(),
                    Value::String(chars.into_iter().collect()),
                ));
            }
            Some('\\') => {
                match char_iter.next() {
                    Some('n') => chars.push('\n'),
                    Some('t') => chars.push('\t'),
                    Some('r') => chars.push('\r'),
                    Some('\\') => chars.push('\\'),
                    Some('"') => chars.push('"'),
                    // Unknown or incomplete escape sequence. Past the opening
                    // quote this is definitely a string, so fail hard rather
                    // than letting `alt` retry other readers.
                    _ => {
                        return Err(nom::Err::Failure(nom::error::Error::new(
                            remaining,
                            ErrorKind::Char,
                        )));
                    }
                }
                remaining = char_iter.as_str();
            }
            Some(ch) => {
                chars.push(ch);
                remaining = char_iter.as_str();
            }
            None => {
                // End of input without a closing quote
                return Err(nom::Err::Failure(nom::error::Error::new(
                    remaining,
                    ErrorKind::Char,
                )));
            }
        }
    }
}

fn read_list(input: &str, depth: usize) -> IResult<&str, Value> {
    let (input, _) = char('(').parse(input)?;
    let (input, _) = multispace0.parse(input)?;
    let (input, elements) =
        separated_list0(multispace1, |i| read_datum(i, depth + 1)).parse(input)?;
    let (input, _) = multispace0.parse(input)?;
    // Once elements stop, only the closing paren can follow; `cut` keeps an
    // unclosed list from backtracking into the other readers
    let (input, _) = cut(char(')')).parse(input)?;
    Ok((input, Value::compound(elements)))
}

/// `'datum` reads as `(quote datum)`
fn read_quoted(input: &str, depth: usize) -> IResult<&str, Value> {
    let (input, _) = char('\'').parse(input)?;
    let (input, datum) = read_datum(input, depth + 1)?;
    Ok((
        input,
        Value::compound(vec![Value::Symbol("quote".into()), datum]),
    ))
}

fn read_datum(input: &str, depth: usize) -> IResult<&str, Value> {
    // A depth overrun is a hard failure: no reader can accept this position,
    // and backtracking would bury the real cause
    if depth >= MAX_PARSE_DEPTH {
        return Err(nom::Err::Failure(nom::error::Error::new(
            input,
            ErrorKind::TooLarge,
        )));
    }
    preceded(
        multispace0,
        alt((
            |i| read_quoted(i, depth),
            |i| read_list(i, depth),
            read_number,
            read_bool,
            read_string,
            read_symbol,
        )),
    )
    .parse(input)
}

/// Convert nom parsing errors to structured parse errors
fn map_nom_error(input: &str, err: nom::Err<nom::error::Error<&str>>) -> Error {
    let parse_error = match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let position = input.len().saturating_sub(e.input.len());
            match e.code {
                ErrorKind::TooLarge => ParseError::from_message(
                    ParseErrorKind::TooDeeplyNested,
                    format!("expression too deeply nested (max depth: {MAX_PARSE_DEPTH})"),
                ),
                _ if e.input.is_empty() => {
                    ParseError::from_message(ParseErrorKind::Incomplete, "unexpected end of input")
                }
                _ => {
                    let remaining: String = e.input.chars().take(10).collect();
                    ParseError::with_context(
                        ParseErrorKind::InvalidSyntax,
                        format!("invalid syntax near '{remaining}'"),
                        input,
                        position,
                    )
                }
            }
        }
        nom::Err::Incomplete(_) => {
            ParseError::from_message(ParseErrorKind::Incomplete, "incomplete input")
        }
    };
    Error::ParseError(parse_error)
}

//
// Stage 2: lowering data to expressions
//

fn invalid(message: impl Into<String>, found: &Value) -> Error {
    Error::ParseError(ParseError::with_found(
        ParseErrorKind::InvalidSyntax,
        message,
        format!("{found}"),
    ))
}

fn lower_expr(datum: &Value) -> Result<Expr, Error> {
    match datum {
        Value::Number(n) => Ok(Expr::Number(*n)),
        Value::Bool(b) => Ok(Expr::Bool(*b)),
        Value::String(s) => Ok(Expr::String(s.clone())),
        Value::Symbol(name) => {
            if find_primitive(name).is_some() {
                Ok(Expr::Prim(name.clone()))
            } else {
                Ok(Expr::Var(name.clone()))
            }
        }
        Value::EmptyList => Err(Error::ParseError(ParseError::from_message(
            ParseErrorKind::InvalidSyntax,
            "() is not a valid expression",
        ))),
        Value::Compound(items) => lower_compound(items.as_slice(), datum),
        // The reader never produces these; a hand-built datum can
        other => Err(Error::MalformedAst(format!(
            "unexpected datum in source: {other}"
        ))),
    }
}

fn lower_compound(items: &[Value], whole: &Value) -> Result<Expr, Error> {
    if let [Value::Symbol(head), args @ ..] = items {
        match head.as_str() {
            "quote" => return lower_quote(args, whole),
            "if" => return lower_if(args, whole),
            "lambda" => return lower_lambda(args, whole),
            "let" => return lower_let(args, whole, false),
            "letrec" => return lower_let(args, whole, true),
            "set!" => return lower_set(args, whole),
            "define" => {
                return Err(invalid("define is only allowed at the top level", whole));
            }
            _ => {}
        }
    }

    let rator = lower_expr(&items[0])?;
    let rands = items[1..]
        .iter()
        .map(lower_expr)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Expr::Apply {
        rator: Box::new(rator),
        rands,
    })
}

fn lower_quote(args: &[Value], whole: &Value) -> Result<Expr, Error> {
    match args {
        [datum] => Ok(Expr::Quoted(datum.clone())),
        _ => Err(Error::arity_error_with_expr(
            1,
            args.len(),
            format!("{whole}"),
        )),
    }
}

fn lower_if(args: &[Value], whole: &Value) -> Result<Expr, Error> {
    match args {
        [test, then, alt] => Ok(Expr::If {
            test: Box::new(lower_expr(test)?),
            then: Box::new(lower_expr(then)?),
            alt: Box::new(lower_expr(alt)?),
        }),
        _ => Err(Error::arity_error_with_expr(
            3,
            args.len(),
            format!("{whole}"),
        )),
    }
}

fn lower_lambda(args: &[Value], whole: &Value) -> Result<Expr, Error> {
    match args {
        [params, body @ ..] if !body.is_empty() => Ok(Expr::Lambda {
            params: lower_params(params)?,
            body: lower_body(body)?,
        }),
        _ => Err(invalid(
            "lambda expects a parameter list and a non-empty body",
            whole,
        )),
    }
}

fn lower_params(datum: &Value) -> Result<Vec<Param>, Error> {
    let items: &[Value] = match datum {
        Value::EmptyList => &[],
        Value::Compound(items) => items.as_slice(),
        Value::Symbol(_) => {
            // (lambda args body) collects all arguments in standard Scheme
            return Err(Error::ParseError(ParseError::with_found(
                ParseErrorKind::Unsupported,
                "variadic parameter lists are not supported",
                format!("{datum}"),
            )));
        }
        _ => return Err(invalid("lambda parameters must be a list", datum)),
    };

    let mut params: Vec<Param> = Vec::with_capacity(items.len());
    for item in items {
        let param = match item {
            Value::Symbol(name) => Param::eager(name.clone()),
            Value::Compound(decl) => match decl.as_slice() {
                [Value::Symbol(name), Value::Symbol(flag)] if flag.as_str() == "lazy" => {
                    Param::lazy(name.clone())
                }
                _ => {
                    return Err(invalid(
                        "parameter declarations are a name or (name lazy)",
                        item,
                    ));
                }
            },
            _ => {
                return Err(invalid(
                    "parameter declarations are a name or (name lazy)",
                    item,
                ));
            }
        };
        if params.iter().any(|p| p.name == param.name) {
            return Err(invalid(
                format!("duplicate parameter name: {}", param.name),
                datum,
            ));
        }
        params.push(param);
    }
    Ok(params)
}

fn lower_let(args: &[Value], whole: &Value, recursive: bool) -> Result<Expr, Error> {
    let keyword = if recursive { "letrec" } else { "let" };
    match args {
        [bindings, body @ ..] if !body.is_empty() => {
            let bindings = lower_bindings(bindings)?;
            let body = lower_body(body)?;
            Ok(if recursive {
                Expr::Letrec { bindings, body }
            } else {
                Expr::Let { bindings, body }
            })
        }
        _ => Err(invalid(
            format!("{keyword} expects a binding list and a non-empty body"),
            whole,
        )),
    }
}

fn lower_bindings(datum: &Value) -> Result<Vec<(String, Expr)>, Error> {
    let items: &[Value] = match datum {
        Value::EmptyList => &[],
        Value::Compound(items) => items.as_slice(),
        _ => return Err(invalid("bindings must be a list of (name value) pairs", datum)),
    };

    let mut bindings: Vec<(String, Expr)> = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Compound(binding) => match binding.as_slice() {
                [Value::Symbol(name), rhs] => {
                    if bindings.iter().any(|(bound, _)| bound == name) {
                        return Err(invalid(format!("duplicate binding name: {name}"), datum));
                    }
                    bindings.push((name.clone(), lower_expr(rhs)?));
                }
                _ => return Err(invalid("bindings must be (name value) pairs", item)),
            },
            _ => return Err(invalid("bindings must be (name value) pairs", item)),
        }
    }
    Ok(bindings)
}

fn lower_set(args: &[Value], whole: &Value) -> Result<Expr, Error> {
    match args {
        [Value::Symbol(name), value] => Ok(Expr::Set {
            name: name.clone(),
            value: Box::new(lower_expr(value)?),
        }),
        [_, _] => Err(invalid("set! target must be a symbol", whole)),
        _ => Err(Error::arity_error_with_expr(
            2,
            args.len(),
            format!("{whole}"),
        )),
    }
}

fn lower_body(body: &[Value]) -> Result<Vec<Expr>, Error> {
    body.iter().map(lower_expr).collect()
}

fn lower_form(datum: &Value) -> Result<Form, Error> {
    if let Value::Compound(items) = datum
        && let [Value::Symbol(head), args @ ..] = items.as_slice()
        && head.as_str() == "define"
    {
        return match args {
            [Value::Symbol(name), value] => Ok(Form::Define {
                name: name.clone(),
                value: lower_expr(value)?,
            }),
            [_, _] => Err(invalid("define expects a symbol name", datum)),
            _ => Err(Error::arity_error_with_expr(
                2,
                args.len(),
                format!("{datum}"),
            )),
        };
    }
    Ok(Form::Expr(lower_expr(datum)?))
}

//
// Public API
//

/// Parse a single expression from input. Trailing content is an error.
pub fn parse_expr(input: &str) -> Result<Expr, Error> {
    match terminated(|i| read_datum(i, 0), multispace0).parse(input) {
        Ok(("", datum)) => lower_expr(&datum),
        Ok((remaining, _)) => Err(Error::ParseError(ParseError::from_message(
            ParseErrorKind::TrailingContent,
            format!("unexpected input after expression: '{remaining}'"),
        ))),
        Err(err) => Err(map_nom_error(input, err)),
    }
}

/// Parse a whitespace-separated sequence of top-level forms.
///
/// An input with no forms parses to an empty program; deciding whether that
/// is an error belongs to the evaluator.
pub fn parse_program(input: &str) -> Result<Program, Error> {
    let mut forms = Vec::new();
    let mut rest = input;
    loop {
        if rest.trim_start().is_empty() {
            break;
        }
        match read_datum(rest, 0) {
            Ok((next, datum)) => {
                forms.push(lower_form(&datum)?);
                rest = next;
            }
            Err(err) => return Err(map_nom_error(input, err)),
        }
    }
    Ok(Program::new(forms))
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::value::{sym, val};

    /// Test result variants for comprehensive parsing tests
    #[derive(Debug)]
    enum ParseTestResult {
        Success(Expr),               // Parsing should succeed with this expression
        SpecificError(&'static str), // Parsing should fail with error containing this string
        Error,                       // Parsing should fail (any error)
    }
    use ParseTestResult::*;

    fn num(n: f64) -> Expr {
        Expr::Number(n)
    }

    fn var(name: &str) -> Expr {
        Expr::Var(name.into())
    }

    fn prim(name: &str) -> Expr {
        Expr::Prim(name.into())
    }

    fn app(rator: Expr, rands: Vec<Expr>) -> Expr {
        Expr::Apply {
            rator: Box::new(rator),
            rands,
        }
    }

    /// Run parse tests with round-trip validation: display -> parse -> equal
    fn run_parse_tests(test_cases: Vec<(&str, ParseTestResult)>) {
        for (i, (input, expected)) in test_cases.iter().enumerate() {
            let test_id = format!("Parse test #{}", i + 1);
            let result = parse_expr(input);

            match (result, expected) {
                (Ok(actual), Success(expected_expr)) => {
                    assert_eq!(actual, *expected_expr, "{test_id}: value mismatch");

                    let displayed = format!("{actual}");
                    let reparsed = parse_expr(&displayed).unwrap_or_else(|e| {
                        panic!("{test_id}: round-trip parse failed for '{displayed}': {e:?}")
                    });
                    assert_eq!(
                        reparsed, actual,
                        "{test_id}: round-trip mismatch for '{input}'"
                    );
                }
                (Err(_), Error) => {} // Generic error case passes
                (Err(err), SpecificError(expected_text)) => {
                    let error_msg = format!("{err}");
                    assert!(
                        error_msg.contains(expected_text),
                        "{test_id}: error should contain '{expected_text}', got: {error_msg}"
                    );
                }
                (Ok(actual), Error | SpecificError(_)) => {
                    panic!("{test_id}: expected error, got {actual:?}");
                }
                (Err(err), Success(_)) => {
                    panic!("{test_id}: expected success, got error {err:?}");
                }
            }
        }
    }

    #[test]
    #[expect(clippy::too_many_lines)] // Comprehensive test coverage is intentionally thorough
    fn test_parser_comprehensive() {
        let test_cases = vec![
            // ===== NUMBERS =====
            ("42", Success(num(42.0))),
            ("-5", Success(num(-5.0))),
            ("0", Success(num(0.0))),
            ("2.5", Success(num(2.5))),
            ("-0.25", Success(num(-0.25))),
            ("  42  ", Success(num(42.0))),
            ("3.", Error),     // Incomplete fraction
            ("123abc", Error), // Mixed number/symbol
            // ===== BOOLEANS =====
            ("#t", Success(Expr::Bool(true))),
            ("#f", Success(Expr::Bool(false))),
            ("#true", Error),
            ("#x", Error),
            // ===== STRINGS =====
            ("\"hello\"", Success(Expr::String("hello".into()))),
            ("\"\"", Success(Expr::String(String::new()))),
            (r#""a\nb""#, Success(Expr::String("a\nb".into()))),
            (r#""q\"q""#, Success(Expr::String("q\"q".into()))),
            (r#""back\\slash""#, Success(Expr::String("back\\slash".into()))),
            (r#""bad\x""#, Error),     // Unknown escape
            (r#""unterminated"#, Error),
            // ===== SYMBOLS: primitives resolve, everything else is a variable =====
            ("foo", Success(var("foo"))),
            ("+", Success(prim("+"))),
            ("eq?", Success(prim("eq?"))),
            ("string=?", Success(prim("string=?"))),
            ("list?", Success(prim("list?"))),
            ("my-proc!", Success(var("my-proc!"))),
            ("-abc", Success(var("-abc"))),
            ("test@home", Error),
            // ===== QUOTED DATA =====
            ("'foo", Success(Expr::Quoted(sym("foo")))),
            ("'42", Success(Expr::Quoted(val(42)))),
            ("'()", Success(Expr::Quoted(Value::EmptyList))),
            ("'(1 2 3)", Success(Expr::Quoted(val([1, 2, 3])))),
            (
                "(quote (a b))",
                Success(Expr::Quoted(Value::compound(vec![sym("a"), sym("b")]))),
            ),
            (
                "''x",
                Success(Expr::Quoted(Value::compound(vec![
                    sym("quote"),
                    sym("x"),
                ]))),
            ),
            ("(quote)", SpecificError("ArityError")),
            ("(quote a b)", SpecificError("ArityError")),
            // ===== APPLICATIONS =====
            ("(f)", Success(app(var("f"), vec![]))),
            ("(f 1 2)", Success(app(var("f"), vec![num(1.0), num(2.0)]))),
            ("(+ 1 2)", Success(app(prim("+"), vec![num(1.0), num(2.0)]))),
            (
                "((f 1) 2)",
                Success(app(app(var("f"), vec![num(1.0)]), vec![num(2.0)])),
            ),
            ("( f   1\t2 )", Success(app(var("f"), vec![num(1.0), num(2.0)]))),
            ("()", SpecificError("not a valid expression")),
            // ===== IF =====
            (
                "(if #t 1 2)",
                Success(Expr::If {
                    test: Box::new(Expr::Bool(true)),
                    then: Box::new(num(1.0)),
                    alt: Box::new(num(2.0)),
                }),
            ),
            ("(if #t 1)", SpecificError("ArityError")),
            ("(if)", SpecificError("ArityError")),
            ("(if #t 1 2 3)", SpecificError("ArityError")),
            // ===== LAMBDA =====
            (
                "(lambda (x) x)",
                Success(Expr::Lambda {
                    params: vec![Param::eager("x")],
                    body: vec![var("x")],
                }),
            ),
            (
                "(lambda () 42)",
                Success(Expr::Lambda {
                    params: vec![],
                    body: vec![num(42.0)],
                }),
            ),
            (
                "(lambda ((x lazy) y) y x)",
                Success(Expr::Lambda {
                    params: vec![Param::lazy("x"), Param::eager("y")],
                    body: vec![var("y"), var("x")],
                }),
            ),
            ("(lambda (x))", SpecificError("non-empty body")),
            ("(lambda)", SpecificError("non-empty body")),
            ("(lambda (x x) x)", SpecificError("duplicate parameter")),
            ("(lambda ((x lazy) x) x)", SpecificError("duplicate parameter")),
            ("(lambda args 1)", SpecificError("variadic")),
            ("(lambda (1 2) 3)", SpecificError("name or (name lazy)")),
            ("(lambda ((x eager)) x)", SpecificError("name or (name lazy)")),
            ("(lambda \"ps\" 1)", SpecificError("must be a list")),
            // ===== LET / LETREC =====
            (
                "(let ((x 1)) x)",
                Success(Expr::Let {
                    bindings: vec![("x".into(), num(1.0))],
                    body: vec![var("x")],
                }),
            ),
            (
                "(let () 1)",
                Success(Expr::Let {
                    bindings: vec![],
                    body: vec![num(1.0)],
                }),
            ),
            (
                "(letrec ((f (lambda (n) n))) (f 1))",
                Success(Expr::Letrec {
                    bindings: vec![(
                        "f".into(),
                        Expr::Lambda {
                            params: vec![Param::eager("n")],
                            body: vec![var("n")],
                        },
                    )],
                    body: vec![app(var("f"), vec![num(1.0)])],
                }),
            ),
            ("(let ((x 1)))", SpecificError("non-empty body")),
            ("(let x 1)", SpecificError("(name value) pairs")),
            ("(let ((x 1) (x 2)) x)", SpecificError("duplicate binding")),
            ("(let ((x)) x)", SpecificError("(name value) pairs")),
            ("(letrec ((1 2)) 3)", SpecificError("(name value) pairs")),
            // ===== SET! =====
            (
                "(set! x 1)",
                Success(Expr::Set {
                    name: "x".into(),
                    value: Box::new(num(1.0)),
                }),
            ),
            ("(set! 1 2)", SpecificError("must be a symbol")),
            ("(set! x)", SpecificError("ArityError")),
            ("(set! x 1 2)", SpecificError("ArityError")),
            // ===== DEFINE IS NOT AN EXPRESSION =====
            ("(define x 1)", SpecificError("top level")),
            ("(+ (define x 1) 2)", SpecificError("top level")),
            ("(lambda () (define x 1))", SpecificError("top level")),
            // ===== GENERAL ERROR CASES =====
            ("(1 2", SpecificError("end of input")),
            (")", Error),
            ("", Error),
            ("   ", Error),
            ("1 2", SpecificError("unexpected input after")),
        ];

        run_parse_tests(test_cases);
    }

    #[test]
    fn test_parse_program_sequences() {
        let program = parse_program("(define x 1) (+ x x)").unwrap();
        assert_eq!(program.forms.len(), 2);
        assert_eq!(
            program.forms[0],
            Form::Define {
                name: "x".into(),
                value: num(1.0),
            }
        );
        assert_eq!(
            program.forms[1],
            Form::Expr(app(prim("+"), vec![var("x"), var("x")]))
        );

        // A standalone expression is a one-form program
        let single = parse_program("42").unwrap();
        assert_eq!(single.forms, vec![Form::Expr(num(42.0))]);

        // No forms at all is fine for the parser; the evaluator decides
        assert_eq!(parse_program("").unwrap().forms, vec![]);
        assert_eq!(parse_program("  \n ").unwrap().forms, vec![]);

        // define with a non-symbol name
        match parse_program("(define 1 2)") {
            Err(crate::Error::ParseError(e)) => assert!(e.message.contains("symbol")),
            other => panic!("expected ParseError, got {other:?}"),
        }

        // Errors carry through from any form in the sequence
        assert!(parse_program("(+ 1 2) (if #t 1)").is_err());
        assert!(parse_program("(+ 1 2) (").is_err());
    }

    #[test]
    fn test_parser_depth_limits() {
        let parens_under_limit = format!(
            "{}1{}",
            "(".repeat(MAX_PARSE_DEPTH - 1),
            ")".repeat(MAX_PARSE_DEPTH - 1)
        );
        let parens_at_limit = format!(
            "{}1{}",
            "(".repeat(MAX_PARSE_DEPTH),
            ")".repeat(MAX_PARSE_DEPTH)
        );
        let quotes_at_limit = format!("{}a", "'".repeat(MAX_PARSE_DEPTH));

        match parse_expr(&parens_at_limit) {
            Err(crate::Error::ParseError(e)) => assert_eq!(e.kind, ParseErrorKind::TooDeeplyNested),
            other => panic!("expected depth error, got {other:?}"),
        }
        match parse_expr(&quotes_at_limit) {
            Err(crate::Error::ParseError(e)) => assert_eq!(e.kind, ParseErrorKind::TooDeeplyNested),
            other => panic!("expected depth error, got {other:?}"),
        }

        // Just under the limit parses; the nested applications are
        // syntactically valid even if meaningless to evaluate
        assert!(parse_expr(&parens_under_limit).is_ok());
    }

    #[test]
    fn test_parse_error_kinds() {
        match parse_expr(r#""unterminated"#) {
            Err(crate::Error::ParseError(e)) => assert_eq!(e.kind, ParseErrorKind::Incomplete),
            other => panic!("expected Incomplete, got {other:?}"),
        }
        match parse_expr("1 2") {
            Err(crate::Error::ParseError(e)) => assert_eq!(e.kind, ParseErrorKind::TrailingContent),
            other => panic!("expected TrailingContent, got {other:?}"),
        }
        match parse_expr("(lambda args 1)") {
            Err(crate::Error::ParseError(e)) => assert_eq!(e.kind, ParseErrorKind::Unsupported),
            other => panic!("expected Unsupported, got {other:?}"),
        }
    }
}
