use lazuli::env::{Env, create_global_env};
use lazuli::evaluator::evaluate_program;
use lazuli::primitives::all_primitives;
use lazuli::reader::parse_program;
use lazuli::value::Value;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::panic;
use std::process;

fn main() {
    let result = panic::catch_unwind(|| {
        run_repl();
    });

    if let Err(panic_info) = result {
        eprintln!("The REPL encountered an unexpected error and must exit.");

        if let Some(msg) = panic_info.downcast_ref::<&str>() {
            eprintln!("Error: {msg}");
        } else if let Some(msg) = panic_info.downcast_ref::<String>() {
            eprintln!("Error: {msg}");
        } else {
            eprintln!("Error: Unknown panic occurred");
        }

        process::exit(1);
    }
}

fn run_repl() {
    println!("Lazuli - a Scheme-like interpreter with selective laziness");
    println!("Enter expressions like: (+ 1 2)");
    println!("Mark a parameter lazy to defer its argument: ((lambda ((x lazy)) 1) (loop 0))");
    println!("Type :help for more commands, or Ctrl+C to exit.");
    println!();

    let mut rl = DefaultEditor::new().expect("Could not initialize REPL");
    let env = create_global_env();

    loop {
        match rl.readline("lazuli> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                // Add the line to history
                let _ = rl.add_history_entry(line);

                // Handle special commands
                match line {
                    ":help" => {
                        print_help();
                        continue;
                    }
                    ":env" => {
                        print_environment(&env);
                        continue;
                    }
                    ":quit" | ":exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {}
                }

                let result =
                    parse_program(line).and_then(|program| evaluate_program(&program, &env));

                match result {
                    Ok(result) => {
                        // Don't print the no-value marker (e.g., from define)
                        if !matches!(result, Value::Void) {
                            println!("{result}");
                        }
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }

            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }
}

fn print_help() {
    println!("Lazuli interpreter:");
    println!("  :help      - Show this help message");
    println!("  :env       - Show global bindings and primitive operations");
    println!("  :quit      - Exit the interpreter");
    println!("  :exit      - Exit the interpreter");
    println!("  Ctrl+C     - Exit the interpreter");
    println!();
    println!("Forms:");
    println!("  Literals: 42, 2.5, #t/#f, \"strings\", '(quoted data)");
    println!("  Conditionals: (if test then else) - any non-#f test is true");
    println!("  Procedures: (lambda (x (y lazy)) body...)");
    println!("  Bindings: (let ((x 1)) ...), (letrec ((f ...)) ...)");
    println!("  Mutation: (set! x value)");
    println!("  Definitions: (define name value) at the top level");
    println!();
    println!("Primitives:");
    println!("  Arithmetic: +, -, *, /");
    println!("  Comparison: <, >, =");
    println!("  Equality: eq?, string=?");
    println!("  Lists: cons, car, cdr");
    println!("  Predicates: list?, number?, boolean?, symbol?, string?, not");
    println!();
    println!("Examples:");
    println!("  (define make-adder (lambda (n) (lambda (x) (+ x n))))");
    println!("  ((make-adder 5) 3)");
    println!("  (letrec ((f (lambda (n) (if (= n 0) 1 (* n (f (- n 1))))))) (f 5))");
    println!();
}

fn print_environment(env: &Env) {
    // Primitives are not environment bindings, but listing them here is the
    // most useful answer to "what can I call?"
    let primitives = all_primitives();
    println!("Primitive operations ({}):", primitives.len());
    let mut col = 0;
    for op in primitives {
        print!("  {:<12}", op.name);
        col += 1;
        if col % 4 == 0 {
            println!();
        }
    }
    if col % 4 != 0 {
        println!();
    }
    println!();

    let bindings = env.global_frame().all_bindings();
    if bindings.is_empty() {
        println!("No global bindings defined.");
        return;
    }

    println!("Global bindings ({} total):", bindings.len());
    for (name, value) in bindings {
        println!("  {name} = {value}");
    }
}
