//! Dao interpreter command-line.
//!
//! Without arguments it drops into an interactive read-evaluate-print
//! loop.  With a single argument it prints the version or help text, or
//! evaluates the argument as a source file.

use std::env;
use std::fs;
use std::io;
use std::io::prelude::*;

use anyhow::Context as _;

use dao::eval::Evaluator;
use dao::interpreter::{DaoError, Interpreter};
use dao::lexer::Lexer;
use dao::parser::Parser;
use dao::value::{Env, Value};

const PROMPT: &str = "|☰☷☳☶☱☴☵☲|";

fn main() -> Result<(), anyhow::Error> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    match args.as_slice() {
        [arg] => match arg.as_str() {
            "-v" | "-V" | "version" => println!("v{}", env!("CARGO_PKG_VERSION")),
            "-h" | "help" => help(),
            path => run_file(path)?,
        },
        _ => run_prompt()?,
    }
    Ok(())
}

fn help() {
    println!("Dao interpreter usage:");
    println!();
    println!("dao -h:            help list;");
    println!("dao:               run the interpreter;");
    println!("dao <source file>: eval the source file");
}

/// Parse errors are reported but do not prevent evaluation of whatever
/// AST the parser produced.
fn run_file(path: &str) -> Result<(), anyhow::Error> {
    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?;

    let mut parser = Parser::new(Lexer::new(&source));
    let program = parser.parse();
    for msg in parser.errors() {
        println!("\t{}", msg);
    }

    let mut stdout = io::stdout();
    let env = Env::new();
    let res = Evaluator::new(&mut stdout).eval_program(&program, &env);
    if !matches!(res, Value::Nil) {
        writeln!(stdout, "{}", res)?;
    }
    Ok(())
}

fn run_prompt() -> Result<(), anyhow::Error> {
    let user = env::var("USER").unwrap_or_else(|_| "friend".to_string());
    println!("Hey {}! welcome to the Dao programming language!", user);
    println!("current version: v{}", env!("CARGO_PKG_VERSION"));
    help();

    let stdin = io::stdin();
    let mut repl_stdout = io::stdout();
    let mut interp_stdout = io::stdout();
    let mut interp = Interpreter::new(&mut interp_stdout);

    let mut input = String::new();
    loop {
        repl_stdout.write_all(PROMPT.as_bytes())?;
        repl_stdout.flush()?;

        input.clear();
        let nbytes = stdin.read_line(&mut input)?;
        if nbytes == 0 {
            break;
        }

        match interp.eval(&input) {
            Ok(Value::Nil) => (),
            Ok(res) => println!("{}", res),
            Err(DaoError::Parse(errors)) => {
                for msg in errors {
                    println!("\t{}", msg);
                }
            }
        }
    }

    Ok(())
}
