//! API to control the interpreter.

use std::error::Error;
use std::fmt;
use std::io::Write;

use crate::eval::Evaluator;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::{Env, Value};

/// Tree-walk interpreter with a persistent environment.
///
/// Bindings survive across [`Interpreter::eval`] calls, which is what a
/// REPL session needs.
///
/// # Example
///
/// Invoke the interpreter a first time to define a function then
/// additional times to call this function:
///
/// ```
/// # use dao::interpreter::Interpreter;
///
/// let mut output: Vec<u8> = Vec::new();
/// let mut interp = Interpreter::new(&mut output);
///
/// let func_def = r#"
///     func max(x int, y int) int {
///         if x > y {
///             return x
///         } else {
///             return y
///         }
///     }
/// "#;
/// interp.eval(func_def).expect("interpreter error");
///
/// interp.eval("echo(max(10, 20))").expect("interpreter error");
/// interp.eval("echo(max(5, 4))").expect("interpreter error");
///
/// assert_eq!(output, b"20\n5\n");
/// ```
#[derive(Debug)]
pub struct Interpreter<'t, W: Write> {
    evaluator: Evaluator<'t, W>,
    env: Env,
}

/// Errors the interpreter can raise.
///
/// Evaluation errors are not represented here: they are in-band
/// [`Value::Error`] results, reported to the user through their echo
/// string.
#[derive(Debug)]
pub enum DaoError {
    /// Messages recorded during lexical and syntactic analysis.
    Parse(Vec<String>),
}

impl fmt::Display for DaoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaoError::Parse(msgs) => write!(f, "parse errors: {}", msgs.join("; ")),
        }
    }
}

impl Error for DaoError {}

impl<'t, W: Write> Interpreter<'t, W> {
    pub fn new(output: &'t mut W) -> Interpreter<'t, W> {
        Interpreter {
            evaluator: Evaluator::new(output),
            env: Env::new(),
        }
    }

    /// Lex, parse and evaluate `source` against the session environment.
    ///
    /// Any parser error aborts before evaluation.
    pub fn eval(&mut self, source: &str) -> Result<Value, DaoError> {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse();
        if !parser.errors().is_empty() {
            return Err(DaoError::Parse(parser.errors().to_vec()));
        }
        Ok(self.evaluator.eval_program(&program, &self.env))
    }
}
