//! A tree-walking interpreter for the Dao programming language.
//!
//! Dao is a small, statically-parsed but dynamically-typed imperative
//! language with first-class closures.  Source text is lexed into tokens,
//! parsed into an AST by a Pratt parser, and evaluated directly against a
//! lexically scoped environment chain.
//!
//! # Examples
//!
//! See [`crate::interpreter::Interpreter`].
//!
//! # Limitations
//!
//! - Type annotations are parsed but not enforced.
//! - `[` and `]` are lexed but have no parser rule.
//! - `break` is reserved but unused.

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]

pub mod interpreter;

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;
