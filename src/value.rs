//! Runtime values and the environment chain.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use crate::ast::{Block, Param};

/// A runtime value.
///
/// `Return` and `Error` are control-flow markers carried through the same
/// channel as ordinary values; user code never observes them.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
    Nil,
    Func(Rc<FuncValue>),
    Builtin(Builtin),
    Return(Box<Value>),
    Error(String),
}

/// A user-defined function together with the environment it captured.
pub struct FuncValue {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub ret: Option<String>,
    pub body: Block,
    pub env: Env,
}

// The captured env can reach back to the function itself; keep Debug
// output acyclic.
impl fmt::Debug for FuncValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncValue")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// A host function exposed to Dao programs.  Output-producing builtins
/// write to the evaluator's sink.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: fn(&mut dyn Write, Vec<Value>) -> Value,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).finish()
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Value {
    /// The type tag used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "INT",
            Value::Bool(_) => "BOOL",
            Value::Str(_) => "STRING",
            Value::Nil => "NIL",
            Value::Func(_) => "FUNC",
            Value::Builtin(_) => "BUILTIN",
            Value::Return(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
        }
    }

    /// Everything is truthy except `false` and `nil`.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::Nil)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(l), Value::Int(r)) => l == r,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Str(l), Value::Str(r)) => l == r,
            (Value::Nil, Value::Nil) => true,
            (Value::Func(l), Value::Func(r)) => Rc::ptr_eq(l, r),
            (Value::Builtin(l), Value::Builtin(r)) => l == r,
            (Value::Return(l), Value::Return(r)) => l == r,
            (Value::Error(l), Value::Error(r)) => l == r,
            _ => false,
        }
    }
}

/// The echo string shown by the REPL and the `echo`/`puts` builtins.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{}", s),
            Value::Nil => write!(f, "nil"),
            Value::Func(func) => {
                write!(f, "func")?;
                if let Some(name) = &func.name {
                    write!(f, " {}", name)?;
                }
                write!(f, "(")?;
                for (i, p) in func.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") {{\n{}\n}}", func.body)
            }
            Value::Builtin(_) => write!(f, "builtin function"),
            Value::Return(inner) => write!(f, "{}", inner),
            Value::Error(msg) => write!(f, "syntax error: {}", msg),
        }
    }
}

/// A lexical scope: a name-to-value map with an optional outer scope.
///
/// `Env` is a cheap handle; clones share the underlying frame.  Function
/// calls create a frame enclosed by the function's *captured* env, which
/// is what makes closures work.
#[derive(Debug, Clone, PartialEq)]
pub struct Env(Rc<EnvInner>);

#[derive(Debug, PartialEq)]
struct EnvInner {
    store: RefCell<HashMap<String, Value>>,
    outer: Option<Env>,
}

impl Env {
    pub fn new() -> Env {
        Env(Rc::new(EnvInner {
            store: RefCell::new(HashMap::new()),
            outer: None,
        }))
    }

    /// A fresh frame whose lookups fall back to `outer`.
    pub fn enclosed(outer: &Env) -> Env {
        Env(Rc::new(EnvInner {
            store: RefCell::new(HashMap::new()),
            outer: Some(outer.clone()),
        }))
    }

    /// Look `name` up, walking outward through enclosing scopes.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.0.store.borrow().get(name) {
            Some(v) => Some(v.clone()),
            None => self.0.outer.as_ref().and_then(|outer| outer.get(name)),
        }
    }

    /// Like [`Env::get`], but also reports the ancestor frame that owns
    /// the binding.  The frame is `None` when the current frame owns the
    /// binding or the name is unbound anywhere.
    pub fn get_with_env(&self, name: &str) -> (Option<Value>, Option<Env>) {
        if let Some(v) = self.0.store.borrow().get(name) {
            return (Some(v.clone()), None);
        }
        let mut next = self.0.outer.clone();
        while let Some(env) = next {
            let found = env.0.store.borrow().get(name).cloned();
            if let Some(v) = found {
                return (Some(v), Some(env));
            }
            next = env.0.outer.clone();
        }
        (None, None)
    }

    /// Bind `name` in the current frame, shadowing any outer binding.
    pub fn set(&self, name: &str, val: Value) {
        self.0.store.borrow_mut().insert(name.to_string(), val);
    }
}

impl Default for Env {
    fn default() -> Env {
        Env::new()
    }
}
