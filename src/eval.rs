//! Recursive evaluator.
//!
//! Evaluation dispatches on AST node variants against an [`Env`].  Two
//! value kinds have special propagation rules: an `Error` operand makes
//! the enclosing operation return it unchanged, and a `Return` produced
//! by a `return` statement travels through blocks untouched until the
//! program, a function call or a `for` loop unwraps it.

use std::io::Write;
use std::rc::Rc;

use crate::ast::{Block, Expr, Program, Stmt};
use crate::value::{Builtin, Env, FuncValue, Value};

/// Walks the AST and produces values.  Builtins that produce output write
/// to `output`, so tests capture it in a `Vec<u8>`.
#[derive(Debug)]
pub struct Evaluator<'t, W: Write> {
    output: &'t mut W,
}

impl<'t, W: Write> Evaluator<'t, W> {
    pub fn new(output: &'t mut W) -> Evaluator<'t, W> {
        Evaluator { output }
    }

    /// Evaluate a program.  A top-level `return` is unwrapped here; the
    /// caller never observes a `Return` value.
    pub fn eval_program(&mut self, program: &Program, env: &Env) -> Value {
        let mut res = Value::Nil;
        for stmt in &program.statements {
            res = self.eval_stmt(stmt, env);
            match res {
                Value::Return(inner) => return *inner,
                Value::Error(msg) => return Value::Error(msg),
                _ => (),
            }
        }
        res
    }

    fn eval_stmt(&mut self, stmt: &Stmt, env: &Env) -> Value {
        match stmt {
            Stmt::Expr(e) => self.eval_expr(e, env),
            Stmt::Var { name, value, .. } => {
                let val = self.eval_expr(value, env);
                if val.is_error() {
                    return val;
                }
                env.set(name, val);
                Value::Nil
            }
            Stmt::Assign { name, value } => {
                let val = self.eval_expr(value, env);
                if val.is_error() {
                    return val;
                }
                assign(env, name, val);
                Value::Nil
            }
            Stmt::Return(e) => {
                let val = self.eval_expr(e, env);
                if val.is_error() {
                    return val;
                }
                Value::Return(Box::new(val))
            }
            Stmt::For { header, body } => self.eval_for(header, body, env),
        }
    }

    /// Blocks hand `Return` upward without unwrapping it.
    fn eval_block(&mut self, block: &Block, env: &Env) -> Value {
        let mut res = Value::Nil;
        for stmt in &block.statements {
            res = self.eval_stmt(stmt, env);
            if matches!(res, Value::Return(_) | Value::Error(_)) {
                return res;
            }
        }
        res
    }

    fn eval_expr(&mut self, expr: &Expr, env: &Env) -> Value {
        match expr {
            Expr::Int(n) => Value::Int(*n),
            Expr::Bool(b) => Value::Bool(*b),
            Expr::Str(s) => Value::Str(s.clone()),
            Expr::Nil => Value::Nil,
            Expr::Ident(name) => eval_ident(name, env),
            Expr::Prefix { op, right } => {
                let right = self.eval_expr(right, env);
                if right.is_error() {
                    return right;
                }
                eval_prefix(op, right)
            }
            Expr::Infix { op, left, right } => {
                let left = self.eval_expr(left, env);
                if left.is_error() {
                    return left;
                }
                let right = self.eval_expr(right, env);
                if right.is_error() {
                    return right;
                }
                eval_infix(op, left, right)
            }
            Expr::If {
                cond,
                consequence,
                options,
                alternative,
            } => self.eval_if(cond, consequence, options, alternative, env),
            Expr::Func {
                name,
                params,
                ret,
                body,
            } => {
                let func = Value::Func(Rc::new(FuncValue {
                    name: name.clone(),
                    params: params.clone(),
                    ret: ret.clone(),
                    body: body.clone(),
                    env: env.clone(),
                }));
                // A named literal also binds itself, enabling recursion
                // and `func f() {...}` declarations.
                if let Some(name) = name {
                    env.set(name, func.clone());
                }
                func
            }
            Expr::Call { callee, args } => {
                let callee = self.eval_expr(callee, env);
                if callee.is_error() {
                    return callee;
                }
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    let val = self.eval_expr(arg, env);
                    if val.is_error() {
                        return val;
                    }
                    evaluated.push(val);
                }
                self.apply_function(callee, evaluated)
            }
        }
    }

    fn eval_if(
        &mut self,
        cond: &Expr,
        consequence: &Block,
        options: &[(Expr, Block)],
        alternative: &Option<Block>,
        env: &Env,
    ) -> Value {
        let c = self.eval_expr(cond, env);
        if c.is_error() {
            return c;
        }
        if c.is_truthy() {
            return self.eval_block(consequence, env);
        }
        for (cond, block) in options {
            let c = self.eval_expr(cond, env);
            if c.is_error() {
                return c;
            }
            if c.is_truthy() {
                return self.eval_block(block, env);
            }
        }
        match alternative {
            Some(block) => self.eval_block(block, env),
            None => Value::Nil,
        }
    }

    /// Header length 0 loops unbounded, 1 is a while-loop, 3 is C-style:
    /// `var` header statements run once up front, the last statement is
    /// the condition, and the remaining non-`var` statements run after
    /// each iteration.  A `return` from the body ends the loop with the
    /// unwrapped inner value.
    fn eval_for(&mut self, header: &[Stmt], body: &Block, env: &Env) -> Value {
        if header.is_empty() {
            loop {
                let val = self.eval_block(body, env);
                match val {
                    Value::Return(inner) => return *inner,
                    Value::Error(msg) => return Value::Error(msg),
                    _ => (),
                }
            }
        }

        for stmt in header {
            if matches!(stmt, Stmt::Var { .. }) {
                let val = self.eval_stmt(stmt, env);
                if val.is_error() {
                    return val;
                }
            }
        }

        let mut val = Value::Nil;
        loop {
            let cond = self.eval_stmt(&header[header.len() - 1], env);
            if cond.is_error() {
                return cond;
            }
            if !cond.is_truthy() {
                break;
            }

            val = self.eval_block(body, env);
            match val {
                Value::Return(inner) => return *inner,
                Value::Error(msg) => return Value::Error(msg),
                _ => (),
            }

            for stmt in header {
                if !matches!(stmt, Stmt::Var { .. }) {
                    let step = self.eval_stmt(stmt, env);
                    if step.is_error() {
                        return step;
                    }
                }
            }
        }
        val
    }

    fn apply_function(&mut self, func: Value, args: Vec<Value>) -> Value {
        match func {
            Value::Func(f) => {
                if args.len() != f.params.len() {
                    return Value::Error(format!(
                        "wrong number of arguments. got={}, want={}",
                        args.len(),
                        f.params.len()
                    ));
                }
                // The call frame encloses the *captured* env, not the
                // caller's: lexical scoping.
                let call_env = Env::enclosed(&f.env);
                for (param, arg) in f.params.iter().zip(args) {
                    call_env.set(&param.name, arg);
                }
                match self.eval_block(&f.body, &call_env) {
                    Value::Return(inner) => *inner,
                    val => val,
                }
            }
            Value::Builtin(b) => (b.func)(&mut *self.output, args),
            val => Value::Error(format!("not a function: {}", val.type_name())),
        }
    }
}

fn eval_ident(name: &str, env: &Env) -> Value {
    if let Some(val) = env.get(name) {
        return val;
    }
    if let Some(b) = builtin(name) {
        return Value::Builtin(b);
    }
    Value::Error(format!("identifier not found: {}", name))
}

/// Assignment writes the current frame and, when the name lives in an
/// enclosing scope, that owning frame too — closures sharing a captured
/// variable all see the update.
fn assign(env: &Env, name: &str, val: Value) {
    let (_, owner) = env.get_with_env(name);
    env.set(name, val.clone());
    if let Some(owner) = owner {
        owner.set(name, val);
    }
}

fn eval_prefix(op: &str, right: Value) -> Value {
    match op {
        "!" => eval_bang(right),
        "-" => eval_minus(right),
        _ => Value::Error(format!("unknown operator: {} {}", op, right.type_name())),
    }
}

fn eval_bang(right: Value) -> Value {
    match right {
        Value::Bool(true) => Value::Bool(false),
        Value::Bool(false) => Value::Bool(true),
        Value::Nil => Value::Bool(true),
        _ => Value::Nil,
    }
}

fn eval_minus(right: Value) -> Value {
    match right {
        Value::Int(n) => Value::Int(-n),
        val => Value::Error(format!("unknown operator: -{}", val.type_name())),
    }
}

fn eval_infix(op: &str, left: Value, right: Value) -> Value {
    match (left, right) {
        (Value::Int(l), Value::Int(r)) => eval_int_infix(op, l, r),
        (Value::Str(l), Value::Str(r)) => eval_str_infix(op, l, r),
        (Value::Str(s), Value::Int(n)) => eval_repeat_infix(op, "STRING", "INT", s, n),
        (Value::Int(n), Value::Str(s)) => eval_repeat_infix(op, "INT", "STRING", s, n),
        (l, r) if op == "==" => Value::Bool(identity_eq(&l, &r)),
        (l, r) if op == "!=" => Value::Bool(!identity_eq(&l, &r)),
        (l, r) if l.type_name() != r.type_name() => Value::Error(format!(
            "type mismatch: {} {} {}",
            l.type_name(),
            op,
            r.type_name()
        )),
        (l, r) => Value::Error(format!(
            "unknown operator: {} {} {}",
            l.type_name(),
            op,
            r.type_name()
        )),
    }
}

// Division and modulo are native: dividing by zero traps like the host.
fn eval_int_infix(op: &str, l: i64, r: i64) -> Value {
    match op {
        "+" => Value::Int(l + r),
        "-" => Value::Int(l - r),
        "*" => Value::Int(l * r),
        "/" => Value::Int(l / r),
        "%" => Value::Int(l % r),
        "<" => Value::Bool(l < r),
        ">" => Value::Bool(l > r),
        "==" => Value::Bool(l == r),
        "!=" => Value::Bool(l != r),
        _ => Value::Error(format!("unknown operator: INT {} INT", op)),
    }
}

fn eval_str_infix(op: &str, l: String, r: String) -> Value {
    match op {
        "+" => Value::Str(l + &r),
        "<" => Value::Bool(l < r),
        ">" => Value::Bool(l > r),
        "==" => Value::Bool(l == r),
        "!=" => Value::Bool(l != r),
        _ => Value::Error(format!("unknown operator: STRING {} STRING", op)),
    }
}

/// `STRING * INT` (either order) repeats the string; `n <= 0` yields the
/// empty string.  No other operator accepts this pairing.
fn eval_repeat_infix(op: &str, lt: &str, rt: &str, s: String, n: i64) -> Value {
    if op == "*" {
        Value::Str(s.repeat(n.max(0) as usize))
    } else {
        Value::Error(format!("type mismatch: {} {} {}", lt, op, rt))
    }
}

/// Identity comparison for operand pairings the typed arms don't cover.
/// Works out to value comparison for the bool and nil singletons and to
/// pointer comparison for functions; everything else is unequal.
fn identity_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Bool(l), Value::Bool(r)) => l == r,
        (Value::Nil, Value::Nil) => true,
        (Value::Func(l), Value::Func(r)) => Rc::ptr_eq(l, r),
        (Value::Builtin(l), Value::Builtin(r)) => l == r,
        _ => false,
    }
}

/// Fixed builtin registry, consulted after environment lookup fails.
pub fn builtin(name: &str) -> Option<Builtin> {
    match name {
        "len" => Some(Builtin {
            name: "len",
            func: builtin_len,
        }),
        "echo" => Some(Builtin {
            name: "echo",
            func: builtin_echo,
        }),
        "puts" => Some(Builtin {
            name: "puts",
            func: builtin_puts,
        }),
        _ => None,
    }
}

fn builtin_len(_out: &mut dyn Write, args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return Value::Error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        ));
    }
    match &args[0] {
        Value::Str(s) => Value::Int(s.len() as i64),
        arg => Value::Error(format!(
            "argument to `len` not supported yet, got {}",
            arg.type_name()
        )),
    }
}

fn builtin_echo(out: &mut dyn Write, args: Vec<Value>) -> Value {
    for arg in &args {
        let _ = writeln!(out, "{}", arg);
    }
    Value::Nil
}

fn builtin_puts(out: &mut dyn Write, args: Vec<Value>) -> Value {
    for arg in &args {
        let _ = write!(out, "{}", arg);
    }
    let _ = writeln!(out);
    Value::Nil
}
