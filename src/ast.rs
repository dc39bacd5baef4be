//! Abstract syntax tree.
//!
//! Statements and expressions are two closed sums.  `Display` is the
//! pretty-printer: printing a parse-error-free program and reparsing it
//! yields an equal tree.

use std::fmt;

/// A parsed source file or REPL line.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// A `{ ... }` statement sequence used as loop, branch and function body.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

/// A function parameter: name plus its (unenforced) type annotation.
#[derive(Debug, PartialEq, Clone)]
pub struct Param {
    pub name: String,
    pub ty: String,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Stmt {
    /// `var NAME [TYPE] = EXPR;`
    Var {
        name: String,
        ty: Option<String>,
        value: Expr,
    },
    /// `NAME = EXPR;`
    Assign { name: String, value: Expr },
    /// `return EXPR;`
    Return(Expr),
    /// Bare expression in statement position.
    Expr(Expr),
    /// `for [HEADER...] { BODY }` — the header holds 0, 1 or 3 statements
    /// in well-formed programs.
    For { header: Vec<Stmt>, body: Block },
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    Ident(String),
    Int(i64),
    Bool(bool),
    Str(String),
    Nil,
    Prefix {
        op: String,
        right: Box<Expr>,
    },
    Infix {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `if` with zero or more `else if` options and an optional `else`.
    If {
        cond: Box<Expr>,
        consequence: Block,
        options: Vec<(Expr, Block)>,
        alternative: Option<Block>,
    },
    /// Function literal; a name makes the evaluator bind it in the
    /// current environment.
    Func {
        name: Option<String>,
        params: Vec<Param>,
        ret: Option<String>,
        body: Block,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
}

fn write_statements(f: &mut fmt::Formatter<'_>, statements: &[Stmt]) -> fmt::Result {
    for (i, s) in statements.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", s)?;
    }
    Ok(())
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_statements(f, &self.statements)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_statements(f, &self.statements)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.ty)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Var { name, ty, value } => {
                write!(f, "var {}", name)?;
                if let Some(ty) = ty {
                    write!(f, " {}", ty)?;
                }
                write!(f, " = {};", value)
            }
            Stmt::Assign { name, value } => write!(f, "{} = {};", name, value),
            Stmt::Return(value) => write!(f, "return {};", value),
            Stmt::Expr(e) => write!(f, "{};", e),
            Stmt::For { header, body } => {
                write!(f, "for")?;
                for stmt in header {
                    write!(f, " {}", stmt)?;
                }
                write!(f, " {{ {} }}", body)
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => write!(f, "{}", name),
            Expr::Int(n) => write!(f, "{}", n),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Str(s) => write!(f, "\"{}\"", s),
            Expr::Nil => write!(f, "nil"),
            Expr::Prefix { op, right } => write!(f, "({}{})", op, right),
            Expr::Infix { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Expr::If {
                cond,
                consequence,
                options,
                alternative,
            } => {
                write!(f, "if {} {{ {} }}", cond, consequence)?;
                for (c, b) in options {
                    write!(f, " else if {} {{ {} }}", c, b)?;
                }
                if let Some(alt) = alternative {
                    write!(f, " else {{ {} }}", alt)?;
                }
                Ok(())
            }
            Expr::Func {
                name,
                params,
                ret,
                body,
            } => {
                write!(f, "func")?;
                if let Some(name) = name {
                    write!(f, " {}", name)?;
                }
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ")")?;
                if let Some(ret) = ret {
                    write!(f, " {}", ret)?;
                }
                write!(f, " {{ {} }}", body)
            }
            Expr::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_program_prints_as_empty_string() {
        assert_eq!(Program::default().to_string(), "");
    }

    #[test]
    fn var_statement_with_and_without_type() {
        let with_ty = Stmt::Var {
            name: "x".to_string(),
            ty: Some("int".to_string()),
            value: Expr::Int(5),
        };
        assert_eq!(with_ty.to_string(), "var x int = 5;");

        let without_ty = Stmt::Var {
            name: "x".to_string(),
            ty: None,
            value: Expr::Int(5),
        };
        assert_eq!(without_ty.to_string(), "var x = 5;");
    }

    #[test]
    fn infix_and_prefix_are_parenthesized() {
        let e = Expr::Infix {
            op: "+".to_string(),
            left: Box::new(Expr::Int(1)),
            right: Box::new(Expr::Prefix {
                op: "-".to_string(),
                right: Box::new(Expr::Int(2)),
            }),
        };
        assert_eq!(e.to_string(), "(1 + (-2))");
    }

    #[test]
    fn if_with_options_and_alternative() {
        let e = Expr::If {
            cond: Box::new(Expr::Bool(true)),
            consequence: Block {
                statements: vec![Stmt::Expr(Expr::Int(1))],
            },
            options: vec![(
                Expr::Bool(false),
                Block {
                    statements: vec![Stmt::Expr(Expr::Int(2))],
                },
            )],
            alternative: Some(Block {
                statements: vec![Stmt::Expr(Expr::Int(3))],
            }),
        };
        assert_eq!(
            e.to_string(),
            "if true { 1; } else if false { 2; } else { 3; }"
        );
    }

    #[test]
    fn function_literal_with_typed_params() {
        let e = Expr::Func {
            name: Some("add".to_string()),
            params: vec![
                Param {
                    name: "x".to_string(),
                    ty: "int".to_string(),
                },
                Param {
                    name: "y".to_string(),
                    ty: "int".to_string(),
                },
            ],
            ret: Some("int".to_string()),
            body: Block {
                statements: vec![Stmt::Expr(Expr::Infix {
                    op: "+".to_string(),
                    left: Box::new(Expr::Ident("x".to_string())),
                    right: Box::new(Expr::Ident("y".to_string())),
                })],
            },
        };
        assert_eq!(e.to_string(), "func add(x int, y int) int { (x + y); }");
    }

    #[test]
    fn for_statement_with_header() {
        let s = Stmt::For {
            header: vec![Stmt::Expr(Expr::Infix {
                op: "<".to_string(),
                left: Box::new(Expr::Ident("x".to_string())),
                right: Box::new(Expr::Int(10)),
            })],
            body: Block {
                statements: vec![Stmt::Assign {
                    name: "x".to_string(),
                    value: Expr::Infix {
                        op: "+".to_string(),
                        left: Box::new(Expr::Ident("x".to_string())),
                        right: Box::new(Expr::Int(1)),
                    },
                }],
            },
        };
        assert_eq!(s.to_string(), "for (x < 10); { x = (x + 1); }");
    }
}
