use std::rc::Rc;

use serde::Serialize;

use crate::expr::Expr;
use crate::token::Token;

#[derive(Debug, Clone, Serialize)]
pub enum Stmt {
    Expression(Expr),

    Print(Expr),

    Pass,

    Break(Token),

    Continue(Token),

    Return(Token, Option<Expr>), // keyword, optional value

    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        elif_branches: Vec<(Expr, Vec<Stmt>)>,
        else_branch: Option<Vec<Stmt>>,
    },

    While(Expr, Vec<Stmt>),

    // Bodies are shared with every Function value created from them.
    Function(Token, Vec<Token>, Rc<[Stmt]>), // name, parameters, body

    Class(Token, Vec<Stmt>), // name, body
}

/// Root of a parsed source file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
}
