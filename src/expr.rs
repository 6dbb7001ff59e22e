use serde::Serialize;

use crate::token::Token;

#[derive(Debug, Clone, Serialize)]
pub enum Expr {
    // Integer literal; the lexeme is parsed at evaluation time
    Int(Token),

    // Float literal; the lexeme is parsed at evaluation time
    Float(Token),

    // String literal, contents carried by the STRING token
    Str(Token),

    // `True` / `False`
    Bool(Token),

    // `None`
    None(Token),

    // Reference to a name in the scope chain
    Variable(Token),

    // `name = value`
    Assign(Token, Box<Expr>),

    // Used to parse Binary expressions, including `and` / `or`
    Binary(Box<Expr>, Token, Box<Expr>),

    // Used to parse Unary expressions (`-`, `not`)
    Unary(Token, Box<Expr>),

    // Callee, closing paren (for error lines), arguments
    Call(Box<Expr>, Token, Vec<Expr>),

    // `object.name`
    Get(Box<Expr>, Token),

    // `object.name = value`
    Set(Box<Expr>, Token, Box<Expr>),
}

impl Expr {
    pub fn line(&self) -> usize {
        match self {
            Expr::Int(token)
            | Expr::Float(token)
            | Expr::Str(token)
            | Expr::Bool(token)
            | Expr::None(token)
            | Expr::Variable(token) => token.line,

            Expr::Assign(token, _) => token.line,

            Expr::Binary(_, token, _) => token.line,

            Expr::Unary(token, _) => token.line,

            Expr::Call(_, token, _) => token.line,

            Expr::Get(_, token) => token.line,

            Expr::Set(_, token, _) => token.line,
        }
    }
}
