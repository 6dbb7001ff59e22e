/*!
Recursive‑descent parser for tinypy.

Time & space
------------
Every token is consumed exactly once via `advance()`, so parsing is Θ(n) in
the number of tokens. The AST holds one node per production; call‑stack depth
grows with syntactic nesting.

Logging policy
--------------
| Location                     | Level  | Purpose                                   |
|------------------------------|--------|-------------------------------------------|
| `Parser::new`, `parse`       | `info` | Lifecycle milestones.                     |
| `statement`, compound rules  | `debug`| Descent into grammar branches.            |

Grammar (EBNF, lowest precedence first)
---------------------------------------

```text
program     → statement* EOF ;
statement   → ifStmt | whileStmt | funDef | classDef | simpleStmt NEWLINE ;
simpleStmt  → "print" expression | "pass" | "break" | "continue"
            | "return" expression? | expression ;
suite       → NEWLINE INDENT statement+ DEDENT | simpleStmt NEWLINE ;
ifStmt      → "if" expression ":" suite
              ( "elif" expression ":" suite )* ( "else" ":" suite )? ;
whileStmt   → "while" expression ":" suite ;
funDef      → "def" NAME "(" parameters? ")" ":" suite ;
classDef    → "class" NAME ( "(" ")" )? ":" suite ;
parameters  → NAME ( "," NAME )* ;
expression  → assignment ;
assignment  → logic_or ( "=" assignment )? ;
logic_or    → logic_and ( "or" logic_and )* ;
logic_and   → logic_not ( "and" logic_not )* ;
logic_not   → "not" logic_not | comparison ;
comparison  → term ( ( "==" | "!=" | "<" | "<=" | ">" | ">=" ) term )* ;
term        → factor ( ( "+" | "-" ) factor )* ;
factor      → unary ( ( "*" | "/" | "//" | "%" ) unary )* ;
unary       → "-" unary | power ;
power       → call ( "**" unary )? ;
call        → primary ( "(" arguments? ")" | "." NAME )* ;
arguments   → expression ( "," expression )* ;
primary     → INT | FLOAT | STRING | "True" | "False" | "None" | NAME
            | "(" expression ")" ;
```
*/

use std::rc::Rc;

use crate::error::{PyError, Result};
use crate::expr::Expr;
use crate::stmt::{Program, Stmt};
use crate::token::{Token, TokenType};

use log::{debug, info};

const MAX_ARGS: usize = 255;

/// Top‑level parser over a scanned token stream.
///
/// The stream must end with an `EOF` token, as produced by
/// [`Scanner`](crate::scanner::Scanner).
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    /// Construct a new parser.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        if !matches!(tokens.last(), Some(t) if t.token_type == TokenType::EOF) {
            let line: usize = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::new(TokenType::EOF, "", line));
        }

        Self { tokens, current: 0 }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program.
    pub fn parse(&mut self) -> Result<Program> {
        info!("Beginning parse phase");

        let mut statements: Vec<Stmt> = Vec::new();

        self.skip_newlines();

        while !self.is_at_end() {
            statements.push(self.statement()?);
            self.skip_newlines();
        }

        info!("Parsed {} top-level statements", statements.len());

        Ok(Program { statements })
    }

    /// Parse input consisting of a single expression.
    pub fn parse_expression(&mut self) -> Result<Expr> {
        info!("Parsing single expression");

        self.skip_newlines();

        let expr: Expr = self.expression()?;

        self.skip_newlines();

        if !self.is_at_end() {
            return Err(PyError::parse(
                self.peek().line,
                format!("Unexpected '{}' after expression", self.peek().lexeme),
            ));
        }

        Ok(expr)
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> Result<Stmt> {
        debug!("Entering statement at line {}", self.peek().line);

        if self.matches(TokenType::IF) {
            self.if_statement()
        } else if self.matches(TokenType::WHILE) {
            self.while_statement()
        } else if self.matches(TokenType::DEF) {
            self.function()
        } else if self.matches(TokenType::CLASS) {
            self.class_declaration()
        } else if self.check(TokenType::INDENT) {
            Err(PyError::parse(self.peek().line, "Unexpected indent"))
        } else {
            let stmt: Stmt = self.simple_statement()?;
            self.end_of_line()?;
            Ok(stmt)
        }
    }

    fn simple_statement(&mut self) -> Result<Stmt> {
        if self.matches(TokenType::PRINT) {
            return Ok(Stmt::Print(self.expression()?));
        }

        if self.matches(TokenType::PASS) {
            return Ok(Stmt::Pass);
        }

        if self.matches(TokenType::BREAK) {
            return Ok(Stmt::Break(self.previous().clone()));
        }

        if self.matches(TokenType::CONTINUE) {
            return Ok(Stmt::Continue(self.previous().clone()));
        }

        if self.matches(TokenType::RETURN) {
            let keyword: Token = self.previous().clone();
            let value: Option<Expr> = if self.check(TokenType::NEWLINE) || self.is_at_end() {
                None
            } else {
                Some(self.expression()?)
            };

            return Ok(Stmt::Return(keyword, value));
        }

        Ok(Stmt::Expression(self.expression()?))
    }

    /// A simple statement must be followed by `NEWLINE` (or end of input).
    fn end_of_line(&mut self) -> Result<()> {
        if self.matches(TokenType::NEWLINE) || self.is_at_end() {
            return Ok(());
        }

        Err(PyError::parse(
            self.peek().line,
            format!("Expected end of line, found '{}'", self.peek().lexeme),
        ))
    }

    /// `":" suite`: an indented block, or one simple statement on the same
    /// line as the colon.
    fn suite(&mut self, what: &str) -> Result<Vec<Stmt>> {
        self.consume(TokenType::COLON, &format!("Expected ':' after {}", what))?;

        if !self.matches(TokenType::NEWLINE) {
            let stmt: Stmt = self.simple_statement()?;
            self.end_of_line()?;
            return Ok(vec![stmt]);
        }

        self.skip_newlines();
        self.consume(
            TokenType::INDENT,
            &format!("Expected an indented block after {}", what),
        )?;

        let mut statements: Vec<Stmt> = Vec::new();

        while !self.check(TokenType::DEDENT) && !self.is_at_end() {
            statements.push(self.statement()?);
            self.skip_newlines();
        }

        if !self.is_at_end() {
            self.consume(TokenType::DEDENT, "Expected dedent after block")?;
        }

        Ok(statements)
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        debug!("Parsing if statement");

        let condition: Expr = self.expression()?;
        let then_branch: Vec<Stmt> = self.suite("'if' condition")?;

        let mut elif_branches: Vec<(Expr, Vec<Stmt>)> = Vec::new();

        while self.matches(TokenType::ELIF) {
            let elif_condition: Expr = self.expression()?;
            let block: Vec<Stmt> = self.suite("'elif' condition")?;
            elif_branches.push((elif_condition, block));
        }

        let else_branch: Option<Vec<Stmt>> = if self.matches(TokenType::ELSE) {
            Some(self.suite("'else'")?)
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            elif_branches,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        debug!("Parsing while statement");

        let condition: Expr = self.expression()?;
        let body: Vec<Stmt> = self.suite("'while' condition")?;

        Ok(Stmt::While(condition, body))
    }

    fn function(&mut self) -> Result<Stmt> {
        let name: Token = self.consume(TokenType::NAME, "Expected function name")?;

        debug!("Parsing function '{}'", name.lexeme);

        self.consume(TokenType::LEFT_PAREN, "Expected '(' after function name")?;

        let mut parameters: Vec<Token> = Vec::new();
        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if parameters.len() >= MAX_ARGS {
                    return Err(PyError::parse(
                        name.line,
                        "Cannot have more than 255 parameters",
                    ));
                }

                parameters.push(self.consume(TokenType::NAME, "Expected parameter name")?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after parameters")?;

        let body: Vec<Stmt> = self.suite("function signature")?;

        Ok(Stmt::Function(name, parameters, Rc::from(body)))
    }

    fn class_declaration(&mut self) -> Result<Stmt> {
        let name: Token = self.consume(TokenType::NAME, "Expected class name")?;

        debug!("Parsing class '{}'", name.lexeme);

        // `class Name():` is accepted; base classes are not.
        if self.matches(TokenType::LEFT_PAREN) {
            self.consume(
                TokenType::RIGHT_PAREN,
                "Expected ')' after '(' in class definition",
            )?;
        }

        let body: Vec<Stmt> = self.suite("class name")?;

        Ok(Stmt::Class(name, body))
    }

    // ─────────────────────── expression rules ─────────────────────

    fn expression(&mut self) -> Result<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr> {
        let expr: Expr = self.logical_or()?;

        if self.matches(TokenType::EQUAL) {
            let equals: Token = self.previous().clone();
            let value: Expr = self.assignment()?;

            return match expr {
                Expr::Variable(name) => Ok(Expr::Assign(name, Box::new(value))),

                Expr::Get(object, name) => Ok(Expr::Set(object, name, Box::new(value))),

                target => {
                    debug!("Invalid assignment target before '{}'", equals.lexeme);
                    Err(PyError::InvalidAssignmentTarget {
                        line: target.line(),
                    })
                }
            };
        }

        Ok(expr)
    }

    fn logical_or(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.logical_and()?;

        while self.matches(TokenType::OR) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.logical_and()?;

            expr = Expr::Binary(Box::new(expr), operator, Box::new(right));
        }

        Ok(expr)
    }

    fn logical_and(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.logical_not()?;

        while self.matches(TokenType::AND) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.logical_not()?;

            expr = Expr::Binary(Box::new(expr), operator, Box::new(right));
        }

        Ok(expr)
    }

    fn logical_not(&mut self) -> Result<Expr> {
        if self.matches(TokenType::NOT) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.logical_not()?;

            return Ok(Expr::Unary(operator, Box::new(right)));
        }

        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.term()?;

        while self.matches(TokenType::EQUAL_EQUAL)
            || self.matches(TokenType::BANG_EQUAL)
            || self.matches(TokenType::LESS)
            || self.matches(TokenType::LESS_EQUAL)
            || self.matches(TokenType::GREATER)
            || self.matches(TokenType::GREATER_EQUAL)
        {
            let operator: Token = self.previous().clone();
            let right: Expr = self.term()?;

            expr = Expr::Binary(Box::new(expr), operator, Box::new(right));
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.factor()?;

        while self.matches(TokenType::PLUS) || self.matches(TokenType::MINUS) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.factor()?;

            expr = Expr::Binary(Box::new(expr), operator, Box::new(right));
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.unary()?;

        while self.matches(TokenType::STAR)
            || self.matches(TokenType::SLASH)
            || self.matches(TokenType::DOUBLE_SLASH)
            || self.matches(TokenType::PERCENT)
        {
            let operator: Token = self.previous().clone();
            let right: Expr = self.unary()?;

            expr = Expr::Binary(Box::new(expr), operator, Box::new(right));
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.matches(TokenType::MINUS) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.unary()?;

            return Ok(Expr::Unary(operator, Box::new(right)));
        }

        self.power()
    }

    /// `**` binds tighter than unary minus on its left and is right
    /// associative: `-2 ** 2 == -4`, `2 ** 3 ** 2 == 512`.
    fn power(&mut self) -> Result<Expr> {
        let expr: Expr = self.call()?;

        if self.matches(TokenType::DOUBLE_STAR) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.unary()?;

            return Ok(Expr::Binary(Box::new(expr), operator, Box::new(right)));
        }

        Ok(expr)
    }

    fn call(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.primary()?;

        loop {
            if self.matches(TokenType::LEFT_PAREN) {
                expr = self.finish_call(expr)?;
            } else if self.matches(TokenType::DOT) {
                let name: Token =
                    self.consume(TokenType::NAME, "Expected property name after '.'")?;

                expr = Expr::Get(Box::new(expr), name);
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr> {
        let mut arguments: Vec<Expr> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if arguments.len() >= MAX_ARGS {
                    return Err(PyError::parse(
                        self.peek().line,
                        "Cannot have more than 255 arguments",
                    ));
                }

                arguments.push(self.expression()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        let paren: Token = self.consume(TokenType::RIGHT_PAREN, "Expected ')' after arguments")?;

        Ok(Expr::Call(Box::new(callee), paren, arguments))
    }

    fn primary(&mut self) -> Result<Expr> {
        let token: Token = self.peek().clone();

        let expr: Expr = match token.token_type {
            TokenType::INT => Expr::Int(token),
            TokenType::FLOAT => Expr::Float(token),
            TokenType::STRING(_) => Expr::Str(token),
            TokenType::TRUE | TokenType::FALSE => Expr::Bool(token),
            TokenType::NONE => Expr::None(token),
            TokenType::NAME => Expr::Variable(token),

            TokenType::LEFT_PAREN => {
                self.advance();

                let expr: Expr = self.expression()?;

                self.consume(TokenType::RIGHT_PAREN, "Expected ')' after expression")?;

                return Ok(expr);
            }

            _ => {
                let found: &str = match token.token_type {
                    TokenType::NEWLINE => "end of line",
                    TokenType::EOF => "end of input",
                    _ => &token.lexeme,
                };

                return Err(PyError::parse(
                    token.line,
                    format!("Expected expression, found '{}'", found),
                ));
            }
        };

        self.advance();

        Ok(expr)
    }

    // ────────────────────── utility helpers ───────────────────────

    fn skip_newlines(&mut self) {
        while self.matches(TokenType::NEWLINE) {}
    }

    #[inline(always)]
    fn matches(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();

            return true;
        }

        false
    }

    #[inline(always)]
    fn consume(&mut self, ttype: TokenType, message: &str) -> Result<Token> {
        if self.check(ttype) {
            return Ok(self.advance().clone());
        }

        debug!(
            "consume failed: expected {:?}, found {:?}",
            message,
            self.peek().token_type
        );

        Err(PyError::parse(self.peek().line, message))
    }

    #[inline(always)]
    fn check(&self, ttype: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().token_type == ttype
    }

    #[inline(always)]
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::EOF)
    }

    #[inline(always)]
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    #[inline(always)]
    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }
}
