use log::{debug, info};
use serde::Serialize;
use std::fmt;
use std::mem;

/// The different kinds of tokens recognized by the tinypy scanner.
///
/// Variants without data represent punctuation, keyword and layout tokens.
/// `STRING(String)` carries the literal contents with escapes already
/// resolved. `INT` and `FLOAT` keep their text in the token's lexeme; the
/// evaluator parses it. `NAME` is used for user‑defined identifiers.
/// `EOF` closes every stream.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Serialize)]
pub enum TokenType {
    /// '('
    LEFT_PAREN,

    /// ')'
    RIGHT_PAREN,

    /// ','
    COMMA,

    /// '.'
    DOT,

    /// ':'
    COLON,

    /// '+'
    PLUS,

    /// '-'
    MINUS,

    /// '*'
    STAR,

    /// '/'
    SLASH,

    /// '//'
    DOUBLE_SLASH,

    /// '%'
    PERCENT,

    /// '**'
    DOUBLE_STAR,

    /// '='
    EQUAL,

    /// '=='
    EQUAL_EQUAL,

    /// '!='
    BANG_EQUAL,

    /// '<'
    LESS,

    /// '<='
    LESS_EQUAL,

    /// '>'
    GREATER,

    /// '>='
    GREATER_EQUAL,

    /// An integer literal
    INT,

    /// A float literal
    FLOAT,

    /// A string literal (contents without quotes, escapes resolved)
    STRING(String),

    /// A user‑defined identifier
    NAME,

    TRUE,
    FALSE,
    NONE,
    AND,
    OR,
    NOT,
    IF,
    ELIF,
    ELSE,
    WHILE,
    BREAK,
    CONTINUE,
    DEF,
    RETURN,
    CLASS,
    PASS,
    PRINT,

    /// End of a logical line
    NEWLINE,

    /// Indentation increased
    INDENT,

    /// Indentation decreased by one level
    DEDENT,

    /// End‑of‑file marker
    EOF,
}

impl TokenType {
    /// Variant name without payload, as printed by `tokenize`.
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::LEFT_PAREN => "LEFT_PAREN",
            TokenType::RIGHT_PAREN => "RIGHT_PAREN",
            TokenType::COMMA => "COMMA",
            TokenType::DOT => "DOT",
            TokenType::COLON => "COLON",
            TokenType::PLUS => "PLUS",
            TokenType::MINUS => "MINUS",
            TokenType::STAR => "STAR",
            TokenType::SLASH => "SLASH",
            TokenType::DOUBLE_SLASH => "DOUBLE_SLASH",
            TokenType::PERCENT => "PERCENT",
            TokenType::DOUBLE_STAR => "DOUBLE_STAR",
            TokenType::EQUAL => "EQUAL",
            TokenType::EQUAL_EQUAL => "EQUAL_EQUAL",
            TokenType::BANG_EQUAL => "BANG_EQUAL",
            TokenType::LESS => "LESS",
            TokenType::LESS_EQUAL => "LESS_EQUAL",
            TokenType::GREATER => "GREATER",
            TokenType::GREATER_EQUAL => "GREATER_EQUAL",
            TokenType::INT => "INT",
            TokenType::FLOAT => "FLOAT",
            TokenType::STRING(_) => "STRING",
            TokenType::NAME => "NAME",
            TokenType::TRUE => "TRUE",
            TokenType::FALSE => "FALSE",
            TokenType::NONE => "NONE",
            TokenType::AND => "AND",
            TokenType::OR => "OR",
            TokenType::NOT => "NOT",
            TokenType::IF => "IF",
            TokenType::ELIF => "ELIF",
            TokenType::ELSE => "ELSE",
            TokenType::WHILE => "WHILE",
            TokenType::BREAK => "BREAK",
            TokenType::CONTINUE => "CONTINUE",
            TokenType::DEF => "DEF",
            TokenType::RETURN => "RETURN",
            TokenType::CLASS => "CLASS",
            TokenType::PASS => "PASS",
            TokenType::PRINT => "PRINT",
            TokenType::NEWLINE => "NEWLINE",
            TokenType::INDENT => "INDENT",
            TokenType::DEDENT => "DEDENT",
            TokenType::EOF => "EOF",
        }
    }
}

impl PartialEq for TokenType {
    /// Kinds match on variant alone; a `STRING` payload is ignored.
    fn eq(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

/// A scanned token, including its type, the source lexeme,
/// and the line number where it was found.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token {
    /// The category of this token.
    pub token_type: TokenType,

    /// The exact text from the source that produced this token.
    pub lexeme: String,

    /// 1‑based line number in the source.
    pub line: usize,
}

impl Token {
    pub fn new<S: Into<String>>(token_type: TokenType, lexeme: S, line: usize) -> Self {
        let lexeme: String = lexeme.into();

        debug!(
            "Creating new token: type={:?}, lexeme={:?}, line={}",
            token_type, lexeme, line
        );

        Self {
            token_type,
            lexeme,
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Layout tokens have no meaningful lexeme; print them as the scanner
        // would have seen them.
        let lexeme: &str = match self.token_type {
            TokenType::NEWLINE => "\\n",
            _ => &self.lexeme,
        };

        let literal: String = match &self.token_type {
            TokenType::STRING(s) => s.clone(),
            TokenType::INT => match self.lexeme.parse::<i64>() {
                Ok(n) => itoa::Buffer::new().format(n).to_string(),
                Err(_) => self.lexeme.clone(),
            },
            TokenType::FLOAT => match self.lexeme.parse::<f64>() {
                Ok(n) if n.fract() == 0.0 => format!("{:.1}", n),
                Ok(n) => n.to_string(),
                Err(_) => self.lexeme.clone(),
            },
            _ => "null".to_string(),
        };

        info!(
            "Formatted token: {} {} {}",
            self.token_type.name(),
            lexeme,
            literal
        );

        write!(f, "{} {} {}", self.token_type.name(), lexeme, literal)
    }
}
