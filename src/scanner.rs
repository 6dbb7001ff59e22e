//! Module `scanner` implements a one‑pass, streaming lexer for tinypy source.
//!
//! It transforms a byte slice (`&[u8]`) into a sequence of [`Token`]s, skipping
//! insignificant whitespace and comments, and emitting exactly one `EOF` token
//! at the end. Designed as a `FusedIterator`, it can be chained safely with
//! other iterator adapters.
//!
//! # Layout
//!
//! Blocks are delimited by indentation, so besides ordinary tokens the scanner
//! produces three layout tokens:
//!
//! - `NEWLINE` at the end of every logical line that produced a token.
//!   Blank lines and comment‑only lines produce nothing.
//! - `INDENT` when a logical line starts deeper than the enclosing one.
//! - `DEDENT`, once per closed level, when a line starts shallower.
//!
//! Newlines inside parentheses do not end the logical line. At end of input a
//! pending `NEWLINE` and all open `DEDENT`s are flushed before `EOF`.
//!
//! # Token recognition
//!
//! - Single‑character tokens: `(`, `)`, `,`, `.`, `:`, `+`, `-`, `%`.
//! - One‑or‑two‑character operators: `*`/`**`, `/`/`//`, `=`/`==`, `<`/`<=`,
//!   `>`/`>=`, and `!=` (a bare `!` is an error).
//! - String literals in single or double quotes with backslash escapes.
//! - Numeric literals: integer, or float when a fractional part follows.
//! - Identifiers/keywords resolved via a perfect‑hash `KEYWORDS` map.
//! - `#` comments skipped in bulk with `memchr`.

use crate::error::{PyError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::collections::VecDeque;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"True"     => TokenType::TRUE,
    b"False"    => TokenType::FALSE,
    b"None"     => TokenType::NONE,
    b"and"      => TokenType::AND,
    b"or"       => TokenType::OR,
    b"not"      => TokenType::NOT,
    b"if"       => TokenType::IF,
    b"elif"     => TokenType::ELIF,
    b"else"     => TokenType::ELSE,
    b"while"    => TokenType::WHILE,
    b"break"    => TokenType::BREAK,
    b"continue" => TokenType::CONTINUE,
    b"def"      => TokenType::DEF,
    b"return"   => TokenType::RETURN,
    b"class"    => TokenType::CLASS,
    b"pass"     => TokenType::PASS,
    b"print"    => TokenType::PRINT,
};

/// Column width a tab advances to.
const TAB_WIDTH: usize = 8;

/// A single pass **scanner / lexer** that converts raw UTF‑8 bytes into a
/// sequence of [`Token`]s.
pub struct Scanner<'a> {
    src: &'a [u8],              // entire source file
    start: usize,               // index of the *first* byte of the current lexeme
    curr: usize,                // index *one past* the last byte examined
    line: usize,                // 1‑based line counter (\n increments)
    pending: Option<TokenType>, // recognised token kind waiting to be emitted
    layout: VecDeque<Token>,    // queued NEWLINE/INDENT/DEDENT/EOF tokens
    indents: Vec<usize>,        // indentation widths of open blocks, never empty
    at_line_start: bool,        // next byte begins a physical line
    line_has_tokens: bool,      // current logical line emitted a real token
    paren_depth: usize,         // open '(' count; newlines ignored when > 0
    finished: bool,             // EOF has been queued
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `src`.
    #[inline]
    pub fn new(src: &'a [u8]) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
            layout: VecDeque::new(),
            indents: vec![0],
            at_line_start: true,
            line_has_tokens: false,
            paren_depth: 0,
            finished: false,
        }
    }

    /// Scan the whole input, stopping at the first error.
    pub fn scan_all(self) -> Result<Vec<Token>> {
        self.collect()
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    const fn len(&self) -> usize {
        self.src.len()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.len()
    }

    /// Advance one byte and return it.  Callers guard with [`is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.src[self.curr];
        self.curr += 1;
        b
    }

    /// Peek at the current byte without consuming it.  Returns `0` past EOF.
    #[inline(always)]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.src[self.curr]
        }
    }

    /// Peek one byte beyond [`peek`].  Safe at EOF.
    #[inline(always)]
    fn peek_next(&self) -> u8 {
        if self.curr + 1 >= self.len() {
            0
        } else {
            self.src[self.curr + 1]
        }
    }

    /// Conditionally consume a byte **iff** it matches `expected`.
    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn lexeme(&self) -> Result<&'a str> {
        std::str::from_utf8(&self.src[self.start..self.curr])
            .map_err(|_| PyError::lex(self.line, "Invalid UTF-8 in source"))
    }

    // ───────────────────────────── layout ──────────────────────────────────

    /// Measure the indentation of the line starting at `self.curr` and queue
    /// the `INDENT`/`DEDENT` tokens it implies.  Blank and comment‑only lines
    /// leave the indent stack untouched.
    fn handle_indentation(&mut self) -> Result<()> {
        let mut width: usize = 0;

        while !self.is_at_end() {
            match self.peek() {
                b' ' => width += 1,
                b'\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
                b'\x0c' => width = 0,
                _ => break,
            }

            self.advance();
        }

        if matches!(self.peek(), 0 | b'\n' | b'\r' | b'#') {
            return Ok(());
        }

        let current: usize = self.indents.last().copied().unwrap_or(0);

        if width > current {
            debug!("Indent {} -> {} on line {}", current, width, self.line);

            self.indents.push(width);
            self.layout
                .push_back(Token::new(TokenType::INDENT, "", self.line));
        } else if width < current {
            while self.indents.last().is_some_and(|&top| top > width) {
                self.indents.pop();
                self.layout
                    .push_back(Token::new(TokenType::DEDENT, "", self.line));
            }

            if self.indents.last().copied().unwrap_or(0) != width {
                return Err(PyError::lex(
                    self.line,
                    "Unindent does not match any outer indentation level",
                ));
            }

            debug!("Dedent to {} on line {}", width, self.line);
        }

        Ok(())
    }

    /// Queue the trailing `NEWLINE`, every open `DEDENT` and the final `EOF`.
    fn finish(&mut self) {
        if self.line_has_tokens {
            self.line_has_tokens = false;
            self.layout
                .push_back(Token::new(TokenType::NEWLINE, "", self.line));
        }

        while self.indents.len() > 1 {
            self.indents.pop();
            self.layout
                .push_back(Token::new(TokenType::DEDENT, "", self.line));
        }

        self.layout.push_back(Token::new(TokenType::EOF, "", self.line));
        self.finished = true;

        info!("Scanner reached end of input at line {}", self.line);
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan a *single* token starting at `self.curr`.  If the lexeme produces an
    /// actual token the kind is stored in `self.pending`.  Whitespace and
    /// comments are skipped by returning `Ok(())` with `pending = None`.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        match b {
            // ── single‑character punctuators ──────────────────────────────
            b'(' => {
                self.paren_depth += 1;
                self.pending = Some(TokenType::LEFT_PAREN);
            }
            b')' => {
                self.paren_depth = self.paren_depth.saturating_sub(1);
                self.pending = Some(TokenType::RIGHT_PAREN);
            }
            b',' => self.pending = Some(TokenType::COMMA),
            b'.' => self.pending = Some(TokenType::DOT),
            b':' => self.pending = Some(TokenType::COLON),
            b'+' => self.pending = Some(TokenType::PLUS),
            b'-' => self.pending = Some(TokenType::MINUS),
            b'%' => self.pending = Some(TokenType::PERCENT),

            // ── doubled operators (**, //) ───────────────────────────────
            b'*' => {
                let tt = if self.match_byte(b'*') {
                    TokenType::DOUBLE_STAR
                } else {
                    TokenType::STAR
                };

                self.pending = Some(tt);
            }

            b'/' => {
                let tt = if self.match_byte(b'/') {
                    TokenType::DOUBLE_SLASH
                } else {
                    TokenType::SLASH
                };

                self.pending = Some(tt);
            }

            // ── two‑character comparisons (!=, ==, <=, >=) ───────────────
            b'!' => {
                if !self.match_byte(b'=') {
                    return Err(PyError::lex(self.line, "Unexpected character: !"));
                }

                self.pending = Some(TokenType::BANG_EQUAL);
            }

            b'=' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::EQUAL_EQUAL
                } else {
                    TokenType::EQUAL
                };

                self.pending = Some(tt);
            }

            b'<' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::LESS_EQUAL
                } else {
                    TokenType::LESS
                };

                self.pending = Some(tt);
            }

            b'>' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::GREATER_EQUAL
                } else {
                    TokenType::GREATER
                };

                self.pending = Some(tt);
            }

            // ── whitespace / newline ─────────────────────────────────────
            b' ' | b'\r' | b'\t' | b'\x0c' => {
                return Ok(());
            }

            b'\n' => {
                let line: usize = self.line;
                self.line += 1;

                if self.paren_depth > 0 {
                    return Ok(());
                }

                self.at_line_start = true;

                if self.line_has_tokens {
                    self.line_has_tokens = false;
                    self.layout
                        .push_back(Token::new(TokenType::NEWLINE, "\n", line));
                }

                return Ok(());
            }

            // ── comments (# … until newline) ─────────────────────────────
            b'#' => {
                if let Some(pos) = memchr(b'\n', &self.src[self.curr..]) {
                    self.curr += pos;
                } else {
                    self.curr = self.len();
                }

                return Ok(());
            }

            // ── string literal ' … ' or " … " ────────────────────────────
            b'"' | b'\'' => {
                return self.parse_string(b);
            }

            // ── number literal (digit‑leading) ───────────────────────────
            b'0'..=b'9' => {
                self.parse_number();
            }

            // ── identifiers / keywords (alpha or underscore‑leading) ─────
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.parse_identifier();
            }

            // ── unexpected character ─────────────────────────────────────
            _ => {
                return Err(PyError::lex(
                    self.line,
                    format!("Unexpected character: {}", b as char),
                ));
            }
        }

        Ok(())
    }

    /// Parse a quoted string literal terminated by `quote`.
    ///
    /// * `self.start` still points to the opening quote.
    /// * When we return, `self.curr` points **past** the closing quote.
    fn parse_string(&mut self, quote: u8) -> Result<()> {
        let mut content: Vec<u8> = Vec::new();

        loop {
            if self.is_at_end() || self.peek() == b'\n' {
                return Err(PyError::lex(self.line, "Unterminated string."));
            }

            let b = self.advance();

            if b == quote {
                break;
            }

            if b != b'\\' {
                content.push(b);
                continue;
            }

            if self.is_at_end() {
                return Err(PyError::lex(self.line, "Unterminated string."));
            }

            match self.advance() {
                b'n' => content.push(b'\n'),
                b't' => content.push(b'\t'),
                b'r' => content.push(b'\r'),
                b'0' => content.push(b'\0'),
                b'\\' => content.push(b'\\'),
                b'\'' => content.push(b'\''),
                b'"' => content.push(b'"'),
                b'\n' => self.line += 1, // escaped newline continues the literal
                other => {
                    content.push(b'\\');
                    content.push(other);
                }
            }
        }

        let s: String = String::from_utf8(content)
            .map_err(|_| PyError::lex(self.line, "Invalid UTF-8 in string literal"))?;

        self.pending = Some(TokenType::STRING(s));

        Ok(())
    }

    /// Parse a numeric literal (`123`, `3.14`).  Fractions make it a `FLOAT`.
    fn parse_number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume "."

            while self.peek().is_ascii_digit() {
                self.advance();
            }

            self.pending = Some(TokenType::FLOAT);
        } else {
            self.pending = Some(TokenType::INT);
        }
    }

    /// Parse an identifier and decide if it is a **keyword** or a generic
    /// `NAME` token.
    fn parse_identifier(&mut self) {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphanumeric() || c == b'_'
        } {
            self.advance();
        }

        let slice: &[u8] = &self.src[self.start..self.curr];

        let tt: TokenType = KEYWORDS.get(slice).cloned().unwrap_or(TokenType::NAME);

        self.pending = Some(tt);
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // 1. Flush queued layout tokens first (they precede the lexeme
            //    that triggered them).
            if let Some(token) = self.layout.pop_front() {
                return Some(Ok(token));
            }

            if self.finished {
                return None;
            }

            // 2. Indentation is only significant outside parentheses.
            if self.at_line_start && self.paren_depth == 0 {
                self.at_line_start = false;

                if let Err(e) = self.handle_indentation() {
                    return Some(Err(e));
                }

                continue;
            }

            // 3. EOF guard – queue NEWLINE / DEDENTs / EOF.
            if self.is_at_end() {
                self.finish();
                continue;
            }

            // 4. Reset per‑token state and scan.
            self.start = self.curr;
            self.pending = None;

            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            // 5. If a real token was recognised, build and return it.
            if let Some(tt) = self.pending.take() {
                let lex: &str = match self.lexeme() {
                    Ok(lex) => lex,
                    Err(e) => return Some(Err(e)),
                };

                debug!("Scanned token ({:?}) on line {}", tt, self.line);

                self.line_has_tokens = true;

                return Some(Ok(Token::new(tt, lex, self.line)));
            }
            // Otherwise it was whitespace / comment / newline → continue loop.
        }
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
