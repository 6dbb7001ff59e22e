//! Centralised error hierarchy for the **tinypy interpreter**.
//!
//! Every subsystem (scanner, parser, evaluator, CLI) converts its failure
//! modes into one of the variants defined here, which gives the crate a single
//! `Result<T>` alias and lets the binary wrap everything with `anyhow`.
//!
//! The module **does not** print diagnostics itself; the driver decides how an
//! error becomes text and an exit status.

use std::io;
use thiserror::Error;

use log::info;

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PyError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error: {message}")]
    Parse { message: String, line: usize },

    /// Left side of `=` is neither a name nor a property access.
    #[error("[line {line}] Error: Invalid assignment target")]
    InvalidAssignmentTarget { line: usize },

    /// A literal token whose text does not parse as its kind.
    #[error("[line {line}] Error: Invalid {kind} literal '{text}'")]
    LiteralParse {
        kind: &'static str,
        text: String,
        line: usize,
    },

    #[error("[line {line}] NameError: name '{name}' is not defined")]
    UndefinedName { name: String, line: usize },

    #[error("[line {line}] AttributeError: '{type_name}' object has no attribute '{name}'")]
    AttributeLookup {
        type_name: String,
        name: String,
        line: usize,
    },

    #[error("[line {line}] AttributeError: cannot set attribute '{name}' on '{type_name}' object")]
    AttributeAssign {
        type_name: String,
        name: String,
        line: usize,
    },

    #[error("[line {line}] TypeError: '{type_name}' object is not callable")]
    NotCallable { type_name: String, line: usize },

    /// `break`/`continue` (or a top-level `return`) that no enclosing
    /// construct consumed.
    #[error("SyntaxError: '{signal}' outside {context}")]
    UnhandledControlSignal {
        signal: &'static str,
        context: String,
    },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PyError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        PyError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", line, message);

        PyError::Parse { message, line }
    }

    pub fn undefined_name(name: &str, line: usize) -> Self {
        info!("Creating UndefinedName error: line={}, name={}", line, name);

        PyError::UndefinedName {
            name: name.to_string(),
            line,
        }
    }

    pub fn attribute_lookup(type_name: &str, name: &str, line: usize) -> Self {
        info!(
            "Creating AttributeLookup error: line={}, type={}, name={}",
            line, type_name, name
        );

        PyError::AttributeLookup {
            type_name: type_name.to_string(),
            name: name.to_string(),
            line,
        }
    }

    pub fn attribute_assign(type_name: &str, name: &str, line: usize) -> Self {
        info!(
            "Creating AttributeAssign error: line={}, type={}, name={}",
            line, type_name, name
        );

        PyError::AttributeAssign {
            type_name: type_name.to_string(),
            name: name.to_string(),
            line,
        }
    }

    pub fn not_callable(type_name: &str, line: usize) -> Self {
        info!("Creating NotCallable error: line={}, type={}", line, type_name);

        PyError::NotCallable {
            type_name: type_name.to_string(),
            line,
        }
    }

    pub fn unhandled_signal<S: Into<String>>(signal: &'static str, context: S) -> Self {
        let context: String = context.into();

        info!(
            "Creating UnhandledControlSignal error: signal={}, context={}",
            signal, context
        );

        PyError::UnhandledControlSignal { signal, context }
    }

    /// `true` for errors raised before evaluation starts (scanner/parser).
    /// The driver maps these to a different exit status than runtime errors.
    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            PyError::Lex { .. } | PyError::Parse { .. } | PyError::InvalidAssignmentTarget { .. }
        )
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, PyError>;
