pub mod ast_printer;
pub mod environment;
pub mod error;
pub mod expr;
pub mod interpreter;
pub mod operators;
pub mod parser;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod value;
