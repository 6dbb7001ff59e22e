use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use tinypy::ast_printer::AstPrinter;
use tinypy::error::PyError;
use tinypy::interpreter::Interpreter;
use tinypy::parser::Parser;
use tinypy::scanner::Scanner;
use tinypy::stmt::Program;
use tinypy::token::Token;

/// Exit status for lexical and syntax errors.
const EXIT_SYNTAX: i32 = 65;

/// Exit status for runtime errors.
const EXIT_RUNTIME: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "tinypy language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable debug logging to a file
    #[arg(long, global = true)]
    log: bool,

    /// File that --log writes to
    #[arg(long, global = true, value_name = "PATH", default_value = "app.log")]
    log_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the token stream of a source file, one token per line
    Tokenize {
        filename: Option<PathBuf>,

        /// Print the token stream as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a source file and print its syntax tree
    Parse {
        filename: Option<PathBuf>,

        /// Print the AST as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a file holding one expression and print its value
    Evaluate { filename: Option<PathBuf> },

    /// Execute a source file as a tinypy program
    Run { filename: Option<PathBuf> },
}

/// Loads a whole source file into memory.
fn read_file(filename: PathBuf) -> Result<Vec<u8>> {
    info!("Loading source {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Loaded {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger(path: &PathBuf) -> Result<()> {
    let log_file = File::create(path).context(format!("Failed to create {:?}", path))?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'tinypy::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("tinypy::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_default_env() // RUST_LOG overrides the default level
        .init();

    info!("Logger initialized, writing to {:?}", path);
    Ok(())
}

/// Scanner and parser: source bytes to a program.
fn front_end(buf: &[u8]) -> std::result::Result<Program, PyError> {
    let tokens: Vec<Token> = Scanner::new(buf).scan_all()?;

    Parser::new(tokens).parse()
}

/// Reports `err` and exits with the status matching its phase.
fn fail(err: PyError) -> ! {
    debug!("Exiting on error: {:?}", err);
    eprintln!("{}", err);

    let code = if err.is_syntax_error() {
        EXIT_SYNTAX
    } else {
        EXIT_RUNTIME
    };

    process::exit(code);
}

fn no_input(command: &str) -> ! {
    info!("No filepath provided for {}", command);
    println!("No input filepath was provided. Exiting...");
    process::exit(0);
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Logging stays silent unless --log is given
    if args.log {
        init_logger(&args.log_file)?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("Parsed arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => {
            let Some(filename) = filename else {
                no_input("Tokenize");
            };

            info!("Running Tokenize subcommand");
            let buf = read_file(filename)?;
            let mut tokens: Vec<Token> = Vec::new();
            let mut tokenized = true;

            for token in Scanner::new(&buf) {
                match token {
                    Ok(token) => {
                        if !json {
                            println!("{}", token);
                        }
                        tokens.push(token);
                    }

                    Err(e) => {
                        tokenized = false;
                        debug!("Scanner error: {}", e);
                        eprintln!("{}", e);
                    }
                }
            }

            if json {
                let rendered =
                    serde_json::to_string_pretty(&tokens).context("Failed to serialize tokens")?;
                println!("{}", rendered);
            }

            if !tokenized {
                debug!("Tokenization failed, exiting with code {}", EXIT_SYNTAX);
                process::exit(EXIT_SYNTAX);
            }

            info!("Tokenize finished with {} tokens", tokens.len());
        }

        Commands::Parse { filename, json } => {
            let Some(filename) = filename else {
                no_input("Parse");
            };

            info!("Running Parse subcommand");
            let buf = read_file(filename)?;

            match front_end(&buf) {
                Ok(program) => {
                    if json {
                        let rendered = serde_json::to_string_pretty(&program)
                            .context("Failed to serialize AST")?;
                        println!("{}", rendered);
                    } else {
                        print!("{}", AstPrinter::print_program(&program));
                    }
                }

                Err(e) => fail(e),
            }

            info!("Parse subcommand completed");
        }

        Commands::Evaluate { filename } => {
            let Some(filename) = filename else {
                no_input("Evaluate");
            };

            info!("Running Evaluate subcommand");
            let buf = read_file(filename)?;

            let expr = Scanner::new(&buf)
                .scan_all()
                .and_then(|tokens| Parser::new(tokens).parse_expression())
                .unwrap_or_else(|e| fail(e));

            let mut interpreter = Interpreter::new();

            match interpreter.evaluate_expression(&expr) {
                Ok(value) => {
                    debug!("Evaluated to: {}", value);
                    println!("{}", value);
                }

                Err(e) => fail(e),
            }

            info!("Evaluate subcommand completed");
        }

        Commands::Run { filename } => {
            let Some(filename) = filename else {
                no_input("Run");
            };

            info!("Running Run subcommand");
            let buf = read_file(filename)?;

            let program: Program = front_end(&buf).unwrap_or_else(|e| fail(e));

            info!("Parsed {} statements", program.statements.len());

            let mut interpreter = Interpreter::new();

            match interpreter.interpret(&program) {
                Ok(()) => info!("Program executed successfully"),
                Err(e) => fail(e),
            }
        }
    }

    Ok(())
}
