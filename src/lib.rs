use std::{fs, io, path::Path};

use rustyline::{error::ReadlineError, DefaultEditor};
use tracing::{debug, info};

use ast_printer::AstPrinter;
use error::SyntaxError;
use interpreter::Interpreter;
use parser::Parser;
use scanner::Scanner;
use syntax::stmt::Stmt;
use utils::logger::{Logger, StdoutLogger};

pub mod ast_printer;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod syntax;
pub mod utils;
pub mod value;

pub use utils::logger;

/// Outcome of running one chunk of source. Replaces process-wide "had error"
/// flags: the caller decides what to do with it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub had_error: bool,
    pub had_runtime_error: bool,
}

impl RunStatus {
    /// sysexits-style code for a script run.
    pub fn exit_code(&self) -> i32 {
        if self.had_error {
            65
        } else if self.had_runtime_error {
            70
        } else {
            0
        }
    }
}

/// An interpreter session. Globals persist between calls to [`Lox::run`], so
/// one session serves a whole prompt.
pub struct Lox {
    interpreter: Interpreter,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    pub fn new() -> Lox {
        Lox::with_logger(Box::new(StdoutLogger))
    }

    pub fn with_logger(logger: Box<dyn Logger>) -> Lox {
        Lox {
            interpreter: Interpreter::with_logger(logger),
        }
    }

    /// Scans, parses and executes `source`. Statements that parsed cleanly
    /// run even when others in the same source were rejected.
    pub fn run(&mut self, source: &str) -> RunStatus {
        let mut status = RunStatus::default();

        let statements = self.parse(source, &mut status);

        if let Err(error) = self.interpreter.interpret(&statements) {
            self.interpreter
                .logger()
                .error(format_args!("{}", error.report()));
            status.had_runtime_error = true;
        }

        status
    }

    /// Scans and parses `source`, then prints each statement's tree instead
    /// of running it.
    pub fn print_ast(&mut self, source: &str) -> RunStatus {
        let mut status = RunStatus::default();

        let statements = self.parse(source, &mut status);
        for statement in &statements {
            let tree = AstPrinter.print_stmt(statement);
            self.interpreter.logger().print(format_args!("{}", tree));
        }

        status
    }

    fn parse(&mut self, source: &str, status: &mut RunStatus) -> Vec<Stmt> {
        let (tokens, scan_errors) = Scanner::new(source).scan_tokens();
        let (statements, parse_errors) = Parser::new(tokens).parse();

        for error in scan_errors.iter().chain(parse_errors.iter()) {
            self.report(error);
            status.had_error = true;
        }

        statements
    }

    fn report(&mut self, error: &SyntaxError) {
        self.interpreter.logger().error(format_args!("{}", error));
    }
}

pub fn run_file(
    path: impl AsRef<Path>,
    logger: Option<Box<dyn Logger>>,
) -> io::Result<RunStatus> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)?;
    info!(path = %path.display(), bytes = source.len(), "running script");

    let mut lox = match logger {
        Some(logger) => Lox::with_logger(logger),
        None => Lox::new(),
    };
    Ok(lox.run(&source))
}

/// Reads and runs one line at a time until `exit` or end of input. Errors on
/// a line are reported and the prompt carries on.
pub fn run_prompt() -> Result<(), ReadlineError> {
    let mut editor = DefaultEditor::new()?;
    let mut lox = Lox::new();

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let line = line.trim();
                if line == "exit" {
                    break;
                }
                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line)?;
                let status = lox.run(line);
                debug!(?status, "ran line");
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        }
    }

    Ok(())
}
