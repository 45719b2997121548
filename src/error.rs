use thiserror::Error;

use crate::syntax::token::{Token, TokenType};

/// A diagnostic raised while scanning or parsing. These never stop the pass;
/// they are collected and handed back alongside whatever was produced.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {line}] Error{location}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub location: String,
    pub message: String,
}

impl SyntaxError {
    pub fn at_line(line: usize, message: impl Into<String>) -> Self {
        SyntaxError {
            line,
            location: String::new(),
            message: message.into(),
        }
    }

    pub fn at_token(token: &Token, message: impl Into<String>) -> Self {
        let location = match token.token_type {
            TokenType::Eof => String::from(" at end"),
            _ => format!(" at '{}'", token.lexeme),
        };

        SyntaxError {
            line: token.line,
            location,
            message: message.into(),
        }
    }
}

/// A fault raised while executing. The first one aborts the program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Operand must be a number.")]
    OperandMustBeNumber { operator: Token },

    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers { operator: Token },

    #[error("Operands must both be numbers or both be strings.")]
    OperandsMustBeNumbersOrStrings { operator: Token },

    #[error("Undefined variable {}.", .name.lexeme)]
    UndefinedVariable { name: Token },
}

impl RuntimeError {
    pub fn token(&self) -> &Token {
        match self {
            RuntimeError::OperandMustBeNumber { operator }
            | RuntimeError::OperandsMustBeNumbers { operator }
            | RuntimeError::OperandsMustBeNumbersOrStrings { operator } => operator,
            RuntimeError::UndefinedVariable { name } => name,
        }
    }

    pub fn line(&self) -> usize {
        self.token().line
    }

    /// The message followed by the source line, as written to the diagnostic
    /// sink.
    pub fn report(&self) -> String {
        format!("{}\n[line {}]", self, self.line())
    }
}
