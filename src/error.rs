// ABOUTME: Error types for the scanner, parser, and evaluator phases

use crate::token::Token;
use thiserror::Error;

/// Raised by the scanner: unrecognized character, unterminated string, or a
/// malformed numeric literal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexicalError {
    #[error("Invalid numeric character")]
    InvalidNumericCharacter { line: usize },

    #[error("Unterminated string")]
    UnterminatedString { line: usize },

    #[error("Invalid character {character}")]
    InvalidCharacter { character: char, line: usize },
}

impl LexicalError {
    pub fn line(&self) -> usize {
        match self {
            LexicalError::InvalidNumericCharacter { line } => *line,
            LexicalError::UnterminatedString { line } => *line,
            LexicalError::InvalidCharacter { line, .. } => *line,
        }
    }
}

/// Raised by the parser: a grammar violation, a missing expected token, or
/// an invalid assignment target. Carries the offending token.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl ParseError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        ParseError {
            token,
            message: message.into(),
        }
    }

    pub fn line(&self) -> usize {
        self.token.line
    }
}

/// Raised by the evaluator: undefined variable, operator type mismatch,
/// non-callable callee, arity mismatch, or the 16-parameter cap exceeded.
/// Carries the operator/identifier token that triggered the failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String, token: Token },

    #[error("Operand must be a number")]
    NotANumber { token: Token },

    #[error("Unsupported operand types")]
    UnsupportedOperands { token: Token },

    #[error("Value is not callable")]
    NotCallable { token: Token },

    #[error("Expected {expected} arguments but got {actual}")]
    ArityMismatch {
        expected: usize,
        actual: usize,
        token: Token,
    },

    #[error("Cannot have more than 16 parameters")]
    TooManyParameters { token: Token },
}

impl RuntimeError {
    pub fn token(&self) -> &Token {
        match self {
            RuntimeError::UndefinedVariable { token, .. } => token,
            RuntimeError::NotANumber { token } => token,
            RuntimeError::UnsupportedOperands { token } => token,
            RuntimeError::NotCallable { token } => token,
            RuntimeError::ArityMismatch { token, .. } => token,
            RuntimeError::TooManyParameters { token } => token,
        }
    }

    pub fn line(&self) -> usize {
        self.token().line
    }
}
