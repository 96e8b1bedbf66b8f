// ABOUTME: Library crate exposing the scanner, parser, and interpreter for integration tests

pub mod ast;
pub mod config;
pub mod env;
pub mod error;
pub mod highlighter;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod token;
pub mod value;

use error::{LexicalError, ParseError, RuntimeError};

/// The outcome of running one phase short of the full pipeline, used by
/// `run_source` to report which phase failed without requiring the caller
/// to know the internals of each error type.
#[derive(Debug)]
pub enum PipelineError {
    Lexical(LexicalError),
    Parse(ParseError),
    Runtime(RuntimeError),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Lexical(e) => write!(f, "{e}"),
            PipelineError::Parse(e) => write!(f, "{e}"),
            PipelineError::Runtime(e) => write!(f, "{e}"),
        }
    }
}

impl PipelineError {
    pub fn line(&self) -> usize {
        match self {
            PipelineError::Lexical(e) => e.line(),
            PipelineError::Parse(e) => e.line(),
            PipelineError::Runtime(e) => e.line(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Lexical(_) => config::EXIT_LEXICAL_ERROR,
            PipelineError::Parse(_) => config::EXIT_PARSE_ERROR,
            PipelineError::Runtime(_) => config::EXIT_RUNTIME_ERROR,
        }
    }

    /// The offending token's text, where the error carries one.
    pub fn token_text(&self) -> Option<&str> {
        match self {
            PipelineError::Lexical(_) => None,
            PipelineError::Parse(e) => Some(e.token.text.as_str()),
            PipelineError::Runtime(e) => Some(e.token().text.as_str()),
        }
    }
}

/// Runs `source` through `tokenize -> parse -> interpret` against
/// `interpreter`'s persistent environment. Used identically by the file
/// runner and the REPL so the two surfaces cannot drift in behavior.
///
/// Phases short-circuit in order: a lexical error is never followed by a
/// parse attempt, and a parse error is never followed by evaluation.
pub fn run_source(
    source: &str,
    interpreter: &mut interpreter::Interpreter,
) -> Result<(), PipelineError> {
    let tokens = scanner::tokenize(source).map_err(PipelineError::Lexical)?;
    let statements = parser::parse(tokens).map_err(PipelineError::Parse)?;
    interpreter
        .interpret(&statements)
        .map_err(PipelineError::Runtime)
}
