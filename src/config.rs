// ABOUTME: Configuration and constants for the Lox interpreter

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const WELCOME_MESSAGE: &str = "Lox Interpreter";
pub const WELCOME_SUBTITLE: &str = "A tree-walking interpreter for Lox";

/// Maximum number of parameters a function declaration may have.
pub const MAX_PARAMETERS: usize = 16;

/// Exit codes, in phase precedence order: lexical > parse > runtime.
pub const EXIT_OK: i32 = 0;
pub const EXIT_LEXICAL_ERROR: i32 = 1;
pub const EXIT_PARSE_ERROR: i32 = 2;
pub const EXIT_RUNTIME_ERROR: i32 = 3;

pub const REPL_HISTORY_FILE: &str = ".lox_history";
