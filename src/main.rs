use clap::Parser as ClapParser;
use lox::config::{
    EXIT_LEXICAL_ERROR, EXIT_OK, EXIT_PARSE_ERROR, EXIT_RUNTIME_ERROR, REPL_HISTORY_FILE,
    WELCOME_MESSAGE, WELCOME_SUBTITLE,
};
use lox::highlighter::LoxHelper;
use lox::interpreter::Interpreter;
use lox::PipelineError;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// A tree-walking interpreter for Lox.
#[derive(ClapParser, Debug)]
#[command(name = "lox")]
#[command(version = lox::config::VERSION)]
#[command(about = WELCOME_SUBTITLE)]
struct CliArgs {
    /// Script file to run. Without it, starts an interactive REPL.
    #[arg(value_name = "SCRIPT")]
    script: Option<PathBuf>,

    /// Filter passed to `tracing`'s env-filter (e.g. "trace", "lox=debug").
    #[arg(long = "log-level", default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log_level))
        .with_writer(std::io::stderr)
        .init();

    match args.script {
        Some(path) => run_file(&path),
        None => {
            run_repl();
            ExitCode::from(EXIT_OK as u8)
        }
    }
}

/// Runs a script file to completion and returns the process exit code, per
/// the phase precedence lexical > parse > runtime (earlier phases
/// short-circuit later ones, so at most one error is ever reported).
fn run_file(path: &PathBuf) -> ExitCode {
    let filename = path.display().to_string();
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{filename}: cannot read file: {e}");
            return ExitCode::from(EXIT_RUNTIME_ERROR as u8);
        }
    };

    let mut interpreter = Interpreter::new();
    match lox::run_source(&source, &mut interpreter) {
        Ok(()) => ExitCode::from(EXIT_OK as u8),
        Err(err) => {
            report_error(&filename, &err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

/// Reads one line at a time from an interactive prompt, evaluating each
/// against one persistent interpreter/environment for the session. The
/// REPL does not auto-print the value of a bare expression statement --
/// only `print` produces output, matching ordinary Lox scripts. Errors are
/// reported and the REPL continues reading further lines.
fn run_repl() {
    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");

    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<LoxHelper, rustyline::history::DefaultHistory> =
        match Editor::with_config(config) {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("failed to initialize REPL: {e}");
                return;
            }
        };
    rl.set_helper(Some(LoxHelper::new()));
    let _ = rl.load_history(REPL_HISTORY_FILE);

    let mut interpreter = Interpreter::new();

    loop {
        match rl.readline("lox> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                if let Err(err) = lox::run_source(&line, &mut interpreter) {
                    report_error("stdin", &err);
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {e}");
                break;
            }
        }
    }

    let _ = rl.save_history(REPL_HISTORY_FILE);
}

/// Prints a one-line diagnostic: `<filename>:<line>: <ErrorClassName>:
/// <message>`, plus the offending token's text in parentheses where the
/// error carries one.
fn report_error(filename: &str, err: &PipelineError) {
    let class = match err {
        PipelineError::Lexical(_) => "LexicalError",
        PipelineError::Parse(_) => "ParseError",
        PipelineError::Runtime(_) => "RuntimeError",
    };
    match err.token_text() {
        Some(text) if !text.is_empty() => {
            eprintln!("{filename}:{}: {class}: {err} ('{text}')", err.line());
        }
        _ => {
            eprintln!("{filename}:{}: {class}: {err}", err.line());
        }
    }
}
