// ABOUTME: Syntax highlighter for the REPL, driven by the real Lox scanner

use crate::scanner::tokenize;
use crate::token::TokenKind;
use rustyline::completion::Completer;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::Helper;
use std::borrow::Cow;

const COLOR_RESET: &str = "\x1b[0m";
const COLOR_KEYWORD: &str = "\x1b[1;35m"; // bold magenta
const COLOR_NUMBER: &str = "\x1b[33m"; // yellow
const COLOR_STRING: &str = "\x1b[32m"; // green
const COLOR_BOOL_NIL: &str = "\x1b[33m"; // yellow
const COLOR_OPERATOR: &str = "\x1b[1;34m"; // bold blue

/// `rustyline` helper providing Lox-aware color highlighting and nothing
/// else (no completion, no hints, no multi-line validation).
pub struct LoxHelper;

impl LoxHelper {
    pub fn new() -> Self {
        LoxHelper
    }
}

impl Default for LoxHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Helper for LoxHelper {}

impl Completer for LoxHelper {
    type Candidate = String;
}

impl Hinter for LoxHelper {
    type Hint = String;
}

impl Validator for LoxHelper {}

impl Highlighter for LoxHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        match highlight_line(line) {
            Some(highlighted) => Cow::Owned(highlighted),
            None => Cow::Borrowed(line),
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

/// Tokenizes `line` with the real scanner and wraps each token's source
/// span in the color for its kind. Falls back to returning the line
/// unmodified (via `None`) on a lexical error, since a half-typed line is
/// the common case in an interactive REPL, not a bug to report.
fn highlight_line(line: &str) -> Option<String> {
    let tokens = tokenize(line).ok()?;
    let mut result = String::with_capacity(line.len() * 2);
    let mut cursor = 0;

    for token in &tokens {
        if token.kind == TokenKind::Eof {
            break;
        }
        let Some(start) = line[cursor..].find(&token.text).map(|i| i + cursor) else {
            continue;
        };
        result.push_str(&line[cursor..start]);
        let end = start + token.text.len();
        push_colored(&mut result, token.kind, &line[start..end]);
        cursor = end;
    }
    result.push_str(&line[cursor..]);
    Some(result)
}

fn push_colored(out: &mut String, kind: TokenKind, text: &str) {
    let color = match kind {
        TokenKind::And
        | TokenKind::Class
        | TokenKind::Else
        | TokenKind::Fun
        | TokenKind::If
        | TokenKind::Or
        | TokenKind::Print
        | TokenKind::Return
        | TokenKind::Super
        | TokenKind::Var
        | TokenKind::While
        | TokenKind::For => Some(COLOR_KEYWORD),
        TokenKind::Number => Some(COLOR_NUMBER),
        TokenKind::String => Some(COLOR_STRING),
        TokenKind::True | TokenKind::False | TokenKind::Nil => Some(COLOR_BOOL_NIL),
        TokenKind::Plus
        | TokenKind::Minus
        | TokenKind::Star
        | TokenKind::Slash
        | TokenKind::Bang
        | TokenKind::BangEqual
        | TokenKind::Equal
        | TokenKind::EqualEqual
        | TokenKind::Gt
        | TokenKind::Gte
        | TokenKind::Lt
        | TokenKind::Lte
        | TokenKind::LogicAnd
        | TokenKind::LogicOr => Some(COLOR_OPERATOR),
        _ => None,
    };

    match color {
        Some(c) => {
            out.push_str(c);
            out.push_str(text);
            out.push_str(COLOR_RESET);
        }
        None => out.push_str(text),
    }
}
