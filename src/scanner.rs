// ABOUTME: Lexical scanner turning a source string into a token stream

use crate::error::LexicalError;
use crate::token::{keyword_kind, Literal, Token, TokenKind};
use tracing::{trace, warn};

/// Character cursor over the source text, with a 1-based line counter.
struct Scanner<'a> {
    chars: Vec<char>,
    source: &'a str,
    start: usize,
    current: usize,
    line: usize,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Scanner {
            chars: source.chars().collect(),
            source,
            start: 0,
            current: 0,
            line: 1,
            tokens: Vec::new(),
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn peek(&self) -> char {
        *self.chars.get(self.current).unwrap_or(&'\0')
    }

    fn peek_next(&self) -> char {
        *self.chars.get(self.current + 1).unwrap_or(&'\0')
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
        }
        c
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn lexeme(&self) -> String {
        self.chars[self.start..self.current].iter().collect()
    }

    fn add_token(&mut self, kind: TokenKind) {
        let text = self.lexeme();
        self.tokens.push(Token::new(text, kind, self.line));
    }

    fn add_literal_token(&mut self, kind: TokenKind, literal: Literal) {
        let text = self.lexeme();
        self.tokens
            .push(Token::with_literal(text, kind, self.line, literal));
    }

    fn number(&mut self) -> Result<(), LexicalError> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        // A digit sequence immediately followed by a non-digit, non-'.',
        // non-whitespace, non-structural character is malformed.
        let trailing = self.peek();
        let follower_ok = trailing == '\0'
            || trailing.is_whitespace()
            || "(){},.;+-*/!=<>&|".contains(trailing);
        if !follower_ok {
            return Err(LexicalError::InvalidNumericCharacter { line: self.line });
        }

        let text = self.lexeme();
        let value: f64 = text.parse().expect("scanner only admits digit/'.' chars");
        self.add_literal_token(TokenKind::Number, Literal::Number(value));
        Ok(())
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }
        let text = self.lexeme();
        match keyword_kind(&text) {
            Some(TokenKind::True) => self.add_literal_token(TokenKind::True, Literal::Bool(true)),
            Some(TokenKind::False) => {
                self.add_literal_token(TokenKind::False, Literal::Bool(false))
            }
            Some(TokenKind::Nil) => self.add_literal_token(TokenKind::Nil, Literal::Nil),
            Some(kind) => self.add_token(kind),
            None => self.add_literal_token(TokenKind::Identifier, Literal::String(text)),
        }
    }

    fn string(&mut self, quote: char) -> Result<(), LexicalError> {
        while self.peek() != quote && !self.is_at_end() {
            self.advance();
        }

        if self.is_at_end() {
            return Err(LexicalError::UnterminatedString { line: self.line });
        }

        // Closing quote.
        self.advance();

        // Inner text, excluding the surrounding quotes.
        let content: String = self.chars[self.start + 1..self.current - 1]
            .iter()
            .collect();
        self.add_literal_token(TokenKind::String, Literal::String(content));
        Ok(())
    }

    fn scan_token(&mut self) -> Result<(), LexicalError> {
        let c = self.advance();
        match c {
            '(' => self.add_token(TokenKind::LParen),
            ')' => self.add_token(TokenKind::RParen),
            '{' => self.add_token(TokenKind::LBrace),
            '}' => self.add_token(TokenKind::RBrace),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Dot),
            ';' => self.add_token(TokenKind::Semicolon),
            '+' => self.add_token(TokenKind::Plus),
            '-' => self.add_token(TokenKind::Minus),
            '*' => self.add_token(TokenKind::Star),
            '/' => self.add_token(TokenKind::Slash),
            '!' => {
                let kind = if self.matches('=') {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.matches('=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.matches('=') {
                    TokenKind::Gte
                } else {
                    TokenKind::Gt
                };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.matches('=') {
                    TokenKind::Lte
                } else {
                    TokenKind::Lt
                };
                self.add_token(kind);
            }
            '&' => {
                if self.matches('&') {
                    self.add_token(TokenKind::LogicAnd);
                } else {
                    return Err(LexicalError::InvalidCharacter {
                        character: '&',
                        line: self.line,
                    });
                }
            }
            '|' => {
                if self.matches('|') {
                    self.add_token(TokenKind::LogicOr);
                } else {
                    return Err(LexicalError::InvalidCharacter {
                        character: '|',
                        line: self.line,
                    });
                }
            }
            ' ' | '\r' | '\t' | '\n' => {}
            '"' | '\'' => self.string(c)?,
            c if c.is_ascii_digit() => self.number()?,
            c if c.is_alphabetic() || c == '_' => self.identifier(),
            c => {
                return Err(LexicalError::InvalidCharacter {
                    character: c,
                    line: self.line,
                })
            }
        }
        Ok(())
    }
}

/// Scans `source` into a token sequence terminated by a single `EOF` token.
///
/// On the first malformed character, unterminated string, or invalid
/// numeric literal, scanning stops and the error is returned; whatever
/// tokens were already produced are not surfaced to the caller (the
/// pipeline is strictly forward, there is no partial-recovery mode).
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexicalError> {
    let mut scanner = Scanner::new(source);
    trace!(len = scanner.source.len(), "scanning source");

    while !scanner.is_at_end() {
        scanner.start = scanner.current;
        if let Err(err) = scanner.scan_token() {
            warn!(line = err.line(), "lexical error: {err}");
            return Err(err);
        }
    }

    scanner
        .tokens
        .push(Token::new("", TokenKind::Eof, scanner.line));
    Ok(scanner.tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn scans_structural_and_operator_tokens() {
        let tokens = tokenize("(){},.;+-*/").unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Semicolon,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_character_operators_take_precedence() {
        let tokens = tokenize("!= == >= <= && ||").unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::BangEqual,
                TokenKind::EqualEqual,
                TokenKind::Gte,
                TokenKind::Lte,
                TokenKind::LogicAnd,
                TokenKind::LogicOr,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn one_character_fallback_when_not_followed_by_equal() {
        let tokens = tokenize("! = < >").unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Bang,
                TokenKind::Equal,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lone_ampersand_or_pipe_is_an_error() {
        assert!(tokenize("&").is_err());
        assert!(tokenize("|").is_err());
    }

    #[test]
    fn number_literal_value() {
        let tokens = tokenize("42 3.14").unwrap();
        assert_eq!(tokens[0].literal, Some(Literal::Number(42.0)));
        assert_eq!(tokens[1].literal, Some(Literal::Number(3.14)));
    }

    #[test]
    fn malformed_number_is_lexical_error() {
        let err = tokenize("42abc").unwrap_err();
        assert!(matches!(err, LexicalError::InvalidNumericCharacter { .. }));
    }

    #[test]
    fn keywords_and_identifiers() {
        let tokens = tokenize("var x while foo").unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::While,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn strings_with_either_quote_character() {
        let tokens = tokenize(r#""hi" 'there'"#).unwrap();
        assert_eq!(tokens[0].literal, Some(Literal::String("hi".to_string())));
        assert_eq!(
            tokens[1].literal,
            Some(Literal::String("there".to_string()))
        );
    }

    #[test]
    fn unterminated_string_is_lexical_error() {
        let err = tokenize("\"unterminated").unwrap_err();
        assert!(matches!(err, LexicalError::UnterminatedString { .. }));
    }

    #[test]
    fn newline_inside_string_literal_still_counts_the_line() {
        let tokens = tokenize("\"a\nb\"\n1").unwrap();
        // The number token should be on line 3: one newline inside the
        // string, one after the closing quote.
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn invalid_character_is_lexical_error() {
        let err = tokenize("@").unwrap_err();
        assert!(matches!(err, LexicalError::InvalidCharacter { character: '@', .. }));
    }

    #[test]
    fn eof_token_carries_final_line_number() {
        let tokens = tokenize("1\n2\n3").unwrap();
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
        assert_eq!(tokens.last().unwrap().line, 3);
    }
}
