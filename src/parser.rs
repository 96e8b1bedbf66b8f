// ABOUTME: Recursive-descent parser turning a token stream into an AST

use crate::ast::{Expr, Stmt};
use crate::error::ParseError;
use crate::token::{Literal, Token, TokenKind};
use tracing::warn;

struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

type ParseResult<T> = Result<T, ParseError>;

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        for &kind in kinds {
            if self.check(kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<&Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(self.error(self.peek().clone(), message))
    }

    fn error(&self, token: Token, message: impl Into<String>) -> ParseError {
        ParseError::new(token, message)
    }

    // ---- expression grammar, lowest to highest precedence ----

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.logic_or()?;

        if self.matches(&[TokenKind::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            if let Expr::Variable(name) = expr {
                return Ok(Expr::Assignment(name, Box::new(value)));
            }

            return Err(self.error(equals, "Invalid assignment target"));
        }

        Ok(expr)
    }

    fn logic_or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.logic_and()?;
        while self.matches(&[TokenKind::LogicOr]) {
            let op = self.previous().clone();
            let right = self.logic_and()?;
            expr = Expr::Logical(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn logic_and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.matches(&[TokenKind::LogicAnd]) {
            let op = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;
        while self.matches(&[TokenKind::EqualEqual, TokenKind::BangEqual]) {
            let op = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.addition()?;
        while self.matches(&[
            TokenKind::Lt,
            TokenKind::Lte,
            TokenKind::Gt,
            TokenKind::Gte,
        ]) {
            let op = self.previous().clone();
            let right = self.addition()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn addition(&mut self) -> ParseResult<Expr> {
        let mut expr = self.multiplication()?;
        while self.matches(&[TokenKind::Plus, TokenKind::Minus]) {
            let op = self.previous().clone();
            let right = self.multiplication()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn multiplication(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;
        while self.matches(&[TokenKind::Star, TokenKind::Slash]) {
            let op = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenKind::Minus, TokenKind::Bang]) {
            let op = self.previous().clone();
            let operand = self.unary()?;
            return Ok(Expr::Unary(op, Box::new(operand)));
        }
        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        while self.matches(&[TokenKind::LParen]) {
            let args = self.arguments()?;
            self.consume(TokenKind::RParen, "Expected ')' after arguments")?;
            expr = Expr::Call(Box::new(expr), args);
        }
        Ok(expr)
    }

    fn arguments(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            args.push(self.expression()?);
            while self.matches(&[TokenKind::Comma]) {
                args.push(self.expression()?);
            }
        }
        Ok(args)
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenKind::LParen]) {
            let expr = self.expression()?;
            self.consume(TokenKind::RParen, "Expected closing parenthesis ')'")?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }
        if self.matches(&[TokenKind::Number, TokenKind::String]) {
            let literal = self
                .previous()
                .literal
                .clone()
                .expect("NUMBER/STRING tokens always carry a literal");
            return Ok(Expr::Literal(literal));
        }
        if self.matches(&[TokenKind::True, TokenKind::False]) {
            let literal = self
                .previous()
                .literal
                .clone()
                .expect("TRUE/FALSE tokens always carry a literal");
            return Ok(Expr::Literal(literal));
        }
        if self.matches(&[TokenKind::Nil]) {
            return Ok(Expr::Literal(Literal::Nil));
        }
        if self.matches(&[TokenKind::Identifier]) {
            return Ok(Expr::Variable(self.previous().clone()));
        }

        Err(self.error(self.peek().clone(), "Expected expression"))
    }

    // ---- statement and declaration grammar ----

    fn declaration(&mut self) -> ParseResult<Stmt> {
        if self.matches(&[TokenKind::Var]) {
            return self.var_declaration();
        }
        if self.matches(&[TokenKind::Fun]) {
            return self.fun_declaration();
        }
        self.statement()
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self
            .consume(TokenKind::Identifier, "Expected variable name")?
            .clone();

        let initializer = if self.matches(&[TokenKind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenKind::Semicolon, "Expected ';' after variable declaration")?;
        Ok(Stmt::VarDecl(name, initializer))
    }

    /// Parses parameters as a dedicated list of identifier tokens, rejecting
    /// non-identifier parameter syntax at parse time, rather than reusing
    /// the general expression-list `arguments` helper.
    fn fun_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self
            .consume(TokenKind::Identifier, "Expected function name")?
            .clone();
        self.consume(TokenKind::LParen, "Expected '(' after function name")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let param = self
                    .consume(TokenKind::Identifier, "Expected parameter name")?
                    .clone();
                params.push(param);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen, "Expected ')' after parameters")?;

        let body = self.statement()?;
        Ok(Stmt::FunDecl(name, params, Box::new(body)))
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.matches(&[TokenKind::Print]) {
            return self.print_statement();
        }
        if self.matches(&[TokenKind::LBrace]) {
            return self.block();
        }
        if self.matches(&[TokenKind::If]) {
            return self.if_statement();
        }
        if self.matches(&[TokenKind::While]) {
            return self.while_statement();
        }
        if self.matches(&[TokenKind::For]) {
            return self.for_statement();
        }
        if self.matches(&[TokenKind::Return]) {
            return self.return_statement();
        }
        self.expr_statement()
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expected ';' after value")?;
        Ok(Stmt::Print(value))
    }

    fn expr_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expected ';' after expression")?;
        Ok(Stmt::Expr(expr))
    }

    fn block(&mut self) -> ParseResult<Stmt> {
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.declaration()?);
        }
        self.consume(TokenKind::RBrace, "Expected '}' after block")?;
        Ok(Stmt::Block(stmts))
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        let condition = self.expression()?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[TokenKind::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If(condition, then_branch, else_branch))
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LParen, "Expected '(' after 'while'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RParen, "Expected ')' after condition")?;
        let body = Box::new(self.declaration()?);
        Ok(Stmt::While(condition, body))
    }

    /// Desugars `for (init; cond; incr) body` into an equivalent
    /// `while` wrapped in blocks, per the grammar's documented desugaring.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LParen, "Expected '(' after 'for'")?;

        let initializer = if self.matches(&[TokenKind::Semicolon]) {
            None
        } else if self.matches(&[TokenKind::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expr_statement()?)
        };

        let condition = if !self.check(TokenKind::Semicolon) {
            self.expression()?
        } else {
            Expr::Literal(Literal::Bool(true))
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after loop condition")?;

        let increment = if !self.check(TokenKind::RParen) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::RParen, "Expected ')' after for clauses")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expr(increment)]);
        }

        body = Stmt::While(condition, Box::new(body));

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expected ';' after return value")?;
        Ok(Stmt::Return(value))
    }
}

/// Parses a token stream into a sequence of top-level declarations.
///
/// On the first `ParseError`, parsing stops and the error is returned;
/// panic-mode recovery across statement boundaries is not implemented.
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Stmt>, ParseError> {
    let mut parser = Parser::new(tokens);
    let mut statements = Vec::new();

    while !parser.is_at_end() {
        match parser.declaration() {
            Ok(stmt) => statements.push(stmt),
            Err(err) => {
                warn!(line = err.line(), "parse error: {err}");
                return Err(err);
            }
        }
    }

    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::tokenize;

    fn parse_src(src: &str) -> Vec<Stmt> {
        parse(tokenize(src).unwrap()).unwrap()
    }

    #[test]
    fn parses_var_declaration_with_initializer() {
        let stmts = parse_src("var a = 2 + 3;");
        assert_eq!(stmts.len(), 1);
        assert!(matches!(stmts[0], Stmt::VarDecl(_, Some(_))));
    }

    #[test]
    fn var_declaration_without_initializer() {
        let stmts = parse_src("var a;");
        assert!(matches!(stmts[0], Stmt::VarDecl(_, None)));
    }

    #[test]
    fn precedence_builds_nested_binary_tree() {
        let stmts = parse_src("1 + 2 * 3;");
        match &stmts[0] {
            Stmt::Expr(Expr::Binary(left, op, right)) => {
                assert!(matches!(**left, Expr::Literal(Literal::Number(n)) if n == 1.0));
                assert_eq!(op.kind, TokenKind::Plus);
                assert!(matches!(**right, Expr::Binary(..)));
            }
            other => panic!("expected binary expr, got {other:?}"),
        }
    }

    #[test]
    fn invalid_assignment_target_is_parse_error() {
        let err = parse(tokenize("1 + 2 = 3;").unwrap()).unwrap_err();
        assert_eq!(err.message, "Invalid assignment target");
    }

    #[test]
    fn assignment_is_right_associative_to_a_variable() {
        let stmts = parse_src("a = b = 3;");
        match &stmts[0] {
            Stmt::Expr(Expr::Assignment(name, rhs)) => {
                assert_eq!(name.text, "a");
                assert!(matches!(**rhs, Expr::Assignment(..)));
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn for_loop_desugars_to_block_and_while() {
        let stmts = parse_src("for (var i = 0; i < 3; i = i + 1) print i;");
        match &stmts[0] {
            Stmt::Block(outer) => {
                assert!(matches!(outer[0], Stmt::VarDecl(..)));
                match &outer[1] {
                    Stmt::While(_, body) => match &**body {
                        Stmt::Block(inner) => {
                            assert_eq!(inner.len(), 2);
                            assert!(matches!(inner[0], Stmt::Print(_)));
                            assert!(matches!(inner[1], Stmt::Expr(Expr::Assignment(..))));
                        }
                        other => panic!("expected block body, got {other:?}"),
                    },
                    other => panic!("expected while, got {other:?}"),
                }
            }
            other => panic!("expected outer block, got {other:?}"),
        }
    }

    #[test]
    fn for_loop_with_no_condition_defaults_to_true() {
        let stmts = parse_src("for (;;) print 1;");
        match &stmts[0] {
            Stmt::While(Expr::Literal(Literal::Bool(true)), _) => {}
            other => panic!("expected while(true), got {other:?}"),
        }
    }

    #[test]
    fn function_declaration_parses_identifier_params() {
        let stmts = parse_src("fun add(a, b) { return a + b; }");
        match &stmts[0] {
            Stmt::FunDecl(name, params, _) => {
                assert_eq!(name.text, "add");
                assert_eq!(params.len(), 2);
                assert_eq!(params[0].text, "a");
            }
            other => panic!("expected fun decl, got {other:?}"),
        }
    }

    #[test]
    fn function_parameter_must_be_identifier() {
        let err = parse(tokenize("fun f(1) { return 1; }").unwrap()).unwrap_err();
        assert_eq!(err.message, "Expected parameter name");
    }

    #[test]
    fn more_than_sixteen_parameters_still_parses() {
        // The cap is enforced at `FunDecl` evaluation time, not here; the
        // parser accepts any number of identifier parameters.
        let params: Vec<String> = (0..17).map(|i| format!("p{i}")).collect();
        let src = format!("fun f({}) {{ return 1; }}", params.join(", "));
        let stmts = parse(tokenize(&src).unwrap()).unwrap();
        match &stmts[0] {
            Stmt::FunDecl(_, params, _) => assert_eq!(params.len(), 17),
            other => panic!("expected fun decl, got {other:?}"),
        }
    }

    #[test]
    fn if_else_statement() {
        let stmts = parse_src("if (true) print 1; else print 2;");
        assert!(matches!(stmts[0], Stmt::If(_, _, Some(_))));
    }

    #[test]
    fn missing_semicolon_is_parse_error() {
        assert!(parse(tokenize("var a = 1").unwrap()).is_err());
    }
}
