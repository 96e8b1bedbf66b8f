// ABOUTME: Abstract syntax tree produced by the parser and walked by the evaluator

use crate::token::{Literal, Token};

/// Expression nodes. Each variant that carries an operator or name token
/// retains it so the evaluator can report the offending token's text and
/// line on a runtime error.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    Grouping(Box<Expr>),
    Variable(Token),
    Assignment(Token, Box<Expr>),
    Logical(Box<Expr>, Token, Box<Expr>),
    Binary(Box<Expr>, Token, Box<Expr>),
    Unary(Token, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
}

/// Statement nodes.
#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    Print(Expr),
    Block(Vec<Stmt>),
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    While(Expr, Box<Stmt>),
    Return(Expr),
    VarDecl(Token, Option<Expr>),
    FunDecl(Token, Vec<Token>, Box<Stmt>),
}
