// ABOUTME: Tree-walking evaluator executing a parsed Lox program against an environment chain

use crate::ast::{Expr, Stmt};
use crate::config::MAX_PARAMETERS;
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::token::{Literal, TokenKind};
use crate::value::{LoxFunction, Value};
use std::rc::Rc;
use tracing::warn;

/// The result of executing a statement: either normal completion, or a
/// non-local return unwinding toward the nearest enclosing function
/// invocation. Modeled as a distinguished variant rather than exception
/// unwinding so every statement executor can match on it and propagate it
/// explicitly, guaranteeing scope restoration on both paths.
enum Signal {
    Normal,
    Return(Value),
}

pub struct Interpreter {
    globals: Rc<Environment>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            globals: Environment::new(),
        }
    }

    /// Interprets a full program. Stops and returns the first
    /// `RuntimeError` encountered; the caller's environment is left exactly
    /// as it started (every block/call restores its prior environment on
    /// every exit path, including error propagation via `?`).
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        let env = self.globals.clone();
        for stmt in statements {
            match self.execute(stmt, env.clone()) {
                Ok(_) => {}
                Err(err) => {
                    warn!(line = err.line(), "runtime error: {err}");
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt, env: Rc<Environment>) -> Result<Signal, RuntimeError> {
        match stmt {
            Stmt::Expr(expr) => {
                self.evaluate(expr, env)?;
                Ok(Signal::Normal)
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr, env)?;
                println!("{value}");
                Ok(Signal::Normal)
            }
            Stmt::Block(stmts) => {
                let block_env = Environment::with_parent(env);
                self.execute_block(stmts, block_env)
            }
            Stmt::If(cond, then_branch, else_branch) => {
                if self.evaluate(cond, env.clone())?.is_truthy() {
                    self.execute(then_branch, env)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch, env)
                } else {
                    Ok(Signal::Normal)
                }
            }
            Stmt::While(cond, body) => {
                while self.evaluate(cond, env.clone())?.is_truthy() {
                    match self.execute(body, env.clone())? {
                        Signal::Normal => {}
                        signal @ Signal::Return(_) => return Ok(signal),
                    }
                }
                Ok(Signal::Normal)
            }
            Stmt::Return(expr) => {
                let value = self.evaluate(expr, env)?;
                Ok(Signal::Return(value))
            }
            Stmt::VarDecl(name, init) => {
                let value = match init {
                    Some(expr) => self.evaluate(expr, env.clone())?,
                    None => Value::Nil,
                };
                env.define(name.text.clone(), value);
                Ok(Signal::Normal)
            }
            Stmt::FunDecl(name, params, body) => {
                if params.len() > MAX_PARAMETERS {
                    return Err(RuntimeError::TooManyParameters {
                        token: params.last().unwrap_or(name).clone(),
                    });
                }
                let function = Value::Callable(Rc::new(LoxFunction {
                    name: name.text.clone(),
                    params: params.clone(),
                    body: Rc::new((**body).clone()),
                    closure: env.clone(),
                }));
                env.define(name.text.clone(), function);
                Ok(Signal::Normal)
            }
        }
    }

    /// Executes a block's statements against `block_env`, restoring no
    /// outer state itself (the caller already holds the prior environment
    /// in its own local) — the block only ever operates on its own child
    /// environment, so there is nothing to leak on an early return or
    /// error; both paths simply propagate upward.
    fn execute_block(
        &mut self,
        stmts: &[Stmt],
        block_env: Rc<Environment>,
    ) -> Result<Signal, RuntimeError> {
        for stmt in stmts {
            match self.execute(stmt, block_env.clone())? {
                Signal::Normal => {}
                signal @ Signal::Return(_) => return Ok(signal),
            }
        }
        Ok(Signal::Normal)
    }

    fn evaluate(&mut self, expr: &Expr, env: Rc<Environment>) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(lit) => Ok(literal_value(lit)),
            Expr::Grouping(inner) => self.evaluate(inner, env),
            Expr::Variable(name) => env.get(name),
            Expr::Assignment(name, value_expr) => {
                let value = self.evaluate(value_expr, env.clone())?;
                env.assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Logical(left, op, right) => {
                let left_val = self.evaluate(left, env.clone())?;
                if op.kind == TokenKind::LogicOr {
                    if left_val.is_truthy() {
                        return Ok(left_val);
                    }
                } else if !left_val.is_truthy() {
                    return Ok(left_val);
                }
                self.evaluate(right, env)
            }
            Expr::Unary(op, operand) => {
                let value = self.evaluate(operand, env)?;
                match op.kind {
                    TokenKind::Bang => Ok(Value::Bool(!value.is_truthy())),
                    TokenKind::Minus => match value {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::NotANumber { token: op.clone() }),
                    },
                    _ => unreachable!("unary operator must be '!' or '-'"),
                }
            }
            Expr::Binary(left, op, right) => {
                let left_val = self.evaluate(left, env.clone())?;
                let right_val = self.evaluate(right, env)?;
                self.apply_binary(op, left_val, right_val)
            }
            Expr::Call(callee, args) => {
                let callee_token_line = call_site_token(callee);
                let callee_val = self.evaluate(callee, env.clone())?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.evaluate(arg, env.clone())?);
                }
                self.call(callee_val, arg_values, callee_token_line)
            }
        }
    }

    fn apply_binary(
        &self,
        op: &crate::token::Token,
        left: Value,
        right: Value,
    ) -> Result<Value, RuntimeError> {
        use TokenKind::*;
        match op.kind {
            Plus => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => Err(RuntimeError::UnsupportedOperands { token: op.clone() }),
            },
            Minus => numeric_binary(op, left, right, |a, b| a - b),
            Star => numeric_binary(op, left, right, |a, b| a * b),
            Slash => numeric_binary(op, left, right, |a, b| a / b),
            Lt => numeric_compare(op, left, right, |a, b| a < b),
            Lte => numeric_compare(op, left, right, |a, b| a <= b),
            Gt => numeric_compare(op, left, right, |a, b| a > b),
            Gte => numeric_compare(op, left, right, |a, b| a >= b),
            EqualEqual => Ok(Value::Bool(left.is_equal(&right))),
            BangEqual => Ok(Value::Bool(!left.is_equal(&right))),
            _ => unreachable!("unexpected binary operator token {:?}", op.kind),
        }
    }

    fn call(
        &mut self,
        callee: Value,
        args: Vec<Value>,
        call_token: crate::token::Token,
    ) -> Result<Value, RuntimeError> {
        let function = match callee {
            Value::Callable(f) => f,
            _ => return Err(RuntimeError::NotCallable { token: call_token }),
        };

        if function.params.len() != args.len() {
            return Err(RuntimeError::ArityMismatch {
                expected: function.params.len(),
                actual: args.len(),
                token: call_token,
            });
        }

        let call_env = Environment::with_parent(function.closure.clone());
        for (param, arg) in function.params.iter().zip(args.into_iter()) {
            call_env.define(param.text.clone(), arg);
        }

        match self.execute(&function.body, call_env)? {
            Signal::Normal => Ok(Value::Nil),
            Signal::Return(value) => Ok(value),
        }
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Number(n) => Value::Number(*n),
        Literal::String(s) => Value::String(s.clone()),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Nil => Value::Nil,
    }
}

fn numeric_binary(
    op: &crate::token::Token,
    left: Value,
    right: Value,
    f: impl Fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(f(a, b))),
        _ => Err(RuntimeError::NotANumber { token: op.clone() }),
    }
}

fn numeric_compare(
    op: &crate::token::Token,
    left: Value,
    right: Value,
    f: impl Fn(f64, f64) -> bool,
) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(f(a, b))),
        _ => Err(RuntimeError::NotANumber { token: op.clone() }),
    }
}

/// Finds a token to attach to a `RuntimeError::NotCallable`/`ArityMismatch`
/// raised by a call expression, by walking down to the innermost name or
/// operator token in the callee position.
fn call_site_token(callee: &Expr) -> crate::token::Token {
    match callee {
        Expr::Variable(name) => name.clone(),
        Expr::Grouping(inner) => call_site_token(inner),
        Expr::Call(inner, _) => call_site_token(inner),
        Expr::Assignment(name, _) => name.clone(),
        Expr::Binary(_, op, _) | Expr::Logical(_, op, _) | Expr::Unary(op, _) => op.clone(),
        Expr::Literal(_) => crate::token::Token::new("", TokenKind::Nil, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::scanner::tokenize;

    fn run(src: &str) -> Result<(), RuntimeError> {
        let tokens = tokenize(src).unwrap();
        let stmts = parse(tokens).unwrap();
        Interpreter::new().interpret(&stmts)
    }

    #[test]
    fn if_and_logical_operators_scenario() {
        // Scenario 1 from the interpreter's test matrix: exercised via
        // print side effects, verified indirectly by checking it runs
        // without a runtime error.
        assert!(run(
            "var a = 2 + 3; var b = 3 + 4; if (a > 3 && b < 10) { print a; print b; }"
        )
        .is_ok());
    }

    #[test]
    fn closures_capture_and_mutate_enclosing_variable() {
        assert!(run(
            "fun make() { var x = 0; fun inc() { x = x + 1; return x; } return inc; } \
             var c = make(); print c(); print c(); print c();"
        )
        .is_ok());
    }

    #[test]
    fn for_loop_prints_range() {
        assert!(run("for (var i = 0; i < 3; i = i + 1) { print i; }").is_ok());
    }

    #[test]
    fn string_concatenation_and_type_mismatch() {
        assert!(run(r#"print "hi" + " " + "there";"#).is_ok());
        let err = run(r#"print 1 + "x";"#).unwrap_err();
        assert!(matches!(err, RuntimeError::UnsupportedOperands { .. }));
    }

    #[test]
    fn while_loop_counts_down() {
        assert!(run("var n = 10; while (n > 0) { n = n - 1; } print n;").is_ok());
    }

    #[test]
    fn undefined_variable_is_runtime_error() {
        let err = run("print foo;").unwrap_err();
        assert!(matches!(err, RuntimeError::UndefinedVariable { ref name, .. } if name == "foo"));
    }

    #[test]
    fn assignment_to_undefined_name_is_runtime_error() {
        let err = run("a = 1;").unwrap_err();
        assert!(matches!(err, RuntimeError::UndefinedVariable { .. }));
    }

    #[test]
    fn division_by_zero_follows_ieee754() {
        let tokens = tokenize("var x = 1 / 0;").unwrap();
        let stmts = parse(tokens).unwrap();
        assert!(Interpreter::new().interpret(&stmts).is_ok());
    }

    #[test]
    fn calling_a_non_callable_is_runtime_error() {
        let err = run("var x = 1; x();").unwrap_err();
        assert!(matches!(err, RuntimeError::NotCallable { .. }));
    }

    #[test]
    fn arity_mismatch_is_runtime_error() {
        let err = run("fun f(a, b) { return a + b; } f(1);").unwrap_err();
        assert!(matches!(err, RuntimeError::ArityMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn var_decl_without_initializer_binds_nil() {
        assert!(run("var a; if (a == nil) { print \"yes\"; }").is_ok());
    }

    #[test]
    fn block_scope_is_restored_after_shadowing() {
        assert!(run("var a = 1; { var a = 2; print a; } print a;").is_ok());
    }
}
