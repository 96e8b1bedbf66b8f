// ABOUTME: Environment module for managing variable bindings and lexical scope chains

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A mapping from identifier text to runtime value, plus an optional parent
/// pointer forming a lexical-scope chain. An environment outlives any
/// closure that captured it, so it is reference-counted rather than owned
/// by a stack frame.
#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates the root environment, with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a child environment of `parent`.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Defines or overwrites a binding in this scope only.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Looks up a name by walking this scope and its parents outward.
    pub fn get(&self, token: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.bindings.borrow().get(&token.text) {
            return Ok(value.clone());
        }

        if let Some(ref parent) = self.parent {
            return parent.get(token);
        }

        Err(RuntimeError::UndefinedVariable {
            name: token.text.clone(),
            token: token.clone(),
        })
    }

    /// Assigns to the nearest enclosing scope already holding `name`. Never
    /// creates a new binding; fails if the name is undefined anywhere in
    /// the chain.
    pub fn assign(&self, token: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.bindings.borrow().contains_key(&token.text) {
            self.bindings
                .borrow_mut()
                .insert(token.text.clone(), value);
            return Ok(());
        }

        if let Some(ref parent) = self.parent {
            return parent.assign(token, value);
        }

        Err(RuntimeError::UndefinedVariable {
            name: token.text.clone(),
            token: token.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn ident(name: &str) -> Token {
        Token::new(name, TokenKind::Identifier, 1)
    }

    #[test]
    fn define_and_get() {
        let env = Environment::new();
        env.define("x", Value::Number(42.0));
        match env.get(&ident("x")) {
            Ok(Value::Number(n)) => assert_eq!(n, 42.0),
            _ => panic!("expected Number(42.0)"),
        }
    }

    #[test]
    fn undefined_lookup_is_runtime_error() {
        let env = Environment::new();
        assert!(env.get(&ident("missing")).is_err());
    }

    #[test]
    fn child_shadows_parent() {
        let parent = Environment::new();
        parent.define("x", Value::Number(1.0));
        let child = Environment::with_parent(parent.clone());
        child.define("x", Value::Number(2.0));

        assert!(matches!(child.get(&ident("x")), Ok(Value::Number(n)) if n == 2.0));
        assert!(matches!(parent.get(&ident("x")), Ok(Value::Number(n)) if n == 1.0));
    }

    #[test]
    fn child_sees_parent_binding() {
        let parent = Environment::new();
        parent.define("x", Value::Number(42.0));
        let child = Environment::with_parent(parent);
        assert!(matches!(child.get(&ident("x")), Ok(Value::Number(n)) if n == 42.0));
    }

    #[test]
    fn assign_never_creates_new_binding() {
        let env = Environment::new();
        let err = env
            .assign(&ident("y"), Value::Number(1.0))
            .expect_err("assigning an undefined name must fail");
        assert!(matches!(err, RuntimeError::UndefinedVariable { .. }));
    }

    #[test]
    fn assign_updates_nearest_enclosing_scope() {
        let parent = Environment::new();
        parent.define("x", Value::Number(1.0));
        let child = Environment::with_parent(parent.clone());

        child.assign(&ident("x"), Value::Number(99.0)).unwrap();

        assert!(matches!(parent.get(&ident("x")), Ok(Value::Number(n)) if n == 99.0));
    }
}
