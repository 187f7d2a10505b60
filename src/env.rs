// ABOUTME: Environment module for managing variable bindings and lexical scopes

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent. The enclosing link is
    /// fixed at construction time rather than set later, since closures need
    /// shared ownership (`Rc`) of their captured frame regardless.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Defines a binding in THIS scope. Redefinition is allowed and overwrites.
    pub fn define(&self, name: String, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Looks up a symbol in THIS scope and parent scopes recursively.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.bindings.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(ref parent) = self.parent {
            return parent.get(name);
        }

        Err(RuntimeError::UndefinedVariable { token: name.clone() })
    }

    /// Assigns to an existing binding, walking the enclosing chain. Never
    /// creates a new binding — an unknown name is an error.
    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.bindings.borrow().contains_key(&name.lexeme) {
            self.bindings.borrow_mut().insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(ref parent) = self.parent {
            return parent.assign(name, value);
        }

        Err(RuntimeError::UndefinedVariable { token: name.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn ident(name: &str) -> Token {
        Token::new(TokenKind::Identifier, name, 1)
    }

    #[test]
    fn define_and_get() {
        let env = Environment::new();
        env.define("x".to_string(), Value::Number(42.0));

        match env.get(&ident("x")) {
            Ok(Value::Number(n)) => assert_eq!(n, 42.0),
            other => panic!("expected Number(42.0), got {other:?}"),
        }
    }

    #[test]
    fn undefined_symbol_errors() {
        let env = Environment::new();
        assert!(matches!(
            env.get(&ident("undefined")),
            Err(RuntimeError::UndefinedVariable { .. })
        ));
    }

    #[test]
    fn redefinition_overwrites() {
        let env = Environment::new();
        env.define("x".to_string(), Value::Number(1.0));
        env.define("x".to_string(), Value::Number(2.0));
        match env.get(&ident("x")) {
            Ok(Value::Number(n)) => assert_eq!(n, 2.0),
            other => panic!("expected Number(2.0), got {other:?}"),
        }
    }

    #[test]
    fn child_shadows_parent() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Number(42.0));

        let child = Environment::with_parent(parent);
        child.define("x".to_string(), Value::Number(100.0));

        match child.get(&ident("x")) {
            Ok(Value::Number(n)) => assert_eq!(n, 100.0),
            other => panic!("expected Number(100.0), got {other:?}"),
        }
    }

    #[test]
    fn child_sees_parent_binding() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Number(42.0));

        let child = Environment::with_parent(parent);

        match child.get(&ident("x")) {
            Ok(Value::Number(n)) => assert_eq!(n, 42.0),
            other => panic!("expected Number(42.0), got {other:?}"),
        }
    }

    #[test]
    fn assign_updates_enclosing_scope_not_local() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Number(1.0));
        let child = Environment::with_parent(parent.clone());

        child.assign(&ident("x"), Value::Number(2.0)).unwrap();

        match parent.get(&ident("x")) {
            Ok(Value::Number(n)) => assert_eq!(n, 2.0),
            other => panic!("expected Number(2.0), got {other:?}"),
        }
    }

    #[test]
    fn assign_to_undefined_name_errors() {
        let env = Environment::new();
        assert!(matches!(
            env.assign(&ident("missing"), Value::Nil),
            Err(RuntimeError::UndefinedVariable { .. })
        ));
    }

    #[test]
    fn multiple_levels_of_nesting() {
        let grandparent = Environment::new();
        grandparent.define("a".to_string(), Value::Number(1.0));

        let parent = Environment::with_parent(grandparent);
        parent.define("b".to_string(), Value::Number(2.0));

        let child = Environment::with_parent(parent);
        child.define("c".to_string(), Value::Number(3.0));

        for (name, expected) in [("a", 1.0), ("b", 2.0), ("c", 3.0)] {
            match child.get(&ident(name)) {
                Ok(Value::Number(n)) => assert_eq!(n, expected),
                other => panic!("expected Number({expected}), got {other:?}"),
            }
        }
    }
}
