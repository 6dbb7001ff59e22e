use crate::error::{PyError, Result};
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope. Closures keep their defining scope alive through
/// one of these.
pub type Env = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Env>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Env) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// A fresh child scope of `enclosing`, ready to share.
    pub fn child(enclosing: &Env) -> Env {
        Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(enclosing))))
    }

    /// Bind `name` in this scope, shadowing any outer binding.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str, line: usize) -> Result<Value> {
        if let Some(value) = self.values.get(name) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name, line)
        } else {
            Err(PyError::undefined_name(name, line))
        }
    }

    /// Plain assignment: update the nearest scope that already binds `name`,
    /// otherwise create the binding here.
    pub fn set(&mut self, name: &str, value: Value) {
        if let Err(value) = self.assign_existing(name, value) {
            debug!("'{}' not bound in any scope; defining locally", name);
            self.define(name, value);
        }
    }

    /// Overwrite an existing binding somewhere in the chain. Hands the value
    /// back when no scope binds `name`.
    fn assign_existing(&mut self, name: &str, value: Value) -> std::result::Result<(), Value> {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign_existing(name, value)
        } else {
            Err(value)
        }
    }

    /// Snapshot of the bindings made directly in this scope.
    pub fn bindings(&self) -> HashMap<String, Value> {
        self.values.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: &Value) -> i64 {
        match value {
            Value::Int(n) => *n,
            other => panic!("expected int, got {:?}", other),
        }
    }

    #[test]
    fn get_walks_outward() {
        let global: Env = Rc::new(RefCell::new(Environment::new()));
        global.borrow_mut().define("x", Value::Int(1));

        let inner = Environment::child(&global);

        assert_eq!(int(&inner.borrow().get("x", 1).unwrap()), 1);
    }

    #[test]
    fn get_undefined_name_fails() {
        let env = Environment::new();
        let err = env.get("missing", 7).expect_err("expected lookup failure");

        assert!(matches!(err, PyError::UndefinedName { ref name, line: 7 } if name == "missing"));
    }

    #[test]
    fn define_shadows_outer_binding() {
        let global: Env = Rc::new(RefCell::new(Environment::new()));
        global.borrow_mut().define("x", Value::Int(1));

        let inner = Environment::child(&global);
        inner.borrow_mut().define("x", Value::Int(2));

        assert_eq!(int(&inner.borrow().get("x", 1).unwrap()), 2);
        assert_eq!(int(&global.borrow().get("x", 1).unwrap()), 1);
    }

    #[test]
    fn set_updates_enclosing_binding() {
        let global: Env = Rc::new(RefCell::new(Environment::new()));
        global.borrow_mut().define("x", Value::Int(1));

        let inner = Environment::child(&global);
        inner.borrow_mut().set("x", Value::Int(5));

        assert_eq!(int(&global.borrow().get("x", 1).unwrap()), 5);
        assert!(inner.borrow().bindings().is_empty());
    }

    #[test]
    fn set_creates_binding_in_innermost_scope() {
        let global: Env = Rc::new(RefCell::new(Environment::new()));
        let inner = Environment::child(&global);

        inner.borrow_mut().set("y", Value::Int(3));

        assert_eq!(int(&inner.borrow().get("y", 1).unwrap()), 3);
        assert!(global.borrow().get("y", 1).is_err());
    }
}
