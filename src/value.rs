use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::environment::Env;
use crate::stmt::Stmt;

/// Every value a tinypy program can produce.
///
/// Scalars are copied by value; functions, classes and instances are shared
/// handles, so cloning a `Value` never duplicates an object.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    None,
    Function(Rc<Function>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
}

/// A user-defined function together with the scope it was defined in.
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<[Stmt]>,
    pub closure: Env,
}

// The closure usually contains the function itself, so the derived impl
// would recurse forever.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct Class {
    pub name: String,
    /// Every top-level binding of the class body.
    pub methods: HashMap<String, Value>,
}

impl Class {
    pub fn find_method(&self, name: &str) -> Option<Value> {
        self.methods.get(name).cloned()
    }
}

pub struct Instance {
    pub class: Rc<Class>,
    pub attributes: RefCell<HashMap<String, Value>>,
}

// Attributes may hold the instance itself (`n.me = n`), so only their names
// are printed.
impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.attributes.borrow().keys().cloned().collect();
        names.sort();

        f.debug_struct("Instance")
            .field("class", &self.class.name)
            .field("attributes", &names)
            .finish_non_exhaustive()
    }
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Instance {
            class,
            attributes: RefCell::new(HashMap::new()),
        }
    }

    /// Own attributes first, then the class's methods.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.attributes.borrow().get(name) {
            return Some(value.clone());
        }

        self.class.find_method(name)
    }

    pub fn set(&self, name: &str, value: Value) {
        self.attributes.borrow_mut().insert(name.to_string(), value);
    }
}

impl Value {
    /// Python truthiness: zero, empty and `None` are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::None => false,
            Value::Function(_) | Value::Class(_) | Value::Instance(_) => true,
        }
    }

    pub fn stringify(&self) -> String {
        self.to_string()
    }

    /// Name used in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "str".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::None => "NoneType".to_string(),
            Value::Function(_) => "function".to_string(),
            Value::Class(_) => "type".to_string(),
            Value::Instance(instance) => instance.class.name.clone(),
        }
    }

    /// Numeric view used by arithmetic: the value as `f64` and whether it
    /// counts as an integer (`Int` and `Bool` do).
    pub fn as_number(&self) -> Option<(f64, bool)> {
        match self {
            Value::Int(n) => Some((*n as f64, true)),
            Value::Bool(b) => Some((if *b { 1.0 } else { 0.0 }, true)),
            Value::Float(n) => Some((*n, false)),
            _ => None,
        }
    }

    /// Integer view for exact arithmetic on `Int`/`Bool` operands.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => f.write_str(itoa::Buffer::new().format(*n)),

            // Fixed six fractional digits, matching C's `%f`.
            Value::Float(n) => write!(f, "{:.6}", n),

            Value::Str(s) => write!(f, "{}", s),

            Value::Bool(b) => f.write_str(if *b { "True" } else { "False" }),

            Value::None => f.write_str("None"),

            Value::Function(func) => write!(f, "<function {}>", func.name),

            Value::Class(class) => write!(f, "<class '{}'>", class.name),

            Value::Instance(instance) => write!(f, "<{} object>", instance.class.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str) -> Rc<Class> {
        Rc::new(Class {
            name: name.to_string(),
            methods: HashMap::new(),
        })
    }

    #[test]
    fn truthiness_follows_python_rules() {
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Int(-3).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(Value::Float(0.1).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(Value::Str("0".to_string()).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::None.is_truthy());
        assert!(Value::Class(class("C")).is_truthy());
        assert!(Value::Instance(Rc::new(Instance::new(class("C")))).is_truthy());
    }

    #[test]
    fn stringify_scalars() {
        assert_eq!(Value::Int(-42).stringify(), "-42");
        assert_eq!(Value::Float(2.5).stringify(), "2.500000");
        assert_eq!(Value::Bool(true).stringify(), "True");
        assert_eq!(Value::None.stringify(), "None");
        assert_eq!(Value::Str("hi".to_string()).stringify(), "hi");
    }

    #[test]
    fn stringify_objects() {
        let point = class("Point");

        assert_eq!(Value::Class(point.clone()).stringify(), "<class 'Point'>");
        assert_eq!(
            Value::Instance(Rc::new(Instance::new(point))).stringify(),
            "<Point object>"
        );
    }

    #[test]
    fn debug_of_self_referencing_instance_terminates() {
        let instance = Rc::new(Instance::new(class("Node")));
        instance.set("me", Value::Instance(Rc::clone(&instance)));
        instance.set("id", Value::Int(1));

        let rendered = format!("{:?}", Value::Instance(instance));

        assert!(rendered.contains("\"Node\""), "got: {}", rendered);
        assert!(rendered.contains("[\"id\", \"me\"]"), "got: {}", rendered);
    }

    #[test]
    fn instance_attributes_shadow_class_methods() {
        let mut methods = HashMap::new();
        methods.insert("x".to_string(), Value::Int(1));

        let class = Rc::new(Class {
            name: "C".to_string(),
            methods,
        });
        let instance = Instance::new(class);

        assert!(matches!(instance.get("x"), Some(Value::Int(1))));

        instance.set("x", Value::Int(2));

        assert!(matches!(instance.get("x"), Some(Value::Int(2))));
        assert!(instance.get("y").is_none());
    }
}
