use std::cell::RefCell;
use std::fmt;
use std::io::{self, Stdout, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::environment::{Env, Environment};
use crate::error::{PyError, Result};
use crate::expr::Expr;
use crate::operators;
use crate::stmt::{Program, Stmt};
use crate::token::{Token, TokenType};
use crate::value::{Class, Function, Instance, Value};

/// How a statement finished. Anything other than `Normal` unwinds the
/// enclosing blocks until a loop (`Break`/`Continue`) or a call (`Return`)
/// consumes it.
#[derive(Debug, Clone)]
pub enum Flow {
    Normal(Value),
    Return(Value),
    Break,
    Continue,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::Normal(value) => write!(f, "{}", value),
            Flow::Return(value) => write!(f, "return {}", value),
            Flow::Break => f.write_str("break"),
            Flow::Continue => f.write_str("continue"),
        }
    }
}

impl Flow {
    fn keyword(&self) -> &'static str {
        match self {
            Flow::Normal(_) => "",
            Flow::Return(_) => "return",
            Flow::Break => "break",
            Flow::Continue => "continue",
        }
    }
}

/// Tree-walking evaluator.  Owns the global scope for its whole lifetime and
/// writes `print` output to `W`.
pub struct Interpreter<W: Write = Stdout> {
    globals: Env,
    out: W,
}

impl Interpreter<Stdout> {
    /// Creates an interpreter printing to standard output.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(out: W) -> Self {
        info!("Initializing Interpreter");

        Self {
            globals: Rc::new(RefCell::new(Environment::new())),
            out,
        }
    }

    pub fn globals(&self) -> &Env {
        &self.globals
    }

    /// Consumes the interpreter, handing back the output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs a whole program in the global scope.
    pub fn interpret(&mut self, program: &Program) -> Result<()> {
        debug!("Interpreting {} statements", program.statements.len());

        let globals: Env = Rc::clone(&self.globals);
        let flow: Flow = self.execute_block(&program.statements, &globals)?;

        self.out.flush()?;

        match flow {
            Flow::Normal(_) => {
                info!("Interpretation completed successfully");
                Ok(())
            }
            Flow::Return(_) => Err(PyError::unhandled_signal("return", "function")),
            other => Err(PyError::unhandled_signal(other.keyword(), "loop")),
        }
    }

    /// Evaluates a single expression against the global scope.
    pub fn evaluate_expression(&mut self, expr: &Expr) -> Result<Value> {
        let globals: Env = Rc::clone(&self.globals);
        let value: Value = self.evaluate(expr, &globals)?;

        self.out.flush()?;

        Ok(value)
    }

    /// Executes statements in order in `env`; the first non-`Normal` flow
    /// stops the block and is returned.
    pub fn execute_block(&mut self, statements: &[Stmt], env: &Env) -> Result<Flow> {
        for stmt in statements {
            match self.execute(stmt, env)? {
                Flow::Normal(_) => {}
                signal => {
                    debug!("Block interrupted by {}", signal);
                    return Ok(signal);
                }
            }
        }

        Ok(Flow::Normal(Value::None))
    }

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt, env: &Env) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => Ok(Flow::Normal(self.evaluate(expr, env)?)),

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr, env)?;
                writeln!(self.out, "{}", value)?;
                debug!("Printed value: {}", value);
                Ok(Flow::Normal(Value::None))
            }

            Stmt::Pass => Ok(Flow::Normal(Value::None)),

            Stmt::Break(_) => Ok(Flow::Break),

            Stmt::Continue(_) => Ok(Flow::Continue),

            Stmt::Return(_keyword, expr) => {
                let value: Value = match expr {
                    Some(e) => self.evaluate(e, env)?,
                    None => Value::None,
                };
                debug!("Returning value: {}", value);
                Ok(Flow::Return(value))
            }

            Stmt::If {
                condition,
                then_branch,
                elif_branches,
                else_branch,
            } => {
                if self.evaluate(condition, env)?.is_truthy() {
                    debug!("If condition is truthy; executing then branch");
                    return self.execute_block(then_branch, &Environment::child(env));
                }

                for (elif_condition, block) in elif_branches {
                    if self.evaluate(elif_condition, env)?.is_truthy() {
                        debug!("Elif condition is truthy; executing its branch");
                        return self.execute_block(block, &Environment::child(env));
                    }
                }

                if let Some(block) = else_branch {
                    debug!("All conditions falsy; executing else branch");
                    return self.execute_block(block, &Environment::child(env));
                }

                Ok(Flow::Normal(Value::None))
            }

            Stmt::While(condition, body) => {
                debug!("Entering while loop");

                while self.evaluate(condition, env)?.is_truthy() {
                    match self.execute_block(body, &Environment::child(env))? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal(_) | Flow::Continue => {}
                    }
                }

                info!("Exited while loop");
                Ok(Flow::Normal(Value::None))
            }

            Stmt::Function(name, params, body) => {
                let function = Value::Function(Rc::new(Function {
                    name: name.lexeme.clone(),
                    params: params.iter().map(|p| p.lexeme.clone()).collect(),
                    body: Rc::clone(body),
                    closure: Rc::clone(env),
                }));

                env.borrow_mut().define(&name.lexeme, function.clone());

                info!(
                    "Function '{}' defined with {} parameters",
                    name.lexeme,
                    params.len()
                );
                Ok(Flow::Normal(function))
            }

            Stmt::Class(name, body) => self.define_class(name, body, env),
        }
    }

    /// Evaluates the class body in its own scope, then snapshots every
    /// binding it made into the class's method table.
    fn define_class(&mut self, name: &Token, body: &[Stmt], env: &Env) -> Result<Flow> {
        debug!("Defining class '{}'", name.lexeme);

        let scope: Env = Environment::child(env);

        match self.execute_block(body, &scope)? {
            Flow::Normal(_) => {}
            signal => {
                return Err(PyError::unhandled_signal(
                    signal.keyword(),
                    format!("class body '{}'", name.lexeme),
                ));
            }
        }

        let methods = scope.borrow().bindings();

        info!(
            "Class '{}' defined with {} attributes",
            name.lexeme,
            methods.len()
        );

        let class = Value::Class(Rc::new(Class {
            name: name.lexeme.clone(),
            methods,
        }));

        env.borrow_mut().define(&name.lexeme, class.clone());

        Ok(Flow::Normal(class))
    }

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr, env: &Env) -> Result<Value> {
        let value: Value = match expr {
            Expr::Int(_) | Expr::Float(_) | Expr::Str(_) | Expr::Bool(_) | Expr::None(_) => {
                evaluate_literal(expr)?
            }

            Expr::Variable(name) => {
                let value: Value = env.borrow().get(&name.lexeme, name.line)?;
                debug!("Variable '{}' evaluated to: {}", name.lexeme, value);
                value
            }

            Expr::Assign(name, rhs) => {
                let value: Value = self.evaluate(rhs, env)?;
                env.borrow_mut().set(&name.lexeme, value.clone());
                debug!("Assigned value {} to '{}'", value, name.lexeme);
                value
            }

            Expr::Binary(left, op, right) => self.evaluate_binary(left, op, right, env)?,

            Expr::Unary(op, right) => {
                let operand: Value = self.evaluate(right, env)?;

                match op.token_type {
                    TokenType::NOT => Value::Bool(!operand.is_truthy()),
                    _ => operators::negate(&operand),
                }
            }

            Expr::Call(callee, paren, arguments) => {
                self.evaluate_call(callee, paren, arguments, env)?
            }

            Expr::Get(object, name) => {
                let object: Value = self.evaluate(object, env)?;
                get_property(&object, name)?
            }

            Expr::Set(object, name, rhs) => {
                let object: Value = self.evaluate(object, env)?;
                let value: Value = self.evaluate(rhs, env)?;

                match &object {
                    Value::Instance(instance) => instance.set(&name.lexeme, value.clone()),
                    other => {
                        return Err(PyError::attribute_assign(
                            &other.type_name(),
                            &name.lexeme,
                            name.line,
                        ));
                    }
                }

                value
            }
        };

        Ok(value)
    }

    fn evaluate_binary(
        &mut self,
        left: &Expr,
        op: &Token,
        right: &Expr,
        env: &Env,
    ) -> Result<Value> {
        debug!("Evaluating binary operation: {}", op.lexeme);

        // `and` / `or` short-circuit and always produce a Bool.
        match op.token_type {
            TokenType::AND => {
                if !self.evaluate(left, env)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                return Ok(Value::Bool(self.evaluate(right, env)?.is_truthy()));
            }

            TokenType::OR => {
                if self.evaluate(left, env)?.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                return Ok(Value::Bool(self.evaluate(right, env)?.is_truthy()));
            }

            _ => {}
        }

        let left_val: Value = self.evaluate(left, env)?;
        let right_val: Value = self.evaluate(right, env)?;

        // Overloads come from the class only, like method binding: a function
        // stored on the instance under a magic name does not take part.
        if let Value::Instance(instance) = &left_val {
            let overload: Option<Value> = operators::magic_method(&op.token_type)
                .and_then(|name| instance.class.find_method(name));

            if let Some(method) = overload {
                debug!(
                    "Dispatching '{}' to {} overload",
                    op.lexeme,
                    instance.class.name
                );
                let args: Vec<Value> = vec![left_val.clone(), right_val];
                return self.call_value(&method, args, op.line);
            }
        }

        Ok(operators::binary(&op.token_type, &left_val, &right_val))
    }

    fn evaluate_call(
        &mut self,
        callee: &Expr,
        paren: &Token,
        arguments: &[Expr],
        env: &Env,
    ) -> Result<Value> {
        debug!("Evaluating function call");

        let mut arg_values: Vec<Value> = Vec::with_capacity(arguments.len() + 1);

        // `obj.method(...)`: a function found through the class (not stored
        // on the instance) receives the instance as its first argument.
        let callee_val: Value = match callee {
            Expr::Get(object, name) => {
                let object: Value = self.evaluate(object, env)?;
                let method: Value = get_property(&object, name)?;

                if let (Value::Instance(instance), Value::Function(_)) = (&object, &method) {
                    if !instance.attributes.borrow().contains_key(&name.lexeme) {
                        debug!("Binding instance to method '{}'", name.lexeme);
                        arg_values.push(object.clone());
                    }
                }

                method
            }

            other => self.evaluate(other, env)?,
        };

        for arg in arguments {
            let av: Value = self.evaluate(arg, env)?;
            debug!("Evaluated argument => {}", av);
            arg_values.push(av);
        }

        self.call_value(&callee_val, arg_values, paren.line)
    }

    /// Invokes a callable value with already-evaluated arguments.
    pub fn call_value(&mut self, callee: &Value, args: Vec<Value>, line: usize) -> Result<Value> {
        match callee {
            Value::Function(function) => self.call_function(function, args),

            Value::Class(class) => self.instantiate(class, args, line),

            other => Err(PyError::not_callable(&other.type_name(), line)),
        }
    }

    fn call_function(&mut self, function: &Rc<Function>, args: Vec<Value>) -> Result<Value> {
        debug!("Calling user-defined function '{}'", function.name);

        // Lexical scoping: the call frame hangs off the closure, not the caller.
        let frame: Env = Environment::child(&function.closure);

        {
            let mut frame_ref = frame.borrow_mut();
            let mut args = args.into_iter();

            // Missing arguments bind None; surplus ones are dropped.
            for param in &function.params {
                let arg_val: Value = args.next().unwrap_or(Value::None);
                debug!("Binding parameter '{}' to {}", param, arg_val);
                frame_ref.define(param, arg_val);
            }
        }

        match self.execute_block(&function.body, &frame)? {
            Flow::Return(value) => {
                info!("Function '{}' returned: {}", function.name, value);
                Ok(value)
            }
            Flow::Normal(_) => {
                info!("Function '{}' returned None", function.name);
                Ok(Value::None)
            }
            signal => Err(PyError::unhandled_signal(
                signal.keyword(),
                format!("loop in function '{}'", function.name),
            )),
        }
    }

    fn instantiate(&mut self, class: &Rc<Class>, args: Vec<Value>, line: usize) -> Result<Value> {
        debug!("Instantiating class '{}'", class.name);

        let instance = Value::Instance(Rc::new(Instance::new(Rc::clone(class))));

        let initializer: Option<Value> = class
            .find_method("__init__")
            .or_else(|| class.find_method("init"));

        if let Some(init) = initializer {
            let mut init_args: Vec<Value> = Vec::with_capacity(args.len() + 1);
            init_args.push(instance.clone());
            init_args.extend(args);

            // The initializer's own return value is discarded.
            self.call_value(&init, init_args, line)?;
        }

        Ok(instance)
    }
}

/// Builds a value from a literal token's text.
fn evaluate_literal(expr: &Expr) -> Result<Value> {
    let malformed = |kind: &'static str, token: &Token| PyError::LiteralParse {
        kind,
        text: token.lexeme.clone(),
        line: token.line,
    };

    let value = match expr {
        Expr::Int(token) => Value::Int(
            token
                .lexeme
                .parse::<i64>()
                .map_err(|_| malformed("int", token))?,
        ),

        Expr::Float(token) => Value::Float(
            token
                .lexeme
                .parse::<f64>()
                .map_err(|_| malformed("float", token))?,
        ),

        Expr::Str(token) => match &token.token_type {
            TokenType::STRING(s) => Value::Str(s.clone()),
            _ => return Err(malformed("string", token)),
        },

        Expr::Bool(token) => match token.token_type {
            TokenType::TRUE => Value::Bool(true),
            TokenType::FALSE => Value::Bool(false),
            _ => return Err(malformed("bool", token)),
        },

        _ => Value::None,
    };

    Ok(value)
}

/// Instance: own attributes, then class methods. Class: its method table.
fn get_property(object: &Value, name: &Token) -> Result<Value> {
    let found: Option<Value> = match object {
        Value::Instance(instance) => instance.get(&name.lexeme),
        Value::Class(class) => class.find_method(&name.lexeme),
        _ => None,
    };

    found.ok_or_else(|| PyError::attribute_lookup(&object.type_name(), &name.lexeme, name.line))
}
