// ABOUTME: Tree-walking evaluator for statement and expression trees

use crate::ast::{Expr, Literal, Stmt};
use crate::env::Environment;
use crate::error::{Diagnostics, RuntimeError};
use crate::token::{Token, TokenKind};
use crate::value::{LoxFunction, Value};
use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::rc::Rc;

/// Guards against unbounded recursion in user code. The host call stack would
/// eventually overflow uncatchably; this cap turns that into a reported
/// `RuntimeError` well before the host stack is exhausted.
const MAX_CALL_DEPTH: usize = 255;

/// Result of executing a statement: either nothing unusual happened, or a
/// `return` was hit and its value must unwind to the nearest function-call
/// frame. Kept distinct from `RuntimeError` so the unwind path can never
/// confuse a control-flow signal with an error.
enum Signal {
    Normal,
    Return(Value),
}

/// A `Write` sink backed by a shared, clonable buffer. Lets tests capture
/// everything a `print` statement writes instead of only observing the
/// diagnostics outcome; the real CLI binds the interpreter's writer to
/// `Stdout` instead.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        SharedBuffer::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct Interpreter<'a> {
    environment: RefCell<Rc<Environment>>,
    diagnostics: &'a Diagnostics,
    call_depth: Cell<usize>,
    stdout: RefCell<Box<dyn Write>>,
}

impl<'a> Interpreter<'a> {
    pub fn new(diagnostics: &'a Diagnostics) -> Self {
        Interpreter::with_environment(diagnostics, Environment::new())
    }

    /// Shares one environment across many `interpret` calls (used by the REPL
    /// so bindings persist across lines within the same session).
    pub fn with_environment(diagnostics: &'a Diagnostics, environment: Rc<Environment>) -> Self {
        Interpreter {
            environment: RefCell::new(environment),
            diagnostics,
            call_depth: Cell::new(0),
            stdout: RefCell::new(Box::new(io::stdout())),
        }
    }

    /// Like `with_environment`, but writes `print` output to `writer` instead
    /// of the process's real stdout. Intended for tests that need to assert on
    /// literal printed output (see `SharedBuffer`).
    pub fn with_writer(diagnostics: &'a Diagnostics, environment: Rc<Environment>, writer: Box<dyn Write>) -> Self {
        Interpreter {
            environment: RefCell::new(environment),
            diagnostics,
            call_depth: Cell::new(0),
            stdout: RefCell::new(writer),
        }
    }

    pub fn environment(&self) -> Rc<Environment> {
        self.environment.borrow().clone()
    }

    /// Executes each top-level statement in order. A runtime error aborts the
    /// remainder of the program and is reported once; a `return` escaping to
    /// the top level indicates a parser/interpreter defect, not user error.
    pub fn interpret(&self, statements: &[Stmt]) {
        for stmt in statements {
            match self.execute(stmt) {
                Ok(Signal::Normal) => {}
                Ok(Signal::Return(_)) => {
                    unreachable!("return statement executed outside of a function call frame")
                }
                Err(err) => {
                    self.diagnostics.runtime_error(&err);
                    return;
                }
            }
        }
    }

    // ===== statement execution =====

    fn execute(&self, stmt: &Stmt) -> Result<Signal, RuntimeError> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Signal::Normal)
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                let _ = writeln!(self.stdout.borrow_mut(), "{}", value);
                Ok(Signal::Normal)
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.borrow().define(name.lexeme.clone(), value);
                Ok(Signal::Normal)
            }
            Stmt::Block(statements) => {
                let enclosing = self.environment.borrow().clone();
                self.execute_block(statements, Environment::with_parent(enclosing))
            }
            Stmt::If { condition, then_branch, else_branch } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute_all(then_branch)
                } else if !else_branch.is_empty() {
                    self.execute_all(else_branch)
                } else {
                    Ok(Signal::Normal)
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute_all(body)? {
                        Signal::Normal => {}
                        signal @ Signal::Return(_) => return Ok(signal),
                    }
                }
                Ok(Signal::Normal)
            }
            Stmt::Function(declaration) => {
                let closure = self.environment.borrow().clone();
                let function = Value::Callable(Rc::new(LoxFunction { declaration: declaration.clone(), closure }));
                self.environment.borrow().define(declaration.name.lexeme.clone(), function);
                Ok(Signal::Normal)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Signal::Return(value))
            }
        }
    }

    fn execute_all(&self, statements: &[Stmt]) -> Result<Signal, RuntimeError> {
        for stmt in statements {
            match self.execute(stmt)? {
                Signal::Normal => {}
                signal @ Signal::Return(_) => return Ok(signal),
            }
        }
        Ok(Signal::Normal)
    }

    /// Pushes `new_env` as the current environment, runs `statements`, and
    /// restores the previous environment on every exit path — normal
    /// completion, an early return, or a propagated runtime error. The guard's
    /// `Drop` is Rust's expression of the book's `finally` helper.
    fn execute_block(&self, statements: &[Stmt], new_env: Rc<Environment>) -> Result<Signal, RuntimeError> {
        let previous = self.environment.replace(new_env);
        let _restore = EnvironmentGuard { interpreter: self, previous: Some(previous) };
        self.execute_all(statements)
    }

    // ===== expression evaluation =====

    fn evaluate(&self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(literal) => Ok(literal_value(literal)),
            Expr::Variable(name) => self.environment.borrow().get(name),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.borrow().assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Unary { op, right } => self.evaluate_unary(op, right),
            Expr::Binary { left, op, right } => self.evaluate_binary(left, op, right),
            Expr::Logical { left, op, right } => self.evaluate_logical(left, op, right),
            Expr::Call { callee, paren, args } => self.evaluate_call(callee, paren, args),
        }
    }

    fn evaluate_unary(&self, op: &Token, right: &Expr) -> Result<Value, RuntimeError> {
        let right = self.evaluate(right)?;
        match op.kind {
            TokenKind::Minus => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::operand_must_be_number(op)),
            },
            TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
            _ => unreachable!("parser only produces MINUS/BANG unary operators"),
        }
    }

    fn evaluate_binary(&self, left: &Expr, op: &Token, right: &Expr) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match op.kind {
            TokenKind::Plus => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => Err(RuntimeError::operands_must_be_numbers_or_strings(op)),
            },
            TokenKind::Minus => numeric_binary(op, left, right, |a, b| a - b),
            TokenKind::Star => numeric_binary(op, left, right, |a, b| a * b),
            TokenKind::Slash => numeric_binary(op, left, right, |a, b| a / b),
            TokenKind::Greater => comparison(op, left, right, |a, b| a > b),
            TokenKind::GreaterEqual => comparison(op, left, right, |a, b| a >= b),
            TokenKind::Less => comparison(op, left, right, |a, b| a < b),
            TokenKind::LessEqual => comparison(op, left, right, |a, b| a <= b),
            TokenKind::EqualEqual => Ok(Value::Bool(left.is_equal(&right))),
            TokenKind::BangEqual => Ok(Value::Bool(!left.is_equal(&right))),
            _ => unreachable!("parser only produces arithmetic/comparison/equality binary operators"),
        }
    }

    fn evaluate_logical(&self, left: &Expr, op: &Token, right: &Expr) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;
        match op.kind {
            TokenKind::Or if left.is_truthy() => Ok(left),
            TokenKind::And if !left.is_truthy() => Ok(left),
            _ => self.evaluate(right),
        }
    }

    fn evaluate_call(&self, callee: &Expr, paren: &Token, arg_exprs: &[Expr]) -> Result<Value, RuntimeError> {
        let callee = self.evaluate(callee)?;
        let mut args = Vec::with_capacity(arg_exprs.len());
        for arg in arg_exprs {
            args.push(self.evaluate(arg)?);
        }

        let Value::Callable(function) = callee else {
            return Err(RuntimeError::NotCallable { token: paren.clone() });
        };

        if args.len() != function.arity() {
            return Err(RuntimeError::ArityMismatch {
                token: paren.clone(),
                expected: function.arity(),
                actual: args.len(),
            });
        }

        self.call_function(&function, args, paren)
    }

    fn call_function(&self, function: &Rc<LoxFunction>, args: Vec<Value>, call_site: &Token) -> Result<Value, RuntimeError> {
        if self.call_depth.get() >= MAX_CALL_DEPTH {
            return Err(RuntimeError::StackOverflow { token: call_site.clone() });
        }
        self.call_depth.set(self.call_depth.get() + 1);
        let _depth_guard = CallDepthGuard { interpreter: self };

        let call_env = Environment::with_parent(function.closure.clone());
        for (param, arg) in function.declaration.params.iter().zip(args) {
            call_env.define(param.lexeme.clone(), arg);
        }

        match self.execute_block(&function.declaration.body, call_env)? {
            Signal::Normal => Ok(Value::Nil),
            Signal::Return(value) => Ok(value),
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Nil => Value::Nil,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::String(s) => Value::String(s.clone()),
    }
}

fn numeric_binary(op: &Token, left: Value, right: Value, f: impl Fn(f64, f64) -> f64) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(f(a, b))),
        _ => Err(RuntimeError::operands_must_be_numbers(op)),
    }
}

fn comparison(op: &Token, left: Value, right: Value, f: impl Fn(f64, f64) -> bool) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(f(a, b))),
        _ => Err(RuntimeError::operands_must_be_numbers(op)),
    }
}

struct EnvironmentGuard<'i, 'a> {
    interpreter: &'i Interpreter<'a>,
    previous: Option<Rc<Environment>>,
}

impl Drop for EnvironmentGuard<'_, '_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.interpreter.environment.replace(previous);
        }
    }
}

struct CallDepthGuard<'i, 'a> {
    interpreter: &'i Interpreter<'a>,
}

impl Drop for CallDepthGuard<'_, '_> {
    fn drop(&mut self) {
        self.interpreter.call_depth.set(self.interpreter.call_depth.get() - 1);
    }
}
