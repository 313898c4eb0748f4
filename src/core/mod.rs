use crate::JSError;
use crate::raise_syntax_error;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

mod ast;
pub use ast::*;

mod token;
pub use token::*;

mod parser;
pub use parser::*;

pub(crate) mod number;

mod property_key;
pub use property_key::*;

mod value;
pub use value::*;

mod scope;
pub use scope::*;

mod eval;
pub use eval::*;

mod compile;
pub use compile::*;

/// Parser callback: source text in, ESTree JSON out. Installed through
/// `Options` to replace the built-in front end.
pub type ParserCallback = Rc<dyn Fn(&str) -> Result<serde_json::Value, JSError>>;

#[derive(Clone)]
pub struct Options {
    /// Wall-clock budget in milliseconds, enforced by the loop engines and
    /// at call entry; 0 disables it. Exceeding it raises a catchable error
    /// object.
    pub timeout_ms: u64,
    /// Interpreted-call nesting bound; exceeding it raises a catchable
    /// RangeError-shaped value.
    pub max_call_depth: usize,
    pub parser: Option<ParserCallback>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            timeout_ms: 0,
            max_call_depth: 512,
            parser: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("timeout_ms", &self.timeout_ms)
            .field("max_call_depth", &self.max_call_depth)
            .field("parser", &self.parser.is_some())
            .finish()
    }
}

/// The evaluator. Holds the global object (root scope data and root `this`)
/// and the per-run machinery: the last-value slot, the call stack of frame
/// labels, the `this` context stack, and the optional deadline.
pub struct Interpreter {
    global: JSObjectPtr,
    options: Options,
    value: RefCell<Value>,
    call_stack: RefCell<Vec<String>>,
    context: RefCell<Vec<Value>>,
    deadline: Cell<Option<Instant>>,
}

impl Interpreter {
    pub fn new(global: JSObjectPtr) -> Self {
        Interpreter::with_options(global, Options::default())
    }

    pub fn with_options(global: JSObjectPtr, options: Options) -> Self {
        Interpreter {
            global,
            options,
            value: RefCell::new(Value::Undefined),
            call_stack: RefCell::new(Vec::new()),
            context: RefCell::new(Vec::new()),
            deadline: Cell::new(None),
        }
    }

    pub fn global(&self) -> &JSObjectPtr {
        &self.global
    }

    /// Evaluate source text against the configured global (or `ctx` when
    /// given), returning the value of the last completed top-level
    /// statement expression. Parsing uses the parser callback when one is
    /// configured, the built-in front end otherwise.
    pub fn evaluate(&self, source: &str, ctx: Option<&JSObjectPtr>) -> Result<Value, JSError> {
        let program = match &self.options.parser {
            Some(parser) => Node::from_json(&parser(source)?)?,
            None => parse_program(source)?,
        };
        self.evaluate_node(&program, source, ctx)
    }

    /// Evaluate an ESTree program in its JSON form. `source` backs function
    /// `toString`, which slices `source[start..end]`.
    pub fn evaluate_ast(&self, ast: &serde_json::Value, source: &str, ctx: Option<&JSObjectPtr>) -> Result<Value, JSError> {
        let program = Node::from_json(ast)?;
        self.evaluate_node(&program, source, ctx)
    }

    /// Evaluate an already-parsed program.
    pub fn evaluate_node(&self, program: &Node, source: &str, ctx: Option<&JSObjectPtr>) -> Result<Value, JSError> {
        let compiler = Compiler::new(source);
        let (hoisted, thunk) = compiler.compile_program(program)?;

        let root_data = ctx.cloned().unwrap_or_else(|| self.global.clone());
        let root = Scope::root("root", root_data.clone());
        self.call_stack.borrow_mut().clear();
        *self.context.borrow_mut() = vec![Value::Object(root_data)];
        *self.value.borrow_mut() = Value::Undefined;
        self.deadline.set(if self.options.timeout_ms > 0 {
            Some(Instant::now() + Duration::from_millis(self.options.timeout_ms))
        } else {
            None
        });

        activate(&root, &hoisted);
        log::debug!("running program ({} hoisted vars, {} functions)", hoisted.vars.len(), hoisted.funcs.len());

        match thunk(self, &root, None)? {
            ControlFlow::Throw(value) => Err(JSError::Throw { value }),
            ControlFlow::Break(_) => Err(raise_syntax_error!("break statement not in loop or switch")),
            ControlFlow::Continue(_) => Err(raise_syntax_error!("continue statement not in loop")),
            _ => Ok(self.get_value()),
        }
    }

    /// The last recorded top-level value.
    pub fn get_value(&self) -> Value {
        self.value.borrow().clone()
    }

    /// Frame labels of calls currently executing, innermost last. Empty
    /// between runs.
    pub fn call_stack(&self) -> Vec<String> {
        self.call_stack.borrow().clone()
    }

    /// Record a statement result in the last-value slot. Suppressed while
    /// any call is active; control-flow signals are never stored, except
    /// that a `Return` is unwrapped to its value.
    pub(crate) fn set_value(&self, flow: &ControlFlow) {
        if !self.call_stack.borrow().is_empty() {
            return;
        }
        match flow {
            ControlFlow::Normal(v) | ControlFlow::Return(v) => {
                *self.value.borrow_mut() = v.clone();
            }
            _ => {}
        }
    }

    pub(crate) fn current_context(&self) -> Value {
        self.context.borrow().last().cloned().unwrap_or(Value::Undefined)
    }

    pub(crate) fn root_context(&self) -> Value {
        self.context.borrow().first().cloned().unwrap_or(Value::Undefined)
    }

    pub(crate) fn push_context(&self, this: Value) {
        self.context.borrow_mut().push(this);
    }

    pub(crate) fn pop_context(&self) {
        self.context.borrow_mut().pop();
    }

    pub(crate) fn push_frame(&self, label: String) {
        self.call_stack.borrow_mut().push(label);
    }

    pub(crate) fn pop_frame(&self) {
        self.call_stack.borrow_mut().pop();
    }

    pub(crate) fn call_depth(&self) -> usize {
        self.call_stack.borrow().len()
    }

    pub(crate) fn max_call_depth(&self) -> usize {
        self.options.max_call_depth
    }

    pub(crate) fn check_deadline(&self) -> Result<(), EvalError> {
        if let Some(deadline) = self.deadline.get()
            && Instant::now() >= deadline
        {
            return Err(EvalError::Thrown(make_error(
                "Error",
                &format!("script execution timed out after {}ms", self.options.timeout_ms),
            )));
        }
        Ok(())
    }
}

/// Evaluate a script against a fresh, empty global object.
pub fn evaluate_script<T: AsRef<str>>(source: T) -> Result<Value, JSError> {
    let interp = Interpreter::new(new_object());
    interp.evaluate(source.as_ref(), None)
}
