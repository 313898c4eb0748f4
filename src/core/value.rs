use crate::core::eval::{EvalError, StmtThunk};
use crate::core::scope::ScopePtr;
use crate::core::{Interpreter, PropertyKey};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

pub type JSObjectPtr = Rc<RefCell<JSObjectData>>;
pub type ValuePtr = Rc<RefCell<Value>>;

#[inline]
pub fn new_object() -> JSObjectPtr {
    Rc::new(RefCell::new(JSObjectData::new()))
}

#[derive(Clone, Debug)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Object(JSObjectPtr),
    /// Accessor property slot. Lives only inside property tables; never the
    /// result of evaluating an expression.
    Accessor(Rc<AccessorData>),
}

#[derive(Debug)]
pub struct AccessorData {
    pub get: Option<Value>,
    pub set: Option<Value>,
}

#[derive(Default)]
pub struct JSObjectData {
    pub properties: IndexMap<PropertyKey, ValuePtr>,
    /// Keys skipped by `for-in` and the `with` overlay copy.
    pub non_enumerable: HashSet<PropertyKey>,
    pub prototype: Option<JSObjectPtr>,
    pub is_array: bool,
    pub callable: Option<Callable>,
}

impl fmt::Debug for JSObjectData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JSObjectData {{ properties: {}, prototype: {}, is_array: {}, callable: {} }}",
            self.properties.len(),
            self.prototype.is_some(),
            self.is_array,
            self.callable.is_some()
        )
    }
}

impl JSObjectData {
    pub fn new() -> Self {
        JSObjectData::default()
    }

    pub fn insert(&mut self, key: PropertyKey, val: ValuePtr) {
        self.properties.insert(key, val);
    }

    pub fn get(&self, key: &PropertyKey) -> Option<ValuePtr> {
        self.properties.get(key).cloned()
    }

    pub fn contains_key(&self, key: &PropertyKey) -> bool {
        self.properties.contains_key(key)
    }

    pub fn remove(&mut self, key: &PropertyKey) -> Option<ValuePtr> {
        self.non_enumerable.remove(key);
        self.properties.shift_remove(key)
    }

    pub fn set_non_enumerable(&mut self, key: PropertyKey) {
        self.non_enumerable.insert(key);
    }

    pub fn is_enumerable(&self, key: &PropertyKey) -> bool {
        !self.non_enumerable.contains(key)
    }
}

#[derive(Clone)]
pub enum Callable {
    Interpreted(Rc<FunctionData>),
    Native(Rc<NativeFunction>),
}

/// A function value: a compiled template plus the lexical scope captured
/// where the defining thunk ran. Each invocation chains a fresh activation
/// frame off `env`.
pub struct FunctionData {
    pub template: Rc<FunctionTemplate>,
    pub env: ScopePtr,
}

/// The compile-time product of a function expression or declaration. Shared
/// by every function value the defining thunk produces.
pub struct FunctionTemplate {
    /// Source name; empty for anonymous expressions (an identifier target
    /// of a plain assignment donates its name, see the assignment thunk).
    pub name: String,
    pub params: Vec<String>,
    pub start: usize,
    pub end: usize,
    /// `source[start..end]`, backing `toString`/`valueOf`.
    pub source: Rc<str>,
    pub body: StmtThunk,
    pub hoisted: Hoisted,
    /// Named function expressions bind their own name in the activation
    /// frame, visible only to their own body.
    pub binds_own_name: bool,
}

/// Declarations collected at compile time, installed into a frame when it is
/// activated: `var` names bind to undefined, function declarations to their
/// function value.
#[derive(Default)]
pub struct Hoisted {
    pub vars: Vec<String>,
    pub funcs: Vec<(String, Rc<FunctionTemplate>)>,
}

pub struct NativeFunction {
    pub name: String,
    #[allow(clippy::type_complexity)]
    pub func: Box<dyn Fn(&Interpreter, &Value, &[Value]) -> Result<Value, EvalError>>,
}

/// Build an interpreter function value from its template. `$length`,
/// `$name` and `$isFunction` ride along as non-enumerable properties;
/// member access rewrites `length`/`name` to the `$`-prefixed keys.
pub fn make_function(template: &Rc<FunctionTemplate>, env: &ScopePtr) -> Value {
    let obj = new_object();
    {
        let mut data = obj.borrow_mut();
        data.callable = Some(Callable::Interpreted(Rc::new(FunctionData {
            template: template.clone(),
            env: env.clone(),
        })));
    }
    set_own(&obj, "$length".into(), Value::Number(template.params.len() as f64));
    set_own(&obj, "$name".into(), Value::String(Rc::from(template.name.as_str())));
    set_own(&obj, "$isFunction".into(), Value::Boolean(true));
    set_own(&obj, "prototype".into(), Value::Object(new_object()));
    {
        let mut data = obj.borrow_mut();
        data.set_non_enumerable("$length".into());
        data.set_non_enumerable("$name".into());
        data.set_non_enumerable("$isFunction".into());
        data.set_non_enumerable("prototype".into());
    }
    Value::Object(obj)
}

/// Wrap a Rust function as a callable host value, for installation on the
/// global object (or anywhere else scripts can reach).
pub fn make_native_function<F>(name: &str, func: F) -> Value
where
    F: Fn(&Interpreter, &Value, &[Value]) -> Result<Value, EvalError> + 'static,
{
    let obj = new_object();
    obj.borrow_mut().callable = Some(Callable::Native(Rc::new(NativeFunction {
        name: name.to_string(),
        func: Box::new(func),
    })));
    Value::Object(obj)
}

/// Raw own-property write: overwrite an existing slot in place, otherwise
/// insert a fresh one. No accessor or array-length handling.
pub fn set_own(obj: &JSObjectPtr, key: PropertyKey, val: Value) {
    let existing = obj.borrow().get(&key);
    match existing {
        Some(slot) => *slot.borrow_mut() = val,
        None => obj.borrow_mut().insert(key, Rc::new(RefCell::new(val))),
    }
}

pub fn get_own(obj: &JSObjectPtr, key: &PropertyKey) -> Option<ValuePtr> {
    obj.borrow().get(key)
}

impl Value {
    pub fn as_object(&self) -> Option<&JSObjectPtr> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn callable(&self) -> Option<Callable> {
        match self {
            Value::Object(obj) => obj.borrow().callable.clone(),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        self.callable().is_some()
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, Value::Object(_))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        strict_equals(self, other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", crate::core::number::number_to_string(*n)),
            Value::String(s) => write!(f, "{s}"),
            Value::Object(obj) => {
                let data = obj.borrow();
                if data.callable.is_some() {
                    write!(f, "function")
                } else if data.is_array {
                    write!(f, "[object Array]")
                } else {
                    write!(f, "[object Object]")
                }
            }
            Value::Accessor(_) => write!(f, "[accessor]"),
        }
    }
}

pub fn is_truthy(val: &Value) -> bool {
    match val {
        Value::Undefined | Value::Null => false,
        Value::Boolean(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Object(_) => true,
        Value::Accessor(_) => true,
    }
}

/// Strict (`===`) equality. Objects compare by identity.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) => true,
        (Value::Null, Value::Null) => true,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// `typeof` tag for a value.
pub fn type_of(val: &Value) -> &'static str {
    match val {
        Value::Undefined => "undefined",
        Value::Null => "object",
        Value::Boolean(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Object(obj) => {
            if obj.borrow().callable.is_some() {
                "function"
            } else {
                "object"
            }
        }
        Value::Accessor(_) => "object",
    }
}

/// Enumerable keys for `for-in` and the `with` overlay: own keys in
/// insertion order, then the prototype chain, shadowed keys skipped.
pub fn enumerate_keys(obj: &JSObjectPtr) -> Vec<PropertyKey> {
    let mut seen: HashSet<PropertyKey> = HashSet::new();
    let mut keys = Vec::new();
    let mut cur = Some(obj.clone());
    while let Some(o) = cur {
        let data = o.borrow();
        for key in data.properties.keys() {
            if seen.contains(key) {
                continue;
            }
            seen.insert(key.clone());
            if data.is_enumerable(key) {
                keys.push(key.clone());
            }
        }
        cur = data.prototype.clone();
    }
    keys
}
