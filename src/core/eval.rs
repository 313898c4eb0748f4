use crate::core::number::{number_from_str, number_to_string, to_int32, to_uint32};
use crate::core::scope::ScopePtr;
use crate::core::value::{
    Callable, Hoisted, JSObjectPtr, Value, ValuePtr, make_function, new_object, set_own, strict_equals,
};
use crate::core::{Interpreter, PropertyKey, Scope};
use crate::{JSError, raise_syntax_error};
use std::cell::RefCell;
use std::rc::Rc;

/// Control-flow signal produced by a statement thunk. Enclosing statements
/// catch signals by tag comparison and swallow, transform, or re-propagate
/// them; no host exception mechanism is involved until the outermost driver.
#[derive(Clone, Debug)]
pub enum ControlFlow {
    /// Statement produced no value (empty statement, var-only declaration).
    Empty,
    Normal(Value),
    Break(Option<String>),
    Continue(Option<String>),
    Return(Value),
    Throw(Value),
    /// Sentinel used only inside switch dispatch.
    DefaultCase,
}

impl ControlFlow {
    pub fn is_signal(&self) -> bool {
        matches!(
            self,
            ControlFlow::Break(_) | ControlFlow::Continue(_) | ControlFlow::Return(_) | ControlFlow::Throw(_)
        )
    }
}

/// Expression evaluation error: either an internal interpreter error or a
/// scripted value in flight, to be caught by `try` or surfaced at the top.
#[derive(Debug)]
pub enum EvalError {
    Js(JSError),
    Thrown(Value),
}

impl From<JSError> for EvalError {
    fn from(e: JSError) -> Self {
        EvalError::Js(e)
    }
}

/// A compiled expression: evaluates one AST node against the current scope.
pub type ExprThunk = Rc<dyn Fn(&Interpreter, &ScopePtr) -> Result<Value, EvalError>>;

/// A compiled statement. The optional argument is the enclosing label, set
/// only when a labeled statement runs a loop body so the loop engine can
/// recognize its own label.
pub type StmtThunk = Rc<dyn Fn(&Interpreter, &ScopePtr, Option<&str>) -> Result<ControlFlow, JSError>>;

/// Convert an expression result into statement control flow.
pub fn flow_from(res: Result<Value, EvalError>) -> Result<ControlFlow, JSError> {
    match res {
        Ok(v) => Ok(ControlFlow::Normal(v)),
        Err(EvalError::Thrown(v)) => Ok(ControlFlow::Throw(v)),
        Err(EvalError::Js(e)) => Err(e),
    }
}

/// A decomposed assignment target: the owner and the key under which to
/// read, write, or delete.
pub enum Target {
    /// A scope frame's data table (identifier lvalues). Reads and writes go
    /// straight at the table, no accessor or array-length handling.
    Scoped(JSObjectPtr, PropertyKey),
    /// An evaluated receiver (member lvalues).
    Member(Value, PropertyKey),
}

pub fn target_read(interp: &Interpreter, target: &Target) -> Result<Value, EvalError> {
    match target {
        Target::Scoped(data, key) => Ok(data
            .borrow()
            .get(key)
            .map(|slot| slot.borrow().clone())
            .unwrap_or(Value::Undefined)),
        Target::Member(base, key) => get_property(interp, base, key),
    }
}

pub fn target_write(interp: &Interpreter, target: &Target, val: Value) -> Result<(), EvalError> {
    match target {
        Target::Scoped(data, key) => {
            let existing = data.borrow().get(key);
            match existing {
                Some(slot) => *slot.borrow_mut() = val,
                None => data.borrow_mut().insert(key.clone(), Rc::new(RefCell::new(val))),
            }
            Ok(())
        }
        Target::Member(base, key) => set_property(interp, base, key, val),
    }
}

pub fn target_delete(target: &Target) -> Result<Value, EvalError> {
    match target {
        Target::Scoped(data, key) => {
            data.borrow_mut().remove(key);
            Ok(Value::Boolean(true))
        }
        Target::Member(base, key) => delete_property(base, key),
    }
}

// ---- thrown error values ----

/// Build a `{name, message}` error object for a scripted throw.
pub fn make_error(name: &str, message: &str) -> Value {
    let obj = new_object();
    set_own(&obj, "name".into(), Value::String(Rc::from(name)));
    set_own(&obj, "message".into(), Value::String(Rc::from(message)));
    Value::Object(obj)
}

pub fn throw_type_error<T>(message: &str) -> Result<T, EvalError> {
    Err(EvalError::Thrown(make_error("TypeError", message)))
}

pub fn throw_range_error<T>(message: &str) -> Result<T, EvalError> {
    Err(EvalError::Thrown(make_error("RangeError", message)))
}

// ---- coercions ----

#[derive(Clone, Copy, Debug)]
pub enum Hint {
    Default,
    Number,
    String,
}

/// ToPrimitive. User-supplied `valueOf`/`toString` run first (order by
/// hint); with neither producing a primitive, the default string form
/// applies (arrays join, functions yield source text).
pub fn to_primitive(interp: &Interpreter, val: &Value, hint: Hint) -> Result<Value, EvalError> {
    let Value::Object(obj) = val else {
        return Ok(val.clone());
    };
    let methods: [&str; 2] = match hint {
        Hint::String => ["toString", "valueOf"],
        Hint::Number | Hint::Default => ["valueOf", "toString"],
    };
    for name in methods {
        let method = get_property(interp, val, &PropertyKey::from(name))?;
        if method.is_callable() {
            let result = invoke(interp, &method, val.clone(), &[])?;
            if result.is_primitive() {
                return Ok(result);
            }
        }
    }
    Ok(Value::String(Rc::from(default_object_string(interp, obj)?.as_str())))
}

/// Default string form for objects without usable conversion methods.
pub fn default_object_string(interp: &Interpreter, obj: &JSObjectPtr) -> Result<String, EvalError> {
    let (is_array, callable) = {
        let data = obj.borrow();
        (data.is_array, data.callable.clone())
    };
    if is_array {
        return crate::js_array::join(interp, obj, ",");
    }
    match callable {
        Some(Callable::Interpreted(fd)) => Ok(fd.template.source.to_string()),
        Some(Callable::Native(nf)) => Ok(format!("function {}() {{ [native code] }}", nf.name)),
        None => Ok("[object Object]".to_string()),
    }
}

pub fn to_number(interp: &Interpreter, val: &Value) -> Result<f64, EvalError> {
    match val {
        Value::Undefined => Ok(f64::NAN),
        Value::Null => Ok(0.0),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => Ok(*n),
        Value::String(s) => Ok(number_from_str(s)),
        Value::Object(_) => {
            let prim = to_primitive(interp, val, Hint::Number)?;
            to_number(interp, &prim)
        }
        Value::Accessor(_) => Ok(f64::NAN),
    }
}

pub fn to_string_value(interp: &Interpreter, val: &Value) -> Result<Rc<str>, EvalError> {
    match val {
        Value::Undefined => Ok(Rc::from("undefined")),
        Value::Null => Ok(Rc::from("null")),
        Value::Boolean(b) => Ok(Rc::from(if *b { "true" } else { "false" })),
        Value::Number(n) => Ok(Rc::from(number_to_string(*n).as_str())),
        Value::String(s) => Ok(s.clone()),
        Value::Object(_) => {
            let prim = to_primitive(interp, val, Hint::String)?;
            to_string_value(interp, &prim)
        }
        Value::Accessor(_) => Ok(Rc::from("[accessor]")),
    }
}

pub fn to_property_key(interp: &Interpreter, val: &Value) -> Result<PropertyKey, EvalError> {
    match val {
        Value::String(s) => Ok(PropertyKey::from(s)),
        Value::Number(n) => Ok(PropertyKey::from(*n)),
        other => {
            let s = to_string_value(interp, other)?;
            Ok(PropertyKey::from(&s))
        }
    }
}

// ---- equality and comparison ----

pub fn loose_equals(interp: &Interpreter, a: &Value, b: &Value) -> Result<bool, EvalError> {
    match (a, b) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => Ok(true),
        (Value::Number(_), Value::Number(_))
        | (Value::String(_), Value::String(_))
        | (Value::Boolean(_), Value::Boolean(_))
        | (Value::Object(_), Value::Object(_)) => Ok(strict_equals(a, b)),
        (Value::Number(x), Value::String(s)) => Ok(*x == number_from_str(s)),
        (Value::String(s), Value::Number(y)) => Ok(number_from_str(s) == *y),
        (Value::Boolean(x), _) => loose_equals(interp, &Value::Number(if *x { 1.0 } else { 0.0 }), b),
        (_, Value::Boolean(y)) => loose_equals(interp, a, &Value::Number(if *y { 1.0 } else { 0.0 })),
        (Value::Object(_), Value::Number(_) | Value::String(_)) => {
            let prim = to_primitive(interp, a, Hint::Default)?;
            loose_equals(interp, &prim, b)
        }
        (Value::Number(_) | Value::String(_), Value::Object(_)) => {
            let prim = to_primitive(interp, b, Hint::Default)?;
            loose_equals(interp, a, &prim)
        }
        _ => Ok(false),
    }
}

/// Abstract relational comparison `l < r`; `None` when either side is NaN.
fn less_than(interp: &Interpreter, l: &Value, r: &Value) -> Result<Option<bool>, EvalError> {
    let lp = to_primitive(interp, l, Hint::Number)?;
    let rp = to_primitive(interp, r, Hint::Number)?;
    if let (Value::String(a), Value::String(b)) = (&lp, &rp) {
        return Ok(Some(a.as_ref() < b.as_ref()));
    }
    let a = to_number(interp, &lp)?;
    let b = to_number(interp, &rp)?;
    if a.is_nan() || b.is_nan() {
        Ok(None)
    } else {
        Ok(Some(a < b))
    }
}

// ---- binary operators ----

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Gt,
    Le,
    Ge,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    In,
    InstanceOf,
}

impl BinaryOp {
    pub fn from_str(op: &str) -> Option<BinaryOp> {
        let tag = match op {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "===" => BinaryOp::StrictEq,
            "!==" => BinaryOp::StrictNe,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::Le,
            ">=" => BinaryOp::Ge,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            ">>>" => BinaryOp::UShr,
            "&" => BinaryOp::BitAnd,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "in" => BinaryOp::In,
            "instanceof" => BinaryOp::InstanceOf,
            _ => return None,
        };
        Some(tag)
    }
}

pub fn apply_binary(interp: &Interpreter, op: BinaryOp, l: &Value, r: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add => {
            let lp = to_primitive(interp, l, Hint::Default)?;
            let rp = to_primitive(interp, r, Hint::Default)?;
            if matches!(lp, Value::String(_)) || matches!(rp, Value::String(_)) {
                let a = to_string_value(interp, &lp)?;
                let b = to_string_value(interp, &rp)?;
                let mut out = String::with_capacity(a.len() + b.len());
                out.push_str(&a);
                out.push_str(&b);
                Ok(Value::String(Rc::from(out.as_str())))
            } else {
                Ok(Value::Number(to_number(interp, &lp)? + to_number(interp, &rp)?))
            }
        }
        BinaryOp::Sub => Ok(Value::Number(to_number(interp, l)? - to_number(interp, r)?)),
        BinaryOp::Mul => Ok(Value::Number(to_number(interp, l)? * to_number(interp, r)?)),
        BinaryOp::Div => Ok(Value::Number(to_number(interp, l)? / to_number(interp, r)?)),
        BinaryOp::Mod => Ok(Value::Number(to_number(interp, l)? % to_number(interp, r)?)),
        BinaryOp::Eq => Ok(Value::Boolean(loose_equals(interp, l, r)?)),
        BinaryOp::Ne => Ok(Value::Boolean(!loose_equals(interp, l, r)?)),
        BinaryOp::StrictEq => Ok(Value::Boolean(strict_equals(l, r))),
        BinaryOp::StrictNe => Ok(Value::Boolean(!strict_equals(l, r))),
        BinaryOp::Lt => Ok(Value::Boolean(less_than(interp, l, r)?.unwrap_or(false))),
        BinaryOp::Gt => Ok(Value::Boolean(less_than(interp, r, l)?.unwrap_or(false))),
        BinaryOp::Le => Ok(Value::Boolean(matches!(less_than(interp, r, l)?, Some(false)))),
        BinaryOp::Ge => Ok(Value::Boolean(matches!(less_than(interp, l, r)?, Some(false)))),
        BinaryOp::Shl => {
            let a = to_int32(to_number(interp, l)?);
            let b = to_uint32(to_number(interp, r)?) & 31;
            Ok(Value::Number((a << b) as f64))
        }
        BinaryOp::Shr => {
            let a = to_int32(to_number(interp, l)?);
            let b = to_uint32(to_number(interp, r)?) & 31;
            Ok(Value::Number((a >> b) as f64))
        }
        BinaryOp::UShr => {
            let a = to_uint32(to_number(interp, l)?);
            let b = to_uint32(to_number(interp, r)?) & 31;
            Ok(Value::Number((a >> b) as f64))
        }
        BinaryOp::BitAnd => Ok(Value::Number(
            (to_int32(to_number(interp, l)?) & to_int32(to_number(interp, r)?)) as f64,
        )),
        BinaryOp::BitOr => Ok(Value::Number(
            (to_int32(to_number(interp, l)?) | to_int32(to_number(interp, r)?)) as f64,
        )),
        BinaryOp::BitXor => Ok(Value::Number(
            (to_int32(to_number(interp, l)?) ^ to_int32(to_number(interp, r)?)) as f64,
        )),
        BinaryOp::In => match r {
            Value::Object(obj) => {
                let key = to_property_key(interp, l)?;
                Ok(Value::Boolean(has_property(obj, &key)))
            }
            _ => throw_type_error("Cannot use 'in' operator on a non-object"),
        },
        BinaryOp::InstanceOf => instance_of(interp, l, r),
    }
}

fn instance_of(interp: &Interpreter, l: &Value, r: &Value) -> Result<Value, EvalError> {
    if !r.is_callable() {
        return throw_type_error("Right-hand side of 'instanceof' is not callable");
    }
    let proto = get_property(interp, r, &PropertyKey::from("prototype"))?;
    let Value::Object(proto) = proto else {
        return Ok(Value::Boolean(false));
    };
    let Value::Object(obj) = l else {
        return Ok(Value::Boolean(false));
    };
    let mut cur = obj.borrow().prototype.clone();
    while let Some(p) = cur {
        if Rc::ptr_eq(&p, &proto) {
            return Ok(Value::Boolean(true));
        }
        cur = p.borrow().prototype.clone();
    }
    Ok(Value::Boolean(false))
}

// ---- property access ----

/// Member-access key rewrite: interpreter-created functions report their
/// declared arity and source name through `$length`/`$name`.
fn rewrite_function_key(obj: &JSObjectPtr, key: &PropertyKey) -> PropertyKey {
    if obj.borrow().callable.is_some()
        && let PropertyKey::String(s) = key
    {
        if &**s == "length" {
            return PropertyKey::from("$length");
        }
        if &**s == "name" {
            return PropertyKey::from("$name");
        }
    }
    key.clone()
}

pub fn get_property(interp: &Interpreter, base: &Value, key: &PropertyKey) -> Result<Value, EvalError> {
    match base {
        Value::Object(obj) => {
            let key = rewrite_function_key(obj, key);
            let mut cur = Some(obj.clone());
            while let Some(o) = cur {
                let (slot, proto) = {
                    let data = o.borrow();
                    (data.get(&key), data.prototype.clone())
                };
                if let Some(slot) = slot {
                    let v = slot.borrow().clone();
                    return match v {
                        Value::Accessor(acc) => match &acc.get {
                            Some(getter) => invoke(interp, getter, base.clone(), &[]),
                            None => Ok(Value::Undefined),
                        },
                        other => Ok(other),
                    };
                }
                cur = proto;
            }
            Ok(Value::Undefined)
        }
        Value::String(s) => Ok(crate::js_string::string_property(s, key)),
        Value::Number(_) | Value::Boolean(_) => Ok(Value::Undefined),
        Value::Null => throw_type_error(&format!("Cannot read properties of null (reading '{key}')")),
        Value::Undefined => throw_type_error(&format!("Cannot read properties of undefined (reading '{key}')")),
        Value::Accessor(_) => Ok(Value::Undefined),
    }
}

pub fn set_property(interp: &Interpreter, base: &Value, key: &PropertyKey, val: Value) -> Result<(), EvalError> {
    match base {
        Value::Object(obj) => {
            let key = rewrite_function_key(obj, key);
            // a setter anywhere on the chain intercepts the write
            let mut own_slot: Option<ValuePtr> = None;
            let mut cur = Some(obj.clone());
            let mut at_own = true;
            while let Some(o) = cur {
                let (slot, proto) = {
                    let data = o.borrow();
                    (data.get(&key), data.prototype.clone())
                };
                if let Some(slot) = slot {
                    let existing = slot.borrow().clone();
                    if let Value::Accessor(acc) = existing {
                        if let Some(setter) = &acc.set {
                            invoke(interp, setter, base.clone(), &[val.clone()])?;
                        }
                        return Ok(());
                    }
                    if at_own {
                        own_slot = Some(slot);
                    }
                    break;
                }
                cur = proto;
                at_own = false;
            }
            match own_slot {
                Some(slot) => *slot.borrow_mut() = val.clone(),
                None => obj.borrow_mut().insert(key.clone(), Rc::new(RefCell::new(val.clone()))),
            }
            if obj.borrow().is_array {
                crate::js_array::after_property_set(interp, obj, &key, &val)?;
            }
            Ok(())
        }
        Value::Null => throw_type_error(&format!("Cannot set properties of null (setting '{key}')")),
        Value::Undefined => throw_type_error(&format!("Cannot set properties of undefined (setting '{key}')")),
        // writes to primitive receivers are silently dropped (non-strict)
        _ => Ok(()),
    }
}

pub fn delete_property(base: &Value, key: &PropertyKey) -> Result<Value, EvalError> {
    match base {
        Value::Object(obj) => {
            obj.borrow_mut().remove(key);
            Ok(Value::Boolean(true))
        }
        Value::Null | Value::Undefined => throw_type_error(&format!("Cannot delete property '{key}' of null or undefined")),
        _ => Ok(Value::Boolean(true)),
    }
}

pub fn has_property(obj: &JSObjectPtr, key: &PropertyKey) -> bool {
    let mut cur = Some(obj.clone());
    while let Some(o) = cur {
        let (found, proto) = {
            let data = o.borrow();
            (data.contains_key(key), data.prototype.clone())
        };
        if found {
            return true;
        }
        cur = proto;
    }
    false
}

// ---- invocation ----

/// Install hoisted declarations into a freshly created frame: `var` names
/// bind to undefined unless present, function declarations overwrite only
/// an undefined (or absent) slot.
pub fn activate(scope: &ScopePtr, hoisted: &Hoisted) {
    for name in &hoisted.vars {
        let key = PropertyKey::from(name.as_str());
        if !scope.data.borrow().contains_key(&key) {
            scope.data.borrow_mut().insert(key, Rc::new(RefCell::new(Value::Undefined)));
        }
    }
    for (name, template) in &hoisted.funcs {
        let key = PropertyKey::from(name.as_str());
        let current = scope.data.borrow().get(&key).map(|slot| slot.borrow().clone());
        if matches!(current, None | Some(Value::Undefined)) {
            let func = make_function(template, scope);
            let existing = scope.data.borrow().get(&key);
            match existing {
                Some(slot) => *slot.borrow_mut() = func,
                None => scope.data.borrow_mut().insert(key, Rc::new(RefCell::new(func))),
            }
        }
    }
}

/// Call a function value. Interpreted functions get a fresh activation
/// frame chained to their captured scope, an `arguments` binding, the
/// receiver pushed on the context stack, and a call-stack frame label for
/// the duration of the body.
pub fn invoke(interp: &Interpreter, callee: &Value, this: Value, args: &[Value]) -> Result<Value, EvalError> {
    let Value::Object(obj) = callee else {
        return throw_type_error(&format!("{} is not a function", type_name_for_error(callee)));
    };
    let callable = obj.borrow().callable.clone();
    let Some(callable) = callable else {
        return throw_type_error("value is not a function");
    };
    match callable {
        Callable::Native(nf) => (nf.func)(interp, &this, args),
        Callable::Interpreted(fd) => {
            interp.check_deadline()?;
            if interp.call_depth() >= interp.max_call_depth() {
                return throw_range_error("Maximum call stack size exceeded");
            }
            let template = &fd.template;
            log::trace!("invoking {}({} args)", template.name, args.len());
            interp.push_frame(format!("{}({},{})", template.name, template.start, template.end));

            let frame = Scope::child(&fd.env, if template.name.is_empty() { "anonymous" } else { &template.name });
            activate(&frame, &template.hoisted);
            if template.binds_own_name {
                let key = PropertyKey::from(template.name.as_str());
                if !frame.data.borrow().contains_key(&key) {
                    frame.data.borrow_mut().insert(key, Rc::new(RefCell::new(callee.clone())));
                }
            }
            set_own(&frame.data, "arguments".into(), crate::js_array::make_array(args.to_vec()));
            for (i, param) in template.params.iter().enumerate() {
                set_own(
                    &frame.data,
                    PropertyKey::from(param.as_str()),
                    args.get(i).cloned().unwrap_or(Value::Undefined),
                );
            }

            interp.push_context(this);
            let result = (template.body)(interp, &frame, None);
            interp.pop_context();
            interp.pop_frame();

            match result {
                Ok(ControlFlow::Return(v)) => Ok(v),
                Ok(ControlFlow::Throw(v)) => Err(EvalError::Thrown(v)),
                Ok(ControlFlow::Break(_)) => Err(EvalError::Js(raise_syntax_error!(
                    "break statement not in loop or switch"
                ))),
                Ok(ControlFlow::Continue(_)) => Err(EvalError::Js(raise_syntax_error!("continue statement not in loop"))),
                Ok(_) => Ok(Value::Undefined),
                Err(e) => Err(EvalError::Js(e)),
            }
        }
    }
}

fn type_name_for_error(v: &Value) -> String {
    match v {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        other => crate::core::value::type_of(other).to_string(),
    }
}

/// `new` semantics: allocate an object wired to the constructor's
/// `prototype` property, call with it as the receiver, and keep whatever
/// object the constructor returned instead, if any.
pub fn construct(interp: &Interpreter, callee: &Value, args: &[Value]) -> Result<Value, EvalError> {
    if !callee.is_callable() {
        return throw_type_error("constructor is not a function");
    }
    let instance = new_object();
    if let Value::Object(proto) = get_property(interp, callee, &PropertyKey::from("prototype"))? {
        instance.borrow_mut().prototype = Some(proto);
    }
    let this = Value::Object(instance);
    let returned = invoke(interp, callee, this.clone(), args)?;
    Ok(match returned {
        Value::Object(_) => returned,
        _ => this,
    })
}

/// Method-call dispatch. A real property wins; with nothing found, the
/// built-in methods for the receiver's kind apply.
pub fn call_method(interp: &Interpreter, base: &Value, key: &PropertyKey, args: &[Value]) -> Result<Value, EvalError> {
    let func = get_property(interp, base, key)?;
    if func.is_callable() {
        return invoke(interp, &func, base.clone(), args);
    }
    if matches!(func, Value::Undefined)
        && let PropertyKey::String(name) = key
    {
        if let Value::String(s) = base
            && let Some(result) = crate::js_string::handle_string_method(interp, s, name, args)
        {
            return result;
        }
        if let Value::Object(obj) = base {
            let (is_array, is_function) = {
                let data = obj.borrow();
                (data.is_array, data.callable.is_some())
            };
            if is_array && let Some(result) = crate::js_array::handle_array_method(interp, obj, name, args) {
                return result;
            }
            if is_function && let Some(result) = crate::js_function::handle_function_method(interp, base, name, args) {
                return result;
            }
            if let Some(result) = crate::js_object::handle_object_method(interp, base, name, args) {
                return result;
            }
        }
    }
    throw_type_error(&format!("{key} is not a function"))
}
