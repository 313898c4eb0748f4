use crate::core::{
    EvalError, Interpreter, JSObjectPtr, PropertyKey, Value, new_object, set_own, strict_equals, throw_range_error,
    to_number, to_string_value,
};
use std::rc::Rc;

/// Build a dense array object from evaluated elements.
pub fn make_array(elements: Vec<Value>) -> Value {
    let obj = new_object();
    obj.borrow_mut().is_array = true;
    let len = elements.len();
    for (i, v) in elements.into_iter().enumerate() {
        set_own(&obj, PropertyKey::from(i), v);
    }
    set_length(&obj, len as u32);
    Value::Object(obj)
}

pub fn is_array(obj: &JSObjectPtr) -> bool {
    obj.borrow().is_array
}

pub fn array_length(obj: &JSObjectPtr) -> u32 {
    let slot = obj.borrow().get(&PropertyKey::from("length"));
    match slot {
        Some(slot) => match &*slot.borrow() {
            Value::Number(n) if *n >= 0.0 => *n as u32,
            _ => 0,
        },
        None => 0,
    }
}

fn set_length(obj: &JSObjectPtr, len: u32) {
    set_own(obj, PropertyKey::from("length"), Value::Number(len as f64));
    obj.borrow_mut().set_non_enumerable(PropertyKey::from("length"));
}

fn element(obj: &JSObjectPtr, index: u32) -> Value {
    let slot = obj.borrow().get(&PropertyKey::from(index));
    slot.map(|s| s.borrow().clone()).unwrap_or(Value::Undefined)
}

/// Length bookkeeping after a raw property write on an array: growing
/// index writes stretch `length`, and assignments to `length` itself
/// truncate or extend.
pub(crate) fn after_property_set(
    interp: &Interpreter,
    obj: &JSObjectPtr,
    key: &PropertyKey,
    val: &Value,
) -> Result<(), EvalError> {
    if let Some(index) = key.as_index() {
        if (index as u64) + 1 > array_length(obj) as u64 {
            set_length(obj, index + 1);
        }
        return Ok(());
    }
    if matches!(key, PropertyKey::String(s) if &**s == "length") {
        let n = to_number(interp, val)?;
        if n.is_nan() || n < 0.0 || n.fract() != 0.0 || n >= 4294967296.0 {
            return throw_range_error("Invalid array length");
        }
        let new_len = n as u32;
        let old_len = {
            // the raw write replaced the slot with `val`; read the previous
            // bound from the highest index instead of trusting it
            let data = obj.borrow();
            data.properties
                .keys()
                .filter_map(|k| k.as_index())
                .map(|i| i + 1)
                .max()
                .unwrap_or(0)
        };
        if new_len < old_len {
            for i in new_len..old_len {
                obj.borrow_mut().remove(&PropertyKey::from(i));
            }
        }
        set_length(obj, new_len);
    }
    Ok(())
}

/// Array.prototype.join with accessor-free element reads.
pub(crate) fn join(interp: &Interpreter, obj: &JSObjectPtr, separator: &str) -> Result<String, EvalError> {
    let len = array_length(obj);
    let mut parts = Vec::with_capacity(len as usize);
    for i in 0..len {
        let v = element(obj, i);
        parts.push(match v {
            Value::Undefined | Value::Null => String::new(),
            other => to_string_value(interp, &other)?.to_string(),
        });
    }
    Ok(parts.join(separator))
}

/// Built-in array methods, dispatched by name when no real property
/// shadows them.
pub(crate) fn handle_array_method(
    interp: &Interpreter,
    obj: &JSObjectPtr,
    name: &str,
    args: &[Value],
) -> Option<Result<Value, EvalError>> {
    match name {
        "push" => Some(array_push(obj, args)),
        "pop" => Some(array_pop(obj)),
        "join" => Some(array_join(interp, obj, args)),
        "indexOf" => Some(array_index_of(interp, obj, args)),
        "slice" => Some(array_slice(interp, obj, args)),
        "concat" => Some(array_concat(obj, args)),
        _ => None,
    }
}

fn array_push(obj: &JSObjectPtr, args: &[Value]) -> Result<Value, EvalError> {
    let mut len = array_length(obj);
    for v in args {
        set_own(obj, PropertyKey::from(len), v.clone());
        len += 1;
    }
    set_length(obj, len);
    Ok(Value::Number(len as f64))
}

fn array_pop(obj: &JSObjectPtr) -> Result<Value, EvalError> {
    let len = array_length(obj);
    if len == 0 {
        return Ok(Value::Undefined);
    }
    let last = element(obj, len - 1);
    obj.borrow_mut().remove(&PropertyKey::from(len - 1));
    set_length(obj, len - 1);
    Ok(last)
}

fn array_join(interp: &Interpreter, obj: &JSObjectPtr, args: &[Value]) -> Result<Value, EvalError> {
    let separator = match args.first() {
        None | Some(Value::Undefined) => Rc::from(","),
        Some(v) => to_string_value(interp, v)?,
    };
    Ok(Value::String(Rc::from(join(interp, obj, &separator)?.as_str())))
}

fn array_index_of(interp: &Interpreter, obj: &JSObjectPtr, args: &[Value]) -> Result<Value, EvalError> {
    let needle = args.first().cloned().unwrap_or(Value::Undefined);
    let len = array_length(obj);
    let from = match args.get(1) {
        Some(v) => {
            let n = to_number(interp, v)?;
            if n.is_nan() {
                0
            } else if n < 0.0 {
                (len as i64 + n as i64).max(0) as u32
            } else {
                n as u32
            }
        }
        None => 0,
    };
    for i in from..len {
        if strict_equals(&element(obj, i), &needle) {
            return Ok(Value::Number(i as f64));
        }
    }
    Ok(Value::Number(-1.0))
}

fn array_slice(interp: &Interpreter, obj: &JSObjectPtr, args: &[Value]) -> Result<Value, EvalError> {
    let len = array_length(obj) as i64;
    let resolve = |v: Option<&Value>, default: i64| -> Result<i64, EvalError> {
        match v {
            None | Some(Value::Undefined) => Ok(default),
            Some(v) => {
                let n = to_number(interp, v)?;
                let n = if n.is_nan() { 0 } else { n as i64 };
                Ok(if n < 0 { (len + n).max(0) } else { n.min(len) })
            }
        }
    };
    let begin = resolve(args.first(), 0)?;
    let end = resolve(args.get(1), len)?;
    let mut out = Vec::new();
    let mut i = begin;
    while i < end {
        out.push(element(obj, i as u32));
        i += 1;
    }
    Ok(make_array(out))
}

fn array_concat(obj: &JSObjectPtr, args: &[Value]) -> Result<Value, EvalError> {
    let mut out = Vec::new();
    for i in 0..array_length(obj) {
        out.push(element(obj, i));
    }
    for arg in args {
        match arg {
            Value::Object(other) if other.borrow().is_array => {
                for i in 0..array_length(other) {
                    out.push(element(other, i));
                }
            }
            other => out.push(other.clone()),
        }
    }
    Ok(make_array(out))
}

/// Elements of an array-like value, for `Function.prototype.apply`.
pub(crate) fn elements_of(obj: &JSObjectPtr) -> Vec<Value> {
    (0..array_length(obj)).map(|i| element(obj, i)).collect()
}
