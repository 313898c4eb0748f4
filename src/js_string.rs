use crate::core::{EvalError, Interpreter, PropertyKey, Value, to_number, to_string_value};
use std::rc::Rc;

pub(crate) fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

fn units_of(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

fn from_units(units: &[u16]) -> Value {
    Value::String(Rc::from(String::from_utf16_lossy(units).as_str()))
}

/// Data properties of string primitives: `length` and index access.
pub(crate) fn string_property(s: &Rc<str>, key: &PropertyKey) -> Value {
    if matches!(key, PropertyKey::String(k) if &**k == "length") {
        return Value::Number(utf16_len(s) as f64);
    }
    if let Some(index) = key.as_index() {
        let units = units_of(s);
        if (index as usize) < units.len() {
            return from_units(&units[index as usize..index as usize + 1]);
        }
    }
    Value::Undefined
}

fn arg_index(interp: &Interpreter, args: &[Value], at: usize, default: f64) -> Result<f64, EvalError> {
    match args.get(at) {
        None | Some(Value::Undefined) => Ok(default),
        Some(v) => {
            let n = to_number(interp, v)?;
            Ok(if n.is_nan() { 0.0 } else { n })
        }
    }
}

/// Built-in string methods, dispatched by name.
pub(crate) fn handle_string_method(
    interp: &Interpreter,
    s: &Rc<str>,
    name: &str,
    args: &[Value],
) -> Option<Result<Value, EvalError>> {
    match name {
        "toString" | "valueOf" => Some(Ok(Value::String(s.clone()))),
        "charAt" => Some(char_at(interp, s, args)),
        "charCodeAt" => Some(char_code_at(interp, s, args)),
        "indexOf" => Some(index_of(interp, s, args)),
        "slice" => Some(slice(interp, s, args)),
        "substring" => Some(substring(interp, s, args)),
        "split" => Some(split(interp, s, args)),
        "concat" => Some(concat(interp, s, args)),
        "toUpperCase" => Some(Ok(Value::String(Rc::from(s.to_uppercase().as_str())))),
        "toLowerCase" => Some(Ok(Value::String(Rc::from(s.to_lowercase().as_str())))),
        "trim" => Some(Ok(Value::String(Rc::from(s.trim())))),
        _ => None,
    }
}

fn char_at(interp: &Interpreter, s: &Rc<str>, args: &[Value]) -> Result<Value, EvalError> {
    let i = arg_index(interp, args, 0, 0.0)?;
    let units = units_of(s);
    if i < 0.0 || i >= units.len() as f64 {
        return Ok(Value::String(Rc::from("")));
    }
    Ok(from_units(&units[i as usize..i as usize + 1]))
}

fn char_code_at(interp: &Interpreter, s: &Rc<str>, args: &[Value]) -> Result<Value, EvalError> {
    let i = arg_index(interp, args, 0, 0.0)?;
    let units = units_of(s);
    if i < 0.0 || i >= units.len() as f64 {
        return Ok(Value::Number(f64::NAN));
    }
    Ok(Value::Number(units[i as usize] as f64))
}

fn index_of(interp: &Interpreter, s: &Rc<str>, args: &[Value]) -> Result<Value, EvalError> {
    let needle = match args.first() {
        Some(v) => to_string_value(interp, v)?,
        None => return Ok(Value::Number(-1.0)),
    };
    let haystack = units_of(s);
    let needle = units_of(&needle);
    let from = arg_index(interp, args, 1, 0.0)?.max(0.0) as usize;
    if needle.is_empty() {
        return Ok(Value::Number(from.min(haystack.len()) as f64));
    }
    if needle.len() <= haystack.len() {
        for i in from..=haystack.len() - needle.len() {
            if haystack[i..i + needle.len()] == needle[..] {
                return Ok(Value::Number(i as f64));
            }
        }
    }
    Ok(Value::Number(-1.0))
}

fn slice(interp: &Interpreter, s: &Rc<str>, args: &[Value]) -> Result<Value, EvalError> {
    let units = units_of(s);
    let len = units.len() as f64;
    let resolve = |n: f64| -> usize {
        if n < 0.0 { (len + n).max(0.0) as usize } else { n.min(len) as usize }
    };
    let begin = resolve(arg_index(interp, args, 0, 0.0)?);
    let end = resolve(arg_index(interp, args, 1, len)?);
    if begin >= end {
        return Ok(Value::String(Rc::from("")));
    }
    Ok(from_units(&units[begin..end]))
}

fn substring(interp: &Interpreter, s: &Rc<str>, args: &[Value]) -> Result<Value, EvalError> {
    let units = units_of(s);
    let len = units.len() as f64;
    let mut begin = arg_index(interp, args, 0, 0.0)?.clamp(0.0, len) as usize;
    let mut end = arg_index(interp, args, 1, len)?.clamp(0.0, len) as usize;
    if begin > end {
        std::mem::swap(&mut begin, &mut end);
    }
    Ok(from_units(&units[begin..end]))
}

fn split(interp: &Interpreter, s: &Rc<str>, args: &[Value]) -> Result<Value, EvalError> {
    let separator = match args.first() {
        None | Some(Value::Undefined) => {
            return Ok(crate::js_array::make_array(vec![Value::String(s.clone())]));
        }
        Some(v) => to_string_value(interp, v)?,
    };
    let parts: Vec<Value> = if separator.is_empty() {
        units_of(s).iter().map(|u| from_units(&[*u])).collect()
    } else {
        s.split(separator.as_ref())
            .map(|piece| Value::String(Rc::from(piece)))
            .collect()
    };
    Ok(crate::js_array::make_array(parts))
}

fn concat(interp: &Interpreter, s: &Rc<str>, args: &[Value]) -> Result<Value, EvalError> {
    let mut out = s.to_string();
    for arg in args {
        out.push_str(&to_string_value(interp, arg)?);
    }
    Ok(Value::String(Rc::from(out.as_str())))
}
