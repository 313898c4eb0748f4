use crate::core::{EvalError, Interpreter, Value, default_object_string, to_property_key};
use std::rc::Rc;

/// Fallback methods every object understands when nothing on the object
/// (or its prototype chain) shadows them.
pub(crate) fn handle_object_method(
    interp: &Interpreter,
    base: &Value,
    name: &str,
    args: &[Value],
) -> Option<Result<Value, EvalError>> {
    let Value::Object(obj) = base else {
        return None;
    };
    match name {
        "hasOwnProperty" => {
            let key = args.first().cloned().unwrap_or(Value::Undefined);
            Some(to_property_key(interp, &key).map(|k| Value::Boolean(obj.borrow().contains_key(&k))))
        }
        "toString" => Some(default_object_string(interp, obj).map(|s| Value::String(Rc::from(s.as_str())))),
        "valueOf" => Some(Ok(base.clone())),
        _ => None,
    }
}
