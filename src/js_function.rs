use crate::core::{Callable, EvalError, Interpreter, Value, invoke, throw_type_error};
use std::rc::Rc;

/// Built-in methods on function values: `call`, `apply`, and a `toString`
/// that reproduces the source slice the function was compiled from.
pub(crate) fn handle_function_method(
    interp: &Interpreter,
    base: &Value,
    name: &str,
    args: &[Value],
) -> Option<Result<Value, EvalError>> {
    match name {
        "call" => {
            let this = args.first().cloned().unwrap_or(Value::Undefined);
            let rest = if args.is_empty() { &[] } else { &args[1..] };
            Some(invoke(interp, base, this, rest))
        }
        "apply" => Some(apply(interp, base, args)),
        "toString" => Some(function_source(base)),
        _ => None,
    }
}

fn apply(interp: &Interpreter, base: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let this = args.first().cloned().unwrap_or(Value::Undefined);
    let call_args: Vec<Value> = match args.get(1) {
        None | Some(Value::Undefined) | Some(Value::Null) => Vec::new(),
        Some(Value::Object(obj)) if obj.borrow().is_array => crate::js_array::elements_of(obj),
        Some(_) => return throw_type_error("second argument to apply must be an array"),
    };
    invoke(interp, base, this, &call_args)
}

fn function_source(base: &Value) -> Result<Value, EvalError> {
    let Some(callable) = base.callable() else {
        return throw_type_error("toString called on a non-function");
    };
    let text = match callable {
        Callable::Interpreted(fd) => fd.template.source.to_string(),
        Callable::Native(nf) => format!("function {}() {{ [native code] }}", nf.name),
    };
    Ok(Value::String(Rc::from(text.as_str())))
}
