#![doc = include_str!("../README.md")]

pub(crate) mod core;
#[macro_use]
pub(crate) mod error;
pub(crate) mod js_array;
pub(crate) mod js_function;
pub(crate) mod js_object;
pub(crate) mod js_string;

pub use crate::core::{
    AccessorData, BinaryOp, Callable, ControlFlow, EvalError, FunctionData, FunctionTemplate, Hoisted, Interpreter,
    JSObjectData, JSObjectPtr, NativeFunction, Node, NodeKind, Options, ParserCallback, PropertyKey, Scope, ScopePtr,
    Token, TokenData, Value, ValuePtr, enumerate_keys, evaluate_script, get_own, invoke, is_truthy, lookup, make_error,
    make_function, make_native_function, new_object, owner, parse_program, root_data, set_own, strict_equals,
    to_number, to_string_value, tokenize, type_of,
};
pub use crate::js_array::{is_array, make_array};
pub use error::JSError;
