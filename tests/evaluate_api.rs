use eswalk::{Interpreter, JSError, Options, Value, evaluate_script, get_own, make_native_function, new_object, set_own};
use std::rc::Rc;

// Initialize logger for this integration test binary so `RUST_LOG` is honored.
#[ctor::ctor]
fn init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

#[test]
fn global_object_is_shared_with_the_host() {
    let global = new_object();
    set_own(&global, "seed".into(), Value::Number(10.0));
    let interp = Interpreter::new(global.clone());

    let v = interp.evaluate("seed + 1", None).unwrap();
    assert_eq!(v, Value::Number(11.0));

    // assignments to undeclared names land on the global
    interp.evaluate("out = seed * 2", None).unwrap();
    let out = get_own(&global, &"out".into()).unwrap();
    assert_eq!(*out.borrow(), Value::Number(20.0));
}

#[test]
fn ctx_argument_replaces_the_global_for_one_run() {
    let global = new_object();
    let interp = Interpreter::new(global.clone());
    let ctx = new_object();

    interp.evaluate("a = 1", Some(&ctx)).unwrap();
    assert!(get_own(&ctx, &"a".into()).is_some());
    assert!(get_own(&global, &"a".into()).is_none());
}

#[test]
fn get_value_returns_the_last_recorded_value() {
    let interp = Interpreter::new(new_object());
    let v = interp.evaluate("1; 2; 3", None).unwrap();
    assert_eq!(v, Value::Number(3.0));
    assert_eq!(interp.get_value(), Value::Number(3.0));
}

#[test]
fn call_stack_is_empty_after_evaluation() {
    let interp = Interpreter::new(new_object());
    interp.evaluate("function f() { return 1 } f()", None).unwrap();
    assert!(interp.call_stack().is_empty());
}

#[test]
fn call_stack_frames_are_visible_during_calls() {
    let global = new_object();
    let probe = make_native_function("probe", |interp, _this, _args| {
        let frames = interp.call_stack();
        Ok(Value::String(Rc::from(frames.join(";").as_str())))
    });
    set_own(&global, "probe".into(), probe);

    let interp = Interpreter::new(global);
    let v = interp.evaluate("function outer() { return probe() } outer()", None).unwrap();
    match v {
        Value::String(s) => {
            assert!(s.starts_with("outer("), "unexpected frame label: {s}");
            assert!(!s.contains(';'), "expected exactly one frame: {s}");
        }
        other => panic!("expected frame label string, got {other:?}"),
    }
}

#[test]
fn native_functions_are_callable_from_scripts() {
    let global = new_object();
    let sum = make_native_function("sum", |_interp, _this, args| {
        let mut total = 0.0;
        for arg in args {
            if let Value::Number(n) = arg {
                total += n;
            }
        }
        Ok(Value::Number(total))
    });
    set_own(&global, "sum".into(), sum);

    let interp = Interpreter::new(global);
    assert_eq!(interp.evaluate("sum(1, 2, 3)", None).unwrap(), Value::Number(6.0));
}

#[test]
fn evaluate_ast_accepts_estree_json() {
    let ast = serde_json::json!({
        "type": "Program",
        "body": [
            {
                "type": "ExpressionStatement",
                "expression": {
                    "type": "BinaryExpression",
                    "operator": "+",
                    "left": {"type": "Literal", "value": 40},
                    "right": {"type": "Literal", "value": 2}
                }
            }
        ]
    });
    let interp = Interpreter::new(new_object());
    assert_eq!(interp.evaluate_ast(&ast, "", None).unwrap(), Value::Number(42.0));
}

#[test]
fn unknown_node_kinds_are_rejected() {
    let ast = serde_json::json!({
        "type": "Program",
        "body": [{"type": "YieldExpression"}]
    });
    let interp = Interpreter::new(new_object());
    match interp.evaluate_ast(&ast, "", None) {
        Err(JSError::ParseError { .. }) => {}
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn parser_callback_replaces_the_front_end() {
    let options = Options {
        parser: Some(Rc::new(|_source| {
            Ok(serde_json::json!({
                "type": "Program",
                "body": [
                    {
                        "type": "ExpressionStatement",
                        "expression": {"type": "Literal", "value": 7}
                    }
                ]
            }))
        })),
        ..Default::default()
    };
    let interp = Interpreter::with_options(new_object(), options);
    assert_eq!(interp.evaluate("anything at all", None).unwrap(), Value::Number(7.0));
}

#[test]
fn malformed_source_is_a_parse_error() {
    match evaluate_script("var = 1") {
        Err(JSError::ParseError { .. }) => {}
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn timeout_stops_runaway_loops() {
    let options = Options {
        timeout_ms: 30,
        ..Default::default()
    };
    let interp = Interpreter::with_options(new_object(), options);
    match interp.evaluate("while (true) {}", None) {
        Err(JSError::Throw { .. }) => {}
        other => panic!("expected a thrown timeout error, got {other:?}"),
    }
}

#[test]
fn timeout_error_is_catchable() {
    let options = Options {
        timeout_ms: 30,
        ..Default::default()
    };
    let interp = Interpreter::with_options(new_object(), options);
    let v = interp
        .evaluate("var r; try { while (true) {} } catch (e) { r = 'caught' } r", None)
        .unwrap();
    assert_eq!(v, Value::String("caught".into()));
}

#[test]
fn call_depth_limit_raises_range_error() {
    let options = Options {
        max_call_depth: 64,
        ..Default::default()
    };
    let interp = Interpreter::with_options(new_object(), options);
    let v = interp
        .evaluate("function f() { return f() } var r; try { f() } catch (e) { r = e.name } r", None)
        .unwrap();
    assert_eq!(v, Value::String("RangeError".into()));
}

#[test]
fn evaluate_script_uses_a_fresh_global() {
    assert_eq!(evaluate_script("var x = 1; x").unwrap(), Value::Number(1.0));
    // a second run does not see the first run's bindings
    assert_eq!(evaluate_script("typeof x").unwrap(), Value::String("undefined".into()));
}
