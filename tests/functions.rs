use eswalk::{Value, evaluate_script};

// Initialize logger for this integration test binary so `RUST_LOG` is honored.
#[ctor::ctor]
fn init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

fn eval(script: &str) -> Value {
    evaluate_script(script).unwrap()
}

fn eval_num(script: &str) -> f64 {
    match eval(script) {
        Value::Number(n) => n,
        other => panic!("expected number, got {other:?}"),
    }
}

fn eval_str(script: &str) -> String {
    match eval(script) {
        Value::String(s) => s.to_string(),
        other => panic!("expected string, got {other:?}"),
    }
}

#[test]
fn declarations_hoist_above_first_use() {
    assert_eq!(eval_num("f(); function f() { return 1 }"), 1.0);
}

#[test]
fn var_hoisting_reads_undefined_not_error() {
    assert_eq!(eval("x; var x = 2;"), Value::Undefined);
}

#[test]
fn recursion_through_declared_name() {
    let script = "function fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2) } fib(10)";
    assert_eq!(eval_num(script), 55.0);
}

#[test]
fn named_function_expression_sees_its_own_name() {
    let script = "var f = function g(n) { return n <= 1 ? 1 : n * g(n - 1) }; f(5)";
    assert_eq!(eval_num(script), 120.0);
}

#[test]
fn closures_capture_their_activation_frame() {
    let script = "function mk() { var c = 0; return function() { c++; return c } } var f = mk(); f(); f()";
    assert_eq!(eval_num(script), 2.0);
}

#[test]
fn separate_activations_do_not_share_locals() {
    let script = "function mk() { var c = 0; return function() { c++; return c } } var a = mk(); var b = mk(); a(); a(); b()";
    assert_eq!(eval_num(script), 1.0);
}

#[test]
fn arguments_object() {
    assert_eq!(eval_num("function f() { return arguments.length } f(1, 2, 3)"), 3.0);
    assert_eq!(eval_str("function f() { return arguments[1] } f('a', 'b')"), "b");
}

#[test]
fn function_length_and_name() {
    assert_eq!(eval_num("function f(a, b) {} f.length"), 2.0);
    assert_eq!(eval_str("function f(a, b) {} f.name"), "f");
}

#[test]
fn anonymous_function_inherits_assignment_name() {
    assert_eq!(eval_str("var g = function() {}; g.name"), "g");
    assert_eq!(eval_str("var h; h = function() {}; h.name"), "h");
}

#[test]
fn to_string_reproduces_source_slice() {
    let source = "function f(a) { return a } f.toString()";
    assert_eq!(eval_str(source), "function f(a) { return a }");
}

#[test]
fn missing_return_yields_undefined() {
    assert_eq!(eval("function f() {} f()"), Value::Undefined);
    assert_eq!(eval("function f(a, b) { return b } f(1)"), Value::Undefined);
}

#[test]
fn call_and_apply() {
    assert_eq!(eval_num("function add(a, b) { return a + b } add.call(null, 1, 2)"), 3.0);
    assert_eq!(eval_num("function add(a, b) { return a + b } add.apply(null, [3, 4])"), 7.0);
    assert_eq!(eval_str("function who() { return this.tag } who.call({tag: 'x'})"), "x");
}

#[test]
fn method_call_binds_receiver() {
    assert_eq!(eval_num("var o = { v: 7, f: function() { return this.v } }; o.f()"), 7.0);
}

#[test]
fn plain_call_binds_root_context() {
    assert_eq!(eval_num("var v = 5; function f() { return this.v } f()"), 5.0);
}

#[test]
fn constructor_and_instanceof() {
    let script = "function A() { this.v = 2 } var a = new A(); a instanceof A";
    assert_eq!(eval(script), Value::Boolean(true));
    assert_eq!(eval_num("function A() { this.v = 2 } new A().v"), 2.0);
}

#[test]
fn constructor_returning_object_wins() {
    assert_eq!(eval_num("function A() { return {x: 1} } new A().x"), 1.0);
}

#[test]
fn prototype_methods() {
    let script = "function A() { this.v = 2 } A.prototype.get = function() { return this.v }; new A().get()";
    assert_eq!(eval_num(script), 2.0);
}

#[test]
fn inner_var_shadows_outer() {
    assert_eq!(eval_num("var x = 1; function f() { var x = 2; return x } f() + x"), 3.0);
}

#[test]
fn nested_scope_assigns_outer_binding() {
    assert_eq!(eval_num("var x = 1; function f() { x = 5 } f(); x"), 5.0);
}

#[test]
fn nested_declarations_hoist_within_function() {
    assert_eq!(eval_num("function f() { return g(); function g() { return 4 } } f()"), 4.0);
}

#[test]
fn function_expression_value() {
    assert_eq!(eval_num("var h = function() { return 3 }; h()"), 3.0);
}
