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
fn labeled_break_leaves_outer_loop() {
    let script = "outer: for (var i = 0; i < 3; i++) { for (var j = 0; j < 3; j++) { if (j === 1) break outer; } } i";
    assert_eq!(eval_num(script), 0.0);
}

#[test]
fn labeled_continue_resumes_outer_loop() {
    let script = "var s = ''; outer: for (var i = 0; i < 3; i++) { for (var j = 0; j < 3; j++) { if (j === 1) continue outer; s += i + '' + j } } s";
    assert_eq!(eval_str(script), "001020");
}

#[test]
fn labeled_block_break() {
    let script = "L: { if (true) break L; x = 1 } typeof x";
    assert_eq!(eval_str(script), "undefined");
}

#[test]
fn label_on_plain_loop_break() {
    let script = "var n = 0; loop: while (true) { n++; if (n === 2) break loop } n";
    assert_eq!(eval_num(script), 2.0);
}

#[test]
fn for_in_follows_insertion_order() {
    assert_eq!(eval_str("var r = ''; for (var k in {b: 1, a: 2, c: 3}) r += k; r"), "bac");
}

#[test]
fn for_in_array_indices_without_length() {
    assert_eq!(eval_str("var r = ''; for (var k in [9, 8]) r += k; r"), "01");
}

#[test]
fn for_in_keys_are_strings() {
    assert_eq!(eval_str("var t = ''; for (var k in [5]) t = typeof k; t"), "string");
}

#[test]
fn for_in_walks_prototype_chain() {
    let script = "function A() { this.x = 1 } A.prototype.y = 2; var a = new A(); var r = []; for (var k in a) r.push(k); r.join(',')";
    assert_eq!(eval_str(script), "x,y");
}

#[test]
fn for_in_over_null_is_empty() {
    assert_eq!(eval_num("var c = 0; for (var k in null) c++; c"), 0.0);
}

#[test]
fn for_in_over_string_indices() {
    assert_eq!(eval_str("var r = ''; for (var i in 'ab') r += i; r"), "01");
}

#[test]
fn for_in_assigns_existing_binding() {
    let script = "var o = {}; var k; for (k in {a: 1, b: 2, c: 3}) o[k] = k; o.a + o.b + o.c";
    assert_eq!(eval_str(script), "abc");
}

#[test]
fn continue_inside_for_in() {
    assert_eq!(eval_str("var r = ''; for (var k in {a: 1, b: 2}) { if (k === 'a') continue; r += k } r"), "b");
}
