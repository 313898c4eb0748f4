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

fn eval_bool(script: &str) -> bool {
    match eval(script) {
        Value::Boolean(b) => b,
        other => panic!("expected boolean, got {other:?}"),
    }
}

#[test]
fn object_literals_and_member_access() {
    assert_eq!(eval_num("var o = {a: 1, b: {c: 2}}; o.a + o.b.c"), 3.0);
    assert_eq!(eval_num("var o = {x: 4}; o['x']"), 4.0);
    assert_eq!(eval_num("var k = 'y'; var o = {y: 6}; o[k]"), 6.0);
    assert_eq!(eval_num("({'quoted key': 5})['quoted key']"), 5.0);
    assert_eq!(eval_num("({0: 8})[0]"), 8.0);
}

#[test]
fn duplicate_keys_last_wins() {
    assert_eq!(eval_num("({a: 1, a: 2}).a"), 2.0);
}

#[test]
fn getter_on_object_literal() {
    assert_eq!(eval_num("var o = { get a() { return 42 } }; o.a"), 42.0);
}

#[test]
fn getter_sees_receiver_as_this() {
    assert_eq!(eval_num("var o = { v: 3, get a() { return this.v } }; o.a"), 3.0);
}

#[test]
fn setter_intercepts_writes() {
    let script = "var v = 0; var o = { get a() { return v }, set a(n) { v = n * 2 } }; o.a = 5; o.a";
    assert_eq!(eval_num(script), 10.0);
}

#[test]
fn accessors_are_enumerable() {
    assert_eq!(eval_str("var o = { get a() { return 1 }, b: 2 }; var r = ''; for (var k in o) r += k; r"), "ab");
}

#[test]
fn with_overlays_object_properties() {
    assert_eq!(eval_num("var o = {a: 1, b: 2}; var r; with (o) { r = a + b } r"), 3.0);
}

#[test]
fn with_reads_back_overlay_writes() {
    assert_eq!(eval_num("var o = {a: 1}; var r; with (o) { a = 5; r = a } r"), 5.0);
}

#[test]
fn with_falls_through_to_outer_scope() {
    assert_eq!(eval_num("var out = 9; var o = {a: 1}; var r; with (o) { r = a + out } r"), 10.0);
}

#[test]
fn array_literals_and_length() {
    assert_eq!(eval_num("[1, 2, 3].length"), 3.0);
    assert_eq!(eval_num("[, 1].length"), 2.0);
    assert_eq!(eval_num("[1, 2, ].length"), 2.0);
    assert_eq!(eval("[, 'x'][0]"), Value::Undefined);
}

#[test]
fn array_index_writes_stretch_length() {
    assert_eq!(eval_num("var a = []; a[3] = 'x'; a.length"), 4.0);
}

#[test]
fn array_length_assignment_truncates() {
    assert_eq!(eval_str("var a = [1, 2, 3]; a.length = 1; a.join(',')"), "1");
}

#[test]
fn array_methods() {
    assert_eq!(eval_num("var a = [1]; a.push(2, 3); a.length"), 3.0);
    assert_eq!(eval_num("var a = [1, 2]; a.pop()"), 2.0);
    assert_eq!(eval_str("[1, 2, 3].join('-')"), "1-2-3");
    assert_eq!(eval_num("[5, 6, 7].indexOf(6)"), 1.0);
    assert_eq!(eval_num("['a', 'b'].indexOf('z')"), -1.0);
    assert_eq!(eval_str("[1, 2, 3, 4].slice(1, 3).join(',')"), "2,3");
    assert_eq!(eval_str("[1, 2, 3].slice(-2).join(',')"), "2,3");
    assert_eq!(eval_str("[1].concat([2, 3], 4).join(',')"), "1,2,3,4");
}

#[test]
fn string_length_and_indexing() {
    assert_eq!(eval_num("'hello'.length"), 5.0);
    assert_eq!(eval_str("'abc'[1]"), "b");
    assert_eq!(eval_num("var s = 'hi'; s.length"), 2.0);
}

#[test]
fn string_methods() {
    assert_eq!(eval_str("'hello'.charAt(1)"), "e");
    assert_eq!(eval_num("'abc'.charCodeAt(0)"), 97.0);
    assert_eq!(eval_num("'banana'.indexOf('na')"), 2.0);
    assert_eq!(eval_str("'hello'.slice(1, 3)"), "el");
    assert_eq!(eval_str("'hello'.slice(-2)"), "lo");
    assert_eq!(eval_str("'hello'.substring(3, 1)"), "el");
    assert_eq!(eval_str("'a,b,c'.split(',').join('|')"), "a|b|c");
    assert_eq!(eval_str("'ab'.split('').join('-')"), "a-b");
    assert_eq!(eval_str("'MiXeD'.toLowerCase()"), "mixed");
    assert_eq!(eval_str("'MiXeD'.toUpperCase()"), "MIXED");
    assert_eq!(eval_str("'  pad  '.trim()"), "pad");
}

#[test]
fn has_own_property_ignores_prototype() {
    let script = "function A() { this.x = 1 } A.prototype.y = 2; var a = new A(); [a.hasOwnProperty('x'), a.hasOwnProperty('y')].join(',')";
    assert_eq!(eval_str(script), "true,false");
}

#[test]
fn delete_bare_identifier_removes_binding() {
    assert_eq!(eval_str("var x = 1; delete x; typeof x"), "undefined");
}

#[test]
fn default_to_string_forms() {
    assert_eq!(eval_str("'' + {}"), "[object Object]");
    assert_eq!(eval_str("'' + [1, 2]"), "1,2");
}

#[test]
fn user_to_string_wins() {
    assert_eq!(eval_str("var o = { toString: function() { return 'me' } }; 'v:' + o"), "v:me");
}

#[test]
fn user_value_of_wins_for_arithmetic() {
    assert_eq!(eval_num("var o = { valueOf: function() { return 6 } }; o * 2"), 12.0);
}

#[test]
fn assignment_through_member_chain() {
    assert_eq!(eval_num("var o = {p: {}}; o.p.q = 8; o.p.q"), 8.0);
}

#[test]
fn in_operator_sees_inherited_properties() {
    let script = "function A() {} A.prototype.y = 2; var a = new A(); 'y' in a";
    assert_eq!(eval_bool(script), true);
}
