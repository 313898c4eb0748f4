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
fn arithmetic_precedence() {
    assert_eq!(eval_num("1 + 2 * 3"), 7.0);
    assert_eq!(eval_num("(1 + 2) * 3"), 9.0);
    assert_eq!(eval_num("10 / 4"), 2.5);
    assert_eq!(eval_num("7 % 3"), 1.0);
    assert_eq!(eval_num("2 - 5"), -3.0);
}

#[test]
fn string_concatenation() {
    assert_eq!(eval_str("'a' + 1"), "a1");
    assert_eq!(eval_str("1 + '2'"), "12");
    assert_eq!(eval_str("'x' + true"), "xtrue");
    assert_eq!(eval_str("'' + null"), "null");
}

#[test]
fn numeric_coercion() {
    assert_eq!(eval_num("'3' * '4'"), 12.0);
    assert_eq!(eval_num("'10' - 1"), 9.0);
    assert_eq!(eval_num("true + true"), 2.0);
    assert_eq!(eval_num("null + 1"), 1.0);
    assert!(eval_num("'three' * 2").is_nan());
}

#[test]
fn loose_and_strict_equality() {
    assert!(eval_bool("1 == '1'"));
    assert!(!eval_bool("1 === '1'"));
    assert!(eval_bool("null == undefined"));
    assert!(!eval_bool("null === undefined"));
    assert!(!eval_bool("0/0 == 0/0"));
    assert!(eval_bool("'1' == true"));
}

#[test]
fn object_equality_is_identity() {
    assert!(!eval_bool("var a = {}; var b = {}; a == b"));
    assert!(eval_bool("var a = {}; var c = a; a === c"));
}

#[test]
fn relational_operators() {
    assert!(eval_bool("2 < 10"));
    // string comparison is lexicographic, not numeric
    assert!(!eval_bool("'2' < '10'"));
    assert!(eval_bool("'a' < 'b'"));
    assert!(eval_bool("2 <= 2"));
    assert!(!eval_bool("0/0 < 1"));
    assert!(!eval_bool("0/0 >= 0"));
    assert!(eval_bool("'5' < 10"));
}

#[test]
fn bitwise_and_shifts() {
    assert_eq!(eval_num("5 & 3"), 1.0);
    assert_eq!(eval_num("5 | 3"), 7.0);
    assert_eq!(eval_num("5 ^ 3"), 6.0);
    assert_eq!(eval_num("~5"), -6.0);
    assert_eq!(eval_num("1 << 5"), 32.0);
    assert_eq!(eval_num("-8 >> 1"), -4.0);
    assert_eq!(eval_num("-8 >>> 28"), 15.0);
    // shift counts are masked to five bits
    assert_eq!(eval_num("1 << 33"), 2.0);
}

#[test]
fn typeof_tags() {
    assert_eq!(eval_str("typeof 1"), "number");
    assert_eq!(eval_str("typeof 'x'"), "string");
    assert_eq!(eval_str("typeof true"), "boolean");
    assert_eq!(eval_str("typeof undefinedName"), "undefined");
    assert_eq!(eval_str("typeof {}"), "object");
    assert_eq!(eval_str("typeof null"), "object");
    assert_eq!(eval_str("typeof function(){}"), "function");
    assert_eq!(eval_str("typeof (undefined + 1)"), "number");
}

#[test]
fn in_operator() {
    assert!(eval_bool("'a' in {a: 1}"));
    assert!(!eval_bool("'b' in {a: 1}"));
    assert!(eval_bool("0 in [7, 8]"));
    assert!(!eval_bool("5 in [7, 8]"));
}

#[test]
fn delete_member_then_in() {
    assert!(!eval_bool("var o = {a: 1}; delete o.a; 'a' in o"));
    // deleting a non-reference yields true
    assert!(eval_bool("delete 42"));
}

#[test]
fn void_yields_undefined() {
    assert_eq!(eval("void 0"), Value::Undefined);
}

#[test]
fn logical_operators_return_operands() {
    assert_eq!(eval_num("1 && 2"), 2.0);
    assert_eq!(eval_num("0 && 2"), 0.0);
    assert_eq!(eval_str("0 || 'x'"), "x");
}

#[test]
fn logical_short_circuit_skips_side_effects() {
    let script = "var n = 0; function bump() { n = 1; return true } false && bump(); n";
    assert_eq!(eval_num(script), 0.0);
}

#[test]
fn conditional_and_sequence() {
    assert_eq!(eval_str("1 ? 'y' : 'n'"), "y");
    assert_eq!(eval_num("(1, 2, 3)"), 3.0);
}

#[test]
fn update_expressions() {
    assert_eq!(eval_num("var i = 5; i++ + i"), 11.0);
    assert_eq!(eval_num("var i = 5; ++i + i"), 12.0);
    assert_eq!(eval_num("var i = 1; i++"), 1.0);
    assert_eq!(eval_num("var i = 1; --i"), 0.0);
}

#[test]
fn compound_assignment() {
    assert_eq!(eval_num("var x = 2; x += 3; x"), 5.0);
    assert_eq!(eval_str("var x = 'a'; x += 'b'; x"), "ab");
    assert_eq!(eval_num("var x = 7; x %= 4; x"), 3.0);
    assert_eq!(eval_num("var x = 1; x <<= 4; x"), 16.0);
    assert_eq!(eval_num("var x = 12; x >>>= 2; x"), 3.0);
    assert_eq!(eval_num("var o = {n: 10}; o.n -= 4; o.n"), 6.0);
}

#[test]
fn unary_plus_and_minus_coerce() {
    assert_eq!(eval_num("-'5'"), -5.0);
    assert_eq!(eval_num("+'3.5'"), 3.5);
    assert_eq!(eval_num("+true"), 1.0);
}

#[test]
fn array_to_primitive_joins() {
    assert_eq!(eval_str("[1, 2] + ''"), "1,2");
}
