use eswalk::{Value, evaluate_script};

// Initialize logger for this integration test binary so `RUST_LOG` is honored.
#[ctor::ctor]
fn init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

fn eval_num(script: &str) -> f64 {
    match evaluate_script(script).unwrap() {
        Value::Number(n) => n,
        other => panic!("expected number, got {other:?}"),
    }
}

fn eval_str(script: &str) -> String {
    match evaluate_script(script).unwrap() {
        Value::String(s) => s.to_string(),
        other => panic!("expected string, got {other:?}"),
    }
}

#[test]
fn fall_through_until_break() {
    let script = "var x; switch (1) { case 1: x = 1; case 2: x = 2; break; case 3: x = 3 } x";
    assert_eq!(eval_num(script), 2.0);
}

#[test]
fn matches_later_case() {
    let script = "var x; switch (3) { case 1: x = 1; break; case 3: x = 3 } x";
    assert_eq!(eval_num(script), 3.0);
}

#[test]
fn default_runs_when_nothing_matches() {
    assert_eq!(eval_num("var x = 0; switch (9) { case 1: x = 1; break; default: x = 7 } x"), 7.0);
}

#[test]
fn default_in_middle_falls_through() {
    let script = "var x = ''; switch (9) { case 1: x = 'a'; default: x += 'd'; case 2: x += 'c' } x";
    assert_eq!(eval_str(script), "dc");
}

#[test]
fn no_match_without_default_is_noop() {
    assert_eq!(eval_num("var x = 5; switch (9) { case 1: x = 1 } x"), 5.0);
}

#[test]
fn case_matching_is_strict() {
    let script = "var x = 'none'; switch ('1') { case 1: x = 'num'; break; default: x = 'def' } x";
    assert_eq!(eval_str(script), "def");
}

#[test]
fn return_propagates_through_switch() {
    let script = "function f(n) { switch (n) { case 1: return 'one'; default: return 'other' } } f(1) + f(2)";
    assert_eq!(eval_str(script), "oneother");
}

#[test]
fn throwing_discriminant_is_catchable() {
    let script = "var r; try { switch (boom()) { case 1: r = 'no' } } catch (e) { r = 'caught' } r";
    assert_eq!(eval_str(script), "caught");
}
