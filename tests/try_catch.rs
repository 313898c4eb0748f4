use eswalk::{JSError, Value, evaluate_script};

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
fn catch_then_finally_ordering() {
    let script = "var a = []; try { throw {m: 'x'} } catch (e) { a.push(e.m) } finally { a.push('f') } a.join(',')";
    assert_eq!(eval_str(script), "x,f");
}

#[test]
fn catch_binds_thrown_value() {
    assert_eq!(eval_str("try { throw {m: 'x'} } catch (e) { e.m }"), "x");
    assert_eq!(eval_num("try { throw 41 } catch (e) { e + 1 }"), 42.0);
}

#[test]
fn catch_binding_restores_shadowed_value() {
    assert_eq!(eval_str("var e = 'outer'; try { throw 1 } catch (e) {} e"), "outer");
}

#[test]
fn catch_binding_is_removed_when_fresh() {
    assert_eq!(eval_str("try { throw 1 } catch (err) {} typeof err"), "undefined");
}

#[test]
fn finally_runs_on_normal_completion() {
    assert_eq!(eval_str("var log = []; try { log.push('t') } finally { log.push('f') } log.join('')"), "tf");
}

#[test]
fn return_in_finally_supersedes_try_return() {
    assert_eq!(eval_num("function f() { try { return 1 } finally { return 2 } } f()"), 2.0);
}

#[test]
fn return_survives_plain_finally() {
    assert_eq!(eval_num("function f() { try { return 1 } finally { var x = 9 } } f()"), 1.0);
}

#[test]
fn throw_crosses_function_boundaries() {
    let script = "function a() { throw 'deep' } function b() { a() } var r; try { b() } catch (e) { r = 'got:' + e } r";
    assert_eq!(eval_str(script), "got:deep");
}

#[test]
fn rethrow_from_catch() {
    assert_eq!(eval_num("try { try { throw 1 } catch (e) { throw e + 1 } } catch (e) { e }"), 2.0);
}

#[test]
fn try_finally_without_catch_propagates() {
    let script = "function f() { try { throw 'e' } finally {} } var r; try { f() } catch (e) { r = 'c:' + e } r";
    assert_eq!(eval_str(script), "c:e");
}

#[test]
fn continue_runs_finally_each_iteration() {
    let script = "var r = ''; for (var i = 0; i < 2; i++) { try { if (i === 0) continue; r += 'b' } finally { r += 'f' } } r";
    assert_eq!(eval_str(script), "fbf");
}

#[test]
fn host_type_errors_are_catchable() {
    assert_eq!(eval_str("var r; try { null.x } catch (e) { r = e.name } r"), "TypeError");
    assert_eq!(eval_str("var r; try { missing() } catch (e) { r = e.name } r"), "TypeError");
}

#[test]
fn uncaught_throw_reaches_the_caller() {
    match evaluate_script("throw 'up'") {
        Err(JSError::Throw { value }) => assert_eq!(value, Value::String("up".into())),
        other => panic!("expected uncaught throw, got {other:?}"),
    }
}
