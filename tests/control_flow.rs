use eswalk::{Value, evaluate_script};

// Initialize logger for this integration test binary so `RUST_LOG` is honored.
#[ctor::ctor]
fn init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

#[cfg(test)]
mod control_flow_tests {
    use super::*;

    fn eval(script: &str) -> Value {
        evaluate_script(script).unwrap()
    }

    fn eval_num(script: &str) -> f64 {
        match eval(script) {
            Value::Number(n) => n,
            other => panic!("expected number, got {other:?}"),
        }
    }

    #[test]
    fn if_statement_true() {
        assert_eq!(eval_num("var x = 5; if (x > 3) { x = x + 1; } x"), 6.0);
    }

    #[test]
    fn if_statement_false() {
        assert_eq!(eval_num("var x = 2; if (x > 3) { x = x + 1; } x"), 2.0);
    }

    #[test]
    fn if_else_statement() {
        assert_eq!(eval_num("var x = 2; if (x > 3) { x = 10; } else { x = 20; } x"), 20.0);
    }

    #[test]
    fn if_without_else_yields_undefined() {
        assert_eq!(eval("if (false) 1"), Value::Undefined);
    }

    #[test]
    fn last_value_is_final_statement_expression() {
        assert_eq!(eval_num("1; 2; 3"), 3.0);
    }

    #[test]
    fn function_declaration_does_not_disturb_last_value() {
        assert_eq!(eval_num("1; 2; function f() { return 99 } 3"), 3.0);
    }

    #[test]
    fn call_result_as_last_value() {
        assert_eq!(eval_num("1; 2; (function() { return 99 })()"), 99.0);
    }

    #[test]
    fn while_loop() {
        assert_eq!(eval_num("var sum = 0; var i = 1; while (i <= 5) { sum = sum + i; i = i + 1 } sum"), 15.0);
    }

    #[test]
    fn do_while_runs_body_at_least_once() {
        assert_eq!(eval_num("var i = 10; do { i = i + 1 } while (false); i"), 11.0);
    }

    #[test]
    fn for_loop_sum() {
        assert_eq!(eval_num("var s = 0; for (var i = 1; i <= 10; i++) s += i; s"), 55.0);
    }

    #[test]
    fn for_loop_without_clauses() {
        assert_eq!(eval_num("var i = 0; for (;;) { i++; if (i === 4) break } i"), 4.0);
    }

    #[test]
    fn break_exits_loop() {
        assert_eq!(eval_num("var i = 0; while (true) { i++; if (i === 3) break } i"), 3.0);
    }

    #[test]
    fn continue_skips_iteration() {
        assert_eq!(eval_num("var s = 0; for (var i = 0; i < 5; i++) { if (i % 2 === 0) continue; s += i } s"), 4.0);
    }

    #[test]
    fn break_only_exits_inner_loop() {
        let script = "var c = 0; for (var i = 0; i < 2; i++) { for (var j = 0; j < 10; j++) { if (j === 1) break; c++ } } c";
        assert_eq!(eval_num(script), 2.0);
    }

    #[test]
    fn loop_yields_last_body_value() {
        assert_eq!(eval_num("var i; for (i = 0; i < 3; i++) i * 2"), 4.0);
    }

    #[test]
    fn block_statement_value() {
        assert_eq!(eval_num("{ 42; }"), 42.0);
    }

    #[test]
    fn single_statement_bodies() {
        assert_eq!(eval_num("var s = 0; var i = 0; while (i < 3) s += i++; s"), 3.0);
        assert_eq!(eval_num("var x = 0; if (true) x = 9; x"), 9.0);
    }
}
