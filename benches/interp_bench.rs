use criterion::{Criterion, criterion_group, criterion_main};
use eswalk::{Interpreter, new_object, parse_program};
use std::hint::black_box;

// Initialize logger for benchmarks so `RUST_LOG` is honored.
#[ctor::ctor]
fn init_bench_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).try_init();
}

const FIB: &str = "function fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2) } fib(15)";
const LOOP: &str = "var s = 0; for (var i = 0; i < 10000; i++) s += i; s";

fn bench_parse_only(c: &mut Criterion) {
    c.bench_function("parse_fib", |b| {
        b.iter(|| {
            let _ = black_box(parse_program(FIB).unwrap());
        })
    });
}

fn bench_fib(c: &mut Criterion) {
    c.bench_function("eval_fib_15", |b| {
        let interp = Interpreter::new(new_object());
        b.iter(|| {
            let _ = black_box(interp.evaluate(FIB, None).unwrap());
        })
    });
}

fn bench_loop(c: &mut Criterion) {
    c.bench_function("eval_loop_10k", |b| {
        let interp = Interpreter::new(new_object());
        b.iter(|| {
            let _ = black_box(interp.evaluate(LOOP, None).unwrap());
        })
    });
}

criterion_group!(benches, bench_parse_only, bench_fib, bench_loop);
criterion_main!(benches);
