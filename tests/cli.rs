use std::path::Path;
use test_utils::{check_run, check_run_fails, Expected};

#[test]
fn wick_binary_prints_fib_10() {
    check_run(
        Path::new("tests/fixtures/fib.wick"),
        Expected { stdout: "55\n" },
    )
    .unwrap();
}

#[test]
fn wick_binary_reports_division_by_zero() {
    check_run_fails(Path::new("tests/fixtures/div_by_zero.wick")).unwrap();
}
