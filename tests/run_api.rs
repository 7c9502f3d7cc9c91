//! Black-box coverage of the public `run` entry point, one seed scenario
//! from the language's acceptance suite per test.
//!
//! A program's top level parses to the same `List` node a list literal
//! does, so `run` returns every statement's value, not just the last
//! one - tests assert on the final element, matching how a REPL would
//! read "the value of the program".
use wick::value::Value;

fn last_statement_value(source: &str) -> Value {
    let (value, error) = wick::run("<test>", source);
    assert!(error.is_none(), "unexpected error: {:?}", error.map(|e| e.to_string()));
    let value = value.expect("program produced no value");
    let elems = value.as_list().expect("top-level value is always a list");
    elems.borrow().last().expect("program has at least one statement").copy()
}

fn run_err(source: &str) -> String {
    let (_, error) = wick::run("<test>", source);
    error.expect("expected an error").to_string()
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(last_statement_value("2 + 3 * 4").to_string(), "14");
}

#[test]
fn list_reference_semantics_through_append() {
    let value = last_statement_value("let x = [1,2,3]\nappend(x, 4)\nlength(x)");
    assert_eq!(value.to_string(), "4");
}

#[test]
fn recursive_fibonacci() {
    let value = last_statement_value("func fib(n) -> if n < 2 do n last fib(n-1) + fib(n-2)\nfib(10)");
    assert_eq!(value.to_string(), "55");
}

#[test]
fn for_loop_builds_a_list() {
    let value = last_statement_value("for i = 0 to 5 do i");
    assert_eq!(value.to_string(), "0, 1, 2, 3, 4");
}

#[test]
fn while_loop_continue_skips_the_skipped_iteration() {
    let value = last_statement_value(
        r#"
let i = 0
let seen = []
while i < 3 do
    let i = i + 1
    if i == 2 do continue
    append(seen, i)
end
seen
"#,
    );
    assert_eq!(value.to_string(), "1, 3");
}

#[test]
fn closures_observe_their_defining_context() {
    let value = last_statement_value("func mk(n) -> func() -> n\nlet f = mk(7)\nf()");
    assert_eq!(value.to_string(), "7");
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let message = run_err("1 / 0");
    assert!(message.contains("Division by zero"), "{message}");
}

#[test]
fn and_or_evaluate_both_operands() {
    // A side-effecting right-hand operand must run even though the left
    // operand alone already determines the result in a short-circuiting
    // language.
    let value = last_statement_value(
        r#"
let calls = []
func mark(tag) -> append(calls, tag)
0 and mark(1)
length(calls)
"#,
    );
    assert_eq!(value.to_string(), "1");
}

#[test]
fn return_inside_nested_if_exits_only_the_function() {
    let value = last_statement_value(
        r#"
func first_even(xs)
    for i = 0 to length(xs) do
        if (xs / i) % 2 == 0 do
            return xs / i
        end
    end
    return -1
end
first_even([1, 3, 4, 5])
"#,
    );
    assert_eq!(value.to_string(), "4");
}

#[test]
fn break_exits_only_the_innermost_loop() {
    let value = last_statement_value(
        r#"
let out = []
for i = 0 to 3 do
    for j = 0 to 3 do
        if j == 1 do break
        append(out, j)
    end
end
out
"#,
    );
    assert_eq!(value.to_string(), "0, 0, 0");
}

#[test]
fn undefined_variable_is_a_runtime_error() {
    let message = run_err("missing");
    assert!(message.contains("'missing' is not defined"), "{message}");
}

#[test]
fn empty_list_is_falsy_non_empty_is_truthy() {
    let value = last_statement_value(
        "func describe(xs) -> if xs do \"non-empty\" last \"empty\"\ndescribe([]) + \" \" + describe([1])",
    );
    assert_eq!(value.to_string(), "empty non-empty");
}

#[test]
fn list_aliasing_is_observable_through_a_second_handle() {
    let value = last_statement_value(
        r#"
let a = [1]
let b = a
append(b, 2)
length(a)
"#,
    );
    assert_eq!(value.to_string(), "2");
}
