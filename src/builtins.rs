//! The fixed registry of built-in names available in every program: a
//! handful of global constants (`null`, `true`, `false`, `math_pi`) and the
//! built-in functions dispatched from [`eval_call`](crate::evaluator).
//!
//! Builtins are bound as [`ValueKind::BuiltinFunction`] values carrying just
//! their name; [`execute`] is the single dispatch point the evaluator calls
//! into once it has resolved a callee to one of these names.
use crate::context::{Context, SymbolTable};
use crate::error::LangError;
use crate::evaluator::EvalOutcome;
use crate::position::Span;
use crate::value::{Num, Value, ValueKind};
use once_cell::sync::Lazy;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

/// Name -> parameter count, used only for the arity check every builtin
/// goes through before `execute` dispatches on its name.
static ARITY: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    HashMap::from([
        ("print", 1),
        ("return_print", 1),
        ("user_in", 0),
        ("num_user_in", 0),
        ("clear", 0),
        ("cls", 0),
        ("is_num", 1),
        ("is_string", 1),
        ("is_list", 1),
        ("is_func", 1),
        ("append", 2),
        ("pop", 2),
        ("extend", 2),
        ("length", 1),
        ("to_int", 1),
        ("to_float", 1),
        ("to_string", 1),
        ("incr", 1),
        ("decr", 1),
        ("run", 1),
    ])
});

/// Populate a fresh global symbol table with every name a program can see
/// without an import: the three literal constants plus one
/// `BuiltinFunction` value per entry in [`ARITY`].
pub fn install_globals(table: &mut SymbolTable) {
    table.set("null", Value::null());
    table.set("true", Value::int(1));
    table.set("false", Value::int(0));
    table.set("math_pi", Value::float(std::f64::consts::PI));

    for name in ARITY.keys() {
        table.set(*name, Value::new(ValueKind::BuiltinFunction(Rc::from(*name))));
    }
}

/// Walk `context`'s parent chain up to the program's root frame and return
/// its symbol table - this is the one shared globally across every nested
/// `run` invocation, matching the single module-level symbol table the
/// reference implementation threads through its built-in registry.
fn root_symbol_table(context: &Rc<Context>) -> Rc<RefCell<SymbolTable>> {
    let mut current = Rc::clone(context);
    while let Some(parent) = current.parent.clone() {
        current = parent;
    }
    Rc::clone(&current.symbol_table)
}

fn runtime_error(span: &Span, details: impl Into<String>, context: &Rc<Context>) -> EvalOutcome {
    EvalOutcome::new().failure(LangError::runtime(span.clone(), details, Rc::clone(context)))
}

fn wrong_type(span: &Span, expected: &str, context: &Rc<Context>) -> EvalOutcome {
    runtime_error(span, format!("First argument must be {expected}"), context)
}

/// Dispatch a call to the builtin named `name`. `call_span` is attributed to
/// any runtime error this builtin raises, since builtins carry no span of
/// their own (unlike user functions, whose body has real source positions).
pub fn execute(name: &str, args: Vec<Value>, call_span: Span, context: &Rc<Context>) -> EvalOutcome {
    let Some(&arity) = ARITY.get(name) else {
        return runtime_error(&call_span, format!("'{name}' is not a known built-in"), context);
    };
    if args.len() != arity {
        let diff = args.len() as i64 - arity as i64;
        let details = if diff > 0 {
            format!("{diff} too many args passed into <built-in function {name}>")
        } else {
            format!("{} too few args passed into <built-in function {name}>", -diff)
        };
        return runtime_error(&call_span, details, context);
    }

    match name {
        "print" => {
            println!("{}", args[0]);
            ok(Value::null(), context)
        }
        "return_print" => ok(Value::string(args[0].to_string()), context),
        "user_in" => ok(Value::string(read_line()), context),
        "num_user_in" => ok(Value::int(read_int_loop()), context),
        "clear" | "cls" => {
            clear_terminal();
            ok(Value::null(), context)
        }
        "is_num" => ok(bool_value(matches!(args[0].kind, ValueKind::Number(_))), context),
        "is_string" => ok(bool_value(matches!(args[0].kind, ValueKind::Str(_))), context),
        "is_list" => ok(bool_value(matches!(args[0].kind, ValueKind::List(_))), context),
        "is_func" => ok(
            bool_value(matches!(
                args[0].kind,
                ValueKind::UserFunction(_) | ValueKind::BuiltinFunction(_)
            )),
            context,
        ),
        "append" => append(&args[0], args[1].clone(), &call_span, context),
        "pop" => pop(&args[0], &args[1], &call_span, context),
        "extend" => extend(&args[0], &args[1], &call_span, context),
        "length" => length(&args[0], &call_span, context),
        "to_int" => convert(&args[0], &call_span, context, "int", to_int),
        "to_float" => convert(&args[0], &call_span, context, "float", to_float),
        "to_string" => convert(&args[0], &call_span, context, "string", to_string),
        "incr" => step_number(&args[0], 1.0, &call_span, context),
        "decr" => step_number(&args[0], -1.0, &call_span, context),
        "run" => run_script(&args[0], &call_span, context),
        _ => unreachable!("every ARITY entry is handled above"),
    }
}

fn ok(value: Value, context: &Rc<Context>) -> EvalOutcome {
    EvalOutcome::new().success(value.with_context(Rc::clone(context)))
}

fn bool_value(b: bool) -> Value {
    Value::int(b as i64)
}

fn read_line() -> String {
    let mut buf = String::new();
    let _ = io::stdin().read_line(&mut buf);
    buf.trim_end_matches(['\n', '\r']).to_string()
}

fn read_int_loop() -> i64 {
    loop {
        let text = read_line();
        match text.trim().parse::<i64>() {
            Ok(n) => return n,
            Err(_) => println!("'{text}' must be an integer. Try again!"),
        }
    }
}

/// Clear the terminal screen. The reference implementation always shells
/// out to `cls`, which does nothing useful outside Windows; this picks the
/// right command for the host platform and falls back to a raw ANSI clear
/// if that command isn't available.
fn clear_terminal() {
    use std::process::Command;

    let status = if cfg!(windows) {
        Command::new("cmd").args(["/C", "cls"]).status()
    } else {
        Command::new("clear").status()
    };

    if status.map(|s| !s.success()).unwrap_or(true) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(b"\x1b[2J\x1b[H");
        let _ = stdout.flush();
    }
}

fn append(list: &Value, value: Value, span: &Span, context: &Rc<Context>) -> EvalOutcome {
    match list.as_list() {
        Some(elems) => {
            elems.borrow_mut().push(value);
            ok(Value::null(), context)
        }
        None => wrong_type(span, "list", context),
    }
}

fn pop(list: &Value, index: &Value, span: &Span, context: &Rc<Context>) -> EvalOutcome {
    let Some(elems) = list.as_list() else {
        return wrong_type(span, "list", context);
    };
    let Some(idx) = index.as_num() else {
        return runtime_error(span, "Second argument must be number", context);
    };

    let mut elems = elems.borrow_mut();
    match resolve_index(elems.len(), as_index(idx)) {
        Some(i) => {
            let removed = elems.remove(i);
            ok(removed, context)
        }
        None => runtime_error(
            span,
            "Element at this index could not be removed from list because index is out of bounds",
            context,
        ),
    }
}

fn extend(a: &Value, b: &Value, span: &Span, context: &Rc<Context>) -> EvalOutcome {
    match (a.as_list(), b.as_list()) {
        (Some(a), Some(b)) => {
            let extra: Vec<Value> = b.borrow().iter().cloned().collect();
            a.borrow_mut().extend(extra);
            ok(Value::null(), context)
        }
        (None, _) => wrong_type(span, "list", context),
        (_, None) => runtime_error(span, "Second argument must be list", context),
    }
}

fn length(list: &Value, span: &Span, context: &Rc<Context>) -> EvalOutcome {
    match list.as_list() {
        Some(elems) => ok(Value::int(elems.borrow().len() as i64), context),
        None => wrong_type(span, "list", context),
    }
}

fn convert(
    value: &Value,
    span: &Span,
    context: &Rc<Context>,
    target: &str,
    f: impl Fn(&Value) -> Option<Value>,
) -> EvalOutcome {
    match f(value) {
        Some(v) => ok(v, context),
        None => runtime_error(span, format!("Cannot convert {value} to {target}"), context),
    }
}

fn to_int(value: &Value) -> Option<Value> {
    match &value.kind {
        ValueKind::Number(Num::Int(n)) => Some(Value::int(*n)),
        ValueKind::Number(Num::Float(f)) => Some(Value::int(*f as i64)),
        ValueKind::Str(s) => s.trim().parse::<i64>().ok().map(Value::int),
        _ => None,
    }
}

fn to_float(value: &Value) -> Option<Value> {
    match &value.kind {
        ValueKind::Number(n) => Some(Value::float(n.as_f64())),
        ValueKind::Str(s) => s.trim().parse::<f64>().ok().map(Value::float),
        _ => None,
    }
}

fn to_string(value: &Value) -> Option<Value> {
    match &value.kind {
        ValueKind::Number(_) | ValueKind::Str(_) => Some(Value::string(value.to_string())),
        _ => None,
    }
}

fn step_number(value: &Value, by: f64, span: &Span, context: &Rc<Context>) -> EvalOutcome {
    match value.as_num() {
        Some(Num::Int(n)) => ok(Value::int(n + by as i64), context),
        Some(Num::Float(f)) => ok(Value::float(f + by), context),
        None => runtime_error(span, "Argument must be a number", context),
    }
}

fn as_index(n: Num) -> i64 {
    match n {
        Num::Int(i) => i,
        Num::Float(f) => f as i64,
    }
}

fn resolve_index(len: usize, idx: i64) -> Option<usize> {
    let real = if idx < 0 { idx + len as i64 } else { idx };
    if real < 0 || real >= len as i64 {
        None
    } else {
        Some(real as usize)
    }
}

fn run_script(path: &Value, span: &Span, context: &Rc<Context>) -> EvalOutcome {
    let ValueKind::Str(filename) = &path.kind else {
        return wrong_type(span, "string", context);
    };

    let source = match std::fs::read_to_string(filename.as_ref()) {
        Ok(source) => source,
        Err(e) => {
            return runtime_error(
                span,
                format!("Failed to load script \"{filename}\"\n{e}"),
                context,
            )
        }
    };

    let (value, error) = crate::run_with_global(
        Rc::clone(filename),
        Rc::from(source.as_str()),
        root_symbol_table(context),
    );

    if let Some(e) = error {
        return runtime_error(
            span,
            format!("Failed to finish executing script \"{filename}\"\n{e}"),
            context,
        );
    }

    ok(value.unwrap_or_else(Value::null), context)
}
