//! The tree-walking evaluator.
//!
//! [`eval`] recurses over a [`Node`] and returns an [`EvalOutcome`], which
//! plays the same role for evaluation that `ParseOutcome` plays for parsing:
//! it threads a result down through nested calls while letting control-flow
//! signals (`return`, `break`, `continue`, or an error) short-circuit the
//! walk without unwinding through panics or exceptions.
use crate::ast::*;
use crate::builtins;
use crate::context::{Context, SymbolTable};
use crate::error::LangError;
use crate::value::{Num, UserFunctionData, Value, ValueKind};
use std::cell::RefCell;
use std::rc::Rc;

/// Accumulates an evaluation's result value alongside whichever control-flow
/// signal is in effect. At most one of `error`, `func_return_value`,
/// `loop_continue`, `loop_break` is meaningful at a time; `should_return`
/// reports whether any of them is.
#[derive(Debug, Default)]
pub struct EvalOutcome {
    pub value: Option<Value>,
    pub error: Option<LangError>,
    pub func_return_value: Option<Value>,
    pub loop_continue: bool,
    pub loop_break: bool,
}

impl EvalOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self) {
        self.value = None;
        self.error = None;
        self.func_return_value = None;
        self.loop_continue = false;
        self.loop_break = false;
    }

    /// Whether a caller should stop what it's doing and pass this outcome
    /// further up, rather than continue evaluating siblings.
    pub fn should_return(&self) -> bool {
        self.error.is_some() || self.func_return_value.is_some() || self.loop_continue || self.loop_break
    }

    /// Absorb a sub-expression's outcome: its control-flow signal replaces
    /// ours, and its value is handed back for the caller to use.
    pub fn register(&mut self, other: EvalOutcome) -> Option<Value> {
        self.error = other.error;
        self.func_return_value = other.func_return_value;
        self.loop_continue = other.loop_continue;
        self.loop_break = other.loop_break;
        other.value
    }

    pub fn success(mut self, value: Value) -> Self {
        self.reset();
        self.value = Some(value);
        self
    }

    pub fn success_return(mut self, value: Value) -> Self {
        self.reset();
        self.func_return_value = Some(value);
        self
    }

    pub fn success_continue(mut self) -> Self {
        self.reset();
        self.loop_continue = true;
        self
    }

    pub fn success_break(mut self) -> Self {
        self.reset();
        self.loop_break = true;
        self
    }

    pub fn failure(mut self, error: LangError) -> Self {
        self.reset();
        self.error = Some(error);
        self
    }
}

/// Evaluate `node` in `context`, returning its value and/or control-flow
/// signal. `context` is the frame bindings are read from and written into;
/// `let`/assignment always targets this frame, never a child of it.
pub fn eval(node: &Node, context: &Rc<Context>) -> EvalOutcome {
    match node {
        Node::Number(n) => EvalOutcome::new().success(numeric(n.value, context, &n.span)),
        Node::Str(s) => EvalOutcome::new().success(
            Value::string(s.value.clone())
                .with_span(s.span.clone())
                .with_context(Rc::clone(context)),
        ),
        Node::List(list) => eval_list(list, context),
        Node::VarAccess(access) => eval_var_access(access, context),
        Node::VarAssign(assign) => eval_var_assign(assign, context),
        Node::BinOp(bin_op) => eval_bin_op(bin_op, context),
        Node::UnaryOp(unary_op) => eval_unary_op(unary_op, context),
        Node::If(if_expr) => eval_if(if_expr, context),
        Node::For(for_loop) => eval_for(for_loop, context),
        Node::While(while_loop) => eval_while(while_loop, context),
        Node::FuncDef(func_def) => eval_func_def(func_def, context),
        Node::Call(call) => eval_call(call, context),
        Node::Return(ret) => eval_return(ret, context),
        Node::Continue(_) => EvalOutcome::new().success_continue(),
        Node::Break(_) => EvalOutcome::new().success_break(),
    }
}

fn numeric(n: Num, context: &Rc<Context>, span: &crate::position::Span) -> Value {
    Value::new(ValueKind::Number(n))
        .with_span(span.clone())
        .with_context(Rc::clone(context))
}

fn eval_list(list: &ListLit, context: &Rc<Context>) -> EvalOutcome {
    let mut res = EvalOutcome::new();
    let mut elements = Vec::with_capacity(list.elements.len());

    for element in &list.elements {
        let value = res.register(eval(element, context));
        if res.should_return() {
            return res;
        }
        elements.push(value.expect("register without error yields a value"));
    }

    res.success(
        Value::list(elements)
            .with_span(list.span.clone())
            .with_context(Rc::clone(context)),
    )
}

fn eval_var_access(access: &VarAccess, context: &Rc<Context>) -> EvalOutcome {
    match context.symbol_table.borrow().get(&access.name) {
        Some(value) => EvalOutcome::new().success(
            value
                .copy()
                .with_span(access.span.clone())
                .with_context(Rc::clone(context)),
        ),
        None => EvalOutcome::new().failure(LangError::runtime(
            access.span.clone(),
            format!("'{}' is not defined", access.name),
            Rc::clone(context),
        )),
    }
}

fn eval_var_assign(assign: &VarAssign, context: &Rc<Context>) -> EvalOutcome {
    let mut res = EvalOutcome::new();
    let value = res.register(eval(&assign.value, context));
    if res.should_return() {
        return res;
    }
    let value = value.expect("register without error yields a value");
    context
        .symbol_table
        .borrow_mut()
        .set(assign.name.clone(), value.clone());
    res.success(value)
}

fn eval_bin_op(bin_op: &BinOp, context: &Rc<Context>) -> EvalOutcome {
    let mut res = EvalOutcome::new();

    // Both sides are always evaluated, even for `and`/`or` - there is no
    // short-circuiting in this language.
    let left = res.register(eval(&bin_op.left, context));
    if res.should_return() {
        return res;
    }
    let right = res.register(eval(&bin_op.right, context));
    if res.should_return() {
        return res;
    }
    let left = left.expect("register without error yields a value");
    let right = right.expect("register without error yields a value");

    let outcome = match bin_op.op {
        BinOpKind::Add => left.addition(&right),
        BinOpKind::Sub => left.subtraction(&right),
        BinOpKind::Mul => left.multiply(&right),
        BinOpKind::Div => left.divide(&right),
        BinOpKind::Pow => left.powered_by(&right),
        BinOpKind::Mod => left.remainder(&right),
        BinOpKind::Eq => left.eq_compare(&right),
        BinOpKind::Ne => left.neq_compare(&right),
        BinOpKind::Lt => left.lt_compare(&right),
        BinOpKind::Gt => left.gt_compare(&right),
        BinOpKind::Lte => left.lte_compare(&right),
        BinOpKind::Gte => left.gte_compare(&right),
        BinOpKind::And => left.anded_by(&right),
        BinOpKind::Or => left.ored_by(&right),
    };

    match outcome {
        Ok(value) => res.success(value.with_span(bin_op.span.clone())),
        Err(e) => res.failure(e),
    }
}

fn eval_unary_op(unary_op: &UnaryOp, context: &Rc<Context>) -> EvalOutcome {
    let mut res = EvalOutcome::new();
    let operand = res.register(eval(&unary_op.operand, context));
    if res.should_return() {
        return res;
    }
    let operand = operand.expect("register without error yields a value");

    let outcome = match unary_op.op {
        UnaryOpKind::Neg => operand.multiply(&Value::int(-1)),
        UnaryOpKind::Not => operand.notted(),
    };

    match outcome {
        Ok(value) => res.success(value.with_span(unary_op.span.clone())),
        Err(e) => res.failure(e),
    }
}

fn eval_if(if_expr: &IfExpr, context: &Rc<Context>) -> EvalOutcome {
    let mut res = EvalOutcome::new();

    for case in &if_expr.cases {
        let condition = res.register(eval(&case.condition, context));
        if res.should_return() {
            return res;
        }
        if !condition
            .expect("register without error yields a value")
            .is_true()
        {
            continue;
        }

        let body = res.register(eval(&case.body, context));
        if res.should_return() {
            return res;
        }
        let value = if case.returns_null {
            Value::null()
        } else {
            body.expect("register without error yields a value")
        };
        return res.success(value.with_span(if_expr.span.clone()).with_context(Rc::clone(context)));
    }

    if let Some(else_case) = &if_expr.else_case {
        let body = res.register(eval(&else_case.body, context));
        if res.should_return() {
            return res;
        }
        let value = if else_case.returns_null {
            Value::null()
        } else {
            body.expect("register without error yields a value")
        };
        return res.success(value.with_span(if_expr.span.clone()).with_context(Rc::clone(context)));
    }

    res.success(Value::null().with_span(if_expr.span.clone()).with_context(Rc::clone(context)))
}

fn eval_for(for_loop: &ForLoop, context: &Rc<Context>) -> EvalOutcome {
    let mut res = EvalOutcome::new();

    let start = res.register(eval(&for_loop.start_value, context));
    if res.should_return() {
        return res;
    }
    let end = res.register(eval(&for_loop.end_value, context));
    if res.should_return() {
        return res;
    }
    let step = match &for_loop.step_value {
        Some(node) => {
            let step = res.register(eval(node, context));
            if res.should_return() {
                return res;
            }
            step.expect("register without error yields a value")
        }
        None => Value::int(1),
    };

    let bounds = (
        start.and_then(|v| v.as_num()),
        end.and_then(|v| v.as_num()),
        step.as_num(),
    );
    let (mut i, end_n, step_n) = match bounds {
        (Some(start), Some(end), Some(step)) => (start, end, step),
        _ => {
            return res.failure(LangError::runtime(
                for_loop.span.clone(),
                "For loop start, end and step must all be numbers",
                Rc::clone(context),
            ))
        }
    };

    let ascending = step_n.as_f64() >= 0.0;
    let mut elements = Vec::new();

    loop {
        let in_range = if ascending {
            i.as_f64() < end_n.as_f64()
        } else {
            i.as_f64() > end_n.as_f64()
        };
        if !in_range {
            break;
        }

        context
            .symbol_table
            .borrow_mut()
            .set(for_loop.var_name.clone(), numeric(i, context, &for_loop.span));
        i = add_num(i, step_n);

        let body = eval(&for_loop.body, context);
        if body.error.is_some() || (body.should_return() && !body.loop_continue && !body.loop_break) {
            return body;
        }
        if body.loop_continue {
            continue;
        }
        if body.loop_break {
            break;
        }
        elements.push(body.value.expect("loop body without error yields a value"));
    }

    let value = if for_loop.returns_null {
        Value::null()
    } else {
        Value::list(elements)
    };
    res.success(value.with_span(for_loop.span.clone()).with_context(Rc::clone(context)))
}

fn eval_while(while_loop: &WhileLoop, context: &Rc<Context>) -> EvalOutcome {
    let mut elements = Vec::new();

    loop {
        let condition = eval(&while_loop.condition, context);
        if condition.should_return() {
            return condition;
        }
        if !condition
            .value
            .expect("register without error yields a value")
            .is_true()
        {
            break;
        }

        let body = eval(&while_loop.body, context);
        if body.error.is_some() || (body.should_return() && !body.loop_continue && !body.loop_break) {
            return body;
        }
        if body.loop_continue {
            continue;
        }
        if body.loop_break {
            break;
        }
        elements.push(body.value.expect("loop body without error yields a value"));
    }

    let value = if while_loop.returns_null {
        Value::null()
    } else {
        Value::list(elements)
    };
    EvalOutcome::new().success(value.with_span(while_loop.span.clone()).with_context(Rc::clone(context)))
}

fn eval_func_def(func_def: &FuncDef, context: &Rc<Context>) -> EvalOutcome {
    let name: Rc<str> = match &func_def.name {
        Some(name) => Rc::from(name.as_str()),
        None => Rc::from("<anonymous>"),
    };

    let data = Rc::new(UserFunctionData {
        name,
        body: Rc::new((*func_def.body).clone()),
        param_names: func_def.params.clone(),
        auto_return: func_def.auto_return,
        defining_context: Rc::clone(context),
    });

    let value = Value::new(ValueKind::UserFunction(data))
        .with_span(func_def.span.clone())
        .with_context(Rc::clone(context));

    if let Some(name) = &func_def.name {
        context.symbol_table.borrow_mut().set(name.clone(), value.clone());
    }

    EvalOutcome::new().success(value)
}

fn eval_call(call: &Call, context: &Rc<Context>) -> EvalOutcome {
    let mut res = EvalOutcome::new();

    let callee = res.register(eval(&call.callee, context));
    if res.should_return() {
        return res;
    }
    let callee = callee.expect("register without error yields a value");

    let mut args = Vec::with_capacity(call.args.len());
    for arg_node in &call.args {
        let arg = res.register(eval(arg_node, context));
        if res.should_return() {
            return res;
        }
        args.push(arg.expect("register without error yields a value"));
    }

    let call_span = call.span.clone();
    let exec_outcome = match &callee.kind {
        ValueKind::UserFunction(data) => call_user_function(data, args, call_span.clone(), context),
        ValueKind::BuiltinFunction(name) => builtins::execute(name, args, call_span.clone(), context),
        _ => EvalOutcome::new().failure(LangError::runtime(
            call_span.clone(),
            format!("'{callee}' is not callable"),
            Rc::clone(context),
        )),
    };

    let return_value = res.register(exec_outcome);
    if res.should_return() {
        return res;
    }

    let return_value = return_value
        .expect("register without error yields a value")
        .copy()
        .with_span(call_span)
        .with_context(Rc::clone(context));
    res.success(return_value)
}

fn eval_return(ret: &ReturnStmt, context: &Rc<Context>) -> EvalOutcome {
    let mut res = EvalOutcome::new();
    let value = match &ret.value {
        Some(expr) => {
            let value = res.register(eval(expr, context));
            if res.should_return() {
                return res;
            }
            value.expect("register without error yields a value")
        }
        None => Value::null().with_span(ret.span.clone()).with_context(Rc::clone(context)),
    };
    res.success_return(value)
}

/// Run a user-defined function's body in a fresh frame parented to the
/// function's *defining* context, not the call site - this is what makes
/// `func mk(n) -> func() -> n` close over `n` correctly no matter where the
/// returned inner function is later invoked.
fn call_user_function(
    func: &UserFunctionData,
    args: Vec<Value>,
    call_span: crate::position::Span,
    caller_context: &Rc<Context>,
) -> EvalOutcome {
    if args.len() != func.param_names.len() {
        let diff = args.len() as i64 - func.param_names.len() as i64;
        let details = if diff > 0 {
            format!("{diff} too many args passed into <function {}>", func.name)
        } else {
            format!("{} too few args passed into <function {}>", -diff, func.name)
        };
        return EvalOutcome::new().failure(LangError::runtime(call_span, details, Rc::clone(caller_context)));
    }

    let new_table = Rc::new(RefCell::new(SymbolTable::new(Some(Rc::clone(
        &func.defining_context.symbol_table,
    )))));
    let new_context = Rc::new(Context::new(
        Rc::clone(&func.name),
        Some(Rc::clone(&func.defining_context)),
        Some(call_span),
        Rc::clone(&new_table),
    ));

    for (name, arg) in func.param_names.iter().zip(args) {
        new_table
            .borrow_mut()
            .set(name.clone(), arg.with_context(Rc::clone(&new_context)));
    }

    let outcome = eval(&func.body, &new_context);
    if outcome.error.is_some() || (outcome.should_return() && outcome.func_return_value.is_none()) {
        return outcome;
    }

    let body_value = if func.auto_return { outcome.value } else { None };
    let result = body_value.or(outcome.func_return_value).unwrap_or_else(Value::null);
    EvalOutcome::new().success(result)
}

fn add_num(a: Num, b: Num) -> Num {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => Num::Int(x + y),
        _ => Num::Float(a.as_f64() + b.as_f64()),
    }
}
