//! Runtime values.
//!
//! A source-level "duck typed" value becomes a tagged [`Value`], and its
//! dynamic method dispatch becomes a match over (left tag, operator, right
//! tag) in the operator impls below. [`List`] uses `Rc<RefCell<..>>` storage
//! so that two handles to "the same list" observe each other's mutations,
//! matching the reference language's Python-list aliasing.
use crate::context::Context;
use crate::error::LangError;
use crate::position::Span;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type List = Rc<RefCell<Vec<Value>>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    pub fn as_f64(self) -> f64 {
        match self {
            Num::Int(v) => v as f64,
            Num::Float(v) => v,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Num::Int(v) => v == 0,
            Num::Float(v) => v == 0.0,
        }
    }

    pub fn is_truthy(self) -> bool {
        !self.is_zero()
    }

    fn both_int(a: Num, b: Num) -> Option<(i64, i64)> {
        match (a, b) {
            (Num::Int(x), Num::Int(y)) => Some((x, y)),
            _ => None,
        }
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Num::Int(v) => write!(f, "{v}"),
            Num::Float(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Clone)]
pub struct UserFunctionData {
    pub name: Rc<str>,
    pub body: Rc<crate::ast::Node>,
    pub param_names: Vec<String>,
    pub auto_return: bool,
    pub defining_context: Rc<Context>,
}

#[derive(Clone)]
pub enum ValueKind {
    Number(Num),
    Str(Rc<str>),
    List(List),
    UserFunction(Rc<UserFunctionData>),
    BuiltinFunction(Rc<str>),
}

#[derive(Clone)]
pub struct Value {
    pub kind: ValueKind,
    pub span: Option<Span>,
    pub context: Option<Rc<Context>>,
}

impl Value {
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            span: None,
            context: None,
        }
    }

    pub fn int(v: i64) -> Self {
        Self::new(ValueKind::Number(Num::Int(v)))
    }

    pub fn float(v: f64) -> Self {
        Self::new(ValueKind::Number(Num::Float(v)))
    }

    pub fn string(v: impl Into<Rc<str>>) -> Self {
        Self::new(ValueKind::Str(v.into()))
    }

    pub fn list(elements: Vec<Value>) -> Self {
        Self::new(ValueKind::List(Rc::new(RefCell::new(elements))))
    }

    pub fn null() -> Self {
        Self::int(0)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_context(mut self, context: Rc<Context>) -> Self {
        self.context = Some(context);
        self
    }

    /// A handle-level copy: lists and functions keep sharing their
    /// underlying storage/closure, only the span/context wrapper is fresh.
    pub fn copy(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            span: self.span.clone(),
            context: self.context.clone(),
        }
    }

    pub fn as_num(&self) -> Option<Num> {
        match self.kind {
            ValueKind::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match &self.kind {
            ValueKind::List(l) => Some(l),
            _ => None,
        }
    }

    /// List truthiness is non-empty, not the literal (almost certainly
    /// unintentional) reference behavior of "always false" - see
    /// DESIGN.md's Open Questions entry for the reasoning.
    pub fn is_true(&self) -> bool {
        match &self.kind {
            ValueKind::Number(n) => n.is_truthy(),
            ValueKind::Str(s) => !s.is_empty(),
            ValueKind::List(elems) => !elems.borrow().is_empty(),
            ValueKind::UserFunction(_) | ValueKind::BuiltinFunction(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            ValueKind::Number(_) => "number",
            ValueKind::Str(_) => "string",
            ValueKind::List(_) => "list",
            ValueKind::UserFunction(_) | ValueKind::BuiltinFunction(_) => "function",
        }
    }

    fn illegal_operation(&self, other: &Value) -> LangError {
        let span = Span::new(
            self.span.as_ref().map(|s| s.start.clone()).unwrap_or_else(|| {
                panic!("value used in an operation without a span")
            }),
            other
                .span
                .as_ref()
                .map(|s| s.end.clone())
                .or_else(|| self.span.as_ref().map(|s| s.end.clone()))
                .expect("value used in an operation without a span"),
        );
        LangError::runtime(
            span,
            "Illegal operation",
            self.context
                .clone()
                .or_else(|| other.context.clone())
                .expect("value used in an operation without a context"),
        )
    }

    fn ctx(&self, other: &Value) -> Rc<Context> {
        self.context
            .clone()
            .or_else(|| other.context.clone())
            .expect("value used in an operation without a context")
    }

    pub fn addition(&self, other: &Value) -> Result<Value, LangError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => {
                Ok(numeric_binop(*a, *b, |x, y| x + y, |x, y| x + y).with_context(self.ctx(other)))
            }
            (ValueKind::Str(a), ValueKind::Str(b)) => {
                Ok(Value::string(format!("{a}{b}")).with_context(self.ctx(other)))
            }
            // `List.copy()` in the reference implementation wraps the SAME
            // elements list, so the "new" list returned here still aliases
            // this list's storage - mutating one is observable through the
            // other. Preserved deliberately; see DESIGN.md.
            (ValueKind::List(elems), _) => {
                elems.borrow_mut().push(other.clone());
                Ok(Value::new(ValueKind::List(Rc::clone(elems))).with_context(self.ctx(other)))
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn subtraction(&self, other: &Value) -> Result<Value, LangError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => {
                Ok(numeric_binop(*a, *b, |x, y| x - y, |x, y| x - y).with_context(self.ctx(other)))
            }
            (ValueKind::List(elems), ValueKind::Number(n)) => {
                let idx = match *n {
                    Num::Int(i) => i,
                    Num::Float(f) => f as i64,
                };
                let len = elems.borrow().len() as i64;
                let real_idx = if idx < 0 { idx + len } else { idx };
                if real_idx < 0 || real_idx >= len {
                    return Err(LangError::runtime(
                        other.span.clone().expect("index value without a span"),
                        "Index element is out of bounds",
                        self.ctx(other),
                    ));
                }
                elems.borrow_mut().remove(real_idx as usize);
                Ok(Value::new(ValueKind::List(Rc::clone(elems))).with_context(self.ctx(other)))
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn multiply(&self, other: &Value) -> Result<Value, LangError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => {
                Ok(numeric_binop(*a, *b, |x, y| x * y, |x, y| x * y).with_context(self.ctx(other)))
            }
            (ValueKind::Str(s), ValueKind::Number(n)) => {
                let count = match *n {
                    Num::Int(i) => i.max(0) as usize,
                    Num::Float(f) => (f.max(0.0)) as usize,
                };
                Ok(Value::string(s.repeat(count)).with_context(self.ctx(other)))
            }
            (ValueKind::List(a), ValueKind::List(b)) => {
                let extra: Vec<Value> = b.borrow().iter().cloned().collect();
                a.borrow_mut().extend(extra);
                Ok(Value::new(ValueKind::List(Rc::clone(a))).with_context(self.ctx(other)))
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn divide(&self, other: &Value) -> Result<Value, LangError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => {
                if b.is_zero() {
                    return Err(LangError::runtime(
                        other.span.clone().expect("divisor without a span"),
                        "Division by zero",
                        self.ctx(other),
                    ));
                }
                Ok(Value::float(a.as_f64() / b.as_f64()).with_context(self.ctx(other)))
            }
            (ValueKind::List(elems), ValueKind::Number(n)) => {
                let idx = match *n {
                    Num::Int(i) => i,
                    Num::Float(f) => f as i64,
                };
                let borrowed = elems.borrow();
                let len = borrowed.len() as i64;
                let real_idx = if idx < 0 { idx + len } else { idx };
                if real_idx < 0 || real_idx >= len {
                    drop(borrowed);
                    return Err(LangError::runtime(
                        other.span.clone().expect("index value without a span"),
                        "Index element is out of bounds",
                        self.ctx(other),
                    ));
                }
                Ok(borrowed[real_idx as usize].copy().with_context(self.ctx(other)))
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn powered_by(&self, other: &Value) -> Result<Value, LangError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(match Num::both_int(*a, *b) {
                Some((x, y)) if y >= 0 => Value::int(x.pow(y as u32)),
                _ => Value::float(a.as_f64().powf(b.as_f64())),
            }
            .with_context(self.ctx(other))),
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn remainder(&self, other: &Value) -> Result<Value, LangError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => {
                if b.is_zero() {
                    return Err(LangError::runtime(
                        other.span.clone().expect("divisor without a span"),
                        "Division by zero",
                        self.ctx(other),
                    ));
                }
                Ok(numeric_binop(*a, *b, |x, y| x % y, |x, y| x % y).with_context(self.ctx(other)))
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn eq_compare(&self, other: &Value) -> Result<Value, LangError> {
        self.compare(other, |a, b| a == b)
    }

    pub fn neq_compare(&self, other: &Value) -> Result<Value, LangError> {
        self.compare(other, |a, b| a != b)
    }

    pub fn lt_compare(&self, other: &Value) -> Result<Value, LangError> {
        self.compare(other, |a, b| a < b)
    }

    pub fn gt_compare(&self, other: &Value) -> Result<Value, LangError> {
        self.compare(other, |a, b| a > b)
    }

    pub fn lte_compare(&self, other: &Value) -> Result<Value, LangError> {
        self.compare(other, |a, b| a <= b)
    }

    pub fn gte_compare(&self, other: &Value) -> Result<Value, LangError> {
        self.compare(other, |a, b| a >= b)
    }

    fn compare(&self, other: &Value, op: impl Fn(f64, f64) -> bool) -> Result<Value, LangError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(Value::int(
                op(a.as_f64(), b.as_f64()) as i64,
            )
            .with_context(self.ctx(other))),
            _ => Err(self.illegal_operation(other)),
        }
    }

    /// Logical AND/OR: unlike the reference implementation's value
    /// passthrough, this yields a plain 0/1 Number per the language's
    /// explicit boolean-result design for these operators.
    pub fn anded_by(&self, other: &Value) -> Result<Value, LangError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => {
                Ok(Value::int((a.is_truthy() && b.is_truthy()) as i64).with_context(self.ctx(other)))
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn ored_by(&self, other: &Value) -> Result<Value, LangError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => {
                Ok(Value::int((a.is_truthy() || b.is_truthy()) as i64).with_context(self.ctx(other)))
            }
            _ => Err(self.illegal_operation(other)),
        }
    }

    pub fn notted(&self) -> Result<Value, LangError> {
        match self.as_num() {
            Some(n) => Ok(Value::int(!n.is_truthy() as i64).with_context(self.ctx(self))),
            None => Err(self.illegal_operation(self)),
        }
    }
}

fn numeric_binop(a: Num, b: Num, int_op: impl Fn(i64, i64) -> i64, float_op: impl Fn(f64, f64) -> f64) -> Value {
    match Num::both_int(a, b) {
        Some((x, y)) => Value::int(int_op(x, y)),
        None => Value::float(float_op(a.as_f64(), b.as_f64())),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Number(n) => write!(f, "{n}"),
            ValueKind::Str(s) => write!(f, "{s}"),
            ValueKind::List(elems) => {
                let rendered: Vec<String> =
                    elems.borrow().iter().map(|v| v.to_string()).collect();
                write!(f, "{}", rendered.join(", "))
            }
            ValueKind::UserFunction(func) => write!(f, "<function {}>", func.name),
            ValueKind::BuiltinFunction(name) => write!(f, "<built-in function {name}>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Str(s) => write!(f, "\"{s}\""),
            ValueKind::List(elems) => {
                let rendered: Vec<String> =
                    elems.borrow().iter().map(|v| format!("{v:?}")).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            _ => write!(f, "{self}"),
        }
    }
}
