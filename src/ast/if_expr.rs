use super::Node;
use crate::position::Span;

#[derive(Debug, Clone)]
pub struct IfCase {
    pub condition: Node,
    pub body: Node,
    /// True for a block body (terminated by `end`): the case's value is
    /// `null` rather than the body's value.
    pub returns_null: bool,
}

#[derive(Debug, Clone)]
pub struct ElseCase {
    pub body: Node,
    pub returns_null: bool,
}

#[derive(Debug, Clone)]
pub struct IfExpr {
    pub cases: Vec<IfCase>,
    pub else_case: Option<ElseCase>,
    pub span: Span,
}

impl IfExpr {
    pub fn new(cases: Vec<IfCase>, else_case: Option<ElseCase>) -> Self {
        let start = cases[0].condition.span().start.clone();
        let end = match &else_case {
            Some(e) => e.body.span().end.clone(),
            None => cases.last().unwrap().body.span().end.clone(),
        };
        Self {
            cases,
            else_case,
            span: Span::new(start, end),
        }
    }
}
