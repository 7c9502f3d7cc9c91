use super::Node;
use crate::position::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    And,
    Or,
}

#[derive(Debug, Clone)]
pub struct BinOp {
    pub left: Box<Node>,
    pub op: BinOpKind,
    pub right: Box<Node>,
    pub span: Span,
}

impl BinOp {
    pub fn new(left: Node, op: BinOpKind, right: Node) -> Self {
        let span = Span::new(left.span().start.clone(), right.span().end.clone());
        Self {
            left: Box::new(left),
            op,
            right: Box::new(right),
            span,
        }
    }
}
