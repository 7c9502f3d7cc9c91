use super::Node;
use crate::position::{Position, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOpKind {
    Neg,
    Not,
}

#[derive(Debug, Clone)]
pub struct UnaryOp {
    pub op: UnaryOpKind,
    pub operand: Box<Node>,
    pub span: Span,
}

impl UnaryOp {
    pub fn new(op: UnaryOpKind, op_start: Position, operand: Node) -> Self {
        let span = Span::new(op_start, operand.span().end.clone());
        Self {
            op,
            operand: Box::new(operand),
            span,
        }
    }
}
