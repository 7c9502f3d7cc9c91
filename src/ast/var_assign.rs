use super::Node;
use crate::position::{Position, Span};

#[derive(Debug, Clone)]
pub struct VarAssign {
    pub name: String,
    pub value: Box<Node>,
    pub span: Span,
}

impl VarAssign {
    pub fn new(name: String, name_start: Position, value: Node) -> Self {
        let span = Span::new(name_start, value.span().end.clone());
        Self {
            name,
            value: Box::new(value),
            span,
        }
    }
}
