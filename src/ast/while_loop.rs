use super::Node;
use crate::position::Span;

#[derive(Debug, Clone)]
pub struct WhileLoop {
    pub condition: Box<Node>,
    pub body: Box<Node>,
    pub returns_null: bool,
    pub span: Span,
}

impl WhileLoop {
    pub fn new(condition: Node, body: Node, returns_null: bool) -> Self {
        let span = Span::new(condition.span().start.clone(), body.span().end.clone());
        Self {
            condition: Box::new(condition),
            body: Box::new(body),
            returns_null,
            span,
        }
    }
}
