use super::Node;
use crate::position::Span;

#[derive(Debug, Clone)]
pub struct Call {
    pub callee: Box<Node>,
    pub args: Vec<Node>,
    pub span: Span,
}

impl Call {
    pub fn new(callee: Node, args: Vec<Node>) -> Self {
        let start = callee.span().start.clone();
        let end = args
            .last()
            .map(|a| a.span().end.clone())
            .unwrap_or_else(|| callee.span().end.clone());
        let span = Span::new(start, end);
        Self {
            callee: Box::new(callee),
            args,
            span,
        }
    }
}
