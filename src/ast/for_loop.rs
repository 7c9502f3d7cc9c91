use super::Node;
use crate::position::{Position, Span};

#[derive(Debug, Clone)]
pub struct ForLoop {
    pub var_name: String,
    pub start_value: Box<Node>,
    pub end_value: Box<Node>,
    pub step_value: Option<Box<Node>>,
    pub body: Box<Node>,
    pub returns_null: bool,
    pub span: Span,
}

impl ForLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        var_name: String,
        var_start: Position,
        start_value: Node,
        end_value: Node,
        step_value: Option<Node>,
        body: Node,
        returns_null: bool,
    ) -> Self {
        let span = Span::new(var_start, body.span().end.clone());
        Self {
            var_name,
            start_value: Box::new(start_value),
            end_value: Box::new(end_value),
            step_value: step_value.map(Box::new),
            body: Box::new(body),
            returns_null,
            span,
        }
    }
}
