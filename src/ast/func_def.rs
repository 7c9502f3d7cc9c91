use super::Node;
use crate::position::{Position, Span};

#[derive(Debug, Clone)]
pub struct FuncDef {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Box<Node>,
    pub auto_return: bool,
    pub span: Span,
}

impl FuncDef {
    pub fn new(
        name: Option<String>,
        name_start: Option<Position>,
        params: Vec<String>,
        params_start: Option<Position>,
        body: Node,
        auto_return: bool,
    ) -> Self {
        let start = name_start
            .or(params_start)
            .unwrap_or_else(|| body.span().start.clone());
        let span = Span::new(start, body.span().end.clone());
        Self {
            name,
            params,
            body: Box::new(body),
            auto_return,
            span,
        }
    }
}
