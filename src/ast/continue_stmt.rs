use crate::position::Span;

#[derive(Debug, Clone)]
pub struct ContinueStmt {
    pub span: Span,
}

impl ContinueStmt {
    pub fn new(span: Span) -> Self {
        Self { span }
    }
}
