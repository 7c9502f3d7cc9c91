//! The four error kinds the lexer, parser and evaluator can raise, plus the
//! caret/traceback rendering shared by all of them.
use crate::context::Context;
use crate::position::{char_byte_offset, Position, Span};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LangError {
    #[error("Illegal Character: {details}")]
    IllegalChar { span: Span, details: String },

    #[error("Expected Character: {details}")]
    ExpectedChar { span: Span, details: String },

    #[error("Invalid Syntax: {details}")]
    InvalidSyntax { span: Span, details: String },

    #[error("Runtime Error: {details}")]
    Runtime {
        span: Span,
        details: String,
        context: Rc<Context>,
    },
}

impl LangError {
    pub fn illegal_char(span: Span, details: impl Into<String>) -> Self {
        Self::IllegalChar {
            span,
            details: details.into(),
        }
    }

    pub fn expected_char(span: Span, details: impl Into<String>) -> Self {
        Self::ExpectedChar {
            span,
            details: details.into(),
        }
    }

    pub fn invalid_syntax(span: Span, details: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            span,
            details: details.into(),
        }
    }

    pub fn runtime(span: Span, details: impl Into<String>, context: Rc<Context>) -> Self {
        Self::Runtime {
            span,
            details: details.into(),
            context,
        }
    }

    fn span(&self) -> &Span {
        match self {
            LangError::IllegalChar { span, .. }
            | LangError::ExpectedChar { span, .. }
            | LangError::InvalidSyntax { span, .. }
            | LangError::Runtime { span, .. } => span,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            LangError::IllegalChar { .. } => "Illegal Character",
            LangError::ExpectedChar { .. } => "Expected Character",
            LangError::InvalidSyntax { .. } => "Invalid Syntax",
            LangError::Runtime { .. } => "Runtime Error",
        }
    }

    fn details(&self) -> &str {
        match self {
            LangError::IllegalChar { details, .. }
            | LangError::ExpectedChar { details, .. }
            | LangError::InvalidSyntax { details, .. }
            | LangError::Runtime { details, .. } => details,
        }
    }

    /// Render the full human-facing diagnostic: traceback (runtime errors
    /// only), error line, and the arrow-underlined source excerpt.
    pub fn render(&self) -> String {
        let span = self.span();
        let mut out = String::new();

        if let LangError::Runtime { context, .. } = self {
            out.push_str(&generate_traceback(&span.start, context));
        }

        out.push_str(&format!(
            "{}: {}\nFile {}, line {}\n\n",
            self.name(),
            self.details(),
            span.start.filename,
            span.start.line + 1,
        ));
        out.push_str(&arrow_indicator(&span.start.source, &span.start, &span.end));
        out
    }
}

impl fmt::Display for LangError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Walk the context chain from innermost to outermost frame, building a
/// Python-style traceback: the outermost frame is printed first.
fn generate_traceback(start: &Position, context: &Rc<Context>) -> String {
    let mut lines = Vec::new();
    let mut pos = start.clone();
    let mut ctx = Some(Rc::clone(context));

    while let Some(c) = ctx {
        lines.push(format!(
            "  File {}, line {}, in {}\n",
            pos.filename,
            pos.line + 1,
            c.display_name
        ));
        match (&c.parent_entry_span, &c.parent) {
            (Some(span), Some(parent)) => {
                pos = span.start.clone();
                ctx = Some(Rc::clone(parent));
            }
            _ => ctx = None,
        }
    }

    lines.reverse();
    format!("Traceback (most recent call last):\n{}", lines.concat())
}

/// Underline the source span between `start` and `end` with carets, one
/// line at a time, mirroring the reference implementation's indicator.
fn arrow_indicator(text: &str, start: &Position, end: &Position) -> String {
    let mut out = String::new();

    let mut index_start = text[..char_byte_offset(text, start.index)]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let mut index_end = text[index_start..]
        .find('\n')
        .map(|i| index_start + i)
        .unwrap_or(text.len());

    let line_count = end.line.saturating_sub(start.line) + 1;

    for i in 0..line_count {
        let line = &text[index_start..index_end];
        let col_start = if i == 0 { start.col.max(0) as usize } else { 0 };
        let col_end = if i == line_count - 1 {
            end.col.max(0) as usize
        } else {
            line.chars().count().saturating_sub(1)
        };

        out.push_str(line);
        out.push('\n');
        out.push_str(&" ".repeat(col_start));
        out.push_str(&"^".repeat(col_end.saturating_sub(col_start)));
        if i + 1 < line_count {
            out.push('\n');
        }

        index_start = index_end + 1;
        index_end = text[index_start.min(text.len())..]
            .find('\n')
            .map(|i| index_start + i)
            .unwrap_or(text.len());
    }

    out.replace('\t', "")
}
