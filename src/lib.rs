//! Lexer, parser and tree-walking evaluator for a small dynamically typed
//! scripting language.
//!
//! [`run`] is the single entry point shared by the CLI binary and the
//! language's own `run` built-in (which re-enters the pipeline to execute
//! another script against the same global bindings).
pub mod ast;
pub mod builtins;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod token;
pub mod value;

use crate::context::{Context, SymbolTable};
use crate::error::LangError;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Lex, parse and evaluate `source` (identified as `filename` in
/// diagnostics) against a fresh global scope pre-populated with the
/// built-in registry. A program's top level parses the same way a list
/// literal does, so the returned value (if evaluation succeeds) is always a
/// `List` of every top-level statement's value, in order. Also returns the
/// first error encountered at any stage, if any.
pub fn run(
    filename: impl Into<Rc<str>>,
    source: impl Into<Rc<str>>,
) -> (Option<Value>, Option<LangError>) {
    let global = Rc::new(RefCell::new(SymbolTable::new(None)));
    builtins::install_globals(&mut global.borrow_mut());
    run_with_global(filename, source, global)
}

/// Like [`run`], but against a caller-supplied global scope. Used by the
/// `run` built-in so that a script invoked this way shares the same
/// top-level bindings as its caller, rather than starting from a second,
/// independently pre-populated table.
pub(crate) fn run_with_global(
    filename: impl Into<Rc<str>>,
    source: impl Into<Rc<str>>,
    global: Rc<RefCell<SymbolTable>>,
) -> (Option<Value>, Option<LangError>) {
    let filename = filename.into();
    let source = source.into();

    let tokens = match Lexer::new(Rc::clone(&filename), Rc::clone(&source)).tokenize() {
        Ok(tokens) => tokens,
        Err(e) => return (None, Some(e)),
    };

    let ast = match Parser::new(tokens).parse() {
        Ok(ast) => ast,
        Err(e) => return (None, Some(e)),
    };

    let context = Rc::new(Context::new("<program>", None, None, global));
    let outcome = evaluator::eval(&ast, &context);
    (outcome.value, outcome.error)
}
