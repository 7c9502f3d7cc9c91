//! Lexical scoping and call-stack bookkeeping.
//!
//! A [`Context`] is a runtime frame: it names the function or program it
//! belongs to, links to the frame that invoked it (for traceback rendering),
//! and owns a [`SymbolTable`] for name resolution. Contexts form a tree
//! rooted at the program's top-level frame; function calls extend the
//! function's *defining* context, not the caller's, which is what gives
//! closures their lexical (rather than dynamic) scoping.
use crate::position::Span;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A mapping from name to value, chained to an optional parent for lookup.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Value>,
    parent: Option<Rc<RefCell<SymbolTable>>>,
}

impl SymbolTable {
    pub fn new(parent: Option<Rc<RefCell<SymbolTable>>>) -> Self {
        Self {
            symbols: HashMap::new(),
            parent,
        }
    }

    /// Walk the parent chain looking for `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.symbols.get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.borrow().get(name))
    }

    /// Bind `name` in this frame only.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.symbols.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) {
        self.symbols.remove(name);
    }
}

#[derive(Debug, Clone)]
pub struct Context {
    pub display_name: Rc<str>,
    pub parent: Option<Rc<Context>>,
    /// The span of the call (or `run` invocation) that created this frame,
    /// used to render the line a traceback entry points at. This is the
    /// *call site's* span, not the callee's definition site.
    pub parent_entry_span: Option<Span>,
    pub symbol_table: Rc<RefCell<SymbolTable>>,
}

impl Context {
    pub fn new(
        display_name: impl Into<Rc<str>>,
        parent: Option<Rc<Context>>,
        parent_entry_span: Option<Span>,
        symbol_table: Rc<RefCell<SymbolTable>>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            parent,
            parent_entry_span,
            symbol_table,
        }
    }

    /// The root program context: a fresh symbol table with no parent scope.
    pub fn program(display_name: impl Into<Rc<str>>) -> Self {
        Self::new(
            display_name,
            None,
            None,
            Rc::new(RefCell::new(SymbolTable::new(None))),
        )
    }
}
