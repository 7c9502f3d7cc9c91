//! Recursive-descent parser with one token of lookahead and a speculative
//! "register" protocol: every production builds a [`ParseOutcome`] that
//! tracks how many tokens it consumed, so a caller attempting an optional
//! production (`try_register`) can roll the cursor back exactly that far on
//! failure rather than unwind via exceptions or `Result::Err` short-circuit.
use crate::ast::*;
use crate::error::LangError;
use crate::position::Span;
use crate::token::{Token, TokenKind};
use crate::value::Num;

/// Accumulates a production's result and its token-consumption bookkeeping.
/// Generic over the payload so that helper productions (e.g. the case list
/// feeding into an `If` node) can thread something other than a bare
/// [`Node`] through the same register/try_register protocol.
#[derive(Debug)]
struct ParseOutcome<T> {
    node: Option<T>,
    error: Option<LangError>,
    last_registered_next_count: usize,
    next_count: usize,
    to_reverse_count: usize,
}

impl<T> Default for ParseOutcome<T> {
    fn default() -> Self {
        Self {
            node: None,
            error: None,
            last_registered_next_count: 0,
            next_count: 0,
            to_reverse_count: 0,
        }
    }
}

impl<T> ParseOutcome<T> {
    fn new() -> Self {
        Self::default()
    }

    /// Record that the caller itself consumed one token directly (as
    /// opposed to via a sub-production).
    fn register_next(&mut self) {
        self.last_registered_next_count = 1;
        self.next_count += 1;
    }

    /// Absorb a sub-production's outcome unconditionally.
    fn register<U>(&mut self, other: ParseOutcome<U>) -> Option<U> {
        self.last_registered_next_count = other.next_count;
        self.next_count += other.next_count;
        if other.error.is_some() {
            self.error = other.error;
        }
        other.node
    }

    /// Absorb a sub-production's outcome only if it succeeded; on failure,
    /// record how many tokens to roll back and swallow the error.
    fn try_register<U>(&mut self, other: ParseOutcome<U>) -> Option<U> {
        if other.error.is_some() {
            self.to_reverse_count = other.next_count;
            return None;
        }
        self.register(other)
    }

    fn success(mut self, node: T) -> Self {
        self.node = Some(node);
        self
    }

    fn failure(mut self, error: LangError) -> Self {
        if self.error.is_none() || self.last_registered_next_count == 0 {
            self.error = Some(error);
        }
        self
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    pub fn parse(mut self) -> Result<Node, LangError> {
        let result: ParseOutcome<Node> = self.statements();
        if result.error.is_none() && !matches!(self.current().kind, TokenKind::Eof) {
            return Err(LangError::invalid_syntax(
                self.current().span.clone(),
                "Token cannot appear after previous tokens",
            ));
        }
        match result.error {
            Some(e) => Err(e),
            None => Ok(result.node.unwrap()),
        }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.index]
    }

    fn advance(&mut self) -> &Token {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
        self.current()
    }

    fn reverse(&mut self, amount: usize) {
        self.index = self.index.saturating_sub(amount);
    }

    fn is_keyword(&self, word: &str) -> bool {
        self.current().is_keyword(word)
    }

    fn expect_keyword(&mut self, word: &str) -> Result<(), LangError> {
        if !self.is_keyword(word) {
            return Err(LangError::invalid_syntax(
                self.current().span.clone(),
                format!("Expected '{word}'"),
            ));
        }
        self.advance();
        Ok(())
    }

    // ---- statements ----------------------------------------------------

    fn statements(&mut self) -> ParseOutcome<Node> {
        let mut result = ParseOutcome::new();
        let mut statements = Vec::new();
        let start = self.current().span.start.clone();

        while matches!(self.current().kind, TokenKind::Newline) {
            result.register_next();
            self.advance();
        }

        let first = result.register(self.statement());
        if result.error.is_some() {
            return result;
        }
        statements.push(first.unwrap());

        loop {
            let mut newline_count = 0;
            while matches!(self.current().kind, TokenKind::Newline) {
                result.register_next();
                self.advance();
                newline_count += 1;
            }
            if newline_count == 0 {
                break;
            }

            let attempt = self.statement();
            match result.try_register(attempt) {
                Some(stmt) => statements.push(stmt),
                None => {
                    let back = result.to_reverse_count;
                    self.reverse(back);
                    break;
                }
            }
        }

        let end = self.current().span.end.clone();
        result.success(Node::List(ListLit::new(statements, Span::new(start, end))))
    }

    fn statement(&mut self) -> ParseOutcome<Node> {
        let mut result: ParseOutcome<Node> = ParseOutcome::new();
        let start = self.current().span.start.clone();

        if self.is_keyword("return") {
            result.register_next();
            self.advance();

            let attempt = self.expr();
            let value = match result.try_register(attempt) {
                Some(n) => Some(n),
                None => {
                    let back = result.to_reverse_count;
                    self.reverse(back);
                    None
                }
            };
            let span = Span::new(start, self.current().span.start.clone());
            return result.success(Node::Return(ReturnStmt::new(value, span)));
        }

        if self.is_keyword("continue") {
            result.register_next();
            self.advance();
            let span = Span::new(start, self.current().span.start.clone());
            return result.success(Node::Continue(ContinueStmt::new(span)));
        }

        if self.is_keyword("break") {
            result.register_next();
            self.advance();
            let span = Span::new(start, self.current().span.start.clone());
            return result.success(Node::Break(BreakStmt::new(span)));
        }

        let node = result.register(self.expr());
        if result.error.is_some() {
            return result.failure(LangError::invalid_syntax(
                self.current().span.clone(),
                "Expected 'return', 'continue', 'break', 'let', 'if', 'for', 'while', 'func', int, float, identifier, '+', '-', '(', '[' or 'not'",
            ));
        }
        result.success(node.unwrap())
    }

    fn expr(&mut self) -> ParseOutcome<Node> {
        let mut result: ParseOutcome<Node> = ParseOutcome::new();

        if self.is_keyword("let") {
            result.register_next();
            self.advance();

            let name = match &self.current().kind {
                TokenKind::Ident(name) => name.clone(),
                _ => {
                    return result.failure(LangError::invalid_syntax(
                        self.current().span.clone(),
                        "Expected identifier",
                    ))
                }
            };
            let name_start = self.current().span.start.clone();
            result.register_next();
            self.advance();

            if !matches!(self.current().kind, TokenKind::Eq) {
                return result.failure(LangError::invalid_syntax(
                    self.current().span.clone(),
                    "Expected '='",
                ));
            }
            result.register_next();
            self.advance();

            let value = result.register(self.expr());
            if result.error.is_some() {
                return result;
            }
            return result.success(Node::VarAssign(VarAssign::new(name, name_start, value.unwrap())));
        }

        let node = result.register(self.bin_op(Self::comp_expr, and_or_op, Self::comp_expr));
        if result.error.is_some() {
            return result.failure(LangError::invalid_syntax(
                self.current().span.clone(),
                "Expected 'let', 'if', 'for', 'while', 'func', int, float, identifier, '+', '-', '(', '[' or 'not'",
            ));
        }
        result.success(node.unwrap())
    }

    fn comp_expr(&mut self) -> ParseOutcome<Node> {
        let mut result: ParseOutcome<Node> = ParseOutcome::new();

        if self.is_keyword("not") {
            let op_start = self.current().span.start.clone();
            result.register_next();
            self.advance();

            let operand = result.register(self.comp_expr());
            if result.error.is_some() {
                return result;
            }
            return result.success(Node::UnaryOp(UnaryOp::new(
                UnaryOpKind::Not,
                op_start,
                operand.unwrap(),
            )));
        }

        let node = result.register(self.bin_op(Self::arith_expr, comparison_op, Self::arith_expr));
        if result.error.is_some() {
            return result.failure(LangError::invalid_syntax(
                self.current().span.clone(),
                "Expected int, float, identifier, '+', '-', '(', '[', 'if', 'for', 'while', 'func' or 'not'",
            ));
        }
        result.success(node.unwrap())
    }

    fn arith_expr(&mut self) -> ParseOutcome<Node> {
        self.bin_op(Self::term, add_sub_op, Self::term)
    }

    fn term(&mut self) -> ParseOutcome<Node> {
        self.bin_op(Self::factor, mul_div_op, Self::factor)
    }

    fn factor(&mut self) -> ParseOutcome<Node> {
        let mut result: ParseOutcome<Node> = ParseOutcome::new();
        let tok = self.current().clone();

        if matches!(tok.kind, TokenKind::Plus | TokenKind::Minus) {
            result.register_next();
            self.advance();
            let operand = result.register(self.factor());
            if result.error.is_some() {
                return result;
            }
            if matches!(tok.kind, TokenKind::Plus) {
                // unary plus is a no-op; the operand's own span already covers it
                return result.success(operand.unwrap());
            }
            return result.success(Node::UnaryOp(UnaryOp::new(
                UnaryOpKind::Neg,
                tok.span.start,
                operand.unwrap(),
            )));
        }

        self.power_or_modulo()
    }

    fn power_or_modulo(&mut self) -> ParseOutcome<Node> {
        self.bin_op(Self::call, pow_mod_op, Self::factor)
    }

    fn call(&mut self) -> ParseOutcome<Node> {
        let mut result: ParseOutcome<Node> = ParseOutcome::new();
        let atom = result.register(self.atom());
        if result.error.is_some() {
            return result;
        }
        let atom = atom.unwrap();

        if matches!(self.current().kind, TokenKind::LParen) {
            result.register_next();
            self.advance();
            let mut args = Vec::new();

            if matches!(self.current().kind, TokenKind::RParen) {
                result.register_next();
                self.advance();
            } else {
                let first = result.register(self.expr());
                if result.error.is_some() {
                    return result.failure(LangError::invalid_syntax(
                        self.current().span.clone(),
                        "Expected ')', int, float, string, identifier, '+', '-', '(', '[', 'if', 'for', 'while', 'func' or 'not'",
                    ));
                }
                args.push(first.unwrap());

                while matches!(self.current().kind, TokenKind::Comma) {
                    result.register_next();
                    self.advance();
                    let next = result.register(self.expr());
                    if result.error.is_some() {
                        return result;
                    }
                    args.push(next.unwrap());
                }

                if !matches!(self.current().kind, TokenKind::RParen) {
                    return result.failure(LangError::invalid_syntax(
                        self.current().span.clone(),
                        "Expected ',' or ')'",
                    ));
                }
                result.register_next();
                self.advance();
            }
            return result.success(Node::Call(Call::new(atom, args)));
        }

        result.success(atom)
    }

    fn atom(&mut self) -> ParseOutcome<Node> {
        let mut result: ParseOutcome<Node> = ParseOutcome::new();
        let tok = self.current().clone();

        match &tok.kind {
            TokenKind::Int(v) => {
                result.register_next();
                self.advance();
                result.success(Node::Number(NumberLit::new(Num::Int(*v), tok.span)))
            }
            TokenKind::Float(v) => {
                result.register_next();
                self.advance();
                result.success(Node::Number(NumberLit::new(Num::Float(*v), tok.span)))
            }
            TokenKind::Str(s) => {
                result.register_next();
                self.advance();
                result.success(Node::Str(StringLit::new(s.clone(), tok.span)))
            }
            TokenKind::Ident(name) => {
                result.register_next();
                self.advance();
                result.success(Node::VarAccess(VarAccess::new(name.clone(), tok.span)))
            }
            TokenKind::LParen => {
                result.register_next();
                self.advance();
                let inner = result.register(self.expr());
                if result.error.is_some() {
                    return result;
                }
                if matches!(self.current().kind, TokenKind::RParen) {
                    result.register_next();
                    self.advance();
                    result.success(inner.unwrap())
                } else {
                    result.failure(LangError::invalid_syntax(
                        self.current().span.clone(),
                        "Expected ')'",
                    ))
                }
            }
            TokenKind::LSquare => {
                let inner = result.register(self.list_expr());
                if result.error.is_some() {
                    return result;
                }
                result.success(inner.unwrap())
            }
            TokenKind::Keyword(k) if k == "if" => {
                let inner = result.register(self.if_expr());
                if result.error.is_some() {
                    return result;
                }
                result.success(inner.unwrap())
            }
            TokenKind::Keyword(k) if k == "for" => {
                let inner = result.register(self.for_expr());
                if result.error.is_some() {
                    return result;
                }
                result.success(inner.unwrap())
            }
            TokenKind::Keyword(k) if k == "while" => {
                let inner = result.register(self.while_expr());
                if result.error.is_some() {
                    return result;
                }
                result.success(inner.unwrap())
            }
            TokenKind::Keyword(k) if k == "func" => {
                let inner = result.register(self.func_def());
                if result.error.is_some() {
                    return result;
                }
                result.success(inner.unwrap())
            }
            _ => result.failure(LangError::invalid_syntax(
                tok.span,
                "Expected 'let', int, float, identifier, '+', '-', '(', '[', 'if', 'for', 'while' or 'func'",
            )),
        }
    }

    fn list_expr(&mut self) -> ParseOutcome<Node> {
        let mut result: ParseOutcome<Node> = ParseOutcome::new();
        let mut elements = Vec::new();
        let start = self.current().span.start.clone();

        if !matches!(self.current().kind, TokenKind::LSquare) {
            return result.failure(LangError::invalid_syntax(
                self.current().span.clone(),
                "Expected '['",
            ));
        }
        result.register_next();
        self.advance();

        if matches!(self.current().kind, TokenKind::RSquare) {
            result.register_next();
            self.advance();
        } else {
            let first = result.register(self.expr());
            if result.error.is_some() {
                return result.failure(LangError::invalid_syntax(
                    self.current().span.clone(),
                    "Expected ']', 'let', 'if', 'for', 'while', 'func', int, float, identifier, '+', '-', '(', '[' or 'not'",
                ));
            }
            elements.push(first.unwrap());

            while matches!(self.current().kind, TokenKind::Comma) {
                result.register_next();
                self.advance();
                let next = result.register(self.expr());
                if result.error.is_some() {
                    return result;
                }
                elements.push(next.unwrap());
            }

            if !matches!(self.current().kind, TokenKind::RSquare) {
                return result.failure(LangError::invalid_syntax(
                    self.current().span.clone(),
                    "Expected ',' or ']'",
                ));
            }
            result.register_next();
            self.advance();
        }

        let end = self.current().span.end.clone();
        result.success(Node::List(ListLit::new(elements, Span::new(start, end))))
    }

    // ---- if / consider / last ------------------------------------------

    fn if_expr(&mut self) -> ParseOutcome<Node> {
        let mut result: ParseOutcome<Node> = ParseOutcome::new();
        let cases_and_else = result.register(self.if_expr_cases("if"));
        if result.error.is_some() {
            return result;
        }
        let (cases, else_case) = cases_and_else.unwrap();
        result.success(Node::If(IfExpr::new(cases, else_case)))
    }

    /// Shared shape of `if cond do ... (consider cond do ...)* (last ...)?`.
    /// `case_keyword` is `"if"` for the head and `"consider"` for a
    /// continuation parsed through the same machinery.
    fn if_expr_cases(&mut self, case_keyword: &str) -> ParseOutcome<(Vec<IfCase>, Option<ElseCase>)> {
        let mut result = ParseOutcome::new();
        let mut cases = Vec::new();

        if !self.is_keyword(case_keyword) {
            return result.failure(LangError::invalid_syntax(
                self.current().span.clone(),
                format!("Expected '{case_keyword}'"),
            ));
        }
        result.register_next();
        self.advance();

        let condition = result.register(self.expr());
        if result.error.is_some() {
            return result;
        }
        let condition = condition.unwrap();

        if !self.is_keyword("do") {
            return result.failure(LangError::invalid_syntax(
                self.current().span.clone(),
                "Expected 'do'",
            ));
        }
        result.register_next();
        self.advance();

        let else_case;
        if matches!(self.current().kind, TokenKind::Newline) {
            result.register_next();
            self.advance();

            let body = result.register(self.statements());
            if result.error.is_some() {
                return result;
            }
            cases.push(IfCase {
                condition,
                body: body.unwrap(),
                returns_null: true,
            });

            if self.is_keyword("end") {
                result.register_next();
                self.advance();
                else_case = None;
            } else {
                let tail = result.register(self.if_expr_b_or_c());
                if result.error.is_some() {
                    return result;
                }
                let (more_cases, tail_else) = tail.unwrap();
                cases.extend(more_cases);
                else_case = tail_else;
            }
        } else {
            let body = result.register(self.statement());
            if result.error.is_some() {
                return result;
            }
            cases.push(IfCase {
                condition,
                body: body.unwrap(),
                returns_null: false,
            });

            let tail = result.register(self.if_expr_b_or_c());
            if result.error.is_some() {
                return result;
            }
            let (more_cases, tail_else) = tail.unwrap();
            cases.extend(more_cases);
            else_case = tail_else;
        }

        result.success((cases, else_case))
    }

    fn if_expr_b_or_c(&mut self) -> ParseOutcome<(Vec<IfCase>, Option<ElseCase>)> {
        let mut result = ParseOutcome::new();

        if self.is_keyword("consider") {
            let all_cases = result.register(self.if_expr_cases("consider"));
            if result.error.is_some() {
                return result;
            }
            result.success(all_cases.unwrap())
        } else {
            let else_case = result.register(self.if_expr_c());
            if result.error.is_some() {
                return result;
            }
            result.success((Vec::new(), else_case.unwrap()))
        }
    }

    fn if_expr_c(&mut self) -> ParseOutcome<Option<ElseCase>> {
        let mut result = ParseOutcome::new();
        let mut else_case = None;

        if self.is_keyword("last") {
            result.register_next();
            self.advance();

            if matches!(self.current().kind, TokenKind::Newline) {
                result.register_next();
                self.advance();

                let body = result.register(self.statements());
                if result.error.is_some() {
                    return result;
                }
                else_case = Some(ElseCase {
                    body: body.unwrap(),
                    returns_null: true,
                });

                if self.is_keyword("end") {
                    result.register_next();
                    self.advance();
                } else {
                    return result.failure(LangError::invalid_syntax(
                        self.current().span.clone(),
                        "Expected 'end'",
                    ));
                }
            } else {
                let body = result.register(self.statement());
                if result.error.is_some() {
                    return result;
                }
                else_case = Some(ElseCase {
                    body: body.unwrap(),
                    returns_null: false,
                });
            }
        }

        result.success(else_case)
    }

    // ---- for / while / func ---------------------------------------------

    fn for_expr(&mut self) -> ParseOutcome<Node> {
        let mut result: ParseOutcome<Node> = ParseOutcome::new();

        if !self.is_keyword("for") {
            return result.failure(LangError::invalid_syntax(
                self.current().span.clone(),
                "Expected 'for'",
            ));
        }
        result.register_next();
        self.advance();

        let var_name = match &self.current().kind {
            TokenKind::Ident(name) => name.clone(),
            _ => {
                return result.failure(LangError::invalid_syntax(
                    self.current().span.clone(),
                    "Expected identifier",
                ))
            }
        };
        let var_start = self.current().span.start.clone();
        result.register_next();
        self.advance();

        if !matches!(self.current().kind, TokenKind::Eq) {
            return result.failure(LangError::invalid_syntax(
                self.current().span.clone(),
                "Expected '='",
            ));
        }
        result.register_next();
        self.advance();

        let start_value = result.register(self.expr());
        if result.error.is_some() {
            return result;
        }

        if !self.is_keyword("to") {
            return result.failure(LangError::invalid_syntax(
                self.current().span.clone(),
                "Expected 'to'",
            ));
        }
        result.register_next();
        self.advance();

        let end_value = result.register(self.expr());
        if result.error.is_some() {
            return result;
        }

        let step_value = if self.is_keyword("change") {
            result.register_next();
            self.advance();
            let step = result.register(self.expr());
            if result.error.is_some() {
                return result;
            }
            Some(step.unwrap())
        } else {
            None
        };

        if !self.is_keyword("do") {
            return result.failure(LangError::invalid_syntax(
                self.current().span.clone(),
                "Expected 'do'",
            ));
        }
        result.register_next();
        self.advance();

        if matches!(self.current().kind, TokenKind::Newline) {
            result.register_next();
            self.advance();

            let body = result.register(self.statements());
            if result.error.is_some() {
                return result;
            }

            if !self.is_keyword("end") {
                return result.failure(LangError::invalid_syntax(
                    self.current().span.clone(),
                    "Expected 'end'",
                ));
            }
            result.register_next();
            self.advance();

            return result.success(Node::For(ForLoop::new(
                var_name,
                var_start,
                start_value.unwrap(),
                end_value.unwrap(),
                step_value,
                body.unwrap(),
                true,
            )));
        }

        let body = result.register(self.statement());
        if result.error.is_some() {
            return result;
        }

        result.success(Node::For(ForLoop::new(
            var_name,
            var_start,
            start_value.unwrap(),
            end_value.unwrap(),
            step_value,
            body.unwrap(),
            false,
        )))
    }

    fn while_expr(&mut self) -> ParseOutcome<Node> {
        let mut result: ParseOutcome<Node> = ParseOutcome::new();

        if !self.is_keyword("while") {
            return result.failure(LangError::invalid_syntax(
                self.current().span.clone(),
                "Expected 'while'",
            ));
        }
        result.register_next();
        self.advance();

        let condition = result.register(self.expr());
        if result.error.is_some() {
            return result;
        }
        let condition = condition.unwrap();

        if !self.is_keyword("do") {
            return result.failure(LangError::invalid_syntax(
                self.current().span.clone(),
                "Expected 'do'",
            ));
        }
        result.register_next();
        self.advance();

        if matches!(self.current().kind, TokenKind::Newline) {
            result.register_next();
            self.advance();

            let body = result.register(self.statements());
            if result.error.is_some() {
                return result;
            }

            if !self.is_keyword("end") {
                return result.failure(LangError::invalid_syntax(
                    self.current().span.clone(),
                    "Expected 'end'",
                ));
            }
            result.register_next();
            self.advance();

            return result.success(Node::While(WhileLoop::new(condition, body.unwrap(), true)));
        }

        let body = result.register(self.statement());
        if result.error.is_some() {
            return result;
        }
        result.success(Node::While(WhileLoop::new(condition, body.unwrap(), false)))
    }

    fn func_def(&mut self) -> ParseOutcome<Node> {
        let mut result: ParseOutcome<Node> = ParseOutcome::new();

        if !self.is_keyword("func") {
            return result.failure(LangError::invalid_syntax(
                self.current().span.clone(),
                "Expected 'func'",
            ));
        }
        result.register_next();
        self.advance();

        let mut name = None;
        let mut name_start = None;

        if let TokenKind::Ident(n) = &self.current().kind {
            name = Some(n.clone());
            name_start = Some(self.current().span.start.clone());
            result.register_next();
            self.advance();
            if !matches!(self.current().kind, TokenKind::LParen) {
                return result.failure(LangError::invalid_syntax(
                    self.current().span.clone(),
                    "Expected '('",
                ));
            }
        } else if !matches!(self.current().kind, TokenKind::LParen) {
            return result.failure(LangError::invalid_syntax(
                self.current().span.clone(),
                "Expected identifier or '('",
            ));
        }

        result.register_next();
        self.advance();
        let mut params = Vec::new();
        let mut params_start = None;

        if let TokenKind::Ident(n) = &self.current().kind {
            params_start = Some(self.current().span.start.clone());
            params.push(n.clone());
            result.register_next();
            self.advance();

            while matches!(self.current().kind, TokenKind::Comma) {
                result.register_next();
                self.advance();
                match &self.current().kind {
                    TokenKind::Ident(n) => {
                        params.push(n.clone());
                        result.register_next();
                        self.advance();
                    }
                    _ => {
                        return result.failure(LangError::invalid_syntax(
                            self.current().span.clone(),
                            "Expected identifier",
                        ))
                    }
                }
            }

            if !matches!(self.current().kind, TokenKind::RParen) {
                return result.failure(LangError::invalid_syntax(
                    self.current().span.clone(),
                    "Expected ',' or ')'",
                ));
            }
        } else if !matches!(self.current().kind, TokenKind::RParen) {
            return result.failure(LangError::invalid_syntax(
                self.current().span.clone(),
                "Expected identifier or ')'",
            ));
        }

        result.register_next();
        self.advance();

        if matches!(self.current().kind, TokenKind::Arrow) {
            result.register_next();
            self.advance();

            let body = result.register(self.expr());
            if result.error.is_some() {
                return result;
            }
            return result.success(Node::FuncDef(FuncDef::new(
                name,
                name_start,
                params,
                params_start,
                body.unwrap(),
                true,
            )));
        }

        if !matches!(self.current().kind, TokenKind::Newline) {
            return result.failure(LangError::invalid_syntax(
                self.current().span.clone(),
                "Expected '->' or NEWLINE",
            ));
        }
        result.register_next();
        self.advance();

        let body = result.register(self.statements());
        if result.error.is_some() {
            return result;
        }

        if !self.is_keyword("end") {
            return result.failure(LangError::invalid_syntax(
                self.current().span.clone(),
                "Expected 'end'",
            ));
        }
        result.register_next();
        self.advance();

        result.success(Node::FuncDef(FuncDef::new(
            name,
            name_start,
            params,
            params_start,
            body.unwrap(),
            false,
        )))
    }

    // ---- shared binary-operator climbing -------------------------------

    fn bin_op(
        &mut self,
        func_a: fn(&mut Self) -> ParseOutcome<Node>,
        classify: fn(&Token) -> Option<BinOpKind>,
        func_b: fn(&mut Self) -> ParseOutcome<Node>,
    ) -> ParseOutcome<Node> {
        let mut result: ParseOutcome<Node> = ParseOutcome::new();
        let left = result.register(func_a(self));
        if result.error.is_some() {
            return result;
        }
        let mut left = left.unwrap();

        while let Some(op) = classify(self.current()) {
            result.register_next();
            self.advance();
            let right = result.register(func_b(self));
            if result.error.is_some() {
                return result;
            }
            left = Node::BinOp(BinOp::new(left, op, right.unwrap()));
        }

        result.success(left)
    }
}

fn and_or_op(tok: &Token) -> Option<BinOpKind> {
    if tok.is_keyword("and") {
        Some(BinOpKind::And)
    } else if tok.is_keyword("or") {
        Some(BinOpKind::Or)
    } else {
        None
    }
}

fn comparison_op(tok: &Token) -> Option<BinOpKind> {
    match tok.kind {
        TokenKind::Ee => Some(BinOpKind::Eq),
        TokenKind::Ne => Some(BinOpKind::Ne),
        TokenKind::Lt => Some(BinOpKind::Lt),
        TokenKind::Gt => Some(BinOpKind::Gt),
        TokenKind::Lte => Some(BinOpKind::Lte),
        TokenKind::Gte => Some(BinOpKind::Gte),
        _ => None,
    }
}

fn add_sub_op(tok: &Token) -> Option<BinOpKind> {
    match tok.kind {
        TokenKind::Plus => Some(BinOpKind::Add),
        TokenKind::Minus => Some(BinOpKind::Sub),
        _ => None,
    }
}

fn mul_div_op(tok: &Token) -> Option<BinOpKind> {
    match tok.kind {
        TokenKind::Mul => Some(BinOpKind::Mul),
        TokenKind::Div => Some(BinOpKind::Div),
        _ => None,
    }
}

fn pow_mod_op(tok: &Token) -> Option<BinOpKind> {
    match tok.kind {
        TokenKind::Pow => Some(BinOpKind::Pow),
        TokenKind::Modulo => Some(BinOpKind::Mod),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> Result<Node, LangError> {
        let tokens = Lexer::new("<test>", src).tokenize().unwrap();
        Parser::new(tokens).parse()
    }

    #[test]
    fn parses_arithmetic_precedence() {
        let node = parse("1 + 2 * 3").unwrap();
        match node {
            Node::List(list) => {
                assert_eq!(list.elements.len(), 1);
                match &list.elements[0] {
                    Node::BinOp(b) => assert_eq!(b.op, BinOpKind::Add),
                    _ => panic!("expected top-level addition"),
                }
            }
            _ => panic!("expected a statement list"),
        }
    }

    #[test]
    fn parses_let_binding() {
        let node = parse("let x = 5").unwrap();
        if let Node::List(list) = node {
            assert!(matches!(list.elements[0], Node::VarAssign(_)));
        } else {
            panic!();
        }
    }

    #[test]
    fn parses_inline_if() {
        let node = parse("if 1 do 2 last 3").unwrap();
        if let Node::List(list) = node {
            match &list.elements[0] {
                Node::If(if_expr) => {
                    assert_eq!(if_expr.cases.len(), 1);
                    assert!(if_expr.else_case.is_some());
                }
                _ => panic!("expected an if expression"),
            }
        }
    }

    #[test]
    fn parses_block_if_consider_last() {
        let src = "if 1 do\nreturn 1\nconsider 2 do\nreturn 2\nlast\nreturn 3\nend";
        let node = parse(src).unwrap();
        if let Node::List(list) = node {
            match &list.elements[0] {
                Node::If(if_expr) => {
                    assert_eq!(if_expr.cases.len(), 2);
                    assert!(if_expr.else_case.is_some());
                }
                _ => panic!("expected an if expression"),
            }
        }
    }

    #[test]
    fn parses_for_loop_with_step() {
        let node = parse("for i = 0 to 10 change 2 do i").unwrap();
        if let Node::List(list) = node {
            assert!(matches!(list.elements[0], Node::For(_)));
        }
    }

    #[test]
    fn parses_func_def_inline_and_block() {
        let node = parse("func add(a, b) -> a + b").unwrap();
        if let Node::List(list) = node {
            match &list.elements[0] {
                Node::FuncDef(f) => {
                    assert_eq!(f.params, vec!["a".to_string(), "b".to_string()]);
                    assert!(f.auto_return);
                }
                _ => panic!("expected a function definition"),
            }
        }
    }

    #[test]
    fn invalid_syntax_is_reported() {
        assert!(parse("let = 5").is_err());
    }
}
