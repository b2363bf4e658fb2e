use crate::ast::{BinOp, ExprKind, UnOp};
use crate::frontend::lexer::Lexer;
use crate::frontend::position::Span;
use crate::frontend::precedence::{Precedence, token_precedence};
use crate::frontend::token_type::TokenType;
use crate::runtime::eval::Evaluator;
use crate::runtime::gc::{ExprRef, ScopeRef};

/// Pratt parser producing GC-owned expression trees.
///
/// The evaluator is threaded through because `$expr` evaluates at parse
/// time, and partially built trees are rooted in `env` so a collection
/// triggered by such a splice cannot reclaim them.
pub struct Parser<'p, 's, 'e> {
    lexer: &'p mut Lexer<'s>,
    ev: &'p mut Evaluator<'e>,
    env: ScopeRef,
}

impl<'p, 's, 'e> Parser<'p, 's, 'e> {
    pub fn new(lexer: &'p mut Lexer<'s>, ev: &'p mut Evaluator<'e>, env: ScopeRef) -> Self {
        Self { lexer, ev, env }
    }

    /// Parses one top-level expression and runs the sharing pass over it.
    /// `None` means empty line, end of input, or a reported error.
    pub fn parse_toplevel(&mut self) -> Option<ExprRef> {
        let expr = self.parse(true)?;
        if self.lexer.token_type() == TokenType::Error {
            return None;
        }
        Some(self.ev.heap.share(expr))
    }

    /// `expr := primary (op primary)*`. At top level an end-of-line before
    /// anything was consumed yields `None` (empty input line).
    pub fn parse(&mut self, top_level: bool) -> Option<ExprRef> {
        if top_level && self.lexer.token_type() == TokenType::Eol {
            return None;
        }
        match self.lexer.token_type() {
            TokenType::Error | TokenType::Eof => return None,
            _ => {}
        }

        let primary = self.parse_primary(true)?;
        match self.lexer.token_type() {
            TokenType::Error => None,
            TokenType::Eol | TokenType::Eof => Some(primary),
            _ => self.parse_rhs(primary, Precedence::Assign),
        }
    }

    /// Precedence climbing. `=` recurses at equal precedence so a chain of
    /// assignments associates left; everything else is standard.
    fn parse_rhs(&mut self, mut lhs: ExprRef, min_prec: Precedence) -> Option<ExprRef> {
        loop {
            let token_type = self.lexer.token_type();
            let prec = token_precedence(token_type);
            if prec == Precedence::Lowest || prec < min_prec {
                return Some(lhs);
            }
            let op = match binop_for(token_type) {
                Some(op) => op,
                None => return Some(lhs),
            };

            let rooted = lhs;
            self.ev.heap.push_root(self.env, rooted);
            self.lexer.next_token();

            let Some(mut rhs) = self.parse_primary(true) else {
                self.ev.heap.pop_root(self.env, rooted);
                return None;
            };
            // An RHS that mirrors the LHS exactly shares the same object.
            if self.ev.heap.structural_equals(rhs, lhs, true) {
                lhs = rhs;
            }

            loop {
                let next_type = self.lexer.token_type();
                let next_prec = token_precedence(next_type);
                if next_prec == Precedence::Lowest {
                    break;
                }
                let climbs = next_prec > prec
                    || (binop_for(next_type) == Some(BinOp::Assign) && next_prec == prec);
                if !climbs {
                    break;
                }
                rhs = match self.parse_rhs(rhs, next_prec) {
                    Some(r) => r,
                    None => {
                        self.ev.heap.pop_root(self.env, rooted);
                        return None;
                    }
                };
            }

            let span = Span::merge(
                self.ev.heap.expr(lhs).span,
                self.ev.heap.expr(rhs).span,
            );
            let node = self.ev.heap.alloc(ExprKind::Binary { op, lhs, rhs }, span);
            self.ev.heap.pop_root(self.env, rooted);
            lhs = node;
        }
    }

    fn parse_primary(&mut self, top_level: bool) -> Option<ExprRef> {
        // Line breaks at primary position continue the expression; the
        // continuation prompt is shown for each line pulled here.
        while self.lexer.token_type() == TokenType::Eol {
            self.lexer.next_token();
        }
        if self.lexer.token_type() == TokenType::Error {
            return None;
        }

        let token = self.lexer.token.clone();
        let mut result = match token.token_type {
            TokenType::Ident => {
                self.lexer.next_token();
                let span = token.span();
                self.ev.heap.alloc(ExprKind::Identifier(token.literal), span)
            }
            TokenType::Int => {
                self.lexer.next_token();
                let value = parse_integer(&token.literal);
                self.ev.heap.alloc(ExprKind::Integer(value), token.span())
            }
            TokenType::Float => {
                self.lexer.next_token();
                let value = token.literal.parse().unwrap_or(0.0);
                self.ev.heap.alloc(ExprKind::Number(value), token.span())
            }
            TokenType::Plus | TokenType::Minus => {
                let op = if token.token_type == TokenType::Plus {
                    UnOp::Plus
                } else {
                    UnOp::Minus
                };
                self.lexer.next_token();
                let operand = self.parse_primary(false)?;
                let span = Span::merge(token.span(), self.ev.heap.expr(operand).span);
                self.ev.heap.alloc(ExprKind::Unary { op, operand }, span)
            }
            TokenType::LParen => {
                self.lexer.skip_newline = true;
                self.lexer.next_token();
                let inner = self.parse(false);
                let inner = match inner {
                    Some(inner) if self.lexer.token_type() == TokenType::RParen => inner,
                    _ => {
                        self.lexer
                            .report("Expected matching closing bracket )", self.lexer.token.span());
                        return None;
                    }
                };
                self.lexer.skip_newline = false;
                self.lexer.next_token();
                inner
            }
            TokenType::Backslash => {
                self.lexer.next_token();
                if self.lexer.token_type() != TokenType::Ident {
                    self.lexer
                        .report("Expected identifier", self.lexer.token.span());
                    return None;
                }
                let param = self.lexer.token.literal.clone();
                self.lexer.next_token();
                if self.lexer.token_type() != TokenType::Assign {
                    self.lexer
                        .report("Expected assign operator '='!", self.lexer.token.span());
                    return None;
                }
                self.lexer.next_token();
                let body = self.parse(false)?;
                let span = Span::merge(token.span(), self.ev.heap.expr(body).span);
                self.ev.heap.alloc(ExprKind::Lambda { param, body }, span)
            }
            TokenType::Dot => {
                self.lexer.next_token();
                if self.lexer.token_type() != TokenType::Ident {
                    self.lexer
                        .report("Expected identifier!", self.lexer.token.span());
                    return None;
                }
                let name = self.lexer.token.literal.clone();
                let span = Span::merge(token.span(), self.lexer.token.span());
                self.lexer.next_token();
                self.ev.heap.alloc(ExprKind::Atom(name), span)
            }
            TokenType::If => self.parse_if(token.span())?,
            TokenType::Dollar => {
                self.lexer.next_token();
                let spliced = self.parse(false)?;
                match self.ev.eval(self.env, spliced) {
                    Ok(value) => value,
                    Err(diagnostic) => {
                        self.lexer.report_diagnostic(diagnostic);
                        return None;
                    }
                }
            }
            TokenType::Underscore => {
                self.lexer.next_token();
                self.ev.heap.alloc(ExprKind::Any, token.span())
            }
            TokenType::Let => self.parse_let(token.span())?,
            _ => {
                self.lexer
                    .report("Not a primary expression token!", token.span());
                return None;
            }
        };

        if self.lexer.token_type() == TokenType::Error {
            return None;
        }

        // Juxtaposition binds tightest and associates left; recursion below
        // is non-top so the left spine is built here.
        while top_level && is_primary_token(self.lexer.token_type()) {
            self.ev.heap.push_root(self.env, result);
            let argument = self.parse_primary(false);
            self.ev.heap.pop_root(self.env, result);
            let argument = argument?;
            let span = Span::merge(
                self.ev.heap.expr(result).span,
                self.ev.heap.expr(argument).span,
            );
            result = self.ev.heap.alloc(
                ExprKind::Binary {
                    op: BinOp::Apply,
                    lhs: result,
                    rhs: argument,
                },
                span,
            );
        }

        Some(result)
    }

    /// `if c then t else f` with newline skipping active through `else`.
    fn parse_if(&mut self, start: Span) -> Option<ExprRef> {
        self.lexer.skip_newline = true;
        self.lexer.next_token();

        let condition = match self.parse(false) {
            Some(c) => c,
            None => {
                self.lexer.skip_newline = false;
                return None;
            }
        };
        if self.lexer.token_type() != TokenType::Then {
            self.lexer
                .report("Expected keyword 'then'.", self.lexer.token.span());
            return None;
        }
        self.lexer.next_token();

        self.ev.heap.push_root(self.env, condition);
        let then_branch = self.parse(false);
        self.ev.heap.pop_root(self.env, condition);
        let Some(then_branch) = then_branch else {
            self.lexer.skip_newline = false;
            return None;
        };
        if self.lexer.token_type() != TokenType::Else {
            self.lexer
                .report("Expected keyword 'else'.", self.lexer.token.span());
            return None;
        }
        self.lexer.skip_newline = false;
        self.lexer.next_token();

        self.ev.heap.push_root(self.env, condition);
        self.ev.heap.push_root(self.env, then_branch);
        let else_branch = self.parse(false);
        self.ev.heap.pop_root(self.env, then_branch);
        self.ev.heap.pop_root(self.env, condition);
        let else_branch = else_branch?;

        let span = Span::merge(start, self.ev.heap.expr(else_branch).span);
        Some(self.ev.heap.alloc(
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    /// `let binding (';' | newline binding)* in body`; a trailing separator
    /// before `in` is accepted. Every binding must be an `=` expression.
    fn parse_let(&mut self, start: Span) -> Option<ExprRef> {
        self.lexer.next_token();
        let mut bindings: Vec<ExprRef> = Vec::new();

        loop {
            while self.lexer.token_type() == TokenType::Eol {
                self.lexer.next_token();
            }
            if matches!(self.lexer.token_type(), TokenType::In | TokenType::Eof) {
                break;
            }
            if !bindings.is_empty() && self.lexer.token_type() == TokenType::Semicolon {
                self.lexer.next_token();
                continue;
            }

            let binding = match self.parse(false) {
                Some(b) => b,
                None => {
                    self.unroot_all(&bindings);
                    return None;
                }
            };
            if !self.ev.heap.expr(binding).is_assignment() {
                let span = self.ev.heap.expr(binding).span;
                self.lexer.report("Assignment expected!", span);
                self.unroot_all(&bindings);
                return None;
            }
            if !matches!(
                self.lexer.token_type(),
                TokenType::In | TokenType::Semicolon | TokenType::Eol
            ) {
                self.lexer
                    .report("Expected ';', 'in' or EOL.", self.lexer.token.span());
                self.unroot_all(&bindings);
                return None;
            }
            self.ev.heap.push_root(self.env, binding);
            bindings.push(binding);
        }

        if bindings.is_empty() {
            self.lexer.report("Assignment expected!", start);
            return None;
        }
        if self.lexer.token_type() != TokenType::In {
            self.lexer
                .report("Keyword 'in' expected! Not EOF.", self.lexer.token.span());
            self.unroot_all(&bindings);
            return None;
        }
        self.lexer.next_token();

        let body = match self.parse(false) {
            Some(b) => b,
            None => {
                self.unroot_all(&bindings);
                return None;
            }
        };
        self.unroot_all(&bindings);

        let span = Span::merge(start, self.ev.heap.expr(body).span);
        Some(self.ev.heap.alloc(ExprKind::Let { bindings, body }, span))
    }

    fn unroot_all(&mut self, exprs: &[ExprRef]) {
        for &expr in exprs {
            self.ev.heap.pop_root(self.env, expr);
        }
    }
}

fn is_primary_token(token_type: TokenType) -> bool {
    matches!(
        token_type,
        TokenType::Ident
            | TokenType::Int
            | TokenType::Float
            | TokenType::LParen
            | TokenType::Backslash
            | TokenType::Dot
            | TokenType::If
            | TokenType::Dollar
            | TokenType::Underscore
            | TokenType::Let
    )
}

fn binop_for(token_type: TokenType) -> Option<BinOp> {
    match token_type {
        TokenType::Plus => Some(BinOp::Add),
        TokenType::Minus => Some(BinOp::Sub),
        TokenType::Asterisk => Some(BinOp::Mul),
        TokenType::Slash => Some(BinOp::Div),
        TokenType::Caret => Some(BinOp::Pow),
        TokenType::Eq => Some(BinOp::Eq),
        TokenType::Lte => Some(BinOp::Le),
        TokenType::Gte => Some(BinOp::Ge),
        TokenType::Lt => Some(BinOp::Lt),
        TokenType::Gt => Some(BinOp::Gt),
        TokenType::And => Some(BinOp::And),
        TokenType::Or => Some(BinOp::Or),
        TokenType::Assign => Some(BinOp::Assign),
        _ => None,
    }
}

/// Integer literals wrap like the arithmetic does.
fn parse_integer(literal: &str) -> i64 {
    let mut value: i64 = 0;
    for c in literal.bytes() {
        value = value
            .wrapping_mul(10)
            .wrapping_add((c - b'0') as i64);
    }
    value
}
