use crate::ast::{BinOp, ExprKind, FnCase};
use crate::frontend::diagnostics::Diagnostic;
use crate::runtime::gc::{ExprRef, ScopeRef};

use super::{EvalResult, Evaluator};

impl Evaluator<'_> {
    /// Assignment dispatch on the LHS shape: plain identifier, atom
    /// constructor destructure, or function-definition pattern. The RHS of
    /// an identifier binding is stored unevaluated.
    pub(super) fn eval_assign(
        &mut self,
        env: ScopeRef,
        expr: ExprRef,
        lhs: ExprRef,
        rhs: ExprRef,
    ) -> EvalResult {
        let lhs_span = self.heap.expr(lhs).span;

        let ident = match &self.heap.expr(lhs).kind {
            ExprKind::Identifier(name) => Some(name.clone()),
            _ => None,
        };
        if let Some(name) = ident {
            if self.heap.current_get(env, &name).is_some() {
                return Err(Diagnostic::new(
                    format!("Variable {} already exists.", name),
                    lhs_span,
                ));
            }
            self.heap.scope_mut(env).variables.insert(name, rhs);
            return Ok(expr);
        }

        // A wildcard in a destructure position binds nothing.
        if matches!(self.heap.expr(lhs).kind, ExprKind::Any) {
            return Ok(expr);
        }

        if self.heap.is_atom_constructor(lhs) {
            return self.assign_destructure(env, expr, lhs, rhs);
        }
        if self.heap.is_function_constructor(lhs) {
            return self.assign_function(env, expr, lhs, rhs);
        }

        Err(Diagnostic::new(
            "Invalid assignment. Only atom constructors, functions and identifier allowed.",
            lhs_span,
        ))
    }

    /// Destructure: the fully evaluated RHS must be an application tree.
    /// Both spines are walked in lockstep, assigning argument to argument;
    /// the leftmost leaves must be atoms with the same name.
    fn assign_destructure(
        &mut self,
        env: ScopeRef,
        expr: ExprRef,
        lhs: ExprRef,
        rhs: ExprRef,
    ) -> EvalResult {
        let value = self.eval(env, rhs)?;
        if !matches!(
            self.heap.expr(value).kind,
            ExprKind::Binary {
                op: BinOp::Apply,
                ..
            }
        ) {
            return Err(Diagnostic::new(
                "RHS must be a substitution expression!",
                self.heap.expr(value).span,
            ));
        }

        let (mut left, mut right) = (lhs, value);
        loop {
            let pair = match (&self.heap.expr(left).kind, &self.heap.expr(right).kind) {
                (
                    ExprKind::Binary {
                        op: BinOp::Apply,
                        lhs: lhead,
                        rhs: larg,
                    },
                    ExprKind::Binary {
                        op: BinOp::Apply,
                        lhs: rhead,
                        rhs: rarg,
                    },
                ) => Some((*lhead, *larg, *rhead, *rarg)),
                _ => None,
            };
            match pair {
                Some((lhead, larg, rhead, rarg)) => {
                    self.eval_assign(env, expr, larg, rarg)?;
                    left = lhead;
                    right = rhead;
                }
                None => break,
            }
        }

        let left_name = match &self.heap.expr(left).kind {
            ExprKind::Atom(name) => name.clone(),
            _ => {
                return Err(Diagnostic::new(
                    "Most left expression of LHS must be an atom.",
                    self.heap.expr(left).span,
                ));
            }
        };
        let right_name = match &self.heap.expr(right).kind {
            ExprKind::Atom(name) => name.clone(),
            _ => {
                return Err(Diagnostic::new(
                    "Most left expression of RHS must be an atom.",
                    self.heap.expr(right).span,
                ));
            }
        };
        if left_name != right_name {
            return Err(Diagnostic::new(
                format!(
                    "Assignment of atom constructors requires same name. {} != {}.",
                    left_name, right_name
                ),
                self.heap.expr(right).span,
            ));
        }
        Ok(expr)
    }

    /// A function-definition equation. The first equation creates the
    /// function object; later ones append a case of matching arity. Each
    /// accepted body is rewritten so recursive calls point at the function
    /// object itself rather than going through the environment.
    fn assign_function(
        &mut self,
        env: ScopeRef,
        expr: ExprRef,
        lhs: ExprRef,
        rhs: ExprRef,
    ) -> EvalResult {
        let mut patterns = Vec::new();
        let mut head = lhs;
        loop {
            let step = match &self.heap.expr(head).kind {
                ExprKind::Binary {
                    op: BinOp::Apply,
                    lhs: inner,
                    rhs: argument,
                } => Some((*inner, *argument)),
                _ => None,
            };
            match step {
                Some((inner, argument)) => {
                    patterns.push(argument);
                    head = inner;
                }
                None => break,
            }
        }
        patterns.reverse();

        let head_span = self.heap.expr(head).span;
        let name = match &self.heap.expr(head).kind {
            ExprKind::Identifier(name) => name.clone(),
            _ => {
                return Err(Diagnostic::new(
                    "Invalid assignment. Only atom constructors, functions and identifier allowed.",
                    head_span,
                ));
            }
        };

        match self.heap.current_get(env, &name) {
            None => {
                let function = self.heap.alloc(
                    ExprKind::Function {
                        name: name.clone(),
                        cases: vec![FnCase {
                            patterns,
                            body: rhs,
                        }],
                    },
                    head_span,
                );
                let rewritten = self.heap.substitute(rhs, &name, function);
                if let ExprKind::Function { cases, .. } = &mut self.heap.expr_mut(function).kind {
                    cases[0].body = rewritten;
                }
                self.heap.scope_mut(env).variables.insert(name, function);
                Ok(expr)
            }
            Some(existing) => {
                let arity = match &self.heap.expr(existing).kind {
                    ExprKind::Function { cases, .. } => {
                        cases.first().map_or(0, |c| c.patterns.len())
                    }
                    _ => {
                        return Err(Diagnostic::new(
                            format!("Identifier \"{}\" already assigned to a non-function!", name),
                            head_span,
                        ));
                    }
                };
                if arity != patterns.len() {
                    return Err(Diagnostic::new(
                        format!("Function argument length of \"{}\" don't match.", name),
                        head_span,
                    ));
                }
                let rewritten = self.heap.substitute(rhs, &name, existing);
                if let ExprKind::Function { cases, .. } = &mut self.heap.expr_mut(existing).kind {
                    cases.push(FnCase {
                        patterns,
                        body: rewritten,
                    });
                }
                // add_case invalidates the cached lambda form.
                self.heap.expr_mut(existing).last_eval = None;
                Ok(expr)
            }
        }
    }
}
