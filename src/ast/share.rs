use crate::ast::{BinOp, ExprKind};
use crate::runtime::gc::{ExprRef, GcHeap};

impl GcHeap {
    /// Structural-sharing pass: rewrites the tree so exact-equal subtrees are
    /// one object. Runs after parsing a top-level expression and after
    /// function desugaring.
    ///
    /// Assignment RHSs are canonicalized against a pool of their own so a
    /// stored binding never shares structure with anything outside itself.
    /// An `if` over an atom condition folds to the taken branch, and a `let`
    /// whose every binding is LHS-equals-RHS degenerates to its body.
    pub fn share(&mut self, expr: ExprRef) -> ExprRef {
        let mut pool = Vec::new();
        self.share_in(expr, &mut pool)
    }

    fn share_in(&mut self, expr: ExprRef, pool: &mut Vec<ExprRef>) -> ExprRef {
        let span = self.expr(expr).span;
        let candidate = match self.expr(expr).kind.clone() {
            ExprKind::Binary {
                op: BinOp::Assign,
                lhs,
                rhs,
            } => {
                let mut own_pool = Vec::new();
                let new_rhs = self.share_in(rhs, &mut own_pool);
                // The assignment node itself is never pooled.
                return if new_rhs == rhs {
                    expr
                } else {
                    self.alloc(
                        ExprKind::Binary {
                            op: BinOp::Assign,
                            lhs,
                            rhs: new_rhs,
                        },
                        span,
                    )
                };
            }
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if let ExprKind::Atom(name) = &self.expr(condition).kind {
                    let taken = if name != "false" {
                        then_branch
                    } else {
                        else_branch
                    };
                    return self.share_in(taken, pool);
                }
                let new_condition = self.share_in(condition, pool);
                let new_then = self.share_in(then_branch, pool);
                let new_else = self.share_in(else_branch, pool);
                if new_condition == condition && new_then == then_branch && new_else == else_branch
                {
                    expr
                } else {
                    self.alloc(
                        ExprKind::If {
                            condition: new_condition,
                            then_branch: new_then,
                            else_branch: new_else,
                        },
                        span,
                    )
                }
            }
            ExprKind::Let { bindings, body } => {
                // A let binding every name to itself is the body. Restricted
                // to identifier bindings: a function-definition equation can
                // legitimately read `f x = f x`.
                let degenerate = bindings.iter().all(|&binding| {
                    match &self.expr(binding).kind {
                        ExprKind::Binary {
                            op: BinOp::Assign,
                            lhs,
                            rhs,
                        } => {
                            matches!(self.expr(*lhs).kind, ExprKind::Identifier(_))
                                && self.structural_equals(*lhs, *rhs, true)
                        }
                        _ => false,
                    }
                });
                if degenerate {
                    return self.share_in(body, pool);
                }
                let mut changed = false;
                let new_bindings: Vec<_> = bindings
                    .iter()
                    .map(|&b| {
                        let shared = self.share_in(b, pool);
                        if shared != b {
                            changed = true;
                        }
                        shared
                    })
                    .collect();
                let new_body = self.share_in(body, pool);
                if !changed && new_body == body {
                    expr
                } else {
                    self.alloc(
                        ExprKind::Let {
                            bindings: new_bindings,
                            body: new_body,
                        },
                        span,
                    )
                }
            }
            ExprKind::Lambda { param, body } => {
                let new_body = self.share_in(body, pool);
                if new_body == body {
                    expr
                } else {
                    self.alloc(
                        ExprKind::Lambda {
                            param,
                            body: new_body,
                        },
                        span,
                    )
                }
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let new_lhs = self.share_in(lhs, pool);
                let new_rhs = self.share_in(rhs, pool);
                if new_lhs == lhs && new_rhs == rhs {
                    expr
                } else {
                    self.alloc(
                        ExprKind::Binary {
                            op,
                            lhs: new_lhs,
                            rhs: new_rhs,
                        },
                        span,
                    )
                }
            }
            ExprKind::Unary { op, operand } => {
                let new_operand = self.share_in(operand, pool);
                if new_operand == operand {
                    expr
                } else {
                    self.alloc(
                        ExprKind::Unary {
                            op,
                            operand: new_operand,
                        },
                        span,
                    )
                }
            }
            ExprKind::Number(_)
            | ExprKind::Integer(_)
            | ExprKind::Identifier(_)
            | ExprKind::Atom(_)
            | ExprKind::Any
            | ExprKind::Function { .. } => expr,
        };

        if let Some(&shared) = pool
            .iter()
            .find(|&&p| self.structural_equals(p, candidate, true))
        {
            return shared;
        }
        pool.push(candidate);
        candidate
    }
}
