use crate::ast::{BinOp, ExprKind};
use crate::runtime::gc::{ExprRef, GcHeap};

impl GcHeap {
    /// Replaces every free occurrence of `name` with `value`, honoring
    /// shadowing: a lambda whose parameter is `name` is left alone, and a
    /// `let` that rebinds `name` keeps its body untouched (the binding RHSs
    /// still refer to the outer scope and are substituted). Subtrees without
    /// an occurrence come back as the same handle.
    pub fn substitute(&mut self, expr: ExprRef, name: &str, value: ExprRef) -> ExprRef {
        let span = self.expr(expr).span;
        match self.expr(expr).kind.clone() {
            ExprKind::Identifier(id) => {
                if id == name {
                    value
                } else {
                    expr
                }
            }
            ExprKind::Number(_)
            | ExprKind::Integer(_)
            | ExprKind::Atom(_)
            | ExprKind::Any
            | ExprKind::Function { .. } => expr,
            ExprKind::Lambda { param, body } => {
                if param == name {
                    return expr;
                }
                let new_body = self.substitute(body, name, value);
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
                let new_lhs = self.substitute(lhs, name, value);
                let new_rhs = self.substitute(rhs, name, value);
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
                let new_operand = self.substitute(operand, name, value);
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
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let new_condition = self.substitute(condition, name, value);
                let new_then = self.substitute(then_branch, name, value);
                let new_else = self.substitute(else_branch, name, value);
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
                let shadows = bindings.iter().any(|&binding| {
                    if let ExprKind::Binary {
                        op: BinOp::Assign,
                        lhs,
                        ..
                    } = &self.expr(binding).kind
                    {
                        self.identifiers(*lhs).iter().any(|id| id == name)
                    } else {
                        false
                    }
                });

                let mut changed = false;
                let mut new_bindings = Vec::with_capacity(bindings.len());
                for &binding in &bindings {
                    let binding_span = self.expr(binding).span;
                    let parts = match &self.expr(binding).kind {
                        ExprKind::Binary {
                            op: BinOp::Assign,
                            lhs,
                            rhs,
                        } => Some((*lhs, *rhs)),
                        _ => None,
                    };
                    if let Some((lhs, rhs)) = parts {
                        let new_rhs = self.substitute(rhs, name, value);
                        if new_rhs == rhs {
                            new_bindings.push(binding);
                        } else {
                            changed = true;
                            new_bindings.push(self.alloc(
                                ExprKind::Binary {
                                    op: BinOp::Assign,
                                    lhs,
                                    rhs: new_rhs,
                                },
                                binding_span,
                            ));
                        }
                    } else {
                        new_bindings.push(binding);
                    }
                }

                let new_body = if shadows {
                    body
                } else {
                    self.substitute(body, name, value)
                };
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
        }
    }

    /// Replaces every identifier with a fresh `Any`. The pattern compiler
    /// uses this to turn a pattern into a purely structural equality test.
    pub fn mask_identifiers(&mut self, expr: ExprRef) -> ExprRef {
        let span = self.expr(expr).span;
        match self.expr(expr).kind.clone() {
            ExprKind::Identifier(_) => self.alloc(ExprKind::Any, span),
            ExprKind::Number(_)
            | ExprKind::Integer(_)
            | ExprKind::Atom(_)
            | ExprKind::Any
            | ExprKind::Function { .. } => expr,
            ExprKind::Lambda { param, body } => {
                let new_body = self.mask_identifiers(body);
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
                let new_lhs = self.mask_identifiers(lhs);
                let new_rhs = self.mask_identifiers(rhs);
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
                let new_operand = self.mask_identifiers(operand);
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
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let new_condition = self.mask_identifiers(condition);
                let new_then = self.mask_identifiers(then_branch);
                let new_else = self.mask_identifiers(else_branch);
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
                let mut changed = false;
                let new_bindings: Vec<_> = bindings
                    .iter()
                    .map(|&b| {
                        let masked = self.mask_identifiers(b);
                        if masked != b {
                            changed = true;
                        }
                        masked
                    })
                    .collect();
                let new_body = self.mask_identifiers(body);
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
        }
    }
}
