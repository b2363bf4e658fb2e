use crate::ast::{BinOp, ExprKind};
use crate::frontend::diagnostics::Diagnostic;
use crate::frontend::position::Span;
use crate::runtime::gc::{ExprRef, ScopeRef};

use super::{EvalResult, Evaluator};

fn invalid_operator(span: Span) -> Diagnostic {
    Diagnostic::new("Invalid use of binary operator.", span)
}

impl Evaluator<'_> {
    pub(super) fn alloc_bool(&mut self, value: bool, span: Span) -> ExprRef {
        let name = if value { "true" } else { "false" };
        self.heap.alloc(ExprKind::Atom(name.into()), span)
    }

    /// `&&` and `||` short-circuit on the left operand; both operands must
    /// reduce to atoms, and every atom except `.false` is truthy.
    pub(super) fn eval_logical(
        &mut self,
        env: ScopeRef,
        span: Span,
        op: BinOp,
        lhs: ExprRef,
        rhs: ExprRef,
    ) -> EvalResult {
        let left = self.eval(env, lhs)?;
        let left_name = match &self.heap.expr(left).kind {
            ExprKind::Atom(name) => name.clone(),
            _ => return Err(invalid_operator(span)),
        };
        if op == BinOp::And && left_name == "false" {
            return Ok(self.alloc_bool(false, span));
        }
        if op == BinOp::Or && left_name != "false" {
            return Ok(self.alloc_bool(true, span));
        }

        let right = self.eval(env, rhs)?;
        match &self.heap.expr(right).kind {
            ExprKind::Atom(name) => {
                let value = name != "false";
                Ok(self.alloc_bool(value, span))
            }
            _ => Err(invalid_operator(span)),
        }
    }

    /// Comparison and arithmetic: both operands are fully evaluated; `==` is
    /// structural. Arithmetic applies only between two Numbers or two
    /// Integers, with no coercion; otherwise the node is left as it stands.
    pub(super) fn eval_binary(
        &mut self,
        env: ScopeRef,
        expr: ExprRef,
        span: Span,
        op: BinOp,
        lhs: ExprRef,
        rhs: ExprRef,
    ) -> EvalResult {
        let left = self.eval(env, lhs)?;
        let right = self.eval(env, rhs)?;

        if op == BinOp::Eq {
            let equal = self.heap.structural_equals(left, right, false);
            return Ok(self.alloc_bool(equal, span));
        }

        match (&self.heap.expr(left).kind, &self.heap.expr(right).kind) {
            (ExprKind::Number(a), ExprKind::Number(b)) => {
                let (a, b) = (*a, *b);
                self.number_op(span, op, a, b)
            }
            (ExprKind::Integer(a), ExprKind::Integer(b)) => {
                let (a, b) = (*a, *b);
                self.integer_op(span, op, a, b)
            }
            _ => {
                if left == lhs && right == rhs {
                    Ok(expr)
                } else {
                    Ok(self.heap.alloc(
                        ExprKind::Binary {
                            op,
                            lhs: left,
                            rhs: right,
                        },
                        span,
                    ))
                }
            }
        }
    }

    fn number_op(&mut self, span: Span, op: BinOp, a: f64, b: f64) -> EvalResult {
        let value = match op {
            BinOp::Add => a + b,
            BinOp::Sub => a - b,
            BinOp::Mul => a * b,
            BinOp::Div => a / b,
            BinOp::Pow => a.powf(b),
            BinOp::Le => return Ok(self.alloc_bool(a <= b, span)),
            BinOp::Ge => return Ok(self.alloc_bool(a >= b, span)),
            BinOp::Lt => return Ok(self.alloc_bool(a < b, span)),
            BinOp::Gt => return Ok(self.alloc_bool(a > b, span)),
            _ => return Err(invalid_operator(span)),
        };
        Ok(self.heap.alloc(ExprKind::Number(value), span))
    }

    fn integer_op(&mut self, span: Span, op: BinOp, a: i64, b: i64) -> EvalResult {
        let value = match op {
            BinOp::Add => a.wrapping_add(b),
            BinOp::Sub => a.wrapping_sub(b),
            BinOp::Mul => a.wrapping_mul(b),
            BinOp::Div => {
                if b == 0 {
                    return Err(Diagnostic::new("Division by zero.", span));
                }
                a.wrapping_div(b)
            }
            BinOp::Pow => integer_pow(a, b),
            BinOp::Le => return Ok(self.alloc_bool(a <= b, span)),
            BinOp::Ge => return Ok(self.alloc_bool(a >= b, span)),
            BinOp::Lt => return Ok(self.alloc_bool(a < b, span)),
            BinOp::Gt => return Ok(self.alloc_bool(a > b, span)),
            _ => return Err(invalid_operator(span)),
        };
        Ok(self.heap.alloc(ExprKind::Integer(value), span))
    }

    /// Juxtaposition: built-ins fire on an identifier head; otherwise the
    /// head is fully evaluated and a lambda β-reduces by substituting the
    /// unevaluated argument (call-by-name). A non-lambda head leaves a
    /// constructor-style application.
    pub(super) fn eval_apply(
        &mut self,
        env: ScopeRef,
        expr: ExprRef,
        span: Span,
        lhs: ExprRef,
        rhs: ExprRef,
    ) -> EvalResult {
        if let ExprKind::Identifier(name) = &self.heap.expr(lhs).kind {
            let name = name.clone();
            if let Some(result) = self.eval_builtin(env, span, &name, rhs)? {
                return Ok(result);
            }
        }

        let head = self.eval(env, lhs)?;
        if let ExprKind::Lambda { param, body } = &self.heap.expr(head).kind {
            let (param, body) = (param.clone(), *body);
            return Ok(self.heap.substitute(body, &param, rhs));
        }

        let argument = self.eval(env, rhs)?;
        if argument == rhs {
            Ok(expr)
        } else {
            Ok(self.heap.alloc(
                ExprKind::Binary {
                    op: BinOp::Apply,
                    lhs: head,
                    rhs: argument,
                },
                span,
            ))
        }
    }
}

/// Integer `^` truncates toward zero for negative exponents, matching a
/// float `pow` cast back to an integer.
fn integer_pow(base: i64, exp: i64) -> i64 {
    if exp < 0 {
        return match base {
            1 => 1,
            -1 => {
                if exp % 2 == 0 {
                    1
                } else {
                    -1
                }
            }
            _ => 0,
        };
    }
    base.wrapping_pow(exp.min(u32::MAX as i64) as u32)
}
