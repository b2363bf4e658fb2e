pub mod assign;
pub mod binary_ops;
pub mod builtins;

use std::io::Write;

use crate::ast::{BinOp, ExprKind, UnOp};
use crate::frontend::diagnostics::Diagnostic;
use crate::frontend::position::Span;
use crate::runtime::env::Environment;
use crate::runtime::gc::{COLLECT_THRESHOLD, ExprRef, GcHeap, ScopeRef};

pub type EvalResult = Result<ExprRef, Diagnostic>;

/// Nesting bound for the endless-term backstop. Self-applications allocate
/// fresh nodes every cycle, so the pointer check alone cannot catch them.
const MAX_EVAL_DEPTH: usize = 300;

/// Small-step reducer over the GC heap.
///
/// `print` and `time` write to `out`; diagnostics are returned to the caller.
pub struct Evaluator<'a> {
    pub heap: &'a mut GcHeap,
    pub out: &'a mut dyn Write,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(heap: &'a mut GcHeap, out: &'a mut dyn Write) -> Self {
        Self {
            heap,
            out,
            depth: 0,
        }
    }

    /// Reduces to a fixpoint: steps until the result handle stops changing.
    ///
    /// Reports `Endless term detected.` when a step produces a binary node
    /// that has the previous expression as a direct operand, or when
    /// evaluation nests past `MAX_EVAL_DEPTH`. The in-flight expression is
    /// rooted in the frame, and a collection runs whenever enough objects
    /// accumulated since the last one.
    pub fn eval(&mut self, env: ScopeRef, start: ExprRef) -> EvalResult {
        if self.depth >= MAX_EVAL_DEPTH {
            return Err(Diagnostic::new(
                "Endless term detected.",
                self.heap.expr(start).span,
            ));
        }
        self.depth += 1;
        let result = self.eval_loop(env, start);
        self.depth -= 1;
        result
    }

    fn eval_loop(&mut self, env: ScopeRef, start: ExprRef) -> EvalResult {
        let mut expr = start;
        self.heap.push_root(env, expr);
        loop {
            let next = match self.eval_step(env, expr) {
                Ok(next) => next,
                Err(diagnostic) => {
                    self.heap.pop_root(env, expr);
                    return Err(diagnostic);
                }
            };
            if next == expr {
                self.heap.pop_root(env, expr);
                return Ok(expr);
            }
            if let ExprKind::Binary { lhs, rhs, .. } = &self.heap.expr(next).kind {
                if *lhs == expr || *rhs == expr {
                    let span = self.heap.expr(next).span;
                    self.heap.pop_root(env, expr);
                    return Err(Diagnostic::new("Endless term detected.", span));
                }
            }
            self.heap.pop_root(env, expr);
            expr = next;
            self.heap.push_root(env, expr);

            if self.heap.new_objects_since_collect() >= COLLECT_THRESHOLD {
                self.heap.mark_scope(env);
                self.heap.collect();
            }
        }
    }

    /// One reduction step, consulting the `last_eval` cache. Assignments are
    /// never cached: re-evaluating one must re-run its effect.
    fn eval_step(&mut self, env: ScopeRef, expr: ExprRef) -> EvalResult {
        if let Some(cached) = self.heap.expr(expr).last_eval {
            return Ok(cached);
        }
        let next = self.step(env, expr)?;
        if !self.heap.expr(expr).is_assignment() {
            self.heap.expr_mut(expr).last_eval = Some(next);
        }
        Ok(next)
    }

    fn step(&mut self, env: ScopeRef, expr: ExprRef) -> EvalResult {
        let span = self.heap.expr(expr).span;
        match self.heap.expr(expr).kind.clone() {
            ExprKind::Number(_)
            | ExprKind::Integer(_)
            | ExprKind::Atom(_)
            | ExprKind::Any
            | ExprKind::Lambda { .. } => Ok(expr),
            ExprKind::Identifier(name) => self.heap.lookup(env, &name).ok_or_else(|| {
                Diagnostic::new(format!("Variable {} doesn't exist.", name), span)
            }),
            ExprKind::Function { .. } => Ok(self.heap.compile_function(expr)),
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let cond = self.eval(env, condition)?;
                match &self.heap.expr(cond).kind {
                    ExprKind::Atom(name) => {
                        let taken = if name != "false" {
                            then_branch
                        } else {
                            else_branch
                        };
                        self.eval(env, taken)
                    }
                    _ => Err(Diagnostic::new(
                        "Invalid if condition. Doesn't evaluate to atom.",
                        span,
                    )),
                }
            }
            ExprKind::Unary { op, operand } => self.eval_unary(env, span, op, operand),
            ExprKind::Binary { op, lhs, rhs } => match op {
                BinOp::Assign => self.eval_assign(env, expr, lhs, rhs),
                BinOp::Apply => self.eval_apply(env, expr, span, lhs, rhs),
                BinOp::And | BinOp::Or => self.eval_logical(env, span, op, lhs, rhs),
                _ => self.eval_binary(env, expr, span, op, lhs, rhs),
            },
            ExprKind::Let { bindings, body } => self.eval_let(env, bindings, body),
        }
    }

    fn eval_unary(&mut self, env: ScopeRef, span: Span, op: UnOp, operand: ExprRef) -> EvalResult {
        let value = self.eval(env, operand)?;
        match (op, &self.heap.expr(value).kind) {
            (UnOp::Plus, ExprKind::Number(_)) | (UnOp::Plus, ExprKind::Integer(_)) => Ok(value),
            (UnOp::Minus, ExprKind::Number(v)) => {
                let v = *v;
                Ok(self.heap.alloc(ExprKind::Number(-v), span))
            }
            (UnOp::Minus, ExprKind::Integer(v)) => {
                let v = *v;
                Ok(self.heap.alloc(ExprKind::Integer(v.wrapping_neg()), span))
            }
            _ => Err(Diagnostic::new("Invalid unary operator expression.", span)),
        }
    }

    /// Binds in a child frame, then inlines every new binding into the body
    /// (sidestepping equal-name capture between sibling scopes), drops the
    /// bindings that shadow the parent chain, and fully evaluates the
    /// rewritten body in the child frame.
    fn eval_let(&mut self, env: ScopeRef, bindings: Vec<ExprRef>, body: ExprRef) -> EvalResult {
        let scope = self.heap.alloc_scope(Environment::child_of(env));
        for &binding in &bindings {
            self.eval(scope, binding)?;
        }

        let locals: Vec<(String, ExprRef)> = self
            .heap
            .scope(scope)
            .variables
            .iter()
            .map(|(name, &value)| (name.clone(), value))
            .collect();

        let mut result = body;
        for (name, value) in &locals {
            result = self.heap.substitute(result, name, *value);
        }
        for (name, _) in &locals {
            if self.heap.lookup(env, name).is_some() {
                self.heap.scope_mut(scope).variables.remove(name);
            }
        }

        self.eval(scope, result)
    }
}
