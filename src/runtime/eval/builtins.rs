use std::time::Instant;

use crate::ast::ExprKind;
use crate::frontend::diagnostics::Diagnostic;
use crate::frontend::position::Span;
use crate::runtime::gc::{ExprRef, ScopeRef};

use super::Evaluator;

impl Evaluator<'_> {
    /// The five built-ins, consumed only by application on an identifier
    /// head. `Ok(None)` falls through to ordinary application; that includes
    /// `to_int`/`round_int` of a non-numeric operand, which then surfaces as
    /// an unbound-identifier error the ordinary way.
    pub(super) fn eval_builtin(
        &mut self,
        env: ScopeRef,
        span: Span,
        name: &str,
        rhs: ExprRef,
    ) -> Result<Option<ExprRef>, Diagnostic> {
        match name {
            "error" => Err(Diagnostic::new(self.heap.display(rhs).to_string(), span)),
            "print" => {
                let text = self.heap.display(rhs).to_string();
                let _ = writeln!(self.out, "{}", text);
                Ok(Some(rhs))
            }
            "to_int" | "round_int" => {
                let value = self.eval(env, rhs)?;
                match self.heap.expr(value).kind.clone() {
                    ExprKind::Integer(_) => Ok(Some(value)),
                    ExprKind::Number(v) => {
                        let rounded = if name == "to_int" {
                            v.floor()
                        } else {
                            v.round()
                        } as i64;
                        Ok(Some(self.heap.alloc(ExprKind::Integer(rounded), span)))
                    }
                    _ => Ok(None),
                }
            }
            "time" => {
                let started = Instant::now();
                let value = self.eval(env, rhs)?;
                let elapsed = started.elapsed().as_secs_f64() * 1000.0;
                let _ = writeln!(self.out, "Needed {} ms.", elapsed);
                Ok(Some(value))
            }
            _ => Ok(None),
        }
    }
}
