use crate::ast::{BinOp, ExprKind};
use crate::frontend::position::Span;
use crate::runtime::gc::{ExprRef, GcHeap};

impl GcHeap {
    /// Compiles a multi-case function into its lambda form.
    ///
    /// Cases are walked in reverse so the chain of `if` guards tries them in
    /// source order (first match wins). For each pattern `p_i` and fresh
    /// argument `_x{i}`:
    /// - identifier and atom-constructor patterns bind via
    ///   `let p_i = _x{i} in body`;
    /// - patterns other than bare identifiers and `_` contribute a guard
    ///   `masked(p_i) == _x{i}`, conjoined with `&&`;
    /// - the fallback after the last guarded case applies `error` to the
    ///   quoted identifier `"No Match"`.
    ///
    /// The `_x{i}` names contain a digit, so user code cannot capture them.
    pub fn compile_function(&mut self, expr: ExprRef) -> ExprRef {
        let span = self.expr(expr).span;
        let cases = match &self.expr(expr).kind {
            ExprKind::Function { cases, .. } => cases.clone(),
            _ => return expr,
        };

        let error_id = self.alloc(ExprKind::Identifier("error".into()), span);
        let message_id = self.alloc(ExprKind::Identifier("\"No Match\"".into()), span);
        let no_match = self.alloc(
            ExprKind::Binary {
                op: BinOp::Apply,
                lhs: error_id,
                rhs: message_id,
            },
            span,
        );

        let mut chain: Option<ExprRef> = None;
        for case in cases.iter().rev() {
            let mut body = case.body;
            let mut guard: Option<ExprRef> = None;

            for (i, &pattern) in case.patterns.iter().enumerate() {
                let pattern_span = self.expr(pattern).span;
                let argument = self.alloc(ExprKind::Identifier(format!("_x{}", i)), pattern_span);

                let is_identifier =
                    matches!(self.expr(pattern).kind, ExprKind::Identifier(_));
                let is_any = matches!(self.expr(pattern).kind, ExprKind::Any);

                if is_identifier || self.is_atom_constructor(pattern) {
                    let binding = self.alloc(
                        ExprKind::Binary {
                            op: BinOp::Assign,
                            lhs: pattern,
                            rhs: argument,
                        },
                        pattern_span,
                    );
                    body = self.alloc(
                        ExprKind::Let {
                            bindings: vec![binding],
                            body,
                        },
                        pattern_span,
                    );
                }

                if is_any || is_identifier {
                    continue;
                }

                let masked = self.mask_identifiers(pattern);
                let check = self.alloc(
                    ExprKind::Binary {
                        op: BinOp::Eq,
                        lhs: masked,
                        rhs: argument,
                    },
                    pattern_span,
                );
                guard = Some(match guard {
                    None => check,
                    Some(prior) => self.alloc(
                        ExprKind::Binary {
                            op: BinOp::And,
                            lhs: prior,
                            rhs: check,
                        },
                        pattern_span,
                    ),
                });
            }

            chain = Some(match guard {
                None => body,
                Some(condition) => {
                    let case_span = case
                        .patterns
                        .iter()
                        .map(|&p| self.expr(p).span)
                        .fold(self.expr(case.body).span, Span::merge);
                    self.alloc(
                        ExprKind::If {
                            condition,
                            then_branch: body,
                            else_branch: chain.unwrap_or(no_match),
                        },
                        case_span,
                    )
                }
            });
        }

        // At least one case exists, so the chain is populated.
        let mut lambda = chain.unwrap_or(no_match);
        let arity = cases.first().map_or(0, |c| c.patterns.len());
        for i in (0..arity).rev() {
            lambda = self.alloc(
                ExprKind::Lambda {
                    param: format!("_x{}", i),
                    body: lambda,
                },
                span,
            );
        }
        self.share(lambda)
    }
}
