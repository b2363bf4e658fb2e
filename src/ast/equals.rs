use crate::ast::ExprKind;
use crate::runtime::gc::{ExprRef, GcHeap};

impl GcHeap {
    /// Structural equality over expression trees.
    ///
    /// Non-strict mode (`exact == false`) lets `Any` match everything and
    /// treats `Integer n` and `Number x` as equal when `round(x) == n`.
    /// Exact mode requires matching kinds and uses depth as a pre-filter.
    pub fn structural_equals(&self, a: ExprRef, b: ExprRef, exact: bool) -> bool {
        if a == b {
            return true;
        }
        let ea = self.expr(a);
        let eb = self.expr(b);
        if !exact
            && (matches!(ea.kind, ExprKind::Any) || matches!(eb.kind, ExprKind::Any))
        {
            return true;
        }
        if exact && ea.depth != eb.depth {
            return false;
        }

        match (&ea.kind, &eb.kind) {
            (ExprKind::Number(x), ExprKind::Number(y)) => x == y,
            (ExprKind::Integer(m), ExprKind::Integer(n)) => m == n,
            (ExprKind::Number(x), ExprKind::Integer(n))
            | (ExprKind::Integer(n), ExprKind::Number(x)) => !exact && x.round() == *n as f64,
            (ExprKind::Identifier(x), ExprKind::Identifier(y)) => x == y,
            (ExprKind::Atom(x), ExprKind::Atom(y)) => x == y,
            (ExprKind::Any, ExprKind::Any) => true,
            (
                ExprKind::Lambda { param: pa, body: ba },
                ExprKind::Lambda { param: pb, body: bb },
            ) => pa == pb && self.structural_equals(*ba, *bb, exact),
            (
                ExprKind::Binary {
                    op: oa,
                    lhs: la,
                    rhs: ra,
                },
                ExprKind::Binary {
                    op: ob,
                    lhs: lb,
                    rhs: rb,
                },
            ) => {
                oa == ob
                    && self.structural_equals(*ra, *rb, exact)
                    && self.structural_equals(*la, *lb, exact)
            }
            (
                ExprKind::Unary { op: oa, operand: a },
                ExprKind::Unary { op: ob, operand: b },
            ) => oa == ob && self.structural_equals(*a, *b, exact),
            (
                ExprKind::If {
                    condition: ca,
                    then_branch: ta,
                    else_branch: fa,
                },
                ExprKind::If {
                    condition: cb,
                    then_branch: tb,
                    else_branch: fb,
                },
            ) => {
                self.structural_equals(*ca, *cb, exact)
                    && self.structural_equals(*ta, *tb, exact)
                    && self.structural_equals(*fa, *fb, exact)
            }
            (
                ExprKind::Let {
                    bindings: ba,
                    body: xa,
                },
                ExprKind::Let {
                    bindings: bb,
                    body: xb,
                },
            ) => {
                ba.len() == bb.len()
                    && ba
                        .iter()
                        .zip(bb)
                        .all(|(x, y)| self.structural_equals(*x, *y, exact))
                    && self.structural_equals(*xa, *xb, exact)
            }
            (
                ExprKind::Function {
                    name: na,
                    cases: ca,
                },
                ExprKind::Function {
                    name: nb,
                    cases: cb,
                },
            ) => {
                na == nb
                    && ca.len() == cb.len()
                    && ca.iter().zip(cb).all(|(x, y)| {
                        x.patterns.len() == y.patterns.len()
                            && x.patterns
                                .iter()
                                .zip(&y.patterns)
                                .all(|(p, q)| self.structural_equals(*p, *q, exact))
                            && self.structural_equals(x.body, y.body, exact)
                    })
            }
            _ => false,
        }
    }
}
