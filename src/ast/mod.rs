pub mod desugar;
pub mod equals;
pub mod identifiers;
pub mod share;
pub mod substitute;

use std::fmt;

use crate::frontend::position::Span;
use crate::runtime::gc::{ExprRef, GcHeap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    Le,
    Ge,
    Lt,
    Gt,
    And,
    Or,
    Assign,
    /// Juxtaposition: application or data construction.
    Apply,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
            BinOp::Eq => "==",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Assign => "=",
            BinOp::Apply => "",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Plus,
    Minus,
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Plus => "+",
            UnOp::Minus => "-",
        }
    }
}

/// One equation of a multi-equation function: argument patterns and a body.
#[derive(Debug, Clone)]
pub struct FnCase {
    pub patterns: Vec<ExprRef>,
    pub body: ExprRef,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Number(f64),
    Integer(i64),
    Identifier(String),
    /// A symbolic value equal only to itself, written `.name`.
    Atom(String),
    /// The wildcard `_`.
    Any,
    Lambda {
        param: String,
        body: ExprRef,
    },
    Binary {
        op: BinOp,
        lhs: ExprRef,
        rhs: ExprRef,
    },
    Unary {
        op: UnOp,
        operand: ExprRef,
    },
    If {
        condition: ExprRef,
        then_branch: ExprRef,
        else_branch: ExprRef,
    },
    Let {
        bindings: Vec<ExprRef>,
        body: ExprRef,
    },
    /// Synthesized when several equations share one name; never parsed.
    Function {
        name: String,
        cases: Vec<FnCase>,
    },
}

impl ExprKind {
    pub fn for_each_child(&self, mut f: impl FnMut(ExprRef)) {
        match self {
            ExprKind::Number(_)
            | ExprKind::Integer(_)
            | ExprKind::Identifier(_)
            | ExprKind::Atom(_)
            | ExprKind::Any => {}
            ExprKind::Lambda { body, .. } => f(*body),
            ExprKind::Binary { lhs, rhs, .. } => {
                f(*lhs);
                f(*rhs);
            }
            ExprKind::Unary { operand, .. } => f(*operand),
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                f(*condition);
                f(*then_branch);
                f(*else_branch);
            }
            ExprKind::Let { bindings, body } => {
                for binding in bindings {
                    f(*binding);
                }
                f(*body);
            }
            ExprKind::Function { cases, .. } => {
                for case in cases {
                    for pattern in &case.patterns {
                        f(*pattern);
                    }
                    f(case.body);
                }
            }
        }
    }
}

/// A heap expression: the variant plus the shared node header.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    /// `1 + Σ depth(child)`, fixed at construction.
    pub depth: u32,
    /// Result of the last reduction step; cleared only by `add_case`.
    pub last_eval: Option<ExprRef>,
}

impl Expr {
    pub fn is_assignment(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Binary {
                op: BinOp::Assign,
                ..
            }
        )
    }
}

impl GcHeap {
    /// An atom-constructor pattern: juxtapositions whose leftmost leaf is an
    /// atom and whose argument leaves are identifiers, wildcards, or nested
    /// atom-constructor patterns.
    pub fn is_atom_constructor(&self, expr: ExprRef) -> bool {
        match &self.expr(expr).kind {
            ExprKind::Binary {
                op: BinOp::Apply,
                lhs,
                rhs,
            } => {
                let arg_ok = matches!(
                    self.expr(*rhs).kind,
                    ExprKind::Identifier(_) | ExprKind::Any
                ) || self.is_atom_constructor(*rhs);
                let head_ok = matches!(self.expr(*lhs).kind, ExprKind::Atom(_))
                    || self.is_atom_constructor(*lhs);
                arg_ok && head_ok
            }
            _ => false,
        }
    }

    /// A function-definition pattern: juxtapositions whose leftmost leaf is
    /// an identifier; the argument leaves are arbitrary patterns.
    pub fn is_function_constructor(&self, expr: ExprRef) -> bool {
        match &self.expr(expr).kind {
            ExprKind::Binary {
                op: BinOp::Apply,
                lhs,
                ..
            } => {
                matches!(self.expr(*lhs).kind, ExprKind::Identifier(_))
                    || self.is_function_constructor(*lhs)
            }
            _ => false,
        }
    }

    pub fn display(&self, expr: ExprRef) -> ExprDisplay<'_> {
        ExprDisplay { heap: self, expr }
    }
}

pub struct ExprDisplay<'a> {
    heap: &'a GcHeap,
    expr: ExprRef,
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(self.heap, self.expr, f, true)
    }
}

/// Composite forms are parenthesized except at the top level, so printed
/// expressions parse back to the same structure.
fn write_expr(heap: &GcHeap, expr: ExprRef, f: &mut fmt::Formatter<'_>, top: bool) -> fmt::Result {
    let open = |f: &mut fmt::Formatter<'_>| if top { Ok(()) } else { write!(f, "(") };
    let close = |f: &mut fmt::Formatter<'_>| if top { Ok(()) } else { write!(f, ")") };

    match &heap.expr(expr).kind {
        ExprKind::Number(value) => write!(f, "{}", value),
        ExprKind::Integer(value) => write!(f, "{}", value),
        ExprKind::Identifier(name) => write!(f, "{}", name),
        ExprKind::Atom(name) => write!(f, ".{}", name),
        ExprKind::Any => write!(f, "_"),
        ExprKind::Lambda { param, body } => {
            open(f)?;
            write!(f, "\\{} = ", param)?;
            write_expr(heap, *body, f, false)?;
            close(f)
        }
        ExprKind::Binary {
            op: BinOp::Apply,
            lhs,
            rhs,
        } => {
            open(f)?;
            write_expr(heap, *lhs, f, false)?;
            write!(f, " ")?;
            write_expr(heap, *rhs, f, false)?;
            close(f)
        }
        ExprKind::Binary { op, lhs, rhs } => {
            open(f)?;
            write_expr(heap, *lhs, f, false)?;
            write!(f, " {} ", op)?;
            write_expr(heap, *rhs, f, false)?;
            close(f)
        }
        ExprKind::Unary { op, operand } => {
            open(f)?;
            write!(f, "{}", op.symbol())?;
            write_expr(heap, *operand, f, false)?;
            close(f)
        }
        ExprKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            open(f)?;
            write!(f, "if ")?;
            write_expr(heap, *condition, f, false)?;
            write!(f, " then ")?;
            write_expr(heap, *then_branch, f, false)?;
            write!(f, " else ")?;
            write_expr(heap, *else_branch, f, false)?;
            close(f)
        }
        ExprKind::Let { bindings, body } => {
            open(f)?;
            write!(f, "let ")?;
            for (i, binding) in bindings.iter().enumerate() {
                if i > 0 {
                    write!(f, "; ")?;
                }
                write_expr(heap, *binding, f, false)?;
            }
            write!(f, " in ")?;
            write_expr(heap, *body, f, false)?;
            close(f)
        }
        ExprKind::Function { name, cases } => {
            open(f)?;
            for (i, case) in cases.iter().enumerate() {
                if i > 0 {
                    write!(f, "; ")?;
                }
                write!(f, "{}", name)?;
                for pattern in &case.patterns {
                    write!(f, " ")?;
                    write_expr(heap, *pattern, f, false)?;
                }
                write!(f, " = ")?;
                write_expr(heap, case.body, f, false)?;
            }
            close(f)
        }
    }
}
