use crate::ast::Expr;
use crate::runtime::env::Environment;

/// An expression slot. `bit` equals the collector's mark bit when the slot
/// is marked; flipping the collector bit unmarks every survivor at once.
pub struct ExprEntry {
    pub expr: Expr,
    pub bit: bool,
}

/// An environment slot, marked the same way.
pub struct ScopeEntry {
    pub scope: Environment,
    pub bit: bool,
}
