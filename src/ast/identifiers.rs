use crate::ast::ExprKind;
use crate::runtime::gc::{ExprRef, GcHeap};

impl GcHeap {
    /// Every identifier name occurring in the tree, in traversal order.
    /// Used to decide which `let` bindings shadow a substituted name.
    pub fn identifiers(&self, expr: ExprRef) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_identifiers(expr, &mut names);
        names
    }

    fn collect_identifiers(&self, expr: ExprRef, names: &mut Vec<String>) {
        if let ExprKind::Identifier(name) = &self.expr(expr).kind {
            names.push(name.clone());
            return;
        }
        let mut children = Vec::new();
        self.expr(expr).kind.for_each_child(|c| children.push(c));
        for child in children {
            self.collect_identifiers(child, names);
        }
    }
}
