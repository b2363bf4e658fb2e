use std::collections::BTreeMap;

use crate::runtime::gc::{ExprRef, GcHeap, ScopeRef};

/// One scope frame: name bindings, an optional parent, and the stack-root
/// multiset protecting expressions held across allocations. The binding map
/// is ordered so `let` substitution is deterministic.
#[derive(Debug, Default)]
pub struct Environment {
    pub variables: BTreeMap<String, ExprRef>,
    pub parent: Option<ScopeRef>,
    pub stack_roots: Vec<ExprRef>,
}

impl Environment {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child_of(parent: ScopeRef) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }
}

impl GcHeap {
    /// Looks a name up through the scope chain.
    pub fn lookup(&self, scope: ScopeRef, name: &str) -> Option<ExprRef> {
        let mut current = Some(scope);
        while let Some(handle) = current {
            let frame = self.scope(handle);
            if let Some(&value) = frame.variables.get(name) {
                return Some(value);
            }
            current = frame.parent;
        }
        None
    }

    /// Looks a name up in the given frame only.
    pub fn current_get(&self, scope: ScopeRef, name: &str) -> Option<ExprRef> {
        self.scope(scope).variables.get(name).copied()
    }

    pub fn push_root(&mut self, scope: ScopeRef, expr: ExprRef) {
        self.scope_mut(scope).stack_roots.push(expr);
    }

    /// Removes one occurrence by value; order does not matter.
    pub fn pop_root(&mut self, scope: ScopeRef, expr: ExprRef) {
        let roots = &mut self.scope_mut(scope).stack_roots;
        if let Some(index) = roots.iter().rposition(|&r| r == expr) {
            roots.swap_remove(index);
        }
    }

    pub fn clear_roots(&mut self, scope: ScopeRef) {
        self.scope_mut(scope).stack_roots.clear();
    }
}
