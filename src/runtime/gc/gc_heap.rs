use crate::ast::{Expr, ExprKind};
use crate::frontend::position::Span;
use crate::runtime::env::Environment;
use crate::runtime::gc::gc_handle::{ExprRef, ScopeRef};
use crate::runtime::gc::heap_entry::{ExprEntry, ScopeEntry};

/// The evaluator collects once this many objects were allocated since the
/// last collection.
pub const COLLECT_THRESHOLD: usize = 200;

/// Mark-and-sweep heap owning every AST node and every environment.
///
/// Marking compares a slot's bit against the collector's bit; `collect`
/// drops every slot whose bit differs, then flips the collector bit, which
/// unmarks all survivors without touching them.
pub struct GcHeap {
    exprs: Vec<Option<ExprEntry>>,
    free_exprs: Vec<u32>,
    scopes: Vec<Option<ScopeEntry>>,
    free_scopes: Vec<u32>,
    mark_bit: bool,
    new_since_collect: usize,
    total_collections: usize,
}

impl Default for GcHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl GcHeap {
    pub fn new() -> Self {
        Self {
            exprs: Vec::new(),
            free_exprs: Vec::new(),
            scopes: Vec::new(),
            free_scopes: Vec::new(),
            mark_bit: true,
            new_since_collect: 0,
            total_collections: 0,
        }
    }

    /// Allocates an expression; its depth is fixed here from its children.
    /// New slots start unmarked.
    pub fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprRef {
        let mut depth = 1u32;
        kind.for_each_child(|child| depth += self.expr(child).depth);
        let entry = ExprEntry {
            expr: Expr {
                kind,
                span,
                depth,
                last_eval: None,
            },
            bit: !self.mark_bit,
        };
        self.new_since_collect += 1;
        if let Some(index) = self.free_exprs.pop() {
            self.exprs[index as usize] = Some(entry);
            ExprRef(index)
        } else {
            let index = self.exprs.len() as u32;
            self.exprs.push(Some(entry));
            ExprRef(index)
        }
    }

    pub fn alloc_scope(&mut self, scope: Environment) -> ScopeRef {
        let entry = ScopeEntry {
            scope,
            bit: !self.mark_bit,
        };
        self.new_since_collect += 1;
        if let Some(index) = self.free_scopes.pop() {
            self.scopes[index as usize] = Some(entry);
            ScopeRef(index)
        } else {
            let index = self.scopes.len() as u32;
            self.scopes.push(Some(entry));
            ScopeRef(index)
        }
    }

    /// Panics on a freed or out-of-range handle; live handles are kept valid
    /// by the rooting discipline.
    pub fn expr(&self, handle: ExprRef) -> &Expr {
        &self.exprs[handle.0 as usize]
            .as_ref()
            .expect("GcHeap::expr: freed handle")
            .expr
    }

    pub fn expr_mut(&mut self, handle: ExprRef) -> &mut Expr {
        &mut self.exprs[handle.0 as usize]
            .as_mut()
            .expect("GcHeap::expr_mut: freed handle")
            .expr
    }

    pub fn scope(&self, handle: ScopeRef) -> &Environment {
        &self.scopes[handle.0 as usize]
            .as_ref()
            .expect("GcHeap::scope: freed handle")
            .scope
    }

    pub fn scope_mut(&mut self, handle: ScopeRef) -> &mut Environment {
        &mut self.scopes[handle.0 as usize]
            .as_mut()
            .expect("GcHeap::scope_mut: freed handle")
            .scope
    }

    pub fn mark_bit(&self) -> bool {
        self.mark_bit
    }

    pub fn new_objects_since_collect(&self) -> usize {
        self.new_since_collect
    }

    pub fn total_collections(&self) -> usize {
        self.total_collections
    }

    pub fn live_exprs(&self) -> usize {
        self.exprs.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn contains_expr(&self, handle: ExprRef) -> bool {
        self.exprs
            .get(handle.0 as usize)
            .is_some_and(|slot| slot.is_some())
    }

    pub fn live_scopes(&self) -> usize {
        self.scopes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn contains_scope(&self, handle: ScopeRef) -> bool {
        self.scopes
            .get(handle.0 as usize)
            .is_some_and(|slot| slot.is_some())
    }

    /// Marks an expression and everything reachable from it, including the
    /// `last_eval` cache edge.
    pub fn mark_expr(&mut self, root: ExprRef) {
        let bit = self.mark_bit;
        let mut worklist = vec![root];
        while let Some(handle) = worklist.pop() {
            let Some(entry) = self
                .exprs
                .get_mut(handle.0 as usize)
                .and_then(|slot| slot.as_mut())
            else {
                continue;
            };
            if entry.bit == bit {
                continue;
            }
            entry.bit = bit;
            entry.expr.kind.for_each_child(|child| worklist.push(child));
            if let Some(cached) = entry.expr.last_eval {
                worklist.push(cached);
            }
        }
    }

    /// Marks an environment chain: each frame's variables and stack roots,
    /// then the parent. Stops early at an already-marked frame.
    pub fn mark_scope(&mut self, root: ScopeRef) {
        let bit = self.mark_bit;
        let mut current = Some(root);
        while let Some(handle) = current {
            let Some(entry) = self
                .scopes
                .get_mut(handle.0 as usize)
                .and_then(|slot| slot.as_mut())
            else {
                return;
            };
            if entry.bit == bit {
                return;
            }
            entry.bit = bit;
            let mut roots: Vec<ExprRef> = entry.scope.variables.values().copied().collect();
            roots.extend_from_slice(&entry.scope.stack_roots);
            let parent = entry.scope.parent;
            for expr in roots {
                self.mark_expr(expr);
            }
            current = parent;
        }
    }

    /// Sweeps both arenas, then flips the mark bit and resets the
    /// new-object counter.
    pub fn collect(&mut self) {
        let bit = self.mark_bit;
        for (index, slot) in self.exprs.iter_mut().enumerate() {
            if slot.as_ref().is_some_and(|entry| entry.bit != bit) {
                *slot = None;
                self.free_exprs.push(index as u32);
            }
        }
        for (index, slot) in self.scopes.iter_mut().enumerate() {
            if slot.as_ref().is_some_and(|entry| entry.bit != bit) {
                *slot = None;
                self.free_scopes.push(index as u32);
            }
        }
        self.mark_bit = !self.mark_bit;
        self.new_since_collect = 0;
        self.total_collections += 1;
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{BinOp, ExprKind};
    use crate::frontend::position::Span;
    use crate::runtime::env::Environment;
    use crate::runtime::gc::GcHeap;

    fn span() -> Span {
        Span::default()
    }

    #[test]
    fn alloc_and_read_back() {
        let mut heap = GcHeap::new();
        let n = heap.alloc(ExprKind::Integer(42), span());
        assert!(matches!(heap.expr(n).kind, ExprKind::Integer(42)));
        assert_eq!(heap.expr(n).depth, 1);
        assert_eq!(heap.live_exprs(), 1);
    }

    #[test]
    fn depth_counts_children() {
        let mut heap = GcHeap::new();
        let one = heap.alloc(ExprKind::Integer(1), span());
        let two = heap.alloc(ExprKind::Integer(2), span());
        let sum = heap.alloc(
            ExprKind::Binary {
                op: BinOp::Add,
                lhs: one,
                rhs: two,
            },
            span(),
        );
        assert_eq!(heap.expr(sum).depth, 3);
    }

    #[test]
    fn collect_frees_unreachable() {
        let mut heap = GcHeap::new();
        for i in 0..100 {
            heap.alloc(ExprKind::Integer(i), span());
        }
        assert_eq!(heap.live_exprs(), 100);

        heap.collect();
        assert_eq!(heap.live_exprs(), 0);
        assert_eq!(heap.new_objects_since_collect(), 0);
    }

    #[test]
    fn collect_preserves_marked_subtrees() {
        let mut heap = GcHeap::new();
        let one = heap.alloc(ExprKind::Integer(1), span());
        let two = heap.alloc(ExprKind::Integer(2), span());
        let sum = heap.alloc(
            ExprKind::Binary {
                op: BinOp::Add,
                lhs: one,
                rhs: two,
            },
            span(),
        );
        for i in 0..50 {
            heap.alloc(ExprKind::Integer(i), span());
        }

        heap.mark_expr(sum);
        heap.collect();
        assert_eq!(heap.live_exprs(), 3);
        assert!(heap.contains_expr(one));
        assert!(heap.contains_expr(two));
        assert!(heap.contains_expr(sum));
    }

    #[test]
    fn toggling_bit_keeps_survivors_valid_across_cycles() {
        let mut heap = GcHeap::new();
        let keep = heap.alloc(ExprKind::Integer(7), span());

        for _ in 0..3 {
            heap.alloc(ExprKind::Integer(0), span());
            heap.mark_expr(keep);
            heap.collect();
            assert!(heap.contains_expr(keep));
            assert_eq!(heap.live_exprs(), 1);
        }
    }

    #[test]
    fn scope_chain_keeps_variables_alive() {
        let mut heap = GcHeap::new();
        let value = heap.alloc(ExprKind::Integer(5), span());
        let globals = heap.alloc_scope(Environment::root());
        heap.scope_mut(globals)
            .variables
            .insert("x".into(), value);
        let child = heap.alloc_scope(Environment::child_of(globals));

        heap.alloc(ExprKind::Integer(99), span()); // garbage
        heap.mark_scope(child);
        heap.collect();
        assert!(heap.contains_expr(value));
        assert_eq!(heap.live_exprs(), 1);
    }

    #[test]
    fn stack_roots_protect_expressions() {
        let mut heap = GcHeap::new();
        let globals = heap.alloc_scope(Environment::root());
        let held = heap.alloc(ExprKind::Integer(1), span());
        heap.push_root(globals, held);
        let dropped = heap.alloc(ExprKind::Integer(2), span());

        heap.mark_scope(globals);
        heap.collect();
        assert!(heap.contains_expr(held));
        assert!(!heap.contains_expr(dropped));

        heap.pop_root(globals, held);
        heap.mark_scope(globals);
        heap.collect();
        assert!(!heap.contains_expr(held));
    }

    #[test]
    fn last_eval_edge_is_traced() {
        let mut heap = GcHeap::new();
        let source = heap.alloc(ExprKind::Identifier("x".into()), span());
        let result = heap.alloc(ExprKind::Integer(3), span());
        heap.expr_mut(source).last_eval = Some(result);

        heap.mark_expr(source);
        heap.collect();
        assert!(heap.contains_expr(result));
    }

    #[test]
    fn free_slots_are_reused() {
        let mut heap = GcHeap::new();
        let a = heap.alloc(ExprKind::Integer(1), span());
        let _b = heap.alloc(ExprKind::Integer(2), span());
        heap.collect();
        assert_eq!(heap.live_exprs(), 0);

        let c = heap.alloc(ExprKind::Integer(3), span());
        assert!(c.index() <= a.index().max(1));
        assert_eq!(heap.live_exprs(), 1);
    }

    #[test]
    fn unreferenced_scopes_are_collected() {
        let mut heap = GcHeap::new();
        let globals = heap.alloc_scope(Environment::root());
        let child = heap.alloc_scope(Environment::child_of(globals));
        assert_eq!(heap.live_scopes(), 2);

        // Marking from the child keeps the whole chain alive.
        heap.mark_scope(child);
        heap.collect();
        assert!(heap.contains_scope(globals));
        assert!(heap.contains_scope(child));

        // The child is not reachable from the global frame alone.
        heap.mark_scope(globals);
        heap.collect();
        assert!(heap.contains_scope(globals));
        assert!(!heap.contains_scope(child));
        assert_eq!(heap.live_scopes(), 1);
    }
}
