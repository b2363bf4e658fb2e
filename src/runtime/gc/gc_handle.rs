/// Handle of an expression slot in the GC heap.
///
/// A lightweight, copyable index referring to a heap-owned AST node. All
/// edges between nodes are handles; the heap is the single owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprRef(pub(crate) u32);

impl ExprRef {
    /// Returns the raw heap slot index backing this handle.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Handle of an environment slot in the GC heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeRef(pub(crate) u32);

impl ScopeRef {
    pub fn index(self) -> u32 {
        self.0
    }
}
