pub mod gc_handle;
pub mod gc_heap;
pub mod heap_entry;

pub use gc_handle::{ExprRef, ScopeRef};
pub use gc_heap::{COLLECT_THRESHOLD, GcHeap};
