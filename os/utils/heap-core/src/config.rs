/// What happens to a block-table slot once its block is freed.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum SlotPolicy {
    /// Slots are consumed once and never handed out again. After as many
    /// allocations as the region has pages the heap reports
    /// [`OutOfSpace`](crate::HeapError::OutOfSpace), even with free pages.
    #[default]
    Monotonic,
    /// Cleared slots go onto a free list and are reused.
    Recycle,
}

/// Per-heap tuning knobs.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct HeapConfig {
    pub slot_policy: SlotPolicy,
}

impl HeapConfig {
    #[must_use]
    pub const fn new(slot_policy: SlotPolicy) -> Self {
        Self { slot_policy }
    }
}
