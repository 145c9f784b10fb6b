use crate::config::SlotPolicy;
use alloc::vec::Vec;
use core::ops::Range;
use kernel_memory_addresses::VirtualAddress;

/// Kernel-assigned identifier of a shared object.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SharedObjectId(pub u32);

/// What backs a block.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BlockKind {
    /// Private heap memory from `allocate`.
    Private,
    /// A shared object attached at this block.
    Shared(SharedObjectId),
}

/// Bookkeeping entry for one live allocation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BlockRecord {
    pub first_page: usize,
    pub first_va: VirtualAddress,
    pub page_count: usize,
    pub requested_size: usize,
    pub kind: BlockKind,
}

impl BlockRecord {
    #[inline]
    #[must_use]
    pub const fn pages(&self) -> Range<usize> {
        self.first_page..self.first_page + self.page_count
    }

    /// Bytes actually reserved, i.e. the page-rounded capacity.
    #[inline]
    #[must_use]
    pub const fn reserved_bytes(&self) -> usize {
        self.page_count * crate::PAGE_SIZE
    }
}

/// Live-allocation records of one heap, bounded by its page count.
///
/// Slots are handed out in increasing order. Under
/// [`SlotPolicy::Monotonic`] a cleared slot stays dead, so the table can run
/// out while pages are still free.
#[derive(Debug, Clone)]
pub struct BlockTable {
    slots: Vec<Option<BlockRecord>>,
    capacity: usize,
    recycled: Vec<usize>,
    policy: SlotPolicy,
}

impl BlockTable {
    #[must_use]
    pub const fn new(capacity: usize, policy: SlotPolicy) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
            recycled: Vec::new(),
            policy,
        }
    }

    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots not available to `insert`: the live ones, plus every cleared
    /// one under [`SlotPolicy::Monotonic`].
    #[inline]
    #[must_use]
    pub fn slots_used(&self) -> usize {
        self.slots.len() - self.recycled.len()
    }

    #[must_use]
    pub fn has_free_slot(&self) -> bool {
        self.slots.len() < self.capacity || !self.recycled.is_empty()
    }

    /// Store `record`, returning its slot, or `None` if the table is full.
    pub fn insert(&mut self, record: BlockRecord) -> Option<usize> {
        if let Some(slot) = self.recycled.pop() {
            self.slots[slot] = Some(record);
            return Some(slot);
        }
        if self.slots.len() >= self.capacity {
            return None;
        }
        self.slots.push(Some(record));
        Some(self.slots.len() - 1)
    }

    /// Slot of the live block whose first address is `va`.
    #[must_use]
    pub fn find_head(&self, va: VirtualAddress) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.is_some_and(|r| r.first_va == va))
    }

    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&BlockRecord> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Clear `slot` and return what it held.
    pub fn remove(&mut self, slot: usize) -> Option<BlockRecord> {
        let record = self.slots.get_mut(slot)?.take()?;
        if self.policy == SlotPolicy::Recycle {
            self.recycled.push(slot);
        }
        Some(record)
    }

    pub fn live(&self) -> impl Iterator<Item = &BlockRecord> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(first_page: usize, page_count: usize) -> BlockRecord {
        BlockRecord {
            first_page,
            first_va: VirtualAddress::new(0x1000 + (first_page as u64) * 0x1000),
            page_count,
            requested_size: page_count * crate::PAGE_SIZE,
            kind: BlockKind::Private,
        }
    }

    #[test]
    fn monotonic_slots_are_never_reused() {
        let mut t = BlockTable::new(2, SlotPolicy::Monotonic);
        let a = t.insert(record(0, 1)).unwrap();
        assert_eq!(t.remove(a).map(|r| r.first_page), Some(0));
        assert!(t.remove(a).is_none());
        assert_eq!(t.insert(record(0, 1)), Some(1));
        assert!(!t.has_free_slot());
        assert_eq!(t.insert(record(1, 1)), None);
        assert_eq!(t.live_count(), 1);
    }

    #[test]
    fn recycled_slots_are_reused() {
        let mut t = BlockTable::new(2, SlotPolicy::Recycle);
        let a = t.insert(record(0, 1)).unwrap();
        let _b = t.insert(record(1, 1)).unwrap();
        assert!(!t.has_free_slot());
        t.remove(a);
        assert!(t.has_free_slot());
        assert_eq!(t.insert(record(2, 1)), Some(a));
        assert_eq!(t.slots_used(), 2);
    }

    #[test]
    fn lookup_matches_only_block_heads() {
        let mut t = BlockTable::new(4, SlotPolicy::Monotonic);
        let slot = t.insert(record(1, 3)).unwrap();
        assert_eq!(t.find_head(VirtualAddress::new(0x2000)), Some(slot));
        assert_eq!(t.find_head(VirtualAddress::new(0x3000)), None);
        assert_eq!(t.get(slot).map(BlockRecord::pages), Some(1..4));
        assert_eq!(t.get(slot).map(BlockRecord::reserved_bytes), Some(3 * 4096));
    }
}
