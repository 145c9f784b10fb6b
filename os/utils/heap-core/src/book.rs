use crate::{
    BlockKind, BlockRecord, BlockTable, HeapConfig, HeapError, PageStateTable, Placement, Region,
};
use kernel_memory_addresses::{Size4K, VirtualAddress, pages_for};
use log::{debug, error, warn};

/// Region, page table and block table of one heap instance.
///
/// `HeapBook` does the bookkeeping half of every heap operation. The backing
/// half (frames, boundary calls) stays with the heap that owns it, which calls
/// [`commit`](Self::commit) only once backing succeeded.
#[derive(Debug, Clone)]
pub struct HeapBook {
    region: Region,
    pages: PageStateTable,
    blocks: BlockTable,
}

impl HeapBook {
    #[must_use]
    pub fn new(region: Region, config: HeapConfig) -> Self {
        let slots = region.page_count();
        Self {
            region,
            pages: PageStateTable::new(slots),
            blocks: BlockTable::new(slots, config.slot_policy),
        }
    }

    #[inline]
    #[must_use]
    pub const fn region(&self) -> &Region {
        &self.region
    }

    #[inline]
    #[must_use]
    pub const fn pages(&self) -> &PageStateTable {
        &self.pages
    }

    /// Page count for a request of `size` bytes.
    ///
    /// # Errors
    /// [`HeapError::InvalidSize`] if `size` is zero or exceeds the region.
    pub fn pages_needed(&self, size: usize) -> Result<usize, HeapError> {
        if size == 0 || size > self.region.capacity() {
            warn!("rejecting request of {size} bytes for {:?}", self.region);
            return Err(HeapError::InvalidSize(size));
        }
        Ok(pages_for::<Size4K>(size))
    }

    /// Validate `size`, check for a free block slot and search for a run.
    ///
    /// Returns `(first_page, page_count)`. Nothing is reserved yet.
    ///
    /// # Errors
    /// [`HeapError::InvalidSize`], or [`HeapError::OutOfSpace`] when the block
    /// table is exhausted or no run is large enough.
    pub fn locate(&self, size: usize, placement: Placement) -> Result<(usize, usize), HeapError> {
        let needed = self.pages_needed(size)?;
        if !self.blocks.has_free_slot() {
            warn!(
                "block table full ({} slots) with {} pages free",
                self.blocks.capacity(),
                self.pages.free_count()
            );
            return Err(HeapError::OutOfSpace);
        }
        match placement.find(&self.pages, needed) {
            Some(first) => Ok((first, needed)),
            None => {
                warn!(
                    "no run of {needed} pages ({placement:?}); {} pages free",
                    self.pages.free_count()
                );
                Err(HeapError::OutOfSpace)
            }
        }
    }

    /// Mark `first_page..first_page + page_count` allocated and record the
    /// block. Returns the block's first address.
    ///
    /// # Errors
    /// [`HeapError::OutOfSpace`] if the block table filled up since
    /// [`locate`](Self::locate). Nothing is changed in that case.
    pub fn commit(
        &mut self,
        first_page: usize,
        page_count: usize,
        requested_size: usize,
        kind: BlockKind,
    ) -> Result<VirtualAddress, HeapError> {
        let range = first_page..first_page + page_count;
        if !self.pages.is_range_free(range.clone()) {
            error!("refusing to commit overlapping block at pages {range:?}");
            return Err(HeapError::OutOfSpace);
        }

        let first_va = self.region.page_address(first_page);
        let record = BlockRecord {
            first_page,
            first_va,
            page_count,
            requested_size,
            kind,
        };
        let Some(slot) = self.blocks.insert(record) else {
            return Err(HeapError::OutOfSpace);
        };
        self.pages.mark_allocated(range);
        debug!("block {slot}: {page_count} pages at {first_va} ({requested_size} bytes)");
        Ok(first_va)
    }

    /// Slot and record of the live block starting at `va`.
    ///
    /// Null addresses, addresses outside the region and addresses that are
    /// not a block head yield `None`.
    #[must_use]
    pub fn lookup(&self, va: VirtualAddress) -> Option<(usize, BlockRecord)> {
        if va.is_null() || !self.region.contains(va) {
            return None;
        }
        let slot = self.blocks.find_head(va)?;
        self.blocks.get(slot).map(|r| (slot, *r))
    }

    /// Clear the block in `slot` and free its pages.
    pub fn release(&mut self, slot: usize) -> Option<BlockRecord> {
        let record = self.blocks.remove(slot)?;
        self.pages.mark_free(record.pages());
        debug!(
            "block {slot}: released {} pages at {}",
            record.page_count, record.first_va
        );
        Some(record)
    }

    #[must_use]
    pub fn free_pages(&self) -> usize {
        self.pages.free_count()
    }

    #[must_use]
    pub fn live_blocks(&self) -> usize {
        self.blocks.live_count()
    }

    #[must_use]
    pub fn block_at(&self, va: VirtualAddress) -> Option<BlockRecord> {
        self.lookup(va).map(|(_, r)| r)
    }

    /// Page-rounded capacity of the block at `va`.
    #[must_use]
    pub fn reserved_bytes(&self, va: VirtualAddress) -> Option<usize> {
        self.block_at(va).map(|r| r.reserved_bytes())
    }
}
