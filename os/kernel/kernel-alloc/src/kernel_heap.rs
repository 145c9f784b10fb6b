use heap_core::{
    BlockKind, BlockRecord, HeapBook, HeapConfig, HeapError, Placement, Region, RegionError,
};
use kernel_info::memory::{KERNEL_HEAP_MAX, KERNEL_HEAP_START};
use kernel_memory_addresses::{PhysicalAddress, Size4K, VirtualAddress};
use kernel_vmem::{AddressTranslator, FrameMapper, MapError, PagePermissions};
use log::{error, trace, warn};

/// First-fit page heap over the kernel's heap region.
pub struct KernelHeap<M: FrameMapper> {
    book: HeapBook,
    mapper: M,
}

impl<M: FrameMapper> KernelHeap<M> {
    #[must_use]
    pub fn new(region: Region, mapper: M) -> Self {
        Self::with_config(region, mapper, HeapConfig::default())
    }

    #[must_use]
    pub fn with_config(region: Region, mapper: M, config: HeapConfig) -> Self {
        Self {
            book: HeapBook::new(region, config),
            mapper,
        }
    }

    /// Heap over `[KERNEL_HEAP_START, KERNEL_HEAP_MAX)`.
    ///
    /// # Errors
    /// Only if the compile-time layout is inconsistent.
    pub fn with_kernel_layout(mapper: M) -> Result<Self, RegionError> {
        let region = Region::new(KERNEL_HEAP_START, KERNEL_HEAP_MAX)?;
        Ok(Self::new(region, mapper))
    }

    /// Reserve and map `ceil(size / PAGE_SIZE)` pages at the lowest free
    /// address that fits.
    ///
    /// # Errors
    /// - [`HeapError::InvalidSize`] for `0` or more than the region holds.
    /// - [`HeapError::OutOfSpace`] when no run fits or the block table is full.
    /// - [`HeapError::OutOfMemory`] when a frame could not be acquired or
    ///   mapped; nothing stays mapped in that case.
    pub fn allocate(&mut self, size: usize) -> Result<VirtualAddress, HeapError> {
        let (first_page, page_count) = self.book.locate(size, Placement::FirstFit)?;
        let first_va = self.book.region().page_address(first_page);

        self.back_pages(first_va, page_count)?;

        match self
            .book
            .commit(first_page, page_count, size, BlockKind::Private)
        {
            Ok(va) => Ok(va),
            Err(e) => {
                self.unback_pages(first_va, page_count);
                Err(e)
            }
        }
    }

    /// Unmap and release the block starting at `va`.
    ///
    /// Null addresses, addresses outside the heap and addresses that are not
    /// the head of a live block are ignored.
    pub fn free(&mut self, va: VirtualAddress) {
        let Some((slot, record)) = self.book.lookup(va) else {
            trace!("ignoring free of {va}");
            return;
        };
        self.unback_pages(record.first_va, record.page_count);
        self.book.release(slot);
    }

    /// Grow, allocate or free depending on the arguments:
    ///
    /// | `va` | `new_size` | effect |
    /// |------|------------|--------|
    /// | `None` | `0` | nothing, `Ok(None)` |
    /// | `None` | `n` | [`allocate(n)`](Self::allocate) |
    /// | `Some` | `0` | [`free(va)`](Self::free), `Ok(None)` |
    /// | `Some` | `≤ reserved` | `Ok(Some(va))`, nothing changes |
    /// | `Some` | `> reserved` | new block, `min(old, new)` bytes copied, old block freed |
    ///
    /// A null `Some` is treated like `None`.
    ///
    /// # Errors
    /// [`HeapError::InvalidAddress`] if `va` is not a live block head, or any
    /// [`allocate`](Self::allocate) error on the grow path. On error the old
    /// block is left as it was.
    pub fn resize(
        &mut self,
        va: Option<VirtualAddress>,
        new_size: usize,
    ) -> Result<Option<VirtualAddress>, HeapError> {
        match (va.filter(|va| !va.is_null()), new_size) {
            (None, 0) => Ok(None),
            (None, size) => self.allocate(size).map(Some),
            (Some(va), 0) => {
                self.free(va);
                Ok(None)
            }
            (Some(va), size) => {
                let Some((_, old)) = self.book.lookup(va) else {
                    return Err(HeapError::InvalidAddress(va.as_u64()));
                };
                if size <= old.reserved_bytes() {
                    return Ok(Some(va));
                }

                let new_va = self.allocate(size)?;
                let keep = old.requested_size.min(size);
                if let Err(e) = self.mapper.copy_mapped(va, new_va, keep) {
                    error!("copy of {keep} bytes {va} -> {new_va} failed: {e}");
                    self.free(new_va);
                    return Err(map_error(e));
                }
                self.free(va);
                Ok(Some(new_va))
            }
        }
    }

    /// Frame base behind the heap page containing `va`.
    ///
    /// `None` for addresses outside the heap and for unmapped pages.
    #[must_use]
    pub fn physical_for_virtual(&self, va: VirtualAddress) -> Option<PhysicalAddress> {
        let page = va.align_down::<Size4K>();
        if !self.book.region().contains(page) {
            return None;
        }
        self.translator().physical_of(page)
    }

    /// First heap page whose frame is the one containing `pa`.
    ///
    /// This walks every page of the region.
    #[must_use]
    pub fn virtual_for_physical(&self, pa: PhysicalAddress) -> Option<VirtualAddress> {
        self.translator().virtual_of(pa, self.book.region().pages())
    }

    #[must_use]
    pub const fn translator(&self) -> AddressTranslator<'_, M> {
        AddressTranslator::new(&self.mapper)
    }

    #[must_use]
    pub const fn region(&self) -> &Region {
        self.book.region()
    }

    #[must_use]
    pub const fn book(&self) -> &HeapBook {
        &self.book
    }

    #[must_use]
    pub const fn mapper(&self) -> &M {
        &self.mapper
    }

    pub const fn mapper_mut(&mut self) -> &mut M {
        &mut self.mapper
    }

    #[must_use]
    pub fn free_pages(&self) -> usize {
        self.book.free_pages()
    }

    #[must_use]
    pub fn live_blocks(&self) -> usize {
        self.book.live_blocks()
    }

    #[must_use]
    pub fn block_at(&self, va: VirtualAddress) -> Option<BlockRecord> {
        self.book.block_at(va)
    }

    #[must_use]
    pub fn reserved_bytes(&self, va: VirtualAddress) -> Option<usize> {
        self.book.reserved_bytes(va)
    }

    /// Acquire and map one frame per page. On failure, everything mapped so
    /// far is unmapped and released again.
    fn back_pages(&mut self, first_va: VirtualAddress, page_count: usize) -> Result<(), HeapError> {
        for i in 0..page_count {
            let va = page_va(first_va, i);

            let frame = match self.mapper.acquire_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("no frame for {va} ({e}); rolling back {i} pages");
                    self.unback_pages(first_va, i);
                    return Err(map_error(e));
                }
            };

            if let Err(e) = self
                .mapper
                .map_page(frame, va, PagePermissions::kernel_rw())
            {
                warn!("mapping {va} failed ({e}); rolling back {i} pages");
                self.mapper.release_frame(frame);
                self.unback_pages(first_va, i);
                return Err(map_error(e));
            }
            trace!("mapped {va} -> frame {:#x}", frame.raw());
        }
        Ok(())
    }

    fn unback_pages(&mut self, first_va: VirtualAddress, page_count: usize) {
        for i in 0..page_count {
            let va = page_va(first_va, i);
            match self.mapper.unmap_page(va) {
                Some(frame) => self.mapper.release_frame(frame),
                None => error!("heap page {va} was not mapped"),
            }
        }
    }
}

#[inline]
fn page_va(first_va: VirtualAddress, index: usize) -> VirtualAddress {
    first_va + (index * heap_core::PAGE_SIZE) as u64
}

const fn map_error(e: MapError) -> HeapError {
    match e {
        MapError::OutOfMemory => HeapError::OutOfMemory,
        MapError::NotMapped(va) => HeapError::InvalidAddress(va.as_u64()),
    }
}
