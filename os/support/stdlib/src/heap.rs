use crate::boundary::KernelBoundary;
use crate::shared::SharedObjects;
use heap_core::{
    BlockKind, BlockRecord, BoundaryError, HeapBook, HeapConfig, HeapError, Placement, Region,
    RegionError, VirtualAddress,
};
use kernel_info::memory::{USER_HEAP_MAX, USER_HEAP_START};
use log::{error, trace, warn};

/// Best-fit page heap over a process's heap region.
///
/// Physical backing is the kernel's business: every allocation asks the
/// [`KernelBoundary`] to back the chosen range, every free asks it to drop
/// the backing again.
///
/// All operations take `&mut self`. Share one heap between threads through
/// [`LockedProcessHeap`](crate::LockedProcessHeap).
pub struct ProcessHeap<B: KernelBoundary> {
    pub(crate) book: HeapBook,
    pub(crate) boundary: B,
}

impl<B: KernelBoundary> ProcessHeap<B> {
    #[must_use]
    pub fn new(region: Region, boundary: B) -> Self {
        Self::with_config(region, boundary, HeapConfig::default())
    }

    #[must_use]
    pub fn with_config(region: Region, boundary: B, config: HeapConfig) -> Self {
        Self {
            book: HeapBook::new(region, config),
            boundary,
        }
    }

    /// Heap over `[USER_HEAP_START, USER_HEAP_MAX)`.
    ///
    /// # Errors
    /// Only if the compile-time layout is inconsistent.
    pub fn with_user_layout(boundary: B) -> Result<Self, RegionError> {
        let region = Region::new(USER_HEAP_START, USER_HEAP_MAX)?;
        Ok(Self::new(region, boundary))
    }

    /// Reserve `ceil(size / PAGE_SIZE)` pages in the smallest free run that
    /// fits and have the kernel back them.
    ///
    /// # Errors
    /// - [`HeapError::InvalidSize`] for `0` or more than the region holds.
    /// - [`HeapError::UnsupportedStrategy`] unless the kernel reports best-fit.
    /// - [`HeapError::OutOfSpace`] when no run fits or the block table is full.
    /// - [`HeapError::OutOfMemory`] when the kernel has no memory to back the
    ///   range, [`HeapError::Boundary`] for any other refusal.
    pub fn allocate(&mut self, size: usize) -> Result<VirtualAddress, HeapError> {
        let (first_page, page_count) = self.place(size)?;
        let va = self.book.region().page_address(first_page);

        self.boundary
            .back_memory(va, size)
            .map_err(backing_error)?;

        self.book
            .commit(first_page, page_count, size, BlockKind::Private)
            .inspect_err(|_| {
                if let Err(e) = self.boundary.unback_memory(va, size) {
                    error!("could not drop backing of {va} after failed commit: {e}");
                }
            })
    }

    /// Drop the block starting at `va`.
    ///
    /// Null, foreign and interior addresses are ignored, and so are shared
    /// objects: those go through [`SharedObjects::detach`].
    pub fn free(&mut self, va: VirtualAddress) {
        let Some((slot, record)) = self.book.lookup(va) else {
            trace!("ignoring free of {va}");
            return;
        };
        if let BlockKind::Shared(id) = record.kind {
            warn!("free of shared object {id:?} at {va} ignored; detach it instead");
            return;
        }
        if let Err(e) = self.release(slot, &record) {
            error!("kernel refused to drop {va}: {e}; block stays live");
        }
    }

    /// Same contract as the kernel heap's `resize`; the copy on the grow
    /// path is done by the kernel via [`KernelBoundary::move_memory`].
    ///
    /// # Errors
    /// [`HeapError::InvalidAddress`] if `va` is not the head of a private
    /// block, any [`allocate`](Self::allocate) error on the grow path, or
    /// [`HeapError::Boundary`] if the kernel refuses the move or refuses to
    /// drop the old block. On error the old block is the live one and the
    /// new block is gone.
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
                let (old_slot, old) = match self.book.lookup(va) {
                    Some((slot, old)) if old.kind == BlockKind::Private => (slot, old),
                    _ => return Err(HeapError::InvalidAddress(va.as_u64())),
                };
                if size <= old.reserved_bytes() {
                    return Ok(Some(va));
                }

                let new_va = self.allocate(size)?;
                let keep = old.requested_size.min(size);
                if let Err(e) = self.boundary.move_memory(va, new_va, keep) {
                    warn!("moving {keep} bytes {va} -> {new_va} failed: {e}");
                    self.free(new_va);
                    return Err(e.into());
                }
                if let Err(e) = self.release(old_slot, &old) {
                    warn!("kernel refused to drop {va} after the move: {e}");
                    self.free(new_va);
                    return Err(e.into());
                }
                Ok(Some(new_va))
            }
        }
    }

    /// Named shared objects placed in this heap.
    pub const fn shared(&mut self) -> SharedObjects<'_, B> {
        SharedObjects::new(self)
    }

    /// Drop the kernel backing of a private block, then its bookkeeping.
    /// The block stays live if the kernel refuses.
    fn release(&mut self, slot: usize, record: &BlockRecord) -> Result<(), BoundaryError> {
        self.boundary
            .unback_memory(record.first_va, record.requested_size)?;
        self.book.release(slot);
        Ok(())
    }

    /// Size check, strategy check, then the best-fit search.
    pub(crate) fn place(&self, size: usize) -> Result<(usize, usize), HeapError> {
        self.book.pages_needed(size)?;
        if !self.boundary.placement_is_best_fit() {
            warn!("kernel selects a placement strategy other than best-fit");
            return Err(HeapError::UnsupportedStrategy);
        }
        self.book.locate(size, Placement::BestFit)
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
    pub const fn boundary(&self) -> &B {
        &self.boundary
    }

    pub const fn boundary_mut(&mut self) -> &mut B {
        &mut self.boundary
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
}

/// Kernel refusals for lack of memory read the same as in the kernel heap.
pub(crate) const fn backing_error(e: BoundaryError) -> HeapError {
    match e {
        BoundaryError::NoMemory => HeapError::OutOfMemory,
        other => HeapError::Boundary(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{BASE, PAGE, heap, heap_with};
    use heap_core::{BoundaryError, SlotPolicy};

    fn va(raw: u64) -> VirtualAddress {
        VirtualAddress::new(raw)
    }

    fn page(i: usize) -> VirtualAddress {
        va(BASE + (i * PAGE) as u64)
    }

    #[test]
    fn best_fit_picks_smallest_qualifying_run() {
        let mut h = heap(10);
        let blocks: Vec<_> = [3, 1, 2, 1].iter().map(|n| h.allocate(n * PAGE).unwrap()).collect();
        // pages 0..3 | 3 | 4..6 | 6 | 7..10 free
        h.free(blocks[0]);
        h.free(blocks[2]);
        // runs: 0..3 (three), 4..6 (two), 7..10 (three)
        assert_eq!(h.allocate(2 * PAGE), Ok(page(4)));
        assert_eq!(h.allocate(PAGE), Ok(page(0)));
    }

    #[test]
    fn ties_go_to_the_lowest_address() {
        let mut h = heap(7);
        let a = h.allocate(2 * PAGE).unwrap();
        let _b = h.allocate(PAGE).unwrap();
        let c = h.allocate(2 * PAGE).unwrap();
        let _d = h.allocate(PAGE).unwrap();
        h.free(a);
        h.free(c);
        // runs: 0..2, 3..5 and the trailing page 6
        assert_eq!(h.allocate(2 * PAGE), Ok(page(0)));
    }

    #[test]
    fn trailing_run_is_considered() {
        let mut h = heap(6);
        let a = h.allocate(3 * PAGE).unwrap();
        let _b = h.allocate(PAGE).unwrap();
        h.free(a);
        // runs: 0..3 (three) and the trailing 4..6 (two)
        assert_eq!(h.allocate(2 * PAGE), Ok(page(4)));
    }

    #[test]
    fn strategy_flag_is_read_on_every_call() {
        let mut h = heap(4);
        assert!(h.allocate(1).is_ok());
        h.boundary_mut().best_fit = false;
        assert_eq!(h.allocate(1), Err(HeapError::UnsupportedStrategy));
        assert_eq!(h.live_blocks(), 1);
        h.boundary_mut().best_fit = true;
        assert!(h.allocate(1).is_ok());
    }

    #[test]
    fn invalid_size_wins_over_strategy() {
        let mut h = heap(4);
        h.boundary_mut().best_fit = false;
        assert_eq!(h.allocate(0), Err(HeapError::InvalidSize(0)));
        assert_eq!(h.allocate(5 * PAGE), Err(HeapError::InvalidSize(5 * PAGE)));
    }

    #[test]
    fn fragmentation_reports_out_of_space() {
        let mut h = heap_with(4, SlotPolicy::Recycle);
        let pages: Vec<_> = (0..4).map(|_| h.allocate(PAGE).unwrap()).collect();
        h.free(pages[0]);
        h.free(pages[2]);
        assert_eq!(h.allocate(2 * PAGE), Err(HeapError::OutOfSpace));
    }

    #[test]
    fn kernel_refusal_leaves_no_trace() {
        let mut h = heap(4);
        h.boundary_mut().back_budget = Some(0);
        assert_eq!(h.allocate(PAGE), Err(HeapError::OutOfMemory));
        assert_eq!(h.free_pages(), 4);
        assert_eq!(h.live_blocks(), 0);
        assert_eq!(h.boundary().backed_pages(), 0);
    }

    #[test]
    fn allocate_and_free_round_trip_through_the_kernel() {
        let mut h = heap(8);
        let state = h.book().pages().clone();
        let v = h.allocate(3 * PAGE - 1).unwrap();
        assert_eq!(h.boundary().backed_pages(), 3);
        assert_eq!(h.reserved_bytes(v), Some(3 * PAGE));

        h.free(v);
        assert_eq!(h.book().pages(), &state);
        assert_eq!(h.boundary().backed_pages(), 0);
    }

    #[test]
    fn free_ignores_unknown_addresses() {
        let mut h = heap(4);
        let v = h.allocate(2 * PAGE).unwrap();
        h.free(VirtualAddress::zero());
        h.free(va(0x10));
        h.free(v + PAGE as u64);
        assert_eq!(h.live_blocks(), 1);
        assert_eq!(h.boundary().backed_pages(), 2);
    }

    #[test]
    fn refused_unback_keeps_block_live() {
        let mut h = heap(4);
        let v = h.allocate(PAGE).unwrap();
        h.boundary_mut().refuse_unback = Some(v);
        h.free(v);
        assert!(h.block_at(v).is_some());
        h.boundary_mut().refuse_unback = None;
        h.free(v);
        assert!(h.block_at(v).is_none());
    }

    #[test]
    fn other_backing_refusals_stay_boundary_errors() {
        let mut h = heap(4);
        let v = h.allocate(PAGE).unwrap();
        // backing the same range twice is rejected by the kernel
        let (slot, _) = h.book.lookup(v).unwrap();
        h.book.release(slot);
        assert_eq!(
            h.allocate(PAGE),
            Err(HeapError::Boundary(BoundaryError::Rejected(-17)))
        );
    }

    #[test]
    fn monotonic_block_table_reports_out_of_space_with_free_pages() {
        let mut h = heap(2);
        for _ in 0..2 {
            let v = h.allocate(1).unwrap();
            h.free(v);
        }
        assert_eq!(h.free_pages(), 2);
        assert_eq!(h.allocate(1), Err(HeapError::OutOfSpace));
        assert_eq!(h.boundary().backed_pages(), 0);
    }

    #[test]
    fn resize_reports_refused_drop_of_old_block() {
        let mut h = heap(8);
        let old = h.allocate(PAGE).unwrap();
        h.boundary_mut().write(old, b"still here");
        h.boundary_mut().refuse_unback = Some(old);

        assert_eq!(
            h.resize(Some(old), 3 * PAGE),
            Err(HeapError::Boundary(BoundaryError::Rejected(-1_000)))
        );

        assert_eq!(h.live_blocks(), 1);
        assert_eq!(h.block_at(old).unwrap().page_count, 1);
        assert_eq!(h.free_pages(), 7);
        assert_eq!(h.boundary().backed_pages(), 1);
        assert_eq!(h.boundary().read(old, 10), b"still here");
    }

    #[test]
    fn resize_grow_moves_content() {
        let mut h = heap(8);
        let old = h.allocate(64).unwrap();
        let _blocker = h.allocate(1).unwrap();
        h.boundary_mut().write(old, b"process heap contents");

        let new = h.resize(Some(old), 2 * PAGE).unwrap().unwrap();

        assert_ne!(new, old);
        assert_eq!(h.boundary().read(new, 21), b"process heap contents");
        assert!(h.block_at(old).is_none());
        assert!(!h.boundary().is_backed(old));
    }

    #[test]
    fn resize_in_place_and_degenerate_forms() {
        let mut h = heap(4);
        let v = h.allocate(10).unwrap();
        assert_eq!(h.resize(Some(v), PAGE), Ok(Some(v)));
        assert_eq!(h.resize(None, 0), Ok(None));
        assert_eq!(
            h.resize(Some(v + 8), 10),
            Err(HeapError::InvalidAddress(v.as_u64() + 8))
        );
        assert_eq!(h.resize(Some(v), 0), Ok(None));
        assert_eq!(h.free_pages(), 4);
        assert!(h.resize(None, PAGE).unwrap().is_some());
    }

    #[test]
    fn failed_move_keeps_old_block() {
        let mut h = heap(8);
        let old = h.allocate(PAGE).unwrap();
        h.boundary_mut().refuse_move = true;
        assert!(matches!(
            h.resize(Some(old), 3 * PAGE),
            Err(HeapError::Boundary(_))
        ));
        assert!(h.block_at(old).is_some());
        assert_eq!(h.live_blocks(), 1);
        assert_eq!(h.free_pages(), 7);
    }
}
