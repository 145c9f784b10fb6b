use crate::boundary::{KernelBoundary, OwnerId};
use crate::heap::{ProcessHeap, backing_error};
use heap_core::{BlockKind, BoundaryError, HeapError, VirtualAddress};
use log::{debug, error, trace, warn};

/// Named shared objects, placed in a [`ProcessHeap`] with the same best-fit
/// search as private allocations.
///
/// Pages are marked allocated only after the kernel has created or attached
/// the object, so a refused call leaves the heap untouched.
pub struct SharedObjects<'h, B: KernelBoundary> {
    heap: &'h mut ProcessHeap<B>,
}

impl<'h, B: KernelBoundary> SharedObjects<'h, B> {
    pub(crate) const fn new(heap: &'h mut ProcessHeap<B>) -> Self {
        Self { heap }
    }

    /// Create the object `name` of `size` bytes and map it into this heap.
    ///
    /// # Errors
    /// Everything [`ProcessHeap::allocate`] reports before backing,
    /// [`HeapError::OutOfMemory`] if the kernel cannot back the object, and
    /// [`HeapError::Boundary`] for other refusals, e.g. a duplicate name.
    pub fn create(
        &mut self,
        name: &str,
        size: usize,
        writable: bool,
    ) -> Result<VirtualAddress, HeapError> {
        let (first_page, page_count) = self.heap.place(size)?;
        let va = self.heap.book.region().page_address(first_page);

        let id = self
            .heap
            .boundary
            .create_shared_object(name, size, writable, va)
            .inspect_err(|e| warn!("creating shared object {name:?} failed: {e}"))
            .map_err(backing_error)?;

        debug!("created shared object {name:?} as {id:?} at {va}");
        self.commit(first_page, page_count, size, BlockKind::Shared(id))
    }

    /// Map `owner`'s object `name` into this heap.
    ///
    /// # Errors
    /// [`HeapError::NotFound`] if no such object exists, a placement error,
    /// [`HeapError::OutOfMemory`] if the kernel cannot back it, or
    /// [`HeapError::Boundary`] if the kernel refuses otherwise.
    pub fn attach(&mut self, owner: OwnerId, name: &str) -> Result<VirtualAddress, HeapError> {
        let size = match self.heap.boundary.shared_object_size(owner, name) {
            Ok(size) => size,
            Err(BoundaryError::NotFound) => {
                warn!("no shared object {name:?} owned by {owner:?}");
                return Err(HeapError::NotFound);
            }
            Err(e) => {
                warn!("size of {name:?} of {owner:?} unavailable: {e}");
                return Err(backing_error(e));
            }
        };
        let (first_page, page_count) = self.heap.place(size)?;
        let va = self.heap.book.region().page_address(first_page);

        let id = self
            .heap
            .boundary
            .attach_shared_object(owner, name, va)
            .inspect_err(|e| warn!("attaching {name:?} of {owner:?} failed: {e}"))
            .map_err(backing_error)?;

        debug!("attached {name:?} of {owner:?} as {id:?} at {va}");
        self.commit(first_page, page_count, size, BlockKind::Shared(id))
    }

    /// Unmap the shared object attached at `va`.
    ///
    /// Addresses that are not the head of a shared block are ignored.
    pub fn detach(&mut self, va: VirtualAddress) {
        let Some((slot, record)) = self.heap.book.lookup(va) else {
            trace!("ignoring detach of {va}");
            return;
        };
        let BlockKind::Shared(id) = record.kind else {
            warn!("detach of private block at {va} ignored");
            return;
        };
        if let Err(e) = self.heap.boundary.detach_shared_object(id) {
            error!("kernel refused to detach {id:?} at {va}: {e}; block stays live");
            return;
        }
        self.heap.book.release(slot);
    }

    fn commit(
        &mut self,
        first_page: usize,
        page_count: usize,
        size: usize,
        kind: BlockKind,
    ) -> Result<VirtualAddress, HeapError> {
        let result = self.heap.book.commit(first_page, page_count, size, kind);
        if let (Err(_), BlockKind::Shared(id)) = (&result, kind)
            && let Err(e) = self.heap.boundary.detach_shared_object(id)
        {
            error!("could not undo mapping of {id:?}: {e}");
        }
        result
    }
}
