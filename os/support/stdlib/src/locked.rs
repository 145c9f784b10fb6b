use crate::boundary::{KernelBoundary, OwnerId};
use crate::heap::ProcessHeap;
use heap_core::{HeapError, VirtualAddress};
use kernel_sync::SpinLock;

/// [`ProcessHeap`] behind its own [`SpinLock`], for threads sharing one heap.
///
/// Every method holds the lock for the whole operation, including the
/// kernel calls it makes.
pub struct LockedProcessHeap<B: KernelBoundary> {
    inner: SpinLock<ProcessHeap<B>>,
}

impl<B: KernelBoundary> LockedProcessHeap<B> {
    #[must_use]
    pub const fn new(heap: ProcessHeap<B>) -> Self {
        Self {
            inner: SpinLock::new(heap),
        }
    }

    /// See [`ProcessHeap::allocate`].
    ///
    /// # Errors
    /// As [`ProcessHeap::allocate`].
    pub fn allocate(&self, size: usize) -> Result<VirtualAddress, HeapError> {
        self.inner.with_lock(|heap| heap.allocate(size))
    }

    pub fn free(&self, va: VirtualAddress) {
        self.inner.with_lock(|heap| heap.free(va));
    }

    /// See [`ProcessHeap::resize`].
    ///
    /// # Errors
    /// As [`ProcessHeap::resize`].
    pub fn resize(
        &self,
        va: Option<VirtualAddress>,
        new_size: usize,
    ) -> Result<Option<VirtualAddress>, HeapError> {
        self.inner.with_lock(|heap| heap.resize(va, new_size))
    }

    /// See [`SharedObjects::create`](crate::SharedObjects::create).
    ///
    /// # Errors
    /// As [`SharedObjects::create`](crate::SharedObjects::create).
    pub fn create_shared(
        &self,
        name: &str,
        size: usize,
        writable: bool,
    ) -> Result<VirtualAddress, HeapError> {
        self.inner
            .with_lock(|heap| heap.shared().create(name, size, writable))
    }

    /// See [`SharedObjects::attach`](crate::SharedObjects::attach).
    ///
    /// # Errors
    /// As [`SharedObjects::attach`](crate::SharedObjects::attach).
    pub fn attach_shared(&self, owner: OwnerId, name: &str) -> Result<VirtualAddress, HeapError> {
        self.inner.with_lock(|heap| heap.shared().attach(owner, name))
    }

    pub fn detach_shared(&self, va: VirtualAddress) {
        self.inner.with_lock(|heap| heap.shared().detach(va));
    }

    /// Run `f` with the heap locked.
    pub fn with_heap<R>(&self, f: impl FnOnce(&mut ProcessHeap<B>) -> R) -> R {
        self.inner.with_lock(f)
    }

    #[must_use]
    pub fn into_inner(self) -> ProcessHeap<B> {
        self.inner.into_inner()
    }
}
