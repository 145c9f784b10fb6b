use crate::KernelHeap;
use heap_core::HeapError;
use kernel_memory_addresses::{PhysicalAddress, VirtualAddress};
use kernel_sync::SpinLock;
use kernel_vmem::FrameMapper;

/// [`KernelHeap`] behind its own [`SpinLock`].
///
/// Every method holds the lock for the whole operation, including the
/// frame-mapper calls it makes.
pub struct LockedKernelHeap<M: FrameMapper> {
    inner: SpinLock<KernelHeap<M>>,
}

impl<M: FrameMapper> LockedKernelHeap<M> {
    #[must_use]
    pub const fn new(heap: KernelHeap<M>) -> Self {
        Self {
            inner: SpinLock::new(heap),
        }
    }

    /// See [`KernelHeap::allocate`].
    ///
    /// # Errors
    /// As [`KernelHeap::allocate`].
    pub fn allocate(&self, size: usize) -> Result<VirtualAddress, HeapError> {
        self.inner.with_lock(|heap| heap.allocate(size))
    }

    pub fn free(&self, va: VirtualAddress) {
        self.inner.with_lock(|heap| heap.free(va));
    }

    /// See [`KernelHeap::resize`].
    ///
    /// # Errors
    /// As [`KernelHeap::resize`].
    pub fn resize(
        &self,
        va: Option<VirtualAddress>,
        new_size: usize,
    ) -> Result<Option<VirtualAddress>, HeapError> {
        self.inner.with_lock(|heap| heap.resize(va, new_size))
    }

    #[must_use]
    pub fn physical_for_virtual(&self, va: VirtualAddress) -> Option<PhysicalAddress> {
        self.inner.with_lock(|heap| heap.physical_for_virtual(va))
    }

    #[must_use]
    pub fn virtual_for_physical(&self, pa: PhysicalAddress) -> Option<VirtualAddress> {
        self.inner.with_lock(|heap| heap.virtual_for_physical(pa))
    }

    /// Run `f` with the heap locked.
    pub fn with_heap<R>(&self, f: impl FnOnce(&mut KernelHeap<M>) -> R) -> R {
        self.inner.with_lock(f)
    }

    #[must_use]
    pub fn into_inner(self) -> KernelHeap<M> {
        self.inner.into_inner()
    }
}
