use heap_core::{BoundaryError, SharedObjectId, VirtualAddress};

/// Identifier of the process that created a shared object.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct OwnerId(pub u32);

/// Kernel services the process heap relies on.
///
/// Each call crosses into the kernel and returns once the kernel is done.
/// Implementations do not retry; a failure is reported back as-is.
pub trait KernelBoundary {
    /// Give `[va, va + size)` physical backing in the calling process.
    ///
    /// # Errors
    /// [`BoundaryError::NoMemory`] or whatever else the kernel reports.
    fn back_memory(&mut self, va: VirtualAddress, size: usize) -> Result<(), BoundaryError>;

    /// Drop the backing of `[va, va + size)`.
    ///
    /// # Errors
    /// If the kernel refuses; the range is then still backed.
    fn unback_memory(&mut self, va: VirtualAddress, size: usize) -> Result<(), BoundaryError>;

    /// Copy `size` bytes from `src` to `dst`. Both ranges are backed.
    ///
    /// # Errors
    /// If either range is not backed.
    fn move_memory(
        &mut self,
        src: VirtualAddress,
        dst: VirtualAddress,
        size: usize,
    ) -> Result<(), BoundaryError>;

    /// Whether the process heap is currently configured for best-fit.
    ///
    /// Asked on every placement; the answer may change between calls.
    fn placement_is_best_fit(&self) -> bool;

    /// Create a named object of `size` bytes and map it at `va`.
    ///
    /// # Errors
    /// [`BoundaryError::AlreadyExists`] for a duplicate name,
    /// [`BoundaryError::NoMemory`] if the kernel cannot back it.
    fn create_shared_object(
        &mut self,
        name: &str,
        size: usize,
        writable: bool,
        va: VirtualAddress,
    ) -> Result<SharedObjectId, BoundaryError>;

    /// Size in bytes of `owner`'s object `name`.
    ///
    /// # Errors
    /// [`BoundaryError::NotFound`] if there is no such object, any other
    /// variant if the kernel could not answer.
    fn shared_object_size(&self, owner: OwnerId, name: &str) -> Result<usize, BoundaryError>;

    /// Map `owner`'s object `name` at `va` in the calling process.
    ///
    /// # Errors
    /// [`BoundaryError::NotFound`] if the object vanished, or a mapping failure.
    fn attach_shared_object(
        &mut self,
        owner: OwnerId,
        name: &str,
        va: VirtualAddress,
    ) -> Result<SharedObjectId, BoundaryError>;

    /// Unmap the object `id` from the calling process.
    ///
    /// # Errors
    /// [`BoundaryError::NotFound`] if `id` is not attached here.
    fn detach_shared_object(&mut self, id: SharedObjectId) -> Result<(), BoundaryError>;
}
