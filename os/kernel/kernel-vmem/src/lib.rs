//! # Virtual Memory Collaborator Interface
//!
//! The kernel heap never walks page tables or touches the physical frame pool
//! itself. Both live behind the [`FrameMapper`] trait defined here, which the
//! embedding kernel implements on top of its address space and frame
//! allocator.
//!
//! ## What you get
//! - [`FrameMapper`]: acquire/release frames, install/remove 4 KiB mappings,
//!   query the frame behind a virtual page, copy between mapped ranges.
//! - [`FrameHandle`]: an opaque token for one physical frame.
//! - [`PagePermissions`]: the permission bits requested for a leaf mapping.
//! - [`AddressTranslator`]: VA↔PA queries answered through a [`FrameMapper`].
//! - [`MapError`]: the failure modes of the collaborator.
//!
//! ## Ownership of frames
//!
//! ```text
//!   acquire_frame ──► FrameHandle ──► map_page(va) ──► (mapped)
//!                          ▲                              │
//!                          └──── release_frame ◄── unmap_page(va)
//! ```
//!
//! A frame returned by [`FrameMapper::unmap_page`] is handed back to the
//! caller, which is then responsible for releasing it. Reference counting,
//! if any, is the implementor's concern.

#![cfg_attr(not(any(test, doctest)), no_std)]

mod page_permissions;
mod translate;

pub use crate::page_permissions::PagePermissions;
pub use crate::translate::AddressTranslator;
pub use kernel_memory_addresses as addresses;

use kernel_memory_addresses::{PhysicalAddress, VirtualAddress};

/// Opaque identity of one physical 4 KiB frame.
///
/// The numeric value is whatever the [`FrameMapper`] finds convenient (a frame
/// number, an index into a frame-info array, ...). Only the mapper that issued
/// a handle can turn it into a [`PhysicalAddress`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Failure modes of a [`FrameMapper`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum MapError {
    /// No frame available, or no memory left for an intermediate page table.
    #[error("out of memory")]
    OutOfMemory,
    /// A virtual page in the requested range has no mapping.
    #[error("access to unmapped memory at {0}")]
    NotMapped(VirtualAddress),
}

/// Physical frame pool plus page-table mapper for a single address space.
///
/// All calls are synchronous and non-reentrant. Implementations must not call
/// back into the heap that owns them.
pub trait FrameMapper {
    /// Take one frame out of the pool.
    ///
    /// # Errors
    /// [`MapError::OutOfMemory`] if the pool is exhausted.
    fn acquire_frame(&mut self) -> Result<FrameHandle, MapError>;

    /// Return a frame to the pool.
    fn release_frame(&mut self, frame: FrameHandle);

    /// Map `frame` at the 4 KiB page `va` with `permissions`.
    ///
    /// # Errors
    /// [`MapError::OutOfMemory`] if an intermediate table could not be
    /// allocated. The frame stays owned by the caller in that case.
    fn map_page(
        &mut self,
        frame: FrameHandle,
        va: VirtualAddress,
        permissions: PagePermissions,
    ) -> Result<(), MapError>;

    /// Remove the mapping of page `va` and hand back the frame that backed it.
    fn unmap_page(&mut self, va: VirtualAddress) -> Option<FrameHandle>;

    /// The frame currently mapped at page `va`, if any.
    fn frame_behind(&self, va: VirtualAddress) -> Option<FrameHandle>;

    /// Base physical address of `frame`.
    fn physical_address_of(&self, frame: FrameHandle) -> PhysicalAddress;

    /// Copy `len` bytes from `src` to `dst`. Both ranges must be mapped and
    /// must not overlap.
    ///
    /// # Errors
    /// [`MapError::NotMapped`] if a page of either range has no mapping.
    fn copy_mapped(
        &mut self,
        src: VirtualAddress,
        dst: VirtualAddress,
        len: usize,
    ) -> Result<(), MapError>;
}
