//! VA↔PA queries over a [`FrameMapper`].

use crate::FrameMapper;
use kernel_memory_addresses::{PhysicalAddress, Size4K, VirtualAddress};

/// Read-only view answering address translation questions.
///
/// Translation is at page granularity: the physical address returned for a
/// virtual address is the base of the frame behind its page.
pub struct AddressTranslator<'m, M: FrameMapper> {
    mapper: &'m M,
}

impl<'m, M: FrameMapper> AddressTranslator<'m, M> {
    #[inline]
    pub const fn new(mapper: &'m M) -> Self {
        Self { mapper }
    }

    /// Frame base behind the page containing `va`, if mapped.
    #[must_use]
    pub fn physical_of(&self, va: VirtualAddress) -> Option<PhysicalAddress> {
        let page = va.align_down::<Size4K>();
        self.mapper
            .frame_behind(page)
            .map(|frame| self.mapper.physical_address_of(frame))
    }

    /// First page in `pages` whose frame sits at `pa` (rounded down).
    pub fn virtual_of(
        &self,
        pa: PhysicalAddress,
        pages: impl IntoIterator<Item = VirtualAddress>,
    ) -> Option<VirtualAddress> {
        let target = pa.align_down::<Size4K>();
        pages
            .into_iter()
            .find(|&va| self.physical_of(va) == Some(target))
    }
}
