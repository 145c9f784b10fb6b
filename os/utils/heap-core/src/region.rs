use crate::PAGE_SIZE;
use kernel_memory_addresses::{Size4K, VirtualAddress};

/// Fixed `[start, end)` virtual address range owned by one heap.
///
/// Both bounds are page aligned and `start` is never `0`, so the null address
/// can never name a heap page.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Region {
    start: VirtualAddress,
    end: VirtualAddress,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum RegionError {
    #[error("region bound {0} is not page aligned")]
    Unaligned(VirtualAddress),
    #[error("region must not start at the null address")]
    NullStart,
    #[error("region end {end} does not lie above start {start}")]
    Empty {
        start: VirtualAddress,
        end: VirtualAddress,
    },
}

impl Region {
    /// # Errors
    /// See [`RegionError`].
    pub const fn new(start: u64, end: u64) -> Result<Self, RegionError> {
        let start = VirtualAddress::new(start);
        let end = VirtualAddress::new(end);
        if start.is_null() {
            return Err(RegionError::NullStart);
        }
        if !start.is_aligned::<Size4K>() {
            return Err(RegionError::Unaligned(start));
        }
        if !end.is_aligned::<Size4K>() {
            return Err(RegionError::Unaligned(end));
        }
        if end.as_u64() <= start.as_u64() {
            return Err(RegionError::Empty { start, end });
        }
        Ok(Self { start, end })
    }

    #[inline]
    #[must_use]
    pub const fn start(&self) -> VirtualAddress {
        self.start
    }

    #[inline]
    #[must_use]
    pub const fn end(&self) -> VirtualAddress {
        self.end
    }

    /// Size of the region in bytes; the upper bound for a single request.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn capacity(&self) -> usize {
        (self.end.as_u64() - self.start.as_u64()) as usize
    }

    /// Number of page slots.
    #[inline]
    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.capacity() / PAGE_SIZE
    }

    #[inline]
    #[must_use]
    pub const fn contains(&self, va: VirtualAddress) -> bool {
        va.as_u64() >= self.start.as_u64() && va.as_u64() < self.end.as_u64()
    }

    /// Slot index of the page containing `va`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn page_index(&self, va: VirtualAddress) -> Option<usize> {
        if self.contains(va) {
            Some(((va.as_u64() - self.start.as_u64()) / PAGE_SIZE as u64) as usize)
        } else {
            None
        }
    }

    /// Base address of slot `index`.
    #[inline]
    #[must_use]
    pub const fn page_address(&self, index: usize) -> VirtualAddress {
        VirtualAddress::new(self.start.as_u64() + (index * PAGE_SIZE) as u64)
    }

    /// Base addresses of every page slot, lowest first.
    pub fn pages(&self) -> impl Iterator<Item = VirtualAddress> + '_ {
        (0..self.page_count()).map(|i| self.page_address(i))
    }
}
