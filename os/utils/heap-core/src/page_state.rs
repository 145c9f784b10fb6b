use bitvec::prelude::*;
use core::ops::Range;

/// One flag per page slot of a region: `true` = allocated, `false` = free.
///
/// Index `i` corresponds to `region.start + i * PAGE_SIZE`.
#[derive(Clone, PartialEq, Eq)]
pub struct PageStateTable {
    bits: BitVec<usize, Lsb0>,
}

/// A maximal run of consecutive free pages.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FreeRun {
    pub start: usize,
    pub len: usize,
}

impl PageStateTable {
    /// All `pages` slots start out free.
    #[must_use]
    pub fn new(pages: usize) -> Self {
        Self {
            bits: BitVec::repeat(false, pages),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// # Panics
    /// If `index` is out of bounds.
    #[inline]
    #[must_use]
    pub fn is_allocated(&self, index: usize) -> bool {
        self.bits[index]
    }

    #[must_use]
    pub fn free_count(&self) -> usize {
        self.bits.count_zeros()
    }

    /// `true` if every page in `range` is free.
    #[must_use]
    pub fn is_range_free(&self, range: Range<usize>) -> bool {
        self.bits[range].not_any()
    }

    /// `true` if every page in `range` is allocated.
    #[must_use]
    pub fn is_range_allocated(&self, range: Range<usize>) -> bool {
        self.bits[range].all()
    }

    pub fn mark_allocated(&mut self, range: Range<usize>) {
        self.bits[range].fill(true);
    }

    pub fn mark_free(&mut self, range: Range<usize>) {
        self.bits[range].fill(false);
    }

    /// Maximal free runs in ascending address order. The trailing run at the
    /// end of the table is included even though no allocated page ends it.
    pub fn free_runs(&self) -> impl Iterator<Item = FreeRun> + '_ {
        let mut cursor = 0;
        core::iter::from_fn(move || {
            let rest = &self.bits[cursor..];
            let start = cursor + rest.first_zero()?;
            let len = self.bits[start..].first_one().unwrap_or(self.len() - start);
            cursor = start + len;
            Some(FreeRun { start, len })
        })
    }
}

impl core::fmt::Debug for PageStateTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // One glyph per page: '#' allocated, '.' free.
        f.write_str("PageStateTable[")?;
        for bit in &self.bits {
            f.write_str(if *bit { "#" } else { "." })?;
        }
        f.write_str("]")
    }
}
