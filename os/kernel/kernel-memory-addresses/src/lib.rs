//! # Virtual and Physical Memory Address Types
//!
//! Strongly typed wrappers for raw memory addresses used by the heap
//! allocators.
//!
//! ## Overview
//!
//! The heaps hand out virtual addresses and answer translation queries in
//! both directions. Mixing the two kinds is an easy mistake when both are
//! plain `u64`, so this crate keeps them apart at the type level while
//! remaining zero-cost:
//!
//! | Wrapper | Meaning |
//! |----------|----------|
//! | [`VirtualAddress`] | Refers to virtual (page-table translated) memory. |
//! | [`PhysicalAddress`] | Refers to physical memory, i.e. a frame base plus offset. |
//!
//! ## Page Sizes
//!
//! The heaps operate at 4 KiB granularity via the [`Size4K`] marker, which
//! implements [`PageSize`]. The trait carries [`SIZE`](PageSize::SIZE) and
//! [`SHIFT`](PageSize::SHIFT) so that alignment helpers stay generic.
//!
//! ## Typical Usage
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let va = VirtualAddress::new(0x8000_1234);
//! assert_eq!(va.align_down::<Size4K>().as_u64(), 0x8000_1000);
//! assert!(!va.is_aligned::<Size4K>());
//!
//! // 3000 bytes still occupy a whole page.
//! assert_eq!(pages_for::<Size4K>(3000), 1);
//! assert_eq!(pages_for::<Size4K>(4097), 2);
//! ```
//!
//! ## Null Addresses
//!
//! Address `0` is never part of a heap region, so [`VirtualAddress::is_null`]
//! doubles as the "no pointer" check on the allocator entry points.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(clippy::inline_always)]

use core::fmt;
use core::hash::Hash;
use core::ops::{Add, Sub};

/// Sealed trait pattern to restrict `PageSize` impls to our markers.
mod sealed {
    pub trait Sealed {}
}

/// Marker trait for supported page sizes.
pub trait PageSize:
    sealed::Sealed + Clone + Copy + Eq + PartialEq + Ord + PartialOrd + Hash + fmt::Debug
{
    /// Page size in bytes (power of two).
    const SIZE: u64;
    /// log2(SIZE), i.e., number of low bits used for the offset.
    const SHIFT: u32;
}

/// 4 KiB page (4096 bytes).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Size4K;
impl sealed::Sealed for Size4K {}
impl PageSize for Size4K {
    const SIZE: u64 = 4096;
    const SHIFT: u32 = 12;
}

/// Number of `S`-sized pages needed to hold `bytes` bytes (rounds up).
///
/// ```rust
/// # use kernel_memory_addresses::*;
/// assert_eq!(pages_for::<Size4K>(0), 0);
/// assert_eq!(pages_for::<Size4K>(1), 1);
/// assert_eq!(pages_for::<Size4K>(4096), 1);
/// assert_eq!(pages_for::<Size4K>(8193), 3);
/// ```
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn pages_for<S: PageSize>(bytes: usize) -> usize {
    bytes.div_ceil(S::SIZE as usize)
}

/// Byte length of `pages` pages of size `S`.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn bytes_for<S: PageSize>(pages: usize) -> usize {
    pages * S::SIZE as usize
}

macro_rules! address_type {
    ($(#[$meta:meta])* $name:ident, $short:literal) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub struct $name(u64);

        impl $name {
            #[inline]
            #[must_use]
            pub const fn new(v: u64) -> Self {
                Self(v)
            }

            #[inline]
            #[must_use]
            pub const fn zero() -> Self {
                Self(0)
            }

            #[inline]
            #[must_use]
            pub const fn as_u64(self) -> u64 {
                self.0
            }

            /// `true` for address `0`, the "no pointer" value.
            #[inline]
            #[must_use]
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }

            /// Align down to page boundary `S`.
            #[inline]
            #[must_use]
            pub const fn align_down<S: PageSize>(self) -> Self {
                Self(self.0 & !(S::SIZE - 1))
            }

            /// `true` if the address sits on an `S` page boundary.
            #[inline]
            #[must_use]
            pub const fn is_aligned<S: PageSize>(self) -> bool {
                self.0 & (S::SIZE - 1) == 0
            }

            /// The offset within the page of size `S` that contains this address.
            #[inline]
            #[must_use]
            pub const fn page_offset<S: PageSize>(self) -> u64 {
                self.0 & (S::SIZE - 1)
            }

            /// Checked add of a byte offset, returning `None` on overflow.
            #[inline]
            #[must_use]
            pub const fn checked_add(self, rhs: u64) -> Option<Self> {
                match self.0.checked_add(rhs) {
                    Some(v) => Some(Self(v)),
                    None => None,
                }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($short, "(0x{:016X})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{:016X}", self.0)
            }
        }

        impl From<u64> for $name {
            #[inline]
            fn from(v: u64) -> Self {
                Self::new(v)
            }
        }

        impl From<$name> for u64 {
            #[inline]
            fn from(v: $name) -> Self {
                v.as_u64()
            }
        }

        impl Add<u64> for $name {
            type Output = Self;
            #[inline]
            fn add(self, rhs: u64) -> Self::Output {
                Self(self.0 + rhs)
            }
        }

        impl Sub<$name> for $name {
            type Output = u64;
            #[inline]
            fn sub(self, rhs: $name) -> Self::Output {
                self.0 - rhs.0
            }
        }
    };
}

address_type!(
    /// Virtual memory address.
    ///
    /// Carries the *kind* of address at the type level so it cannot be
    /// confused with a [`PhysicalAddress`]. No canonicality check is done.
    VirtualAddress,
    "VA"
);

address_type!(
    /// Physical memory address.
    ///
    /// Produced by frame lookups; never dereferenced directly by the heaps.
    PhysicalAddress,
    "PA"
);
