//! # Page-Granular Heap Bookkeeping
//!
//! Data structures shared by the kernel heap (`kernel-alloc`) and the process
//! heap (`stdlib`). Neither heap shares *state* with the other; they share
//! only the shape of it.
//!
//! ## Components
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ HeapBook                                     │
//! │  ┌────────┐  ┌────────────────┐  ┌─────────┐ │
//! │  │ Region │  │ PageStateTable │  │  Block  │ │
//! │  │ bounds │  │  1 bit / page  │  │  Table  │ │
//! │  └────────┘  └────────────────┘  └─────────┘ │
//! └──────────────────────────────────────────────┘
//!          ▲ placement::{first_fit, best_fit}
//! ```
//!
//! * [`Region`]: immutable, page-aligned `[start, end)` bounds of one heap.
//! * [`PageStateTable`]: one bit per page slot, `true` = allocated.
//! * [`BlockTable`]: one [`BlockRecord`] per live allocation.
//! * [`placement`]: run searches over a [`PageStateTable`].
//! * [`HeapBook`]: the three tables bundled with the size validation and
//!   commit/release steps both heaps perform identically.
//!
//! ## Invariants
//!
//! For every live [`BlockRecord`] `r`:
//! - every page in `r.first_page .. r.first_page + r.page_count` is allocated,
//! - `r.page_count == ceil(r.requested_size / PAGE_SIZE)`,
//! - `r.first_va == region.start + r.first_page * PAGE_SIZE`,
//! - no other live record overlaps its page range.

#![cfg_attr(not(any(test, doctest)), no_std)]

extern crate alloc;

mod block_table;
mod book;
mod config;
mod error;
mod page_state;
pub mod placement;
mod region;

pub use crate::block_table::{BlockKind, BlockRecord, BlockTable, SharedObjectId};
pub use crate::book::HeapBook;
pub use crate::config::{HeapConfig, SlotPolicy};
pub use crate::error::{BoundaryError, HeapError};
pub use crate::page_state::{FreeRun, PageStateTable};
pub use crate::placement::Placement;
pub use crate::region::{Region, RegionError};

pub use kernel_memory_addresses::{PageSize, Size4K, VirtualAddress};

/// Heap page granularity in bytes.
#[allow(clippy::cast_possible_truncation)]
pub const PAGE_SIZE: usize = Size4K::SIZE as usize;
