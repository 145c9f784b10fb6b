//! # Kernel Heap
//!
//! Page-granular heap for the kernel's own address space. Every allocation is
//! a whole number of 4 KiB pages carved out of the fixed region
//! `[KERNEL_HEAP_START, KERNEL_HEAP_MAX)` (see `kernel-info`).
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  KernelHeap                         │
//! │    • first-fit placement                            │
//! │    • allocate / free / resize                       │
//! │    • VA ↔ PA translation over the heap region       │
//! └───────────┬─────────────────────────┬───────────────┘
//!             │                         │
//! ┌───────────▼───────────┐ ┌───────────▼───────────────┐
//! │ heap-core::HeapBook   │ │ kernel-vmem::FrameMapper  │
//! │  • page state bitmap  │ │  • frame pool             │
//! │  • block records      │ │  • page-table mappings    │
//! └───────────────────────┘ └───────────────────────────┘
//! ```
//!
//! The heap owns its [`FrameMapper`](kernel_vmem::FrameMapper) and calls it
//! directly: one frame is acquired and mapped per page. If any page of a
//! request fails, every frame and mapping taken earlier in the same request is
//! undone before [`HeapError::OutOfMemory`] is returned.
//!
//! ## Concurrency
//!
//! [`KernelHeap`] itself is `&mut self` throughout. [`LockedKernelHeap`] wraps
//! it in a [`SpinLock`](kernel_sync::SpinLock) so each operation runs as one
//! critical section. Process heaps have their own state and never take this
//! lock.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kernel_alloc::KernelHeap;
//!
//! let mut heap = KernelHeap::with_kernel_layout(mapper)?;
//! let va = heap.allocate(3000)?;          // one page
//! let va = heap.resize(Some(va), 10_000)?; // moves to three pages, copies 3000 bytes
//! heap.free(va.unwrap());
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

mod kernel_heap;
mod locked;

pub use crate::kernel_heap::KernelHeap;
pub use crate::locked::LockedKernelHeap;
pub use heap_core::{BlockRecord, HeapConfig, HeapError, Region, RegionError, SlotPolicy};
