//! # Kernel Memory Layout Configuration
//!
//! This crate is the single source of truth for the virtual-address layout the
//! heap allocators operate in. Every heap instance is handed a fixed region at
//! construction; the bounds of those regions live here as compile-time
//! constants so the kernel, the process runtime and the tests agree on them.
//!
//! ## Virtual Memory Architecture
//!
//! ```text
//! Virtual Address Space Layout (64-bit):
//!
//! 0x0000_0000_0000_0000 ┌─────────────────────────────────┐
//!                       │         User Space              │
//! USER_HEAP_START       ├─────────────────────────────────┤ 0x0000_0008_0000_0000
//!                       │    Process Heap (best-fit)      │
//! USER_HEAP_MAX         ├─────────────────────────────────┤ 0x0000_0008_2000_0000
//!                       │                                 │
//! LAST_USERSPACE_ADDRESS├─────────────────────────────────┤ 0xffff_0000_0000_0000
//!                       │        Guard Region             │
//! HHDM_BASE             ├─────────────────────────────────┤ 0xffff_8880_0000_0000
//!                       │   Higher Half Direct Mapping    │
//! KERNEL_HEAP_START     ├─────────────────────────────────┤ 0xffff_c000_0000_0000
//!                       │    Kernel Heap (first-fit)      │
//! KERNEL_HEAP_MAX       ├─────────────────────────────────┤ 0xffff_c000_0400_0000
//!                       │                                 │
//! KERNEL_BASE           ├─────────────────────────────────┤ 0xffff_ffff_8000_0000
//!                       │       Kernel Text & Data        │
//! 0xFFFF_FFFF_FFFF_FFFF └─────────────────────────────────┘
//! ```
//!
//! ## Configuration Management
//!
//! All layout constants are `const` values checked at compile time; a
//! misconfigured layout (unaligned bounds, overlapping regions) fails the
//! build instead of corrupting a heap at run time.
//!
//! ```rust
//! use kernel_info::memory::{KERNEL_HEAP_MAX, KERNEL_HEAP_START, PAGE_SIZE};
//!
//! let pages = (KERNEL_HEAP_MAX - KERNEL_HEAP_START) / PAGE_SIZE;
//! assert_eq!(pages, 16 * 1024);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod memory;
