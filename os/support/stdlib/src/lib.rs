//! # Process Runtime: Heap and Shared Objects
//!
//! Userland half of the page heap. A [`ProcessHeap`] carves best-fit page
//! runs out of the process heap region (`USER_HEAP_START..USER_HEAP_MAX`) and
//! asks the kernel, through a [`KernelBoundary`], to back them.
//! [`SharedObjects`] places named, kernel-managed objects into the same
//! region.
//!
//! ```text
//!  ProcessHeap ──allocate/free/resize──┐
//!      │                               │  KernelBoundary
//!      └─ SharedObjects ─create/attach─┼───────────────────▶ kernel
//!                                      │  (SyscallBoundary)
//! ```
//!
//! Bookkeeping comes from `heap-core` and is private to each heap instance;
//! nothing here touches the kernel heap's tables.
//!
//! ## Features
//!
//! - `syscall-abi`: [`syscall_abi::Sysno`], shared with the kernel dispatcher.
//! - `syscall`: [`SyscallBoundary`] and the raw system call stubs.
//! - `stdlib`: [`SyscallLogger`] and the panic handler for userland binaries.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![cfg_attr(not(feature = "syscall"), forbid(unsafe_code))]
#![cfg_attr(feature = "syscall", allow(unsafe_code))]

mod boundary;
mod heap;
mod locked;
mod shared;

#[cfg(test)]
mod sim;

#[cfg(feature = "stdlib")]
mod logger;

#[cfg(feature = "syscall")]
pub mod syscall;

#[cfg(feature = "syscall-abi")]
pub mod syscall_abi;

pub use crate::boundary::{KernelBoundary, OwnerId};
pub use crate::heap::ProcessHeap;
pub use crate::locked::LockedProcessHeap;
pub use crate::shared::SharedObjects;
pub use heap_core::{
    BlockKind, BlockRecord, BoundaryError, HeapConfig, HeapError, Region, RegionError,
    SharedObjectId, SlotPolicy, VirtualAddress,
};

#[cfg(feature = "stdlib")]
pub use crate::logger::{SyscallLogger, SyscallSink};

#[cfg(feature = "syscall")]
pub use crate::syscall::SyscallBoundary;

#[cfg(all(feature = "stdlib", not(any(test, doctest))))]
mod panic {
    #[panic_handler]
    fn panic(info: &core::panic::PanicInfo) -> ! {
        log::error!("{info}");
        loop {
            core::hint::spin_loop();
        }
    }
}
