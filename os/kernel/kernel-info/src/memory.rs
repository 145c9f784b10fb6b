//! # Memory Layout

use kernel_memory_addresses::{PageSize, Size4K};

/// Granularity of every heap region.
pub const PAGE_SIZE: u64 = Size4K::SIZE;

/// End of userspace VA range after which Kernel space begins.
pub const LAST_USERSPACE_ADDRESS: u64 = 0xffff_0000_0000_0000;

/// A simple Higher Half Direct Map (HHDM) base.
/// Anything mapped at [`HHDM_BASE`] + `pa` lets the kernel
/// access physical memory via a fixed offset.
pub const HHDM_BASE: u64 = 0xffff_8880_0000_0000;

/// First address of the kernel heap region.
pub const KERNEL_HEAP_START: u64 = 0xffff_c000_0000_0000;

/// Exclusive end of the kernel heap region (64 MiB).
pub const KERNEL_HEAP_MAX: u64 = KERNEL_HEAP_START + 64 * 1024 * 1024;

/// First address of every process heap region.
pub const USER_HEAP_START: u64 = 0x0000_0008_0000_0000;

/// Exclusive end of every process heap region (512 MiB).
pub const USER_HEAP_MAX: u64 = USER_HEAP_START + 512 * 1024 * 1024;

/// Where the kernel executes (VMA).
pub const KERNEL_BASE: u64 = 0xffff_ffff_8000_0000;

const _: () = {
    assert!(KERNEL_HEAP_START.is_multiple_of(PAGE_SIZE));
    assert!(KERNEL_HEAP_MAX.is_multiple_of(PAGE_SIZE));
    assert!(USER_HEAP_START.is_multiple_of(PAGE_SIZE));
    assert!(USER_HEAP_MAX.is_multiple_of(PAGE_SIZE));
    assert!(USER_HEAP_START > 0);
    assert!(USER_HEAP_MAX <= LAST_USERSPACE_ADDRESS);
    assert!(HHDM_BASE >= LAST_USERSPACE_ADDRESS);
    assert!(KERNEL_HEAP_START > HHDM_BASE);
    assert!(KERNEL_HEAP_MAX <= KERNEL_BASE);
};
