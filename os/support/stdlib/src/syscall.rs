mod boundary;

pub use boundary::SyscallBoundary;

use crate::syscall_abi::Sysno;

#[inline(always)]
#[allow(clippy::inline_always)]
pub fn debug_byte(b: u8) {
    unsafe {
        core::arch::asm!(
            "syscall",
            inlateout("rax") Sysno::DebugWriteByte as u64 => _,
            in("rdi") u64::from(b),
            lateout("rcx") _, // clobbered by SYSCALL
            lateout("r11") _, // clobbered by SYSCALL
            options(nostack)
        );
    }
}

/// Issue system call `n` with up to five arguments.
///
/// # Safety
/// Pointer arguments must stay valid for the duration of the call and point
/// to what the kernel expects for `n`.
#[inline(always)]
#[must_use]
#[allow(clippy::inline_always, clippy::cast_possible_wrap)]
pub unsafe fn syscall5(n: Sysno, args: [u64; 5]) -> i64 {
    let ret: u64;
    unsafe {
        core::arch::asm!(
            "syscall",
            inlateout("rax") n as u64 => ret,
            in("rdi") args[0],
            in("rsi") args[1],
            in("rdx") args[2],
            in("r10") args[3],
            in("r8") args[4],
            lateout("rcx") _, // syscall clobbers
            lateout("r11") _,
            options(nostack)
        );
    }
    ret as i64
}
