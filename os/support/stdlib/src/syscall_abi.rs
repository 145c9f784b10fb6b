/// System call numbers shared by the kernel dispatcher and the userland stubs.
///
/// Arguments go in `rdi`, `rsi`, `rdx`, `r10`, `r8`; the result comes back in
/// `rax`. Negative results are error codes (see `BoundaryError::from_code`).
#[repr(u64)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Sysno {
    /// Write a single byte to a kernel-chosen “debug” sink.
    DebugWriteByte = 1,
    /// Back `[va, va + size)` with fresh frames: `(va, size)`.
    AllocateMem = 2,
    /// Unmap and release `[va, va + size)`: `(va, size)`.
    FreeMem = 3,
    /// Copy bytes between two mapped ranges: `(src, dst, size)`.
    MoveMem = 4,
    /// `1` if the process heap should place with best-fit, else `0`.
    IsBestFit = 5,
    /// `(name_ptr, name_len, size, writable, va)`, returns the object id.
    CreateSharedObject = 6,
    /// `(owner, name_ptr, name_len)`, returns the object size.
    GetSharedObjectSize = 7,
    /// `(owner, name_ptr, name_len, va)`, returns the object id.
    GetSharedObject = 8,
    /// `(id)`.
    FreeSharedObject = 9,
}

impl Sysno {
    /// Decode the `rax` value seen by the kernel dispatcher.
    #[must_use]
    pub const fn from_raw(n: u64) -> Option<Self> {
        Some(match n {
            1 => Self::DebugWriteByte,
            2 => Self::AllocateMem,
            3 => Self::FreeMem,
            4 => Self::MoveMem,
            5 => Self::IsBestFit,
            6 => Self::CreateSharedObject,
            7 => Self::GetSharedObjectSize,
            8 => Self::GetSharedObject,
            9 => Self::FreeSharedObject,
            _ => return None,
        })
    }
}
